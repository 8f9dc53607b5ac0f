use std::io::{Error, ErrorKind};
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Standalone entry point for poking at the echo server by hand, e.g.
/// `ECHO_ADDR=127.0.0.1:9090 cargo run -p echo-server`.
#[tokio::main]
async fn main() -> Result<(), Error> {
    let raw = std::env::var("ECHO_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| Error::new(ErrorKind::InvalidInput, format!("bad ECHO_ADDR {raw}: {err}")))?;
    let listener = TcpListener::bind(addr).await?;
    println!("echo server listening on http://{addr}");
    echo_server::run(listener).await
}
