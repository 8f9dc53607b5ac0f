//! Execution contexts: named destinations for handler delivery.
//!
//! # Design
//! The dispatch core never runs handlers on the transport's completion
//! thread unless asked to; every handler invocation is submitted to an
//! `ExecutionContext`. Two flavors exist: `inline`, which runs jobs
//! immediately on whichever thread submits them, and `worker`, which owns a
//! dedicated named thread draining a channel in submission order. Handles
//! are cheap to clone; a worker thread exits once the last handle to it is
//! dropped.

use std::sync::mpsc;
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A scheduling destination onto which handler invocations are marshaled.
#[derive(Clone)]
pub struct ExecutionContext {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Inline,
    Worker {
        name: String,
        sender: mpsc::Sender<Job>,
    },
}

impl ExecutionContext {
    /// A context that runs jobs synchronously on the submitting thread.
    pub fn inline() -> Self {
        Self {
            inner: Inner::Inline,
        }
    }

    /// A context backed by a dedicated thread with the given name. Jobs run
    /// one at a time, in submission order.
    ///
    /// # Panics
    /// Panics if the operating system refuses to spawn the thread, the same
    /// contract as [`std::thread::spawn`].
    pub fn worker(name: &str) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .expect("failed to spawn execution context thread");
        Self {
            inner: Inner::Worker {
                name: name.to_string(),
                sender,
            },
        }
    }

    /// The context's name: the worker thread name, or `"inline"`.
    pub fn name(&self) -> &str {
        match &self.inner {
            Inner::Inline => "inline",
            Inner::Worker { name, .. } => name,
        }
    }

    pub(crate) fn submit(&self, job: Job) {
        match &self.inner {
            Inner::Inline => job(),
            Inner::Worker { name, sender } => {
                if sender.send(job).is_err() {
                    log::warn!("execution context {name} is gone, dropping handler invocation");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn inline_runs_on_the_submitting_thread() {
        let context = ExecutionContext::inline();
        let submitter = thread::current().id();
        let (tx, rx) = channel();
        context.submit(Box::new(move || {
            tx.send(thread::current().id()).unwrap();
        }));
        // Inline submission is synchronous, so the result is already there.
        assert_eq!(rx.try_recv().unwrap(), submitter);
    }

    #[test]
    fn worker_runs_on_its_named_thread() {
        let context = ExecutionContext::worker("test-delivery");
        let (tx, rx) = channel();
        context.submit(Box::new(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        }));
        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(name.as_deref(), Some("test-delivery"));
    }

    #[test]
    fn worker_preserves_submission_order() {
        let context = ExecutionContext::worker("ordered");
        let (tx, rx) = channel();
        for i in 0..10 {
            let tx = tx.clone();
            context.submit(Box::new(move || {
                tx.send(i).unwrap();
            }));
        }
        let seen: Vec<i32> = (0..10)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn names_are_reported() {
        assert_eq!(ExecutionContext::inline().name(), "inline");
        assert_eq!(ExecutionContext::worker("bg").name(), "bg");
    }
}
