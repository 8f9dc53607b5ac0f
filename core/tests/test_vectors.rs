//! Verify the resolver and the form encoder against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file describes inputs and the exact expected output string,
//! pinning the wire format independently of the unit tests.

use serde_json::Value;
use webservice_core::encoding::{self, EncodedParameters, ParameterEncoding};
use webservice_core::url;

#[test]
fn resolve_test_vectors() {
    let raw = include_str!("../../test-vectors/resolve.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base = case["base"].as_str().unwrap();
        let path = case["path"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();
        assert_eq!(url::resolve(base, path), expected, "{name}");
    }
}

#[test]
fn form_encoding_test_vectors() {
    let raw = include_str!("../../test-vectors/form.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parameters = &case["parameters"];
        let expected = case["expected"].as_str().unwrap();

        let encoded = encoding::encode(parameters, ParameterEncoding::Form).unwrap();
        match encoded {
            EncodedParameters::Form(query) => assert_eq!(query, expected, "{name}"),
            other => panic!("{name}: expected form encoding, got {other:?}"),
        }
    }
}

#[test]
fn json_encoding_round_trips_every_form_vector() {
    let raw = include_str!("../../test-vectors/form.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parameters = &case["parameters"];

        let encoded = encoding::encode(parameters, ParameterEncoding::Json).unwrap();
        let EncodedParameters::Json(bytes) = encoded else {
            panic!("{name}: expected json encoding");
        };
        let parsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(&parsed, parameters, "{name}");
    }
}
