#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::path::PathBuf;

use rstest::fixture;
use serde_json::Value;
use tracing::info;

use fragspec_core::{Info, SpecBuilder};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore")
}

/// A builder loading the petstore fixtures.
#[fixture]
pub fn petstore() -> SpecBuilder {
    init_tracing();
    let info = Info::new("Swagger Petstore", "1.0.0").with_license(serde_json::json!({
        "name": "MIT"
    }));

    let mut builder = SpecBuilder::new(info);
    builder
        .add_server(serde_json::json!({ "url": "http://petstore.swagger.io/v1" }))
        .expect("building")
        .add_components_dir(fixtures_dir().join("components"))
        .expect("valid components dir")
        .add_paths_dir(fixtures_dir().join("paths"))
        .expect("valid paths dir");
    builder
}

/// Collects every string value found under a `key` anywhere in the tree.
pub fn string_values<'a>(value: &'a Value, key: &str, found: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                if name == key
                    && let Value::String(text) = child
                {
                    found.push(text);
                }
                string_values(child, key, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                string_values(item, key, found);
            }
        }
        _ => {}
    }
}
