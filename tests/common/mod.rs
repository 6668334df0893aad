//! Shared helpers for integration tests.
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     let entries = common::load_fixture("large_case.txt");
//! }
//! ```
//!
//! `RUST_LOG` controls tracing output (e.g. `RUST_LOG=leafchain=debug`).

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer `fmt` subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Read `tests/data/<name>`: whitespace-separated `<key> <value>` pairs.
pub fn load_fixture(name: &str) -> Vec<(u64, String)> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()));

    let tokens: Vec<&str> = text.split_whitespace().collect();
    assert!(tokens.len() % 2 == 0, "fixture {name} has a dangling key");
    tokens
        .chunks(2)
        .map(|pair| {
            let key = pair[0]
                .parse()
                .unwrap_or_else(|e| panic!("bad key {:?} in {name}: {e}", pair[0]));
            (key, pair[1].to_string())
        })
        .collect()
}

/// Value strings in the `<key>Data` shape the fixtures use.
pub fn data(keys: &[u64]) -> Vec<String> {
    keys.iter().map(|k| format!("{k}Data")).collect()
}
