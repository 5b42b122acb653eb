#![allow(dead_code)]

use std::path::PathBuf;

use resto_regions::RecordSet;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture table; the platform is the file stem.
pub fn load(name: &str) -> RecordSet {
    resto_regions::load_file(fixture(name), None).unwrap()
}

/// The three platform fixtures in command-line order.
pub fn all_platforms() -> Vec<RecordSet> {
    vec![
        load("deliveroo.csv"),
        load("ubereats.json"),
        load("takeaway.csv"),
    ]
}
