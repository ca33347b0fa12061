//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the iplens binary built for these tests
pub fn iplens_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_iplens"))
}

/// Run the iplens binary in the specified directory
///
/// Colors are disabled so output can be matched literally.
pub fn run_iplens_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(iplens_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("IPLENS_CACHE_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute iplens binary")
}

/// Write an `iplens.yaml` pointing both services at `base_url`
pub fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("iplens.yaml");
    let content = format!(
        "cache:\n  dir: cache\ngeo:\n  base_url: {base_url}/json/\nrdap:\n  base_url: {base_url}/bootstrap/ip/\nhttp:\n  timeout_secs: 5\n"
    );
    std::fs::write(&path, content).expect("Failed to write config");
    path
}
