//! Shared constants for test infrastructure

// Tags
pub const TAG_V1_2_3: &str = "v1.2.3";
pub const TAG_V1_2_4: &str = "v1.2.4";
pub const TAG_STABLE_V1: &str = "v1.0.2803";

// Asset names, as published by the real feeds
pub const CANARY_ZIP: &str = "xenia_canary_windows.zip";
pub const CANARY_EXE: &str = "xenia_canary.exe";
pub const STABLE_ZIP: &str = "xenia_master.zip";
pub const STABLE_EXE: &str = "xenia.exe";
pub const EXPERIMENT_EXE: &str = "xenia_canary_dbexperiment.exe";

// Payloads
pub const FAKE_EXE_CONTENT: &[u8] = b"MZ fake emulator binary";
pub const FAKE_LICENSE: &[u8] = b"BSD 3-Clause";
pub const USER_FILE_CONTENT: &[u8] = b"user's own executable";

pub const WRONG_DIGEST: &str =
    "sha256:0000000000000000000000000000000000000000000000000000000000000000";

/// Path on the mock server an asset downloads from
pub fn download_path(name: &str) -> String {
    format!("/download/{}", name)
}
