//! Payload fixtures and a throwaway managed-content root

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use wiremock::MockServer;
use xenia_manager_core::RuntimeConfig;
use xenia_manager_versions::{InstallRegistry, VersionManager};
use zip::write::SimpleFileOptions;

use super::constants::*;

/// Build a zip archive in memory
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Build an uncompressed zip, so its size on the wire tracks its content
pub fn stored_zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// The canary archive layout: executable plus a license in a subdirectory
pub fn canary_zip() -> Vec<u8> {
    zip_bytes(&[(CANARY_EXE, FAKE_EXE_CONTENT), ("LICENSE/LICENSE.txt", FAKE_LICENSE)])
}

pub fn sha256_digest(content: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(content))
}

/// Relative path -> bytes for every file under `dir`
pub fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// A temporary root plus a mock feed server wired into the configuration
pub struct TestEnv {
    pub temp: TempDir,
    pub server: MockServer,
    pub config: RuntimeConfig,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp = TempDir::new().expect("create temp root");
        let server = MockServer::start().await;

        let mut config = RuntimeConfig::default();
        config.github.api_url = server.uri();
        config.network.connect_timeout_secs = 5;
        config.network.http_timeout_secs = 10;
        config.network.read_timeout_secs = 10;
        config.paths.root = Some(temp.path().to_path_buf());

        Self {
            temp,
            server,
            config,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.network.download_chunk_size = chunk_size;
        self
    }

    pub fn root(&self) -> PathBuf {
        std::path::absolute(self.temp.path()).expect("absolute temp root")
    }

    pub fn manager(&self) -> VersionManager {
        VersionManager::from_config(&self.config, None).expect("build manager")
    }

    pub fn registry(&self) -> InstallRegistry {
        self.manager().load_registry().expect("load registry")
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }
}
