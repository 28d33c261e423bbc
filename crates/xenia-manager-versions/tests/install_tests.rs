//! End-to-end install tests: mocked feed, real download, real filesystem

mod common;

use common::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use xenia_manager_versions::{
    CancelToken, DownloadProgress, Error, InstallObserver, NoopObserver, Variant,
};

async fn serve_canary(env: &TestEnv, tag: &str, archive: &[u8]) {
    let release = ReleaseBuilder::new()
        .tag(tag)
        .asset(&env.uri(), "xenia_canary_linux.tar.gz", 1)
        .asset(&env.uri(), CANARY_ZIP, archive.len())
        .build();
    mock_latest_release(&env.server, Variant::Canary, &release).await;
    mock_tagged_release(&env.server, Variant::Canary, &release).await;
    mock_download(&env.server, CANARY_ZIP, archive).await;
}

#[tokio::test]
async fn test_install_latest_records_and_links() {
    let env = TestEnv::new().await;
    serve_canary(&env, TAG_V1_2_3, &canary_zip()).await;

    let manager = env.manager();
    let mut registry = env.registry();
    let outcome = manager
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap();

    let install_dir = env.root().join("versions/canary").join(TAG_V1_2_3);
    let exe = install_dir.join(CANARY_EXE);
    assert_eq!(outcome.install_dir, install_dir);
    assert_eq!(outcome.executables, vec![exe.clone()]);
    assert_eq!(fs::read(&exe).unwrap(), FAKE_EXE_CONTENT);
    assert_eq!(fs::read(install_dir.join("LICENSE/LICENSE.txt")).unwrap(), FAKE_LICENSE);

    let reloaded = env.registry();
    assert_eq!(reloaded.version_of(&exe), Some(TAG_V1_2_3));
    assert_eq!(reloaded.display_name(&exe), Some("Xenia Canary v1.2.3"));
    assert_eq!(reloaded.latest_known(Variant::Canary), Some(TAG_V1_2_3));

    #[cfg(unix)]
    assert_eq!(fs::read_link(env.root().join(CANARY_EXE)).unwrap(), exe);

    // scratch download directory is cleaned up
    assert!(!env.root().join("temp/xenia-canary-v1.2.3").exists());
    assert!(manager.is_installed(Variant::Canary, TAG_V1_2_3));
}

#[tokio::test]
async fn test_reinstall_is_idempotent() {
    let env = TestEnv::new().await;
    serve_canary(&env, TAG_V1_2_3, &canary_zip()).await;

    let manager = env.manager();
    let mut registry = env.registry();
    let token = CancelToken::new();

    let first = manager
        .install(&mut registry, Variant::Canary, Some(TAG_V1_2_3), &NoopObserver, &token)
        .await
        .unwrap();
    let before = snapshot(&first.install_dir);

    // leftovers from a botched earlier install must not survive
    fs::write(first.install_dir.join("stale.dll"), b"old").unwrap();

    let second = manager
        .install(&mut registry, Variant::Canary, Some(TAG_V1_2_3), &NoopObserver, &token)
        .await
        .unwrap();

    assert_eq!(first.install_dir, second.install_dir);
    assert_eq!(snapshot(&second.install_dir), before);
    assert_eq!(registry.installed().len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_file_at_link_path_is_backed_up() {
    let env = TestEnv::new().await;
    serve_canary(&env, TAG_V1_2_3, &canary_zip()).await;
    fs::write(env.root().join(CANARY_EXE), USER_FILE_CONTENT).unwrap();

    let mut registry = env.registry();
    let outcome = env
        .manager()
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap();

    let backup = env.root().join(format!("{}.backup", CANARY_EXE));
    assert_eq!(fs::read(&backup).unwrap(), USER_FILE_CONTENT);
    assert_eq!(outcome.links[0].backup.as_deref(), Some(backup.as_path()));
    assert_eq!(
        fs::read_link(env.root().join(CANARY_EXE)).unwrap(),
        outcome.executables[0]
    );
}

#[tokio::test]
async fn test_single_executable_variant() {
    let env = TestEnv::new().await;
    let release = ReleaseBuilder::new()
        .tag("exp-42")
        .asset(&env.uri(), "xenia_canary_windows.zip", 1)
        .asset(&env.uri(), EXPERIMENT_EXE, FAKE_EXE_CONTENT.len())
        .build();
    mock_tagged_release(&env.server, Variant::CanaryDbExperiment, &release).await;
    mock_download(&env.server, EXPERIMENT_EXE, FAKE_EXE_CONTENT).await;

    let mut registry = env.registry();
    let outcome = env
        .manager()
        .install(
            &mut registry,
            Variant::CanaryDbExperiment,
            Some("exp-42"),
            &NoopObserver,
            &CancelToken::new(),
        )
        .await
        .unwrap();

    let exe = env
        .root()
        .join("versions/canary-dbexperiment/exp-42")
        .join(EXPERIMENT_EXE);
    assert_eq!(outcome.executables, vec![exe.clone()]);
    assert_eq!(fs::read(&exe).unwrap(), FAKE_EXE_CONTENT);
    assert_eq!(
        registry.display_name(&exe),
        Some("Xenia Canary (db-experiment) exp-42")
    );
}

#[tokio::test]
async fn test_no_matching_asset() {
    let env = TestEnv::new().await;
    let release = ReleaseBuilder::new()
        .asset(&env.uri(), "xenia_canary_linux.tar.gz", 1)
        .build();
    mock_latest_release(&env.server, Variant::Canary, &release).await;

    let mut registry = env.registry();
    let err = env
        .manager()
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoMatchingAsset { .. }));
    assert!(!env.root().join("versions").exists());
}

#[tokio::test]
async fn test_checksum_mismatch_aborts_before_install() {
    let env = TestEnv::new().await;
    let archive = canary_zip();
    let release = ReleaseBuilder::new()
        .asset_value(
            AssetBuilder::new(CANARY_ZIP)
                .served_from(&env.uri())
                .size(archive.len())
                .digest(WRONG_DIGEST)
                .build(),
        )
        .build();
    mock_latest_release(&env.server, Variant::Canary, &release).await;
    mock_download(&env.server, CANARY_ZIP, &archive).await;

    let mut registry = env.registry();
    let err = env
        .manager()
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ChecksumMismatch { .. }));
    assert!(!env.root().join("versions/canary").join(TAG_V1_2_3).exists());
    assert!(registry.installed().is_empty());
}

#[tokio::test]
async fn test_matching_digest_installs() {
    let env = TestEnv::new().await;
    let archive = canary_zip();
    let release = ReleaseBuilder::new()
        .asset_value(
            AssetBuilder::new(CANARY_ZIP)
                .served_from(&env.uri())
                .digest(&sha256_digest(&archive))
                .build(),
        )
        .build();
    mock_latest_release(&env.server, Variant::Canary, &release).await;
    mock_download(&env.server, CANARY_ZIP, &archive).await;

    let mut registry = env.registry();
    env.manager()
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(registry.installed().len(), 1);
}

#[tokio::test]
async fn test_corrupt_archive_is_extraction_error() {
    let env = TestEnv::new().await;
    serve_canary(&env, TAG_V1_2_3, b"definitely not a zip").await;

    let mut registry = env.registry();
    let err = env
        .manager()
        .install(&mut registry, Variant::Canary, None, &NoopObserver, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Extraction { .. }), "got {err:?}");
    assert!(!env.root().join("temp/xenia-canary-v1.2.3").exists());
}

/// Cancels the shared token once enough progress has been seen
struct CancelAfter {
    token: CancelToken,
    after: usize,
    calls: AtomicUsize,
}

impl InstallObserver for CancelAfter {
    fn download_progress(&self, _progress: &DownloadProgress) {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
    }
}

#[tokio::test]
async fn test_cancel_during_download_cleans_up() {
    let env = TestEnv::new().await.with_chunk_size(1024);
    let payload = vec![9u8; 64 * 1024];
    let archive = stored_zip_bytes(&[(CANARY_EXE, payload.as_slice())]);
    serve_canary(&env, TAG_V1_2_3, &archive).await;

    let token = CancelToken::new();
    let observer = CancelAfter {
        token: token.clone(),
        after: 2,
        calls: AtomicUsize::new(0),
    };

    let mut registry = env.registry();
    let err = env
        .manager()
        .install(&mut registry, Variant::Canary, None, &observer, &token)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!env.root().join("temp/xenia-canary-v1.2.3").exists());
    assert!(!env.root().join("versions/canary").join(TAG_V1_2_3).exists());
}

#[tokio::test]
async fn test_overlapping_installs_of_one_version_are_serialized() {
    let env = TestEnv::new().await;
    let archive = canary_zip();
    let release = ReleaseBuilder::new()
        .tag(TAG_V1_2_3)
        .asset(&env.uri(), CANARY_ZIP, archive.len())
        .build();
    mock_tagged_release(&env.server, Variant::Canary, &release).await;
    mock_slow_download(
        &env.server,
        CANARY_ZIP,
        &archive,
        std::time::Duration::from_millis(200),
    )
    .await;

    let (first_manager, second_manager) = (env.manager(), env.manager());
    let (mut first_registry, mut second_registry) = (env.registry(), env.registry());
    let (first_token, second_token) = (CancelToken::new(), CancelToken::new());

    let (first, second) = tokio::join!(
        first_manager.install(
            &mut first_registry,
            Variant::Canary,
            Some(TAG_V1_2_3),
            &NoopObserver,
            &first_token,
        ),
        second_manager.install(
            &mut second_registry,
            Variant::Canary,
            Some(TAG_V1_2_3),
            &NoopObserver,
            &second_token,
        ),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.install_dir, second.install_dir);
    assert_eq!(
        fs::read(first.install_dir.join(CANARY_EXE)).unwrap(),
        FAKE_EXE_CONTENT
    );
    assert!(!env.root().join("temp/xenia-canary-v1.2.3").exists());
}
