mod common;

use std::fs;
use std::path::Path;

use common::{MockClient, gz, tar_gz};
use preload::target::{CIFAR_URL, EMBEDDINGS_URL, REVIEWS_URL};
use preload::{
    Acquirer, AcquisitionTarget, Error, Outcome, builtin_targets, ensure_directory, health,
};
use preload_fetch::FetchError;

fn builtin_mock() -> MockClient {
    MockClient::new()
        .serve(EMBEDDINGS_URL, gz(b"word2vec"))
        .serve(
            REVIEWS_URL,
            tar_gz(&[
                ("aclImdb/README", "Large Movie Review Dataset v1.0"),
                ("aclImdb/train/pos/0_9.txt", "Bromwell High is a cartoon comedy."),
                ("aclImdb/test/neg/0_2.txt", "Once again Mr. Costner has dragged out a movie."),
            ]),
        )
        .serve(
            CIFAR_URL,
            tar_gz(&[
                ("cifar-10-batches-bin/batches.meta.txt", "airplane\nautomobile\n"),
                ("cifar-10-batches-bin/data_batch_1.bin", "\u{6}pixels"),
            ]),
        )
}

#[tokio::test]
async fn fresh_directory_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let data = root.path().join("data");
    let targets = builtin_targets(&data);
    let acquirer = Acquirer::new(builtin_mock());

    let outcomes = preload::run(&acquirer, &targets, &health::default_checks())
        .await
        .unwrap();

    assert_eq!(
        outcomes,
        [
            Outcome { downloaded: true, extracted: false },
            Outcome { downloaded: true, extracted: true },
            Outcome { downloaded: true, extracted: true },
        ]
    );
    assert!(data.join("GoogleNews-vectors-negative300.bin.gz").is_file());
    assert!(data.join("dl4j_w2vSentiment/aclImdb_v1.tar.gz").is_file());
    assert!(data.join("dl4j_w2vSentiment/aclImdb/train/pos/0_9.txt").is_file());
    assert!(data.join("cifar/cifar-10-batches-bin/batches.meta.txt").is_file());
    assert_eq!(acquirer.client().gets().len(), 3);
}

#[tokio::test]
async fn second_run_performs_no_downloads() {
    let root = tempfile::tempdir().unwrap();
    let targets = builtin_targets(root.path());
    let first = Acquirer::new(builtin_mock());
    first.acquire_all(&targets).await.unwrap();

    let second = Acquirer::new(builtin_mock());
    let outcomes = second.acquire_all(&targets).await.unwrap();

    assert!(outcomes.iter().all(Outcome::is_noop));
    assert!(second.client().gets().is_empty());
}

#[tokio::test]
async fn second_run_fetches_only_what_went_missing() {
    let root = tempfile::tempdir().unwrap();
    let targets = builtin_targets(root.path());
    Acquirer::new(builtin_mock()).acquire_all(&targets).await.unwrap();
    fs::remove_file(root.path().join("GoogleNews-vectors-negative300.bin.gz")).unwrap();

    let acquirer = Acquirer::new(builtin_mock());
    acquirer.acquire_all(&targets).await.unwrap();

    assert_eq!(acquirer.client().gets(), [EMBEDDINGS_URL]);
}

#[tokio::test]
async fn existing_extracted_directory_is_never_touched() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[1];
    let extracted = root.path().join("dl4j_w2vSentiment/aclImdb");
    fs::create_dir_all(&extracted).unwrap();
    // Not an archive at all: extraction would fail if attempted.
    fs::write(&target.local_archive_path, b"newer and different").unwrap();

    let acquirer = Acquirer::new(MockClient::new());
    let outcome = acquirer.acquire(target).await.unwrap();

    assert_eq!(outcome, Outcome::default());
    assert!(!acquirer.ensure_extracted(target).await.unwrap());
    assert_eq!(fs::read_dir(&extracted).unwrap().count(), 0);
    assert!(acquirer.client().gets().is_empty());
}

#[tokio::test]
async fn zero_length_archive_skips_download_and_fails_extraction() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[1];
    fs::create_dir_all(target.base_dir()).unwrap();
    fs::write(&target.local_archive_path, b"").unwrap();

    let acquirer = Acquirer::new(builtin_mock());
    let err = acquirer.acquire(target).await.unwrap_err();

    assert!(
        matches!(
            err,
            Error::ExtractionFailure {
                source: preload_archive::Error::Empty,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(err.exit_code(), 2);
    assert!(acquirer.client().gets().is_empty());
    assert!(!root.path().join("dl4j_w2vSentiment/aclImdb").exists());
}

#[tokio::test]
async fn corrupt_archive_fails_extraction_without_partial_output() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[1];
    fs::create_dir_all(target.base_dir()).unwrap();
    fs::write(&target.local_archive_path, b"<html>mirror is down</html>").unwrap();

    let err = Acquirer::new(MockClient::new()).acquire(target).await.unwrap_err();

    assert!(matches!(err, Error::ExtractionFailure { .. }), "{err:?}");
    let entries: Vec<_> = fs::read_dir(target.base_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, ["aclImdb_v1.tar.gz"]);
}

#[tokio::test]
async fn present_archive_is_only_extracted() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[2];
    fs::create_dir_all(target.base_dir()).unwrap();
    fs::write(
        &target.local_archive_path,
        tar_gz(&[("cifar-10-batches-bin/test_batch.bin", "x")]),
    )
    .unwrap();

    let acquirer = Acquirer::new(MockClient::new());
    let outcome = acquirer.acquire(target).await.unwrap();

    assert_eq!(outcome, Outcome { downloaded: false, extracted: true });
    assert!(target.is_satisfied());
    assert!(acquirer.client().gets().is_empty());
}

#[tokio::test]
async fn archive_without_expected_directory_is_an_extraction_failure() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[1];
    fs::create_dir_all(target.base_dir()).unwrap();
    fs::write(&target.local_archive_path, tar_gz(&[("something-else/file", "x")])).unwrap();

    let err = Acquirer::new(MockClient::new()).acquire(target).await.unwrap_err();

    assert!(
        matches!(
            err,
            Error::ExtractionFailure {
                source: preload_archive::Error::Corrupted { .. },
                ..
            }
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn directory_is_created_before_download() {
    let root = tempfile::tempdir().unwrap();
    let data = root.path().join("data");
    let target = AcquisitionTarget::new("embeddings", EMBEDDINGS_URL, data.join("vectors.bin.gz"));
    let client = MockClient::new()
        .serve(EMBEDDINGS_URL, gz(b"v"))
        .probe_dir(data.clone());
    let acquirer = Acquirer::new(client);

    acquirer.acquire(&target).await.unwrap();

    assert_eq!(acquirer.client().probed(), [true]);
}

#[tokio::test]
async fn network_failure_leaves_no_archive() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[0];
    let acquirer = Acquirer::new(MockClient::new());

    let err = acquirer.acquire(target).await.unwrap_err();

    match &err {
        Error::NetworkFailure { url, source } => {
            assert_eq!(url, EMBEDDINGS_URL);
            assert!(matches!(source, FetchError::Network { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!target.local_archive_path.exists());
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn retries_are_attempted_when_configured() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[0];
    let acquirer = Acquirer::new(MockClient::new()).with_fetch_options(
        preload_fetch::FetchOptions::default()
            .max_retries(2)
            .retry_backoff(std::time::Duration::ZERO),
    );

    let err = acquirer.acquire(target).await.unwrap_err();

    assert!(matches!(
        err,
        Error::NetworkFailure {
            source: FetchError::RetriesExhausted { attempts: 3, .. },
            ..
        }
    ));
    assert_eq!(acquirer.client().gets().len(), 3);
}

#[tokio::test]
async fn checksum_mismatch_is_a_network_failure() {
    let root = tempfile::tempdir().unwrap();
    let target = builtin_targets(root.path())[0].clone().with_sha256([0; 32]);
    let acquirer = Acquirer::new(builtin_mock());

    let err = acquirer.acquire(&target).await.unwrap_err();

    assert!(matches!(
        err,
        Error::NetworkFailure {
            source: FetchError::ChecksumMismatch { .. },
            ..
        }
    ));
    assert!(!target.local_archive_path.exists());
}

#[tokio::test]
async fn acquire_all_stops_at_first_failure() {
    let root = tempfile::tempdir().unwrap();
    let targets = builtin_targets(root.path());
    let client = MockClient::new().serve(REVIEWS_URL, tar_gz(&[("aclImdb/x", "x")]));
    let acquirer = Acquirer::new(client);

    assert!(acquirer.acquire_all(&targets).await.is_err());

    assert_eq!(acquirer.client().gets(), [EMBEDDINGS_URL]);
    assert!(!root.path().join("dl4j_w2vSentiment/aclImdb_v1.tar.gz").exists());
}

#[tokio::test]
async fn stale_staging_directories_are_swept() {
    let root = tempfile::tempdir().unwrap();
    let target = &builtin_targets(root.path())[0];
    let stale = root.path().join(format!("{}interrupted", preload_fs::STAGING_PREFIX));
    fs::create_dir_all(stale.join("partial")).unwrap();

    Acquirer::new(builtin_mock()).acquire(target).await.unwrap();

    assert!(!stale.exists());
}

#[test]
fn ensure_directory_rejects_files() {
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("data");
    fs::write(&file, b"not a dir").unwrap();

    let err = ensure_directory(&file).unwrap_err();

    assert!(matches!(err, Error::IoFailure { ref path, .. } if path == Path::new(&file)));
    ensure_directory(&root.path().join("a/b")).unwrap();
    ensure_directory(&root.path().join("a/b")).unwrap();
    assert!(root.path().join("a/b").is_dir());
}
