use std::sync::Arc;
use std::time::Duration;

use swissdorm_client::{MemoryPhotoRepository, PhotoError, PhotoManager, PhotoOrigin};
use swissdorm_shared::Photo;

fn photo(n: u32) -> Photo {
    Photo::new(format!("content://media/{n}"), format!("img-{n}.jpg")).unwrap()
}

struct Harness {
    manager: Arc<PhotoManager>,
    local: Arc<MemoryPhotoRepository>,
    cloud: Arc<MemoryPhotoRepository>,
}

fn harness() -> Harness {
    harness_with(MemoryPhotoRepository::new(), MemoryPhotoRepository::new())
}

fn harness_with(local: MemoryPhotoRepository, cloud: MemoryPhotoRepository) -> Harness {
    let local = Arc::new(local);
    let cloud = Arc::new(cloud);
    let manager = Arc::new(PhotoManager::new(local.clone(), cloud.clone()));
    Harness {
        manager,
        local,
        cloud,
    }
}

#[tokio::test]
async fn add_stages_locally_and_appears_once() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();

    assert_eq!(h.manager.photos(), vec![photo(1)]);
    assert_eq!(h.local.upload_count(), 1);
    assert!(h.local.contains("img-1.jpg"));
    assert_eq!(h.cloud.upload_count(), 0);

    // Adding the same photo again is ignored.
    h.manager.add_photo(photo(1)).await.unwrap();
    assert_eq!(h.manager.photos(), vec![photo(1)]);
    assert_eq!(h.local.upload_count(), 1);
}

#[tokio::test]
async fn remove_with_local_flag_deletes_staged_copy() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();

    h.manager
        .remove_photo("content://media/1", true)
        .await
        .unwrap();

    assert_eq!(h.manager.photos(), vec![photo(2)]);
    assert_eq!(h.local.delete_count(), 1);
    assert!(!h.local.contains("img-1.jpg"));
}

#[tokio::test]
async fn remove_without_local_flag_keeps_staged_copy() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager
        .remove_photo("content://media/1", false)
        .await
        .unwrap();

    assert!(h.manager.photos().is_empty());
    assert_eq!(h.local.delete_count(), 0);
    assert!(h.local.contains("img-1.jpg"));
}

#[tokio::test]
async fn removing_unknown_uri_is_a_no_op() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();

    h.manager
        .remove_photo("content://media/404", true)
        .await
        .unwrap();

    assert_eq!(h.manager.photos(), vec![photo(1)]);
    assert_eq!(h.local.upload_count(), 1);
    assert_eq!(h.local.delete_count(), 0);
    assert_eq!(h.cloud.delete_count(), 0);
}

#[tokio::test]
async fn failed_local_upload_leaves_state_unchanged() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.local.set_fail_uploads(true);

    let err = h.manager.add_photo(photo(2)).await.unwrap_err();
    assert!(matches!(err, PhotoError::Backend(_)));
    assert_eq!(h.manager.photos(), vec![photo(1)]);
}

#[tokio::test]
async fn failed_local_delete_keeps_photo_picked() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.local.set_fail_deletes(true);

    assert!(h
        .manager
        .remove_photo("content://media/1", true)
        .await
        .is_err());
    assert_eq!(h.manager.photos(), vec![photo(1)]);
}

#[tokio::test]
async fn cancelled_add_does_not_append() {
    let h = harness_with(
        MemoryPhotoRepository::new().with_latency(Duration::from_millis(100)),
        MemoryPhotoRepository::new(),
    );

    let outcome =
        tokio::time::timeout(Duration::from_millis(10), h.manager.add_photo(photo(1))).await;
    assert!(outcome.is_err());
    assert!(h.manager.photos().is_empty());
    assert!(h.local.is_empty());

    // The cancelled call released its lock.
    h.manager.add_photo(photo(1)).await.unwrap();
    assert_eq!(h.manager.photos(), vec![photo(1)]);
}

#[tokio::test]
async fn commit_uploads_each_photo_once() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();

    h.manager.commit_changes().await.unwrap();
    assert_eq!(h.cloud.upload_count(), 2);
    assert_eq!(h.cloud.len(), 2);
    assert!(h.manager.is_committed("content://media/1"));

    h.manager.commit_changes().await.unwrap();
    assert_eq!(h.cloud.upload_count(), 2);
    assert_eq!(h.cloud.len(), 2);
}

#[tokio::test]
async fn failed_commit_keeps_photos_for_retry() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();
    h.cloud.set_fail_uploads(true);

    match h.manager.commit_changes().await {
        Err(PhotoError::Incomplete { operation, failed }) => {
            assert_eq!(operation, "commit");
            let mut failed = failed;
            failed.sort();
            assert_eq!(failed, ["img-1.jpg", "img-2.jpg"]);
        }
        other => panic!("expected incomplete commit, got {other:?}"),
    }
    assert_eq!(h.manager.photos(), vec![photo(1), photo(2)]);
    assert!(!h.manager.is_committed("content://media/1"));

    h.cloud.set_fail_uploads(false);
    h.manager.commit_changes().await.unwrap();
    assert_eq!(h.cloud.len(), 2);
    assert!(h.manager.is_committed("content://media/2"));
}

#[tokio::test]
async fn cancelled_commit_leaves_photos_uncommitted() {
    let h = harness_with(
        MemoryPhotoRepository::new(),
        MemoryPhotoRepository::new().with_latency(Duration::from_millis(100)),
    );
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();

    let outcome =
        tokio::time::timeout(Duration::from_millis(10), h.manager.commit_changes()).await;
    assert!(outcome.is_err());
    assert_eq!(h.manager.photos(), vec![photo(1), photo(2)]);
    assert!(!h.manager.is_committed("content://media/1"));
    assert!(!h.manager.is_committed("content://media/2"));
    assert!(h.cloud.is_empty());

    // Nothing was left locked; a retry uploads both.
    h.manager.commit_changes().await.unwrap();
    assert_eq!(h.cloud.len(), 2);
    assert!(h.manager.is_committed("content://media/1"));
    assert!(h.manager.is_committed("content://media/2"));
}

#[tokio::test]
async fn initialize_resolves_cloud_photos_in_order() {
    let h = harness_with(
        MemoryPhotoRepository::new(),
        MemoryPhotoRepository::with_base_url("https://cdn.swissdorm.test"),
    );
    for n in [3, 1, 2] {
        h.cloud.insert(photo(n));
    }
    h.manager.add_photo(photo(9)).await.unwrap();

    let names: Vec<String> = ["img-2.jpg", "img-3.jpg"].map(String::from).to_vec();
    h.manager.initialize(&names).await.unwrap();

    let uris: Vec<String> = h.manager.photos().into_iter().map(|p| p.uri).collect();
    assert_eq!(
        uris,
        [
            "https://cdn.swissdorm.test/img-2.jpg",
            "https://cdn.swissdorm.test/img-3.jpg"
        ]
    );
    assert_eq!(
        h.manager.origin("https://cdn.swissdorm.test/img-2.jpg"),
        Some(PhotoOrigin::Cloud)
    );

    // Nothing to upload: both are already in the cloud.
    h.manager.commit_changes().await.unwrap();
    assert_eq!(h.cloud.upload_count(), 0);
}

#[tokio::test]
async fn initialize_with_missing_file_keeps_previous_state() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();

    let err = h
        .manager
        .initialize(&["missing.jpg".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, PhotoError::NotFound(_)));
    assert_eq!(h.manager.photos(), vec![photo(1)]);
}

#[tokio::test]
async fn delete_all_clears_every_backend() {
    let h = harness();
    h.cloud.insert(photo(1));
    h.manager
        .initialize(&["img-1.jpg".to_string()])
        .await
        .unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();
    h.manager.add_photo(photo(3)).await.unwrap();
    h.manager.commit_changes().await.unwrap();
    h.manager.add_photo(photo(4)).await.unwrap();

    h.manager.delete_all().await.unwrap();

    assert!(h.manager.photos().is_empty());
    assert!(h.cloud.is_empty());
    assert!(h.local.is_empty());
}

#[tokio::test]
async fn delete_all_keeps_failures_picked() {
    let h = harness();
    h.manager.add_photo(photo(1)).await.unwrap();
    h.manager.commit_changes().await.unwrap();
    h.manager.add_photo(photo(2)).await.unwrap();
    h.cloud.set_fail_deletes(true);

    match h.manager.delete_all().await {
        Err(PhotoError::Incomplete { operation, failed }) => {
            assert_eq!(operation, "delete");
            assert_eq!(failed, ["img-1.jpg"]);
        }
        other => panic!("expected incomplete delete, got {other:?}"),
    }
    assert_eq!(h.manager.photos(), vec![photo(1)]);
    assert!(h.cloud.contains("img-1.jpg"));
}

#[tokio::test]
async fn same_photo_operations_run_in_issue_order() {
    let h = harness_with(
        MemoryPhotoRepository::new().with_latency(Duration::from_millis(30)),
        MemoryPhotoRepository::new(),
    );

    let add = {
        let manager = Arc::clone(&h.manager);
        tokio::spawn(async move { manager.add_photo(photo(1)).await })
    };
    // Let the add take the lock and start its upload.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let remove = {
        let manager = Arc::clone(&h.manager);
        tokio::spawn(async move { manager.remove_photo("content://media/1", true).await })
    };

    add.await.unwrap().unwrap();
    remove.await.unwrap().unwrap();

    // Had the remove overtaken the add it would have been a no-op and the
    // photo would still be picked.
    assert!(h.manager.photos().is_empty());
    assert_eq!(h.local.upload_count(), 1);
    assert_eq!(h.local.delete_count(), 1);
    assert!(h.local.is_empty());
}

#[tokio::test]
async fn different_photos_proceed_concurrently() {
    let h = harness_with(
        MemoryPhotoRepository::new().with_latency(Duration::from_millis(100)),
        MemoryPhotoRepository::new(),
    );

    let started = tokio::time::Instant::now();
    let (a, b, c) = tokio::join!(
        h.manager.add_photo(photo(1)),
        h.manager.add_photo(photo(2)),
        h.manager.add_photo(photo(3)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert!(started.elapsed() < Duration::from_millis(250));
    assert_eq!(h.manager.photos().len(), 3);
}
