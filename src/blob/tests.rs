use crate::blob::{BlobStore, BlobStoreError, FakeBlobStore};
use bytes::Bytes;

#[tokio::test]
async fn put_then_get_returns_same_bytes() {
    let store = FakeBlobStore::new();
    let payload = Bytes::from_static(b"artifact bytes");

    store
        .put_object("abc.jpg", payload.clone(), "image/jpeg")
        .await
        .unwrap();

    let fetched = store.get_object("abc.jpg").await.unwrap();
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn put_overwrites_existing_key() {
    let store = FakeBlobStore::new();
    store
        .put_object("abc.jpg", Bytes::from_static(b"one"), "image/jpeg")
        .await
        .unwrap();
    store
        .put_object("abc.jpg", Bytes::from_static(b"two"), "image/jpeg")
        .await
        .unwrap();

    assert_eq!(
        store.get_object("abc.jpg").await.unwrap(),
        Bytes::from_static(b"two")
    );
}

#[tokio::test]
async fn get_missing_key_is_not_found() {
    let store = FakeBlobStore::new();
    let err = store.get_object("nothing-here").await.unwrap_err();
    assert!(err.is_not_found(), "expected ObjectNotFound, got {err}");
}

#[tokio::test]
async fn injected_get_failure_masks_existing_object() {
    let store = FakeBlobStore::new();
    store.fake_add_object("abc.jpg", Bytes::from_static(b"x")).await;
    store.fake_fail_get("abc.jpg").await;

    assert!(store.get_object("abc.jpg").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn injected_put_failure_is_a_write_error() {
    let store = FakeBlobStore::new();
    store.fake_fail_put("abc.jpg").await;

    let err = store
        .put_object("abc.jpg", Bytes::from_static(b"x"), "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, BlobStoreError::WriteError(_, _)));
    assert!(!store.fake_contains("abc.jpg").await);
}

#[tokio::test]
async fn signed_urls_are_unique_and_reference_the_key() {
    let store = FakeBlobStore::new();
    let first = store.signed_url("collage-1.jpg", 36000).await.unwrap();
    let second = store.signed_url("collage-1.jpg", 36000).await.unwrap();

    assert!(first.contains("collage-1.jpg"));
    assert_ne!(first, second);
}

#[tokio::test]
async fn signing_failure_can_be_injected() {
    let store = FakeBlobStore::new();
    store.fake_fail_signing();

    let err = store.signed_url("collage-1.jpg", 36000).await.unwrap_err();
    assert!(matches!(err, BlobStoreError::SigningError(_, _)));
}
