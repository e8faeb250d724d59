use bytes::Bytes;
use softwarehub::object_store::{LocalStore, ObjectStore};

const BASE_URL: &str = "http://localhost:8080";

#[tokio::test]
async fn test_local_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    let data = Bytes::from("hello world");
    store
        .put("software-files", "test-key", data.clone())
        .await
        .unwrap();

    let retrieved = store.get("software-files", "test-key").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_nested_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    // Parent directories are created on demand
    store
        .put("software-files", "software/123-abc.zip", Bytes::from("artifact"))
        .await
        .unwrap();

    let retrieved = store
        .get("software-files", "software/123-abc.zip")
        .await
        .unwrap();
    assert_eq!(retrieved, Bytes::from("artifact"));
}

#[tokio::test]
async fn test_local_store_buckets_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    store
        .put("software-files", "shared-key", Bytes::from("artifact"))
        .await
        .unwrap();

    assert!(store.exists("software-files", "shared-key").await.unwrap());
    assert!(!store.exists("software-images", "shared-key").await.unwrap());
}

#[tokio::test]
async fn test_local_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    assert!(!store.exists("software-files", "missing").await.unwrap());

    store
        .put("software-files", "present", Bytes::from("data"))
        .await
        .unwrap();
    assert!(store.exists("software-files", "present").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    store
        .put("software-files", "to-delete", Bytes::from("data"))
        .await
        .unwrap();
    assert!(store.exists("software-files", "to-delete").await.unwrap());

    store.delete("software-files", "to-delete").await.unwrap();
    assert!(!store.exists("software-files", "to-delete").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    // Deleting a nonexistent key should not error
    store.delete("software-files", "nonexistent").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    let result = store.get("software-files", "missing").await;
    assert!(result.is_err());
    assert!(matches!(
        result.unwrap_err(),
        softwarehub::object_store::ObjectStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_local_store_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), BASE_URL).unwrap();

    store
        .put("software-files", "key", Bytes::from("first"))
        .await
        .unwrap();
    store
        .put("software-files", "key", Bytes::from("second"))
        .await
        .unwrap();

    let data = store.get("software-files", "key").await.unwrap();
    assert_eq!(data, Bytes::from("second"));
}

#[tokio::test]
async fn test_local_store_public_url() {
    let dir = tempfile::tempdir().unwrap();

    let store = LocalStore::new(dir.path(), "http://localhost:8080/").unwrap();
    assert_eq!(
        store.public_url("software-files", "software/123-abc.zip"),
        "http://localhost:8080/files/software-files/software/123-abc.zip"
    );
}
