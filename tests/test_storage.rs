//! Storage-level tests: path resolution, record files, collection aggregation
//! and id allocation, driven directly against a temporary entry root.

use json_rest_server::app::path_locks::PathLocks;
use json_rest_server::domain::{resolver, shallow_merge};
use json_rest_server::storage::{collection, document, ids};
use json_rest_server::{DocumentService, PathKind, StoreError, RECORD_EXTENSION};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn write_raw(path: &Path, content: &str) {
    std::fs::write(path, content).expect("write fixture");
}

#[test]
fn test_resolve_maps_record_and_collection_candidates() {
    let root = Path::new("/srv/data");

    let resolved = resolver::resolve(root, "/posts/3", ".json").expect("resolvable");
    assert_eq!(resolved.dir_path, PathBuf::from("/srv/data/posts/3"));
    assert_eq!(resolved.file_path, Some(PathBuf::from("/srv/data/posts/3.json")));

    let nested = resolver::resolve(root, "/a//b/", ".json").expect("resolvable");
    assert_eq!(nested.dir_path, PathBuf::from("/srv/data/a/b"));
    assert_eq!(nested.file_path, Some(PathBuf::from("/srv/data/a/b.json")));

    let at_root = resolver::resolve(root, "/", ".json").expect("resolvable");
    assert_eq!(at_root.dir_path, PathBuf::from("/srv/data"));
    assert_eq!(at_root.file_path, None);
}

#[test]
fn test_resolve_rejects_dot_segments() {
    let root = Path::new("/srv/data");
    assert!(resolver::resolve(root, "/../etc/passwd", ".json").is_none());
    assert!(resolver::resolve(root, "/posts/./1", ".json").is_none());
    assert!(resolver::resolve(root, "/posts/..", ".json").is_none());
    // Dots inside a segment are ordinary names.
    assert!(resolver::resolve(root, "/posts/v1.2", ".json").is_some());
}

#[test]
fn test_redirect_target_strips_one_trailing_slash() {
    assert_eq!(resolver::redirect_target("/posts/"), Some("/posts"));
    assert_eq!(resolver::redirect_target("/a/b/"), Some("/a/b"));
    assert_eq!(resolver::redirect_target("//"), Some("/"));
    assert_eq!(resolver::redirect_target("/posts"), None);
    assert_eq!(resolver::redirect_target("/"), None);
}

#[tokio::test]
async fn test_kind_distinguishes_file_directory_absent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("posts"))?;
    write_raw(&dir.path().join("about.json"), r#"{"title":"about"}"#);
    // A directory that merely carries the record extension is not a record.
    std::fs::create_dir(dir.path().join("odd.json"))?;

    let kind_of = |p: &str| resolver::resolve(dir.path(), p, RECORD_EXTENSION).unwrap();

    assert_eq!(kind_of("/about").kind().await, PathKind::File);
    assert_eq!(kind_of("/posts").kind().await, PathKind::Directory);
    assert_eq!(kind_of("/").kind().await, PathKind::Directory);
    assert_eq!(kind_of("/missing").kind().await, PathKind::Absent);
    assert_eq!(kind_of("/odd").kind().await, PathKind::Absent);
    Ok(())
}

#[tokio::test]
async fn test_document_read_reports_malformed_content() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let broken = dir.path().join("broken.json");
    write_raw(&broken, "{ this is not json");

    match document::read(&broken).await {
        Err(StoreError::MalformedRecord { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected MalformedRecord, got {:?}", other),
    }

    match document::read(&dir.path().join("missing.json")).await {
        Err(StoreError::Io { .. }) => {}
        other => panic!("expected Io, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_document_write_overwrites_and_leaves_no_temporary() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("item.json");

    document::write(&file, &json!({"a": 1, "b": [1, 2, 3]})).await?;
    document::write(&file, &json!({"c": 4})).await?;

    assert_eq!(document::read(&file).await?, json!({"c": 4}));
    let names: Vec<String> = std::fs::read_dir(dir.path())?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["item.json".to_string()]);

    document::delete(&file).await?;
    assert!(!file.exists());
    assert!(matches!(
        document::delete(&file).await,
        Err(StoreError::Io { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_collection_lists_only_direct_record_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_raw(&dir.path().join("0.json"), r#"{"id":0}"#);
    write_raw(&dir.path().join("1.json"), r#"{"id":1}"#);
    write_raw(&dir.path().join("notes.txt"), "not a record");
    std::fs::create_dir(dir.path().join("nested"))?;
    write_raw(&dir.path().join("nested").join("9.json"), r#"{"id":9}"#);
    std::fs::create_dir(dir.path().join("dir.json"))?;

    let mut files = collection::list(dir.path(), RECORD_EXTENSION).await?;
    files.sort();
    assert_eq!(
        files,
        vec![dir.path().join("0.json"), dir.path().join("1.json")]
    );

    let mut ids: Vec<i64> = collection::aggregate(&files)
        .await?
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec![0, 1]);
    Ok(())
}

#[tokio::test]
async fn test_collection_fails_whole_on_one_malformed_member() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_raw(&dir.path().join("0.json"), r#"{"id":0}"#);
    write_raw(&dir.path().join("1.json"), "nope");

    let result = collection::load(dir.path(), RECORD_EXTENSION).await;
    assert!(matches!(result, Err(StoreError::MalformedRecord { .. })));
    Ok(())
}

#[tokio::test]
async fn test_next_free_id_probes_past_taken_ids() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    assert_eq!(ids::next_free_id(dir.path(), RECORD_EXTENSION).await?, 0);

    write_raw(&dir.path().join("0.json"), "{}");
    write_raw(&dir.path().join("1.json"), "{}");
    assert_eq!(ids::next_free_id(dir.path(), RECORD_EXTENSION).await?, 2);

    // Gap below the count: entries are {0, 2}, so the probe starts at 2 and moves to 3.
    std::fs::remove_file(dir.path().join("1.json"))?;
    write_raw(&dir.path().join("2.json"), "{}");
    assert_eq!(ids::next_free_id(dir.path(), RECORD_EXTENSION).await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_create_record_stamps_sequential_ids() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    for i in 0..3 {
        write_raw(&dir.path().join(format!("{i}.json")), &format!(r#"{{"id":{i}}}"#));
    }

    for expected in 3..6u64 {
        let created = ids::create_record(dir.path(), RECORD_EXTENSION, json!({"name": "x"})).await?;
        assert_eq!(created.id, expected);
        assert_eq!(created.document, json!({"name": "x", "id": expected}));
        assert_eq!(created.file_path, dir.path().join(format!("{expected}.json")));
        assert_eq!(document::read(&created.file_path).await?, created.document);
    }

    // Non-object values are stored untouched.
    let created = ids::create_record(dir.path(), RECORD_EXTENSION, json!([1, 2])).await?;
    assert_eq!(created.id, 6);
    assert_eq!(document::read(&created.file_path).await?, json!([1, 2]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_record_never_collides() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let dir_path = dir.path().to_path_buf();

    let mut handles = Vec::new();
    for n in 0..16 {
        let dir_path = dir_path.clone();
        handles.push(tokio::spawn(async move {
            ids::create_record(&dir_path, RECORD_EXTENSION, json!({ "n": n }))
                .await
                .map(|c| c.id)
        }));
    }

    let mut allocated = Vec::new();
    for handle in handles {
        allocated.push(handle.await??);
    }
    allocated.sort();
    allocated.dedup();
    assert_eq!(allocated.len(), 16);
    assert_eq!(collection::load(&dir_path, RECORD_EXTENSION).await?.len(), 16);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_create_never_leaves_partial_record() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let mut collections = Vec::new();
    for i in 0..600u64 {
        let collection_dir = dir.path().join(format!("c{i}"));
        std::fs::create_dir(&collection_dir)?;
        // Timeouts from 0 to ~300µs land at every await point of the create.
        let _ = tokio::time::timeout(
            Duration::from_micros(i % 300),
            ids::create_record(&collection_dir, RECORD_EXTENSION, json!({ "n": i })),
        )
        .await;
        collections.push(collection_dir);
    }

    // Abandoned blocking filesystem calls may still be finishing.
    tokio::time::sleep(Duration::from_millis(300)).await;

    for collection_dir in &collections {
        for file in collection::list(collection_dir, RECORD_EXTENSION).await? {
            assert!(
                std::fs::metadata(&file)?.len() > 0,
                "empty record left at {}",
                file.display()
            );
            let record = document::read(&file).await?;
            assert!(record["id"].is_u64(), "unstamped record at {}", file.display());
        }
        collection::load(collection_dir, RECORD_EXTENSION).await?;
    }
    Ok(())
}

#[test]
fn test_shallow_merge_overwrites_top_level_keys_only() {
    let merged = shallow_merge(json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4}));
    assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));

    let nested = shallow_merge(
        json!({"meta": {"x": 1, "y": 2}, "keep": true}),
        json!({"meta": {"z": 3}}),
    );
    assert_eq!(nested, json!({"meta": {"z": 3}, "keep": true}));

    assert_eq!(shallow_merge(json!([1]), json!({"a": 1})), json!({"a": 1}));
    assert_eq!(shallow_merge(json!({"a": 1}), json!("text")), json!("text"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_path_locks_serialize_holders() -> Result<(), Box<dyn std::error::Error>> {
    let locks = Arc::new(PathLocks::new());
    let path = PathBuf::from("/srv/data/posts/1.json");

    let guard = locks.lock(&path).await;
    let waiter = {
        let locks = locks.clone();
        let path = path.clone();
        tokio::spawn(async move {
            let _guard = locks.lock(&path).await;
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());
    // Holder and waiter share one entry.
    assert_eq!(locks.len(), 1);

    drop(guard);
    tokio::time::timeout(Duration::from_secs(5), waiter).await??;
    // The last holder removed it on release.
    assert!(locks.is_empty());

    let other = locks.lock(Path::new("/srv/data/other.json")).await;
    assert_eq!(locks.len(), 1);
    drop(other);
    assert!(locks.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_service_mutations_report_absent_records() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let service = DocumentService::new(dir.path().to_path_buf());

    let missing = service.resolve("/posts/7").unwrap();
    assert!(service.replace_record(&missing, json!({})).await?.is_none());
    assert!(service.merge_record(&missing, json!({})).await?.is_none());
    assert!(service.delete_record(&missing).await?.is_none());
    assert!(!dir.path().join("posts").exists());

    let created = service
        .create_record(&dir.path().join("a").join("b"), json!({"k": 1}))
        .await?;
    assert_eq!(created.id, 0);
    assert!(dir.path().join("a").join("b").join("0.json").is_file());

    let existing = service.resolve("/a/b/0").unwrap();
    let merged = service.merge_record(&existing, json!({"j": 2})).await?;
    assert_eq!(merged, Some(json!({"k": 1, "id": 0, "j": 2})));
    Ok(())
}
