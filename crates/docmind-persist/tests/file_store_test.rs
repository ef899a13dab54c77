use docmind_persist::{
    CheckpointStore, Checkpointer, ConversationThread, FileCheckpointStore, PersistError,
    ThreadMessage, ThreadSummary,
};
use std::path::PathBuf;
use std::sync::Arc;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("docmind-checkpoints-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn test_round_trip_through_disk() {
    let store = FileCheckpointStore::new(scratch_dir());

    let mut thread = ConversationThread::new("thread/1");
    thread.messages.push(ThreadMessage::user("What is Laredo?"));
    thread.messages.push(ThreadMessage::assistant("A data science application."));
    thread.summary = Some(ThreadSummary {
        text: "User asked about Laredo.".to_string(),
        generated_at: chrono::Utc::now(),
        messages_count: 2,
    });

    let saved = store.save(thread).await.unwrap();
    assert_eq!(saved.version, 1);

    // A fresh store over the same directory sees the checkpoint
    let reopened = FileCheckpointStore::new(store.dir());
    let loaded = reopened.load("thread/1").await.unwrap().unwrap();
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn test_missing_thread_loads_as_none() {
    let store = FileCheckpointStore::new(scratch_dir());
    assert!(store.load("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupted_file_is_reported() {
    let store = FileCheckpointStore::new(scratch_dir());
    std::fs::create_dir_all(store.dir()).unwrap();
    std::fs::write(store.thread_path("t"), b"{ truncated").unwrap();

    let err = store.load("t").await.unwrap_err();
    assert!(matches!(err, PersistError::Corrupted { .. }));
}

#[tokio::test]
async fn test_version_conflict_on_disk() {
    let store = FileCheckpointStore::new(scratch_dir());
    let v1 = store.save(ConversationThread::new("t")).await.unwrap();
    store.save(v1.clone()).await.unwrap();

    let err = store.save(v1).await.unwrap_err();
    assert!(matches!(err, PersistError::VersionConflict { .. }));
}

#[tokio::test]
async fn test_no_temp_files_left_behind() {
    let store = FileCheckpointStore::new(scratch_dir());
    store.save(ConversationThread::new("a")).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json".to_string()]);
}

#[tokio::test]
async fn test_checkpointer_over_file_store() {
    let store = Arc::new(FileCheckpointStore::new(scratch_dir()));
    let checkpointer = Checkpointer::new(store);

    let lease = checkpointer.begin("t").await.unwrap();
    let mut thread = lease.thread().clone();
    thread.messages.push(ThreadMessage::user("hi"));
    lease.commit(thread).await.unwrap();

    let snapshot = checkpointer.snapshot("t").await.unwrap();
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.version, 1);
}
