// ABOUTME: Tests for the in-memory and JSON file history stores.

use super::store::*;
use crate::llm::{Message, ToolCall};

fn sample_messages() -> Vec<Message> {
    vec![
        Message::human("Hello"),
        Message::ai_with_calls(
            "",
            vec![ToolCall::new("c1", "read_file", serde_json::json!({"path": "a.txt"}))],
        ),
        Message::tool_result("c1", r#"{"success":true,"output":"hi"}"#),
        Message::ai("Hi there!"),
    ]
}

#[tokio::test]
async fn test_memory_store_save_load() {
    let store = MemoryHistoryStore::new();
    store.save("session-1", &sample_messages()).await.unwrap();

    let loaded = store.load("session-1").await.unwrap().unwrap();
    assert_eq!(loaded, sample_messages());
}

#[tokio::test]
async fn test_memory_store_load_nonexistent() {
    let store = MemoryHistoryStore::new();
    assert!(store.load("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_delete_and_list() {
    let store = MemoryHistoryStore::new();
    store.save("a", &sample_messages()).await.unwrap();
    store.save("b", &sample_messages()).await.unwrap();
    store.delete("a").await.unwrap();

    assert_eq!(store.list().await.unwrap(), vec!["b"]);
}

#[tokio::test]
async fn test_json_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path().join("sessions"));

    store.save("session-1", &sample_messages()).await.unwrap();
    assert!(dir.path().join("sessions/session-1.json").exists());

    let loaded = store.load("session-1").await.unwrap().unwrap();
    assert_eq!(loaded, sample_messages());
}

#[tokio::test]
async fn test_json_store_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path());

    store.save("s", &sample_messages()).await.unwrap();
    store.save("s", &[Message::human("Second")]).await.unwrap();

    let loaded = store.load("s").await.unwrap().unwrap();
    assert_eq!(loaded, vec![Message::human("Second")]);
}

#[tokio::test]
async fn test_json_store_missing_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path().join("never-created"));

    assert!(store.load("nobody").await.unwrap().is_none());
    assert!(store.list().await.unwrap().is_empty());
    store.delete("nobody").await.unwrap();
}

#[tokio::test]
async fn test_json_store_list_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path());
    store.save("zeta", &sample_messages()).await.unwrap();
    store.save("alpha", &sample_messages()).await.unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.list().await.unwrap(), vec!["alpha", "zeta"]);
}

#[tokio::test]
async fn test_json_store_rejects_path_like_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path());

    assert!(store.save("../escape", &sample_messages()).await.is_err());
    assert!(store.load("a/b").await.is_err());
    assert!(store.save("", &sample_messages()).await.is_err());
}

#[tokio::test]
async fn test_json_store_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
    let store = JsonFileHistoryStore::new(dir.path());

    let err = store.load("broken").await.unwrap_err();
    assert!(err.to_string().contains("corrupt history file"));
}
