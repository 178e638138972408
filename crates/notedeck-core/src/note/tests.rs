//! Tests for note types

use super::*;
use chrono::{Datelike, Timelike};

#[test]
fn test_note_from_backend_json() {
    let note: Note = serde_json::from_value(serde_json::json!({
        "id": "66a1f0c2e4b0a1b2c3d4e5f6",
        "title": "Groceries",
        "content": "milk, eggs",
        "createdAt": "2024-05-01T10:15:30.123",
        "updatedAt": "2024-05-02T08:00:00"
    }))
    .unwrap();

    assert_eq!(note.id.as_str(), "66a1f0c2e4b0a1b2c3d4e5f6");
    assert_eq!(note.title, "Groceries");

    let created = note.created_at.unwrap();
    assert_eq!(created.year(), 2024);
    assert_eq!(created.hour(), 10);
    assert_eq!(created.minute(), 15);
    assert!(note.updated_at.is_some());
}

#[test]
fn test_note_with_rfc3339_timestamp() {
    let note: Note = serde_json::from_value(serde_json::json!({
        "id": "n1",
        "title": "t",
        "content": "c",
        "createdAt": "2024-05-01T12:00:00+02:00"
    }))
    .unwrap();

    assert_eq!(note.created_at.unwrap().hour(), 10);
    assert_eq!(note.updated_at, None);
}

#[test]
fn test_numeric_note_id() {
    let note: Note = serde_json::from_value(serde_json::json!({
        "id": 42,
        "title": "numbered",
        "content": ""
    }))
    .unwrap();

    assert_eq!(note.id, NoteId::new("42"));
    assert_eq!(note.created_at, None);
}

#[test]
fn test_invalid_timestamp_rejected() {
    let result: std::result::Result<Note, _> = serde_json::from_value(serde_json::json!({
        "id": "n1",
        "title": "t",
        "content": "c",
        "createdAt": "yesterday"
    }));
    assert!(result.is_err());
}

#[test]
fn test_missing_title_rejected() {
    let result: std::result::Result<Note, _> =
        serde_json::from_value(serde_json::json!({"id": "n1", "content": "c"}));
    assert!(result.is_err());
}

#[test]
fn test_null_text_fields_in_list() {
    let notes: Vec<Note> = serde_json::from_str(
        r#"[
            {"id": "n1", "title": "ok", "content": "c"},
            {"id": "n2", "title": "t", "content": null, "createdAt": null},
            {"id": "n3", "title": null, "content": "body"}
        ]"#,
    )
    .unwrap();

    assert_eq!(notes.len(), 3);
    assert_eq!(notes[1].content, "");
    assert_eq!(notes[1].created_at, None);
    assert_eq!(notes[2].title, "");
    assert_eq!(notes[2].content, "body");
}

#[test]
fn test_draft_from_note() {
    let note = Note {
        id: NoteId::new("n1"),
        title: "Title".to_string(),
        content: "Body".to_string(),
        created_at: None,
        updated_at: None,
    };

    let draft = NoteDraft::from(&note);
    assert_eq!(draft, NoteDraft::new("Title", "Body"));
    assert!(!draft.is_blank());
    assert!(NoteDraft::default().is_blank());
}
