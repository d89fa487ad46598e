use chrono::NaiveDate;
use lifeplan_core::normalize_document_at;
use lifeplan_core::NotesModel;
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn notes_of(raw: serde_json::Value) -> NotesModel {
    let doc = normalize_document_at(json!({"years": {"2025": {"notes": raw}}}), today());
    doc.years.get(&2025).unwrap().notes.clone()
}

#[test]
fn legacy_note_array_migrates_into_default_tree() {
    let notes = notes_of(json!([
        {"id": "n1", "title": "First", "text": "alpha"},
        {"id": "n2", "title": "Second", "text": "beta"}
    ]));

    assert_eq!(notes.folders.len(), 1);
    assert_eq!(notes.folders[0].name, "Notes");
    assert_eq!(notes.files.len(), 1);
    assert_eq!(notes.files[0].name, "General");
    assert_eq!(notes.files[0].folder_id, notes.folders[0].id);

    assert_eq!(notes.notes.len(), 2);
    for note in &notes.notes {
        assert_eq!(note.file_id, notes.files[0].id);
    }
    assert_eq!(notes.notes[0].body, "alpha", "legacy text becomes the body");

    assert_eq!(notes.ui.folder_id.as_deref(), Some(notes.folders[0].id.as_str()));
    assert_eq!(notes.ui.file_id.as_deref(), Some(notes.files[0].id.as_str()));
    assert_eq!(notes.ui.note_id.as_deref(), Some("n1"));
}

#[test]
fn orphan_notes_rehome_to_first_file_of_first_folder() {
    let notes = notes_of(json!({
        "folders": [
            {"id": "fo1", "name": "Primary"},
            {"id": "fo2", "name": "Secondary"}
        ],
        "files": [
            {"id": "f2", "folderId": "fo2", "name": "Elsewhere"},
            {"id": "f1", "folderId": "fo1", "name": "Inbox"}
        ],
        "notes": [
            {"id": "n1", "fileId": "ghost", "title": "Lost"},
            {"id": "n2", "fileId": "f2", "title": "Kept"}
        ]
    }));

    let lost = notes.notes.iter().find(|note| note.id == "n1").unwrap();
    let kept = notes.notes.iter().find(|note| note.id == "n2").unwrap();
    assert_eq!(lost.file_id, "f1", "orphans land under the first folder");
    assert_eq!(kept.file_id, "f2");
}

#[test]
fn files_with_dead_folder_get_rehomed() {
    let notes = notes_of(json!({
        "folders": [{"id": "fo1", "name": "Primary"}],
        "files": [{"id": "f1", "folderId": "ghost", "name": "Inbox"}]
    }));

    assert_eq!(notes.files[0].folder_id, "fo1");
}

#[test]
fn notes_without_any_containers_get_a_synthesized_chain() {
    let notes = notes_of(json!({
        "notes": [{"id": "n1", "title": "Alone"}]
    }));

    assert_eq!(notes.folders.len(), 1);
    assert_eq!(notes.folders[0].name, "Notes");
    assert_eq!(notes.files.len(), 1);
    assert_eq!(notes.files[0].name, "General");
    assert_eq!(notes.notes[0].file_id, notes.files[0].id);
}

#[test]
fn stale_ui_selection_reselects_pinned_then_recent() {
    let notes = notes_of(json!({
        "folders": [
            {"id": "fo1", "name": "Old", "updatedAt": 100},
            {"id": "fo2", "name": "Pinned", "pinned": true, "updatedAt": 50}
        ],
        "files": [
            {"id": "f1", "folderId": "fo2", "name": "Stale", "updatedAt": 10},
            {"id": "f2", "folderId": "fo2", "name": "Fresh", "updatedAt": 20}
        ],
        "notes": [
            {"id": "n1", "fileId": "f2", "title": "Older", "updatedAt": 5},
            {"id": "n2", "fileId": "f2", "title": "Newer", "updatedAt": 9}
        ],
        "ui": {"folderId": "missing", "fileId": "missing", "noteId": "missing", "q": "hi"}
    }));

    assert_eq!(notes.ui.folder_id.as_deref(), Some("fo2"), "pinned wins over recency");
    assert_eq!(notes.ui.file_id.as_deref(), Some("f2"), "then most recently updated");
    assert_eq!(notes.ui.note_id.as_deref(), Some("n2"));
    assert_eq!(notes.ui.q, "hi");
}

#[test]
fn valid_ui_selection_is_left_alone() {
    let notes = notes_of(json!({
        "folders": [{"id": "fo1", "name": "A"}, {"id": "fo2", "name": "B"}],
        "files": [
            {"id": "f1", "folderId": "fo1", "name": "One"},
            {"id": "f2", "folderId": "fo2", "name": "Two"}
        ],
        "notes": [{"id": "n1", "fileId": "f2", "title": "Here"}],
        "ui": {"folderId": "fo2", "fileId": "f2", "noteId": "n1"}
    }));

    assert_eq!(notes.ui.folder_id.as_deref(), Some("fo2"));
    assert_eq!(notes.ui.file_id.as_deref(), Some("f2"));
    assert_eq!(notes.ui.note_id.as_deref(), Some("n1"));
}

#[test]
fn file_selection_is_scoped_to_the_selected_folder() {
    // f1 exists but belongs to another folder, so it cannot stay selected.
    let notes = notes_of(json!({
        "folders": [{"id": "fo1", "name": "A"}, {"id": "fo2", "name": "B"}],
        "files": [
            {"id": "f1", "folderId": "fo1", "name": "One"},
            {"id": "f2", "folderId": "fo2", "name": "Two"}
        ],
        "ui": {"folderId": "fo2", "fileId": "f1"}
    }));

    assert_eq!(notes.ui.folder_id.as_deref(), Some("fo2"));
    assert_eq!(notes.ui.file_id.as_deref(), Some("f2"));
}

#[test]
fn empty_notes_stay_empty() {
    let notes = notes_of(json!({}));

    assert!(notes.folders.is_empty());
    assert!(notes.files.is_empty());
    assert!(notes.notes.is_empty());
    assert_eq!(notes.ui.folder_id, None);
    assert_eq!(notes.ui.file_id, None);
    assert_eq!(notes.ui.note_id, None);
}
