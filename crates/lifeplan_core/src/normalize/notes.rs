//! Notes tree normalization and selection repair.
//!
//! Two stored layouts exist: the legacy flat note list and the structured
//! folders/files/notes tree. Both end up in the structured shape here, with
//! every orphan re-homed and the UI selection repaired by reselection.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::notes::{
    rank_pinned_recency, Folder, Note, NoteFile, NotesModel, NotesUiState, DEFAULT_FILE_NAME,
    DEFAULT_FOLDER_NAME,
};
use crate::model::{date_to_ms, fresh_id};
use crate::normalize::value::{
    array, epoch_ms_or, field, id_or_fresh, opt_id, string_or_empty, truthy,
};

pub(crate) fn normalize_notes(raw: &Value, today: NaiveDate) -> NotesModel {
    match raw {
        Value::Array(entries) => from_legacy_list(entries, today),
        _ => {
            let folders = array(field(raw, "folders"))
                .iter()
                .map(|entry| normalize_folder(entry, today))
                .collect();
            let files = array(field(raw, "files"))
                .iter()
                .map(|entry| normalize_file(entry, today))
                .collect();
            let notes = array(field(raw, "notes"))
                .iter()
                .map(|entry| normalize_note(entry, None, today))
                .collect();
            repair(folders, files, notes, field(raw, "ui"), today)
        }
    }
}

/// Migrates the legacy flat note list into a synthesized folder/file chain.
fn from_legacy_list(entries: &[Value], today: NaiveDate) -> NotesModel {
    let folder = synthesized_folder(today);
    let file = synthesized_file(&folder.id, today);
    let notes = entries
        .iter()
        .map(|entry| normalize_note(entry, Some(file.id.as_str()), today))
        .collect();
    repair(vec![folder], vec![file], notes, &Value::Null, today)
}

fn synthesized_folder(today: NaiveDate) -> Folder {
    let stamp = date_to_ms(today);
    Folder {
        id: fresh_id(),
        name: DEFAULT_FOLDER_NAME.to_string(),
        pinned: false,
        created_at: stamp,
        updated_at: stamp,
    }
}

fn synthesized_file(folder_id: &str, today: NaiveDate) -> NoteFile {
    let stamp = date_to_ms(today);
    NoteFile {
        id: fresh_id(),
        folder_id: folder_id.to_string(),
        name: DEFAULT_FILE_NAME.to_string(),
        pinned: false,
        created_at: stamp,
        updated_at: stamp,
    }
}

fn normalize_folder(raw: &Value, today: NaiveDate) -> Folder {
    let created_at = epoch_ms_or(field(raw, "createdAt"), date_to_ms(today));
    Folder {
        id: id_or_fresh(field(raw, "id")),
        name: string_or_empty(field(raw, "name")),
        pinned: truthy(field(raw, "pinned")),
        created_at,
        updated_at: epoch_ms_or(field(raw, "updatedAt"), created_at),
    }
}

fn normalize_file(raw: &Value, today: NaiveDate) -> NoteFile {
    let created_at = epoch_ms_or(field(raw, "createdAt"), date_to_ms(today));
    NoteFile {
        id: id_or_fresh(field(raw, "id")),
        folder_id: string_or_empty(field(raw, "folderId")),
        name: string_or_empty(field(raw, "name")),
        pinned: truthy(field(raw, "pinned")),
        created_at,
        updated_at: epoch_ms_or(field(raw, "updatedAt"), created_at),
    }
}

/// Normalizes one note; legacy entries store their body under `text`.
fn normalize_note(raw: &Value, forced_file_id: Option<&str>, today: NaiveDate) -> Note {
    let created_at = epoch_ms_or(field(raw, "createdAt"), date_to_ms(today));
    let body_raw = field(raw, "body");
    let body = if body_raw.is_null() {
        string_or_empty(field(raw, "text"))
    } else {
        string_or_empty(body_raw)
    };
    Note {
        id: id_or_fresh(field(raw, "id")),
        file_id: match forced_file_id {
            Some(file_id) => file_id.to_string(),
            None => string_or_empty(field(raw, "fileId")),
        },
        title: string_or_empty(field(raw, "title")),
        body,
        pinned: truthy(field(raw, "pinned")),
        created_at,
        updated_at: epoch_ms_or(field(raw, "updatedAt"), created_at),
    }
}

/// Re-homes orphans, synthesizes missing containers and repairs the UI
/// selection.
fn repair(
    mut folders: Vec<Folder>,
    mut files: Vec<NoteFile>,
    mut notes: Vec<Note>,
    ui_raw: &Value,
    today: NaiveDate,
) -> NotesModel {
    if folders.is_empty() && !(files.is_empty() && notes.is_empty()) {
        folders.push(synthesized_folder(today));
    }

    if let Some(first_folder_id) = folders.first().map(|folder| folder.id.clone()) {
        let folder_ids: BTreeSet<&str> =
            folders.iter().map(|folder| folder.id.as_str()).collect();
        for file in &mut files {
            if !folder_ids.contains(file.folder_id.as_str()) {
                file.folder_id = first_folder_id.clone();
            }
        }
        if files.is_empty() && !notes.is_empty() {
            files.push(synthesized_file(&first_folder_id, today));
        }
    }

    // Orphaned notes land in the first file of the first folder.
    let file_ids: BTreeSet<&str> = files.iter().map(|file| file.id.as_str()).collect();
    let home_file_id = folders
        .first()
        .and_then(|folder| files.iter().find(|file| file.folder_id == folder.id))
        .or_else(|| files.first())
        .map(|file| file.id.clone());
    if let Some(home) = &home_file_id {
        for note in &mut notes {
            if !file_ids.contains(note.file_id.as_str()) {
                note.file_id = home.clone();
            }
        }
    }

    let ui = repair_ui(ui_raw, &folders, &files, &notes);
    NotesModel {
        folders,
        files,
        notes,
        ui,
    }
}

/// Keeps valid selections; invalid ones reselect the first candidate,
/// pinned entries first, then by recency.
fn repair_ui(raw: &Value, folders: &[Folder], files: &[NoteFile], notes: &[Note]) -> NotesUiState {
    let folder_id = opt_id(field(raw, "folderId"))
        .filter(|id| folders.iter().any(|folder| folder.id == *id))
        .or_else(|| {
            rank_pinned_recency(folders.iter())
                .first()
                .map(|folder| folder.id.clone())
        });

    let files_in_folder: Vec<&NoteFile> = match &folder_id {
        Some(folder_id) => files
            .iter()
            .filter(|file| file.folder_id == *folder_id)
            .collect(),
        None => Vec::new(),
    };
    let file_id = opt_id(field(raw, "fileId"))
        .filter(|id| files_in_folder.iter().any(|file| file.id == *id))
        .or_else(|| {
            rank_pinned_recency(files_in_folder.iter().copied())
                .first()
                .map(|file| file.id.clone())
        });

    let notes_in_file: Vec<&Note> = match &file_id {
        Some(file_id) => notes.iter().filter(|note| note.file_id == *file_id).collect(),
        None => Vec::new(),
    };
    let note_id = opt_id(field(raw, "noteId"))
        .filter(|id| notes_in_file.iter().any(|note| note.id == *id))
        .or_else(|| {
            rank_pinned_recency(notes_in_file.iter().copied())
                .first()
                .map(|note| note.id.clone())
        });

    NotesUiState {
        folder_id,
        file_id,
        note_id,
        q: string_or_empty(field(raw, "q")),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_notes;
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn files_without_folders_get_a_synthesized_home() {
        let model = normalize_notes(
            &json!({"files": [{"id": "f1", "folderId": "ghost", "name": "Inbox"}]}),
            today(),
        );
        assert_eq!(model.folders.len(), 1);
        assert_eq!(model.folders[0].name, "Notes");
        assert_eq!(model.files[0].folder_id, model.folders[0].id);
    }

    #[test]
    fn orphan_note_lands_in_first_file_of_first_folder() {
        let model = normalize_notes(
            &json!({
                "folders": [
                    {"id": "fo1", "name": "A"},
                    {"id": "fo2", "name": "B"}
                ],
                "files": [
                    {"id": "fi2", "folderId": "fo2", "name": "second"},
                    {"id": "fi1", "folderId": "fo1", "name": "first"}
                ],
                "notes": [{"id": "n1", "fileId": "ghost", "title": "lost"}]
            }),
            today(),
        );
        // fi1 is the first file belonging to the first folder.
        assert_eq!(model.notes[0].file_id, "fi1");
    }

    #[test]
    fn valid_ui_selection_is_kept() {
        let model = normalize_notes(
            &json!({
                "folders": [{"id": "fo1", "name": "A"}],
                "files": [{"id": "fi1", "folderId": "fo1", "name": "x"}],
                "notes": [
                    {"id": "n1", "fileId": "fi1", "title": "one"},
                    {"id": "n2", "fileId": "fi1", "title": "two"}
                ],
                "ui": {"folderId": "fo1", "fileId": "fi1", "noteId": "n2", "q": "tax"}
            }),
            today(),
        );
        assert_eq!(model.ui.note_id.as_deref(), Some("n2"));
        assert_eq!(model.ui.q, "tax");
    }
}
