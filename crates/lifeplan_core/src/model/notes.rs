//! Notes tree: folders, files, notes and the notes UI state.
//!
//! # Responsibility
//! - Model the three-level notes hierarchy and its selection state.
//! - Provide the "pinned first, most recent first" ordering used for
//!   selection repair and listings.
//!
//! # Invariants
//! - Every file belongs to an existing folder and every note to an existing
//!   file once a document has passed through `crate::normalize`.
//! - `ui` selections are advisory; invalid ones are repaired, never rejected.

use serde::{Deserialize, Serialize};

/// Folder synthesized when legacy or orphaned content needs a home.
pub const DEFAULT_FOLDER_NAME: &str = "Notes";
/// File synthesized when legacy or orphaned notes need a home.
pub const DEFAULT_FILE_NAME: &str = "General";

/// A top-level notes folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        let now = super::now_ms();
        Self {
            id: super::fresh_id(),
            name: name.into(),
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A note file grouping notes inside a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFile {
    pub id: String,
    pub folder_id: String,
    pub name: String,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NoteFile {
    pub fn new(folder_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = super::now_ms();
        Self {
            id: super::fresh_id(),
            folder_id: folder_id.into(),
            name: name.into(),
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One markdown note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub file_id: String,
    pub title: String,
    pub body: String,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    pub fn new(
        file_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let now = super::now_ms();
        Self {
            id: super::fresh_id(),
            file_id: file_id.into(),
            title: title.into(),
            body: body.into(),
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bumps `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = super::now_ms();
    }
}

/// Current notes-view selection and search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesUiState {
    pub folder_id: Option<String>,
    pub file_id: Option<String>,
    pub note_id: Option<String>,
    pub q: String,
}

/// The per-year notes tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesModel {
    pub folders: Vec<Folder>,
    pub files: Vec<NoteFile>,
    pub notes: Vec<Note>,
    pub ui: NotesUiState,
}

impl NotesModel {
    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == folder_id)
    }

    pub fn file(&self, file_id: &str) -> Option<&NoteFile> {
        self.files.iter().find(|file| file.id == file_id)
    }

    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    pub fn note_mut(&mut self, note_id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == note_id)
    }
}

/// Entities that can be ranked "pinned first, most recent first".
pub(crate) trait PinnedRecency {
    fn pinned(&self) -> bool;
    fn updated_at(&self) -> i64;
}

impl PinnedRecency for Folder {
    fn pinned(&self) -> bool {
        self.pinned
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl PinnedRecency for NoteFile {
    fn pinned(&self) -> bool {
        self.pinned
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl PinnedRecency for Note {
    fn pinned(&self) -> bool {
        self.pinned
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

/// Sorts borrowed entries pinned-first then by recency; ties keep input
/// order.
pub(crate) fn rank_pinned_recency<'a, T: PinnedRecency>(
    items: impl Iterator<Item = &'a T>,
) -> Vec<&'a T> {
    let mut ranked: Vec<&T> = items.collect();
    ranked.sort_by(|a, b| {
        b.pinned()
            .cmp(&a.pinned())
            .then(b.updated_at().cmp(&a.updated_at()))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::{rank_pinned_recency, Note};

    #[test]
    fn ranking_puts_pinned_before_recency() {
        let mut old_pinned = Note::new("f1", "old pinned", "");
        old_pinned.pinned = true;
        old_pinned.updated_at = 10;
        let mut fresh = Note::new("f1", "fresh", "");
        fresh.updated_at = 99;
        let mut stale = Note::new("f1", "stale", "");
        stale.updated_at = 5;

        let notes = vec![stale, fresh, old_pinned];
        let ranked = rank_pinned_recency(notes.iter());
        let titles: Vec<&str> = ranked.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(titles, vec!["old pinned", "fresh", "stale"]);
    }
}
