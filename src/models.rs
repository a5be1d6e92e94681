use serde::{Deserialize, Serialize};

/// Checklist categories accepted by the backend.
pub const CHECKLIST_CATEGORIES: [&str; 5] =
    ["documents", "insurance", "financial", "dependent", "admin"];

/// Note categories accepted by the backend.
pub const NOTE_CATEGORIES: [&str; 6] =
    ["decisions", "visa", "city", "housing", "finance", "general"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the session transcript. Append-only, never persisted.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Reference identifiers attached by the assistant; empty for user messages.
    pub sources: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            sources,
        }
    }
}

/// Response body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Pending,
    InProgress,
    Done,
}

impl ChecklistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Pending => "pending",
            ChecklistStatus::InProgress => "in_progress",
            ChecklistStatus::Done => "done",
        }
    }

    /// Next status after a toggle. The client only ever flips between
    /// `pending` and `done`; `in_progress` items toggle to `done`.
    pub fn toggled(&self) -> ChecklistStatus {
        match self {
            ChecklistStatus::Done => ChecklistStatus::Pending,
            _ => ChecklistStatus::Done,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub status: ChecklistStatus,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Body of `PATCH /checklist/{id}`. Carries only the new status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ChecklistStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    /// Date portion of the server timestamp, for list display.
    pub fn created_date(&self) -> &str {
        self.created_at
            .split_once('T')
            .map(|(date, _)| date)
            .unwrap_or(&self.created_at)
    }
}

/// Body of `POST /notes`. An empty category is omitted from the payload
/// entirely, never sent as a blank string.
#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Response body of `POST /documents/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub chunk_count: Option<u32>,
}

impl DocumentMeta {
    pub fn chunks(&self) -> u32 {
        self.chunk_count.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_pending_and_done() {
        assert_eq!(ChecklistStatus::Pending.toggled(), ChecklistStatus::Done);
        assert_eq!(ChecklistStatus::Done.toggled(), ChecklistStatus::Pending);
        assert_eq!(ChecklistStatus::InProgress.toggled(), ChecklistStatus::Done);
    }

    #[test]
    fn status_serializes_snake_case() {
        let body = serde_json::to_string(&StatusUpdate {
            status: ChecklistStatus::InProgress,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"in_progress"}"#);
    }

    #[test]
    fn new_note_omits_empty_category() {
        let body = serde_json::to_string(&NewNote {
            title: "Empadronamiento".into(),
            content: "Register at the town hall within 3 months".into(),
            category: None,
        })
        .unwrap();
        assert!(!body.contains("category"));

        let body = serde_json::to_string(&NewNote {
            title: "Empadronamiento".into(),
            content: "Register at the town hall within 3 months".into(),
            category: Some("admin".into()),
        })
        .unwrap();
        assert!(body.contains(r#""category":"admin""#));
    }

    #[test]
    fn note_created_date_strips_time() {
        let note = Note {
            id: "n1".into(),
            title: "t".into(),
            content: "c".into(),
            category: None,
            created_at: "2026-03-01T09:30:00".into(),
            updated_at: "2026-03-01T09:30:00".into(),
        };
        assert_eq!(note.created_date(), "2026-03-01");
    }
}
