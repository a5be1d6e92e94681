use std::path::Path;
use std::sync::Arc;

use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::api::{ApiResult, RelocationApi};
use crate::models::{
    ChatAnswer, ChatMessage, ChecklistItem, DocumentMeta, NewNote, Note,
};
use crate::store::Cache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    VisionBoard,
    Chat,
    Checklist,
    Notes,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::VisionBoard => "Vision Board",
            Screen::Chat => "Ask Mini-Me",
            Screen::Checklist => "DNV Checklist",
            Screen::Notes => "Knowledge Base",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::VisionBoard => Screen::Chat,
            Screen::Chat => Screen::Checklist,
            Screen::Checklist => Screen::Notes,
            Screen::Notes => Screen::VisionBoard,
        }
    }

    pub fn prev(&self) -> Screen {
        match self {
            Screen::VisionBoard => Screen::Notes,
            Screen::Chat => Screen::VisionBoard,
            Screen::Checklist => Screen::Chat,
            Screen::Notes => Screen::Checklist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which text box is being edited on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    ChatInput,
    UploadPath,
    NoteForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Category,
    Content,
}

impl NoteField {
    pub fn next(&self) -> NoteField {
        match self {
            NoteField::Title => NoteField::Category,
            NoteField::Category => NoteField::Content,
            NoteField::Content => NoteField::Title,
        }
    }
}

/// Upload lifecycle. `Rejected` and `Failed` are terminal until a new file
/// path is entered, which resets to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Rejected(String),
    Uploading,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    ToggleItem,
    DeleteItem,
    CreateNote,
    DeleteNote,
}

struct Fetch<T> {
    filter: Option<String>,
    seq: u64,
    task: JoinHandle<ApiResult<Vec<T>>>,
}

/// Extension must be `.pdf`, case-insensitive. Anything else is rejected
/// before a request is made.
pub fn is_pdf_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub edit_target: EditTarget,

    // Chat state (session-scoped, append-only)
    pub chat_input: String,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_loading: bool,
    pub chat_scroll: u16,

    // Upload state
    pub upload_input: String,
    pub upload: UploadState,
    pub uploaded_documents: Vec<DocumentMeta>,

    // Checklist state
    pub active_category: Option<String>,
    pub checklist_state: ListState,

    // Notes state
    pub notes_state: ListState,
    pub note_form_open: bool,
    pub note_field: NoteField,
    pub note_title: String,
    pub note_category: String,
    pub note_content: String,
    pub note_saving: bool,

    // Status line (mutation/chat failures)
    pub status_message: Option<String>,

    // Animation state
    pub animation_frame: u8,

    // Response caches
    pub checklist: Cache<ChecklistItem>,
    pub notes: Cache<Note>,

    // In-flight work
    chat_task: Option<JoinHandle<ApiResult<ChatAnswer>>>,
    upload_task: Option<JoinHandle<anyhow::Result<DocumentMeta>>>,
    checklist_fetches: Vec<Fetch<ChecklistItem>>,
    notes_fetches: Vec<Fetch<Note>>,
    mutations: Vec<(MutationKind, JoinHandle<ApiResult<()>>)>,

    api: Arc<dyn RelocationApi>,
}

impl App {
    pub fn new(api: Arc<dyn RelocationApi>) -> Self {
        Self {
            should_quit: false,
            screen: Screen::VisionBoard,
            input_mode: InputMode::Normal,
            edit_target: EditTarget::ChatInput,

            chat_input: String::new(),
            chat_messages: Vec::new(),
            chat_loading: false,
            chat_scroll: 0,

            upload_input: String::new(),
            upload: UploadState::Idle,
            uploaded_documents: Vec::new(),

            active_category: None,
            checklist_state: ListState::default(),

            notes_state: ListState::default(),
            note_form_open: false,
            note_field: NoteField::Title,
            note_title: String::new(),
            note_category: String::new(),
            note_content: String::new(),
            note_saving: false,

            status_message: None,
            animation_frame: 0,

            checklist: Cache::new("checklist"),
            notes: Cache::new("notes"),

            chat_task: None,
            upload_task: None,
            checklist_fetches: Vec::new(),
            notes_fetches: Vec::new(),
            mutations: Vec::new(),

            api,
        }
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = match screen {
            // The chat screen drops straight into the input box.
            Screen::Chat => {
                self.edit_target = EditTarget::ChatInput;
                InputMode::Editing
            }
            _ => InputMode::Normal,
        };
        self.ensure_screen_data();
    }

    /// Fetch whatever the current screen shows, if its cache entry is
    /// missing or stale.
    pub fn ensure_screen_data(&mut self) {
        match self.screen {
            Screen::Checklist => {
                if self.checklist.should_fetch(self.active_category.as_deref()) {
                    self.spawn_checklist_fetch();
                }
            }
            Screen::Notes => {
                if self.notes.should_fetch(None) {
                    self.spawn_notes_fetch();
                }
            }
            Screen::VisionBoard | Screen::Chat => {}
        }
    }

    // ----- chat -----

    /// Append the user's message and spawn the request. Whitespace-only
    /// input sends nothing; an in-flight request gates resubmission.
    pub fn send_chat(&mut self) {
        let query = self.chat_input.trim().to_string();
        if query.is_empty() || self.chat_loading {
            return;
        }
        self.chat_input.clear();
        self.chat_messages.push(ChatMessage::user(query.clone()));
        self.chat_loading = true;

        let api = Arc::clone(&self.api);
        self.chat_task = Some(tokio::spawn(async move { api.chat(&query).await }));
    }

    // ----- document upload -----

    pub fn open_upload_prompt(&mut self) {
        self.upload = UploadState::Idle;
        self.upload_input.clear();
        self.edit_target = EditTarget::UploadPath;
        self.input_mode = InputMode::Editing;
    }

    /// Validate the chosen path and, if it names a PDF, read and upload it.
    pub fn submit_upload(&mut self) {
        if self.upload == UploadState::Uploading {
            return;
        }
        let path = self.upload_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        let filename = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        if !is_pdf_filename(&filename) {
            self.upload = UploadState::Rejected("Only PDF files are accepted.".to_string());
            return;
        }

        self.upload = UploadState::Uploading;
        let api = Arc::clone(&self.api);
        self.upload_task = Some(tokio::spawn(async move {
            let bytes = tokio::fs::read(&path).await?;
            Ok(api.upload_document(&filename, bytes).await?)
        }));
    }

    // ----- checklist -----

    /// Select a category filter; re-selecting the active one clears it.
    /// Either way a read is issued for the newly active key.
    pub fn set_category(&mut self, category: &str) {
        if self.active_category.as_deref() == Some(category) {
            self.active_category = None;
        } else {
            self.active_category = Some(category.to_string());
        }
        self.checklist_state.select(None);
        if !self.checklist.is_loading(self.active_category.as_deref()) {
            self.spawn_checklist_fetch();
        }
    }

    pub fn refresh_checklist(&mut self) {
        if !self.checklist.is_loading(self.active_category.as_deref()) {
            self.spawn_checklist_fetch();
        }
    }

    fn spawn_checklist_fetch(&mut self) {
        let filter = self.active_category.clone();
        let seq = self.checklist.begin_fetch(filter.as_deref());
        let api = Arc::clone(&self.api);
        let task_filter = filter.clone();
        let task = tokio::spawn(async move { api.list_checklist(task_filter.as_deref()).await });
        self.checklist_fetches.push(Fetch { filter, seq, task });
    }

    pub fn visible_checklist(&self) -> &[ChecklistItem] {
        self.checklist.data(self.active_category.as_deref())
    }

    pub fn selected_item(&self) -> Option<&ChecklistItem> {
        self.checklist_state
            .selected()
            .and_then(|i| self.visible_checklist().get(i))
    }

    /// Toggle the selected item's status. The next status is computed
    /// client-side and only the new value goes over the wire.
    pub fn toggle_selected_item(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id.clone();
        let next = item.status.toggled();
        let api = Arc::clone(&self.api);
        self.mutations.push((
            MutationKind::ToggleItem,
            tokio::spawn(async move { api.update_checklist_status(&id, next).await }),
        ));
    }

    pub fn delete_selected_item(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id.clone();
        let api = Arc::clone(&self.api);
        self.mutations.push((
            MutationKind::DeleteItem,
            tokio::spawn(async move { api.delete_checklist_item(&id).await }),
        ));
    }

    // ----- notes -----

    pub fn refresh_notes(&mut self) {
        if !self.notes.is_loading(None) {
            self.spawn_notes_fetch();
        }
    }

    fn spawn_notes_fetch(&mut self) {
        let seq = self.notes.begin_fetch(None);
        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move { api.list_notes().await });
        self.notes_fetches.push(Fetch {
            filter: None,
            seq,
            task,
        });
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.notes_state.selected().and_then(|i| self.notes.data(None).get(i))
    }

    pub fn open_note_form(&mut self) {
        self.note_form_open = true;
        self.note_field = NoteField::Title;
        self.edit_target = EditTarget::NoteForm;
        self.input_mode = InputMode::Editing;
    }

    pub fn close_note_form(&mut self) {
        self.note_form_open = false;
        self.input_mode = InputMode::Normal;
    }

    pub fn note_field_mut(&mut self) -> &mut String {
        match self.note_field {
            NoteField::Title => &mut self.note_title,
            NoteField::Category => &mut self.note_category,
            NoteField::Content => &mut self.note_content,
        }
    }

    /// Send the form as entered; the category is omitted when blank. Fields
    /// reset only once the server confirms the create.
    pub fn submit_note(&mut self) {
        if self.note_saving {
            return;
        }
        if self.note_title.trim().is_empty() || self.note_content.trim().is_empty() {
            return;
        }
        let category = match self.note_category.trim() {
            "" => None,
            c => Some(c.to_string()),
        };
        let note = NewNote {
            title: self.note_title.clone(),
            content: self.note_content.clone(),
            category,
        };
        self.note_saving = true;
        let api = Arc::clone(&self.api);
        self.mutations.push((
            MutationKind::CreateNote,
            tokio::spawn(async move { api.create_note(&note).await.map(|_| ()) }),
        ));
    }

    pub fn delete_selected_note(&mut self) {
        let Some(note) = self.selected_note() else {
            return;
        };
        let id = note.id.clone();
        let api = Arc::clone(&self.api);
        self.mutations.push((
            MutationKind::DeleteNote,
            tokio::spawn(async move { api.delete_note(&id).await }),
        ));
    }

    // ----- task polling -----

    pub fn has_pending_work(&self) -> bool {
        self.chat_task.is_some()
            || self.upload_task.is_some()
            || !self.checklist_fetches.is_empty()
            || !self.notes_fetches.is_empty()
            || !self.mutations.is_empty()
    }

    /// Apply every finished background task. Called once per event-loop
    /// iteration; unfinished tasks are left in place.
    pub async fn poll_tasks(&mut self) {
        self.poll_chat().await;
        self.poll_upload().await;
        self.poll_fetches().await;
        self.poll_mutations().await;
    }

    async fn poll_chat(&mut self) {
        let task = match self.chat_task.take() {
            Some(task) if task.is_finished() => task,
            other => {
                self.chat_task = other;
                return;
            }
        };
        self.chat_loading = false;
        match task.await {
            Ok(Ok(answer)) => {
                self.chat_messages
                    .push(ChatMessage::assistant(answer.answer, answer.sources));
            }
            Ok(Err(err)) => {
                warn!(%err, "chat request failed");
                self.status_message = Some("Chat request failed. Please try again.".to_string());
            }
            Err(err) => {
                warn!(%err, "chat task panicked");
                self.status_message = Some("Chat request failed. Please try again.".to_string());
            }
        }
    }

    async fn poll_upload(&mut self) {
        let task = match self.upload_task.take() {
            Some(task) if task.is_finished() => task,
            other => {
                self.upload_task = other;
                return;
            }
        };
        match task.await {
            Ok(Ok(meta)) => {
                self.upload = UploadState::Succeeded(format!(
                    "{} uploaded successfully ({} chunks).",
                    meta.filename,
                    meta.chunks()
                ));
                self.uploaded_documents.push(meta);
            }
            Ok(Err(err)) => {
                warn!(%err, "upload failed");
                self.upload = UploadState::Failed("Upload failed. Please try again.".to_string());
            }
            Err(err) => {
                warn!(%err, "upload task panicked");
                self.upload = UploadState::Failed("Upload failed. Please try again.".to_string());
            }
        }
    }

    async fn poll_fetches(&mut self) {
        let mut i = 0;
        while i < self.checklist_fetches.len() {
            if !self.checklist_fetches[i].task.is_finished() {
                i += 1;
                continue;
            }
            let fetch = self.checklist_fetches.remove(i);
            let result = match fetch.task.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(%err, "checklist fetch task panicked");
                    continue;
                }
            };
            self.checklist
                .apply(fetch.filter.as_deref(), fetch.seq, result);
        }

        let mut i = 0;
        while i < self.notes_fetches.len() {
            if !self.notes_fetches[i].task.is_finished() {
                i += 1;
                continue;
            }
            let fetch = self.notes_fetches.remove(i);
            let result = match fetch.task.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(%err, "notes fetch task panicked");
                    continue;
                }
            };
            self.notes.apply(fetch.filter.as_deref(), fetch.seq, result);
        }
    }

    async fn poll_mutations(&mut self) {
        let mut i = 0;
        while i < self.mutations.len() {
            if !self.mutations[i].1.is_finished() {
                i += 1;
                continue;
            }
            let (kind, task) = self.mutations.remove(i);
            let result = match task.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(%err, "mutation task panicked");
                    self.report_mutation_failure(kind);
                    continue;
                }
            };
            match result {
                Ok(()) => self.apply_mutation_success(kind),
                Err(err) => {
                    warn!(%err, ?kind, "mutation failed");
                    self.report_mutation_failure(kind);
                }
            }
        }
    }

    /// On success: invalidate every cache entry of the resource and re-fetch
    /// the active key so the list reflects the write.
    fn apply_mutation_success(&mut self, kind: MutationKind) {
        match kind {
            MutationKind::ToggleItem | MutationKind::DeleteItem => {
                self.checklist.invalidate();
                self.spawn_checklist_fetch();
            }
            MutationKind::CreateNote => {
                self.note_saving = false;
                self.note_title.clear();
                self.note_category.clear();
                self.note_content.clear();
                self.note_field = NoteField::Title;
                self.notes.invalidate();
                self.spawn_notes_fetch();
            }
            MutationKind::DeleteNote => {
                self.notes_state.select(None);
                self.notes.invalidate();
                self.spawn_notes_fetch();
            }
        }
    }

    /// On failure the cache is left untouched; a generic message is all the
    /// user sees.
    fn report_mutation_failure(&mut self, kind: MutationKind) {
        let message = match kind {
            MutationKind::ToggleItem => "Couldn't update the checklist item.",
            MutationKind::DeleteItem => "Couldn't delete the checklist item.",
            MutationKind::CreateNote => {
                self.note_saving = false;
                "Couldn't save the note."
            }
            MutationKind::DeleteNote => "Couldn't delete the note.",
        };
        self.status_message = Some(message.to_string());
    }

    // ----- list navigation -----

    pub fn checklist_nav_down(&mut self) {
        let len = self.visible_checklist().len();
        if len > 0 {
            let i = self.checklist_state.selected().unwrap_or(0);
            self.checklist_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn checklist_nav_up(&mut self) {
        if !self.visible_checklist().is_empty() {
            let i = self.checklist_state.selected().unwrap_or(0);
            self.checklist_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn notes_nav_down(&mut self) {
        let len = self.notes.data(None).len();
        if len > 0 {
            let i = self.notes_state.selected().unwrap_or(0);
            self.notes_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn notes_nav_up(&mut self) {
        if !self.notes.data(None).is_empty() {
            let i = self.notes_state.selected().unwrap_or(0);
            self.notes_state.select(Some(i.saturating_sub(1)));
        }
    }
}
