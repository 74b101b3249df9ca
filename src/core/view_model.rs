//! List view-model: state, actions and the pure reducer between them
//!
//! The UI never mutates [`ViewState`] directly. It sends an [`Action`] through
//! [`reduce`], which returns the next state plus the [`Effect`]s to run. Effects
//! are network calls; their completions come back as actions. A successful
//! save or delete always ends in a full re-fetch, never a local merge.

use crate::core::book::{project, Book, SortOrder};
use crate::core::draft::DraftState;
use crate::store::{Ack, SaveRequest, StoreError};

/// Everything the book screen renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Last collection fetched from the store
    pub books: Vec<Book>,
    pub sort_order: SortOrder,
    /// Whether the HTML preview pane is shown
    pub show_preview: bool,
    /// Snapshot of the draft markup taken when the preview was opened
    pub preview_buffer: String,
    pub draft: DraftState,
    /// Most recent failure, shown until dismissed
    pub last_error: Option<String>,
}

impl ViewState {
    /// The books in display order
    pub fn projection(&self) -> Vec<&Book> {
        project(&self.books, self.sort_order)
    }
}

/// Something that happened: a user request or a network completion
#[derive(Debug)]
pub enum Action {
    Refresh,
    Fetched(Result<Vec<Book>, StoreError>),
    SetSortOrder(SortOrder),
    TogglePreview,
    EditDraft(DraftState),
    SubmitSave,
    Saved(Result<Ack, StoreError>),
    SubmitDelete(i64),
    Deleted(Result<Ack, StoreError>),
    Download,
    DismissError,
}

/// Work for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    Save(SaveRequest),
    Delete(i64),
    Download,
}

/// Apply one action to the state
pub fn reduce(state: ViewState, action: Action) -> (ViewState, Vec<Effect>) {
    match action {
        Action::Refresh => (state, vec![Effect::Fetch]),
        Action::Fetched(Ok(books)) => {
            tracing::info!("Loaded {} books", books.len());
            let state = ViewState {
                books,
                last_error: None,
                ..state
            };
            (state, Vec::new())
        }
        Action::Fetched(Err(e)) => {
            tracing::error!("Error fetching books: {}", e);
            (failed(state, format!("Could not fetch books: {}", e)), Vec::new())
        }
        Action::SetSortOrder(sort_order) => (ViewState { sort_order, ..state }, Vec::new()),
        Action::TogglePreview => (toggle_preview(state), Vec::new()),
        Action::EditDraft(draft) => (ViewState { draft, ..state }, Vec::new()),
        Action::SubmitSave => match state.draft.to_save_request() {
            Ok(request) => (state, vec![Effect::Save(request)]),
            Err(e) => {
                tracing::error!("Not saving book: {}", e);
                (failed(state, e.to_string()), Vec::new())
            }
        },
        Action::Saved(Ok(ack)) => {
            tracing::info!("Book saved: {}", ack.0);
            (recovered(state), vec![Effect::Fetch])
        }
        Action::Saved(Err(e)) => {
            tracing::error!("Error saving content: {}", e);
            (failed(state, format!("Could not save book: {}", e)), Vec::new())
        }
        Action::SubmitDelete(npc_id) => (state, vec![Effect::Delete(npc_id)]),
        Action::Deleted(Ok(ack)) => {
            tracing::info!("Book deleted: {}", ack.0);
            (recovered(state), vec![Effect::Fetch])
        }
        Action::Deleted(Err(e)) => {
            tracing::error!("Error deleting book: {}", e);
            (failed(state, format!("Could not delete book: {}", e)), Vec::new())
        }
        Action::Download => (state, vec![Effect::Download]),
        Action::DismissError => (recovered(state), Vec::new()),
    }
}

/// Show or hide the preview. Opening always re-snapshots the draft.
fn toggle_preview(state: ViewState) -> ViewState {
    if state.show_preview {
        ViewState {
            show_preview: false,
            preview_buffer: String::new(),
            ..state
        }
    } else {
        let preview_buffer = state.draft.markup_content.clone();
        ViewState {
            show_preview: true,
            preview_buffer,
            ..state
        }
    }
}

fn recovered(state: ViewState) -> ViewState {
    ViewState {
        last_error: None,
        ..state
    }
}

fn failed(state: ViewState, message: String) -> ViewState {
    ViewState {
        last_error: Some(message),
        ..state
    }
}
