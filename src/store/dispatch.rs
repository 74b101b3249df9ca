//! Runs view-model actions and executes their effects against a store
//!
//! Network calls run on a tokio runtime. Each call sends exactly one
//! completion action back over a channel, which the UI thread drains with
//! [`Dispatcher::pump`] once per frame. Calls in flight are not ordered
//! against each other.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;
use tokio::runtime::Runtime;

use super::BookStore;
use crate::core::view_model::{reduce, Action, Effect, ViewState};

/// Opens the download address outside the app
type Opener = Box<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Owner of the view state and the bridge to the store
pub struct Dispatcher<S: BookStore> {
    state: ViewState,
    store: Arc<S>,
    runtime: Runtime,
    completion_tx: Sender<Action>,
    completion_rx: Receiver<Action>,
    /// Woken when a completion arrives
    repaint: Option<egui::Context>,
    opener: Opener,
}

impl<S: BookStore> Dispatcher<S> {
    /// Create a dispatcher with its own worker runtime
    pub fn new(store: S) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("book-store")
            .enable_all()
            .build()
            .context("Failed to start network runtime")?;

        let (completion_tx, completion_rx) = mpsc::channel();

        Ok(Self {
            state: ViewState::default(),
            store: Arc::new(store),
            runtime,
            completion_tx,
            completion_rx,
            repaint: None,
            opener: Box::new(|url: &str| open::that(url)),
        })
    }

    /// Request a repaint of `ctx` whenever a call completes
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    /// Replace how download addresses are opened
    #[cfg(test)]
    fn with_opener(
        mut self,
        opener: impl Fn(&str) -> std::io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// Current view state
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply an action and start whatever work it asks for
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = reduce(state, action);
        self.state = next;

        for effect in effects {
            self.run(effect);
        }
    }

    /// Apply every completion that has arrived. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.completion_rx.try_recv() {
                Ok(action) => {
                    self.dispatch(action);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                // We hold a sender ourselves, so this cannot happen
                Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::Fetch => self.spawn(|store| async move {
                Action::Fetched(store.list_all().await)
            }),
            Effect::Save(request) => self.spawn(move |store| async move {
                Action::Saved(store.save(&request).await)
            }),
            Effect::Delete(npc_id) => self.spawn(move |store| async move {
                Action::Deleted(store.delete_by_id(npc_id).await)
            }),
            Effect::Download => {
                let url = self.store.download_url();
                tracing::info!("Opening download: {}", url);
                if let Err(e) = (self.opener)(&url) {
                    tracing::error!("Failed to open download {}: {}", url, e);
                }
            }
        }
    }

    /// Run a store call in the background and report its completion
    fn spawn<F, Fut>(&self, call: F)
    where
        F: FnOnce(Arc<S>) -> Fut,
        Fut: std::future::Future<Output = Action> + Send + 'static,
    {
        let future = call(Arc::clone(&self.store));
        let tx = self.completion_tx.clone();
        let repaint = self.repaint.clone();

        self.runtime.spawn(async move {
            let action = future.await;
            if tx.send(action).is_err() {
                tracing::debug!("Dispatcher dropped before completion");
                return;
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    use crate::core::book::{Book, SortOrder};
    use crate::core::draft::DraftState;
    use crate::store::{Ack, SaveRequest, StoreError};

    /// In-memory backend that records every call
    #[derive(Default)]
    struct MemoryStore {
        books: Mutex<Vec<Book>>,
        calls: Mutex<Vec<String>>,
        saved: Mutex<Vec<SaveRequest>>,
        failing: bool,
    }

    impl MemoryStore {
        fn with_books(ids: &[i64]) -> Self {
            let books = ids
                .iter()
                .map(|&npc_id| Book {
                    npc_id,
                    html_content: format!("<p>{}</p>", npc_id),
                    command: String::new(),
                })
                .collect();
            Self {
                books: Mutex::new(books),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn record(&self, call: &str) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push(call.to_string());
            if self.failing {
                return Err(StoreError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            Ok(())
        }
    }

    impl BookStore for MemoryStore {
        async fn save(&self, request: &SaveRequest) -> Result<Ack, StoreError> {
            self.record("save")?;
            self.saved.lock().unwrap().push(request.clone());
            self.books.lock().unwrap().push(Book {
                npc_id: request.n,
                html_content: request.html_content.clone(),
                command: request.command.clone(),
            });
            Ok(Ack("saved".to_string()))
        }

        async fn list_all(&self) -> Result<Vec<Book>, StoreError> {
            self.record("list")?;
            Ok(self.books.lock().unwrap().clone())
        }

        async fn delete_by_id(&self, npc_id: i64) -> Result<Ack, StoreError> {
            self.record("delete")?;
            self.books.lock().unwrap().retain(|b| b.npc_id != npc_id);
            Ok(Ack("deleted".to_string()))
        }

        fn download_url(&self) -> String {
            "http://books.test/downloadBooks".to_string()
        }
    }

    /// Wait for one completion and apply it
    fn step(dispatcher: &mut Dispatcher<MemoryStore>) {
        let action = dispatcher
            .completion_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("no completion arrived");
        dispatcher.dispatch(action);
    }

    fn assert_idle(dispatcher: &Dispatcher<MemoryStore>) {
        assert!(dispatcher
            .completion_rx
            .recv_timeout(Duration::from_millis(200))
            .is_err());
    }

    fn calls(dispatcher: &Dispatcher<MemoryStore>) -> Vec<String> {
        dispatcher.store.calls.lock().unwrap().clone()
    }

    #[test]
    fn test_startup_refresh_loads_books() {
        let mut dispatcher = Dispatcher::new(MemoryStore::with_books(&[2, 1])).unwrap();
        dispatcher.dispatch(Action::Refresh);
        step(&mut dispatcher);

        let ids: Vec<i64> = dispatcher.state().projection().iter().map(|b| b.npc_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(calls(&dispatcher), vec!["list"]);
    }

    #[test]
    fn test_refresh_twice_is_idempotent() {
        let mut dispatcher = Dispatcher::new(MemoryStore::with_books(&[3, 1, 2])).unwrap();

        dispatcher.dispatch(Action::Refresh);
        step(&mut dispatcher);
        let first = dispatcher.state().books.clone();

        dispatcher.dispatch(Action::Refresh);
        step(&mut dispatcher);
        assert_eq!(dispatcher.state().books, first);
    }

    #[test]
    fn test_save_then_single_refresh() {
        let mut dispatcher = Dispatcher::new(MemoryStore::default()).unwrap();
        let draft = DraftState {
            markup_content: "<p>hi</p>".to_string(),
            id_input: "5".to_string(),
            command_input: "greet".to_string(),
        };
        dispatcher.dispatch(Action::EditDraft(draft.clone()));
        dispatcher.dispatch(Action::SubmitSave);

        step(&mut dispatcher); // Saved
        step(&mut dispatcher); // Fetched
        assert_idle(&dispatcher);

        assert_eq!(calls(&dispatcher), vec!["save", "list"]);
        assert_eq!(
            dispatcher.store.saved.lock().unwrap().clone(),
            vec![SaveRequest {
                html_content: "<p>hi</p>".to_string(),
                n: 5,
                command: "greet".to_string(),
            }]
        );
        assert_eq!(dispatcher.state().books.len(), 1);
        assert_eq!(dispatcher.state().draft, draft);
    }

    #[test]
    fn test_invalid_id_never_reaches_store() {
        let mut dispatcher = Dispatcher::new(MemoryStore::default()).unwrap();
        dispatcher.dispatch(Action::EditDraft(DraftState {
            markup_content: "<p>hi</p>".to_string(),
            id_input: String::new(),
            command_input: "greet".to_string(),
        }));
        dispatcher.dispatch(Action::SubmitSave);

        assert_idle(&dispatcher);
        assert!(calls(&dispatcher).is_empty());
        assert!(dispatcher.state().last_error.is_some());
    }

    #[test]
    fn test_delete_then_refresh() {
        let mut dispatcher = Dispatcher::new(MemoryStore::with_books(&[4, 5])).unwrap();
        dispatcher.dispatch(Action::Refresh);
        step(&mut dispatcher);

        dispatcher.dispatch(Action::SubmitDelete(5));
        step(&mut dispatcher); // Deleted
        step(&mut dispatcher); // Fetched

        let ids: Vec<i64> = dispatcher.state().books.iter().map(|b| b.npc_id).collect();
        assert_eq!(ids, vec![4]);
        assert_eq!(calls(&dispatcher), vec!["list", "delete", "list"]);
    }

    #[test]
    fn test_failed_delete_leaves_state_alone() {
        let mut dispatcher = Dispatcher::new(MemoryStore::failing()).unwrap();
        dispatcher.dispatch(Action::SetSortOrder(SortOrder::Descending));
        let before = dispatcher.state().books.clone();

        dispatcher.dispatch(Action::SubmitDelete(5));
        step(&mut dispatcher);
        assert_idle(&dispatcher);

        assert_eq!(dispatcher.state().books, before);
        assert_eq!(dispatcher.state().sort_order, SortOrder::Descending);
        assert_eq!(calls(&dispatcher), vec!["delete"]);
        assert!(dispatcher.state().last_error.is_some());
    }

    #[test]
    fn test_download_opens_url_without_completion() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&opened);
        let mut dispatcher = Dispatcher::new(MemoryStore::default())
            .unwrap()
            .with_opener(move |url| {
                sink.lock().unwrap().push(url.to_string());
                Ok(())
            });

        dispatcher.dispatch(Action::Download);

        assert_eq!(
            opened.lock().unwrap().clone(),
            vec!["http://books.test/downloadBooks".to_string()]
        );
        assert_idle(&dispatcher);
        assert!(calls(&dispatcher).is_empty());
    }

    #[test]
    fn test_pump_applies_arrived_completions() {
        let mut dispatcher = Dispatcher::new(MemoryStore::with_books(&[1])).unwrap();
        dispatcher.dispatch(Action::Refresh);

        let mut applied = 0;
        for _ in 0..100 {
            applied += dispatcher.pump();
            if applied > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(applied, 1);
        assert_eq!(dispatcher.state().books.len(), 1);
    }
}
