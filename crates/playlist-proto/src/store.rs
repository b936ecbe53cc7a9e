//! PlaylistStore: owner of the in-memory playlist collection.
//!
//! The record list is a read-through cache of the server: only `refresh()`
//! replaces it, always wholesale, and every successful mutation is followed
//! by a refresh. Errors never leave the store; they land in `last_error`,
//! and the [`Completion`] each intent returns carries the same text so the
//! caller can show it even if `last_error` has moved on since.
//!
//! Every change is announced with [`StoreEvent::Changed`] on a broadcast
//! channel; listeners re-read [`PlaylistStore::snapshot`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::client::PlaylistApi;
use crate::error::PlaylistError;
use crate::record::{PlaylistDraft, PlaylistRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed,
}

/// How a store intent ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the request (and the list was re-fetched).
    Done,
    /// The request failed or was refused; `last_error` says why.
    Failed,
    /// A required field was blank; nothing was sent.
    Skipped,
}

impl Outcome {
    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

/// Result of one store intent. `error` is the message recorded when this
/// intent failed, captured before anything else can touch the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub outcome: Outcome,
    pub error: Option<String>,
}

impl Completion {
    fn done() -> Self {
        Self {
            outcome: Outcome::Done,
            error: None,
        }
    }

    fn skipped() -> Self {
        Self {
            outcome: Outcome::Skipped,
            error: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_done()
    }
}

impl PartialEq<Outcome> for Completion {
    fn eq(&self, other: &Outcome) -> bool {
        self.outcome == *other
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub records: Vec<PlaylistRecord>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    /// Bumped on every change.
    pub rev: u64,
}

#[derive(Debug, Default)]
struct Collection {
    records: Vec<PlaylistRecord>,
    last_error: Option<String>,
    rev: u64,
}

pub struct PlaylistStore<A> {
    api: A,
    state: RwLock<Collection>,
    in_flight: Arc<AtomicUsize>,
    events: broadcast::Sender<StoreEvent>,
}

/// Holds the loading flag up for as long as it lives.
struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
    events: broadcast::Sender<StoreEvent>,
}

impl LoadingGuard {
    fn acquire(in_flight: &Arc<AtomicUsize>, events: &broadcast::Sender<StoreEvent>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        let _ = events.send(StoreEvent::Changed);
        Self {
            in_flight: Arc::clone(in_flight),
            events: events.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let _ = self.events.send(StoreEvent::Changed);
    }
}

impl<A: PlaylistApi> PlaylistStore<A> {
    pub fn new(api: A) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            state: RwLock::new(Collection::default()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// True while any request started by the store is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            records: state.records.clone(),
            is_loading: self.is_loading(),
            last_error: state.last_error.clone(),
            rev: state.rev,
        }
    }

    pub async fn records(&self) -> Vec<PlaylistRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn clear_error(&self) {
        self.set_error(None).await;
    }

    /// Re-fetch the whole collection. On failure the previous records stay.
    pub async fn refresh(&self) -> Completion {
        let _loading = self.begin_loading();
        self.set_error(None).await;

        match self.api.list().await {
            Ok(records) => {
                debug!("[store] refreshed: {} playlists", records.len());
                {
                    let mut state = self.state.write().await;
                    state.records = records;
                    state.rev += 1;
                }
                self.notify();
                Completion::done()
            }
            Err(e) => {
                warn!("[store] refresh failed: {}", e);
                self.fail(e).await
            }
        }
    }

    pub async fn create(&self, draft: &PlaylistDraft) -> Completion {
        if let Some(field) = draft.missing_field() {
            debug!("[store] create skipped: {} is blank", field);
            return Completion::skipped();
        }

        let _loading = self.begin_loading();
        self.set_error(None).await;

        match self.api.create(draft).await {
            Ok(_) => {
                info!("[store] created playlist {:?}", draft.title);
                self.refresh().await;
                Completion::done()
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Update `record` on the server with the values in `draft`.
    pub async fn update(&self, record: &PlaylistRecord, draft: &PlaylistDraft) -> Completion {
        let id = match record.require_id() {
            Ok(id) => id.clone(),
            Err(e) => return self.fail(e).await,
        };
        if let Some(field) = draft.missing_field() {
            debug!("[store] update of {} skipped: {} is blank", id, field);
            return Completion::skipped();
        }

        let _loading = self.begin_loading();
        self.set_error(None).await;

        match self.api.update(&id, draft).await {
            Ok(_) => {
                info!("[store] updated playlist {}", id);
                self.refresh().await;
                Completion::done()
            }
            Err(e) => self.fail(e).await,
        }
    }

    pub async fn remove(&self, record: &PlaylistRecord) -> Completion {
        let id = match record.require_id() {
            Ok(id) => id.clone(),
            Err(e) => return self.fail(e).await,
        };

        let _loading = self.begin_loading();
        self.set_error(None).await;

        match self.api.remove(&id).await {
            Ok(()) => {
                info!("[store] deleted playlist {}", id);
                self.refresh().await;
                Completion::done()
            }
            Err(e) => self.fail(e).await,
        }
    }

    fn begin_loading(&self) -> LoadingGuard {
        LoadingGuard::acquire(&self.in_flight, &self.events)
    }

    fn notify(&self) {
        let _ = self.events.send(StoreEvent::Changed);
    }

    async fn fail(&self, err: PlaylistError) -> Completion {
        let message = err.to_string();
        self.set_error(Some(message.clone())).await;
        Completion {
            outcome: Outcome::Failed,
            error: Some(message),
        }
    }

    async fn set_error(&self, error: Option<String>) {
        {
            let mut state = self.state.write().await;
            if state.last_error == error {
                return;
            }
            state.last_error = error;
            state.rev += 1;
        }
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServerResponse;
    use crate::error::{Operation, Result};
    use crate::record::{Genre, PlaylistId};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(String),
        Update(String),
        Remove(String),
    }

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<Call>>,
        lists: Mutex<VecDeque<Result<Vec<PlaylistRecord>>>>,
        mutation_error: Option<PlaylistError>,
        list_entered: Option<Arc<Notify>>,
        list_gate: Option<Arc<Notify>>,
    }

    impl FakeApi {
        fn with_lists(lists: Vec<Result<Vec<PlaylistRecord>>>) -> Self {
            Self {
                lists: Mutex::new(lists.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn mutation_result(&self) -> Result<ServerResponse> {
            match &self.mutation_error {
                Some(e) => Err(e.clone()),
                None => Ok(serde_json::json!({"message": "ok"})),
            }
        }
    }

    #[async_trait]
    impl PlaylistApi for FakeApi {
        async fn list(&self) -> Result<Vec<PlaylistRecord>> {
            self.record(Call::List);
            if let Some(entered) = &self.list_entered {
                entered.notify_one();
            }
            if let Some(gate) = &self.list_gate {
                gate.notified().await;
            }
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn create(&self, draft: &PlaylistDraft) -> Result<ServerResponse> {
            self.record(Call::Create(draft.title.clone()));
            self.mutation_result()
        }

        async fn update(&self, id: &PlaylistId, _draft: &PlaylistDraft) -> Result<ServerResponse> {
            self.record(Call::Update(id.to_string()));
            self.mutation_result()
        }

        async fn remove(&self, id: &PlaylistId) -> Result<()> {
            self.record(Call::Remove(id.to_string()));
            self.mutation_result().map(|_| ())
        }
    }

    fn record(id: Option<&str>, title: &str) -> PlaylistRecord {
        PlaylistRecord {
            id: id.map(PlaylistId::new),
            title: title.to_string(),
            genre: Genre::Music,
            ..Default::default()
        }
    }

    fn draft() -> PlaylistDraft {
        PlaylistDraft {
            title: "Lo-fi Beats".into(),
            description: "study".into(),
            url: "https://youtu.be/abc".into(),
            thumbnail: "https://img.example/abc.jpg".into(),
            genre: Genre::Music,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_records() {
        let store = PlaylistStore::new(FakeApi::with_lists(vec![
            Ok(vec![record(Some("1"), "a"), record(Some("2"), "b")]),
            Ok(vec![record(Some("3"), "c")]),
        ]));

        assert_eq!(store.refresh().await, Outcome::Done);
        assert_eq!(store.records().await.len(), 2);

        assert_eq!(store.refresh().await, Outcome::Done);
        let snap = store.snapshot().await;
        assert_eq!(snap.records, vec![record(Some("3"), "c")]);
        assert!(!snap.is_loading);
        assert_eq!(snap.last_error, None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_records() {
        let store = PlaylistStore::new(FakeApi::with_lists(vec![
            Ok(vec![record(Some("1"), "a")]),
            Err(PlaylistError::network(Operation::Fetch, "connection reset")),
        ]));

        store.refresh().await;
        assert_eq!(store.refresh().await, Outcome::Failed);

        let snap = store.snapshot().await;
        assert_eq!(snap.records, vec![record(Some("1"), "a")]);
        assert_eq!(
            snap.last_error.as_deref(),
            Some("failed to fetch playlists: connection reset")
        );
        assert!(!snap.is_loading);
    }

    #[tokio::test]
    async fn create_posts_once_then_lists_once() {
        let store = PlaylistStore::new(FakeApi::with_lists(vec![Ok(vec![record(
            Some("9"),
            "Lo-fi Beats",
        )])]));

        assert_eq!(store.create(&draft()).await, Outcome::Done);
        assert_eq!(
            store.api().calls(),
            vec![Call::Create("Lo-fi Beats".into()), Call::List]
        );
        assert_eq!(store.records().await[0].title, "Lo-fi Beats");
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn create_with_blank_field_sends_nothing() {
        let store = PlaylistStore::new(FakeApi::default());
        let mut d = draft();
        d.url = String::new();

        assert_eq!(store.create(&d).await, Outcome::Skipped);
        assert!(store.api().calls().is_empty());
        assert_eq!(store.last_error().await, None);
    }

    #[tokio::test]
    async fn failed_create_sets_error_and_skips_refresh() {
        let api = FakeApi {
            mutation_error: Some(PlaylistError::Server {
                op: Operation::Create,
                status: 422,
                message: "play_url is required".into(),
            }),
            ..Default::default()
        };
        let store = PlaylistStore::new(api);

        assert_eq!(store.create(&draft()).await, Outcome::Failed);
        assert_eq!(store.api().calls(), vec![Call::Create("Lo-fi Beats".into())]);
        assert_eq!(
            store.last_error().await.as_deref(),
            Some("play_url is required")
        );
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn completion_keeps_its_own_error_after_the_store_moves_on() {
        let api = FakeApi {
            mutation_error: Some(PlaylistError::Server {
                op: Operation::Create,
                status: 422,
                message: "play_url is required".into(),
            }),
            ..Default::default()
        };
        let store = PlaylistStore::new(api);

        let failed = store.create(&draft()).await;
        assert_eq!(failed.outcome, Outcome::Failed);

        // A refresh that lands before the caller reads the result wipes
        // last_error; the completion still has the text.
        assert!(store.refresh().await.is_done());
        assert_eq!(store.last_error().await, None);
        assert_eq!(failed.error.as_deref(), Some("play_url is required"));

        // A skipped intent reports no error, whatever last_error holds.
        store.create(&draft()).await;
        let mut blank = draft();
        blank.title = " ".into();
        let skipped = store.create(&blank).await;
        assert_eq!(skipped, Outcome::Skipped);
        assert_eq!(skipped.error, None);
        assert!(store.last_error().await.is_some());
    }

    #[tokio::test]
    async fn missing_id_short_circuits_update_and_remove() {
        let store = PlaylistStore::new(FakeApi::default());
        let orphan = record(None, "orphan");

        assert_eq!(store.update(&orphan, &draft()).await, Outcome::Failed);
        assert_eq!(
            store.last_error().await,
            Some(PlaylistError::MissingId.to_string())
        );

        store.clear_error().await;
        assert_eq!(store.remove(&orphan).await, Outcome::Failed);
        assert_eq!(
            store.last_error().await,
            Some(PlaylistError::MissingId.to_string())
        );

        assert!(store.api().calls().is_empty());
    }

    #[tokio::test]
    async fn update_targets_resolved_id_and_refreshes() {
        let store = PlaylistStore::new(FakeApi::default());
        let target = record(Some("42"), "old");

        assert_eq!(store.update(&target, &draft()).await, Outcome::Done);
        assert_eq!(
            store.api().calls(),
            vec![Call::Update("42".into()), Call::List]
        );
    }

    #[tokio::test]
    async fn failed_remove_leaves_records_untouched() {
        let api = FakeApi {
            lists: Mutex::new(vec![Ok(vec![record(Some("1"), "keep me")])].into()),
            mutation_error: Some(PlaylistError::Server {
                op: Operation::Delete,
                status: 404,
                message: "not found".into(),
            }),
            ..Default::default()
        };
        let store = PlaylistStore::new(api);
        store.refresh().await;

        let target = store.records().await[0].clone();
        assert_eq!(store.remove(&target).await, Outcome::Failed);

        let snap = store.snapshot().await;
        assert_eq!(snap.last_error.as_deref(), Some("not found"));
        assert_eq!(snap.records, vec![record(Some("1"), "keep me")]);
        assert_eq!(
            store.api().calls(),
            vec![Call::List, Call::Remove("1".into())]
        );
    }

    #[tokio::test]
    async fn loading_is_held_until_refresh_completes() {
        let entered = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let api = FakeApi {
            list_entered: Some(entered.clone()),
            list_gate: Some(gate.clone()),
            ..Default::default()
        };
        let store = Arc::new(PlaylistStore::new(api));
        let mut events = store.subscribe();

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.create(&draft()).await }
        });

        entered.notified().await;
        assert!(store.is_loading());
        assert!(store.snapshot().await.is_loading);

        gate.notify_one();
        assert_eq!(task.await.unwrap(), Outcome::Done);
        assert!(!store.is_loading());
        assert_eq!(events.try_recv(), Ok(StoreEvent::Changed));
    }
}
