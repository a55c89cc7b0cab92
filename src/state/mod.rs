/// Autosave observer for the booking draft.
pub mod autosave;
/// Draft data owned by the wizard.
pub mod draft;
/// The six-step booking wizard state machine.
pub mod wizard;

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::{AppConfig, BackendMode},
    dao::booking_store::BookingStore,
    services::payment::{PaymentGateway, StubGateway},
    state::autosave::{DraftStore, JsonFileDraftStore},
    state::wizard::BookingWizard,
};

pub use self::wizard::{BookingStep, WizardError};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// One live wizard plus its fetch bookkeeping.
///
/// The generation counter implements stale-response discarding: each
/// availability fetch takes a token, and a fetch that finishes after a newer
/// one began throws its result away instead of clobbering fresher data.
pub struct WizardSession {
    /// The wizard itself; one step component mutates it at a time.
    pub wizard: Mutex<BookingWizard>,
    fetch_generation: AtomicU64,
}

impl WizardSession {
    fn new(wizard: BookingWizard) -> Self {
        Self {
            wizard: Mutex::new(wizard),
            fetch_generation: AtomicU64::new(0),
        }
    }

    /// Start a fetch, superseding any fetch still in flight.
    pub fn begin_fetch(&self) -> u64 {
        self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the given token still identifies the newest fetch.
    pub fn fetch_is_current(&self, token: u64) -> bool {
        self.fetch_generation.load(Ordering::SeqCst) == token
    }
}

/// Central application state: injected storage handle, degraded flag, the
/// fallback catalog, and the registry of live wizard sessions.
pub struct AppState {
    config: AppConfig,
    backend_mode: BackendMode,
    booking_store: RwLock<Option<Arc<dyn BookingStore>>>,
    sessions: DashMap<Uuid, Arc<WizardSession>>,
    draft_store: Arc<dyn DraftStore>,
    payment_gateway: Arc<dyn PaymentGateway>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, backend_mode: BackendMode) -> SharedState {
        let draft_store: Arc<dyn DraftStore> =
            Arc::new(JsonFileDraftStore::new(&config.draft_dir));
        Self::with_draft_store(config, backend_mode, draft_store)
    }

    /// Variant taking an explicit draft store, used by tests to avoid disk.
    pub fn with_draft_store(
        config: AppConfig,
        backend_mode: BackendMode,
        draft_store: Arc<dyn DraftStore>,
    ) -> SharedState {
        Self::with_gateway(config, backend_mode, draft_store, Arc::new(StubGateway))
    }

    /// Variant also taking the payment processor, for swapping in a real one
    /// or an instrumented test double.
    pub fn with_gateway(
        config: AppConfig,
        backend_mode: BackendMode,
        draft_store: Arc<dyn DraftStore>,
        payment_gateway: Arc<dyn PaymentGateway>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            backend_mode,
            booking_store: RwLock::new(None),
            sessions: DashMap::new(),
            draft_store,
            payment_gateway,
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether a backend was configured at startup, regardless of its health.
    pub fn backend_mode(&self) -> BackendMode {
        self.backend_mode
    }

    /// The payment processor used at the payment step.
    pub fn payment_gateway(&self) -> Arc<dyn PaymentGateway> {
        self.payment_gateway.clone()
    }

    /// Obtain a handle to the current booking store, if one is installed.
    pub async fn booking_store(&self) -> Option<Arc<dyn BookingStore>> {
        let guard = self.booking_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_booking_store(&self, store: Arc<dyn BookingStore>) {
        {
            let mut guard = self.booking_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_booking_store(&self) {
        {
            let mut guard = self.booking_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.booking_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }
        let _ = self.degraded.send(value);
    }

    /// Today's date as the wizard sees it.
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }

    /// Start a new wizard session, restoring any autosaved draft.
    pub fn create_session(&self) -> (Uuid, Arc<WizardSession>) {
        let wizard = BookingWizard::with_autosave(self.today(), self.draft_store.clone());
        let session = Arc::new(WizardSession::new(wizard));
        let id = Uuid::new_v4();
        self.sessions.insert(id, session.clone());
        (id, session)
    }

    /// Look up a live session.
    pub fn session(&self, id: Uuid) -> Option<Arc<WizardSession>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Drop a session from the registry.
    pub fn remove_session(&self, id: Uuid) {
        self.sessions.remove(&id);
    }
}
