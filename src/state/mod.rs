pub mod card;
pub mod draw;
pub mod locks;
pub mod session;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::game_store::GameStore, error::ServiceError};

pub use self::sse::EventHub;
use self::{locks::GameLocks, session::SessionStore};

pub type SharedState = Arc<AppState>;

const EVENT_CAPACITY: usize = 64;

/// Central application state: configuration, storage handle, locks, sessions and events.
pub struct AppState {
    config: AppConfig,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    degraded: watch::Sender<bool>,
    events: EventHub,
    locks: GameLocks,
    sessions: SessionStore,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            sessions: SessionStore::new(config.session_ttl),
            config,
            game_store: RwLock::new(None),
            degraded: degraded_tx,
            events: EventHub::new(EVENT_CAPACITY),
            locks: GameLocks::new(),
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn GameStore>) -> SharedState {
        let state = Self::new(config);
        state.set_game_store(store).await;
        state
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Game store for a request, failing while the backend is degraded.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Broadcast hub feeding the admin event stream.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Lock registry serializing lifecycle, draw and claim decisions.
    pub fn locks(&self) -> &GameLocks {
        &self.locks
    }

    /// Admin sessions issued at login.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
