pub mod album;
pub mod clock;
pub mod guess_rules;
pub mod ranking;
pub mod scoring;
pub mod session;
pub mod week;

use std::sync::Arc;

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::persistence::Persistence,
    state::{
        clock::{Clock, SystemClock},
        session::Session,
        week::WeekKey,
    },
};

/// Hour of the club's local day from which guessing and results open.
pub const OPENING_HOUR: u8 = 12;

pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the document provider and admin sessions.
pub struct AppState {
    config: AppConfig,
    persistence: Arc<Persistence>,
    /// Admin session tokens and their expiry.
    admin_sessions: DashMap<Uuid, OffsetDateTime>,
    degraded: watch::Sender<bool>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts healthy; the storage supervisor flips the
    /// degraded flag when the remote store stops answering.
    pub fn new(config: AppConfig, persistence: Persistence) -> SharedState {
        let clock = Arc::new(SystemClock::new(config.utc_offset));
        Self::with_clock(config, persistence, clock)
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(
        config: AppConfig,
        persistence: Persistence,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            config,
            persistence: Arc::new(persistence),
            admin_sessions: DashMap::new(),
            degraded: degraded_tx,
            clock,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Persistence provider holding the game document.
    pub fn persistence(&self) -> &Arc<Persistence> {
        &self.persistence
    }

    /// Registry of admin session tokens.
    pub fn admin_sessions(&self) -> &DashMap<Uuid, OffsetDateTime> {
        &self.admin_sessions
    }

    /// Current time in the club's offset.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Week containing today.
    pub fn current_week(&self) -> WeekKey {
        WeekKey::for_date(self.now().date())
    }

    /// Session of `member` on `week`, the current week when unset.
    pub fn session(&self, member: impl Into<String>, week: Option<WeekKey>) -> Session {
        Session::new(member, week.unwrap_or_else(|| self.current_week()))
    }

    /// Whether guessing and results are open, i.e. it is past [`OPENING_HOUR`].
    pub fn is_open(&self) -> bool {
        self.now().hour() >= OPENING_HOUR
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
}
