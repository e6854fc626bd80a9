//! Client flows on top of the state containers.
//!
//! Each public method of [`Engine`] is one user interaction: it validates
//! input, awaits storage or the mock backend without holding any lock, then
//! dispatches synchronous actions into the [`AppStore`].

mod auth;
mod catalog;
mod charging;
mod stations;
mod ticker;

pub use crate::auth::{AUTH_TOKEN_KEY, USER_KEY};
pub use crate::catalog::{Catalog, MockBackend};
pub use crate::charging::{cost_for, elapsed_seconds, energy_for};
pub use crate::ticker::ElapsedTicker;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use evc_core::{Action, AppStore, StationStatus, StoreError};
use evc_storage::{Storage, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid Kyrgyz phone number {0:?}")]
    InvalidPhone(String),
    #[error("Verification code must be 4 digits")]
    InvalidCode,
    #[error("No verification code has been requested")]
    NoPendingVerification,
    #[error("Code can be resent in {remaining_secs} s")]
    ResendCooldown { remaining_secs: u64 },
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Charge amount must be positive")]
    EmptyAmount,
    #[error("Insufficient balance: {required:.2} KGS required, {available:.2} KGS available")]
    InsufficientBalance { required: f64, available: f64 },
    #[error("Station {0} not found")]
    StationNotFound(String),
    #[error("Station {id} is not available ({status:?})")]
    StationUnavailable { id: String, status: StationStatus },
    #[error("Connector {connector_id} of station {station_id} is not available")]
    ConnectorUnavailable { station_id: String, connector_id: u32 },
    #[error("No active charging session")]
    NoActiveSession,
    #[error("Notification {0} not found")]
    NotificationNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Latency of every mock backend call
    #[serde(rename = "networkDelayMs", with = "millis")]
    pub network_delay: Duration,
    /// Wallet balance in KGS at startup
    pub starting_balance: f64,
    #[serde(rename = "resendCooldownSecs", with = "seconds")]
    pub resend_cooldown: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            network_delay: Duration::from_millis(1000),
            starting_balance: 10_000.0,
            resend_cooldown: Duration::from_secs(60),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

/// Everything mutable, behind one lock.
#[derive(Debug)]
struct EngineState {
    store: AppStore,
    /// KGS
    balance: f64,
    pending: Option<auth::PendingVerification>,
}

pub struct Engine {
    state: Mutex<EngineState>,
    storage: Storage,
    backend: MockBackend,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig, storage: Storage, catalog: Catalog) -> Self {
        Engine {
            state: Mutex::new(EngineState {
                store: AppStore::new(),
                balance: config.starting_balance,
                pending: None,
            }),
            storage,
            backend: MockBackend::new(catalog, config.network_delay),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&AppStore) -> R) -> R {
        f(&self.lock().store)
    }

    /// Copy of the whole store.
    pub fn snapshot(&self) -> AppStore {
        self.read(AppStore::clone)
    }

    pub fn dispatch(&self, action: impl Into<Action>) -> Result<(), StoreError> {
        self.lock().store.dispatch(action)
    }

    /// Wallet balance in KGS.
    pub fn balance(&self) -> f64 {
        self.lock().balance
    }

    // Never held across an `.await`.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
