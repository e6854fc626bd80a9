//! Canned backend: every call waits a fixed delay and answers from the
//! catalog.

use std::time::Duration;

use evc_core::{ChargingSession, Notification, Station, User};
use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../fixtures/catalog.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub history: Vec<ChargingSession>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Catalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Stations around Bishkek shipped with the client.
    pub fn builtin() -> serde_json::Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }
}

#[derive(Debug, Clone)]
pub struct MockBackend {
    catalog: Catalog,
    delay: Duration,
}

impl MockBackend {
    pub fn new(catalog: Catalog, delay: Duration) -> Self {
        MockBackend { catalog, delay }
    }

    async fn round_trip(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub async fn fetch_stations(&self) -> Vec<Station> {
        self.round_trip().await;
        self.catalog.stations.clone()
    }

    pub async fn fetch_history(&self) -> Vec<ChargingSession> {
        self.round_trip().await;
        self.catalog.history.clone()
    }

    pub async fn fetch_notifications(&self) -> Vec<Notification> {
        self.round_trip().await;
        self.catalog.notifications.clone()
    }

    pub async fn send_code(&self, phone: &str) {
        tracing::info!("Sending verification code to {}", phone);
        self.round_trip().await;
    }

    /// Any four digit code is accepted.
    pub async fn verify_code(&self, phone: &str, _code: &str) -> User {
        self.round_trip().await;
        User {
            id: "1".to_string(),
            phone_number: phone.to_string(),
            name: Some("Пользователь".to_string()),
            car_number: None,
        }
    }
}
