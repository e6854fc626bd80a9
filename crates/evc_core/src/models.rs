use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Available,
    Occupied,
    Offline,
    Maintenance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectorType {
    #[serde(rename = "CCS")]
    Ccs,
    #[serde(rename = "CHAdeMO")]
    Chademo,
    Type2,
    Tesla,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStatus {
    Available,
    Occupied,
    Unavailable,
}

/// One plug of a station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: u32,
    /// Plug label as printed on the charger, e.g. `CCS2` or `GBT`
    #[serde(rename = "type")]
    pub plug: String,
    pub status: ConnectorStatus,
    /// Charge level in percent of the car on an occupied connector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<u8>,
}

impl Connector {
    pub fn is_available(&self) -> bool {
        self.status == ConnectorStatus::Available
    }
}

/// A charging point as loaded from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rated power in kW
    pub power: f64,
    pub connector_type: ConnectorType,
    /// Price per kWh in KGS
    pub price_per_kwh: f64,
    pub status: StationStatus,
    /// Distance from the user in km, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl Station {
    pub fn connector(&self, id: u32) -> Option<&Connector> {
        self.connectors.iter().find(|connector| connector.id == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSession {
    pub id: String,
    pub station_id: String,
    pub station_name: String,
    pub station_address: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// kWh
    pub energy_consumed: f64,
    /// KGS
    pub cost: f64,
    pub status: SessionStatus,
}

impl ChargingSession {
    /// Opens a session on `station`, copying the station's display fields.
    pub fn start(station: &Station, start_time: DateTime<Utc>) -> Self {
        ChargingSession {
            id: uuid::Uuid::new_v4().to_string(),
            station_id: station.id.clone(),
            station_name: station.name.clone(),
            station_address: station.address.clone(),
            start_time,
            end_time: None,
            energy_consumed: 0.0,
            cost: 0.0,
            status: SessionStatus::Active,
        }
    }

    pub fn finalize(self, end_time: DateTime<Utc>, energy_consumed: f64, cost: f64) -> Self {
        ChargingSession {
            end_time: Some(end_time),
            energy_consumed,
            cost,
            status: SessionStatus::Completed,
            ..self
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Partial update applied to the current session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub end_time: Option<DateTime<Utc>>,
    pub energy_consumed: Option<f64>,
    pub cost: Option<f64>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ChargingComplete,
    ChargingError,
    StationAvailable,
    PaymentComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    /// Creates an unread notification stamped at `timestamp`.
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp,
            is_read: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub phone_number: Option<String>,
    pub name: Option<String>,
    pub car_number: Option<String>,
}

impl User {
    /// Merges the fields present in `update`.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(car_number) = update.car_number {
            self.car_number = Some(car_number);
        }
    }
}
