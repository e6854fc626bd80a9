//! EV charging client state.
//!
//! The four containers (stations, charging, notifications, auth) live in an
//! [`AppStore`] owned by whoever composes the application. Reads go through
//! shared references; every mutation is an [`Action`] passed to
//! [`AppStore::dispatch`].

mod auth;
mod charging;
mod models;
mod notifications;
pub mod phone;
mod stations;
pub mod time;

pub use crate::auth::AuthState;
pub use crate::charging::{ChargingState, ChargingSummary};
pub use crate::models::*;
pub use crate::notifications::NotificationCenter;
pub use crate::stations::{SortOrder, StationRegistry, StatusFilter};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {session_id} is already active")]
    AlreadyActive { session_id: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationAction {
    SetLoading(bool),
    Load(Vec<Station>),
    Select(Option<String>),
    ToggleFavorite(String),
    UpdateStatus { id: String, status: StationStatus },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChargingAction {
    SetLoading(bool),
    Start(ChargingSession),
    /// Archive the given, already finalized, session
    Stop(ChargingSession),
    LoadHistory(Vec<ChargingSession>),
    UpdateCurrent(SessionUpdate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationAction {
    Add(Notification),
    MarkRead(String),
    MarkAllRead,
    Load(Vec<Notification>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    SetLoading(bool),
    Login(User),
    Logout,
    UpdateUser(UserUpdate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Stations(StationAction),
    Charging(ChargingAction),
    Notifications(NotificationAction),
    Auth(AuthAction),
}

impl From<StationAction> for Action {
    fn from(action: StationAction) -> Self {
        Action::Stations(action)
    }
}

impl From<ChargingAction> for Action {
    fn from(action: ChargingAction) -> Self {
        Action::Charging(action)
    }
}

impl From<NotificationAction> for Action {
    fn from(action: NotificationAction) -> Self {
        Action::Notifications(action)
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

/// Owner of all client state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStore {
    stations: StationRegistry,
    charging: ChargingState,
    notifications: NotificationCenter,
    auth: AuthState,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }

    pub fn charging(&self) -> &ChargingState {
        &self.charging
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Applies one action synchronously.
    ///
    /// Only starting a session while another one is current can fail; the
    /// store is left untouched in that case.
    pub fn dispatch(&mut self, action: impl Into<Action>) -> Result<(), StoreError> {
        match action.into() {
            Action::Stations(action) => self.reduce_stations(action),
            Action::Charging(action) => self.reduce_charging(action)?,
            Action::Notifications(action) => self.reduce_notifications(action),
            Action::Auth(action) => self.reduce_auth(action),
        }
        Ok(())
    }

    fn reduce_stations(&mut self, action: StationAction) {
        match action {
            StationAction::SetLoading(is_loading) => self.stations.set_loading(is_loading),
            StationAction::Load(stations) => self.stations.load(stations),
            StationAction::Select(id) => self.stations.select(id),
            StationAction::ToggleFavorite(id) => self.stations.toggle_favorite(&id),
            StationAction::UpdateStatus { id, status } => self.stations.update_status(&id, status),
        }
    }

    fn reduce_charging(&mut self, action: ChargingAction) -> Result<(), SessionError> {
        match action {
            ChargingAction::SetLoading(is_loading) => self.charging.set_loading(is_loading),
            ChargingAction::Start(session) => self.charging.start(session)?,
            ChargingAction::Stop(finalized) => {
                self.charging.stop(finalized);
            }
            ChargingAction::LoadHistory(history) => self.charging.load_history(history),
            ChargingAction::UpdateCurrent(update) => self.charging.update_current(update),
        }
        Ok(())
    }

    fn reduce_notifications(&mut self, action: NotificationAction) {
        match action {
            NotificationAction::Add(notification) => self.notifications.add(notification),
            NotificationAction::MarkRead(id) => {
                self.notifications.mark_read(&id);
            }
            NotificationAction::MarkAllRead => self.notifications.mark_all_read(),
            NotificationAction::Load(notifications) => self.notifications.load(notifications),
        }
    }

    fn reduce_auth(&mut self, action: AuthAction) {
        match action {
            AuthAction::SetLoading(is_loading) => self.auth.set_loading(is_loading),
            AuthAction::Login(user) => self.auth.login(user),
            AuthAction::Logout => self.auth.logout(),
            AuthAction::UpdateUser(update) => self.auth.update_user(update),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stations::test::station;
    use chrono::Utc;

    fn default_store() -> AppStore {
        let mut store = AppStore::new();
        store
            .dispatch(StationAction::Load(vec![
                station("s1", StationStatus::Available),
                station("s2", StationStatus::Available),
            ]))
            .unwrap();
        store
    }

    #[test]
    fn test_update_station_status_scenario() {
        let mut store = default_store();

        store
            .dispatch(StationAction::UpdateStatus {
                id: "s1".into(),
                status: StationStatus::Occupied,
            })
            .expect("Status updates never fail");
        assert_eq!(
            store.stations().get("s1").unwrap().status,
            StationStatus::Occupied
        );

        let result = store.dispatch(StationAction::UpdateStatus {
            id: "unknown".into(),
            status: StationStatus::Occupied,
        });
        assert!(result.is_ok());
        assert_eq!(
            store.stations().get("s2").unwrap().status,
            StationStatus::Available
        );
    }

    #[test]
    fn test_charging_lifecycle_through_dispatch() {
        let mut store = default_store();
        let started = ChargingSession::start(store.stations().get("s1").unwrap(), Utc::now());

        store
            .dispatch(ChargingAction::Start(started.clone()))
            .expect("Could not start the session");

        let second = ChargingSession::start(store.stations().get("s2").unwrap(), Utc::now());
        match store.dispatch(ChargingAction::Start(second)) {
            Err(StoreError::Session(SessionError::AlreadyActive { session_id })) => {
                assert_eq!(session_id, started.id);
            }
            other => panic!("Expected AlreadyActive error, got {other:?}"),
        }

        let finalized = started.finalize(Utc::now(), 12.0, 180.0);
        store
            .dispatch(ChargingAction::Stop(finalized.clone()))
            .unwrap();
        assert!(store.charging().current().is_none());
        assert_eq!(store.charging().history().first(), Some(&finalized));

        store.dispatch(ChargingAction::Stop(finalized)).unwrap();
        assert_eq!(store.charging().history().len(), 1);
    }

    #[test]
    fn test_notification_scenario_through_dispatch() {
        let mut store = AppStore::new();
        let notifications: Vec<Notification> = [false, true, false]
            .into_iter()
            .map(|is_read| Notification {
                is_read,
                ..Notification::new(NotificationKind::StationAvailable, "t", "m", Utc::now())
            })
            .collect();
        let first_unread = notifications[0].id.clone();

        store
            .dispatch(NotificationAction::Load(notifications))
            .unwrap();
        assert_eq!(store.notifications().unread_count(), 2);

        store
            .dispatch(NotificationAction::MarkRead(first_unread.clone()))
            .unwrap();
        store
            .dispatch(NotificationAction::MarkRead(first_unread))
            .unwrap();
        assert_eq!(store.notifications().unread_count(), 1);

        store.dispatch(NotificationAction::MarkAllRead).unwrap();
        assert_eq!(store.notifications().unread_count(), 0);
        assert!(store.notifications().notifications().iter().all(|n| n.is_read));
    }

    #[test]
    fn test_auth_actions() {
        let mut store = AppStore::new();
        let user = User {
            id: "1".into(),
            phone_number: "996555123456".into(),
            name: None,
            car_number: None,
        };

        store.dispatch(AuthAction::Login(user)).unwrap();
        store
            .dispatch(AuthAction::UpdateUser(UserUpdate {
                car_number: Some("01KG777AAA".into()),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(
            store.auth().user().and_then(|u| u.car_number.as_deref()),
            Some("01KG777AAA")
        );

        store.dispatch(AuthAction::Logout).unwrap();
        assert!(!store.auth().is_authenticated());
    }

    #[test]
    fn test_store_serializes_with_camel_case() {
        let store = default_store();
        let json = serde_json::to_value(&store).unwrap();
        assert!(json["stations"]["stations"].is_array());
        assert_eq!(json["notifications"]["unreadCount"], 0);
        assert_eq!(json["auth"]["isAuthenticated"], false);
    }
}
