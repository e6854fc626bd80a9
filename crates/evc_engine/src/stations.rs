use evc_core::{
    Notification, NotificationAction, SortOrder, Station, StationAction, StatusFilter,
};

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Fetches the station list and replaces the registry with it.
    pub async fn load_stations(&self) -> EngineResult<usize> {
        self.dispatch(StationAction::SetLoading(true))?;
        let stations = self.backend.fetch_stations().await;
        let count = stations.len();
        self.dispatch(StationAction::Load(stations))?;
        Ok(count)
    }

    pub fn station(&self, id: &str) -> Option<Station> {
        self.read(|store| store.stations().get(id).cloned())
    }

    pub fn list_stations(&self, filter: StatusFilter, order: SortOrder) -> Vec<Station> {
        self.read(|store| {
            store
                .stations()
                .query(filter, order)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn favorite_stations(&self) -> Vec<Station> {
        self.read(|store| store.stations().favorites().into_iter().cloned().collect())
    }

    /// Flips the favorite mark of a station and returns the new mark.
    pub fn toggle_favorite(&self, id: &str) -> EngineResult<bool> {
        let mut state = self.lock();
        if state.store.stations().get(id).is_none() {
            return Err(EngineError::StationNotFound(id.to_string()));
        }
        state
            .store
            .dispatch(StationAction::ToggleFavorite(id.to_string()))?;
        Ok(state.store.stations().is_favorite(id))
    }

    pub fn select_station(&self, id: &str) -> EngineResult<Station> {
        let mut state = self.lock();
        let station = state
            .store
            .stations()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::StationNotFound(id.to_string()))?;
        state
            .store
            .dispatch(StationAction::Select(Some(id.to_string())))?;
        Ok(station)
    }

    pub async fn load_notifications(&self) -> EngineResult<usize> {
        let notifications = self.backend.fetch_notifications().await;
        let count = notifications.len();
        self.dispatch(NotificationAction::Load(notifications))?;
        Ok(count)
    }

    /// All notifications, newest first, with the unread count.
    pub fn notifications(&self) -> (Vec<Notification>, usize) {
        self.read(|store| {
            let center = store.notifications();
            (center.notifications().to_vec(), center.unread_count())
        })
    }

    pub fn mark_notification_read(&self, id: &str) -> EngineResult<usize> {
        let mut state = self.lock();
        if state.store.notifications().get(id).is_none() {
            return Err(EngineError::NotificationNotFound(id.to_string()));
        }
        state
            .store
            .dispatch(NotificationAction::MarkRead(id.to_string()))?;
        Ok(state.store.notifications().unread_count())
    }

    pub fn mark_all_notifications_read(&self) -> EngineResult<()> {
        self.dispatch(NotificationAction::MarkAllRead)?;
        Ok(())
    }
}
