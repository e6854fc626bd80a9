use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Station, StationStatus};

/// Which stations a listing keeps.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Occupied,
    Maintenance,
}

impl StatusFilter {
    fn matches(self, status: StationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => status == StationStatus::Available,
            StatusFilter::Occupied => status == StationStatus::Occupied,
            StatusFilter::Maintenance => status == StationStatus::Maintenance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Nearest first; unknown distance counts as zero
    #[default]
    Distance,
    /// Cheapest first
    Price,
    /// Most powerful first
    Power,
    Name,
}

/// Known stations, the favorite ids and the selected station.
///
/// Every station's `is_favorite` flag mirrors membership of its id in
/// `favorites`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRegistry {
    stations: Vec<Station>,
    favorites: Vec<String>,
    selected: Option<String>,
    is_loading: bool,
    /// Every id any load has delivered
    #[serde(skip)]
    seen: HashSet<String>,
}

impl StationRegistry {
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn favorite_ids(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected station, if it is still part of the list.
    pub fn selected(&self) -> Option<&Station> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|favorite| favorite == id)
    }

    pub fn favorites(&self) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|station| station.is_favorite)
            .collect()
    }

    /// Filtered and sorted view of the list. Sorting is stable.
    pub fn query(&self, filter: StatusFilter, order: SortOrder) -> Vec<&Station> {
        let mut stations: Vec<&Station> = self
            .stations
            .iter()
            .filter(|station| filter.matches(station.status))
            .collect();

        match order {
            SortOrder::Distance => stations.sort_by(|a, b| {
                a.distance
                    .unwrap_or(0.0)
                    .total_cmp(&b.distance.unwrap_or(0.0))
            }),
            SortOrder::Price => stations.sort_by(|a, b| a.price_per_kwh.total_cmp(&b.price_per_kwh)),
            SortOrder::Power => stations.sort_by(|a, b| b.power.total_cmp(&a.power)),
            SortOrder::Name => stations.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        stations
    }

    pub(crate) fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    /// Replaces the whole list.
    ///
    /// The favorite set decides for ids seen before. An incoming favorite
    /// flag only counts the first time its id arrives.
    pub(crate) fn load(&mut self, mut stations: Vec<Station>) {
        tracing::info!("Loading {} stations", stations.len());
        for station in &stations {
            let first_seen = self.seen.insert(station.id.clone());
            if first_seen && station.is_favorite && !self.is_favorite(&station.id) {
                self.favorites.push(station.id.clone());
            }
        }
        for station in &mut stations {
            station.is_favorite = self.favorites.contains(&station.id);
        }
        self.stations = stations;
        self.is_loading = false;
    }

    pub(crate) fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    pub(crate) fn toggle_favorite(&mut self, id: &str) {
        let Some(station) = self.stations.iter_mut().find(|station| station.id == id) else {
            tracing::debug!("Ignoring favorite toggle for unknown station {}", id);
            return;
        };
        station.is_favorite = !station.is_favorite;

        if station.is_favorite {
            self.favorites.push(id.to_string());
        } else {
            self.favorites.retain(|favorite| favorite != id);
        }
    }

    pub(crate) fn update_status(&mut self, id: &str, status: StationStatus) {
        match self.stations.iter_mut().find(|station| station.id == id) {
            Some(station) => {
                tracing::info!("Station {} is now {:?}", id, status);
                station.status = status;
            }
            None => tracing::debug!("Ignoring status update for unknown station {}", id),
        }
    }
}
