use chrono::{DateTime, Utc};
use evc_core::{
    ChargingAction, ChargingSession, ChargingSummary, Notification, NotificationAction,
    NotificationKind, StationAction, StationStatus,
};

use crate::{Engine, EngineError, EngineResult};

/// Energy delivered by a charger of `power_kw` running for `elapsed_secs`, in kWh.
pub fn energy_for(elapsed_secs: u64, power_kw: f64) -> f64 {
    elapsed_secs as f64 * (power_kw / 3600.0)
}

/// Price of `energy_kwh` at `price_per_kwh`, in KGS.
pub fn cost_for(energy_kwh: f64, price_per_kwh: f64) -> f64 {
    energy_kwh * price_per_kwh
}

/// Whole seconds since the session started; zero for a start in the future.
pub fn elapsed_seconds(session: &ChargingSession, now: DateTime<Utc>) -> u64 {
    (now - session.start_time).num_seconds().max(0) as u64
}

impl Engine {
    pub async fn load_history(&self) -> EngineResult<usize> {
        self.dispatch(ChargingAction::SetLoading(true))?;
        let history = self.backend.fetch_history().await;
        let count = history.len();

        let mut state = self.lock();
        state.store.dispatch(ChargingAction::LoadHistory(history))?;
        state.store.dispatch(ChargingAction::SetLoading(false))?;
        Ok(count)
    }

    pub fn current_session(&self) -> Option<ChargingSession> {
        self.read(|store| store.charging().current().cloned())
    }

    /// The current session followed by the history.
    pub fn sessions(&self) -> Vec<ChargingSession> {
        self.read(|store| store.charging().all_sessions().cloned().collect())
    }

    pub fn charging_summary(&self) -> ChargingSummary {
        self.read(|store| store.charging().summary())
    }

    pub fn start_charging(
        &self,
        station_id: &str,
        connector_id: u32,
        amount_kwh: f64,
    ) -> EngineResult<ChargingSession> {
        self.start_charging_at(station_id, connector_id, amount_kwh, Utc::now())
    }

    /// Starts charging `amount_kwh` on one connector of `station_id`,
    /// prepaid from the wallet.
    pub fn start_charging_at(
        &self,
        station_id: &str,
        connector_id: u32,
        amount_kwh: f64,
        now: DateTime<Utc>,
    ) -> EngineResult<ChargingSession> {
        if amount_kwh.is_nan() || amount_kwh <= 0.0 {
            return Err(EngineError::EmptyAmount);
        }

        let mut state = self.lock();
        let station = state
            .store
            .stations()
            .get(station_id)
            .cloned()
            .ok_or_else(|| EngineError::StationNotFound(station_id.to_string()))?;
        if station.status != StationStatus::Available {
            return Err(EngineError::StationUnavailable {
                id: station.id,
                status: station.status,
            });
        }
        let prepaid = cost_for(amount_kwh, station.price_per_kwh);
        if prepaid > state.balance {
            return Err(EngineError::InsufficientBalance {
                required: prepaid,
                available: state.balance,
            });
        }
        if !station
            .connector(connector_id)
            .is_some_and(|connector| connector.is_available())
        {
            return Err(EngineError::ConnectorUnavailable {
                station_id: station.id,
                connector_id,
            });
        }

        let session = ChargingSession::start(&station, now);
        state.store.dispatch(ChargingAction::Start(session.clone()))?;
        state.store.dispatch(StationAction::UpdateStatus {
            id: station.id.clone(),
            status: StationStatus::Occupied,
        })?;
        state.balance -= prepaid;
        state.store.dispatch(NotificationAction::Add(Notification::new(
            NotificationKind::ChargingComplete,
            "Зарядка начата",
            format!("Зарядка начата на станции {}", station.name),
            now,
        )))?;

        tracing::info!(
            "Charging {} kWh at {} connector {} for {:.2} KGS, balance {:.2} KGS",
            amount_kwh,
            station.id,
            connector_id,
            prepaid,
            state.balance
        );
        Ok(session)
    }

    pub fn stop_charging(&self) -> EngineResult<ChargingSession> {
        self.stop_charging_at(Utc::now())
    }

    /// Finalizes the current session with the energy delivered until `now`.
    pub fn stop_charging_at(&self, now: DateTime<Utc>) -> EngineResult<ChargingSession> {
        let mut state = self.lock();
        let current = state
            .store
            .charging()
            .current()
            .cloned()
            .ok_or(EngineError::NoActiveSession)?;

        let elapsed = elapsed_seconds(&current, now);
        let (energy, cost) = match state.store.stations().get(&current.station_id) {
            Some(station) => {
                let energy = energy_for(elapsed, station.power);
                (energy, cost_for(energy, station.price_per_kwh))
            }
            None => {
                tracing::warn!(
                    "Station {} of session {} is gone, recording no energy",
                    current.station_id,
                    current.id
                );
                (0.0, 0.0)
            }
        };

        let station_id = current.station_id.clone();
        let finalized = current.finalize(now, energy, cost);
        state.store.dispatch(ChargingAction::Stop(finalized.clone()))?;
        state.store.dispatch(StationAction::UpdateStatus {
            id: station_id,
            status: StationStatus::Available,
        })?;
        state.store.dispatch(NotificationAction::Add(Notification::new(
            NotificationKind::ChargingComplete,
            "Зарядка завершена",
            format!("Стоимость: {:.0} сом", finalized.cost),
            now,
        )))?;

        tracing::info!(
            "Session {} finished after {} s: {:.3} kWh, {:.2} KGS",
            finalized.id,
            elapsed,
            energy,
            cost
        );
        Ok(finalized)
    }
}
