use serde::{Deserialize, Serialize};

use crate::SessionError;
use crate::models::{ChargingSession, SessionUpdate};

/// Totals shown above the history list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSummary {
    pub total_sessions: usize,
    /// kWh
    pub total_energy: f64,
    /// KGS
    pub total_cost: f64,
}

/// The active session, if any, and the finished ones (most recent first).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingState {
    current: Option<ChargingSession>,
    history: Vec<ChargingSession>,
    is_loading: bool,
}

impl ChargingState {
    pub fn current(&self) -> Option<&ChargingSession> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[ChargingSession] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The current session followed by the history.
    pub fn all_sessions(&self) -> impl Iterator<Item = &ChargingSession> {
        self.current.iter().chain(self.history.iter())
    }

    pub fn summary(&self) -> ChargingSummary {
        self.all_sessions()
            .fold(ChargingSummary::default(), |mut summary, session| {
                summary.total_sessions += 1;
                summary.total_energy += session.energy_consumed;
                summary.total_cost += session.cost;
                summary
            })
    }

    pub(crate) fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub(crate) fn start(&mut self, session: ChargingSession) -> Result<(), SessionError> {
        if let Some(current) = &self.current {
            return Err(SessionError::AlreadyActive {
                session_id: current.id.clone(),
            });
        }
        tracing::info!(
            "Starting session {} at station {}",
            session.id,
            session.station_id
        );
        self.current = Some(session);
        self.is_loading = false;
        Ok(())
    }

    /// Archives `finalized` in place of the current session.
    ///
    /// Returns `false` and changes nothing when no session is current.
    pub(crate) fn stop(&mut self, finalized: ChargingSession) -> bool {
        self.is_loading = false;
        if self.current.take().is_none() {
            tracing::debug!("Ignoring stop of session {}: nothing is charging", finalized.id);
            return false;
        }
        tracing::info!("Session {} moved to history", finalized.id);
        self.history.insert(0, finalized);
        true
    }

    pub(crate) fn load_history(&mut self, history: Vec<ChargingSession>) {
        self.history = history;
    }

    pub(crate) fn update_current(&mut self, update: SessionUpdate) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if let Some(end_time) = update.end_time {
            current.end_time = Some(end_time);
        }
        if let Some(energy_consumed) = update.energy_consumed {
            current.energy_consumed = energy_consumed;
        }
        if let Some(cost) = update.cost {
            current.cost = cost;
        }
        if let Some(status) = update.status {
            current.status = status;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{SessionStatus, StationStatus};
    use crate::stations::test::station;
    use chrono::{Duration, Utc};

    fn session(station_id: &str) -> ChargingSession {
        ChargingSession::start(&station(station_id, StationStatus::Available), Utc::now())
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut state = ChargingState::default();
        state.load_history(vec![session("old").finalize(Utc::now(), 5.0, 75.0)]);
        let history_before = state.history().to_vec();

        assert!(!state.stop(session("s1").finalize(Utc::now(), 1.0, 15.0)));

        assert!(state.current().is_none());
        assert_eq!(state.history(), history_before.as_slice());
    }

    #[test]
    fn test_start_then_stop_moves_session_to_history() {
        let mut state = ChargingState::default();
        state.load_history(vec![session("old").finalize(Utc::now(), 5.0, 75.0)]);

        let started = session("s1");
        state.start(started.clone()).expect("Could not start the session");
        assert_eq!(state.current(), Some(&started));

        let finalized = started.finalize(Utc::now() + Duration::minutes(30), 30.0, 450.0);
        assert!(state.stop(finalized.clone()));

        assert!(state.current().is_none());
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0], finalized);
        assert_eq!(state.history()[0].status, SessionStatus::Completed);

        // A second stop has nothing to archive
        assert!(!state.stop(finalized));
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_start_while_active_is_rejected() {
        let mut state = ChargingState::default();
        let first = session("s1");
        state.start(first.clone()).unwrap();

        match state.start(session("s2")) {
            Err(SessionError::AlreadyActive { session_id }) => assert_eq!(session_id, first.id),
            other => panic!("Expected AlreadyActive error, got {other:?}"),
        }
        assert_eq!(state.current(), Some(&first));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_load_history_keeps_current() {
        let mut state = ChargingState::default();
        let current = session("s1");
        state.start(current.clone()).unwrap();

        state.load_history(vec![
            session("a").finalize(Utc::now(), 1.0, 10.0),
            session("b").finalize(Utc::now(), 2.0, 20.0),
        ]);

        assert_eq!(state.current(), Some(&current));
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_update_current_merges_fields() {
        let mut state = ChargingState::default();
        state.update_current(SessionUpdate {
            energy_consumed: Some(3.0),
            ..Default::default()
        });
        assert!(state.current().is_none());

        state.start(session("s1")).unwrap();
        state.update_current(SessionUpdate {
            energy_consumed: Some(3.0),
            cost: Some(45.0),
            ..Default::default()
        });

        let current = state.current().unwrap();
        assert_eq!(current.energy_consumed, 3.0);
        assert_eq!(current.cost, 45.0);
        assert!(current.is_active());
    }

    #[test]
    fn test_summary_includes_current_session() {
        let mut state = ChargingState::default();
        state.load_history(vec![
            session("a").finalize(Utc::now(), 10.0, 150.0),
            session("b").finalize(Utc::now(), 4.5, 60.0),
        ]);
        state.start(session("s1")).unwrap();

        let summary = state.summary();
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_energy, 14.5);
        assert_eq!(summary.total_cost, 210.0);
        assert_eq!(state.all_sessions().next().map(|s| s.station_id.as_str()), Some("s1"));
    }
}
