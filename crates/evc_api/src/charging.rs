use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use evc_core::time::{format_duration, format_elapsed};
use evc_core::{ChargingSession, ChargingSummary};
use evc_engine::{Engine, EngineError, cost_for, elapsed_seconds, energy_for};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};

use crate::error::ApiResult;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub station_id: String,
    pub connector_id: u32,
    /// kWh to prepay
    pub amount_kwh: f64,
}

/// The running session with the values a charging screen shows.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub session: ChargingSession,
    pub elapsed_secs: u64,
    /// `MM:SS` or `HH:MM:SS`
    pub elapsed: String,
    pub energy: f64,
    pub cost: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResponse {
    pub current: Option<LiveSession>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub session: ChargingSession,
    pub duration: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub sessions: Vec<HistoryEntry>,
    pub summary: ChargingSummary,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    /// KGS
    pub balance: f64,
}

pub async fn current_session(State(engine): State<Arc<Engine>>) -> Json<CurrentResponse> {
    let now = Utc::now();
    let current = engine.read(|store| {
        let session = store.charging().current()?.clone();
        let elapsed_secs = elapsed_seconds(&session, now);
        let (energy, cost) = store
            .stations()
            .get(&session.station_id)
            .map(|station| {
                let energy = energy_for(elapsed_secs, station.power);
                (energy, cost_for(energy, station.price_per_kwh))
            })
            .unwrap_or_default();
        Some(LiveSession {
            session,
            elapsed_secs,
            elapsed: format_elapsed(elapsed_secs),
            energy,
            cost,
        })
    });
    Json(CurrentResponse { current })
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElapsedTick {
    pub elapsed_secs: u64,
    pub elapsed: String,
}

/// SSE stream of the running session's elapsed time, one event per second.
///
/// The stream ends when the session stops.
pub async fn elapsed_events(
    State(engine): State<Arc<Engine>>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let ticker = engine
        .watch_elapsed()
        .ok_or(EngineError::NoActiveSession)?;
    tracing::info!("Streaming elapsed time of session {}", ticker.session_id());

    let updates = WatchStream::new(ticker.subscribe());
    let stream = updates.map(move |elapsed_secs| {
        // The ticker task lives as long as this stream
        let _ticker = &ticker;
        let tick = ElapsedTick {
            elapsed_secs,
            elapsed: format_elapsed(elapsed_secs),
        };
        let json = serde_json::to_string(&tick).unwrap_or_default();
        Ok(Event::default().event("elapsed").data(json))
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

pub async fn start_charging(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<StartRequest>,
) -> ApiResult<Json<ChargingSession>> {
    let session = engine.start_charging(
        &request.station_id,
        request.connector_id,
        request.amount_kwh,
    )?;
    Ok(Json(session))
}

pub async fn stop_charging(State(engine): State<Arc<Engine>>) -> ApiResult<Json<ChargingSession>> {
    Ok(Json(engine.stop_charging()?))
}

/// Current session first, then the finished ones
pub async fn history(State(engine): State<Arc<Engine>>) -> Json<HistoryResponse> {
    let sessions = engine
        .sessions()
        .into_iter()
        .map(|session| HistoryEntry {
            duration: format_duration(session.start_time, session.end_time),
            session,
        })
        .collect();
    Json(HistoryResponse {
        sessions,
        summary: engine.charging_summary(),
    })
}

pub async fn wallet(State(engine): State<Arc<Engine>>) -> Json<WalletResponse> {
    Json(WalletResponse {
        balance: engine.balance(),
    })
}
