use axum::Json;
use axum::extract::Path;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::IsoWeek;
use crate::services::{ExportOutcome, LoadOutcome, ScheduleSnapshot};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule: ScheduleSnapshot,
    pub outcome: Option<LoadOutcome>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    pub school_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub logged_in: Option<bool>,
    pub school_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_schedule))
        .route("/schedule/week/{week}", put(change_week))
        .route("/schedule/refresh", post(refresh_schedule))
        .route("/schedule/export/{week}", post(export_week))
        .route("/session", get(get_session).put(update_session).delete(log_out))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn get_schedule(State(state): State<AppState>) -> Json<ScheduleSnapshot> {
    Json(state.schedule.snapshot())
}

/// Load failures are reported in the body next to the still-valid view,
/// not as an HTTP error.
fn schedule_response(state: &AppState, result: Result<LoadOutcome, AppError>) -> ScheduleResponse {
    let (outcome, error) = match result {
        Ok(outcome) => (Some(outcome), None),
        Err(e) => (None, Some(e.to_string())),
    };
    ScheduleResponse {
        schedule: state.schedule.snapshot(),
        outcome,
        error,
    }
}

async fn change_week(
    State(state): State<AppState>,
    Path(week): Path<u32>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let week = IsoWeek::new(week)?;
    let result = state.schedule.change_week(week).await;
    Ok(Json(schedule_response(&state, result)))
}

async fn refresh_schedule(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let result = state.schedule.refresh().await;
    Json(schedule_response(&state, result))
}

async fn export_week(
    State(state): State<AppState>,
    Path(week): Path<u32>,
) -> Result<Json<ExportResponse>, AppError> {
    let week = IsoWeek::new(week)?;
    match state.schedule.export(week).await? {
        ExportOutcome::Saved(path) => Ok(Json(ExportResponse {
            path: path.display().to_string(),
        })),
        ExportOutcome::NothingToExport => Err(AppError::NotFound),
    }
}

async fn session_response(state: &AppState) -> Result<SessionResponse, AppError> {
    Ok(SessionResponse {
        logged_in: state.login.is_logged_in(),
        school_id: state.schedule.sync().preferences().selected_school_id().await?,
    })
}

async fn get_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(session_response(&state).await?))
}

async fn update_session(
    State(state): State<AppState>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if let Some(school_id) = req.school_id {
        let school_id = school_id.trim();
        if school_id.is_empty() {
            return Err(AppError::BadRequest("school_id must not be empty".to_string()));
        }
        state
            .schedule
            .sync()
            .preferences()
            .set_selected_school_id(school_id)
            .await?;
        info!("Selected school set to {}", school_id);
    }
    if let Some(logged_in) = req.logged_in {
        state.login.set_logged_in(logged_in).await?;
    }
    Ok(Json(session_response(&state).await?))
}

async fn log_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.login.log_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
