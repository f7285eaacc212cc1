use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, middleware::ClientIp},
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::{NewSignup, WaitlistEntryProfile},
    domain::entities::waitlist_entry::RegistrationStatus,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit).get(list))
        .route("/stats", get(stats))
        .route("/{email}", get(get_entry).delete(remove))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Fields are optional so that a missing field is reported by name instead of
/// as a generic deserialization failure.
#[derive(Deserialize)]
struct SubmitPayload {
    email: Option<String>,
    consent: Option<bool>,
    source: Option<String>,
    consent_timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SubmitResponse {
    #[serde(flatten)]
    entry: WaitlistEntryProfile,
    status: RegistrationStatus,
    message: &'static str,
}

#[derive(Serialize)]
struct RemoveResponse {
    email: String,
    status: &'static str,
    message: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /waitlist
async fn submit(
    State(app_state): State<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    payload: Result<Json<SubmitPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::validation("body", rejection.body_text()))?;

    let email = payload
        .email
        .ok_or_else(|| AppError::validation("email", "Email is required"))?;
    let consent = payload
        .consent
        .ok_or_else(|| AppError::validation("consent", "Consent is required"))?;

    let outcome = app_state
        .waitlist_use_cases
        .submit(NewSignup {
            email,
            consent,
            source: payload.source,
            consent_timestamp: payload.consent_timestamp,
            ip_address: client_ip.map(|Extension(ClientIp(ip))| ip),
        })
        .await?;

    let message = match outcome.status {
        RegistrationStatus::Added => "You've been added to our waiting list!",
        RegistrationStatus::AlreadyRegistered => "This email is already on the waitlist.",
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            entry: outcome.entry,
            status: outcome.status,
            message,
        }),
    ))
}

/// GET /waitlist
/// Administrative listing; access control is enforced in front of the service.
async fn list(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = app_state.waitlist_use_cases.list().await?;
    Ok(Json(entries))
}

/// GET /waitlist/stats
async fn stats(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = app_state.waitlist_use_cases.stats().await?;
    Ok(Json(stats))
}

/// GET /waitlist/{email}
async fn get_entry(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entry = app_state.waitlist_use_cases.get(&email).await?;
    Ok(Json(entry))
}

/// DELETE /waitlist/{email}
/// Self-service removal (right to erasure). Deletion is permanent.
async fn remove(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<impl IntoResponse> {
    let email = app_state.waitlist_use_cases.remove(&email).await?;

    Ok(Json(RemoveResponse {
        email,
        status: "removed",
        message: "Email removed from waitlist",
    }))
}
