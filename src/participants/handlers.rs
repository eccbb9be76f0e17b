use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{AddParticipantRequest, MessageResponse, UpdateParticipantRequest};
use super::repo_types::{HomeRecord, Participant, ParticipantDetails, ParticipantSummary, WorkRecord};
use super::validation::normalize_email;
use crate::{
    error::{ApiError, StoreError},
    state::AppState,
};

/// Routes mounted under `/participants`; the admin gate is layered on by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(auth_test))
        .route("/add", post(add_participant))
        .route("/", get(list_participants))
        .route("/details", get(list_details))
        .route("/details/:email", get(get_details))
        .route("/work/:email", get(get_work))
        .route("/home/:email", get(get_home))
        .route("/:email", put(update_participant).delete(delete_participant))
}

type ApiResult<T> = Result<T, ApiError>;

fn store_failure(op: &'static str) -> impl Fn(StoreError) -> ApiError {
    move |e| {
        match &e {
            StoreError::NotFound(_) => warn!(error = %e, op, "not found"),
            StoreError::Database(_) => error!(error = %e, op, "store failure"),
        }
        e.into()
    }
}

fn body_rejected(e: JsonRejection) -> ApiError {
    warn!(error = %e.body_text(), "rejected request body");
    ApiError::BadRequest(e.body_text())
}

pub async fn auth_test() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "You are authenticated as admin",
    })
}

#[instrument(skip(state, payload))]
pub async fn add_participant(
    State(state): State<AppState>,
    payload: Result<Json<AddParticipantRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload.map_err(body_rejected)?;
    let new = payload.validate().map_err(|e| {
        warn!(error = %e, "invalid participant");
        e
    })?;

    state
        .participants
        .create(&new)
        .await
        .map_err(store_failure("create"))?;

    info!(email = %new.participant.email, "participant added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Participant added successfully",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_participants(State(state): State<AppState>) -> ApiResult<Json<Vec<Participant>>> {
    let rows = state
        .participants
        .list_all()
        .await
        .map_err(store_failure("list_all"))?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn list_details(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ParticipantSummary>>> {
    let rows = state
        .participants
        .list_summaries()
        .await
        .map_err(store_failure("list_summaries"))?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_details(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<ParticipantDetails>> {
    let email = normalize_email(&email);
    let details = state
        .participants
        .get_by_email(&email)
        .await
        .map_err(store_failure("get_by_email"))?;
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn get_work(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<WorkRecord>> {
    let email = normalize_email(&email);
    let work = state
        .participants
        .get_work_by_email(&email)
        .await
        .map_err(store_failure("get_work_by_email"))?;
    Ok(Json(work))
}

#[instrument(skip(state))]
pub async fn get_home(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<HomeRecord>> {
    let email = normalize_email(&email);
    let home = state
        .participants
        .get_home_by_email(&email)
        .await
        .map_err(store_failure("get_home_by_email"))?;
    Ok(Json(home))
}

#[instrument(skip(state, payload))]
pub async fn update_participant(
    State(state): State<AppState>,
    Path(email): Path<String>,
    payload: Result<Json<UpdateParticipantRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(payload) = payload.map_err(body_rejected)?;
    let email = normalize_email(&email);
    let update = payload.validate().map_err(|e| {
        warn!(error = %e, "invalid participant update");
        e
    })?;

    state
        .participants
        .update(&email, &update)
        .await
        .map_err(store_failure("update"))?;

    info!(%email, "participant updated");
    Ok(Json(MessageResponse {
        message: "Participant updated successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let email = normalize_email(&email);
    state
        .participants
        .delete(&email)
        .await
        .map_err(store_failure("delete"))?;

    info!(%email, "participant deleted");
    Ok(Json(MessageResponse {
        message: "Participant deleted successfully",
    }))
}
