use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{IntakeService, IntakeServiceError, SessionView};
use super::store::{SessionId, SessionStore};
use crate::crm::CrmTransport;
use crate::forms::{FieldValue, FormError, FormKind, PrefillSource, SubmissionState};

type Service<S, T> = Arc<IntakeService<S, T>>;

/// Router builder exposing the landing selector and session endpoints.
pub fn intake_router<S, T>(service: Service<S, T>) -> Router
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    Router::new()
        .route("/api/v1/forms", get(forms_handler::<S, T>))
        .route("/api/v1/forms/:form", get(outline_handler::<S, T>))
        .route("/api/v1/forms/:form/sessions", post(open_handler::<S, T>))
        .route(
            "/api/v1/sessions/:session_id",
            get(view_handler::<S, T>).delete(discard_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/fields/:field",
            put(set_field_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/fields/:field/toggle",
            post(toggle_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/advance",
            post(advance_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/retreat",
            post(retreat_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/revisit/:step",
            post(revisit_handler::<S, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/submit",
            post(submit_handler::<S, T>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdate {
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub option: String,
}

pub(crate) async fn forms_handler<S, T>(State(service): State<Service<S, T>>) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    (StatusCode::OK, Json(service.catalog().summaries())).into_response()
}

pub(crate) async fn outline_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(form): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    match FormKind::parse(&form) {
        Some(kind) => (StatusCode::OK, Json(service.catalog().outline(kind))).into_response(),
        None => unknown_form(&form),
    }
}

pub(crate) async fn open_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(form): Path<String>,
    Query(prefill): Query<PrefillSource>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    let Some(kind) = FormKind::parse(&form) else {
        return unknown_form(&form);
    };
    respond(service.open(kind, prefill), StatusCode::CREATED)
}

pub(crate) async fn view_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| respond(service.view(&id), StatusCode::OK))
}

pub(crate) async fn discard_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| match service.discard(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    })
}

pub(crate) async fn set_field_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path((session_id, field)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| {
        respond(service.set_field(&id, &field, update.value), StatusCode::OK)
    })
}

pub(crate) async fn toggle_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path((session_id, field)): Path<(String, String)>,
    Json(request): Json<ToggleRequest>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| {
        respond(service.toggle(&id, &field, &request.option), StatusCode::OK)
    })
}

pub(crate) async fn advance_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| respond(service.advance(&id), StatusCode::OK))
}

pub(crate) async fn retreat_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| respond(service.retreat(&id), StatusCode::OK))
}

pub(crate) async fn revisit_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path((session_id, step)): Path<(String, usize)>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    with_session(&session_id, |id| {
        respond(service.revisit(&id, step), StatusCode::OK)
    })
}

pub(crate) async fn submit_handler<S, T>(
    State(service): State<Service<S, T>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    let Some(id) = SessionId::parse(&session_id) else {
        return unknown_session(&session_id);
    };

    match service.submit(&id).await {
        Ok(view) => {
            let status = match view.snapshot.submission {
                SubmissionState::InFlight => StatusCode::ACCEPTED,
                SubmissionState::Failed(_) => StatusCode::BAD_GATEWAY,
                SubmissionState::NotStarted | SubmissionState::Succeeded => StatusCode::OK,
            };
            (status, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn with_session(raw: &str, handler: impl FnOnce(SessionId) -> Response) -> Response {
    match SessionId::parse(raw) {
        Some(id) => handler(id),
        None => unknown_session(raw),
    }
}

fn respond(result: Result<SessionView, IntakeServiceError>, status: StatusCode) -> Response {
    match result {
        Ok(view) => (status, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: IntakeServiceError) -> Response {
    let status = match &error {
        IntakeServiceError::NotFound(_) | IntakeServiceError::Disposed(_) => StatusCode::NOT_FOUND,
        IntakeServiceError::Form(form_error) => form_error_status(form_error),
        IntakeServiceError::Poisoned(_)
        | IntakeServiceError::Delivery(..)
        | IntakeServiceError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn form_error_status(error: &FormError) -> StatusCode {
    match error {
        FormError::UnknownField { .. }
        | FormError::ValueShape { .. }
        | FormError::NotMultiSelect { .. }
        | FormError::UnknownOption { .. }
        | FormError::StepOutOfRange { .. } => StatusCode::BAD_REQUEST,
        FormError::StepIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FormError::StepLocked { .. }
        | FormError::NotOnFinalStep { .. }
        | FormError::SubmissionInFlight
        | FormError::Closed => StatusCode::CONFLICT,
    }
}

fn unknown_form(form: &str) -> Response {
    let payload = json!({
        "error": format!("unknown form `{form}`"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn unknown_session(raw: &str) -> Response {
    let payload = json!({
        "error": format!("session {raw} not found"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
