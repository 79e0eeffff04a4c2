use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::StepInput;
use super::lookup::{
    AppointmentLedger, LedgerError, LookupError, LookupOutcome, LookupQuery, NOT_FOUND_MESSAGE,
};
use super::modal::ModalKind;
use super::service::{AppointmentService, AppointmentServiceError, StartSessionRequest};
use super::session::{SessionError, SessionId, SessionRepository, SessionView};
use super::wizard::WizardError;

/// Router builder exposing the office directory, the schedule rules, and booking sessions.
pub fn appointment_router<R, L>(service: Arc<AppointmentService<R, L>>) -> Router
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    Router::new()
        .route("/api/v1/locations", get(regions_handler::<R, L>))
        .route("/api/v1/locations/:region", get(sub_regions_handler::<R, L>))
        .route(
            "/api/v1/locations/:region/:country",
            get(offices_handler::<R, L>),
        )
        .route("/api/v1/schedule/slots", get(slots_handler::<R, L>))
        .route(
            "/api/v1/schedule/selectable",
            get(selectable_handler::<R, L>),
        )
        .route("/api/v1/sessions", post(start_handler::<R, L>))
        .route(
            "/api/v1/sessions/:session_id",
            get(session_handler::<R, L>).delete(end_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/steps",
            post(submit_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/steps/check",
            post(check_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/back",
            post(back_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/reset",
            post(reset_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/cancel",
            post(cancel_handler::<R, L>),
        )
        .route(
            "/api/v1/sessions/:session_id/modal",
            post(open_modal_handler::<R, L>).delete(close_modal_handler::<R, L>),
        )
        .route("/api/v1/lookup", post(find_handler::<R, L>))
        .route(
            "/api/v1/sessions/:session_id/lookup",
            post(lookup_handler::<R, L>).get(lookup_status_handler::<R, L>),
        )
        .with_state(service)
}

type ServiceState<R, L> = State<Arc<AppointmentService<R, L>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct SelectableParams {
    date: NaiveDate,
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModalRequest {
    kind: ModalKind,
}

pub(crate) async fn regions_handler<R, L>(State(service): ServiceState<R, L>) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    let regions = service.directory().regions();
    (StatusCode::OK, Json(json!({ "regions": regions }))).into_response()
}

pub(crate) async fn sub_regions_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(region): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    let countries = service.directory().sub_regions(&region);
    let payload = json!({ "region": region, "countries": countries });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn offices_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path((region, country)): Path<(String, String)>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    let offices = service.directory().offices(&region, &country);
    let payload = json!({ "region": region, "country": country, "offices": offices });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn slots_handler<R, L>(State(service): ServiceState<R, L>) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    let slots: Vec<&str> = service
        .policy()
        .time_slots()
        .iter()
        .map(|slot| slot.label())
        .collect();
    (StatusCode::OK, Json(json!({ "time_slots": slots }))).into_response()
}

pub(crate) async fn selectable_handler<R, L>(
    State(service): ServiceState<R, L>,
    Query(params): Query<SelectableParams>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    let policy = service.policy();
    let today = params.today.unwrap_or_else(|| service.today());
    let payload = json!({
        "date": params.date,
        "today": today,
        "selectable": policy.is_selectable(params.date, today),
        "last_bookable": policy.last_bookable(today),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn start_handler<R, L>(
    State(service): ServiceState<R, L>,
    Json(request): Json<StartSessionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    match service.start_session(request) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.session(&SessionId(session_id)))
}

pub(crate) async fn end_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    match service.end_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
    Json(input): Json<StepInput>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.submit_step(&SessionId(session_id), input))
}

pub(crate) async fn check_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
    Json(input): Json<StepInput>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    match service.check_step(&SessionId(session_id), &input) {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn back_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.go_back(&SessionId(session_id)))
}

pub(crate) async fn reset_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.reset(&SessionId(session_id)))
}

pub(crate) async fn cancel_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.cancel(&SessionId(session_id)))
}

pub(crate) async fn open_modal_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
    Json(request): Json<ModalRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.open_modal(&SessionId(session_id), request.kind))
}

pub(crate) async fn close_modal_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    view_response(service.close_modal(&SessionId(session_id)))
}

pub(crate) async fn find_handler<R, L>(
    State(service): ServiceState<R, L>,
    Json(query): Json<LookupQuery>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    lookup_response(service.find_appointment(query).await)
}

pub(crate) async fn lookup_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
    Json(query): Json<LookupQuery>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    lookup_response(service.lookup(&SessionId(session_id), query).await)
}

pub(crate) async fn lookup_status_handler<R, L>(
    State(service): ServiceState<R, L>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    match service.lookup_status(&SessionId(session_id)) {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(error) => error_response(error),
    }
}

fn lookup_response(result: Result<LookupOutcome, AppointmentServiceError>) -> Response {
    match result {
        Ok(LookupOutcome::Found(appointment)) => {
            let payload = json!({ "state": "found", "appointment": appointment });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(LookupOutcome::NotFound) => {
            let payload = json!({ "state": "not_found", "message": NOT_FOUND_MESSAGE });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(LookupOutcome::Superseded) => {
            let payload = json!({ "state": "superseded" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn view_response(result: Result<SessionView, AppointmentServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: AppointmentServiceError) -> Response {
    let status = status_for(&error);
    let mut payload = json!({ "error": error.to_string() });
    if let AppointmentServiceError::Wizard(WizardError::Invalid(invalid)) = &error {
        payload["field"] = json!(invalid.field());
    }
    (status, Json(payload)).into_response()
}

/// Validation failures are 422 and carry the field; wizard misuse is 409.
pub(crate) fn status_for(error: &AppointmentServiceError) -> StatusCode {
    match error {
        AppointmentServiceError::Wizard(WizardError::Invalid(_))
        | AppointmentServiceError::TermsNotAccepted
        | AppointmentServiceError::Lookup(LookupError::MissingCredentials) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppointmentServiceError::Wizard(_)
        | AppointmentServiceError::Session(SessionError::Conflict)
        | AppointmentServiceError::Ledger(LedgerError::Conflict(_)) => StatusCode::CONFLICT,
        AppointmentServiceError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
        AppointmentServiceError::Lookup(LookupError::Unavailable(_))
        | AppointmentServiceError::Ledger(LedgerError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AppointmentServiceError::Session(SessionError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
