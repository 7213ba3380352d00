use crate::errors::AppError;
use crate::loader::Feed;
use crate::models::ReservationSubmission;
use crate::reservation::{min_start_date, FormView, ReservationForm, SubmitOutcome};
use crate::state::AppState;
use crate::storage::{persist_preferences, Preferences};
use crate::ui::render_index;
use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    #[serde(flatten)]
    pub view: FormView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// Reservation fields from the page's native form post or from a JSON body.
#[derive(Debug)]
pub struct ReservationFields(pub ReservationSubmission);

#[async_trait]
impl<S> FromRequest<S> for ReservationFields
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(fields) = Form::<ReservationSubmission>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(fields))
        } else {
            let Json(fields) = Json::<ReservationSubmission>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(fields))
        }
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let fragments = state.loader.containers().snapshot().await;
    Html(render_index(&fragments, &min_start_date(today())))
}

pub async fn widget(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let feed = Feed::from_slug(&slug)
        .ok_or_else(|| AppError::not_found(format!("unknown widget: {slug}")))?;
    Ok(Html(state.loader.containers().get(feed).await))
}

pub async fn submit_reservation(
    State(state): State<AppState>,
    ReservationFields(fields): ReservationFields,
) -> (StatusCode, Json<ReservationResponse>) {
    let mut form = ReservationForm::new(fields);
    let outcome = form.submit(&state.client, today()).await;

    let (status, id) = match outcome {
        SubmitOutcome::Accepted(receipt) => (StatusCode::OK, Some(receipt.id)),
        SubmitOutcome::Invalid(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        SubmitOutcome::Failed(_) => (StatusCode::BAD_GATEWAY, None),
    };

    let response = ReservationResponse {
        view: form.view().clone(),
        id,
    };
    (status, Json(response))
}

/// Stores the backend URL preference. It is picked up on the next start.
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(prefs): Json<Preferences>,
) -> Result<StatusCode, AppError> {
    persist_preferences(&state.preferences_path, &prefs).await?;
    info!(backend_url = ?prefs.backend_url, "stored backend preference");
    Ok(StatusCode::NO_CONTENT)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
