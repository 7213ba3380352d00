//! Reservation form submission.
//!
//! The form owns its fields and the indicator state shown around the submit
//! button. A submission always leaves the button enabled and the loading
//! indicator hidden, including when the future is dropped mid-request.

use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::client::BackendClient;
use crate::errors::FeedError;
use crate::models::{ReservationReceipt, ReservationSubmission};

pub const PAST_DATE_MESSAGE: &str = "Tanggal tidak boleh lewat";
pub const MISSING_DATE_MESSAGE: &str = "Tanggal mulai wajib diisi";
pub const FALLBACK_ERROR_MESSAGE: &str = "Terjadi kesalahan saat mengirim data";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What the visitor sees around the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormView {
    pub submit_disabled: bool,
    pub loading_visible: bool,
    pub success_visible: bool,
    pub error_message: Option<String>,
    /// Set when the success message should be scrolled into view.
    pub scroll_to_success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(ReservationReceipt),
    Invalid(String),
    Failed(String),
}

/// Earliest date the date picker should offer.
pub fn min_start_date(today: NaiveDate) -> String {
    today.format(DATE_FORMAT).to_string()
}

/// Start date must parse and must not be before `today`. Time of day never
/// enters the comparison.
pub fn validate_start_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, FeedError> {
    let date = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
        .ok_or_else(|| FeedError::Validation(MISSING_DATE_MESSAGE.to_string()))?;

    if date < today {
        return Err(FeedError::Validation(PAST_DATE_MESSAGE.to_string()));
    }
    Ok(date)
}

#[derive(Debug, Clone, Default)]
pub struct ReservationForm {
    fields: ReservationSubmission,
    view: FormView,
}

impl ReservationForm {
    pub fn new(fields: ReservationSubmission) -> Self {
        Self {
            fields,
            view: FormView::default(),
        }
    }

    pub fn fields(&self) -> &ReservationSubmission {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut ReservationSubmission {
        &mut self.fields
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub async fn submit(&mut self, client: &BackendClient, today: NaiveDate) -> SubmitOutcome {
        let Self { fields, view } = self;
        let mut view = Busy::begin(view);

        let result = send(fields, client, today).await;
        match result {
            Ok(receipt) => {
                info!(id = %receipt.id, "reservation accepted");
                view.success_visible = true;
                view.scroll_to_success = true;
                fields.clear();
                SubmitOutcome::Accepted(receipt)
            }
            Err(err) => {
                let message = Some(err.to_string())
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
                view.error_message = Some(message.clone());
                if err.is_validation() {
                    warn!(reason = %message, "reservation rejected locally");
                    SubmitOutcome::Invalid(message)
                } else {
                    error!(error = %message, "reservation failed");
                    SubmitOutcome::Failed(message)
                }
            }
        }
    }
}

async fn send(
    fields: &ReservationSubmission,
    client: &BackendClient,
    today: NaiveDate,
) -> Result<ReservationReceipt, FeedError> {
    validate_start_date(fields.start_date(), today)?;
    client.submit_reservation(fields).await
}

/// Holds the form in its submitting state and restores the controls on drop.
struct Busy<'a> {
    view: &'a mut FormView,
}

impl<'a> Busy<'a> {
    fn begin(view: &'a mut FormView) -> Self {
        view.submit_disabled = true;
        view.loading_visible = true;
        view.error_message = None;
        view.success_visible = false;
        view.scroll_to_success = false;
        Self { view }
    }
}

impl Deref for Busy<'_> {
    type Target = FormView;

    fn deref(&self) -> &FormView {
        &*self.view
    }
}

impl DerefMut for Busy<'_> {
    fn deref_mut(&mut self) -> &mut FormView {
        &mut *self.view
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.view.submit_disabled = false;
        self.view.loading_visible = false;
    }
}
