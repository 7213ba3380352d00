//! HTTP client for the PHP booking backend.
//!
//! Every feed goes through the same base URL. The envelope-style feeds are
//! unwrapped here so callers only ever see rows or a [`FeedError`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::FeedError;
use crate::models::{
    Envelope, FacilityItem, GalleryItem, ReservationReceipt, ReservationSubmission, ScheduleRow,
    TestimonialItem,
};

const DATA_ENDPOINT: &str = "api-data.php";
const RESERVATION_ENDPOINT: &str = "api-reservasi.php";

/// Shown when the backend rejects a request without saying why.
pub const GENERIC_REJECTION: &str = "Terjadi kesalahan";

/// Clone is cheap, the underlying reqwest client is reference counted.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, script: &str) -> String {
        format!("{}/{script}", self.base_url)
    }

    pub async fn fetch_schedule(&self) -> Result<Vec<ScheduleRow>, FeedError> {
        self.get_envelope(DATA_ENDPOINT, "jadwal").await
    }

    pub async fn fetch_time_slots(&self) -> Result<Vec<String>, FeedError> {
        self.get_envelope(RESERVATION_ENDPOINT, "jam").await
    }

    pub async fn fetch_testimonials(&self) -> Result<Vec<TestimonialItem>, FeedError> {
        self.get_envelope(DATA_ENDPOINT, "testimoni").await
    }

    pub async fn fetch_facilities(&self) -> Result<Vec<FacilityItem>, FeedError> {
        non_empty(self.get_json(DATA_ENDPOINT, "get_fasilitas").await?)
    }

    pub async fn fetch_gallery(&self) -> Result<Vec<GalleryItem>, FeedError> {
        non_empty(self.get_json(DATA_ENDPOINT, "get_galeri").await?)
    }

    pub async fn submit_reservation(
        &self,
        submission: &ReservationSubmission,
    ) -> Result<ReservationReceipt, FeedError> {
        let url = self.endpoint(RESERVATION_ENDPOINT);
        debug!(url = %url, "posting reservation");

        let response = self.client.post(&url).json(submission).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "reservation response");
        if !status.is_success() {
            return Err(FeedError::from_status(status));
        }

        let bytes = response.bytes().await?;
        let envelope: Envelope<ReservationReceipt> =
            serde_json::from_slice(&bytes).map_err(|err| FeedError::Malformed(err.to_string()))?;
        if !envelope.success {
            return Err(rejection(envelope.message));
        }
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        script: &str,
        action: &str,
    ) -> Result<Vec<T>, FeedError> {
        let envelope: Envelope<Vec<T>> = self.get_json(script, action).await?;
        if !envelope.success {
            return Err(rejection(envelope.message));
        }
        non_empty(envelope.data.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, script: &str, action: &str) -> Result<T, FeedError> {
        let url = self.endpoint(script);
        debug!(url = %url, action, "fetching feed");

        let response = self
            .client
            .get(&url)
            .query(&[("action", action)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::from_status(status));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| FeedError::Malformed(err.to_string()))
    }
}

fn non_empty<T>(items: Vec<T>) -> Result<Vec<T>, FeedError> {
    if items.is_empty() {
        Err(FeedError::Empty)
    } else {
        Ok(items)
    }
}

fn rejection(message: Option<String>) -> FeedError {
    let message = message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_REJECTION.to_string());
    FeedError::Rejected(message)
}
