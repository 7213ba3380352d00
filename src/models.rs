use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Wire envelope used by every feed except facilities and gallery.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One time slot of the weekly schedule. An empty or missing day means the
/// slot is still available on that day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleRow {
    #[serde(default)]
    pub jam: String,
    #[serde(default)]
    pub senin: Option<String>,
    #[serde(default)]
    pub selasa: Option<String>,
    #[serde(default)]
    pub rabu: Option<String>,
    #[serde(default)]
    pub kamis: Option<String>,
    #[serde(default)]
    pub jumat: Option<String>,
    #[serde(default)]
    pub sabtu: Option<String>,
    #[serde(default)]
    pub minggu: Option<String>,
}

impl ScheduleRow {
    /// Occupant labels Monday through Sunday, `None` when available.
    pub fn days(&self) -> [Option<&str>; 7] {
        [
            &self.senin,
            &self.selasa,
            &self.rabu,
            &self.kamis,
            &self.jumat,
            &self.sabtu,
            &self.minggu,
        ]
        .map(|day| day.as_deref().filter(|label| !label.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestimonialItem {
    #[serde(default)]
    pub nama: Option<String>,
    #[serde(default)]
    pub pesan: Option<String>,
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub foto: Option<String>,
}

impl TestimonialItem {
    pub const DEFAULT_NAME: &'static str = "Pengguna";
    pub const DEFAULT_RATING: f64 = 5.0;

    pub fn display_name(&self) -> &str {
        self.nama
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(Self::DEFAULT_NAME)
    }

    pub fn message(&self) -> &str {
        self.pesan.as_deref().unwrap_or_default()
    }

    /// Rating clamped to 0..=5. A missing or zero rating shows as five stars.
    pub fn display_rating(&self) -> f64 {
        match self.rating {
            Some(rating) if rating.is_finite() && rating != 0.0 => rating.clamp(0.0, 5.0),
            _ => Self::DEFAULT_RATING,
        }
    }

    pub fn photo(&self) -> Option<&str> {
        self.foto.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FacilityItem {
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub deskripsi: String,
    #[serde(default)]
    pub foto_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GalleryItem {
    pub url: String,
}

/// Reservation form fields keyed by input name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReservationSubmission {
    fields: BTreeMap<String, String>,
}

impl ReservationSubmission {
    pub const START_DATE_FIELD: &'static str = "tanggal_mulai";

    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn start_date(&self) -> Option<&str> {
        self.get(Self::START_DATE_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReservationSubmission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservationReceipt {
    #[serde(default)]
    pub id: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// PHP backends often hand numeric columns back as strings.
fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(value)) => Some(value),
        Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
