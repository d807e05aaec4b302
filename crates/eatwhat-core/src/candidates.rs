use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category every candidate falls back to when nothing else matches.
pub const DEFAULT_CATEGORY_ID: i64 = 1;

/// Placeholder price label for candidates whose source has none.
pub const DEFAULT_PRICE_LABEL: &str = "￥20-80";

/// Description stored when the source supplies no free-text type.
pub const DEFAULT_DESCRIPTION: &str = "restaurant";

/// Label used for missing addresses and distances.
pub const UNKNOWN_LABEL: &str = "unknown";

/// A WGS-84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A restaurant that can land on the wheel.
///
/// `id` is stable for the lifetime of a pool snapshot. Two candidates are
/// duplicates iff `name` and `address` match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub category_id: i64,
    /// 0.0 to 5.0 with one decimal place.
    pub rating: Decimal,
    pub price_label: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    /// Free-text type reported by the provider, e.g. `"餐饮服务;中餐厅;川菜馆"`.
    pub description: String,
    pub location: GeoPoint,
    /// Computed against the active [`LocationFix`]; never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl Candidate {
    /// Human-readable distance, `"850 m"` or `"unknown"`.
    #[must_use]
    pub fn distance_label(&self) -> String {
        distance_label(self.distance_meters)
    }

    /// Returns `true` when `other` describes the same place under the dedup rule.
    #[must_use]
    pub fn is_duplicate_of(&self, other: &Candidate) -> bool {
        self.name == other.name && self.address == other.address
    }
}

/// Formats an optional metre distance the way result cards display it.
#[must_use]
pub fn distance_label(distance_meters: Option<f64>) -> String {
    match distance_meters {
        Some(m) if m.is_finite() => format!("{m:.0} m"),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// Input record for a category insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub icon: Option<String>,
}

/// Input record for a candidate insert. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub name: String,
    pub address: String,
    pub category_id: i64,
    pub rating: Decimal,
    pub price_label: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub description: String,
    pub location: GeoPoint,
}

impl NewCandidate {
    /// Materialises the record as a [`Candidate`] with the given id.
    #[must_use]
    pub fn into_candidate(self, id: i64) -> Candidate {
        Candidate {
            id,
            name: self.name,
            address: self.address,
            category_id: self.category_id,
            rating: self.rating,
            price_label: self.price_label,
            tags: self.tags,
            image_url: self.image_url,
            description: self.description,
            location: self.location,
            distance_meters: None,
        }
    }
}

/// An externally supplied restaurant awaiting merge into the store.
///
/// Optional fields are filled in during sync; see [`crate::acquisition::sync_items`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncItem {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    /// Free-text type used for category matching.
    pub kind: Option<String>,
    pub rating: Option<Decimal>,
    pub price_label: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    /// Provider distance from the search anchor, in metres.
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Gps,
    Ip,
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationSource::Gps => write!(f, "gps"),
            LocationSource::Ip => write!(f, "ip"),
        }
    }
}

/// The single active location. A newer fix replaces the previous one and
/// invalidates any distances computed against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Absent when the IP lookup named a city but gave no area for it.
    pub point: Option<GeoPoint>,
    pub label: String,
    pub source: LocationSource,
    /// City name for IP fixes, used for city-limited search.
    pub city: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    #[must_use]
    pub fn gps(point: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            point: Some(point),
            label: label.into(),
            source: LocationSource::Gps,
            city: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn ip(point: GeoPoint, label: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            point: Some(point),
            ..Self::city_only(label, city)
        }
    }

    /// An IP fix that knows its city but not where in it.
    #[must_use]
    pub fn city_only(label: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            point: None,
            label: label.into(),
            source: LocationSource::Ip,
            city: Some(city.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Filters applied before distance annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub category_id: Option<i64>,
    pub min_rating: Option<Decimal>,
    /// Case-insensitive substring of the candidate name.
    pub name_contains: Option<String>,
}

impl CandidateFilter {
    #[must_use]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if self
            .category_id
            .is_some_and(|id| id != candidate.category_id)
        {
            return false;
        }
        if self.min_rating.is_some_and(|min| candidate.rating < min) {
            return false;
        }
        match self.name_contains.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => candidate
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}
