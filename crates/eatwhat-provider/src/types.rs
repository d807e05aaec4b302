//! Response types for the POI search and location endpoints.
//!
//! ## Observed shape
//!
//! ### Status envelope
//! Every endpoint answers HTTP 200 with `"status": "1"` on success and
//! `"status": "0"` plus an `info` code (`INVALID_USER_KEY`,
//! `DAILY_QUERY_OVER_LIMIT`, ...) on failure.
//!
//! ### Empty values
//! Absent string fields are usually serialized as an **empty JSON array**
//! (`"address": []`) rather than `null` or `""`. Every optional string here
//! goes through [`lenient_string`], which maps arrays, nulls, numbers and
//! blank strings to `None`.
//!
//! ### Coordinates
//! `location` and `rectangle` use `"lng,lat"` order, and the rectangle is two
//! corners joined by `;`.
//!
//! ### Business extension
//! `biz_ext.rating` and `biz_ext.cost` are decimal strings when known and `[]`
//! otherwise. `biz_ext` itself may be missing or an array.

use eatwhat_core::{GeoPoint, SyncItem, UNKNOWN_LABEL};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        v @ Value::Object(_) => Ok(serde_json::from_value(v).ok()),
        _ => Ok(None),
    }
}

/// Parses `"lng,lat"`.
pub(crate) fn parse_lng_lat(raw: &str) -> Option<GeoPoint> {
    let (lng, lat) = raw.split_once(',')?;
    let lng = lng.trim().parse::<f64>().ok()?;
    let lat = lat.trim().parse::<f64>().ok()?;
    (lat.is_finite() && lng.is_finite()).then(|| GeoPoint::new(lat, lng))
}

/// Centre of a `"lng,lat;lng,lat"` rectangle.
pub(crate) fn rectangle_center(raw: &str) -> Option<GeoPoint> {
    let (a, b) = raw.split_once(';')?;
    let (a, b) = (parse_lng_lat(a)?, parse_lng_lat(b)?);
    Some(GeoPoint::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0))
}

/// `status` / `info` fields shared by every response.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info: Option<String>,
}

impl Envelope {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("1")
    }

    #[must_use]
    pub fn info_or_unknown(&self) -> String {
        self.info.clone().unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }
}

/// Response of `/v3/place/around` and `/v3/place/text`.
#[derive(Debug, Deserialize)]
pub struct PlaceSearchResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub pois: Vec<RawPoi>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BizExt {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// One point of interest as returned by the search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPoi {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    /// `"lng,lat"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    /// Free-text type path, e.g. `"餐饮服务;中餐厅;川菜馆"`.
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Metres from the search anchor; only present in around-a-point mode.
    #[serde(default, deserialize_with = "lenient_string")]
    pub distance: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub biz_ext: Option<BizExt>,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl RawPoi {
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        self.location.as_deref().and_then(parse_lng_lat)
    }

    #[must_use]
    pub fn distance_meters(&self) -> Option<f64> {
        self.distance
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
    }

    /// Provider rating clamped to `[0, 5]` with one decimal.
    #[must_use]
    pub fn rating(&self) -> Option<Decimal> {
        let raw = self.biz_ext.as_ref()?.rating.as_deref()?;
        let rating = raw.parse::<Decimal>().ok()?;
        Some(rating.clamp(Decimal::ZERO, Decimal::from(5)).round_dp(1))
    }

    /// Per-person cost rendered as `"￥<n>"`.
    #[must_use]
    pub fn price_label(&self) -> Option<String> {
        let raw = self.biz_ext.as_ref()?.cost.as_deref()?;
        let cost = raw.parse::<Decimal>().ok()?;
        (cost > Decimal::ZERO).then(|| format!("￥{}", cost.round_dp(0).normalize()))
    }

    /// Maps the record onto a [`SyncItem`].
    ///
    /// Returns `None` when the POI has no name or no parseable coordinates;
    /// a missing address becomes `"unknown"`.
    #[must_use]
    pub fn to_sync_item(&self) -> Option<SyncItem> {
        let name = self.name.clone()?;
        let location = self.point()?;
        Some(SyncItem {
            name,
            address: self
                .address
                .clone()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            location,
            kind: self.kind.clone(),
            rating: self.rating(),
            price_label: self.price_label(),
            tags: None,
            image_url: self.photos.iter().find_map(|p| p.url.clone()),
            distance_meters: self.distance_meters(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegeoCode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub formatted_address: Option<String>,
}

/// Response of `/v3/geocode/regeo`.
#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default, deserialize_with = "lenient_object")]
    pub regeocode: Option<RegeoCode>,
}

/// Response of `/v3/ip`.
#[derive(Debug, Deserialize)]
pub struct IpLocateResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default, deserialize_with = "lenient_string")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rectangle: Option<String>,
}

/// A coarse network-origin location.
#[derive(Debug, Clone, PartialEq)]
pub struct IpLocation {
    pub province: Option<String>,
    pub city: String,
    pub center: Option<GeoPoint>,
}

impl IpLocation {
    /// `province + city`, collapsing municipalities where both are equal.
    #[must_use]
    pub fn label(&self) -> String {
        match self.province.as_deref() {
            Some(p) if p != self.city => format!("{p}{}", self.city),
            _ => self.city.clone(),
        }
    }
}
