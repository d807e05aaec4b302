//! Reverse geocoding, IP location, and the GPS → IP → unavailable chain.

use eatwhat_core::{GeoPoint, LocationFix};

use crate::error::ProviderError;
use crate::types::{rectangle_center, IpLocateResponse, IpLocation, ReverseGeocodeResponse};

use super::{lng_lat, PoiClient, IP_PATH, REGEO_PATH};

/// Label for a GPS fix the provider could not name.
pub const UNKNOWN_LOCATION_LABEL: &str = "unknown location";

#[derive(Debug, Clone, PartialEq)]
pub enum LocationResolution {
    Fix(LocationFix),
    /// Neither GPS nor IP produced a fix. Callers show an empty pool and
    /// offer a manual retry.
    Unavailable,
}

impl LocationResolution {
    #[must_use]
    pub fn fix(&self) -> Option<&LocationFix> {
        match self {
            LocationResolution::Fix(fix) => Some(fix),
            LocationResolution::Unavailable => None,
        }
    }
}

impl PoiClient {
    /// Human-readable address for `point`.
    ///
    /// `Ok(None)` means the provider answered but had no address for it.
    ///
    /// # Errors
    ///
    /// Returns a transport-level [`ProviderError`] when the request fails.
    pub async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, ProviderError> {
        let response: ReverseGeocodeResponse = self
            .get_json(REGEO_PATH, &[("location", lng_lat(point))])
            .await?;
        if !response.envelope.is_ok() {
            tracing::debug!(info = ?response.envelope.info, "reverse geocode rejected");
            return Ok(None);
        }
        Ok(response.regeocode.and_then(|r| r.formatted_address))
    }

    /// Coarse location of the caller's network origin.
    ///
    /// `Ok(None)` when the provider cannot place the address (status failure
    /// or no city, e.g. for private ranges).
    ///
    /// # Errors
    ///
    /// Returns a transport-level [`ProviderError`] when the request fails.
    pub async fn locate_by_ip(&self) -> Result<Option<IpLocation>, ProviderError> {
        let response: IpLocateResponse = self.get_json(IP_PATH, &[]).await?;
        if !response.envelope.is_ok() {
            tracing::debug!(info = ?response.envelope.info, "IP location rejected");
            return Ok(None);
        }
        let Some(city) = response.city else {
            return Ok(None);
        };
        Ok(Some(IpLocation {
            province: response.province,
            city,
            center: response.rectangle.as_deref().and_then(rectangle_center),
        }))
    }

    /// Resolves the active location: GPS (labelled by reverse geocode) when a
    /// device coordinate is available, otherwise or on failure the IP
    /// location, otherwise [`LocationResolution::Unavailable`].
    ///
    /// An IP answer with a city but no rectangle still yields a fix; it has
    /// no point and searches by city.
    ///
    /// A GPS coordinate is never dropped because the provider had no address
    /// for it; only a failed request falls through to IP.
    pub async fn resolve_location(&self, gps: Option<GeoPoint>) -> LocationResolution {
        if let Some(point) = gps {
            match self.reverse_geocode(point).await {
                Ok(address) => {
                    let label = address.unwrap_or_else(|| UNKNOWN_LOCATION_LABEL.to_string());
                    tracing::info!(%point, label = %label, "resolved GPS location");
                    return LocationResolution::Fix(LocationFix::gps(point, label));
                }
                Err(err) => {
                    tracing::warn!(%point, error = %err, "reverse geocode failed; falling back to IP");
                }
            }
        }

        match self.locate_by_ip().await {
            Ok(Some(ip)) => {
                let label = ip.label();
                let fix = match ip.center {
                    Some(center) => {
                        tracing::info!(%center, label = %label, "resolved IP location");
                        LocationFix::ip(center, label, ip.city)
                    }
                    None => {
                        tracing::info!(city = %ip.city, "resolved IP location without an area");
                        LocationFix::city_only(label, ip.city)
                    }
                };
                LocationResolution::Fix(fix)
            }
            Ok(None) => {
                tracing::warn!("IP location unavailable");
                LocationResolution::Unavailable
            }
            Err(err) => {
                tracing::warn!(error = %err, "IP location failed");
                LocationResolution::Unavailable
            }
        }
    }
}
