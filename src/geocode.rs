//! Nominatim geocoding client.
//!
//! The workflow layer only sees [`AddressResolver`]: an address either
//! resolves to coordinates or it doesn't. Transport failures (timeout, DNS,
//! non-2xx, malformed body) are logged for operators and then folded into
//! "no match," because from the user's point of view the outcome is the
//! same: the address could not be geocoded, try again.

use super::config;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: Option<String>,
    pub r#type: Option<String>,
    /// Nominatim's `importance` score (roughly 0-1) scaled by 10 and
    /// rounded to 2 decimal places.
    pub confidence: Option<f64>,
}

#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> Option<GeocodeResult>;
}

/// One search hit as Nominatim sends it. `lat`/`lon` are strings in their
/// JSON, not numbers.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    r#type: Option<String>,
    importance: Option<f64>,
}

pub struct Nominatim {
    http_client: reqwest::Client,
}

impl Nominatim {
    pub fn new() -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config::GEOCODER_USER_AGENT)
            .timeout(Duration::from_secs(config::GEOCODER_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http_client })
    }

    /// Single attempt, no retry. A submission gets exactly one shot at the
    /// geocoder.
    async fn search(
        &self,
        address: &str,
    ) -> Result<Vec<NominatimPlace>, reqwest::Error> {
        let places = self
            .http_client
            .get(config::GEOCODER_URL)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(places)
    }
}

#[async_trait]
impl AddressResolver for Nominatim {
    async fn resolve(&self, address: &str) -> Option<GeocodeResult> {
        match self.search(address).await {
            Ok(places) => normalize(places),
            Err(e) => {
                tracing::warn!(error = %e, "geocoder request failed");
                None
            }
        }
    }
}

/// Take the best (first) hit and map it into our shape. Hits with
/// unparsable coordinates count as no match.
fn normalize(places: Vec<NominatimPlace>) -> Option<GeocodeResult> {
    let place = places.into_iter().next()?;
    let latitude = place.lat.parse().ok()?;
    let longitude = place.lon.parse().ok()?;
    Some(GeocodeResult {
        latitude,
        longitude,
        display_name: place.display_name,
        r#type: place.r#type,
        confidence: place.importance.map(|i| (i * 10.0 * 100.0).round() / 100.0),
    })
}
