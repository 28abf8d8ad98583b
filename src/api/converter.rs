//! Wire formats of the Helium API and their conversion to internal types.

use crate::error::{Error, Result};
use crate::state::{GeoPoint, HotspotInfo, OnlineStatus, RewardStats, RewardTotal, RewardWindow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

/// HNT carries eight decimal places.
const HNT_DECIMALS: u32 = 8;

/// `GET /v1/hotspots/{address}` body.
#[derive(Debug, Deserialize)]
pub struct HotspotResponse {
    pub data: HotspotData,
}

#[derive(Debug, Deserialize)]
pub struct HotspotData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: Option<HotspotStatus>,
    pub geocode: Option<Geocode>,
    pub reward_scale: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HotspotStatus {
    pub online: Option<String>,
    pub listen_addrs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct Geocode {
    pub long_city: Option<String>,
}

/// `GET /v1/hotspots/{address}/rewards/sum` body.
#[derive(Debug, Deserialize)]
pub struct RewardResponse {
    pub meta: Option<RewardMeta>,
    pub data: RewardData,
}

#[derive(Debug, Deserialize)]
pub struct RewardMeta {
    pub min_time: DateTime<Utc>,
    pub max_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RewardData {
    pub total: f64,
    #[serde(default)]
    pub sum: i64,
    #[serde(default)]
    pub stddev: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub median: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub avg: f64,
}

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    /// Convert a hotspot response to [`HotspotInfo`].
    pub fn convert_hotspot(response: HotspotResponse) -> HotspotInfo {
        let data = response.data;
        let (status, public_address) = match data.status {
            Some(status) => (
                status
                    .online
                    .as_deref()
                    .map(OnlineStatus::from_api)
                    .unwrap_or_default(),
                status.listen_addrs.and_then(|addrs| addrs.into_iter().next()),
            ),
            None => (OnlineStatus::Unknown, None),
        };

        let location = match (data.lat, data.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        HotspotInfo {
            name: data.name,
            owner: data.owner,
            public_address,
            status,
            location,
            city: data.geocode.and_then(|g| g.long_city),
            reward_scale: data.reward_scale,
        }
    }

    /// Convert a reward sum response to a [`RewardTotal`] for `window`.
    ///
    /// `requested` is the range that was asked for; it is used when the API
    /// omits `meta`.
    pub fn convert_reward(
        window: RewardWindow,
        response: RewardResponse,
        requested: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<RewardTotal> {
        let data = response.data;
        let total = Decimal::from_f64(data.total)
            .ok_or_else(|| Error::decode(format!("reward total {} is not a number", data.total)))?
            .round_dp(HNT_DECIMALS);

        let (min_time, max_time) = response
            .meta
            .map(|m| (m.min_time, m.max_time))
            .unwrap_or(requested);

        Ok(RewardTotal {
            window,
            total,
            stats: Some(RewardStats {
                sum: data.sum,
                stddev: data.stddev,
                min: data.min,
                median: data.median,
                max: data.max,
                avg: data.avg,
            }),
            min_time,
            max_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const HOTSPOT_JSON: &str = r#"{
        "data": {
            "lng": -122.41,
            "lat": 37.77,
            "status": {"online": "online", "listen_addrs": ["/ip4/1.2.3.4/tcp/44158"], "height": 900000},
            "reward_scale": 0.5,
            "owner": "owner-wallet",
            "name": "tangy-pink-parrot",
            "geocode": {"long_city": "San Francisco", "short_city": "SF"},
            "address": "addr1"
        }
    }"#;

    #[test]
    fn test_convert_hotspot() {
        let response: HotspotResponse = serde_json::from_str(HOTSPOT_JSON).unwrap();
        let info = DataConverter::convert_hotspot(response);

        assert_eq!(info.name, "tangy-pink-parrot");
        assert_eq!(info.owner, "owner-wallet");
        assert_eq!(info.status, OnlineStatus::Online);
        assert_eq!(info.public_address.as_deref(), Some("/ip4/1.2.3.4/tcp/44158"));
        assert_eq!(info.location, Some(GeoPoint { lat: 37.77, lng: -122.41 }));
        assert_eq!(info.city.as_deref(), Some("San Francisco"));
        assert_eq!(info.reward_scale, Some(0.5));
    }

    #[test]
    fn test_convert_sparse_hotspot() {
        let response: HotspotResponse =
            serde_json::from_str(r#"{"data": {"name": "x", "status": {"listen_addrs": null}}}"#)
                .unwrap();
        let info = DataConverter::convert_hotspot(response);

        assert_eq!(info.status, OnlineStatus::Unknown);
        assert!(info.public_address.is_none());
        assert!(info.location.is_none());
    }

    #[test]
    fn test_convert_reward() {
        let response: RewardResponse = serde_json::from_str(
            r#"{
                "meta": {"min_time": "2021-06-23T12:00:00Z", "max_time": "2021-06-30T12:00:00Z"},
                "data": {"total": 5.123456789, "sum": 512345678, "stddev": 0.1, "min": 0.01,
                         "median": 0.2, "max": 0.9, "avg": 0.25}
            }"#,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 0).unwrap();

        let total =
            DataConverter::convert_reward(RewardWindow::Week, response, RewardWindow::Week.bounds(now))
                .unwrap();

        assert_eq!(total.window, RewardWindow::Week);
        assert_eq!(total.total, dec!(5.12345679));
        assert_eq!(total.stats.as_ref().unwrap().sum, 512345678);
        assert_eq!(total.min_time, Utc.with_ymd_and_hms(2021, 6, 23, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_convert_reward_without_meta_uses_request_range() {
        let response: RewardResponse =
            serde_json::from_str(r#"{"data": {"total": 1.0}}"#).unwrap();
        let now = Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 0).unwrap();
        let requested = RewardWindow::Day.bounds(now);

        let total = DataConverter::convert_reward(RewardWindow::Day, response, requested).unwrap();

        assert_eq!((total.min_time, total.max_time), requested);
        assert_eq!(total.total, dec!(1));
    }
}
