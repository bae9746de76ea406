//! Defines data structures for responses of the observations API and
//! their `De/Serialize` instances.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const INVALID_PAGE: &str = "Invalid page.";
const NOT_FOUND: &str = "Not found.";

/// One recorded reception attempt of a ground station.
///
/// Only the `id` is required, every other field may be missing or
/// `null` in a response. Fields that are only shown to the user are
/// kept as they come, whatever their JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: u64,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub ground_station: Option<Value>,
    #[serde(default)]
    pub station_name: Option<Value>,
    #[serde(default)]
    pub station_lat: Option<Value>,
    #[serde(default)]
    pub station_lng: Option<Value>,
    #[serde(default)]
    pub station_alt: Option<Value>,
    #[serde(default)]
    pub transmitter: Option<Value>,
    #[serde(default)]
    pub norad_cat_id: Option<Value>,
    #[serde(default)]
    pub rise_azimuth: Option<Value>,
    #[serde(default)]
    pub set_azimuth: Option<Value>,
    #[serde(default)]
    pub max_altitude: Option<Value>,
    #[serde(default)]
    pub tle: Option<Value>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub archive_url: Option<String>,
    #[serde(default)]
    pub waterfall: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub demoddata: Vec<DemodData>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<DemodData>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items = Option::<Vec<DemodData>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemodData {
    pub payload_demod: String,
}

impl Observation {
    /// Returns the links of all data files to download, in download
    /// order: the payload (or the archive if there is no payload), the
    /// waterfall and then every demodulated data file.
    pub fn artifact_links(&self) -> Vec<&str> {
        let mut links = Vec::new();
        if let Some(audio) = non_empty(&self.payload).or_else(|| non_empty(&self.archive_url)) {
            links.push(audio);
        }
        if let Some(waterfall) = non_empty(&self.waterfall) {
            links.push(waterfall);
        }
        links.extend(
            self.demoddata
                .iter()
                .map(|d| d.payload_demod.as_str())
                .filter(|s| !s.is_empty()),
        );
        links
    }
}

fn non_empty(link: &Option<String>) -> Option<&str> {
    link.as_deref().filter(|s| !s.is_empty())
}

/// The error replies the API is known to send instead of data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApiError {
    InvalidPage,
    NotFound,
    EmptyResult,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidPage => write!(f, "invalid page"),
            ApiError::NotFound => write!(f, "not found"),
            ApiError::EmptyResult => write!(f, "empty result"),
        }
    }
}

/// A classified response body.
#[derive(Debug, PartialEq)]
pub enum ApiReply<T> {
    Data(T),
    Known(ApiError),
    Unrecognized(Value),
}

impl<T: DeserializeOwned> ApiReply<T> {
    /// Checks the body against the known error shapes and otherwise
    /// decodes it into `T`. Bodies that are neither come back as
    /// `Unrecognized`.
    pub fn classify(body: Value) -> ApiReply<T> {
        if let Some(err) = known_error(&body) {
            return ApiReply::Known(err);
        }
        match serde_json::from_value::<T>(body.clone()) {
            Ok(data) => ApiReply::Data(data),
            Err(e) => {
                log::debug!("Response does not match the expected structure: {}", e);
                ApiReply::Unrecognized(body)
            }
        }
    }
}

fn known_error(body: &Value) -> Option<ApiError> {
    match body {
        Value::Array(items) if items.is_empty() => Some(ApiError::EmptyResult),
        Value::Object(map) if map.len() == 1 => match map.get("detail").and_then(Value::as_str) {
            Some(INVALID_PAGE) => Some(ApiError::InvalidPage),
            Some(NOT_FOUND) => Some(ApiError::NotFound),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
fn observation(json: Value) -> Observation {
    serde_json::from_value(json).unwrap()
}

#[test]
fn classify_known_errors() {
    use serde_json::json;

    assert_eq!(
        ApiReply::<Vec<Observation>>::classify(json!({"detail": "Invalid page."})),
        ApiReply::Known(ApiError::InvalidPage)
    );
    assert_eq!(
        ApiReply::<Observation>::classify(json!({"detail": "Not found."})),
        ApiReply::Known(ApiError::NotFound)
    );
    assert_eq!(
        ApiReply::<Vec<Observation>>::classify(json!([])),
        ApiReply::Known(ApiError::EmptyResult)
    );
    assert_eq!(
        ApiReply::<Observation>::classify(json!([])),
        ApiReply::Known(ApiError::EmptyResult)
    );
}

#[test]
fn classify_unknown_shapes() {
    use serde_json::json;

    let other_detail = json!({"detail": "Request was throttled."});
    assert_eq!(
        ApiReply::<Observation>::classify(other_detail.clone()),
        ApiReply::Unrecognized(other_detail)
    );
    let extra_key = json!({"detail": "Not found.", "code": 404});
    assert_eq!(
        ApiReply::<Observation>::classify(extra_key.clone()),
        ApiReply::Unrecognized(extra_key)
    );
    let no_id = json!({"payload": "http://x/a.ogg"});
    assert_eq!(
        ApiReply::<Observation>::classify(no_id.clone()),
        ApiReply::Unrecognized(no_id)
    );
}

#[test]
fn classify_observations() {
    use serde_json::json;

    let body = json!({
        "id": 12345,
        "ground_station": 13,
        "payload": "http://x/data.bin",
        "archive_url": "",
        "waterfall": "",
        "demoddata": []
    });
    match ApiReply::<Observation>::classify(body) {
        ApiReply::Data(obs) => {
            assert_eq!(obs.id, 12345);
            assert_eq!(obs.ground_station, Some(json!(13)));
            assert_eq!(obs.start, None);
        }
        other => panic!("unexpected reply: {:?}", other),
    }

    let page = json!([{"id": 1, "tle": null}, {"id": 2, "station_lat": 40.1}]);
    match ApiReply::<Vec<Observation>>::classify(page) {
        ApiReply::Data(obs) => assert_eq!(obs.iter().map(|o| o.id).collect::<Vec<_>>(), [1, 2]),
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[test]
fn display_fields_of_any_type() {
    use serde_json::json;

    let page = json!([
        {"id": 1, "transmitter": 42, "payload": "http://x/a.ogg"},
        {"id": 2, "demoddata": null},
        {"id": 3, "station_alt": "1600", "tle": {"tle0": "ISS"}}
    ]);
    match ApiReply::<Vec<Observation>>::classify(page) {
        ApiReply::Data(obs) => {
            assert_eq!(obs[0].transmitter, Some(json!(42)));
            assert_eq!(obs[0].artifact_links(), ["http://x/a.ogg"]);
            assert!(obs[1].demoddata.is_empty());
            assert_eq!(obs[2].station_alt, Some(json!("1600")));
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[test]
fn payload_wins_over_archive() {
    use serde_json::json;

    let obs = observation(json!({
        "id": 1,
        "payload": "http://x/audio.ogg",
        "archive_url": "http://archive/audio.ogg"
    }));
    assert_eq!(obs.artifact_links(), ["http://x/audio.ogg"]);
}

#[test]
fn archive_is_fallback() {
    use serde_json::json;

    let obs = observation(json!({
        "id": 1,
        "payload": "",
        "archive_url": "http://archive/audio.ogg"
    }));
    assert_eq!(obs.artifact_links(), ["http://archive/audio.ogg"]);

    let obs = observation(json!({"id": 1, "payload": null, "archive_url": "http://archive/a.ogg"}));
    assert_eq!(obs.artifact_links(), ["http://archive/a.ogg"]);
}

#[test]
fn all_links_in_order() {
    use serde_json::json;

    let obs = observation(json!({
        "id": 1,
        "payload": "http://x/audio.ogg",
        "waterfall": "http://x/waterfall.png",
        "demoddata": [
            {"payload_demod": "http://x/d1.png"},
            {"payload_demod": "http://x/d2.png"}
        ]
    }));
    assert_eq!(
        obs.artifact_links(),
        [
            "http://x/audio.ogg",
            "http://x/waterfall.png",
            "http://x/d1.png",
            "http://x/d2.png"
        ]
    );

    let bare = observation(json!({"id": 2}));
    assert!(bare.artifact_links().is_empty());
}
