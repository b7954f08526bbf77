///! NeoWs feed payload types

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::FeedFailure;

/// Top-level body of `GET /neo/rest/v1/feed`
#[derive(Debug, Deserialize)]
struct FeedBody {
    #[serde(default)]
    element_count: Option<u64>,
    near_earth_objects: Value,
}

/// The `near_earth_objects` mapping: date key to raw asteroid objects.
///
/// Keys keep the order the feed sent them in, which is not guaranteed to be
/// chronological.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedResponse {
    days: Map<String, Value>,
    element_count: Option<u64>,
}

impl RawFeedResponse {
    /// Parse a full feed body and extract `near_earth_objects`.
    ///
    /// A body that is not JSON at all is a transport-level failure; JSON of
    /// the wrong shape is a malformed payload.
    pub fn from_body(body: &str) -> Result<Self, FeedFailure> {
        let parsed: FeedBody = serde_json::from_str(body).map_err(|e| {
            if e.is_syntax() || e.is_eof() {
                FeedFailure::Network(format!("unreadable feed body: {}", e))
            } else {
                FeedFailure::malformed(format!("unexpected feed body: {}", e))
            }
        })?;

        let mut response = Self::from_value(parsed.near_earth_objects)?;
        response.element_count = parsed.element_count;
        Ok(response)
    }

    /// Wrap an already-extracted mapping. Anything other than a JSON object
    /// is malformed.
    pub fn from_value(value: Value) -> Result<Self, FeedFailure> {
        match value {
            Value::Object(days) => Ok(Self {
                days,
                element_count: None,
            }),
            other => Err(FeedFailure::malformed(format!(
                "near_earth_objects is not an object (found {})",
                json_kind(&other)
            ))),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.days.iter()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Total raw objects across all days; non-array entries count as zero.
    pub fn raw_object_count(&self) -> usize {
        self.days
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }

    /// The feed's own `element_count`, when the body carried one.
    pub fn element_count(&self) -> Option<u64> {
        self.element_count
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_extracts_mapping() {
        let body = r#"{
            "links": {"self": "http://example"},
            "element_count": 2,
            "near_earth_objects": {
                "2025-08-21": [{"name": "B"}],
                "2025-08-20": [{"name": "A"}]
            }
        }"#;
        let feed = RawFeedResponse::from_body(body).unwrap();
        assert_eq!(feed.day_count(), 2);
        assert_eq!(feed.raw_object_count(), 2);
        assert_eq!(feed.element_count(), Some(2));

        // upstream key order is preserved
        let keys: Vec<&String> = feed.days().map(|(k, _)| k).collect();
        assert_eq!(keys, ["2025-08-21", "2025-08-20"]);
    }

    #[test]
    fn test_from_body_rejects_bad_shapes() {
        for body in [
            "[]",
            r#"{"element_count": 0}"#,
            r#"{"near_earth_objects": []}"#,
            r#"{"near_earth_objects": null}"#,
        ] {
            let err = RawFeedResponse::from_body(body).unwrap_err();
            assert!(
                matches!(err, FeedFailure::MalformedPayload(_)),
                "{} -> {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_non_json_body_is_network_failure() {
        for body in ["<html>Gateway</html>", "not json at all", "", r#"{"near_earth_objects": {"#] {
            match RawFeedResponse::from_body(body).unwrap_err() {
                FeedFailure::Network(detail) => {
                    assert!(detail.starts_with("unreadable feed body"), "{}", detail)
                }
                other => panic!("{:?} -> {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_empty_mapping_is_valid() {
        let feed = RawFeedResponse::from_body(r#"{"near_earth_objects": {}}"#).unwrap();
        assert_eq!(feed.day_count(), 0);
        assert_eq!(feed.raw_object_count(), 0);
        assert_eq!(feed.element_count(), None);
    }
}
