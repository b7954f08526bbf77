///! Feed normalizer
///!
///! Flattens the per-day feed mapping into one record per raw asteroid.
///! A raw object missing any consumed field fails the whole dataset; nothing
///! is defaulted.

use chrono::NaiveDate;
use neo_common::AsteroidRecord;
use serde_json::Value;

use super::error::FeedFailure;
use super::types::{json_kind, RawFeedResponse};

const NAME_PTR: &str = "/name";
const DIAMETER_PTR: &str = "/estimated_diameter/meters/estimated_diameter_max";
const HAZARD_PTR: &str = "/is_potentially_hazardous_asteroid";

/// Output order follows the feed: days in key order, asteroids in array
/// order within a day.
pub fn normalize(feed: &RawFeedResponse) -> Result<Vec<AsteroidRecord>, FeedFailure> {
    let mut records = Vec::with_capacity(feed.raw_object_count());

    for (date_key, asteroids) in feed.days() {
        let date = parse_date_key(date_key)?;
        let asteroids = asteroids.as_array().ok_or_else(|| {
            FeedFailure::malformed(format!(
                "entry for {} is not an array (found {})",
                date_key,
                json_kind(asteroids)
            ))
        })?;

        for (index, raw) in asteroids.iter().enumerate() {
            let record = normalize_asteroid(date, raw)
                .map_err(|reason| FeedFailure::malformed(format!("{}[{}]: {}", date_key, index, reason)))?;
            records.push(record);
        }
    }

    Ok(records)
}

fn parse_date_key(key: &str) -> Result<NaiveDate, FeedFailure> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|e| FeedFailure::malformed(format!("invalid date key '{}': {}", key, e)))
}

fn normalize_asteroid(date: NaiveDate, raw: &Value) -> Result<AsteroidRecord, String> {
    if !raw.is_object() {
        return Err(format!("expected an object, found {}", json_kind(raw)));
    }

    let name = raw
        .pointer(NAME_PTR)
        .ok_or_else(|| missing(NAME_PTR))?
        .as_str()
        .ok_or_else(|| wrong_type(NAME_PTR, "a string"))?
        .to_string();

    let diameter_m = raw
        .pointer(DIAMETER_PTR)
        .ok_or_else(|| missing(DIAMETER_PTR))?
        .as_f64()
        .ok_or_else(|| wrong_type(DIAMETER_PTR, "a number"))?;
    if !diameter_m.is_finite() || diameter_m < 0.0 {
        return Err(format!("{} is not a non-negative diameter: {}", DIAMETER_PTR, diameter_m));
    }

    let hazardous = raw
        .pointer(HAZARD_PTR)
        .ok_or_else(|| missing(HAZARD_PTR))?
        .as_bool()
        .ok_or_else(|| wrong_type(HAZARD_PTR, "a boolean"))?;

    Ok(AsteroidRecord {
        date,
        name,
        diameter_m,
        hazardous,
    })
}

fn missing(pointer: &str) -> String {
    format!("missing field {}", pointer)
}

fn wrong_type(pointer: &str, expected: &str) -> String {
    format!("field {} is not {}", pointer, expected)
}
