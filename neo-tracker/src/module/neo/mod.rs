///! Near-Earth object feed
///!
///! Fetches the NASA NeoWs feed for a date range, flattens it into
///! [`AsteroidRecord`](neo_common::AsteroidRecord)s and classifies failures.

pub mod types;
pub mod error;
pub mod normalizer;
pub mod api_client;
pub mod tracker;

pub use api_client::{FeedClient, NeoFeed};
pub use error::FeedFailure;
pub use normalizer::normalize;
pub use tracker::{AsteroidTracker, RunOutcome};
pub use types::RawFeedResponse;
