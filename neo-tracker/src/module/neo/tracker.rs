///! Asteroid tracker run
///!
///! One run: fetch the feed for a date range, normalize it, then build and
///! render the dashboard. A failure anywhere before rendering replaces the
///! whole dashboard with a single classified message.

use std::path::PathBuf;

use anyhow::{Context, Result};
use neo_common::{AsteroidRecord, DateRange};

use super::api_client::NeoFeed;
use super::error::FeedFailure;
use super::normalizer::normalize;
use crate::module::locale::Messages;
use crate::module::presenter::{Dashboard, HazardAlert};
use crate::module::renderer::DashboardRenderer;

/// What one run produced.
#[derive(Debug)]
pub enum RunOutcome {
    Rendered {
        /// Console report
        report: String,
        record_count: usize,
        hazardous_count: usize,
        image_path: Option<PathBuf>,
        csv_path: Option<PathBuf>,
    },
    Failed {
        failure: FeedFailure,
        /// The one message shown instead of the dashboard
        message: String,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Rendered { .. })
    }
}

/// Owns the feed source and the renderer for a run.
pub struct AsteroidTracker {
    feed: Box<dyn NeoFeed>,
    renderer: Option<DashboardRenderer>,
    messages: Messages,
    render_image: bool,
    export_csv: bool,
}

impl AsteroidTracker {
    pub fn new(feed: Box<dyn NeoFeed>, messages: Messages) -> Self {
        Self {
            feed,
            renderer: None,
            messages,
            render_image: false,
            export_csv: false,
        }
    }

    /// Also write the PNG dashboard (and the CSV when `export_csv` is set).
    pub fn with_renderer(mut self, renderer: DashboardRenderer, export_csv: bool) -> Self {
        self.renderer = Some(renderer);
        self.render_image = true;
        self.export_csv = export_csv;
        self
    }

    /// Skip the PNG while keeping any CSV export.
    pub fn without_image(mut self) -> Self {
        self.render_image = false;
        self
    }

    /// Fetch and normalize. Status is classified before the payload.
    pub async fn fetch_dataset(&self, range: &DateRange) -> Result<Vec<AsteroidRecord>, FeedFailure> {
        if range.is_reversed() {
            tracing::warn!("Start date is after end date ({}); sending as-is", range);
        } else if range.exceeds_feed_span() {
            tracing::warn!(
                "Requested span of {} days exceeds the feed's usual {}-day limit",
                range.span_days(),
                DateRange::FEED_MAX_SPAN_DAYS
            );
        }

        let feed = self.feed.fetch_feed(range).await?;
        let records = normalize(&feed)?;

        if let Some(expected) = feed.element_count() {
            if expected as usize != records.len() {
                tracing::debug!(
                    "Feed element_count {} differs from {} normalized records",
                    expected,
                    records.len()
                );
            }
        }

        let outside = records.iter().filter(|r| !range.contains(r.date)).count();
        if outside > 0 {
            tracing::warn!("{} records fall outside the requested range {}", outside, range);
        }

        Ok(records)
    }

    /// Run the whole pipeline once. `Err` is reserved for local output
    /// problems (image or CSV writing); feed problems become
    /// [`RunOutcome::Failed`].
    pub async fn run(&self, range: &DateRange) -> Result<RunOutcome> {
        tracing::info!("Fetching near-Earth objects for {}", range);

        let records = match self.fetch_dataset(range).await {
            Ok(records) => records,
            Err(failure) => {
                tracing::warn!(kind = failure.kind(), "Feed request failed: {}", failure);
                let message = failure.user_message(&self.messages);
                return Ok(RunOutcome::Failed { failure, message });
            }
        };

        let dashboard = Dashboard::new(&records);
        let hazardous_count = match dashboard.alert() {
            HazardAlert::NoneFound => 0,
            HazardAlert::Detected(rows) => rows.len(),
        };
        tracing::info!(
            "Dataset ready: {} asteroids, {} potentially hazardous",
            records.len(),
            hazardous_count
        );

        let mut report = dashboard.render_text(&self.messages);
        let mut image_path = None;
        let mut csv_path = None;

        if let Some(renderer) = &self.renderer {
            report.push('\n');
            if self.render_image {
                let path = renderer
                    .render(&dashboard, &self.messages, range)
                    .await
                    .context("Failed to render dashboard image")?;
                report.push_str(&self.messages.chart_saved(&path.display().to_string()));
                report.push('\n');
                image_path = Some(path);
            }

            if self.export_csv {
                let path = renderer
                    .export_csv(&records, range)
                    .await
                    .context("Failed to export raw data")?;
                report.push_str(&self.messages.csv_saved(&path.display().to_string()));
                report.push('\n');
                csv_path = Some(path);
            }
        }

        Ok(RunOutcome::Rendered {
            report,
            record_count: records.len(),
            hazardous_count,
            image_path,
            csv_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::neo::types::RawFeedResponse;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use neo_common::Locale;
    use serde_json::json;

    /// Feed that answers every query with the same canned result.
    struct CannedFeed(Result<serde_json::Value, FeedFailure>);

    #[async_trait]
    impl NeoFeed for CannedFeed {
        async fn fetch_feed(&self, _range: &DateRange) -> Result<RawFeedResponse, FeedFailure> {
            match &self.0 {
                Ok(value) => RawFeedResponse::from_value(value.clone()),
                Err(failure) => Err(failure.clone()),
            }
        }
    }

    fn tracker(result: Result<serde_json::Value, FeedFailure>) -> AsteroidTracker {
        AsteroidTracker::new(Box::new(CannedFeed(result)), Messages::new(Locale::En))
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_run_renders_hazard_report() {
        let tracker = tracker(Ok(json!({
            "2025-08-20": [{
                "name": "A1",
                "estimated_diameter": {"meters": {"estimated_diameter_max": 120.5}},
                "is_potentially_hazardous_asteroid": true
            }]
        })));

        match tracker.run(&range()).await.unwrap() {
            RunOutcome::Rendered {
                report,
                record_count,
                hazardous_count,
                image_path,
                csv_path,
            } => {
                assert_eq!(record_count, 1);
                assert_eq!(hazardous_count, 1);
                assert!(report.contains("1 dangerous asteroids detected"));
                assert!(image_path.is_none());
                assert!(csv_path.is_none());
            }
            other => panic!("expected rendered outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_failure_shows_only_message() {
        let tracker = tracker(Err(FeedFailure::QuotaExceeded));
        let outcome = tracker.run(&range()).await.unwrap();
        assert!(!outcome.is_success());
        match outcome {
            RunOutcome::Failed { failure, message } => {
                assert_eq!(failure, FeedFailure::QuotaExceeded);
                assert!(message.contains("API quota reached"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_dataset() {
        let tracker = tracker(Ok(json!({
            "2025-08-20": [
                {
                    "name": "ok",
                    "estimated_diameter": {"meters": {"estimated_diameter_max": 1.0}},
                    "is_potentially_hazardous_asteroid": false
                },
                {"name": "broken"}
            ]
        })));

        let err = tracker.fetch_dataset(&range()).await.unwrap_err();
        assert!(matches!(err, FeedFailure::MalformedPayload(_)));

        match tracker.run(&range()).await.unwrap() {
            RunOutcome::Failed { message, .. } => {
                assert_eq!(message, "Unexpected error: unknown NASA data format.");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_csv_export_without_image() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DashboardRenderer::new(dir.path(), dir.path().join("fonts"), "DejaVu Sans");
        let tracker = tracker(Ok(json!({
            "2025-08-20": [{
                "name": "A1",
                "estimated_diameter": {"meters": {"estimated_diameter_max": 120.5}},
                "is_potentially_hazardous_asteroid": false
            }]
        })))
        .with_renderer(renderer, true)
        .without_image();

        match tracker.run(&range()).await.unwrap() {
            RunOutcome::Rendered { report, image_path, csv_path, .. } => {
                assert!(image_path.is_none());
                assert!(!dir.path().join("neo_20250820_20250822.png").exists());
                let csv_path = csv_path.unwrap();
                assert_eq!(csv_path, dir.path().join("neo_20250820_20250822.csv"));
                assert!(report.contains(&csv_path.display().to_string()));
            }
            other => panic!("expected rendered outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reversed_range_is_sent_anyway() {
        let tracker = tracker(Ok(json!({})));
        let reversed = DateRange::new(range().end, range().start);
        let records = tracker.fetch_dataset(&reversed).await.unwrap();
        assert!(records.is_empty());
    }
}
