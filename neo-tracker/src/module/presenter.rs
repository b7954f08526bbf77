///! Dashboard views
///!
///! Derives the raw table, the scatter chart and the hazard alert list from
///! one dataset. Views borrow the records and never reorder or modify them;
///! only the scatter view sorts its own copy of the points by date.

use chrono::NaiveDate;
use neo_common::AsteroidRecord;

use super::locale::Messages;

/// Hazard table row: a record projected to date, name and diameter.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardRow {
    pub date: NaiveDate,
    pub name: String,
    pub diameter_m: f64,
}

impl From<&AsteroidRecord> for HazardRow {
    fn from(record: &AsteroidRecord) -> Self {
        Self {
            date: record.date,
            name: record.name.clone(),
            diameter_m: record.diameter_m,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HazardAlert {
    /// Affirmative empty state
    NoneFound,
    Detected(Vec<HazardRow>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub diameter_m: f64,
    pub hazardous: bool,
}

/// Points plus the axis domains the chart is drawn against.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterView {
    /// Sorted by date, stable for equal dates
    pub points: Vec<ScatterPoint>,
    /// Inclusive date domain; `None` when there are no points
    pub date_domain: Option<(NaiveDate, NaiveDate)>,
    pub y_max: f64,
    pub y_step: f64,
}

impl ScatterView {
    const Y_TARGET_TICKS: f64 = 5.0;
    const Y_HEADROOM: f64 = 1.05;

    pub fn from_records(records: &[AsteroidRecord]) -> Self {
        let mut points: Vec<ScatterPoint> = records
            .iter()
            .map(|r| ScatterPoint {
                date: r.date,
                diameter_m: r.diameter_m,
                hazardous: r.hazardous,
            })
            .collect();
        points.sort_by_key(|p| p.date);

        let date_domain = match (points.first(), points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        };

        let max_diameter = points.iter().map(|p| p.diameter_m).fold(0.0_f64, f64::max);
        let (y_max, y_step) = Self::y_axis(max_diameter);

        Self {
            points,
            date_domain,
            y_max,
            y_step,
        }
    }

    /// Distinct dates covered by the domain, one per day.
    pub fn date_ticks(&self) -> Vec<NaiveDate> {
        match self.date_domain {
            Some((start, end)) => start.iter_days().take_while(|d| *d <= end).collect(),
            None => Vec::new(),
        }
    }

    pub fn y_ticks(&self) -> Vec<f64> {
        let count = (self.y_max / self.y_step).round() as usize;
        (0..=count).map(|i| i as f64 * self.y_step).collect()
    }

    fn y_axis(max_value: f64) -> (f64, f64) {
        let target = if max_value > 0.0 { max_value * Self::Y_HEADROOM } else { 1.0 };
        let step = nice_step(target / Self::Y_TARGET_TICKS);
        let y_max = (target / step).ceil() * step;
        (y_max, step)
    }
}

/// Round a raw tick step up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let factor = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// The hazardous subsequence, in dataset order.
pub fn hazardous_records(records: &[AsteroidRecord]) -> Vec<&AsteroidRecord> {
    records.iter().filter(|r| r.hazardous).collect()
}

pub fn hazard_alert(records: &[AsteroidRecord]) -> HazardAlert {
    let rows: Vec<HazardRow> = hazardous_records(records)
        .into_iter()
        .map(HazardRow::from)
        .collect();

    if rows.is_empty() {
        HazardAlert::NoneFound
    } else {
        HazardAlert::Detected(rows)
    }
}

/// All three views over one dataset.
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    records: &'a [AsteroidRecord],
    scatter: ScatterView,
    alert: HazardAlert,
}

impl<'a> Dashboard<'a> {
    pub fn new(records: &'a [AsteroidRecord]) -> Self {
        Self {
            records,
            scatter: ScatterView::from_records(records),
            alert: hazard_alert(records),
        }
    }

    /// Full dataset, feed order.
    pub fn raw_table(&self) -> &'a [AsteroidRecord] {
        self.records
    }

    pub fn scatter(&self) -> &ScatterView {
        &self.scatter
    }

    pub fn alert(&self) -> &HazardAlert {
        &self.alert
    }

    /// Console rendition of the dashboard. The chart itself only exists as
    /// an image, so this covers the two tables and the alert state.
    pub fn render_text(&self, messages: &Messages) -> String {
        let mut out = String::new();

        out.push_str(messages.title());
        out.push('\n');
        out.push_str(messages.description());
        out.push_str("\n\n");
        for line in messages.info_note() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }

        push_heading(&mut out, messages.raw_data_heading());
        let raw_rows: Vec<Vec<String>> = self
            .records
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    r.name.clone(),
                    format_diameter(r.diameter_m),
                    r.hazardous.to_string(),
                ]
            })
            .collect();
        out.push_str(&format_table(&["date", "name", "diameter_m", "hazardous"], &raw_rows));
        if self.records.is_empty() {
            out.push_str(messages.empty_dataset());
            out.push('\n');
        }

        push_heading(&mut out, messages.hazard_heading());
        match &self.alert {
            HazardAlert::NoneFound => {
                out.push_str(messages.no_hazards());
                out.push('\n');
            }
            HazardAlert::Detected(rows) => {
                out.push_str(&messages.hazards_detected(rows.len()));
                out.push('\n');
                let hazard_rows: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| vec![r.date.to_string(), r.name.clone(), format_diameter(r.diameter_m)])
                    .collect();
                out.push_str(&format_table(&["date", "name", "diameter_m"], &hazard_rows));
            }
        }

        out
    }
}

pub fn format_diameter(diameter_m: f64) -> String {
    format!("{:.3}", diameter_m)
}

fn push_heading(out: &mut String, heading: &str) {
    out.push('\n');
    out.push_str(heading);
    out.push('\n');
    out.push_str(&"=".repeat(heading.chars().count()));
    out.push('\n');
}

fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = pad_row(headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&pad_row(row.iter().map(String::as_str), &widths));
    }
    out
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    format!("{}\n", line.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo_common::Locale;

    fn record(date: &str, name: &str, diameter_m: f64, hazardous: bool) -> AsteroidRecord {
        AsteroidRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            name: name.to_string(),
            diameter_m,
            hazardous,
        }
    }

    #[test]
    fn test_no_hazards_is_affirmative_state() {
        let records = vec![record("2025-08-20", "A1", 120.5, false)];
        let dashboard = Dashboard::new(&records);
        assert_eq!(dashboard.alert(), &HazardAlert::NoneFound);

        let text = dashboard.render_text(&Messages::new(Locale::En));
        assert!(text.contains("No dangerous asteroids during this period"));
        assert!(text.contains("A1"));
        assert!(text.contains("120.500"));
    }

    #[test]
    fn test_single_hazard_projects_record() {
        let records = vec![record("2025-08-20", "A1", 120.5, true)];
        let dashboard = Dashboard::new(&records);
        assert_eq!(
            dashboard.alert(),
            &HazardAlert::Detected(vec![HazardRow {
                date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
                name: "A1".to_string(),
                diameter_m: 120.5,
            }])
        );

        let text = dashboard.render_text(&Messages::new(Locale::En));
        assert!(text.contains("1 dangerous asteroids detected"));
    }

    #[test]
    fn test_hazard_subsequence_preserves_order() {
        let records = vec![
            record("2025-08-22", "Z", 10.0, true),
            record("2025-08-20", "B", 5.0, false),
            record("2025-08-21", "M", 7.0, true),
            record("2025-08-20", "A", 1.0, true),
        ];
        let hazards = hazardous_records(&records);
        let names: Vec<&str> = hazards.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Z", "M", "A"]);
        assert!(hazards.iter().all(|h| records.contains(h)));
        assert!(hazards.iter().all(|h| h.hazardous));
    }

    #[test]
    fn test_empty_dataset_renders() {
        let records: Vec<AsteroidRecord> = Vec::new();
        let dashboard = Dashboard::new(&records);
        assert!(dashboard.raw_table().is_empty());
        assert_eq!(dashboard.alert(), &HazardAlert::NoneFound);
        assert!(dashboard.scatter().points.is_empty());
        assert_eq!(dashboard.scatter().date_domain, None);
        assert!(dashboard.scatter().date_ticks().is_empty());

        let text = dashboard.render_text(&Messages::new(Locale::En));
        assert!(text.contains("date  name  diameter_m  hazardous"));
        assert!(text.contains("No asteroids reported for this period."));
    }

    #[test]
    fn test_raw_table_keeps_feed_order() {
        let records = vec![
            record("2025-08-22", "late", 10.0, false),
            record("2025-08-20", "early", 5.0, false),
        ];
        let dashboard = Dashboard::new(&records);
        assert_eq!(dashboard.raw_table()[0].name, "late");

        let scatter = dashboard.scatter();
        assert_eq!(scatter.points[0].date, NaiveDate::from_ymd_opt(2025, 8, 20).unwrap());
        assert_eq!(
            scatter.date_domain,
            Some((
                NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
                NaiveDate::from_ymd_opt(2025, 8, 22).unwrap()
            ))
        );
        assert_eq!(scatter.date_ticks().len(), 3);
    }

    #[test]
    fn test_y_axis_is_rounded() {
        let records = vec![
            record("2025-08-20", "a", 120.5, false),
            record("2025-08-20", "b", 480.0, true),
        ];
        let scatter = ScatterView::from_records(&records);
        assert_eq!(scatter.y_step, 200.0);
        assert_eq!(scatter.y_max, 600.0);
        assert_eq!(scatter.y_ticks(), vec![0.0, 200.0, 400.0, 600.0]);
        assert!(scatter.points.iter().all(|p| p.diameter_m <= scatter.y_max));
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(0.2), 0.2);
        assert_eq!(nice_step(37.0), 50.0);
        assert_eq!(nice_step(101.0), 200.0);
        assert_eq!(nice_step(700.0), 1000.0);
    }
}
