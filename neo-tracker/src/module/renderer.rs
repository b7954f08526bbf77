///! Dashboard renderer
///!
///! Lays the three dashboard views out as one SVG page and rasterizes it to
///! PNG. Also writes the raw table as CSV on request.

use super::locale::Messages;
use super::presenter::{format_diameter, Dashboard, HazardAlert, HazardRow, ScatterView};
use crate::config::OutputConfig;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use neo_common::{AsteroidRecord, DateRange};
use std::path::{Path, PathBuf};
use resvg::usvg::{fontdb, Options, Tree};
use resvg::tiny_skia;
use fontdb::Database;

const DASHBOARD_SVG_TEMPLATE: &str = include_str!("../../resources/dashboard_template.svg");

const HAZARD_COLOR: &str = "red";
const SAFE_COLOR: &str = "green";

pub struct DashboardRenderer {
    output_dir: PathBuf,
    fonts_dir: PathBuf,
    font_family: String,
}

impl DashboardRenderer {
    const PAGE_WIDTH: f32 = 900.0;
    const TOP_PADDING: f32 = 20.0;
    const SECTION_SPACING: f32 = 36.0;
    const SECTION_TITLE_HEIGHT: f32 = 40.0;
    const HEADER_HEIGHT: f32 = 34.0;
    const ROW_HEIGHT: f32 = 28.0;
    const BANNER_HEIGHT: f32 = 44.0;
    const FOOTER_HEIGHT: f32 = 32.0;

    const X_DATE: f32 = 20.0;
    const X_NAME: f32 = 160.0;
    const X_DIAMETER: f32 = 560.0;
    const X_HAZARD: f32 = 720.0;

    const PLOT_LEFT: f32 = 90.0;
    const PLOT_RIGHT: f32 = 860.0;
    const PLOT_HEIGHT: f32 = 300.0;
    const PLOT_INNER_PAD: f32 = 30.0;
    const CHART_TITLE_HEIGHT: f32 = 36.0;
    const CHART_BOTTOM_MARGIN: f32 = 110.0;
    const POINT_RADIUS: f32 = 6.0;
    const POINT_OPACITY: f32 = 0.7;
    const MAX_DATE_LABELS: usize = 12;

    pub fn new(
        output_dir: impl AsRef<Path>,
        fonts_dir: impl AsRef<Path>,
        font_family: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            fonts_dir: fonts_dir.as_ref().to_path_buf(),
            font_family: font_family.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.image_dir, &config.fonts_dir, config.font_family.clone())
    }

    /// Render the dashboard to `neo_{start}_{end}.png`, replacing any
    /// previous image for the same range.
    pub async fn render(
        &self,
        dashboard: &Dashboard<'_>,
        messages: &Messages,
        range: &DateRange,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .context("Failed to create output directory")?;

        let output_path = self.output_dir.join(Self::output_filename(range, "png"));
        let svg = Self::build_svg(dashboard, messages, range);
        render_svg_to_png(&svg, &output_path, &self.fonts_dir, &self.font_family).await?;

        tracing::info!("Generated asteroid dashboard image: {:?}", output_path);
        Ok(output_path)
    }

    /// Write the raw table to `neo_{start}_{end}.csv`.
    pub async fn export_csv(&self, records: &[AsteroidRecord], range: &DateRange) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .context("Failed to create output directory")?;

        let output_path = self.output_dir.join(Self::output_filename(range, "csv"));
        write_csv(records, &output_path)?;

        tracing::info!("Exported {} records to {:?}", records.len(), output_path);
        Ok(output_path)
    }

    fn output_filename(range: &DateRange, extension: &str) -> String {
        format!(
            "neo_{}_{}.{}",
            range.start.format("%Y%m%d"),
            range.end.format("%Y%m%d"),
            extension
        )
    }

    pub fn build_svg(dashboard: &Dashboard<'_>, messages: &Messages, range: &DateRange) -> String {
        let mut current_y = Self::TOP_PADDING;
        let mut content = String::new();

        content.push_str(&Self::build_header(messages, &mut current_y));
        content.push_str(&Self::build_raw_table(dashboard.raw_table(), messages, &mut current_y));
        content.push_str(&Self::build_chart(dashboard.scatter(), messages, &mut current_y));
        content.push_str(&Self::build_alert(dashboard.alert(), messages, &mut current_y));

        let footer = Self::build_footer(range, current_y);
        let total_height = current_y + Self::FOOTER_HEIGHT;

        // Content goes in last so text from the feed is never rescanned for placeholders
        DASHBOARD_SVG_TEMPLATE
            .replace("{{SVG_HEIGHT}}", &format!("{:.0}", total_height))
            .replace("{{FOOTER}}", &footer)
            .replace("{{CONTENT}}", &content)
    }

    // ── sections ────────────────────────────────────────────────────────────

    fn build_header(messages: &Messages, current_y: &mut f32) -> String {
        let mut out = String::new();

        *current_y += 36.0;
        out.push_str(&format!(
            r#"<text x="{}" y="{:.1}" class="page-title">{}</text>
"#,
            Self::X_DATE,
            *current_y,
            escape_xml(messages.title())
        ));
        *current_y += 30.0;
        out.push_str(&format!(
            r#"<text x="{}" y="{:.1}" class="page-text">{}</text>
"#,
            Self::X_DATE,
            *current_y,
            escape_xml(messages.description())
        ));

        let note = messages.info_note();
        let note_top = *current_y + 14.0;
        let note_height = 16.0 + note.len() as f32 * 20.0;
        out.push_str(&format!(
            r##"<rect x="10" y="{:.1}" width="880" height="{:.1}" fill="#e7f1fb" rx="4"/>
"##,
            note_top, note_height
        ));
        *current_y = note_top + 8.0;
        for line in note {
            *current_y += 18.0;
            out.push_str(&format!(
                r#"<text x="{}" y="{:.1}" class="note-text">{}</text>
"#,
                Self::X_DATE,
                *current_y,
                escape_xml(line)
            ));
        }
        *current_y = note_top + note_height;

        out
    }

    fn build_section_title(title: &str, current_y: &mut f32) -> String {
        *current_y += Self::SECTION_SPACING;
        let text = format!(
            r#"<text x="{}" y="{:.1}" class="section-title">{}</text>
"#,
            Self::X_DATE,
            *current_y,
            escape_xml(title)
        );
        *current_y += Self::SECTION_TITLE_HEIGHT - 24.0;
        text
    }

    fn build_raw_table(records: &[AsteroidRecord], messages: &Messages, current_y: &mut f32) -> String {
        let mut out = Self::build_section_title(messages.raw_data_heading(), current_y);

        out.push_str(&Self::build_table_header(
            &[
                (Self::X_DATE, "date"),
                (Self::X_NAME, "name"),
                (Self::X_DIAMETER, "diameter_m"),
                (Self::X_HAZARD, "hazardous"),
            ],
            current_y,
        ));

        if records.is_empty() {
            out.push_str(&format!(
                r#"<text x="450" y="{:.1}" text-anchor="middle" class="cell-text">{}</text>
"#,
                *current_y + Self::ROW_HEIGHT / 2.0 + 4.0,
                escape_xml(messages.empty_dataset())
            ));
            *current_y += Self::ROW_HEIGHT;
            return out;
        }

        for (i, record) in records.iter().enumerate() {
            let hazard_text = if record.hazardous { "true" } else { "false" };
            out.push_str(&Self::build_row(
                i,
                &[
                    (Self::X_DATE, record.date.to_string()),
                    (Self::X_NAME, record.name.clone()),
                    (Self::X_DIAMETER, format_diameter(record.diameter_m)),
                    (Self::X_HAZARD, hazard_text.to_string()),
                ],
                current_y,
            ));
        }

        out
    }

    fn build_table_header(columns: &[(f32, &str)], current_y: &mut f32) -> String {
        let mut out = format!(
            r##"<rect x="0" y="{:.1}" width="{}" height="{}" fill="#f0f2f5"/>
"##,
            *current_y,
            Self::PAGE_WIDTH,
            Self::HEADER_HEIGHT
        );
        for (x, label) in columns {
            out.push_str(&format!(
                r#"<text x="{}" y="{:.1}" class="header-text">{}</text>
"#,
                x,
                *current_y + Self::HEADER_HEIGHT / 2.0 + 5.0,
                escape_xml(label)
            ));
        }
        *current_y += Self::HEADER_HEIGHT;
        out
    }

    fn build_row(index: usize, cells: &[(f32, String)], current_y: &mut f32) -> String {
        let bg = if index % 2 == 0 { "#ffffff" } else { "#f8f9fa" };
        let mut out = format!(
            r##"<rect x="0" y="{:.1}" width="{}" height="{}" fill="{}"/>
<line x1="0" y1="{:.1}" x2="{}" y2="{:.1}" stroke="#eeeeee" stroke-width="1"/>
"##,
            *current_y,
            Self::PAGE_WIDTH,
            Self::ROW_HEIGHT,
            bg,
            *current_y + Self::ROW_HEIGHT,
            Self::PAGE_WIDTH,
            *current_y + Self::ROW_HEIGHT,
        );
        let mid_y = *current_y + Self::ROW_HEIGHT / 2.0 + 4.0;
        for (x, value) in cells {
            out.push_str(&format!(
                r#"<text x="{}" y="{:.1}" class="cell-text">{}</text>
"#,
                x,
                mid_y,
                escape_xml(value)
            ));
        }
        *current_y += Self::ROW_HEIGHT;
        out
    }

    fn build_chart(scatter: &ScatterView, messages: &Messages, current_y: &mut f32) -> String {
        let mut out = Self::build_section_title(messages.chart_heading(), current_y);

        *current_y += Self::CHART_TITLE_HEIGHT;
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="chart-title">{}</text>
"#,
            (Self::PLOT_LEFT + Self::PLOT_RIGHT) / 2.0,
            *current_y - 12.0,
            escape_xml(messages.chart_title())
        ));

        let top = *current_y;
        let bottom = top + Self::PLOT_HEIGHT;
        let plot = PlotArea {
            left: Self::PLOT_LEFT,
            right: Self::PLOT_RIGHT,
            top,
            bottom,
            inner_pad: Self::PLOT_INNER_PAD,
        };

        // Axes
        out.push_str(&format!(
            r##"<rect x="{l}" y="{t:.1}" width="{w}" height="{h}" fill="#fcfcfc" stroke="#999999" stroke-width="1"/>
"##,
            l = plot.left,
            t = plot.top,
            w = plot.right - plot.left,
            h = Self::PLOT_HEIGHT,
        ));

        // Y ticks and grid
        for tick in scatter.y_ticks() {
            let y = plot.y_for(tick, scatter.y_max);
            out.push_str(&format!(
                r##"<line x1="{l}" y1="{y:.1}" x2="{r}" y2="{y:.1}" stroke="#e5e5e5" stroke-width="1"/>
<text x="{tx}" y="{ty:.1}" text-anchor="end" class="axis-text">{v}</text>
"##,
                l = plot.left,
                r = plot.right,
                y = y,
                tx = plot.left - 8.0,
                ty = y + 4.0,
                v = format_tick(tick),
            ));
        }

        // X ticks, thinned when the range is long
        let ticks = scatter.date_ticks();
        let stride = ticks.len().div_ceil(Self::MAX_DATE_LABELS).max(1);
        for date in ticks.iter().step_by(stride) {
            let x = plot.x_for(*date, scatter.date_domain);
            out.push_str(&format!(
                r##"<line x1="{x:.1}" y1="{b:.1}" x2="{x:.1}" y2="{b6:.1}" stroke="#999999" stroke-width="1"/>
<text x="{x:.1}" y="{ly:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {ly:.1})" class="axis-text">{d}</text>
"##,
                x = x,
                b = plot.bottom,
                b6 = plot.bottom + 6.0,
                ly = plot.bottom + 18.0,
                d = date,
            ));
        }

        if scatter.points.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="axis-label">{}</text>
"#,
                (plot.left + plot.right) / 2.0,
                (plot.top + plot.bottom) / 2.0,
                escape_xml(messages.empty_dataset())
            ));
        }

        for point in &scatter.points {
            let color = if point.hazardous { HAZARD_COLOR } else { SAFE_COLOR };
            out.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" fill-opacity="{}"/>
"#,
                plot.x_for(point.date, scatter.date_domain),
                plot.y_for(point.diameter_m, scatter.y_max),
                Self::POINT_RADIUS,
                color,
                Self::POINT_OPACITY
            ));
        }

        // Legend
        let legend_x = plot.right - 170.0;
        for (i, (color, label)) in [
            (HAZARD_COLOR, messages.legend_hazardous()),
            (SAFE_COLOR, messages.legend_safe()),
        ]
        .iter()
        .enumerate()
        {
            let y = plot.top + 18.0 + i as f32 * 20.0;
            out.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" fill-opacity="{}"/>
<text x="{:.1}" y="{:.1}" class="axis-text">{}</text>
"#,
                legend_x,
                y,
                Self::POINT_RADIUS,
                color,
                Self::POINT_OPACITY,
                legend_x + 14.0,
                y + 4.0,
                escape_xml(label)
            ));
        }

        // Axis labels
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="axis-label">{}</text>
<text x="30" y="{:.1}" text-anchor="middle" transform="rotate(-90 30 {:.1})" class="axis-label">{}</text>
"#,
            (plot.left + plot.right) / 2.0,
            plot.bottom + Self::CHART_BOTTOM_MARGIN - 10.0,
            escape_xml(messages.chart_x_label()),
            (plot.top + plot.bottom) / 2.0,
            (plot.top + plot.bottom) / 2.0,
            escape_xml(messages.chart_y_label())
        ));

        *current_y = bottom + Self::CHART_BOTTOM_MARGIN;
        out
    }

    fn build_alert(alert: &HazardAlert, messages: &Messages, current_y: &mut f32) -> String {
        let mut out = Self::build_section_title(messages.hazard_heading(), current_y);

        const NO_ROWS: &[HazardRow] = &[];
        let (fill, class, text, rows) = match alert {
            HazardAlert::NoneFound => ("#e3f6e8", "alert-ok", messages.no_hazards().to_string(), NO_ROWS),
            HazardAlert::Detected(rows) => (
                "#fde2e1",
                "alert-danger",
                messages.hazards_detected(rows.len()),
                rows.as_slice(),
            ),
        };

        out.push_str(&format!(
            r#"<rect x="10" y="{:.1}" width="880" height="{}" fill="{}" rx="4"/>
<text x="{}" y="{:.1}" class="{}">{}</text>
"#,
            *current_y,
            Self::BANNER_HEIGHT,
            fill,
            Self::X_DATE + 10.0,
            *current_y + Self::BANNER_HEIGHT / 2.0 + 5.0,
            class,
            escape_xml(&plain_text(&text))
        ));
        *current_y += Self::BANNER_HEIGHT + 10.0;

        if rows.is_empty() {
            return out;
        }

        out.push_str(&Self::build_table_header(
            &[
                (Self::X_DATE, "date"),
                (Self::X_NAME, "name"),
                (Self::X_DIAMETER, "diameter_m"),
            ],
            current_y,
        ));
        for (i, row) in rows.iter().enumerate() {
            out.push_str(&Self::build_row(
                i,
                &[
                    (Self::X_DATE, row.date.to_string()),
                    (Self::X_NAME, row.name.clone()),
                    (Self::X_DIAMETER, format_diameter(row.diameter_m)),
                ],
                current_y,
            ));
        }

        out
    }

    fn build_footer(range: &DateRange, footer_y: f32) -> String {
        let render_time = chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        format!(
            r##"    <g id="footer">
<rect x="0" y="{:.1}" width="100%" height="{}" fill="#f0f2f5" />
<text x="50%" y="{:.1}" class="footer-text" text-anchor="middle">
    NASA NeoWs feed {} to {}, rendered at {}
</text>
</g>
"##,
            footer_y,
            Self::FOOTER_HEIGHT,
            footer_y + Self::FOOTER_HEIGHT / 2.0 + 4.0,
            range.start,
            range.end,
            render_time
        )
    }
}

/// Pixel mapping for the scatter plot.
struct PlotArea {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    inner_pad: f32,
}

impl PlotArea {
    fn x_for(&self, date: NaiveDate, domain: Option<(NaiveDate, NaiveDate)>) -> f32 {
        let (start, end) = match domain {
            Some(domain) => domain,
            None => return (self.left + self.right) / 2.0,
        };
        let span = end.signed_duration_since(start).num_days();
        if span <= 0 {
            return (self.left + self.right) / 2.0;
        }
        let offset = date.signed_duration_since(start).num_days() as f32 / span as f32;
        let width = self.right - self.left - 2.0 * self.inner_pad;
        self.left + self.inner_pad + offset * width
    }

    fn y_for(&self, value: f64, y_max: f64) -> f32 {
        let ratio = if y_max > 0.0 { (value / y_max) as f32 } else { 0.0 };
        self.bottom - ratio * (self.bottom - self.top)
    }
}

fn format_tick(value: f64) -> String {
    let text = format!("{:.3}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Drop pictographs the PNG fonts cannot draw (status emoji and their
/// variation selectors).
fn plain_text(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            !((0x2190..=0x2BFF).contains(&code)
                || (0xFE00..=0xFE0F).contains(&code)
                || code >= 0x1F000)
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn write_csv(records: &[AsteroidRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create CSV file {:?}", output_path))?;
    for record in records {
        wtr.serialize(record).context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Render SVG to PNG
async fn render_svg_to_png(
    svg_content: &str,
    output_path: &Path,
    fonts_dir: &Path,
    font_family: &str,
) -> Result<()> {
    // Load fonts
    let mut fontdb = Database::new();
    fontdb.load_system_fonts();
    if fonts_dir.is_dir() {
        fontdb.load_fonts_dir(fonts_dir);
    }
    tracing::debug!("Loaded {} font faces", fontdb.len());

    // Parse SVG with font database
    let mut options = Options::default();
    options.font_family = font_family.to_string();
    options.fontdb = std::sync::Arc::new(fontdb);

    let tree = Tree::from_str(svg_content, &options)
        .context("Failed to parse SVG")?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    // Render to PNG
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .context("Failed to save PNG")?;

    Ok(())
}
