//! Week-column heatmap calendar.
//!
//! One column per Monday-started week and one row per weekday. Cells are
//! colored by absolute daily distance and carry a `<title>` tooltip with the
//! date, distance and activity count.
//!
//! Two layouts share the renderer:
//! - [`GridConfig::standalone`]: a fixed 1200×280 canvas with large cells
//! - [`GridConfig::compact`]: a canvas exactly as tall as the default clock,
//!   with the cell size derived from that height budget

use std::fmt::Write;

use log::debug;

use super::{escape_text, AbsoluteScale, CalendarRenderer, ColorScale, MONTH_ABBREVIATIONS};
use crate::calendar::DailyIntensityMap;

/// Rows in the grid, one per weekday.
const DAYS_PER_WEEK: usize = 7;

/// Columns reserved by the compact layout even for 53-week years.
const MIN_WEEK_COLUMNS: usize = 53;

/// Which header and canvas treatment to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridVariant {
    /// Title and month strip on a fixed canvas
    Standalone,
    /// Dark panel with total distance and month strip, width fitted to the grid
    Compact,
}

/// Layout parameters for a heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub variant: GridVariant,
    pub cell_size: f64,
    pub gap: f64,
    /// Left edge of the first column
    pub origin_x: f64,
    /// Top edge of the Monday row
    pub origin_y: f64,
    /// Fixed canvas width; `None` fits the width to the week count
    pub width: Option<f64>,
    pub height: f64,
    pub corner_radius: f64,
    /// Decimal places for distances in tooltips
    pub tooltip_precision: usize,
    /// Baseline of the month label strip
    pub month_label_y: f64,
}

impl GridConfig {
    /// Large standalone heatmap.
    pub fn standalone() -> Self {
        Self {
            variant: GridVariant::Standalone,
            cell_size: 18.0,
            gap: 3.0,
            origin_x: 25.0,
            origin_y: 80.0,
            width: Some(1200.0),
            height: 280.0,
            corner_radius: 3.0,
            tooltip_precision: 1,
            month_label_y: 75.0,
        }
    }

    /// Compact heatmap matching the default 120-unit clock.
    pub fn compact() -> Self {
        Self::compact_with_height(120.0)
    }

    /// Compact heatmap fitted to a clock of the given size.
    ///
    /// The height is split into a 15-unit distance label, a 12-unit month
    /// strip, the 7-row grid with 1-unit gaps, and an 8-unit bottom margin.
    pub fn compact_with_height(height: f64) -> Self {
        const DISTANCE_LABEL_HEIGHT: f64 = 15.0;
        const MONTH_LABEL_HEIGHT: f64 = 12.0;
        const BOTTOM_MARGIN: f64 = 8.0;
        const SIDE_MARGIN: f64 = 10.0;
        const GAP: f64 = 1.0;

        let available = height - DISTANCE_LABEL_HEIGHT - MONTH_LABEL_HEIGHT - BOTTOM_MARGIN;
        let rows = DAYS_PER_WEEK as f64;
        let cell_size = ((available - (rows - 1.0) * GAP) / rows).max(1.0);

        Self {
            variant: GridVariant::Compact,
            cell_size,
            gap: GAP,
            origin_x: SIDE_MARGIN,
            origin_y: DISTANCE_LABEL_HEIGHT + MONTH_LABEL_HEIGHT,
            width: None,
            height,
            corner_radius: (cell_size * 0.1).max(1.0),
            tooltip_precision: 2,
            month_label_y: DISTANCE_LABEL_HEIGHT + MONTH_LABEL_HEIGHT - 2.0,
        }
    }

    fn pitch(&self) -> f64 {
        self.cell_size + self.gap
    }

    /// Canvas width for a grid with `weeks` columns.
    pub fn canvas_width(&self, weeks: usize) -> f64 {
        match self.width {
            Some(width) => width,
            None => {
                let columns = weeks.max(MIN_WEEK_COLUMNS) as f64;
                columns * self.cell_size + (columns - 1.0) * self.gap + 2.0 * self.origin_x
            }
        }
    }
}

/// Renders a [`DailyIntensityMap`] as a weekly heatmap.
#[derive(Debug, Clone)]
pub struct GridRenderer {
    config: GridConfig,
    scale: AbsoluteScale,
}

impl GridRenderer {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            scale: AbsoluteScale,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Tooltip text for one day.
    pub fn tooltip(&self, date: chrono::NaiveDate, distance_km: f64, count: u32) -> String {
        format!(
            "{}: {:.prec$} km ({} activities)",
            date.format("%Y-%m-%d"),
            distance_km,
            count,
            prec = self.config.tooltip_precision
        )
    }

    fn write_header(&self, svg: &mut String, map: &DailyIntensityMap, width: f64) {
        let c = &self.config;
        let height = c.height;

        match c.variant {
            GridVariant::Standalone => {
                let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
                let _ = writeln!(
                    svg,
                    r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">"#
                );
                let _ = writeln!(svg, "  <style>");
                let _ = writeln!(svg, "    .heatmap-cell {{ rx: {}; }}", c.corner_radius);
                let _ = writeln!(
                    svg,
                    "    .year-label {{ fill: #c9d1d9; font-size: 28px; font-family: Arial, sans-serif; font-weight: bold; }}"
                );
                let _ = writeln!(
                    svg,
                    "    .month-label {{ fill: #8b949e; font-size: 14px; font-family: Arial, sans-serif; }}"
                );
                let _ = writeln!(svg, "  </style>");
                let _ = writeln!(
                    svg,
                    r#"  <text x="{}" y="40" class="year-label">{} Activity Heatmap</text>"#,
                    c.origin_x,
                    map.year()
                );
            }
            GridVariant::Compact => {
                let _ = writeln!(svg, r#"<?xml version="1.0" encoding="utf-8" ?>"#);
                let _ = writeln!(
                    svg,
                    r#"<svg baseProfile="full" height="{height}" version="1.1" viewBox="0,0,{width:.1},{height}" width="{width:.1}" xmlns="http://www.w3.org/2000/svg">"#
                );
                let _ = writeln!(svg, "<defs />");
                let _ = writeln!(
                    svg,
                    r##"<rect fill="#222222" height="{height}" width="{width:.1}" x="0" y="0" />"##
                );
                let _ = writeln!(
                    svg,
                    r##"<text fill="#FFFFFF" style="font-size:11px; font-family:Arial; font-weight:bold;" text-anchor="start" x="{}" y="12">{:.0} km</text>"##,
                    c.origin_x,
                    map.total_distance_km()
                );
            }
        }
    }

    fn write_month_labels(&self, svg: &mut String, map: &DailyIntensityMap) {
        let c = &self.config;
        for (week, month) in map.month_starts() {
            let x = c.origin_x + week as f64 * c.pitch();
            let name = MONTH_ABBREVIATIONS[(month - 1) as usize];
            let _ = match c.variant {
                GridVariant::Standalone => writeln!(
                    svg,
                    r#"  <text x="{x:.1}" y="{}" class="month-label">{name}</text>"#,
                    c.month_label_y
                ),
                GridVariant::Compact => writeln!(
                    svg,
                    r##"<text fill="#8b949e" style="font-size:9px; font-family:Arial;" text-anchor="start" x="{x:.1}" y="{}">{name}</text>"##,
                    c.month_label_y
                ),
            };
        }
    }

    fn write_cells(&self, svg: &mut String, map: &DailyIntensityMap) {
        let c = &self.config;
        let size = c.cell_size;
        let indent = match c.variant {
            GridVariant::Standalone => "  ",
            GridVariant::Compact => "",
        };
        let class = match c.variant {
            GridVariant::Standalone => r#" class="heatmap-cell""#.to_string(),
            GridVariant::Compact => format!(r#" rx="{:.1}""#, c.corner_radius),
        };

        for day in map.grid_days() {
            let x = c.origin_x + day.week as f64 * c.pitch();
            let y = c.origin_y + day.row as f64 * c.pitch();
            let color = self.scale.color(&day.intensity, 1.0);
            let title = self.tooltip(day.date, day.intensity.distance_km, day.intensity.count);

            let _ = writeln!(
                svg,
                r#"{indent}<rect x="{x:.1}" y="{y:.1}" width="{size:.1}" height="{size:.1}" fill="{color}"{class}>"#
            );
            let _ = writeln!(svg, "{indent}  <title>{}</title>", escape_text(&title));
            let _ = writeln!(svg, "{indent}</rect>");
        }
    }
}

impl CalendarRenderer for GridRenderer {
    fn render(&self, map: &DailyIntensityMap) -> String {
        let width = self.config.canvas_width(map.week_count());

        let mut svg = String::new();
        self.write_header(&mut svg, map, width);
        self.write_month_labels(&mut svg, map);
        self.write_cells(&mut svg, map);
        svg.push_str("</svg>");

        debug!(
            "[Render] {:?} heatmap for {}: {} bytes",
            self.config.variant,
            map.year(),
            svg.len()
        );
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{normalize_activities, Activity};
    use crate::timezone::TimezoneConfig;
    use chrono::NaiveDate;

    fn run(id: &str, start: &str, distance: f64) -> Activity {
        Activity {
            id: id.to_string(),
            start_date_local: Some(start.to_string()),
            distance: Some(distance),
            moving_time: Some(1800.0),
            ..Default::default()
        }
    }

    fn titles(svg: &str) -> Vec<String> {
        svg.lines()
            .filter_map(|l| {
                let l = l.trim();
                l.strip_prefix("<title>")
                    .and_then(|rest| rest.strip_suffix("</title>"))
                    .map(String::from)
            })
            .collect()
    }

    #[test]
    fn test_compact_geometry() {
        let config = GridConfig::compact();
        // (120 - 15 - 12 - 8 - 6) / 7
        assert!((config.cell_size - 79.0 / 7.0).abs() < 1e-12);
        assert_eq!(config.origin_y, 27.0);
        assert_eq!(config.month_label_y, 25.0);
        assert!((config.corner_radius - 1.128_571_428_571_428_6).abs() < 1e-9);

        let width_53 = config.canvas_width(53);
        assert!((width_53 - (53.0 * 79.0 / 7.0 + 52.0 + 20.0)).abs() < 1e-9);
        assert_eq!(config.canvas_width(50), width_53);
        assert!(config.canvas_width(54) > width_53);
    }

    #[test]
    fn test_standalone_fixed_canvas() {
        let config = GridConfig::standalone();
        assert_eq!(config.canvas_width(54), 1200.0);

        let map = DailyIntensityMap::empty(2023).unwrap();
        let svg = GridRenderer::new(config).render(&map);
        assert!(svg.contains(r#"viewBox="0 0 1200 280""#));
        assert!(svg.contains("2023 Activity Heatmap"));
    }

    #[test]
    fn test_empty_year_renders_every_cell() {
        for (year, days) in [(2023, 365), (2024, 366)] {
            let map = DailyIntensityMap::empty(year).unwrap();
            for config in [GridConfig::standalone(), GridConfig::compact()] {
                let svg = GridRenderer::new(config).render(&map);
                assert_eq!(svg.matches("<rect x=").count(), days);
                assert_eq!(svg.matches("fill=\"#444444\"").count(), days);
                assert_eq!(titles(&svg).len(), days);
                assert!(svg.ends_with("</svg>"));
            }
        }
    }

    #[test]
    fn test_tooltips_match_intensity_map() {
        let activities = vec![
            run("a", "2024-05-04T07:00:00", 5234.0),
            run("b", "2024-05-04T19:00:00", 2100.0),
            run("c", "2024-11-30T06:00:00", 12000.0),
        ];
        let tz = TimezoneConfig::default();
        let normalized = normalize_activities(&activities, &tz);
        let map = DailyIntensityMap::build(&normalized, 2024).unwrap();

        for (config, precision) in [(GridConfig::compact(), 2), (GridConfig::standalone(), 1)] {
            let renderer = GridRenderer::new(config);
            let svg = renderer.render(&map);
            let titles = titles(&svg);

            let expected: Vec<String> = map
                .iter()
                .map(|(date, day)| {
                    format!(
                        "{}: {:.prec$} km ({} activities)",
                        date,
                        day.distance_km,
                        day.count,
                        prec = precision
                    )
                })
                .collect();
            assert_eq!(titles, expected);
        }

        let compact = GridRenderer::new(GridConfig::compact()).render(&map);
        assert!(compact.contains("<title>2024-05-04: 7.33 km (2 activities)</title>"));
        assert!(compact.contains("<title>2024-01-01: 0.00 km (0 activities)</title>"));
        assert!(compact.contains(">19 km</text>"));
    }

    #[test]
    fn test_cells_colored_by_absolute_distance() {
        let activities = vec![run("a", "2024-05-04T07:00:00", 7500.0)];
        let tz = TimezoneConfig::default();
        let normalized = normalize_activities(&activities, &tz);
        let map = DailyIntensityMap::build(&normalized, 2024).unwrap();
        let svg = GridRenderer::new(GridConfig::standalone()).render(&map);

        assert_eq!(svg.matches("fill=\"red\"").count(), 1);
        assert_eq!(svg.matches("fill=\"#444444\"").count(), 365);
    }

    #[test]
    fn test_rows_follow_weekday() {
        let map = DailyIntensityMap::empty(2023).unwrap();
        let config = GridConfig::standalone();
        let svg = GridRenderer::new(config.clone()).render(&map);

        // 2023-01-01 is a Sunday: column 0, bottom row
        let sunday_y = config.origin_y + 6.0 * (config.cell_size + config.gap);
        let first_cell = svg.lines().find(|l| l.contains("<rect x=")).unwrap();
        assert!(first_cell.contains(&format!(r#"x="25.0" y="{:.1}""#, sunday_y)));

        let monday = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(map.grid_position(monday), (1, 0));
        assert!(svg.contains(r#"<rect x="46.0" y="80.0""#));
    }

    #[test]
    fn test_month_labels_at_first_week() {
        let map = DailyIntensityMap::empty(2024).unwrap();
        let svg = GridRenderer::new(GridConfig::standalone()).render(&map);

        assert_eq!(svg.matches("class=\"month-label\"").count(), 12);
        // February starts in week 4: 25 + 4 * 21
        assert!(svg.contains(r#"<text x="109.0" y="75" class="month-label">Feb</text>"#));
    }
}
