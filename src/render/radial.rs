//! Circular "clock" calendar.
//!
//! Day `n` of the year occupies the angular slice `[n, n + 1) * 360° / days_in_year`,
//! measured clockwise from twelve o'clock. Each slice extends from the inner
//! radius toward the outer radius in proportion to the day's distance over the
//! year's largest daily distance. Month boundaries get a radial tick and the
//! month name set on an arc just outside the ring.

use std::f64::consts::PI;
use std::fmt::Write;

use chrono::Datelike;
use log::debug;

use super::{
    escape_text, intensity_divisor, CalendarRenderer, ColorScale, RelativeScale, MONTH_NAMES,
};
use crate::calendar::{days_in_month, days_in_year, DailyIntensityMap};

/// Geometry and palette for the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialConfig {
    /// Width and height of the square viewBox
    pub size: f64,
    pub background: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self::with_size(120.0)
    }
}

impl RadialConfig {
    pub fn with_size(size: f64) -> Self {
        Self {
            size,
            background: "#222222".to_string(),
            text_color: "#FFFFFF".to_string(),
            font_family: "Arial".to_string(),
        }
    }

    pub fn center(&self) -> f64 {
        self.size / 2.0
    }

    /// Radius reached by the year's busiest day.
    pub fn outer_radius(&self) -> f64 {
        0.5 * self.size - 6.0
    }

    /// Radius every slice starts from.
    pub fn inner_radius(&self) -> f64 {
        self.outer_radius() / 4.0
    }

    /// Font size scaled from the reference 80-unit design.
    fn font_size(&self, reference: f64) -> f64 {
        self.size * reference / 80.0
    }
}

/// Renders a [`DailyIntensityMap`] as a circular calendar.
#[derive(Debug, Clone, Default)]
pub struct RadialRenderer {
    config: RadialConfig,
    scale: RelativeScale,
}

impl RadialRenderer {
    pub fn new(config: RadialConfig) -> Self {
        Self {
            config,
            scale: RelativeScale,
        }
    }

    pub fn config(&self) -> &RadialConfig {
        &self.config
    }

    fn write_header(&self, svg: &mut String, map: &DailyIntensityMap) {
        let c = &self.config;
        let size = c.size;
        let center = c.center();

        let _ = writeln!(svg, r#"<?xml version="1.0" encoding="utf-8" ?>"#);
        let _ = writeln!(
            svg,
            r#"<svg baseProfile="full" height="{size}mm" version="1.1" viewBox="0,0,{size},{size}" width="{size}mm" xmlns="http://www.w3.org/2000/svg" xmlns:ev="http://www.w3.org/2001/xml-events" xmlns:xlink="http://www.w3.org/1999/xlink">"#
        );
        let _ = writeln!(svg, "<defs />");
        let _ = writeln!(
            svg,
            r#"<rect fill="{}" height="{size}" width="{size}" x="0" y="0" />"#,
            c.background
        );

        let _ = writeln!(
            svg,
            r#"<text alignment-baseline="middle" fill="{}" style="dominant-baseline: central; font-size:{}px; font-family:{};" text-anchor="middle" x="{center}" y="{center}">{}</text>"#,
            c.text_color,
            c.font_size(6.0),
            escape_text(&c.font_family),
            map.year()
        );
        let _ = writeln!(
            svg,
            r#"<text alignment-baseline="middle" fill="{}" style="dominant-baseline: central; font-size:{}px; font-family:{};" text-anchor="start" x="5" y="8">{:.0} km</text>"#,
            c.text_color,
            c.font_size(4.0),
            escape_text(&c.font_family),
            map.total_distance_km()
        );
    }

    /// Tick and curved label for the month starting at day index `day`.
    fn write_month_marker(&self, svg: &mut String, year: i32, month: u32, day: u32, step: f64) {
        let c = &self.config;
        let center = c.center();
        let outer = c.outer_radius();

        let last_day = days_in_month(year, month);
        let a1 = radians(f64::from(day) * step);
        let a3 = radians(f64::from(day + last_day - 1) * step);
        let (sin_a1, cos_a1) = a1.sin_cos();
        let (sin_a3, cos_a3) = a3.sin_cos();

        let r1 = outer + 1.0;
        let r2 = outer + 6.0;
        let r3 = outer + 2.0;

        let _ = writeln!(
            svg,
            r#"<line stroke="{}" stroke-width="0.3" x1="{:.1}" x2="{:.1}" y1="{:.1}" y2="{:.1}"></line>"#,
            c.text_color,
            center + r1 * sin_a1,
            center + r2 * sin_a1,
            center - r1 * cos_a1,
            center - r2 * cos_a1
        );

        let path_id = format!("clock-{}-month{}", year, month);
        let _ = writeln!(
            svg,
            r#"<path d="M {:.1} {:.1} a{r3},{r3} 0 0,1 {:.1}, {:.1}" fill="none" id="{path_id}" stroke="none"></path>"#,
            center + r3 * sin_a1,
            center - r3 * cos_a1,
            r3 * (sin_a3 - sin_a1),
            r3 * (cos_a1 - cos_a3)
        );

        let name = MONTH_NAMES[(month - 1) as usize];
        let _ = writeln!(
            svg,
            r##"<text fill="{}" style="font-size:{}px; font-family:{};" text-anchor="middle"><textPath startOffset="{:.1}" xlink:href="#{path_id}">{name}</textPath></text>"##,
            c.text_color,
            c.font_size(3.75),
            escape_text(&c.font_family),
            0.5 * r3 * (a3 - a1)
        );
    }

    /// Slice for day index `day` with the given intensity ratio.
    fn write_day_segment(&self, svg: &mut String, day: u32, step: f64, ratio: f64, color: &str) {
        let c = &self.config;
        let center = c.center();
        let r1 = c.inner_radius();
        let r2 = r1 + (c.outer_radius() - r1) * ratio;

        let a1 = radians(f64::from(day) * step);
        let a2 = radians(f64::from(day + 1) * step);
        let (sin_a1, cos_a1) = a1.sin_cos();
        let (sin_a2, cos_a2) = a2.sin_cos();

        let mut d = format!(
            "M {:.1} {:.1}",
            center + r1 * sin_a1,
            center - r1 * cos_a1
        );
        let _ = write!(d, " l {:.1} {:.1}", (r2 - r1) * sin_a1, (r1 - r2) * cos_a1);
        let _ = write!(
            d,
            " a{r2},{r2} 0 0,0 {:.1},{:.1}",
            r2 * (sin_a2 - sin_a1),
            r2 * (cos_a1 - cos_a2)
        );
        let _ = write!(d, " l {:.1} {:.1}", (r1 - r2) * sin_a2, (r2 - r1) * cos_a2);

        let _ = writeln!(svg, r#"<path d="{d}" fill="{color}" stroke="none"></path>"#);
    }
}

impl CalendarRenderer for RadialRenderer {
    fn render(&self, map: &DailyIntensityMap) -> String {
        let year = map.year();
        let step = 360.0 / f64::from(days_in_year(year));
        let max_distance = intensity_divisor(map);

        let mut svg = String::new();
        self.write_header(&mut svg, map);

        for (day, (date, intensity)) in (0u32..).zip(map.iter()) {
            if date.day() == 1 {
                self.write_month_marker(&mut svg, year, date.month(), day, step);
            }

            let ratio = intensity.distance_km / max_distance;
            // Empty days collapse onto the inner radius and stay unpainted
            let color = if intensity.distance_km > 0.0 {
                self.scale.color(&intensity, max_distance)
            } else {
                "none"
            };
            self.write_day_segment(&mut svg, day, step, ratio, color);
        }

        svg.push_str("</svg>");
        debug!("[Render] Clock for {}: {} bytes", year, svg.len());
        svg
    }
}

fn radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{normalize_activities, Activity};
    use crate::timezone::TimezoneConfig;

    fn run(start: &str, distance: f64) -> Activity {
        Activity {
            id: start.to_string(),
            start_date_local: Some(start.to_string()),
            distance: Some(distance),
            moving_time: Some(1800.0),
            ..Default::default()
        }
    }

    fn segments(svg: &str) -> Vec<&str> {
        svg.lines()
            .filter(|l| l.starts_with("<path d=\"M") && l.contains("0 0,0"))
            .collect()
    }

    #[test]
    fn test_geometry_defaults() {
        let config = RadialConfig::default();
        assert_eq!(config.center(), 60.0);
        assert_eq!(config.outer_radius(), 54.0);
        assert_eq!(config.inner_radius(), 13.5);
    }

    #[test]
    fn test_empty_year_renders_flat_segments() {
        let map = DailyIntensityMap::empty(2023).unwrap();
        let svg = RadialRenderer::default().render(&map);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));

        let segs = segments(&svg);
        assert_eq!(segs.len(), 365);
        // Zero radial extent: every radial leg is "l 0.0 0.0" (or signed zero)
        for seg in &segs {
            assert!(seg.contains("a13.5,13.5"), "{}", seg);
            assert!(seg.contains("fill=\"none\""));
        }
        assert!(svg.contains(">0 km</text>"));
        assert!(svg.contains(">2023</text>"));
    }

    #[test]
    fn test_leap_year_slices() {
        let map = DailyIntensityMap::empty(2024).unwrap();
        let svg = RadialRenderer::default().render(&map);
        assert_eq!(segments(&svg).len(), 366);
    }

    #[test]
    fn test_month_markers() {
        let map = DailyIntensityMap::empty(2024).unwrap();
        let svg = RadialRenderer::default().render(&map);

        assert_eq!(svg.matches("<line ").count(), 12);
        assert_eq!(svg.matches("<textPath").count(), 12);
        assert!(svg.contains(">January</textPath>"));
        assert!(svg.contains(">December</textPath>"));
        assert!(svg.contains("id=\"clock-2024-month7\""));
    }

    #[test]
    fn test_busiest_day_reaches_outer_radius() {
        let activities = vec![run("2024-03-01T07:00:00", 10000.0), run("2024-03-02T07:00:00", 5000.0)];
        let tz = TimezoneConfig::default();
        let normalized = normalize_activities(&activities, &tz);
        let map = DailyIntensityMap::build(&normalized, 2024).unwrap();
        let svg = RadialRenderer::default().render(&map);

        assert!(svg.contains("a54,54 0 0,0"));
        assert!(svg.contains("fill=\"#ffda00\""));
        // Half the maximum: 13.5 + 40.5 * 0.5
        assert!(svg.contains("a33.75,33.75 0 0,0"));
        assert!(svg.contains("fill=\"#3effb2\""));
        assert!(svg.contains(">15 km</text>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let activities = vec![run("2023-08-08T07:00:00", 7300.0)];
        let tz = TimezoneConfig::default();
        let normalized = normalize_activities(&activities, &tz);
        let map = DailyIntensityMap::build(&normalized, 2023).unwrap();
        let renderer = RadialRenderer::new(RadialConfig::with_size(200.0));

        assert_eq!(renderer.render(&map), renderer.render(&map));
        assert!(renderer.render(&map).contains("viewBox=\"0,0,200,200\""));
    }
}
