//! Procedural field-to-grid renderer.
//!
//! Pure: the same phase, observation, rows and header context always produce
//! byte-identical output.

use std::ops::Range;

use chrono::{DateTime, FixedOffset};
use wxradar_weather::Observation;

use crate::symbols::{Intensity, SymbolTable};

pub const SEPARATOR: &str = "═══════════════════════════════════════════════════";
const COMMAND_HELP: &str = "💬 Commands: `.location <city>` | `.random`";

/// Storm band only forms above this precipitation rate.
const STORM_THRESHOLD_MM_PER_HR: f64 = 1.0;
const STORM_RADIUS: f64 = 8.0;
const STORM_HALF_WIDTH: f64 = 4.0;
const STORM_GAIN: f64 = 0.8;

/// What the header block needs besides the observation.
#[derive(Debug, Clone)]
pub struct HeaderContext<'a> {
    pub location_name: &'a str,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct FieldRenderer {
    width: usize,
    height: usize,
    symbols: SymbolTable,
}

impl FieldRenderer {
    pub fn new(width: usize, height: usize, symbols: SymbolTable) -> Self {
        Self {
            width,
            height,
            symbols,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw field value at `(x, y)`, before it is bucketed.
    pub fn intensity_at(&self, x: usize, y: usize, phase: f64, observation: &Observation) -> f64 {
        let (x, y) = (x as f64, y as f64);
        let precipitation = observation.precipitation_mm_per_hr;

        let front = ((x + 2.0 * phase) * 0.3).sin() * ((y + phase) * 0.2).cos();
        let mut intensity = precipitation + 0.5 * front;

        if precipitation > STORM_THRESHOLD_MM_PER_HR {
            let center_x = self.width as f64 / 2.0;
            let center_y = self.height as f64 / 2.0;
            let distance = (x - center_x).hypot(y - center_y);
            let band_radius = STORM_RADIUS + 3.0 * (0.5 * phase).sin();
            let from_band = (distance - band_radius).abs();
            if from_band < STORM_HALF_WIDTH {
                intensity += (STORM_HALF_WIDTH - from_band) * STORM_GAIN;
            }
        }

        intensity
    }

    pub fn category_at(&self, x: usize, y: usize, phase: f64, observation: &Observation) -> Intensity {
        if observation.is_clear() {
            return Intensity::Clear;
        }
        Intensity::from_value(self.intensity_at(x, y, phase, observation))
    }

    /// Grid rows only, clamped to the grid height.
    pub fn render_rows(&self, phase: f64, rows: Range<usize>, observation: &Observation) -> Vec<String> {
        let rows = rows.start.min(self.height)..rows.end.min(self.height);
        rows.map(|y| {
            (0..self.width)
                .map(|x| self.symbols.symbol(self.category_at(x, y, phase, observation)))
                .collect::<String>()
        })
        .collect()
    }

    /// Rows for one segment; the segment that starts at row 0 carries the header.
    pub fn render(
        &self,
        phase: f64,
        rows: Range<usize>,
        observation: &Observation,
        header: &HeaderContext<'_>,
    ) -> Vec<String> {
        let with_header = rows.start == 0;
        let grid = self.render_rows(phase, rows, observation);
        if !with_header {
            return grid;
        }

        let mut lines = self.header_lines(observation, header);
        lines.extend(grid);
        lines
    }

    /// [`Self::render`] joined into the text a sink displays.
    pub fn render_text(
        &self,
        phase: f64,
        rows: Range<usize>,
        observation: &Observation,
        header: &HeaderContext<'_>,
    ) -> String {
        self.render(phase, rows, observation, header).join("\n")
    }

    pub fn header_lines(&self, observation: &Observation, header: &HeaderContext<'_>) -> Vec<String> {
        let [legend_first, legend_second] = self.symbols.legend_lines();
        vec![
            SEPARATOR.to_string(),
            format!("# 🌦️ WEATHER RADAR - {}", header.location_name),
            format!(
                "## {} | {}",
                header.timestamp.format("%Y-%m-%d"),
                header.timestamp.format("%H:%M:%S UTC%:z")
            ),
            format!("### {}", summary_line(observation)),
            SEPARATOR.to_string(),
            "### 📊 PRECIPITATION INTENSITY".to_string(),
            legend_first,
            legend_second,
            COMMAND_HELP.to_string(),
            SEPARATOR.to_string(),
        ]
    }
}

/// Temperature, precipitation and wind; missing readings show as `--`.
pub fn summary_line(observation: &Observation) -> String {
    let rounded = |v: Option<f64>| match v {
        Some(v) => format!("{}", v.round() as i64),
        None => "--".to_string(),
    };
    format!(
        "🌡️ {}°C | 🌧️ {}mm/h | 💨 {}km/h",
        rounded(observation.temperature_c),
        observation.precipitation_mm_per_hr,
        rounded(observation.wind_speed_kph)
    )
}
