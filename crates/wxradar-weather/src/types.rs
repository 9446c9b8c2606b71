use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// A named geographic point. Replaced wholesale on relocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Precipitation above this rate counts as active weather.
pub const SEVERE_PRECIPITATION_MM_PER_HR: f64 = 1.0;

/// One point-in-time reading for the active location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "ObservationFields")]
pub struct Observation {
    pub temperature_c: Option<f64>,
    /// Always `>= 0`.
    pub precipitation_mm_per_hr: f64,
    pub weather_code: i32,
    pub wind_speed_kph: Option<f64>,
}

/// Wire shape of [`Observation`]; deserialized values go through [`Observation::new`].
#[derive(Deserialize)]
struct ObservationFields {
    temperature_c: Option<f64>,
    precipitation_mm_per_hr: f64,
    weather_code: i32,
    wind_speed_kph: Option<f64>,
}

impl From<ObservationFields> for Observation {
    fn from(raw: ObservationFields) -> Self {
        Self::new(
            raw.temperature_c,
            raw.precipitation_mm_per_hr,
            raw.weather_code,
            raw.wind_speed_kph,
        )
    }
}

impl Observation {
    /// Build an observation, clamping negative or NaN precipitation to zero.
    pub fn new(
        temperature_c: Option<f64>,
        precipitation_mm_per_hr: f64,
        weather_code: i32,
        wind_speed_kph: Option<f64>,
    ) -> Self {
        let precipitation_mm_per_hr = if precipitation_mm_per_hr.is_nan() {
            0.0
        } else {
            precipitation_mm_per_hr.max(0.0)
        };
        Self {
            temperature_c,
            precipitation_mm_per_hr,
            weather_code,
            wind_speed_kph,
        }
    }

    /// Reading used when nothing has ever been fetched: dry, clear, unknown temperature and wind.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }

    /// Clear sky: no precipitation and a code no worse than overcast.
    pub fn is_clear(&self) -> bool {
        self.precipitation_mm_per_hr == 0.0 && self.weather_code <= 3
    }

    /// Thunderstorm, snow, rain/freezing rain, fog, or more than 1 mm/h.
    pub fn is_severe(&self) -> bool {
        let code = self.weather_code;
        self.precipitation_mm_per_hr > SEVERE_PRECIPITATION_MM_PER_HR
            || code >= 95
            || (71..=77).contains(&code)
            || (61..=67).contains(&code)
            || (45..=48).contains(&code)
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Response has no current conditions")]
    MissingCurrent,
}

impl WeatherError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
