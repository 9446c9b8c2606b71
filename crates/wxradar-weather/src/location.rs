//! Location resolution: by name through the geocoder, or by scanning a fixed
//! list of world cities for one with active weather.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::future::Future;
use std::time::Duration;

use crate::geocode::{GeocodeError, Geocoder};
use crate::provider::ObservationSource;
use crate::types::Location;

/// How many random candidates the active-weather scan probes.
pub const MAX_PROBES: usize = 15;
const PROBE_DELAY: Duration = Duration::from_millis(100);

/// Turns user intent into a [`Location`].
pub trait LocationResolver: Send + Sync {
    fn resolve_by_name(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Location, GeocodeError>> + Send;

    /// Best-effort: always yields some candidate, severe or not.
    fn find_active_weather(&self) -> impl Future<Output = Location> + Send;
}

/// Cities probed by the active-weather scan.
pub const CANDIDATES: &[(&str, f64, f64)] = &[
    ("Miami, FL", 25.7617, -80.1918),
    ("New Orleans, LA", 29.9511, -90.0715),
    ("Houston, TX", 29.7604, -95.3698),
    ("Tampa, FL", 27.9506, -82.4572),
    ("Oklahoma City, OK", 35.4676, -97.5164),
    ("Kansas City, MO", 39.0997, -94.5786),
    ("Chicago, IL", 41.8781, -87.6298),
    ("Seattle, WA", 47.6062, -122.3321),
    ("Portland, OR", 45.5152, -122.6784),
    ("Atlanta, GA", 33.749, -84.388),
    ("Denver, CO", 39.7392, -104.9903),
    ("Phoenix, AZ", 33.4484, -112.074),
    ("London, UK", 51.5074, -0.1278),
    ("Paris, France", 48.8566, 2.3522),
    ("Berlin, Germany", 52.52, 13.405),
    ("Madrid, Spain", 40.4168, -3.7038),
    ("Rome, Italy", 41.9028, 12.4964),
    ("Amsterdam, Netherlands", 52.3676, 4.9041),
    ("Vienna, Austria", 48.2082, 16.3738),
    ("Stockholm, Sweden", 59.3293, 18.0686),
    ("Oslo, Norway", 59.9139, 10.7522),
    ("Copenhagen, Denmark", 55.6761, 12.5683),
    ("Helsinki, Finland", 60.1699, 24.9384),
    ("Warsaw, Poland", 52.2297, 21.0122),
    ("Prague, Czech Republic", 50.0755, 14.4378),
    ("Budapest, Hungary", 47.4979, 19.0402),
    ("Bucharest, Romania", 44.4268, 26.1025),
    ("Sofia, Bulgaria", 42.6977, 23.3219),
    ("Athens, Greece", 37.9755, 23.7348),
    ("Lisbon, Portugal", 38.7223, -9.1393),
    ("Tokyo, Japan", 35.6762, 139.6503),
    ("Seoul, South Korea", 37.5665, 126.978),
    ("Beijing, China", 39.9042, 116.4074),
    ("Shanghai, China", 31.2304, 121.4737),
    ("Hong Kong", 22.3193, 114.1694),
    ("Singapore", 1.3521, 103.8198),
    ("Bangkok, Thailand", 13.7563, 100.5018),
    ("Jakarta, Indonesia", -6.2088, 106.8456),
    ("Manila, Philippines", 14.5995, 120.9842),
    ("Mumbai, India", 19.076, 72.8777),
    ("Delhi, India", 28.7041, 77.1025),
    ("Kolkata, India", 22.5726, 88.3639),
    ("Karachi, Pakistan", 24.8607, 67.0011),
    ("Dhaka, Bangladesh", 23.8103, 90.4125),
    ("Sydney, Australia", -33.8688, 151.2093),
    ("Melbourne, Australia", -37.8136, 144.9631),
    ("Brisbane, Australia", -27.4698, 153.0251),
    ("Perth, Australia", -31.9505, 115.8605),
    ("Auckland, New Zealand", -36.8485, 174.7633),
    ("Wellington, New Zealand", -41.2865, 174.7762),
    ("São Paulo, Brazil", -23.5505, -46.6333),
    ("Rio de Janeiro, Brazil", -22.9068, -43.1729),
    ("Buenos Aires, Argentina", -34.6118, -58.396),
    ("Santiago, Chile", -33.4489, -70.6693),
    ("Lima, Peru", -12.0464, -77.0428),
    ("Bogotá, Colombia", 4.711, -74.0721),
    ("Caracas, Venezuela", 10.4806, -66.9036),
    ("Cairo, Egypt", 30.0444, 31.2357),
    ("Lagos, Nigeria", 6.5244, 3.3792),
    ("Nairobi, Kenya", -1.2921, 36.8219),
    ("Cape Town, South Africa", -33.9249, 18.4241),
    ("Johannesburg, South Africa", -26.2041, 28.0473),
    ("Casablanca, Morocco", 33.5731, -7.5898),
    ("Dubai, UAE", 25.2048, 55.2708),
    ("Istanbul, Turkey", 41.0082, 28.9784),
    ("Tel Aviv, Israel", 32.0853, 34.7818),
    ("Riyadh, Saudi Arabia", 24.7136, 46.6753),
    ("Toronto, Canada", 43.6532, -79.3832),
    ("Vancouver, Canada", 49.2827, -123.1207),
    ("Montreal, Canada", 45.5017, -73.5673),
    ("Calgary, Canada", 51.0447, -114.0719),
];

/// Scans [`CANDIDATES`] for a location whose current observation is severe.
#[derive(Debug)]
pub struct ActiveWeatherFinder<S> {
    source: S,
    rng: Mutex<StdRng>,
    candidates: Vec<Location>,
    probe_delay: Duration,
}

impl<S: ObservationSource> ActiveWeatherFinder<S> {
    pub fn new(source: S) -> Self {
        Self::with_rng(source, StdRng::from_entropy())
    }

    /// Deterministic candidate order, for tests.
    pub fn with_rng(source: S, rng: StdRng) -> Self {
        let candidates = CANDIDATES
            .iter()
            .map(|&(name, lat, lon)| Location::new(name, lat, lon))
            .collect();
        Self {
            source,
            rng: Mutex::new(rng),
            candidates,
            probe_delay: PROBE_DELAY,
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<Location>) -> Self {
        if !candidates.is_empty() {
            self.candidates = candidates;
        }
        self
    }

    fn pick(&self) -> Location {
        let mut rng = self.rng.lock();
        match self.candidates.choose(&mut *rng) {
            Some(location) => location.clone(),
            // with_candidates never leaves the list empty
            None => Location::new(CANDIDATES[0].0, CANDIDATES[0].1, CANDIDATES[0].2),
        }
    }

    pub async fn find(&self) -> Location {
        for probe in 0..MAX_PROBES {
            let candidate = self.pick();
            match self.source.fetch_current(&candidate).await {
                Ok(observation) if observation.is_severe() => {
                    tracing::info!(
                        "Found severe weather: {}mm/h, code {} in {} (probe {})",
                        observation.precipitation_mm_per_hr,
                        observation.weather_code,
                        candidate.name,
                        probe + 1
                    );
                    return candidate;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Probe of {} failed: {}", candidate.name, e),
            }

            tokio::time::sleep(self.probe_delay).await;
        }

        let fallback = self.pick();
        tracing::info!(
            "No severe weather found globally, picking random location: {}",
            fallback.name
        );
        fallback
    }
}

/// Open-Meteo backed resolver.
#[derive(Debug)]
pub struct OpenMeteoResolver<S> {
    geocoder: Geocoder,
    finder: ActiveWeatherFinder<S>,
}

impl<S: ObservationSource> OpenMeteoResolver<S> {
    pub fn new(geocoder: Geocoder, finder: ActiveWeatherFinder<S>) -> Self {
        Self { geocoder, finder }
    }
}

impl<S: ObservationSource> LocationResolver for OpenMeteoResolver<S> {
    async fn resolve_by_name(&self, query: &str) -> Result<Location, GeocodeError> {
        self.geocoder.search(query).await
    }

    async fn find_active_weather(&self) -> Location {
        self.finder.find().await
    }
}
