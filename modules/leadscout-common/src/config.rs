use std::env;

/// Tunable constants for the duplicate resolver. The reference values come
/// from the production defaults; they are empirically chosen and should be
/// validated against a labeled duplicate corpus before being changed.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Composite score above which a fuzzy candidate is accepted.
    pub match_threshold: f64,
    /// Trigram similarity floor for candidate retrieval by name.
    pub name_similarity_floor: f64,
    /// Radius in meters for candidate retrieval by proximity.
    pub proximity_radius_m: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.85,
            name_similarity_floor: 0.3,
            proximity_radius_m: 50.0,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Overpass
    pub overpass_url: Option<String>,

    // Ingestion defaults
    pub city: String,
    pub lead_limit: u32,

    // Resolver tuning
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let defaults = ResolverConfig::default();
        Self {
            database_url: required_env("DATABASE_URL"),
            overpass_url: env::var("OVERPASS_URL").ok(),
            city: env::var("CITY").unwrap_or_else(|_| "Berlin".to_string()),
            lead_limit: parsed_env("LEAD_LIMIT", 100),
            resolver: ResolverConfig {
                match_threshold: parsed_env("MATCH_THRESHOLD", defaults.match_threshold),
                name_similarity_floor: parsed_env(
                    "NAME_SIMILARITY_FLOOR",
                    defaults.name_similarity_floor,
                ),
                proximity_radius_m: parsed_env(
                    "PROXIMITY_RADIUS_M",
                    defaults.proximity_radius_m,
                ),
            },
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number")),
        Err(_) => default,
    }
}
