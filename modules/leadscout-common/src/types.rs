use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Haversine great-circle distance between two lat/lng points in meters.
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

// --- Enums ---

/// Coarse size/market-presence tier for a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeTier {
    Small,
    Medium,
    Corporate,
}

impl ScopeTier {
    /// Quality rank used by the merge engine: a merge may only upgrade
    /// scope, never downgrade it. The enum is closed, so the "unrecognized
    /// value" rank of 0 cannot occur here.
    pub fn quality_rank(self) -> u8 {
        match self {
            ScopeTier::Small => 1,
            ScopeTier::Medium => 2,
            ScopeTier::Corporate => 3,
        }
    }
}

impl std::fmt::Display for ScopeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeTier::Small => write!(f, "Small"),
            ScopeTier::Medium => write!(f, "Medium"),
            ScopeTier::Corporate => write!(f, "Corporate"),
        }
    }
}

impl std::str::FromStr for ScopeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Small" => Ok(ScopeTier::Small),
            "Medium" => Ok(ScopeTier::Medium),
            "Corporate" => Ok(ScopeTier::Corporate),
            other => Err(format!("unknown scope tier: {other}")),
        }
    }
}

/// Which OSM tag key carried the raw category value. Drives the industry
/// fallback when the value itself is not in the taxonomy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFamily {
    Amenity,
    Shop,
    Office,
    Tourism,
    Craft,
}

impl std::fmt::Display for TagFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagFamily::Amenity => write!(f, "amenity"),
            TagFamily::Shop => write!(f, "shop"),
            TagFamily::Office => write!(f, "office"),
            TagFamily::Tourism => write!(f, "tourism"),
            TagFamily::Craft => write!(f, "craft"),
        }
    }
}

/// A raw category tag: the tag family it came from plus its value
/// (e.g. amenity=restaurant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategory {
    pub family: TagFamily,
    pub value: String,
}

// --- Observations ---

/// One scraped sighting of a business. Produced per scrape run, consumed
/// by the pipeline, never persisted as-is.
#[derive(Debug, Clone, Default)]
pub struct RawObservation {
    pub name: String,
    pub address: Option<String>,
    /// Attached by the orchestrator from the requested area, not scraped.
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub category: Option<RawCategory>,
    pub brand: Option<String>,
    pub opening_hours: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub provider: String,
    pub provider_id: String,
}

impl RawObservation {
    /// Stable `provider:id` source identifier for provenance tracking.
    pub fn source_id(&self) -> String {
        format!("{}:{}", self.provider, self.provider_id)
    }

    pub fn coords(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

// --- Canonical records ---

/// The durable directory entry representing one real-world business.
/// Created once by the pipeline, mutated only through the merge engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalLead {
    pub id: Uuid,
    pub name: String,
    /// Always derived from `name`, never independently editable.
    pub name_normalized: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    /// Digits-only when present.
    pub phone_normalized: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
    /// Bare lowercase host, no scheme, no `www.` prefix.
    pub website_normalized: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub business_category: Option<String>,
    pub industry: Option<String>,
    pub scope: ScopeTier,
    pub location: Option<GeoPoint>,
    /// Grow-only, deduplicated list of `provider:id` source identifiers.
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalLead {
    /// Append a source identifier, keeping the list deduplicated.
    /// Entries are never removed.
    pub fn add_source(&mut self, source_id: String) {
        if !self.sources.iter().any(|s| s == &source_id) {
            self.sources.push(source_id);
        }
    }
}

// --- Ingestion stats and job status ---

/// Outcome counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub new: u32,
    pub merged: u32,
    pub skipped: u32,
}

impl IngestStats {
    pub fn total(&self) -> u32 {
        self.new + self.merged + self.skipped
    }
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ingestion Run Complete ===")?;
        writeln!(f, "New leads:    {}", self.new)?;
        writeln!(f, "Merged:       {}", self.merged)?;
        writeln!(f, "Skipped:      {}", self.skipped)?;
        writeln!(f, "Total:        {}", self.total())?;
        Ok(())
    }
}

/// Lifecycle state of an ingestion job as reported to the progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Status payload pushed to the job/progress collaborator after each
/// record and at run completion. Transport is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub progress_percent: u8,
    pub stats: IngestStats,
    pub error: Option<String>,
}

impl JobStatus {
    pub fn processing(progress_percent: u8, stats: IngestStats) -> Self {
        Self {
            state: JobState::Processing,
            progress_percent,
            stats,
            error: None,
        }
    }

    pub fn completed(stats: IngestStats) -> Self {
        Self {
            state: JobState::Completed,
            progress_percent: 100,
            stats,
            error: None,
        }
    }

    pub fn failed(stats: IngestStats, error: String) -> Self {
        Self {
            state: JobState::Failed,
            progress_percent: 0,
            stats,
            error: Some(error),
        }
    }
}
