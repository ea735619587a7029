pub mod migrate;
pub mod pg;

#[cfg(feature = "test-support")]
pub mod memory;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use migrate::migrate;
pub use pg::PgLeadStore;

#[cfg(feature = "test-support")]
pub use memory::MemoryStore;

use async_trait::async_trait;
use leadscout_common::{CanonicalLead, GeoPoint, LeadScoutError};

/// A candidate returned by fuzzy retrieval, annotated with the evidence
/// the store already computed: trigram similarity against the probe name
/// key, and distance to the probe point when both sides carry coordinates.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub lead: CanonicalLead,
    pub name_similarity: f64,
    pub distance_meters: Option<f64>,
}

/// Storage boundary for canonical leads. The pipeline is the only writer;
/// uniqueness of `(name_normalized, phone_normalized)` and
/// `website_normalized` is enforced here, not advisory.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Exact lookup by normalized website key.
    async fn find_by_website(
        &self,
        website_normalized: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError>;

    /// Exact lookup by normalized phone key AND city. Phone alone is not
    /// identity (shared switchboards, multi-location chains).
    async fn find_by_phone_and_city(
        &self,
        phone_normalized: &str,
        city: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError>;

    /// Fuzzy candidate retrieval: leads whose name key clears the trigram
    /// similarity floor, unioned with leads within `radius_m` of `point`.
    async fn find_candidates(
        &self,
        name_normalized: &str,
        point: GeoPoint,
        radius_m: f64,
        similarity_floor: f64,
    ) -> Result<Vec<MatchCandidate>, LeadScoutError>;

    /// Persist a new lead. Fails with `StorageConflict` if it would
    /// duplicate an existing identity key.
    async fn create(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError>;

    /// Persist an updated lead.
    async fn update(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError>;
}
