//! Duplicate detection: three lookup strategies tried in strict priority
//! order, returning on the first hit.
//!
//! 1. Website exact match — a normalized website is treated as
//!    unambiguous identity.
//! 2. Phone + city exact match — phone alone is not identity (shared
//!    switchboards, multi-location chains).
//! 3. Fuzzy composite match — weighted scoring over name, proximity,
//!    phone, and address evidence, only attempted when the observation
//!    carries coordinates.

use tracing::debug;

use leadscout_common::{CanonicalLead, LeadScoutError, RawObservation, ResolverConfig};
use leadscout_store::{LeadStore, MatchCandidate};

use crate::normalize::{normalize_name, normalize_phone, normalize_website};

const W_NAME: f64 = 0.4;
const W_LOCATION: f64 = 0.3;
const W_PHONE: f64 = 0.2;
const W_ADDRESS: f64 = 0.1;

/// Distance in meters at which the location component has decayed to 1/e.
const LOCATION_DECAY_M: f64 = 50.0;

pub struct DuplicateResolver {
    config: ResolverConfig,
}

impl DuplicateResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Find an existing lead describing the same real-world business as
    /// `obs`, or None. Malformed phone/website inputs are treated as
    /// absent fields, not errors.
    pub async fn find_duplicate(
        &self,
        store: &dyn LeadStore,
        obs: &RawObservation,
    ) -> Result<Option<CanonicalLead>, LeadScoutError> {
        // Strategy 1: exact match on normalized website.
        if let Some(website) = normalize_website(obs.website.as_deref()) {
            if let Some(hit) = store.find_by_website(&website).await? {
                debug!(website = website.as_str(), lead_id = %hit.id, "Duplicate via website match");
                return Ok(Some(hit));
            }
        }

        // Strategy 2: exact match on normalized phone + city.
        if let (Some(phone), Some(city)) =
            (normalize_phone(obs.phone.as_deref()), obs.city.as_deref())
        {
            if let Some(hit) = store.find_by_phone_and_city(&phone, city).await? {
                debug!(phone = phone.as_str(), city, lead_id = %hit.id, "Duplicate via phone+city match");
                return Ok(Some(hit));
            }
        }

        // Strategy 3: fuzzy composite match. Never attempted blind — the
        // observation must carry coordinates.
        if let Some(point) = obs.coords() {
            let name_key = normalize_name(&obs.name);
            let candidates = store
                .find_candidates(
                    &name_key,
                    point,
                    self.config.proximity_radius_m,
                    self.config.name_similarity_floor,
                )
                .await?;

            let mut best: Option<(f64, CanonicalLead)> = None;
            for candidate in candidates {
                let score = composite_score(obs, &name_key, &candidate);
                debug!(
                    lead_id = %candidate.lead.id,
                    score,
                    name_similarity = candidate.name_similarity,
                    distance_meters = candidate.distance_meters,
                    "Scored fuzzy candidate"
                );
                if score <= self.config.match_threshold {
                    continue;
                }
                // Keep the maximum-scoring candidate; ties keep the
                // first seen.
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, candidate.lead));
                }
            }

            if let Some((score, lead)) = best {
                debug!(lead_id = %lead.id, score, "Duplicate via fuzzy composite match");
                return Ok(Some(lead));
            }
        }

        Ok(None)
    }
}

/// Weighted composite score over whatever evidence both sides carry.
///
/// Components absent on either side are excluded from numerator and
/// denominator alike, so the score is renormalized over the available
/// evidence rather than penalized for missing fields. A candidate with no
/// available components scores 0.
fn composite_score(obs: &RawObservation, obs_name_key: &str, candidate: &MatchCandidate) -> f64 {
    let mut total = 0.0;
    let mut weight = 0.0;

    // Name similarity, scoring-grade: Jaro-Winkler over the normalized
    // keys (retrieval already filtered on trigram similarity).
    let name_sim = strsim::jaro_winkler(obs_name_key, &candidate.lead.name_normalized);
    total += name_sim * W_NAME;
    weight += W_NAME;

    // Location proximity: exponential decay, 1.0 at 0 m, ~0.5 at 35 m.
    if let Some(distance) = candidate.distance_meters {
        total += (-distance / LOCATION_DECAY_M).exp() * W_LOCATION;
        weight += W_LOCATION;
    }

    // Phone exact match, only when both sides have a normalized phone.
    if let (Some(obs_phone), Some(cand_phone)) = (
        normalize_phone(obs.phone.as_deref()),
        candidate.lead.phone_normalized.as_deref(),
    ) {
        let hit = if obs_phone == cand_phone { 1.0 } else { 0.0 };
        total += hit * W_PHONE;
        weight += W_PHONE;
    }

    // Address similarity, only when both sides have an address.
    if let (Some(obs_addr), Some(cand_addr)) =
        (obs.address.as_deref(), candidate.lead.address.as_deref())
    {
        let sim =
            strsim::normalized_levenshtein(&obs_addr.to_lowercase(), &cand_addr.to_lowercase());
        total += sim * W_ADDRESS;
        weight += W_ADDRESS;
    }

    if weight > 0.0 {
        total / weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leadscout_common::{GeoPoint, ScopeTier};
    use uuid::Uuid;

    fn lead(name: &str) -> CanonicalLead {
        CanonicalLead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            name_normalized: normalize_name(name),
            address: None,
            city: None,
            postal_code: None,
            phone: None,
            phone_normalized: None,
            email: None,
            website_url: None,
            website_normalized: None,
            facebook_url: None,
            instagram_handle: None,
            business_category: None,
            industry: None,
            scope: ScopeTier::Small,
            location: None,
            sources: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn obs(name: &str) -> RawObservation {
        RawObservation {
            name: name.to_string(),
            provider: "osm".into(),
            provider_id: "node/1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn similar_names_nearby_clear_the_threshold() {
        let o = obs("Cafe Luna");
        let key = normalize_name(&o.name);
        let candidate = MatchCandidate {
            lead: lead("Café Luna GmbH"),
            name_similarity: 0.5,
            distance_meters: Some(10.0),
        };
        let score = composite_score(&o, &key, &candidate);
        assert!(score > 0.85, "got {score}");
    }

    #[test]
    fn similar_names_far_apart_do_not_clear_the_threshold() {
        let o = obs("Cafe Luna");
        let key = normalize_name(&o.name);
        let candidate = MatchCandidate {
            lead: lead("Café Luna GmbH"),
            name_similarity: 0.5,
            distance_meters: Some(5_000.0),
        };
        let score = composite_score(&o, &key, &candidate);
        assert!(score < 0.85, "got {score}");
    }

    #[test]
    fn matching_phone_raises_the_score() {
        let mut o = obs("Cafe Luna");
        o.phone = Some("+49 30 1234".into());
        let key = normalize_name(&o.name);
        let mut l = lead("Café Luna");
        l.phone_normalized = Some("49301234".into());
        let with_phone = composite_score(
            &o,
            &key,
            &MatchCandidate {
                lead: l.clone(),
                name_similarity: 1.0,
                distance_meters: Some(20.0),
            },
        );
        l.phone_normalized = Some("49999999".into());
        let with_other_phone = composite_score(
            &o,
            &key,
            &MatchCandidate {
                lead: l,
                name_similarity: 1.0,
                distance_meters: Some(20.0),
            },
        );
        assert!(with_phone > with_other_phone);
    }

    #[test]
    fn missing_components_renormalize_instead_of_penalizing() {
        // Identical name, no location/phone/address on either side:
        // the score should be the pure name similarity, not dragged
        // toward zero by absent evidence.
        let o = obs("Cafe Luna");
        let key = normalize_name(&o.name);
        let candidate = MatchCandidate {
            lead: lead("Cafe Luna"),
            name_similarity: 1.0,
            distance_meters: None,
        };
        let score = composite_score(&o, &key, &candidate);
        assert!((score - 1.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn address_component_uses_character_similarity() {
        let mut o = obs("Cafe Luna");
        o.address = Some("Torstraße 12, 10119 Berlin".into());
        let key = normalize_name(&o.name);
        let mut l = lead("Cafe Luna");
        l.address = Some("Torstrasse 12, 10119 Berlin".into());
        let near = composite_score(
            &o,
            &key,
            &MatchCandidate {
                lead: l.clone(),
                name_similarity: 1.0,
                distance_meters: None,
            },
        );
        l.address = Some("Hauptstraße 99, 80331 München".into());
        let far = composite_score(
            &o,
            &key,
            &MatchCandidate {
                lead: l,
                name_similarity: 1.0,
                distance_meters: None,
            },
        );
        assert!(near > far);
    }

    #[tokio::test]
    async fn geo_point_required_for_fuzzy_strategy() {
        use leadscout_store::MemoryStore;

        let store = MemoryStore::new();
        let mut existing = lead("Cafe Luna");
        existing.location = Some(GeoPoint {
            lat: 52.52,
            lng: 13.405,
        });
        store.create(&existing).await.unwrap();

        let resolver = DuplicateResolver::new(ResolverConfig::default());
        // Same name, but no coordinates on the observation: strategy 3
        // is skipped entirely.
        let result = resolver
            .find_duplicate(&store, &obs("Cafe Luna"))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
