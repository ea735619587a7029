//! Conflict-resolving merge of a new observation into an existing lead.
//!
//! Every field transition is either "fill empty" or "replace with a
//! provably better value" under an explicit total ordering, implemented
//! as per-field monotonic helpers. Repeated merges of the same or weaker
//! observation never erase known information, so replaying a batch is
//! safe in any order.

use chrono::{DateTime, Utc};

use leadscout_common::{CanonicalLead, RawObservation};

use crate::classify::Classification;
use crate::normalize::{normalize_name, normalize_phone, normalize_website};

/// Merge `obs` into `existing` in place. The caller persists the result.
pub fn merge_observation(
    existing: &mut CanonicalLead,
    obs: &RawObservation,
    classification: &Classification,
    now: DateTime<Utc>,
) {
    existing.add_source(obs.source_id());

    // Longer names are assumed more complete (legal suffix etc.); ties
    // favor the existing value. The normalized key is always re-derived.
    if obs.name.len() > existing.name.len() {
        existing.name = obs.name.clone();
        existing.name_normalized = normalize_name(&obs.name);
    }

    // First-known-value wins; never overwritten once set.
    if existing.website_url.is_none() {
        if let Some(website) = &obs.website {
            existing.website_url = Some(website.clone());
            existing.website_normalized = normalize_website(Some(website));
        }
    }
    if existing.phone.is_none() {
        if let Some(phone) = &obs.phone {
            existing.phone = Some(phone.clone());
            existing.phone_normalized = normalize_phone(Some(phone));
        }
    }
    fill_if_empty(&mut existing.email, &obs.email);
    fill_if_empty(&mut existing.facebook_url, &obs.facebook_url);
    fill_if_empty(&mut existing.instagram_handle, &obs.instagram_handle);

    // Address: replace only with a strictly longer (more complete) one.
    if let Some(addr) = &obs.address {
        let existing_len = existing.address.as_deref().map_or(0, str::len);
        if addr.len() > existing_len {
            existing.address = Some(addr.clone());
        }
    }

    fill_if_empty(&mut existing.city, &obs.city);
    fill_if_empty(&mut existing.postal_code, &obs.postal_code);

    // Location, once set, is never cleared or moved.
    if existing.location.is_none() {
        existing.location = obs.coords();
    }

    // Scope can only be upgraded, never downgraded.
    if classification.scope.quality_rank() > existing.scope.quality_rank() {
        existing.scope = classification.scope;
    }

    if existing.industry.is_none() {
        existing.industry = Some(classification.industry.clone());
    }
    if existing.business_category.is_none() {
        existing.business_category = obs.category.as_ref().map(|c| c.value.clone());
    }

    existing.updated_at = now;
}

fn fill_if_empty(slot: &mut Option<String>, incoming: &Option<String>) {
    if slot.is_none() {
        *slot = incoming.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_common::{GeoPoint, RawCategory, ScopeTier, TagFamily};
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
            sources: vec!["osm:node/1".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn obs(name: &str, provider_id: &str) -> RawObservation {
        RawObservation {
            name: name.to_string(),
            provider: "osm".into(),
            provider_id: provider_id.to_string(),
            ..Default::default()
        }
    }

    fn classification(scope: ScopeTier) -> Classification {
        Classification {
            industry: "Hospitality - F&B".into(),
            scope,
        }
    }

    #[test]
    fn longer_name_wins_and_key_is_rederived() {
        let mut existing = lead("Cafe Luna");
        let incoming = obs("Café Luna GmbH", "node/2");
        merge_observation(
            &mut existing,
            &incoming,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.name, "Café Luna GmbH");
        assert_eq!(existing.name_normalized, "cafelunagmbh");
    }

    #[test]
    fn equal_length_name_keeps_existing() {
        let mut existing = lead("Cafe Luna");
        let incoming = obs("CAFE LUNA", "node/2");
        merge_observation(
            &mut existing,
            &incoming,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.name, "Cafe Luna");
    }

    #[test]
    fn first_known_value_is_never_overwritten() {
        let mut existing = lead("Cafe Luna");
        existing.phone = Some("+49 30 1111".into());
        existing.phone_normalized = Some("49301111".into());
        let mut incoming = obs("Cafe Luna", "node/2");
        incoming.phone = Some("+49 30 2222".into());
        incoming.email = Some("hello@cafeluna.de".into());
        merge_observation(
            &mut existing,
            &incoming,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.phone.as_deref(), Some("+49 30 1111"));
        assert_eq!(existing.phone_normalized.as_deref(), Some("49301111"));
        assert_eq!(existing.email.as_deref(), Some("hello@cafeluna.de"));
    }

    #[test]
    fn address_replaced_only_when_strictly_longer() {
        let mut existing = lead("Cafe Luna");
        existing.address = Some("Torstraße 12".into());
        let mut incoming = obs("Cafe Luna", "node/2");
        incoming.address = Some("Torstraße 12, 10119 Berlin".into());
        merge_observation(
            &mut existing,
            &incoming,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(
            existing.address.as_deref(),
            Some("Torstraße 12, 10119 Berlin")
        );

        // A shorter address never replaces.
        let mut shorter = obs("Cafe Luna", "node/3");
        shorter.address = Some("Torstr. 12".into());
        merge_observation(
            &mut existing,
            &shorter,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(
            existing.address.as_deref(),
            Some("Torstraße 12, 10119 Berlin")
        );
    }

    #[test]
    fn location_set_once_never_moved() {
        let mut existing = lead("Cafe Luna");
        let mut incoming = obs("Cafe Luna", "node/2");
        incoming.latitude = Some(52.52);
        incoming.longitude = Some(13.405);
        merge_observation(
            &mut existing,
            &incoming,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(
            existing.location,
            Some(GeoPoint {
                lat: 52.52,
                lng: 13.405
            })
        );

        let mut moved = obs("Cafe Luna", "node/3");
        moved.latitude = Some(48.13);
        moved.longitude = Some(11.58);
        merge_observation(
            &mut existing,
            &moved,
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.location.unwrap().lat, 52.52);
    }

    #[test]
    fn scope_upgrades_but_never_downgrades() {
        let mut existing = lead("Cafe Luna");
        merge_observation(
            &mut existing,
            &obs("Cafe Luna", "node/2"),
            &classification(ScopeTier::Corporate),
            Utc::now(),
        );
        assert_eq!(existing.scope, ScopeTier::Corporate);

        merge_observation(
            &mut existing,
            &obs("Cafe Luna", "node/3"),
            &classification(ScopeTier::Medium),
            Utc::now(),
        );
        assert_eq!(existing.scope, ScopeTier::Corporate);
    }

    #[test]
    fn sources_grow_without_duplicates() {
        let mut existing = lead("Cafe Luna");
        merge_observation(
            &mut existing,
            &obs("Cafe Luna", "node/2"),
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        merge_observation(
            &mut existing,
            &obs("Cafe Luna", "node/2"),
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.sources, vec!["osm:node/1", "osm:node/2"]);
    }

    #[test]
    fn replay_is_monotonic_no_field_reverts_to_null() {
        let mut existing = lead("Cafe Luna");
        let mut rich = obs("Café Luna GmbH", "node/2");
        rich.address = Some("Torstraße 12, 10119 Berlin".into());
        rich.phone = Some("+49 30 1234".into());
        rich.website = Some("cafeluna.de".into());
        rich.email = Some("hi@cafeluna.de".into());
        rich.city = Some("Berlin".into());
        rich.latitude = Some(52.52);
        rich.longitude = Some(13.405);
        rich.category = Some(RawCategory {
            family: TagFamily::Amenity,
            value: "cafe".into(),
        });
        merge_observation(
            &mut existing,
            &rich,
            &classification(ScopeTier::Medium),
            Utc::now(),
        );

        let snapshot = existing.clone();
        // Re-merging a bare observation must not erase anything.
        merge_observation(
            &mut existing,
            &obs("Cafe", "node/3"),
            &classification(ScopeTier::Small),
            Utc::now(),
        );
        assert_eq!(existing.name, snapshot.name);
        assert_eq!(existing.address, snapshot.address);
        assert_eq!(existing.phone, snapshot.phone);
        assert_eq!(existing.website_url, snapshot.website_url);
        assert_eq!(existing.email, snapshot.email);
        assert_eq!(existing.city, snapshot.city);
        assert_eq!(existing.location, snapshot.location);
        assert_eq!(existing.scope, snapshot.scope);
        assert_eq!(existing.industry, snapshot.industry);
        assert_eq!(existing.business_category, snapshot.business_category);
    }
}
