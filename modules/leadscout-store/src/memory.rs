//! In-memory lead store for pipeline tests. Mirrors the Postgres
//! contract: same uniqueness rules, same candidate annotation, with
//! trigram similarity and haversine distance computed in Rust.

use std::sync::Mutex;

use async_trait::async_trait;

use leadscout_common::{
    haversine_meters, trigram_similarity, CanonicalLead, GeoPoint, LeadScoutError,
};

use crate::{LeadStore, MatchCandidate};

#[derive(Default)]
pub struct MemoryStore {
    leads: Mutex<Vec<CanonicalLead>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.leads.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<CanonicalLead> {
        self.leads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn find_by_website(
        &self,
        website_normalized: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError> {
        let leads = self.leads.lock().unwrap();
        Ok(leads
            .iter()
            .find(|l| l.website_normalized.as_deref() == Some(website_normalized))
            .cloned())
    }

    async fn find_by_phone_and_city(
        &self,
        phone_normalized: &str,
        city: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError> {
        let leads = self.leads.lock().unwrap();
        Ok(leads
            .iter()
            .find(|l| {
                l.phone_normalized.as_deref() == Some(phone_normalized)
                    && l.city.as_deref() == Some(city)
            })
            .cloned())
    }

    async fn find_candidates(
        &self,
        name_normalized: &str,
        point: GeoPoint,
        radius_m: f64,
        similarity_floor: f64,
    ) -> Result<Vec<MatchCandidate>, LeadScoutError> {
        let leads = self.leads.lock().unwrap();
        let mut candidates = Vec::new();

        for lead in leads.iter() {
            let name_similarity = trigram_similarity(&lead.name_normalized, name_normalized);
            let distance_meters = lead
                .location
                .map(|loc| haversine_meters(loc.lat, loc.lng, point.lat, point.lng));

            let by_name = name_similarity >= similarity_floor;
            let by_proximity = distance_meters.is_some_and(|d| d <= radius_m);
            if by_name || by_proximity {
                candidates.push(MatchCandidate {
                    lead: lead.clone(),
                    name_similarity,
                    distance_meters,
                });
            }
        }

        Ok(candidates)
    }

    async fn create(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError> {
        let mut leads = self.leads.lock().unwrap();

        for existing in leads.iter() {
            if lead.website_normalized.is_some()
                && existing.website_normalized == lead.website_normalized
            {
                return Err(LeadScoutError::StorageConflict(format!(
                    "duplicate website_normalized: {:?}",
                    lead.website_normalized
                )));
            }
            if lead.phone_normalized.is_some()
                && existing.name_normalized == lead.name_normalized
                && existing.phone_normalized == lead.phone_normalized
            {
                return Err(LeadScoutError::StorageConflict(format!(
                    "duplicate (name_normalized, phone_normalized): ({}, {:?})",
                    lead.name_normalized, lead.phone_normalized
                )));
            }
        }

        leads.push(lead.clone());
        Ok(())
    }

    async fn update(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError> {
        let mut leads = self.leads.lock().unwrap();
        match leads.iter_mut().find(|l| l.id == lead.id) {
            Some(slot) => {
                *slot = lead.clone();
                Ok(())
            }
            None => Err(LeadScoutError::StorageUnavailable(format!(
                "no lead with id {}",
                lead.id
            ))),
        }
    }
}
