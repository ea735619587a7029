//! Ingestion orchestrator: drives normalize → classify → resolve →
//! merge-or-create per observation, sequentially. Record N may merge into
//! a lead created by record N-1, so there is no intra-batch parallelism.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use leadscout_common::{
    CanonicalLead, IngestStats, JobStatus, LeadScoutError, RawObservation, ResolverConfig,
};
use leadscout_store::LeadStore;

use crate::adapter::ObservationSource;
use crate::classify::{Classification, Taxonomy};
use crate::merge::merge_observation;
use crate::normalize::{normalize_name, normalize_phone, normalize_website};
use crate::progress::{NullSink, ProgressSink};
use crate::resolve::DuplicateResolver;

pub struct IngestPipeline<S: LeadStore> {
    store: S,
    taxonomy: Taxonomy,
    resolver: DuplicateResolver,
    progress: Box<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl<S: LeadStore> IngestPipeline<S> {
    pub fn new(store: S, taxonomy: Taxonomy, config: ResolverConfig) -> Self {
        Self {
            store,
            taxonomy,
            resolver: DuplicateResolver::new(config),
            progress: Box::new(NullSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Cancellation is cooperative: the token is checked between records,
    /// so already-committed records stay intact.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one batch from the source and ingest it.
    pub async fn run(
        &self,
        source: &dyn ObservationSource,
        city: &str,
        limit: u32,
    ) -> Result<IngestStats, LeadScoutError> {
        let observations = source.fetch(city, limit).await?;
        self.ingest(city, observations).await
    }

    /// Ingest a batch of observations for one city. Fatal errors abort the
    /// run; records already committed are not rolled back (re-ingesting a
    /// batch is idempotent).
    pub async fn ingest(
        &self,
        city: &str,
        observations: Vec<RawObservation>,
    ) -> Result<IngestStats, LeadScoutError> {
        let mut stats = IngestStats::default();
        match self.ingest_inner(city, observations, &mut stats).await {
            Ok(()) => {
                self.progress.report(JobStatus::completed(stats)).await;
                info!("{stats}");
                Ok(stats)
            }
            Err(e) => {
                self.progress
                    .report(JobStatus::failed(stats, e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    async fn ingest_inner(
        &self,
        city: &str,
        observations: Vec<RawObservation>,
        stats: &mut IngestStats,
    ) -> Result<(), LeadScoutError> {
        let total = observations.len();

        for (index, mut obs) in observations.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(processed = index, total, "Ingestion run cancelled");
                return Err(LeadScoutError::Cancelled);
            }

            obs.city = Some(city.to_string());

            // A name is the minimum viable identity.
            if normalize_name(&obs.name).is_empty() {
                stats.skipped += 1;
                self.report_progress(index + 1, total, *stats).await;
                continue;
            }

            let classification = self.taxonomy.classify(&obs);

            match self.resolver.find_duplicate(&self.store, &obs).await? {
                Some(mut existing) => {
                    merge_observation(&mut existing, &obs, &classification, Utc::now());
                    self.store.update(&existing).await?;
                    stats.merged += 1;
                }
                None => {
                    let lead = new_lead(&obs, &classification);
                    // A conflict here means the resolver missed a true
                    // duplicate; guessing which record it should have
                    // matched is unsafe, so the run fails.
                    self.store.create(&lead).await?;
                    stats.new += 1;
                }
            }

            self.report_progress(index + 1, total, *stats).await;
        }

        Ok(())
    }

    async fn report_progress(&self, processed: usize, total: usize, stats: IngestStats) {
        let percent = if total == 0 {
            100
        } else {
            (processed * 100 / total) as u8
        };
        self.progress
            .report(JobStatus::processing(percent, stats))
            .await;
    }
}

/// Construct a canonical lead from an observation with no match.
fn new_lead(obs: &RawObservation, classification: &Classification) -> CanonicalLead {
    let now = Utc::now();
    CanonicalLead {
        id: Uuid::new_v4(),
        name: obs.name.clone(),
        name_normalized: normalize_name(&obs.name),
        address: obs.address.clone(),
        city: obs.city.clone(),
        postal_code: obs.postal_code.clone(),
        phone: obs.phone.clone(),
        phone_normalized: normalize_phone(obs.phone.as_deref()),
        email: obs.email.clone(),
        website_url: obs.website.clone(),
        website_normalized: normalize_website(obs.website.as_deref()),
        facebook_url: obs.facebook_url.clone(),
        instagram_handle: obs.instagram_handle.clone(),
        business_category: obs.category.as_ref().map(|c| c.value.clone()),
        industry: Some(classification.industry.clone()),
        scope: classification.scope,
        location: obs.coords(),
        sources: vec![obs.source_id()],
        created_at: now,
        updated_at: now,
    }
}
