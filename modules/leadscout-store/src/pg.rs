use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use leadscout_common::{CanonicalLead, GeoPoint, LeadScoutError, ScopeTier};

use crate::{LeadStore, MatchCandidate};

const LEAD_COLUMNS: &str = "id, name, name_normalized, address, city, postal_code, \
     phone, phone_normalized, email, website_url, website_normalized, \
     facebook_url, instagram_handle, business_category, industry, scope, \
     latitude, longitude, sources, created_at, updated_at";

/// Postgres-backed lead store. Trigram similarity and proximity filtering
/// are pushed into SQL so candidate retrieval rides the pg_trgm and
/// earthdistance indexes.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    name: String,
    name_normalized: String,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
    phone_normalized: Option<String>,
    email: Option<String>,
    website_url: Option<String>,
    website_normalized: Option<String>,
    facebook_url: Option<String>,
    instagram_handle: Option<String>,
    business_category: Option<String>,
    industry: Option<String>,
    scope: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    sources: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    #[sqlx(flatten)]
    lead: LeadRow,
    name_similarity: f64,
    distance_meters: Option<f64>,
}

impl TryFrom<LeadRow> for CanonicalLead {
    type Error = LeadScoutError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let scope: ScopeTier = row
            .scope
            .parse()
            .map_err(LeadScoutError::StorageUnavailable)?;
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };
        Ok(CanonicalLead {
            id: row.id,
            name: row.name,
            name_normalized: row.name_normalized,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            phone: row.phone,
            phone_normalized: row.phone_normalized,
            email: row.email,
            website_url: row.website_url,
            website_normalized: row.website_normalized,
            facebook_url: row.facebook_url,
            instagram_handle: row.instagram_handle,
            business_category: row.business_category,
            industry: row.industry,
            scope,
            location,
            sources: row.sources.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, LeadScoutError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| LeadScoutError::StorageUnavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map sqlx failures onto the error taxonomy: unique-constraint violations
/// (SQLSTATE 23505) are conflicts, everything else is unavailability.
fn store_err(e: sqlx::Error) -> LeadScoutError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return LeadScoutError::StorageConflict(db.message().to_string());
        }
    }
    LeadScoutError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn find_by_website(
        &self,
        website_normalized: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE website_normalized = $1 LIMIT 1"
        ))
        .bind(website_normalized)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(CanonicalLead::try_from).transpose()
    }

    async fn find_by_phone_and_city(
        &self,
        phone_normalized: &str,
        city: &str,
    ) -> Result<Option<CanonicalLead>, LeadScoutError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads \
             WHERE phone_normalized = $1 AND city = $2 LIMIT 1"
        ))
        .bind(phone_normalized)
        .bind(city)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(CanonicalLead::try_from).transpose()
    }

    async fn find_candidates(
        &self,
        name_normalized: &str,
        point: GeoPoint,
        radius_m: f64,
        similarity_floor: f64,
    ) -> Result<Vec<MatchCandidate>, LeadScoutError> {
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {LEAD_COLUMNS}, \
                    similarity(name_normalized, $1)::float8 AS name_similarity, \
                    CASE WHEN latitude IS NOT NULL AND longitude IS NOT NULL \
                         THEN earth_distance(ll_to_earth(latitude, longitude), \
                                             ll_to_earth($2, $3)) \
                    END AS distance_meters \
             FROM leads \
             WHERE similarity(name_normalized, $1) >= $4 \
                OR (latitude IS NOT NULL AND longitude IS NOT NULL \
                    AND earth_distance(ll_to_earth(latitude, longitude), \
                                       ll_to_earth($2, $3)) <= $5)"
        ))
        .bind(name_normalized)
        .bind(point.lat)
        .bind(point.lng)
        .bind(similarity_floor)
        .bind(radius_m)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(MatchCandidate {
                    name_similarity: row.name_similarity,
                    distance_meters: row.distance_meters,
                    lead: CanonicalLead::try_from(row.lead)?,
                })
            })
            .collect()
    }

    async fn create(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError> {
        sqlx::query(
            "INSERT INTO leads (id, name, name_normalized, address, city, postal_code, \
                 phone, phone_normalized, email, website_url, website_normalized, \
                 facebook_url, instagram_handle, business_category, industry, scope, \
                 latitude, longitude, sources, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19, $20, $21)",
        )
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.name_normalized)
        .bind(&lead.address)
        .bind(&lead.city)
        .bind(&lead.postal_code)
        .bind(&lead.phone)
        .bind(&lead.phone_normalized)
        .bind(&lead.email)
        .bind(&lead.website_url)
        .bind(&lead.website_normalized)
        .bind(&lead.facebook_url)
        .bind(&lead.instagram_handle)
        .bind(&lead.business_category)
        .bind(&lead.industry)
        .bind(lead.scope.to_string())
        .bind(lead.location.map(|p| p.lat))
        .bind(lead.location.map(|p| p.lng))
        .bind(Json(&lead.sources))
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn update(&self, lead: &CanonicalLead) -> Result<(), LeadScoutError> {
        sqlx::query(
            "UPDATE leads SET name = $2, name_normalized = $3, address = $4, city = $5, \
                 postal_code = $6, phone = $7, phone_normalized = $8, email = $9, \
                 website_url = $10, website_normalized = $11, facebook_url = $12, \
                 instagram_handle = $13, business_category = $14, industry = $15, \
                 scope = $16, latitude = $17, longitude = $18, sources = $19, \
                 updated_at = $20 \
             WHERE id = $1",
        )
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.name_normalized)
        .bind(&lead.address)
        .bind(&lead.city)
        .bind(&lead.postal_code)
        .bind(&lead.phone)
        .bind(&lead.phone_normalized)
        .bind(&lead.email)
        .bind(&lead.website_url)
        .bind(&lead.website_normalized)
        .bind(&lead.facebook_url)
        .bind(&lead.instagram_handle)
        .bind(&lead.business_category)
        .bind(&lead.industry)
        .bind(lead.scope.to_string())
        .bind(lead.location.map(|p| p.lat))
        .bind(lead.location.map(|p| p.lng))
        .bind(Json(&lead.sources))
        .bind(lead.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}
