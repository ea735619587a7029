use sqlx::PgPool;
use tracing::info;

use leadscout_common::LeadScoutError;

/// Idempotent schema setup, run at startup. Extensions: pg_trgm for
/// trigram candidate retrieval, cube + earthdistance for the proximity
/// query.
const STATEMENTS: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS pg_trgm",
    "CREATE EXTENSION IF NOT EXISTS cube",
    "CREATE EXTENSION IF NOT EXISTS earthdistance",
    r#"
    CREATE TABLE IF NOT EXISTS leads (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        name_normalized TEXT NOT NULL,
        address TEXT,
        city TEXT,
        postal_code TEXT,
        phone TEXT,
        phone_normalized TEXT,
        email TEXT,
        website_url TEXT,
        website_normalized TEXT,
        facebook_url TEXT,
        instagram_handle TEXT,
        business_category TEXT,
        industry TEXT,
        scope TEXT NOT NULL DEFAULT 'Small',
        latitude DOUBLE PRECISION,
        longitude DOUBLE PRECISION,
        sources JSONB NOT NULL DEFAULT '[]',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT unique_name_phone UNIQUE (name_normalized, phone_normalized),
        CONSTRAINT unique_website UNIQUE (website_normalized)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS leads_name_trgm_idx ON leads USING gin (name_normalized gin_trgm_ops)",
    "CREATE INDEX IF NOT EXISTS leads_city_idx ON leads (city)",
    "CREATE INDEX IF NOT EXISTS leads_phone_norm_idx ON leads (phone_normalized)",
    "CREATE INDEX IF NOT EXISTS leads_earth_idx ON leads USING gist (ll_to_earth(latitude, longitude))",
];

pub async fn migrate(pool: &PgPool) -> Result<(), LeadScoutError> {
    for stmt in STATEMENTS {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| LeadScoutError::StorageUnavailable(e.to_string()))?;
    }
    info!("Lead store schema up to date");
    Ok(())
}
