use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadscout_common::Config;
use leadscout_core::{IngestPipeline, LogSink, OverpassAdapter, Taxonomy};
use leadscout_store::{migrate, PgLeadStore};
use overpass_client::OverpassClient;

#[derive(Parser, Debug)]
#[command(name = "leadscout", about = "Ingest business leads for one city")]
struct Args {
    /// City (administrative area name) to scrape.
    #[arg(long)]
    city: Option<String>,

    /// Maximum number of elements to fetch.
    #[arg(long)]
    limit: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadscout=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let city = args.city.unwrap_or_else(|| config.city.clone());
    let limit = args.limit.unwrap_or(config.lead_limit);

    info!(city = city.as_str(), limit, "LeadScout starting");

    let store = PgLeadStore::connect(&config.database_url).await?;
    migrate(store.pool()).await?;

    let client = match &config.overpass_url {
        Some(url) => OverpassClient::with_base_url(url.clone()),
        None => OverpassClient::new(),
    };
    let adapter = OverpassAdapter::new(client);

    let pipeline = IngestPipeline::new(store, Taxonomy::new(), config.resolver)
        .with_progress(Box::new(LogSink));

    let stats = pipeline.run(&adapter, &city, limit).await?;
    println!("{stats}");

    Ok(())
}
