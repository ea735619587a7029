pub mod config;
pub mod error;
pub mod similarity;
pub mod types;

pub use config::{Config, ResolverConfig};
pub use error::LeadScoutError;
pub use similarity::trigram_similarity;
pub use types::*;
