//! Industry taxonomy and business-scope inference.
//!
//! Static configuration data loaded once and passed as an explicit
//! dependency into the pipeline, not module-level state.

use std::collections::HashMap;

use leadscout_common::{RawObservation, ScopeTier, TagFamily};

/// Raw category tag → coarse industry label.
const INDUSTRY_MAPPING: &[(&str, &str)] = &[
    ("restaurant", "Hospitality - F&B"),
    ("cafe", "Hospitality - F&B"),
    ("bar", "Hospitality - F&B"),
    ("pub", "Hospitality - F&B"),
    ("fast_food", "Hospitality - F&B"),
    ("food_court", "Hospitality - F&B"),
    ("biergarten", "Hospitality - F&B"),
    ("hotel", "Hospitality - Lodging"),
    ("hostel", "Hospitality - Lodging"),
    ("guest_house", "Hospitality - Lodging"),
    ("motel", "Hospitality - Lodging"),
    ("hairdresser", "Personal Services - Beauty"),
    ("beauty", "Personal Services - Beauty"),
    ("nail_salon", "Personal Services - Beauty"),
    ("spa", "Health & Wellness"),
    ("dentist", "Health & Wellness - Medical"),
    ("doctors", "Health & Wellness - Medical"),
    ("clinic", "Health & Wellness - Medical"),
    ("hospital", "Health & Wellness - Medical"),
    ("pharmacy", "Health & Wellness - Medical"),
    ("gym", "Health & Wellness - Fitness"),
    ("fitness_centre", "Health & Wellness - Fitness"),
    ("yoga", "Health & Wellness - Fitness"),
    ("bakery", "Retail - Food"),
    ("butcher", "Retail - Food"),
    ("supermarket", "Retail - Food"),
    ("convenience", "Retail - Food"),
    ("clothes", "Retail - Fashion"),
    ("shoes", "Retail - Fashion"),
    ("jewelry", "Retail - Fashion"),
    ("boutique", "Retail - Fashion"),
    ("lawyer", "Professional Services - Legal"),
    ("accountant", "Professional Services - Financial"),
    ("real_estate", "Professional Services - Real Estate"),
    ("tattoo", "Personal Services - Body Art"),
    ("gallery", "Creative - Arts"),
    ("arts_centre", "Creative - Arts"),
    ("studio", "Creative - Arts"),
    ("coworking_space", "Professional Services - Workspace"),
];

/// Chains recognized by case-insensitive substring match on the name.
const BRAND_CHAINS: &[&str] = &[
    "mcdonalds",
    "burger king",
    "subway",
    "starbucks",
    "kfc",
    "edeka",
    "rewe",
    "aldi",
    "lidl",
    "dm",
    "rossmann",
    "h&m",
    "zara",
    "c&a",
    "primark",
];

/// Result of classifying one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub industry: String,
    pub scope: ScopeTier,
}

/// Immutable lookup tables for classification.
pub struct Taxonomy {
    industries: HashMap<&'static str, &'static str>,
    chains: &'static [&'static str],
}

impl Taxonomy {
    pub fn new() -> Self {
        Self {
            industries: INDUSTRY_MAPPING.iter().copied().collect(),
            chains: BRAND_CHAINS,
        }
    }

    /// Classify an observation into an industry label and a scope tier.
    /// Deterministic and total.
    pub fn classify(&self, obs: &RawObservation) -> Classification {
        Classification {
            industry: self.industry_for(obs),
            scope: self.scope_for(obs),
        }
    }

    fn industry_for(&self, obs: &RawObservation) -> String {
        let Some(category) = &obs.category else {
            return "Other".to_string();
        };

        if let Some(label) = self.industries.get(category.value.as_str()) {
            return (*label).to_string();
        }

        // Unknown value: fall back to a coarse bucket by tag family.
        match category.family {
            TagFamily::Amenity => "Services",
            TagFamily::Shop => "Retail",
            TagFamily::Office => "Professional Services",
            _ => "Other",
        }
        .to_string()
    }

    fn scope_for(&self, obs: &RawObservation) -> ScopeTier {
        let name_lower = obs.name.to_lowercase();
        let is_chain = self.chains.iter().any(|c| name_lower.contains(c));

        if obs.brand.is_some() || is_chain {
            return ScopeTier::Corporate;
        }
        if obs.website.is_some() && obs.opening_hours.is_some() {
            return ScopeTier::Medium;
        }
        ScopeTier::Small
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}
