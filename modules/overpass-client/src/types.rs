use std::collections::HashMap;

use serde::Deserialize;

/// Top-level Overpass JSON response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// Center coordinates reported for way/relation elements via `out center`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// One OSM element (node, way, or relation) with its tag map.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassElement {
    /// Coordinates for this element: node lat/lon, or the `out center`
    /// point for ways and relations.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.map(|c| (c.lat, c.lon)),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Look up a tag, falling back to its `contact:`-prefixed variant
    /// (OSM carries phone/website/socials under either).
    pub fn tag_or_contact(&self, key: &str) -> Option<&str> {
        self.tag(key)
            .or_else(|| self.tags.get(&format!("contact:{key}")).map(String::as_str))
    }
}
