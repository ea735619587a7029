pub mod error;
pub mod types;

pub use error::{OverpassError, Result};
pub use types::{Center, OverpassElement, OverpassResponse};

const DEFAULT_BASE_URL: &str = "https://overpass-api.de/api/interpreter";

/// Amenity values queried for business listings.
const AMENITY_FILTER: &str =
    "restaurant|cafe|bar|pub|fast_food|hotel|hostel|dentist|doctors|clinic|gym|spa";

/// Shop values queried for business listings.
const SHOP_FILTER: &str = "hairdresser|beauty|bakery|clothes|shoes|supermarket|convenience";

/// Office values queried for business listings.
const OFFICE_FILTER: &str = "lawyer|accountant|real_estate";

pub struct OverpassClient {
    client: reqwest::Client,
    base_url: String,
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a non-default interpreter (mirror or test server).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Fetch business elements inside a named administrative area.
    /// `limit` caps the number of elements the interpreter returns.
    pub async fn fetch_area(&self, area_name: &str, limit: u32) -> Result<Vec<OverpassElement>> {
        let query = build_query(area_name, limit);
        tracing::debug!(area = area_name, limit, "Posting Overpass query");

        let resp = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "text/plain")
            .body(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OverpassError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: OverpassResponse = resp.json().await?;
        tracing::info!(
            area = area_name,
            elements = parsed.elements.len(),
            "Overpass query complete"
        );
        Ok(parsed.elements)
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the Overpass QL query for one administrative area.
fn build_query(area_name: &str, limit: u32) -> String {
    format!(
        r#"[out:json][timeout:60];
area[name="{area_name}"]["boundary"="administrative"]->.searchArea;
(
  node["amenity"~"{AMENITY_FILTER}"](area.searchArea);
  way["amenity"~"{AMENITY_FILTER}"](area.searchArea);
  node["shop"~"{SHOP_FILTER}"](area.searchArea);
  way["shop"~"{SHOP_FILTER}"](area.searchArea);
  node["office"~"{OFFICE_FILTER}"](area.searchArea);
  way["office"~"{OFFICE_FILTER}"](area.searchArea);
);
out center {limit};
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_area_and_limit() {
        let q = build_query("Berlin", 100);
        assert!(q.contains(r#"area[name="Berlin"]"#));
        assert!(q.contains("out center 100"));
        assert!(q.contains("restaurant|cafe"));
    }

    #[test]
    fn element_coords_prefer_node_latlon() {
        let json = r#"{"type":"node","id":42,"lat":52.5,"lon":13.4,"tags":{"name":"Cafe Luna"}}"#;
        let el: OverpassElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.coords(), Some((52.5, 13.4)));
        assert_eq!(el.tag("name"), Some("Cafe Luna"));
    }

    #[test]
    fn element_coords_fall_back_to_center() {
        let json =
            r#"{"type":"way","id":7,"center":{"lat":52.51,"lon":13.41},"tags":{}}"#;
        let el: OverpassElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.coords(), Some((52.51, 13.41)));
    }

    #[test]
    fn contact_prefix_fallback() {
        let json = r#"{"type":"node","id":1,"lat":0.0,"lon":0.0,
            "tags":{"contact:phone":"+49 30 1234","website":"example.com"}}"#;
        let el: OverpassElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.tag_or_contact("phone"), Some("+49 30 1234"));
        assert_eq!(el.tag_or_contact("website"), Some("example.com"));
    }
}
