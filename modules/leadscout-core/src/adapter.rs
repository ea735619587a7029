//! Ingestion boundary: turns external provider records into
//! `RawObservation`s. The Overpass adapter is the production source;
//! the trait keeps it swappable for tests and future providers.

use async_trait::async_trait;
use tracing::info;

use leadscout_common::{LeadScoutError, RawCategory, RawObservation, TagFamily};
use overpass_client::{OverpassClient, OverpassElement};

#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Produce a finite, ordered batch of observations for one area.
    /// Retry/backoff policy belongs to the implementation, not the core.
    async fn fetch(&self, area: &str, limit: u32) -> Result<Vec<RawObservation>, LeadScoutError>;
}

/// Tag keys that may carry the business category, in priority order.
const CATEGORY_FAMILIES: &[(&str, TagFamily)] = &[
    ("amenity", TagFamily::Amenity),
    ("shop", TagFamily::Shop),
    ("office", TagFamily::Office),
    ("tourism", TagFamily::Tourism),
    ("craft", TagFamily::Craft),
];

pub struct OverpassAdapter {
    client: OverpassClient,
}

impl OverpassAdapter {
    pub fn new(client: OverpassClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObservationSource for OverpassAdapter {
    async fn fetch(&self, area: &str, limit: u32) -> Result<Vec<RawObservation>, LeadScoutError> {
        let elements = self
            .client
            .fetch_area(area, limit)
            .await
            .map_err(|e| LeadScoutError::UpstreamFetch(e.to_string()))?;

        let total = elements.len();
        let observations: Vec<RawObservation> = elements
            .iter()
            .filter_map(observation_from_element)
            .collect();

        info!(
            area,
            elements = total,
            observations = observations.len(),
            "Mapped Overpass elements to observations"
        );
        Ok(observations)
    }
}

/// Map one OSM element to an observation. Elements without a name tag
/// carry no usable identity and are dropped here.
fn observation_from_element(el: &OverpassElement) -> Option<RawObservation> {
    let name = el.tag("name")?.to_string();
    let (latitude, longitude) = match el.coords() {
        Some((lat, lon)) => (Some(lat), Some(lon)),
        None => (None, None),
    };

    Some(RawObservation {
        name,
        address: build_address(el),
        city: None,
        postal_code: el.tag("addr:postcode").map(str::to_string),
        phone: el.tag_or_contact("phone").map(str::to_string),
        website: el.tag_or_contact("website").map(str::to_string),
        email: el.tag_or_contact("email").map(str::to_string),
        facebook_url: el.tag("contact:facebook").map(str::to_string),
        instagram_handle: el.tag("contact:instagram").map(str::to_string),
        category: extract_category(el),
        brand: el
            .tag("brand")
            .or_else(|| el.tag("brand:wikidata"))
            .map(str::to_string),
        opening_hours: el.tag("opening_hours").map(str::to_string),
        latitude,
        longitude,
        provider: "osm".to_string(),
        provider_id: format!("{}/{}", el.element_type, el.id),
    })
}

/// Assemble a display address from `addr:*` parts, comma-separated.
fn build_address(el: &OverpassElement) -> Option<String> {
    let street = match (el.tag("addr:street"), el.tag("addr:housenumber")) {
        (Some(street), Some(number)) => Some(format!("{street} {number}")),
        (Some(street), None) => Some(street.to_string()),
        _ => None,
    };

    let parts: Vec<&str> = [
        street.as_deref(),
        el.tag("addr:postcode"),
        el.tag("addr:city"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn extract_category(el: &OverpassElement) -> Option<RawCategory> {
    for (key, family) in CATEGORY_FAMILIES {
        if let Some(value) = el.tag(key) {
            return Some(RawCategory {
                family: *family,
                value: value.to_string(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(json: &str) -> OverpassElement {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unnamed_elements_are_dropped() {
        let el = element(r#"{"type":"node","id":1,"lat":52.5,"lon":13.4,"tags":{"amenity":"cafe"}}"#);
        assert!(observation_from_element(&el).is_none());
    }

    #[test]
    fn full_element_maps_all_fields() {
        let el = element(
            r#"{"type":"node","id":240109189,"lat":52.52,"lon":13.405,"tags":{
                "name":"Cafe Luna",
                "amenity":"cafe",
                "addr:street":"Torstraße",
                "addr:housenumber":"12",
                "addr:postcode":"10119",
                "addr:city":"Berlin",
                "contact:phone":"+49 30 1234",
                "website":"https://cafeluna.de",
                "contact:instagram":"cafeluna",
                "opening_hours":"Mo-Su 08:00-20:00"
            }}"#,
        );
        let obs = observation_from_element(&el).unwrap();
        assert_eq!(obs.name, "Cafe Luna");
        assert_eq!(
            obs.address.as_deref(),
            Some("Torstraße 12, 10119, Berlin")
        );
        assert_eq!(obs.postal_code.as_deref(), Some("10119"));
        assert_eq!(obs.phone.as_deref(), Some("+49 30 1234"));
        assert_eq!(obs.website.as_deref(), Some("https://cafeluna.de"));
        assert_eq!(obs.instagram_handle.as_deref(), Some("cafeluna"));
        assert_eq!(obs.category.as_ref().unwrap().value, "cafe");
        assert_eq!(obs.category.as_ref().unwrap().family, TagFamily::Amenity);
        assert_eq!(obs.source_id(), "osm:node/240109189");
        assert_eq!(obs.coords().unwrap().lat, 52.52);
    }

    #[test]
    fn category_priority_prefers_amenity_over_shop() {
        let el = element(
            r#"{"type":"node","id":2,"lat":0.0,"lon":0.0,
                "tags":{"name":"X","shop":"bakery","amenity":"cafe"}}"#,
        );
        let obs = observation_from_element(&el).unwrap();
        assert_eq!(obs.category.as_ref().unwrap().value, "cafe");
    }
}
