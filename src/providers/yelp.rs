use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{BusinessCandidate, CategoryHint, Coordinate, ProviderTag};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3";
const RESULT_LIMIT: u32 = 50;
/// Yelp caps the search radius at 40km.
const MAX_RADIUS_M: u32 = 40_000;

pub struct YelpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YelpProvider {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn category_slug(category: CategoryHint) -> &'static str {
        match category {
            CategoryHint::Coffee => "coffee",
            CategoryHint::Restaurant => "restaurants",
            CategoryHint::Doctor => "physicians",
            CategoryHint::Lawyer => "lawyers",
            CategoryHint::Dentist => "dentists",
            CategoryHint::RealEstate => "realestate",
            CategoryHint::Accountant => "accountants",
        }
    }

    async fn request(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let url = format!("{}/businesses/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ProviderError::AuthFailure(
                "yelp rejected the API key (401)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "yelp returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload
            .businesses
            .into_iter()
            .map(Business::into_candidate)
            .collect())
    }
}

#[async_trait]
impl super::PlaceProvider for YelpProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Yelp
    }

    async fn search(
        &self,
        coord: Coordinate,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let params = [
            ("latitude", coord.lat.to_string()),
            ("longitude", coord.lng.to_string()),
            ("radius", radius_m.min(MAX_RADIUS_M).to_string()),
            ("categories", Self::category_slug(category).to_string()),
            ("limit", RESULT_LIMIT.to_string()),
        ];
        let candidates = self.request(&params).await?;
        debug!("yelp: {} raw candidates", candidates.len());
        Ok(candidates)
    }

    async fn verify_credentials(&self) -> Result<(), ProviderError> {
        let params = [
            ("latitude", "37.7749".to_string()),
            ("longitude", "-122.4194".to_string()),
            ("limit", "1".to_string()),
        ];
        self.request(&params).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Default, Deserialize)]
struct Business {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: Location,
    #[serde(default)]
    coordinates: Coordinates,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default)]
    display_address: Vec<String>,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    zip_code: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct Coordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(default)]
    title: String,
}

impl Business {
    fn into_candidate(self) -> BusinessCandidate {
        BusinessCandidate {
            external_id: self.id,
            name: self.name.trim().to_string(),
            address: self.location.display_address.join(", "),
            locality: self.location.city,
            region: self.location.state,
            postcode: self.location.zip_code,
            country: self.location.country,
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            phone: self.phone.trim().to_string(),
            email: String::new(),
            // Yelp's search payload carries no direct website field.
            website: None,
            category: self
                .categories
                .iter()
                .map(|c| c.title.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            category_id: String::new(),
            source: ProviderTag::Yelp,
        }
    }
}
