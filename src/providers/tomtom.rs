use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{clean_website, BusinessCandidate, CategoryHint, Coordinate, ProviderTag};

const DEFAULT_BASE_URL: &str = "https://api.tomtom.com/search/2";
const RESULT_LIMIT: u32 = 50;

pub struct TomTomProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TomTomProvider {
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

    /// TomTom has no category taxonomy for POI search; hints become
    /// free-text queries.
    fn category_query(category: CategoryHint) -> &'static str {
        match category {
            CategoryHint::Coffee => "coffee shop",
            CategoryHint::Restaurant => "restaurant",
            CategoryHint::Doctor => "doctor",
            CategoryHint::Lawyer => "lawyer",
            CategoryHint::Dentist => "dentist",
            CategoryHint::RealEstate => "real estate",
            CategoryHint::Accountant => "accountant",
        }
    }

    async fn request(
        &self,
        query_text: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let url = format!("{}/search/{}.json", self.base_url, query_text);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if status.as_u16() == 403 {
            return Err(ProviderError::AuthFailure(
                "tomtom rejected the API key (403)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "tomtom returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload
            .results
            .into_iter()
            .map(PoiResult::into_candidate)
            .collect())
    }
}

#[async_trait]
impl super::PlaceProvider for TomTomProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::TomTom
    }

    async fn search(
        &self,
        coord: Coordinate,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let params = [
            ("key", self.api_key.clone()),
            ("lat", coord.lat.to_string()),
            ("lon", coord.lng.to_string()),
            ("radius", radius_m.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
        ];
        let candidates = self
            .request(Self::category_query(category), &params)
            .await?;
        debug!("tomtom: {} raw candidates", candidates.len());
        Ok(candidates)
    }

    async fn verify_credentials(&self) -> Result<(), ProviderError> {
        let params = [
            ("key", self.api_key.clone()),
            ("lat", "37.7749".to_string()),
            ("lon", "-122.4194".to_string()),
            ("radius", "1000".to_string()),
            ("limit", "1".to_string()),
        ];
        self.request("coffee", &params).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PoiResult>,
}

#[derive(Debug, Default, Deserialize)]
struct PoiResult {
    #[serde(default)]
    id: String,
    #[serde(default)]
    poi: Poi,
    #[serde(default)]
    address: Address,
    #[serde(default)]
    position: Position,
}

#[derive(Debug, Default, Deserialize)]
struct Poi {
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    #[serde(default)]
    freeform_address: String,
    #[serde(default)]
    municipality: String,
    #[serde(default)]
    country_subdivision: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct Position {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl PoiResult {
    fn into_candidate(self) -> BusinessCandidate {
        BusinessCandidate {
            external_id: self.id,
            name: self.poi.name.trim().to_string(),
            address: self.address.freeform_address,
            locality: self.address.municipality,
            region: self.address.country_subdivision,
            postcode: self.address.postal_code,
            country: self.address.country,
            latitude: self.position.lat,
            longitude: self.position.lon,
            phone: self.poi.phone.trim().to_string(),
            email: String::new(),
            website: clean_website(&self.poi.url),
            category: self.poi.categories.join(", "),
            category_id: String::new(),
            source: ProviderTag::TomTom,
        }
    }
}
