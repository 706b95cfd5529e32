use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{clean_website, BusinessCandidate, CategoryHint, Coordinate, ProviderTag};

const DEFAULT_BASE_URL: &str = "https://api.foursquare.com/v3";
const RESULT_LIMIT: u32 = 50;

pub struct FoursquareProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FoursquareProvider {
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

    fn category_id(category: CategoryHint) -> &'static str {
        match category {
            CategoryHint::Coffee => "13003",
            CategoryHint::Restaurant => "13026",
            CategoryHint::Doctor => "13035",
            CategoryHint::Lawyer => "13038",
            CategoryHint::Dentist => "13040",
            CategoryHint::RealEstate => "13041",
            CategoryHint::Accountant => "13044",
        }
    }

    async fn request(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let url = format!("{}/places/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ProviderError::AuthFailure(
                "foursquare rejected the API key (401)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "foursquare returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: SearchResponse = response.json().await?;
        let mut candidates = Vec::with_capacity(payload.results.len());
        for place in payload.results {
            candidates.push(place.into_candidate());
        }
        Ok(candidates)
    }
}

#[async_trait]
impl super::PlaceProvider for FoursquareProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Foursquare
    }

    async fn search(
        &self,
        coord: Coordinate,
        category: CategoryHint,
        radius_m: u32,
    ) -> Result<Vec<BusinessCandidate>, ProviderError> {
        let query = [
            ("ll", format!("{},{}", coord.lat, coord.lng)),
            ("radius", radius_m.to_string()),
            ("categories", Self::category_id(category).to_string()),
            ("limit", RESULT_LIMIT.to_string()),
            (
                "fields",
                "fsq_id,name,geocodes,location,categories,website,tel,email".to_string(),
            ),
        ];
        let candidates = self.request(&query).await?;
        debug!("foursquare: {} raw candidates", candidates.len());
        Ok(candidates)
    }

    async fn verify_credentials(&self) -> Result<(), ProviderError> {
        let query = [
            ("ll", "51.5074,-0.1278".to_string()),
            ("radius", "1000".to_string()),
            ("limit", "1".to_string()),
        ];
        self.request(&query).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Default, Deserialize)]
struct Place {
    #[serde(default)]
    fsq_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: Location,
    #[serde(default)]
    geocodes: Geocodes,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    website: String,
    #[serde(default)]
    tel: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    locality: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    postcode: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct Geocodes {
    #[serde(default)]
    main: Point,
}

#[derive(Debug, Default, Deserialize)]
struct Point {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: Option<i64>,
    #[serde(default)]
    name: String,
}

impl Place {
    fn into_candidate(self) -> BusinessCandidate {
        let primary = self.categories.into_iter().next();
        BusinessCandidate {
            external_id: self.fsq_id,
            name: self.name.trim().to_string(),
            address: self.location.formatted_address,
            locality: self.location.locality,
            region: self.location.region,
            postcode: self.location.postcode,
            country: self.location.country,
            latitude: self.geocodes.main.latitude,
            longitude: self.geocodes.main.longitude,
            phone: self.tel.trim().to_string(),
            email: self.email.trim().to_string(),
            website: clean_website(&self.website),
            category: primary.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            category_id: primary
                .and_then(|c| c.id)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            source: ProviderTag::Foursquare,
        }
    }
}
