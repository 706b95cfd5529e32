use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    Foursquare,
    TomTom,
    Yelp,
}

impl ProviderTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::Foursquare => "foursquare",
            ProviderTag::TomTom => "tomtom",
            ProviderTag::Yelp => "yelp",
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared category vocabulary; each provider maps these to its own taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryHint {
    Coffee,
    Restaurant,
    Doctor,
    Lawyer,
    Dentist,
    RealEstate,
    Accountant,
}

impl CategoryHint {
    pub const ALL: [CategoryHint; 7] = [
        CategoryHint::Coffee,
        CategoryHint::Restaurant,
        CategoryHint::Doctor,
        CategoryHint::Lawyer,
        CategoryHint::Dentist,
        CategoryHint::RealEstate,
        CategoryHint::Accountant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryHint::Coffee => "coffee",
            CategoryHint::Restaurant => "restaurant",
            CategoryHint::Doctor => "doctor",
            CategoryHint::Lawyer => "lawyer",
            CategoryHint::Dentist => "dentist",
            CategoryHint::RealEstate => "real_estate",
            CategoryHint::Accountant => "accountant",
        }
    }

    pub fn parse(input: &str) -> Option<CategoryHint> {
        let normalized = input.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|hint| hint.as_str() == normalized)
    }
}

impl std::fmt::Display for CategoryHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered place from one provider call, pre-deduplication.
///
/// `external_id` is unique only within its provider; identity across
/// providers comes from `identity_key()`, never from id equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessCandidate {
    pub external_id: String,
    pub name: String,
    pub address: String,
    pub locality: String,
    pub region: String,
    pub postcode: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub category: String,
    pub category_id: String,
    pub source: ProviderTag,
}

impl BusinessCandidate {
    /// Case-folded, whitespace-collapsed `name_address` key used for
    /// in-memory deduplication across providers.
    pub fn join_key(&self) -> String {
        join_key(&self.name, &self.address)
    }

    /// Stable identity for the persisted record.
    pub fn identity_key(&self) -> String {
        identity_key(&self.name, &self.address)
    }
}

fn normalize_part(part: &str) -> String {
    part.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn join_key(name: &str, address: &str) -> String {
    format!("{}_{}", normalize_part(name), normalize_part(address))
}

pub fn identity_key(name: &str, address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(join_key(name, address).as_bytes());
    hex::encode(hasher.finalize())
}

/// Standardize a raw website value: trim, drop empties, add a scheme to
/// bare hosts.
pub fn clean_website(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}
