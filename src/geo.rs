use crate::models::Coordinate;

/// Bounded city table. Lookup is a substring match against the lowercased
/// input, in declaration order; there is deliberately no external geocoding
/// fallback.
const CITY_TABLE: &[(&str, f64, f64)] = &[
    ("london", 51.5074, -0.1278),
    ("new york", 40.7128, -74.0060),
    ("tokyo", 35.6762, 139.6503),
    ("sydney", -33.8688, 151.2093),
    ("toronto", 43.6532, -79.3832),
    ("berlin", 52.5200, 13.4050),
    ("paris", 48.8566, 2.3522),
    ("amsterdam", 52.3676, 4.9041),
    ("barcelona", 41.3851, 2.1734),
    ("rome", 41.9028, 12.4964),
    ("madrid", 40.4168, -3.7038),
    ("vienna", 48.2082, 16.3738),
    ("prague", 50.0755, 14.4378),
    ("dublin", 53.3498, -6.2603),
    ("vancouver", 49.2827, -123.1207),
    ("montreal", 45.5017, -73.5673),
    ("calgary", 51.0447, -114.0719),
    ("melbourne", -37.8136, 144.9631),
    ("brisbane", -27.4698, 153.0251),
    ("perth", -31.9505, 115.8605),
    ("adelaide", -34.9285, 138.6007),
    ("singapore", 1.3521, 103.8198),
    ("dubai", 25.2048, 55.2708),
    ("mumbai", 19.0760, 72.8777),
    ("nairobi", -1.2864, 36.8172),
    ("lagos", 6.5244, 3.3792),
    ("johannesburg", -26.2041, 28.0473),
    ("cairo", 30.0444, 31.2357),
    ("cape town", -33.9249, 18.4241),
    ("accra", 5.6037, -0.1870),
    ("dar es salaam", -6.7924, 39.2083),
    ("kampala", 0.3476, 32.5825),
    ("addis ababa", 9.0320, 38.7469),
    ("casablanca", 33.5731, -7.5898),
    ("san francisco", 37.7749, -122.4194),
    ("los angeles", 34.0522, -118.2437),
    ("chicago", 41.8781, -87.6298),
    ("houston", 29.7604, -95.3698),
    ("phoenix", 33.4484, -112.0740),
    ("philadelphia", 39.9526, -75.1652),
    ("san antonio", 29.4241, -98.4936),
    ("san diego", 32.7157, -117.1611),
    ("dallas", 32.7767, -96.7970),
    ("miami", 25.7617, -80.1918),
    ("boston", 42.3601, -71.0589),
];

pub fn lookup_city(name: &str) -> Option<Coordinate> {
    let needle = name.to_lowercase();
    CITY_TABLE
        .iter()
        .find(|(city, _, _)| needle.contains(city))
        .map(|&(_, lat, lng)| Coordinate { lat, lng })
}
