/// Aggregator fan-out against mocked provider APIs: deduplication, failure
/// isolation, auth-failure disabling, and the no-results condition.
use lead_prospector::aggregator::Aggregator;
use lead_prospector::errors::SearchError;
use lead_prospector::models::{CategoryHint, ProviderTag};
use lead_prospector::providers::{
    FoursquareProvider, PlaceProvider, TomTomProvider, UsageTracker,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn foursquare_body() -> serde_json::Value {
    json!({
        "results": [
            {
                "fsq_id": "fsq-1",
                "name": "Blue Cup Cafe",
                "location": {
                    "formatted_address": "12 Main St",
                    "locality": "London",
                    "country": "GB"
                },
                "geocodes": { "main": { "latitude": 51.5, "longitude": -0.12 } },
                "categories": [ { "id": 13035, "name": "Coffee Shop" } ],
                "website": "bluecup.example",
                "tel": "+44 20 1234 5678"
            },
            {
                "fsq_id": "fsq-2",
                "name": "Red Fork Diner",
                "location": { "formatted_address": "99 Oak Ave" },
                "geocodes": { "main": { "latitude": 51.51, "longitude": -0.13 } }
            }
        ]
    })
}

fn tomtom_body() -> serde_json::Value {
    json!({
        "results": [
            {
                "id": "tt-1",
                "poi": {
                    "name": "BLUE CUP CAFE",
                    "phone": "+44 20 1234 5678",
                    "url": "https://bluecup.example",
                    "categories": ["cafe"]
                },
                "address": { "freeformAddress": "12 MAIN ST", "municipality": "London" },
                "position": { "lat": 51.5, "lon": -0.12 }
            }
        ]
    })
}

fn providers_for(
    fsq_server: &MockServer,
    tomtom_server: &MockServer,
) -> Vec<Box<dyn PlaceProvider>> {
    let client = reqwest::Client::new();
    vec![
        Box::new(
            TomTomProvider::new(client.clone(), "tt-key".to_string())
                .with_base_url(format!("{}/search/2", tomtom_server.uri())),
        ),
        Box::new(
            FoursquareProvider::new(client, "fsq-key".to_string())
                .with_base_url(format!("{}/v3", fsq_server.uri())),
        ),
    ]
}

fn aggregator(providers: Vec<Box<dyn PlaceProvider>>) -> Aggregator {
    Aggregator::new(
        providers,
        UsageTracker::new([
            (ProviderTag::Foursquare, 100),
            (ProviderTag::TomTom, 100),
            (ProviderTag::Yelp, 100),
        ]),
    )
}

#[tokio::test]
async fn cross_provider_duplicates_collapse_to_one_record() {
    let fsq_server = MockServer::start().await;
    let tomtom_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/places/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(foursquare_body()))
        .mount(&fsq_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/2/search/restaurant.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tomtom_body()))
        .mount(&tomtom_server)
        .await;

    let mut agg = aggregator(providers_for(&fsq_server, &tomtom_server));
    let report = agg
        .search_all_providers("London", CategoryHint::Restaurant, 5000)
        .await
        .expect("london resolves");

    // Two case-variant sightings of Blue Cup Cafe plus one distinct diner.
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(report.duplicates_removed, 1);
    assert!(!report.no_results);
    assert_eq!(
        report.providers_tried,
        vec![ProviderTag::TomTom, ProviderTag::Foursquare]
    );

    // First-seen wins: TomTom ran first, so its casing is kept.
    assert_eq!(report.candidates[0].name, "BLUE CUP CAFE");
    assert_eq!(report.candidates[0].source, ProviderTag::TomTom);
    // Identity keys agree across the case variants.
    let fsq_variant = &foursquare_body()["results"][0];
    assert_eq!(
        report.candidates[0].identity_key(),
        lead_prospector::models::identity_key(
            fsq_variant["name"].as_str().unwrap(),
            fsq_variant["location"]["formatted_address"].as_str().unwrap()
        )
    );
}

#[tokio::test]
async fn all_providers_unavailable_is_an_empty_report_not_an_error() {
    let fsq_server = MockServer::start().await;
    let tomtom_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fsq_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&tomtom_server)
        .await;

    let mut agg = aggregator(providers_for(&fsq_server, &tomtom_server));
    let report = agg
        .search_all_providers("London", CategoryHint::Coffee, 5000)
        .await
        .expect("failure folds into an empty report");

    assert!(report.candidates.is_empty());
    assert!(report.no_results);
    assert_eq!(report.duplicates_removed, 0);
    assert_eq!(report.providers_failed.len(), 2);
}

#[tokio::test]
async fn auth_failure_disables_the_provider_for_the_rest_of_the_run() {
    let fsq_server = MockServer::start().await;
    let tomtom_server = MockServer::start().await;

    // TomTom reports an expired key exactly once; it must not be called again.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&tomtom_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/places/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(foursquare_body()))
        .mount(&fsq_server)
        .await;

    let mut agg = aggregator(providers_for(&fsq_server, &tomtom_server));

    let first = agg
        .search_all_providers("London", CategoryHint::Coffee, 5000)
        .await
        .expect("search succeeds");
    assert_eq!(first.candidates.len(), 2);
    assert_eq!(agg.disabled_providers(), vec![ProviderTag::TomTom]);

    let second = agg
        .search_all_providers("London", CategoryHint::Coffee, 5000)
        .await
        .expect("search succeeds");
    assert_eq!(second.candidates.len(), 2);
    // Only foursquare was consulted the second time.
    assert_eq!(second.providers_tried, vec![ProviderTag::Foursquare]);
}

#[tokio::test]
async fn unknown_location_aborts_before_any_provider_call() {
    let fsq_server = MockServer::start().await;
    let tomtom_server = MockServer::start().await;
    let mut agg = aggregator(providers_for(&fsq_server, &tomtom_server));

    let err = agg
        .search_until_target("Atlantis", CategoryHint::Coffee, 5000)
        .await
        .expect_err("unmapped location must surface");
    assert!(matches!(err, SearchError::UnknownLocation(name) if name == "Atlantis"));
}

#[tokio::test]
async fn fast_policy_stops_once_target_is_reached() {
    let fsq_server = MockServer::start().await;
    let tomtom_server = MockServer::start().await;

    // TomTom alone already returns ten candidates.
    let many: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            json!({
                "id": format!("tt-{}", i),
                "poi": { "name": format!("Cafe {}", i) },
                "address": { "freeformAddress": format!("{} High St", i) },
                "position": { "lat": 51.5, "lon": -0.12 }
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search/2/search/restaurant.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": many })))
        .mount(&tomtom_server)
        .await;
    // Foursquare must never be consulted under the fast policy.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(foursquare_body()))
        .expect(0)
        .mount(&fsq_server)
        .await;

    let mut agg = aggregator(providers_for(&fsq_server, &tomtom_server));
    let report = agg
        .search_until_target("London", CategoryHint::Restaurant, 5000)
        .await
        .expect("search succeeds");

    assert_eq!(report.candidates.len(), 10);
    assert_eq!(report.providers_tried, vec![ProviderTag::TomTom]);
}
