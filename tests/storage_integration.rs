/// Sqlite round trips on a throwaway database file: upsert semantics,
/// analysis replacement, tier listings, and contact tracking.
use lead_prospector::analysis::{AnalysisResult, IssueCode, Tier, WebsiteStatus};
use lead_prospector::leads::{lead_score_comprehensive, lead_score_legacy};
use lead_prospector::models::{BusinessCandidate, ProviderTag};
use lead_prospector::store;
use uuid::Uuid;

fn temp_db_path() -> String {
    std::env::temp_dir()
        .join(format!("lead-prospector-test-{}.db", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned()
}

fn candidate(name: &str, address: &str, website: Option<&str>) -> BusinessCandidate {
    BusinessCandidate {
        external_id: "ext-1".to_string(),
        name: name.to_string(),
        address: address.to_string(),
        locality: "London".to_string(),
        region: String::new(),
        postcode: "N1".to_string(),
        country: "GB".to_string(),
        latitude: Some(51.5),
        longitude: Some(-0.12),
        phone: "+44 20 1234 5678".to_string(),
        email: String::new(),
        website: website.map(String::from),
        category: "Coffee Shop".to_string(),
        category_id: "13035".to_string(),
        source: ProviderTag::Foursquare,
    }
}

#[tokio::test]
async fn upsert_updates_in_place_instead_of_appending() {
    let path = temp_db_path();
    let pool = store::create_db_pool(&path).await.expect("pool");

    let first = candidate("Blue Cup Cafe", "12 Main St", None);
    assert!(store::upsert_candidate(&pool, &first).await.expect("insert"));

    // Same identity seen again from a case-variant sighting, now with a
    // website; the row is updated, not duplicated.
    let mut second = candidate("BLUE CUP CAFE", "12 MAIN ST", Some("https://bluecup.example"));
    second.external_id = "ext-2".to_string();
    assert!(!store::upsert_candidate(&pool, &second).await.expect("update"));

    let stats = store::get_statistics(&pool).await.expect("stats");
    assert_eq!(stats.total_businesses, 1);
    assert_eq!(stats.with_websites, 1);

    let stored = store::get_by_identity(&pool, &first.identity_key())
        .await
        .expect("get")
        .expect("row exists");
    assert_eq!(stored.website.as_deref(), Some("https://bluecup.example"));
    // Known contact data is never wiped by an empty later sighting.
    assert_eq!(stored.phone, "+44 20 1234 5678");

    tokio::fs::remove_file(&path).await.ok();
}

#[tokio::test]
async fn analysis_is_replaced_wholesale_and_drives_tier_listings() {
    let path = temp_db_path();
    let pool = store::create_db_pool(&path).await.expect("pool");

    let biz = candidate("Red Fork Diner", "99 Oak Ave", Some("https://redfork.example"));
    store::upsert_candidate(&pool, &biz).await.expect("insert");
    let key = biz.identity_key();

    let pending = store::list_pending_analysis(&pool, 10).await.expect("pending");
    assert_eq!(pending.len(), 1);

    // First pass: the site is unreachable.
    let unreachable = AnalysisResult::short_circuit(
        "https://redfork.example".to_string(),
        WebsiteStatus::Unreachable,
        IssueCode::NoWebsiteOrBroken,
    );
    let lead = lead_score_comprehensive(&unreachable);
    store::update_analysis(&pool, &key, &unreachable, &lead)
        .await
        .expect("store analysis");

    let tier1 = store::list_by_tier(&pool, Tier::Tier1, 10).await.expect("list");
    assert_eq!(tier1.len(), 1);
    assert_eq!(tier1[0].website_status.as_deref(), Some("unreachable"));
    assert_eq!(tier1[0].comprehensive_score, 0);
    assert_eq!(tier1[0].lead_score, 50);
    assert_eq!(tier1[0].priority, "high");
    assert!(store::list_pending_analysis(&pool, 10)
        .await
        .expect("pending")
        .is_empty());

    // Re-analysis: the site is back up and clean; the old result is gone.
    let recovered = AnalysisResult::from_issues(
        "https://redfork.example".to_string(),
        WebsiteStatus::Accessible,
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    );
    let lead = lead_score_comprehensive(&recovered);
    store::update_analysis(&pool, &key, &recovered, &lead)
        .await
        .expect("store analysis");

    assert!(store::list_by_tier(&pool, Tier::Tier1, 10)
        .await
        .expect("list")
        .is_empty());
    let tier4 = store::list_by_tier(&pool, Tier::Tier4, 10).await.expect("list");
    assert_eq!(tier4.len(), 1);
    assert_eq!(tier4[0].comprehensive_score, 100);

    // Contacted records drop out of outreach listings.
    store::mark_contacted(&pool, &key).await.expect("contacted");
    assert!(store::list_by_tier(&pool, Tier::Tier4, 10)
        .await
        .expect("list")
        .is_empty());

    tokio::fs::remove_file(&path).await.ok();
}

#[tokio::test]
async fn legacy_analysis_updates_legacy_columns() {
    let path = temp_db_path();
    let pool = store::create_db_pool(&path).await.expect("pool");

    let biz = candidate("Oak Dental", "1 High Rd", Some("http://oakdental.example"));
    store::upsert_candidate(&pool, &biz).await.expect("insert");

    let mut snapshot = lead_prospector::analysis::LegacySnapshot {
        url: "http://oakdental.example".to_string(),
        exists: true,
        status_code: Some(200),
        score: 38,
        has_ssl: false,
        mobile_friendly: false,
        load_time_s: 6.0,
        tech_stack: vec!["WordPress".to_string()],
        outdated_tech: vec!["jQuery 1.x (outdated)".to_string()],
        issues: vec!["Website does not use HTTPS/SSL".to_string()],
        needs_redesign: true,
        has_contact_form: false,
        analyzed_at: chrono::Utc::now(),
    };
    snapshot.needs_redesign = snapshot.score < 50;

    let lead = lead_score_legacy(&snapshot);
    // 30 + 25 + 20 + 15 + 10 + 5 = 100 (capped).
    assert_eq!(lead.score, 100);

    store::update_legacy_analysis(&pool, &biz.identity_key(), &snapshot, &lead)
        .await
        .expect("store legacy");

    let listed = store::list_by_min_score(&pool, 30, 10).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].website_score, 38);
    assert_eq!(listed[0].lead_score, 100);
    assert_eq!(listed[0].priority, "high");

    tokio::fs::remove_file(&path).await.ok();
}

#[tokio::test]
async fn sweeps_are_recorded() {
    let path = temp_db_path();
    let pool = store::create_db_pool(&path).await.expect("pool");

    store::record_sweep(
        &pool,
        &store::SweepRecord {
            id: Uuid::new_v4().to_string(),
            location: "London".to_string(),
            category: "coffee".to_string(),
            radius_m: 5000,
            candidates_found: 12,
            duplicates_removed: 3,
            no_results: false,
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: chrono::Utc::now().to_rfc3339(),
        },
    )
    .await
    .expect("sweep recorded");

    tokio::fs::remove_file(&path).await.ok();
}
