/// Tier-assignment law, short-circuit conditions, and end-to-end scoring
/// scenarios over synthetic pages.
use chrono::{Datelike, Utc};
use lead_prospector::analysis::{
    derive_score, derive_tier, evaluate_probe, max_possible_points, AnalysisResult, IssueCode,
    PageProbe, ScoringEngine, Tier, WebsiteStatus,
};
use lead_prospector::config::Config;
use lead_prospector::leads::{lead_score_comprehensive, Priority};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn probe(url: &str, body: String) -> PageProbe {
    PageProbe {
        url: url.to_string(),
        status: 200,
        http2: true,
        headers_text: "server: nginx\nx-served-by: cloudflare".to_string(),
        server_header: "nginx".to_string(),
        server_response_ms: 300,
        load_time_s: 1.0,
        body,
        has_sitemap: true,
        has_robots_txt: true,
    }
}

/// A page that passes every battery check except the ones a test turns off.
fn healthy_page_html() -> String {
    let year = Utc::now().year();
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Blue Cup Cafe - Specialty Coffee Roasters</title>
  <meta name="description" content="Small-batch coffee roasted daily.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="stylesheet" href="/css/site.css">
  <link rel="manifest" href="/manifest.json">
  <script type="application/ld+json">{{"@type": "CafeOrCoffeeShop"}}</script>
  <script src="/js/react.min.js"></script>
  <script src="/js/intercom-widget.js"></script>
  <script src="/js/hotjar-tracking.js"></script>
  <script src="/js/optimizely-edge.js"></script>
  <script src="/api/client.js"></script>
  <style>
    @media (prefers-color-scheme: dark) {{ body {{ background: #111; }} }}
    .hero {{ animation: fade 1s; }}
  </style>
</head>
<body>
  <nav aria-label="Main">
    <a href="/">Home</a>
    <a href="/menu">Menu</a>
    <a href="/contact">Contact</a>
  </nav>
  <h1>Blue Cup Cafe</h1>
  <main>
    <p>We roast specialty coffee in small batches every morning and serve it
    in our cafe on Main Street. Call us or email hello@bluecup.example to
    book the back room for events, workshops and private cuppings. Our team
    has poured coffee for this city for over a decade and we publish a blog
    post about every new single-origin we bring in.</p>
    <p>Open Monday to Friday, 7am to 5pm. Address: 12 Main Street.</p>
    <p>Espresso $3. See every price on our plan page. Trusted by the best
    local bakeries. Read a testimonial or review from our regulars, browse
    our work in the portfolio section, or check the FAQ.</p>
    <img src="/img/bar.webp" alt="Espresso bar" loading="lazy">
    <img src="/img/roaster.webp" alt="Roaster">
    <img src="/img/cups.webp" alt="Cups">
    <iframe src="https://video.example/tour"></iframe>
  </main>
  <form action="/newsletter">
    <input type="email" name="email">
    <button type="submit">Sign up</button>
  </form>
  <footer>
    <a href="https://facebook.com/bluecup">Facebook</a>
    <p>&copy; {year} Blue Cup Cafe</p>
  </footer>
</body>
</html>"##
    )
}

fn strip_line(html: &str, needle: &str) -> String {
    html.lines()
        .filter(|line| !line.contains(needle))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn healthy_page_over_https_is_tier4() {
    let result = evaluate_probe(&probe("https://bluecup.example/", healthy_page_html()));
    assert_eq!(result.critical, Vec::<IssueCode>::new());
    assert_eq!(result.high, Vec::<IssueCode>::new());
    assert_eq!(result.medium, Vec::<IssueCode>::new());
    assert_eq!(result.low, Vec::<IssueCode>::new());
    assert_eq!(result.tier, Tier::Tier4);
    assert_eq!(result.total_score, 100);
    assert_eq!(result.status, WebsiteStatus::Accessible);
}

#[test]
fn no_tls_no_viewport_and_slow_load_is_tier2() {
    // No TLS, no viewport meta tag, 4.2s load; everything else passes.
    let html = strip_line(&healthy_page_html(), "viewport");
    let mut page = probe("http://bluecup.example/", html);
    page.load_time_s = 4.2;

    let result = evaluate_probe(&page);
    assert_eq!(
        result.critical,
        vec![IssueCode::NoSslCertificate, IssueCode::NotMobileResponsive]
    );
    assert_eq!(result.high, vec![IssueCode::SlowDesktopLoad]);
    assert_eq!(result.medium, Vec::<IssueCode>::new());
    assert_eq!(result.low, Vec::<IssueCode>::new());
    // >=1 critical issue: emergency-fix tier.
    assert_eq!(result.tier, Tier::Tier2);
    // 2 * 10 + 5 = 25 points against the 275 ceiling.
    assert_eq!(result.total_score, 91);
}

#[test]
fn placeholder_page_short_circuits_to_tier1() {
    let page = probe(
        "https://new.example/",
        "<html><body><p>Coming soon! Our site is under construction.</p></body></html>"
            .to_string(),
    );
    let result = evaluate_probe(&page);
    assert_eq!(result.critical, vec![IssueCode::PlaceholderPage]);
    assert!(result.high.is_empty() && result.medium.is_empty() && result.low.is_empty());
    assert_eq!(result.tier, Tier::Tier1);
    assert_eq!(result.total_score, 0);
}

#[test]
fn unreachable_site_yields_single_failure_code() {
    let result = AnalysisResult::short_circuit(
        "https://gone.example/".to_string(),
        WebsiteStatus::Unreachable,
        IssueCode::NoWebsiteOrBroken,
    );
    assert_eq!(result.status, WebsiteStatus::Unreachable);
    assert_eq!(result.tier, Tier::Tier1);
    assert_eq!(result.total_score, 0);
    assert_eq!(result.critical, vec![IssueCode::NoWebsiteOrBroken]);
    assert!(result.high.is_empty() && result.medium.is_empty() && result.low.is_empty());

    // Highest possible lead score bucket: 100 - 50 = 50, high priority via Tier1.
    let lead = lead_score_comprehensive(&result);
    assert_eq!(lead.score, 50);
    assert_eq!(lead.priority, Priority::High);
}

#[test]
fn battery_is_deterministic_for_an_unchanged_page() {
    let page = probe("http://bluecup.example/", healthy_page_html());
    let first = evaluate_probe(&page);
    let second = evaluate_probe(&page);
    assert_eq!(first.critical, second.critical);
    assert_eq!(first.high, second.high);
    assert_eq!(first.medium, second.medium);
    assert_eq!(first.low, second.low);
    assert_eq!(first.total_score, second.total_score);
    assert_eq!(first.tier, second.tier);
}

#[test]
fn tier_law_first_match_wins() {
    let crit = |n: usize| vec![IssueCode::NoSslCertificate; n];
    let high = |n: usize| vec![IssueCode::MissingTitleTags; n];
    let med = |n: usize| vec![IssueCode::NoCdn; n];

    // Three criticals: Tier1 regardless of everything else.
    assert_eq!(derive_tier(&crit(3), &[], &[], &[]), Tier::Tier1);
    // One critical beats five highs in rule order; both mean Tier2.
    assert_eq!(derive_tier(&crit(1), &[], &[], &[]), Tier::Tier2);
    assert_eq!(derive_tier(&[], &high(5), &[], &[]), Tier::Tier2);
    // Three highs or eight mediums: Tier3.
    assert_eq!(derive_tier(&[], &high(3), &[], &[]), Tier::Tier3);
    assert_eq!(derive_tier(&[], &[], &med(8), &[]), Tier::Tier3);
    // Below every boundary: Tier4.
    assert_eq!(derive_tier(&[], &high(2), &med(7), &[]), Tier::Tier4);
}

#[test]
fn score_is_clamped_and_anchored() {
    assert_eq!(derive_score(&[], &[], &[], &[]), 100);
    assert_eq!(max_possible_points(), 275);
    // A fatal code zeroes the score no matter what else is present.
    assert_eq!(
        derive_score(&[IssueCode::InvalidUrl], &[], &[], &[]),
        0
    );
}

#[tokio::test]
async fn http_error_from_a_live_server_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = ScoringEngine::new(&Config::default().analysis).expect("engine");
    let result = engine.score_website(&server.uri()).await;
    assert_eq!(result.status, WebsiteStatus::HttpError(404));
    assert_eq!(result.critical, vec![IssueCode::HttpError(404)]);
    assert_eq!(result.tier, Tier::Tier1);
    assert_eq!(result.total_score, 0);
}

#[tokio::test]
async fn invalid_url_short_circuits_without_a_network_call() {
    let engine = ScoringEngine::new(&Config::default().analysis).expect("engine");
    let result = engine.score_website("   ").await;
    assert_eq!(result.status, WebsiteStatus::InvalidUrl);
    assert_eq!(result.critical, vec![IssueCode::InvalidUrl]);
    assert_eq!(result.tier, Tier::Tier1);
}
