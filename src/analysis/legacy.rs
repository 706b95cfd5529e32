use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::info;

use super::page::{FetchOutcome, PageProbe, SiteFetcher};
use crate::config::AnalysisConfig;

/// The single-pass site analysis that predates the capability battery.
/// Kept as its own scoring path; the lead evaluator accepts either shape.
#[derive(Debug, Clone, Serialize)]
pub struct LegacySnapshot {
    pub url: String,
    pub exists: bool,
    pub status_code: Option<u16>,
    pub score: u8,
    pub has_ssl: bool,
    pub mobile_friendly: bool,
    pub load_time_s: f64,
    pub tech_stack: Vec<String>,
    pub outdated_tech: Vec<String>,
    pub issues: Vec<String>,
    pub needs_redesign: bool,
    pub has_contact_form: bool,
    pub analyzed_at: DateTime<Utc>,
}

impl LegacySnapshot {
    fn empty(url: String) -> Self {
        Self {
            url,
            exists: false,
            status_code: None,
            score: 0,
            has_ssl: false,
            mobile_friendly: false,
            load_time_s: 0.0,
            tech_stack: Vec::new(),
            outdated_tech: Vec::new(),
            issues: Vec::new(),
            needs_redesign: false,
            has_contact_form: false,
            analyzed_at: Utc::now(),
        }
    }
}

pub struct LegacyAnalyzer {
    fetcher: SiteFetcher,
}

impl LegacyAnalyzer {
    pub fn new(cfg: &AnalysisConfig) -> crate::models::Result<Self> {
        Ok(Self {
            fetcher: SiteFetcher::new(cfg)?,
        })
    }

    pub async fn analyze(&self, raw_url: &str) -> LegacySnapshot {
        let mut snapshot = match self.fetcher.fetch(raw_url).await {
            FetchOutcome::InvalidUrl => {
                let mut s = LegacySnapshot::empty(raw_url.to_string());
                s.issues.push("Invalid URL".to_string());
                s
            }
            FetchOutcome::Unreachable(reason) => {
                let mut s = LegacySnapshot::empty(raw_url.to_string());
                s.issues.push(format!("Connection error: {}", reason));
                s
            }
            FetchOutcome::HttpError(code) => {
                let mut s = LegacySnapshot::empty(raw_url.to_string());
                s.status_code = Some(code);
                s.issues
                    .push(format!("Website returned status code: {}", code));
                s
            }
            FetchOutcome::Unparseable(reason) => {
                let mut s = LegacySnapshot::empty(raw_url.to_string());
                s.status_code = Some(200);
                s.issues.push(format!("Analysis error: {}", reason));
                s
            }
            FetchOutcome::Fetched(probe) => inspect_probe(&probe),
        };
        snapshot.analyzed_at = Utc::now();
        info!(
            "legacy analysis of {}: score {}, {} issues",
            snapshot.url,
            snapshot.score,
            snapshot.issues.len()
        );
        snapshot
    }
}

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// Synchronous single-pass inspection of a fetched page.
pub fn inspect_probe(probe: &PageProbe) -> LegacySnapshot {
    let doc = Html::parse_document(&probe.body);
    let html_lower = probe.body.to_lowercase();
    let style_text = doc
        .select(&sel("style"))
        .map(|style| style.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    let mut snapshot = LegacySnapshot::empty(probe.url.clone());
    snapshot.exists = true;
    snapshot.status_code = Some(probe.status);
    snapshot.load_time_s = probe.load_time_s;
    snapshot.has_ssl = probe.url.starts_with("https://");
    if !snapshot.has_ssl {
        snapshot.issues.push("Website does not use HTTPS/SSL".to_string());
    }

    snapshot.mobile_friendly = check_mobile_friendly(&doc, &style_text);
    if !snapshot.mobile_friendly {
        snapshot
            .issues
            .push("Website may not be mobile responsive".to_string());
    }

    detect_tech_stack(&html_lower, &probe.server_header, &mut snapshot);

    if probe.body.len() > 5 * 1024 * 1024 {
        snapshot
            .issues
            .push("Large page size may affect loading speed".to_string());
    }
    if probe.load_time_s > 3.0 {
        snapshot
            .issues
            .push(format!("Slow load time: {:.2}s", probe.load_time_s));
    }

    snapshot.has_contact_form = check_contact_form(&doc);
    if !snapshot.has_contact_form {
        snapshot
            .issues
            .push("No obvious contact form found".to_string());
    }

    let modern_indicators = count_modern_indicators(&doc, &style_text);
    if (modern_indicators as f64 / 7.0) * 100.0 < 50.0 {
        snapshot
            .issues
            .push("Website design appears outdated".to_string());
    }

    check_seo(&doc, &mut snapshot.issues);
    check_accessibility(&doc, &mut snapshot.issues);

    snapshot.score = calculate_score(&snapshot);
    snapshot.needs_redesign = snapshot.score < 50;
    snapshot
}

fn check_mobile_friendly(doc: &Html, style_text: &str) -> bool {
    let has_viewport = doc.select(&sel(r#"meta[name="viewport"]"#)).next().is_some();
    let css_lower = style_text.to_lowercase();
    let has_responsive_css = ["@media", "max-width", "min-width", "responsive"]
        .iter()
        .any(|marker| css_lower.contains(marker));
    let has_mobile_elements = doc
        .select(&sel(
            r#"[class*="mobile"], [class*="phone"], [id*="mobile"]"#,
        ))
        .next()
        .is_some();
    has_viewport || has_responsive_css || has_mobile_elements
}

fn detect_tech_stack(html_lower: &str, server_header: &str, snapshot: &mut LegacySnapshot) {
    let mut stack = Vec::new();
    if html_lower.contains("wp-content") || html_lower.contains("wordpress") {
        stack.push("WordPress");
    }
    if html_lower.contains("/wp-json/") {
        stack.push("WordPress REST API");
    }
    if html_lower.contains("react") {
        stack.push("React");
    }
    if html_lower.contains("vue") {
        stack.push("Vue.js");
    }
    if html_lower.contains("angular") {
        stack.push("Angular");
    }
    if html_lower.contains("bootstrap") {
        stack.push("Bootstrap");
    }
    if html_lower.contains("tailwind") {
        stack.push("Tailwind CSS");
    }
    if server_header.contains("apache") {
        stack.push("Apache");
    } else if server_header.contains("nginx") {
        stack.push("Nginx");
    }
    snapshot.tech_stack = stack.into_iter().map(String::from).collect();

    if html_lower.contains("flash") {
        snapshot.outdated_tech.push("Adobe Flash (deprecated)".to_string());
    }
    let jquery_1x = Regex::new(r"jquery[/.-]1\.\d").expect("static regex");
    if jquery_1x.is_match(html_lower) {
        snapshot.outdated_tech.push("jQuery 1.x (outdated)".to_string());
    }
    if !snapshot.outdated_tech.is_empty() {
        snapshot.issues.push(format!(
            "Outdated technologies detected: {}",
            snapshot.outdated_tech.join(", ")
        ));
    }
}

fn check_contact_form(doc: &Html) -> bool {
    [
        r#"form[action*="contact"]"#,
        r#"form[id*="contact"]"#,
        r#"form[class*="contact"]"#,
        r#"a[href*="contact"]"#,
        r#"a[href*="mailto:"]"#,
    ]
    .iter()
    .any(|selector| doc.select(&sel(selector)).next().is_some())
}

fn count_modern_indicators(doc: &Html, style_text: &str) -> usize {
    let mut count = 0;
    if doc
        .select(&sel(r#".hero, .banner, .jumbotron, [class*="hero"]"#))
        .next()
        .is_some()
    {
        count += 1;
    }
    if doc
        .select(&sel(r#".hamburger, .menu-toggle, [class*="nav-toggle"]"#))
        .next()
        .is_some()
    {
        count += 1;
    }
    if style_text.contains("display: grid") || style_text.contains("display: flex") {
        count += 1;
    }
    if [
        "font-family: -apple-system",
        "font-family: \"Segoe UI\"",
        "font-family: Roboto",
        "font-family: \"Open Sans\"",
    ]
    .iter()
    .any(|font| style_text.contains(font))
    {
        count += 1;
    }
    if doc
        .select(&sel(r#".btn, .button, [class*="cta"], [class*="action"]"#))
        .next()
        .is_some()
    {
        count += 1;
    }
    if doc
        .select(&sel(
            r#".social, [class*="social"], [href*="facebook.com"], [href*="twitter.com"]"#,
        ))
        .next()
        .is_some()
    {
        count += 1;
    }
    if doc
        .select(&sel(
            r#".testimonial, .carousel, .slider, [class*="testimonial"]"#,
        ))
        .next()
        .is_some()
    {
        count += 1;
    }
    count
}

fn check_seo(doc: &Html, issues: &mut Vec<String>) {
    let meta_ok = doc
        .select(&sel(r#"meta[name="description"]"#))
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .is_some_and(|content| !content.trim().is_empty());
    if !meta_ok {
        issues.push("Missing meta description".to_string());
    }

    let title_ok = doc
        .select(&sel("title"))
        .next()
        .map(|title| !title.text().collect::<String>().trim().is_empty())
        .unwrap_or(false);
    if !title_ok {
        issues.push("Missing or empty title tag".to_string());
    }

    let h1_count = doc.select(&sel("h1")).count();
    if h1_count == 0 {
        issues.push("Missing H1 heading".to_string());
    } else if h1_count > 1 {
        issues.push("Multiple H1 headings (should have only one)".to_string());
    }
}

fn check_accessibility(doc: &Html, issues: &mut Vec<String>) {
    let images: Vec<_> = doc.select(&sel("img")).collect();
    if images.is_empty() {
        return;
    }
    let without_alt = images
        .iter()
        .filter(|img| {
            img.value()
                .attr("alt")
                .map(|alt| alt.is_empty())
                .unwrap_or(true)
        })
        .count();
    let missing_pct = (without_alt as f64 / images.len() as f64) * 100.0;
    if missing_pct > 50.0 {
        issues.push(format!(
            "Many images missing alt text ({}%)",
            missing_pct as u32
        ));
    }
}

fn calculate_score(snapshot: &LegacySnapshot) -> u8 {
    let mut score: i32 = 100;
    if !snapshot.has_ssl {
        score -= 25;
    }
    if !snapshot.mobile_friendly {
        score -= 20;
    }
    if snapshot.load_time_s > 5.0 {
        score -= 15;
    } else if snapshot.load_time_s > 3.0 {
        score -= 10;
    }
    score -= (snapshot.issues.len() as i32 * 5).min(30);

    let modern_count = snapshot
        .tech_stack
        .iter()
        .filter(|tech| matches!(tech.as_str(), "React" | "Vue.js" | "Angular" | "Tailwind CSS"))
        .count() as i32;
    score += (modern_count * 5).min(15);

    score.clamp(0, 100) as u8
}
