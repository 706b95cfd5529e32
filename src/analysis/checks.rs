use chrono::{Datelike, Utc};
use scraper::{ElementRef, Html, Selector};

use super::page::PageProbe;
use super::types::IssueCode;

const PLACEHOLDER_PHRASES: [&str; 3] = ["coming soon", "under construction", "not yet available"];
const FREE_HOSTS: [&str; 5] = [
    ".wixsite.com",
    ".weebly.com",
    ".wordpress.com",
    ".blogspot.com",
    ".webs.com",
];
const SOCIAL_HOSTS: [&str; 3] = ["facebook.com", "instagram.com", "tiktok.com"];

/// Issue codes collected by one battery run, bucketed by severity class.
#[derive(Debug, Default)]
pub struct BatteryReport {
    pub critical: Vec<IssueCode>,
    pub high: Vec<IssueCode>,
    pub medium: Vec<IssueCode>,
    pub low: Vec<IssueCode>,
}

/// Parsed view of a fetched page. Every check is a pure predicate over
/// this context; none depends on another check's outcome.
pub struct CheckContext<'a> {
    doc: Html,
    probe: &'a PageProbe,
    text: String,
    text_lower: String,
    html_lower: String,
    url_lower: String,
}

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

impl<'a> CheckContext<'a> {
    pub fn new(probe: &'a PageProbe) -> Self {
        let doc = Html::parse_document(&probe.body);
        let text = doc
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let text_lower = text.to_lowercase();
        Self {
            doc,
            probe,
            text,
            text_lower,
            html_lower: probe.body.to_lowercase(),
            url_lower: probe.url.to_lowercase(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        PLACEHOLDER_PHRASES
            .iter()
            .any(|phrase| self.text_lower.contains(phrase))
    }

    pub fn run_battery(&self) -> BatteryReport {
        let mut report = BatteryReport::default();
        self.critical_checks(&mut report.critical);
        self.high_checks(&mut report.high);
        self.medium_checks(&mut report.medium);
        self.low_checks(&mut report.low);
        report
    }

    // ----- critical: 10 points each -----

    fn critical_checks(&self, issues: &mut Vec<IssueCode>) {
        if self.is_free_subdomain() {
            issues.push(IssueCode::FreeSubdomain);
        }
        if self.is_social_media_only() {
            issues.push(IssueCode::SocialMediaOnly);
        }
        if self.url_lower.ends_with(".pdf") {
            issues.push(IssueCode::PdfOnlyWebsite);
        }
        if !self.probe.url.starts_with("https://") {
            issues.push(IssueCode::NoSslCertificate);
        }
        if self.domain_expiring_soon() {
            issues.push(IssueCode::DomainExpiringSoon);
        }
        if self.has_broken_core_pages() {
            issues.push(IssueCode::BrokenCorePages);
        }
        if self.has_security_warnings() {
            issues.push(IssueCode::SecurityWarnings);
        }
        if self.first(r#"meta[name="viewport"]"#).is_none() {
            issues.push(IssueCode::NotMobileResponsive);
        }
        if self.probe.load_time_s > 5.0 {
            issues.push(IssueCode::MobileLoadTimeExcessive);
        }
        if !self.text_contains_any(&["phone", "email", "contact", "call", "whatsapp"]) {
            issues.push(IssueCode::NoContactInformation);
        }
        if !self.has_working_contact_form() {
            issues.push(IssueCode::NoWorkingContactForm);
        }
        if !self.text_contains_any(&["hours", "open", "closed", "monday", "friday"]) {
            issues.push(IssueCode::NoBusinessHours);
        }
        if !self.text_contains_any(&["address", "location", "street", "city", "zip", "postal"]) {
            issues.push(IssueCode::NoLocationAddress);
        }
        if !self.has_value_proposition() {
            issues.push(IssueCode::NoValueProposition);
        }
    }

    fn is_free_subdomain(&self) -> bool {
        FREE_HOSTS.iter().any(|host| self.url_lower.contains(host))
    }

    fn is_social_media_only(&self) -> bool {
        SOCIAL_HOSTS.iter().any(|host| self.url_lower.contains(host))
    }

    fn domain_expiring_soon(&self) -> bool {
        // Needs a WHOIS lookup; a single page fetch cannot see expiry.
        false
    }

    fn has_security_warnings(&self) -> bool {
        // Safe-Browsing integration point; not probed here.
        false
    }

    fn has_broken_core_pages(&self) -> bool {
        self.first("body").is_none() || self.text.trim().len() < 100
    }

    fn has_working_contact_form(&self) -> bool {
        let Some(form) = self.first("form") else {
            return false;
        };
        let submit = sel(r#"button[type="submit"], input[type="submit"]"#);
        form.select(&submit).next().is_some()
    }

    fn has_value_proposition(&self) -> bool {
        match self.first("main, article, section") {
            Some(element) => element.text().collect::<String>().len() > 200,
            None => false,
        }
    }

    // ----- high: 5 points each -----

    fn high_checks(&self, issues: &mut Vec<IssueCode>) {
        if self.probe.load_time_s > 3.0 {
            issues.push(IssueCode::SlowDesktopLoad);
        }
        if self.has_unoptimized_images() {
            issues.push(IssueCode::UnoptimizedImages);
        }
        if self.probe.server_response_ms > 500 {
            issues.push(IssueCode::SlowServerResponse);
        }
        if !self.has_clear_navigation() {
            issues.push(IssueCode::ConfusingNavigation);
        }
        if !self.is_readable() {
            issues.push(IssueCode::PoorReadability);
        }
        if self.first(r#"link[rel="stylesheet"]"#).is_none() {
            issues.push(IssueCode::UnprofessionalDesign);
        }
        if self.has_inconsistent_branding() {
            issues.push(IssueCode::InconsistentBranding);
        }
        if self.html_lower.contains("table") && self.html_lower.contains("layout") {
            issues.push(IssueCode::OutdatedCode);
        }
        if self.has_javascript_errors() {
            issues.push(IssueCode::JavascriptErrors);
        }
        if self.has_broken_internal_links() {
            issues.push(IssueCode::BrokenInternalLinks);
        }
        if !self.has_good_title() {
            issues.push(IssueCode::MissingTitleTags);
        }
        if self.first(r#"meta[name="description"]"#).is_none() {
            issues.push(IssueCode::MissingMetaDescriptions);
        }
        if self.first("h1").is_none() {
            issues.push(IssueCode::PoorHeadingStructure);
        }
        if !self.probe.has_sitemap {
            issues.push(IssueCode::NoSitemap);
        }
        if !self.probe.has_robots_txt {
            issues.push(IssueCode::NoRobotsTxt);
        }
    }

    fn has_unoptimized_images(&self) -> bool {
        self.select("img")
            .into_iter()
            .take(5)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
            .any(|src| {
                let src = src.to_lowercase();
                !["webp", "optimized", "compressed"]
                    .iter()
                    .any(|hint| src.contains(hint))
            })
    }

    fn has_clear_navigation(&self) -> bool {
        match self.first("nav, header") {
            Some(nav) => nav.select(&sel("a")).count() >= 3,
            None => false,
        }
    }

    fn is_readable(&self) -> bool {
        self.first("h1").is_some() && self.first("p").is_some()
    }

    fn has_inconsistent_branding(&self) -> bool {
        // Needs cross-page comparison; a single fetch cannot tell.
        false
    }

    fn has_javascript_errors(&self) -> bool {
        // Needs a browser runtime to observe.
        false
    }

    fn has_broken_internal_links(&self) -> bool {
        // Needs a full link sweep; not probed in a single fetch.
        false
    }

    fn has_good_title(&self) -> bool {
        match self.first("title") {
            Some(title) => title.text().collect::<String>().len() > 10,
            None => false,
        }
    }

    // ----- medium: 3 points each -----

    fn medium_checks(&self, issues: &mut Vec<IssueCode>) {
        if !self.probe.http2 {
            issues.push(IssueCode::OldHttpVersion);
        }
        if !self.headers_contain_any(&["cloudflare", "akamai", "cloudfront", "cdn"]) {
            issues.push(IssueCode::NoCdn);
        }
        if !self.html_contains_any(&["loading=\"lazy\"", "data-src", "lazyload"]) {
            issues.push(IssueCode::NoLazyLoading);
        }
        if !self.html_contains_any(&["react", "vue", "angular", "bootstrap", "tailwind"]) {
            issues.push(IssueCode::OutdatedFrameworks);
        }
        if !self.html_lower.contains(&Utc::now().year().to_string()) {
            issues.push(IssueCode::OutdatedContent);
        }
        if self.select("img").len() < 3 {
            issues.push(IssueCode::StockPhotosOnly);
        }
        if self.first("video, iframe").is_none() {
            issues.push(IssueCode::NoVideoContent);
        }
        if !self.text_contains_any(&["testimonial", "review"]) {
            issues.push(IssueCode::NoTestimonials);
        }
        if !self.text_contains_any(&["portfolio", "case study", "our work"]) {
            issues.push(IssueCode::NoPortfolio);
        }
        if !self.text_contains_any(&["faq", "frequently asked"]) {
            issues.push(IssueCode::NoFaq);
        }
        if self.first(r#"script[type="application/ld+json"]"#).is_none() {
            issues.push(IssueCode::NoStructuredData);
        }
        if !self.has_sufficient_alt_text() {
            issues.push(IssueCode::MissingImageAltText);
        }
        if !self.text_contains_any(&[
            "buy",
            "call",
            "contact",
            "learn more",
            "get started",
            "sign up",
        ]) {
            issues.push(IssueCode::NoClearCta);
        }
        if !self.html_contains_any(&["drift", "intercom", "zendesk", "livechat"]) {
            issues.push(IssueCode::NoLiveChat);
        }
        if self.first(r#"form input[type="email"]"#).is_none() {
            issues.push(IssueCode::NoNewsletterSignup);
        }
        if !self.text_contains_any(&["trusted by", "used by", "badge", "certification", "award"]) {
            issues.push(IssueCode::NoSocialProof);
        }
        if !self.text_contains_any(&["$", "€", "£", "price", "plan", "cost"]) {
            issues.push(IssueCode::NoClearPricing);
        }
    }

    /// At least 70% of images must carry alt text; image-free pages pass.
    fn has_sufficient_alt_text(&self) -> bool {
        let images = self.select("img");
        if images.is_empty() {
            return true;
        }
        let with_alt = images
            .iter()
            .filter(|img| img.value().attr("alt").is_some_and(|alt| !alt.is_empty()))
            .count();
        with_alt as f64 >= images.len() as f64 * 0.7
    }

    // ----- low: 1 point each -----

    fn low_checks(&self, issues: &mut Vec<IssueCode>) {
        if self.first(r#"link[rel="manifest"]"#).is_none() {
            issues.push(IssueCode::NoPwa);
        }
        if !self.html_contains_any(&["prefers-color-scheme", "dark-mode"]) {
            issues.push(IssueCode::NoDarkMode);
        }
        if !self.html_contains_any(&["@keyframes", "animation"]) {
            issues.push(IssueCode::NoAnimations);
        }
        if !self.html_contains_any(&["aria-", "role="]) {
            issues.push(IssueCode::BasicAccessibility);
        }
        if !self.html_contains_any(&["hotjar", "mouseflow", "heatmap"]) {
            issues.push(IssueCode::NoHeatmaps);
        }
        if !self.html_contains_any(&["optimizely", "vwo", "convert"]) {
            issues.push(IssueCode::NoAbTesting);
        }
        if !self.text_contains_any(&["blog", "article", "post"]) {
            issues.push(IssueCode::NoBlog);
        }
        if !self.html_contains_any(&["facebook", "twitter", "instagram", "linkedin"]) {
            issues.push(IssueCode::NoSocialIntegration);
        }
        if !self.html_contains_any(&["api", "webhook"]) {
            issues.push(IssueCode::NoApiIntegration);
        }
    }

    // ----- shared helpers -----

    fn first(&self, selector: &str) -> Option<ElementRef<'_>> {
        self.doc.select(&sel(selector)).next()
    }

    fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        self.doc.select(&sel(selector)).collect()
    }

    fn text_contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text_lower.contains(n))
    }

    fn html_contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.html_lower.contains(n))
    }

    fn headers_contain_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.probe.headers_text.contains(n))
    }
}
