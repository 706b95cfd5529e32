use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Severity class of a capability check, with its fixed point weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn points(&self) -> u32 {
        match self {
            Severity::Critical => 10,
            Severity::High => 5,
            Severity::Medium => 3,
            Severity::Low => 1,
        }
    }
}

/// Priority tier for sales outreach. Tier1 is the highest priority (worst
/// web presence), Tier4 the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "TIER_1",
            Tier::Tier2 => "TIER_2",
            Tier::Tier3 => "TIER_3",
            Tier::Tier4 => "TIER_4",
        }
    }

    pub fn number(&self) -> i64 {
        match self {
            Tier::Tier1 => 1,
            Tier::Tier2 => 2,
            Tier::Tier3 => 3,
            Tier::Tier4 => 4,
        }
    }

    pub fn from_number(n: i64) -> Option<Tier> {
        match n {
            1 => Some(Tier::Tier1),
            2 => Some(Tier::Tier2),
            3 => Some(Tier::Tier3),
            4 => Some(Tier::Tier4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteStatus {
    Unknown,
    InvalidUrl,
    Unreachable,
    HttpError(u16),
    Accessible,
}

impl WebsiteStatus {
    pub fn as_str(&self) -> String {
        match self {
            WebsiteStatus::Unknown => "unknown".to_string(),
            WebsiteStatus::InvalidUrl => "invalid_url".to_string(),
            WebsiteStatus::Unreachable => "unreachable".to_string(),
            WebsiteStatus::HttpError(code) => format!("http_error_{}", code),
            WebsiteStatus::Accessible => "accessible".to_string(),
        }
    }

    /// False only when no page could be fetched at all.
    pub fn has_website(&self) -> bool {
        !matches!(
            self,
            WebsiteStatus::Unknown | WebsiteStatus::InvalidUrl | WebsiteStatus::Unreachable
        )
    }
}

impl Serialize for WebsiteStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

/// Fixed vocabulary of issue codes: five short-circuit failure codes plus
/// the 55-check battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    // Short-circuit failures ("no functioning website").
    InvalidUrl,
    NoWebsiteOrBroken,
    HttpError(u16),
    ParseError,
    PlaceholderPage,

    // Critical battery checks.
    FreeSubdomain,
    SocialMediaOnly,
    PdfOnlyWebsite,
    NoSslCertificate,
    DomainExpiringSoon,
    BrokenCorePages,
    SecurityWarnings,
    NotMobileResponsive,
    MobileLoadTimeExcessive,
    NoContactInformation,
    NoWorkingContactForm,
    NoBusinessHours,
    NoLocationAddress,
    NoValueProposition,

    // High battery checks.
    SlowDesktopLoad,
    UnoptimizedImages,
    SlowServerResponse,
    ConfusingNavigation,
    PoorReadability,
    UnprofessionalDesign,
    InconsistentBranding,
    OutdatedCode,
    JavascriptErrors,
    BrokenInternalLinks,
    MissingTitleTags,
    MissingMetaDescriptions,
    PoorHeadingStructure,
    NoSitemap,
    NoRobotsTxt,

    // Medium battery checks.
    OldHttpVersion,
    NoCdn,
    NoLazyLoading,
    OutdatedFrameworks,
    OutdatedContent,
    StockPhotosOnly,
    NoVideoContent,
    NoTestimonials,
    NoPortfolio,
    NoFaq,
    NoStructuredData,
    MissingImageAltText,
    NoClearCta,
    NoLiveChat,
    NoNewsletterSignup,
    NoSocialProof,
    NoClearPricing,

    // Low battery checks.
    NoPwa,
    NoDarkMode,
    NoAnimations,
    BasicAccessibility,
    NoHeatmaps,
    NoAbTesting,
    NoBlog,
    NoSocialIntegration,
    NoApiIntegration,
}

impl IssueCode {
    /// Short-circuit failure codes skip the battery and force Tier1/score 0.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IssueCode::InvalidUrl
                | IssueCode::NoWebsiteOrBroken
                | IssueCode::HttpError(_)
                | IssueCode::ParseError
                | IssueCode::PlaceholderPage
        )
    }

    pub fn severity(&self) -> Severity {
        use IssueCode::*;
        match self {
            InvalidUrl | NoWebsiteOrBroken | HttpError(_) | ParseError | PlaceholderPage
            | FreeSubdomain | SocialMediaOnly | PdfOnlyWebsite | NoSslCertificate
            | DomainExpiringSoon | BrokenCorePages | SecurityWarnings | NotMobileResponsive
            | MobileLoadTimeExcessive | NoContactInformation | NoWorkingContactForm
            | NoBusinessHours | NoLocationAddress | NoValueProposition => Severity::Critical,

            SlowDesktopLoad | UnoptimizedImages | SlowServerResponse | ConfusingNavigation
            | PoorReadability | UnprofessionalDesign | InconsistentBranding | OutdatedCode
            | JavascriptErrors | BrokenInternalLinks | MissingTitleTags
            | MissingMetaDescriptions | PoorHeadingStructure | NoSitemap | NoRobotsTxt => {
                Severity::High
            }

            OldHttpVersion | NoCdn | NoLazyLoading | OutdatedFrameworks | OutdatedContent
            | StockPhotosOnly | NoVideoContent | NoTestimonials | NoPortfolio | NoFaq
            | NoStructuredData | MissingImageAltText | NoClearCta | NoLiveChat
            | NoNewsletterSignup | NoSocialProof | NoClearPricing => Severity::Medium,

            NoPwa | NoDarkMode | NoAnimations | BasicAccessibility | NoHeatmaps | NoAbTesting
            | NoBlog | NoSocialIntegration | NoApiIntegration => Severity::Low,
        }
    }

    /// Battery points. Short-circuit codes carry no battery weight; they
    /// zero the score outright instead.
    pub fn points(&self) -> u32 {
        if self.is_fatal() {
            0
        } else {
            self.severity().points()
        }
    }

    pub fn tag(&self) -> String {
        use IssueCode::*;
        match self {
            InvalidUrl => "INVALID_URL".to_string(),
            NoWebsiteOrBroken => "NO_WEBSITE_OR_BROKEN".to_string(),
            HttpError(code) => format!("HTTP_ERROR_{}", code),
            ParseError => "PARSE_ERROR".to_string(),
            PlaceholderPage => "PLACEHOLDER_PAGE".to_string(),
            FreeSubdomain => "FREE_SUBDOMAIN".to_string(),
            SocialMediaOnly => "SOCIAL_MEDIA_ONLY".to_string(),
            PdfOnlyWebsite => "PDF_ONLY_WEBSITE".to_string(),
            NoSslCertificate => "NO_SSL_CERTIFICATE".to_string(),
            DomainExpiringSoon => "DOMAIN_EXPIRING_SOON".to_string(),
            BrokenCorePages => "BROKEN_CORE_PAGES".to_string(),
            SecurityWarnings => "SECURITY_WARNINGS".to_string(),
            NotMobileResponsive => "NOT_MOBILE_RESPONSIVE".to_string(),
            MobileLoadTimeExcessive => "MOBILE_LOAD_TIME_EXCESSIVE".to_string(),
            NoContactInformation => "NO_CONTACT_INFORMATION".to_string(),
            NoWorkingContactForm => "NO_WORKING_CONTACT_FORM".to_string(),
            NoBusinessHours => "NO_BUSINESS_HOURS".to_string(),
            NoLocationAddress => "NO_LOCATION_ADDRESS".to_string(),
            NoValueProposition => "NO_VALUE_PROPOSITION".to_string(),
            SlowDesktopLoad => "SLOW_DESKTOP_LOAD".to_string(),
            UnoptimizedImages => "UNOPTIMIZED_IMAGES".to_string(),
            SlowServerResponse => "SLOW_SERVER_RESPONSE".to_string(),
            ConfusingNavigation => "CONFUSING_NAVIGATION".to_string(),
            PoorReadability => "POOR_READABILITY".to_string(),
            UnprofessionalDesign => "UNPROFESSIONAL_DESIGN".to_string(),
            InconsistentBranding => "INCONSISTENT_BRANDING".to_string(),
            OutdatedCode => "OUTDATED_CODE".to_string(),
            JavascriptErrors => "JAVASCRIPT_ERRORS".to_string(),
            BrokenInternalLinks => "BROKEN_INTERNAL_LINKS".to_string(),
            MissingTitleTags => "MISSING_TITLE_TAGS".to_string(),
            MissingMetaDescriptions => "MISSING_META_DESCRIPTIONS".to_string(),
            PoorHeadingStructure => "POOR_HEADING_STRUCTURE".to_string(),
            NoSitemap => "NO_SITEMAP".to_string(),
            NoRobotsTxt => "NO_ROBOTS_TXT".to_string(),
            OldHttpVersion => "OLD_HTTP_VERSION".to_string(),
            NoCdn => "NO_CDN".to_string(),
            NoLazyLoading => "NO_LAZY_LOADING".to_string(),
            OutdatedFrameworks => "OUTDATED_FRAMEWORKS".to_string(),
            OutdatedContent => "OUTDATED_CONTENT".to_string(),
            StockPhotosOnly => "STOCK_PHOTOS_ONLY".to_string(),
            NoVideoContent => "NO_VIDEO_CONTENT".to_string(),
            NoTestimonials => "NO_TESTIMONIALS".to_string(),
            NoPortfolio => "NO_PORTFOLIO".to_string(),
            NoFaq => "NO_FAQ".to_string(),
            NoStructuredData => "NO_STRUCTURED_DATA".to_string(),
            MissingImageAltText => "MISSING_IMAGE_ALT_TEXT".to_string(),
            NoClearCta => "NO_CLEAR_CTA".to_string(),
            NoLiveChat => "NO_LIVE_CHAT".to_string(),
            NoNewsletterSignup => "NO_NEWSLETTER_SIGNUP".to_string(),
            NoSocialProof => "NO_SOCIAL_PROOF".to_string(),
            NoClearPricing => "NO_CLEAR_PRICING".to_string(),
            NoPwa => "NO_PWA".to_string(),
            NoDarkMode => "NO_DARK_MODE".to_string(),
            NoAnimations => "NO_ANIMATIONS".to_string(),
            BasicAccessibility => "BASIC_ACCESSIBILITY".to_string(),
            NoHeatmaps => "NO_HEATMAPS".to_string(),
            NoAbTesting => "NO_AB_TESTING".to_string(),
            NoBlog => "NO_BLOG".to_string(),
            NoSocialIntegration => "NO_SOCIAL_INTEGRATION".to_string(),
            NoApiIntegration => "NO_API_INTEGRATION".to_string(),
        }
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// The complete battery roster; short-circuit codes are not part of it.
pub const BATTERY: [IssueCode; 55] = [
    IssueCode::FreeSubdomain,
    IssueCode::SocialMediaOnly,
    IssueCode::PdfOnlyWebsite,
    IssueCode::NoSslCertificate,
    IssueCode::DomainExpiringSoon,
    IssueCode::BrokenCorePages,
    IssueCode::SecurityWarnings,
    IssueCode::NotMobileResponsive,
    IssueCode::MobileLoadTimeExcessive,
    IssueCode::NoContactInformation,
    IssueCode::NoWorkingContactForm,
    IssueCode::NoBusinessHours,
    IssueCode::NoLocationAddress,
    IssueCode::NoValueProposition,
    IssueCode::SlowDesktopLoad,
    IssueCode::UnoptimizedImages,
    IssueCode::SlowServerResponse,
    IssueCode::ConfusingNavigation,
    IssueCode::PoorReadability,
    IssueCode::UnprofessionalDesign,
    IssueCode::InconsistentBranding,
    IssueCode::OutdatedCode,
    IssueCode::JavascriptErrors,
    IssueCode::BrokenInternalLinks,
    IssueCode::MissingTitleTags,
    IssueCode::MissingMetaDescriptions,
    IssueCode::PoorHeadingStructure,
    IssueCode::NoSitemap,
    IssueCode::NoRobotsTxt,
    IssueCode::OldHttpVersion,
    IssueCode::NoCdn,
    IssueCode::NoLazyLoading,
    IssueCode::OutdatedFrameworks,
    IssueCode::OutdatedContent,
    IssueCode::StockPhotosOnly,
    IssueCode::NoVideoContent,
    IssueCode::NoTestimonials,
    IssueCode::NoPortfolio,
    IssueCode::NoFaq,
    IssueCode::NoStructuredData,
    IssueCode::MissingImageAltText,
    IssueCode::NoClearCta,
    IssueCode::NoLiveChat,
    IssueCode::NoNewsletterSignup,
    IssueCode::NoSocialProof,
    IssueCode::NoClearPricing,
    IssueCode::NoPwa,
    IssueCode::NoDarkMode,
    IssueCode::NoAnimations,
    IssueCode::BasicAccessibility,
    IssueCode::NoHeatmaps,
    IssueCode::NoAbTesting,
    IssueCode::NoBlog,
    IssueCode::NoSocialIntegration,
    IssueCode::NoApiIntegration,
];

/// Sum of all battery weights if every check failed.
pub fn max_possible_points() -> u32 {
    BATTERY.iter().map(|code| code.severity().points()).sum()
}

/// Output of one scoring pass over a website. Replaced wholesale on every
/// re-analysis; tier and score are always recomputable from the four issue
/// lists alone.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub status: WebsiteStatus,
    pub critical: Vec<IssueCode>,
    pub high: Vec<IssueCode>,
    pub medium: Vec<IssueCode>,
    pub low: Vec<IssueCode>,
    pub critical_points: u32,
    pub high_points: u32,
    pub medium_points: u32,
    pub low_points: u32,
    pub total_score: u8,
    pub tier: Tier,
}

impl AnalysisResult {
    pub fn from_issues(
        url: String,
        status: WebsiteStatus,
        critical: Vec<IssueCode>,
        high: Vec<IssueCode>,
        medium: Vec<IssueCode>,
        low: Vec<IssueCode>,
    ) -> Self {
        let sum = |codes: &[IssueCode]| codes.iter().map(IssueCode::points).sum();
        let total_score = derive_score(&critical, &high, &medium, &low);
        let tier = derive_tier(&critical, &high, &medium, &low);
        Self {
            url,
            analyzed_at: Utc::now(),
            status,
            critical_points: sum(&critical),
            high_points: sum(&high),
            medium_points: sum(&medium),
            low_points: sum(&low),
            critical,
            high,
            medium,
            low,
            total_score,
            tier,
        }
    }

    /// A "no functioning website" result: one fatal code, empty battery.
    pub fn short_circuit(url: String, status: WebsiteStatus, code: IssueCode) -> Self {
        Self::from_issues(url, status, vec![code], Vec::new(), Vec::new(), Vec::new())
    }

    pub fn fatal_count(&self) -> usize {
        self.critical.iter().filter(|c| c.is_fatal()).count()
    }

    /// Critical battery issues, excluding short-circuit failures.
    pub fn critical_count(&self) -> usize {
        self.critical.iter().filter(|c| !c.is_fatal()).count()
    }
}

/// Normalized 0-100 score, a pure function of the four issue lists. Any
/// short-circuit code zeroes the score.
pub fn derive_score(
    critical: &[IssueCode],
    high: &[IssueCode],
    medium: &[IssueCode],
    low: &[IssueCode],
) -> u8 {
    if critical.iter().any(|c| c.is_fatal()) {
        return 0;
    }
    let issue_points: u32 = critical
        .iter()
        .chain(high)
        .chain(medium)
        .chain(low)
        .map(IssueCode::points)
        .sum();
    let ratio = f64::from(issue_points) / f64::from(max_possible_points());
    let score = 100.0 - (100.0 * ratio).round();
    score.clamp(0.0, 100.0) as u8
}

/// Ordered first-match tier assignment. Boundaries are counts of issues,
/// never the continuous score.
pub fn derive_tier(
    critical: &[IssueCode],
    high: &[IssueCode],
    medium: &[IssueCode],
    _low: &[IssueCode],
) -> Tier {
    let fatal = critical.iter().filter(|c| c.is_fatal()).count();
    let critical_count = critical.len() - fatal;
    if fatal > 0 {
        return Tier::Tier1;
    }
    if critical_count >= 3 {
        return Tier::Tier1;
    }
    if critical_count >= 1 || high.len() >= 5 {
        return Tier::Tier2;
    }
    if high.len() >= 3 || medium.len() >= 8 {
        return Tier::Tier3;
    }
    Tier::Tier4
}
