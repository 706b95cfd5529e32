use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, Result as SqliteResult};
use tracing::{debug, info};

use crate::analysis::{AnalysisResult, LegacySnapshot, Tier};
use crate::errors::StoreError;
use crate::leads::LeadScore;
use crate::models::BusinessCandidate;

const BUSY_RETRIES: u32 = 5;

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "memory")?;
        conn.busy_timeout(Duration::from_millis(250))?;
        init_database(&conn)?;
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(conn)
    }
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(db_path: &str) -> crate::models::Result<DbPool> {
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);
    info!("sqlite connection pool created: {}", db_path);
    Ok(pool)
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    create_businesses_table(conn)?;
    create_sweeps_table(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_businesses_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS businesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identity_key TEXT UNIQUE NOT NULL,
            external_id TEXT,
            source TEXT,
            name TEXT NOT NULL,
            address TEXT,
            locality TEXT,
            region TEXT,
            postcode TEXT,
            country TEXT,
            latitude REAL,
            longitude REAL,
            phone TEXT,
            email TEXT,
            website TEXT,
            category TEXT,
            category_id TEXT,

            -- legacy single-pass analysis
            website_score INTEGER DEFAULT 0,
            mobile_friendly INTEGER DEFAULT 0,
            has_ssl INTEGER DEFAULT 0,
            load_time REAL DEFAULT 0,
            tech_stack TEXT DEFAULT '[]',
            issues TEXT DEFAULT '[]',
            last_analyzed TEXT,

            -- capability analysis
            analysis_json TEXT DEFAULT '{}',
            has_website INTEGER,
            website_status TEXT,
            tier INTEGER DEFAULT 4,
            tier_label TEXT,
            fatal_count INTEGER DEFAULT 0,
            critical_count INTEGER DEFAULT 0,
            high_count INTEGER DEFAULT 0,
            medium_count INTEGER DEFAULT 0,
            low_count INTEGER DEFAULT 0,
            comprehensive_score INTEGER DEFAULT 0,

            -- lead scoring
            lead_score INTEGER DEFAULT 0,
            priority TEXT DEFAULT 'low',
            needs_redesign INTEGER DEFAULT 0,
            has_contact_form INTEGER DEFAULT 0,

            -- status tracking
            is_active INTEGER DEFAULT 1,
            is_contacted INTEGER DEFAULT 0,
            contact_date TEXT,

            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_checked TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_sweeps_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS sweeps (
            id TEXT PRIMARY KEY,
            location TEXT NOT NULL,
            category TEXT NOT NULL,
            radius_m INTEGER NOT NULL,
            candidates_found INTEGER NOT NULL,
            duplicates_removed INTEGER NOT NULL,
            no_results INTEGER NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> SqliteResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_businesses_identity ON businesses(identity_key)",
        "CREATE INDEX IF NOT EXISTS idx_businesses_tier ON businesses(tier)",
        "CREATE INDEX IF NOT EXISTS idx_businesses_lead_score ON businesses(lead_score DESC)",
        "CREATE INDEX IF NOT EXISTS idx_businesses_website_score ON businesses(website_score)",
        "CREATE INDEX IF NOT EXISTS idx_businesses_category ON businesses(category)",
        "CREATE INDEX IF NOT EXISTS idx_sweeps_location ON sweeps(location)",
    ];
    for index_sql in indexes {
        conn.execute(index_sql, [])?;
    }
    Ok(())
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::DatabaseBusy
                || failure.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// Retry a write that lost a race with another connection. Conflicts are
/// surfaced only once the retry budget is exhausted, never dropped.
async fn write_with_retry<F>(mut op: F, context: &str) -> Result<usize, StoreError>
where
    F: FnMut() -> Result<usize, rusqlite::Error>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(changed) => return Ok(changed),
            Err(e) if is_busy(&e) => {
                attempt += 1;
                if attempt > BUSY_RETRIES {
                    return Err(StoreError::Conflict(format!(
                        "{}: database still busy after {} attempts",
                        context, BUSY_RETRIES
                    )));
                }
                let backoff_ms = 20 * u64::from(attempt) + fastrand::u64(..25);
                debug!("{}: busy, retrying in {}ms", context, backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn get_conn(pool: &DbPool) -> Result<mobc::Connection<SqliteManager>, StoreError> {
    pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))
}

/// A persisted business row, as the listings return it.
#[derive(Debug, Clone)]
pub struct StoredBusiness {
    pub identity_key: String,
    pub name: String,
    pub address: String,
    pub locality: String,
    pub website: Option<String>,
    pub phone: String,
    pub email: String,
    pub category: String,
    pub source: String,
    pub tier: i64,
    pub website_status: Option<String>,
    pub comprehensive_score: i64,
    pub website_score: i64,
    pub lead_score: i64,
    pub priority: String,
    pub is_contacted: bool,
    pub last_analyzed: Option<String>,
}

const BUSINESS_COLUMNS: &str = "identity_key, name, address, locality, website, phone, email, \
     category, source, tier, website_status, comprehensive_score, website_score, lead_score, \
     priority, is_contacted, last_analyzed";

fn row_to_business(row: &rusqlite::Row<'_>) -> SqliteResult<StoredBusiness> {
    let website: Option<String> = row.get(4)?;
    Ok(StoredBusiness {
        identity_key: row.get(0)?,
        name: row.get(1)?,
        address: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        locality: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        website: website.filter(|w| !w.is_empty()),
        phone: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        source: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        tier: row.get(9)?,
        website_status: row.get(10)?,
        comprehensive_score: row.get(11)?,
        website_score: row.get(12)?,
        lead_score: row.get(13)?,
        priority: row.get(14)?,
        is_contacted: row.get::<_, i64>(15)? != 0,
        last_analyzed: row.get(16)?,
    })
}

/// Insert-or-update keyed on the identity hash. Mutable contact fields are
/// refreshed, empty values never overwrite known ones. Returns true when
/// the row is new.
pub async fn upsert_candidate(
    pool: &DbPool,
    candidate: &BusinessCandidate,
) -> Result<bool, StoreError> {
    let conn = get_conn(pool).await?;
    let key = candidate.identity_key();
    let existed: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM businesses WHERE identity_key = ?1)",
        [&key],
        |row| row.get(0),
    )?;

    let now = Utc::now().to_rfc3339();
    let website = candidate.website.clone().unwrap_or_default();
    write_with_retry(
        || {
            conn.execute(
                r#"
                INSERT INTO businesses (
                    identity_key, external_id, source, name, address, locality, region,
                    postcode, country, latitude, longitude, phone, email, website,
                    category, category_id, created_at, updated_at, last_checked
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
                ON CONFLICT (identity_key) DO UPDATE SET
                    external_id = COALESCE(NULLIF(excluded.external_id, ''), external_id),
                    source = excluded.source,
                    locality = COALESCE(NULLIF(excluded.locality, ''), locality),
                    region = COALESCE(NULLIF(excluded.region, ''), region),
                    postcode = COALESCE(NULLIF(excluded.postcode, ''), postcode),
                    country = COALESCE(NULLIF(excluded.country, ''), country),
                    latitude = COALESCE(excluded.latitude, latitude),
                    longitude = COALESCE(excluded.longitude, longitude),
                    phone = COALESCE(NULLIF(excluded.phone, ''), phone),
                    email = COALESCE(NULLIF(excluded.email, ''), email),
                    website = COALESCE(NULLIF(excluded.website, ''), website),
                    category = COALESCE(NULLIF(excluded.category, ''), category),
                    category_id = COALESCE(NULLIF(excluded.category_id, ''), category_id),
                    updated_at = excluded.updated_at,
                    last_checked = excluded.last_checked
                "#,
                params![
                    key,
                    candidate.external_id,
                    candidate.source.as_str(),
                    candidate.name,
                    candidate.address,
                    candidate.locality,
                    candidate.region,
                    candidate.postcode,
                    candidate.country,
                    candidate.latitude,
                    candidate.longitude,
                    candidate.phone,
                    candidate.email,
                    website,
                    candidate.category,
                    candidate.category_id,
                    now,
                    now,
                    now,
                ],
            )
        },
        "upsert_candidate",
    )
    .await?;

    debug!(
        "upserted '{}' ({})",
        candidate.name,
        if existed { "updated" } else { "new" }
    );
    Ok(!existed)
}

pub async fn get_by_identity(
    pool: &DbPool,
    identity_key: &str,
) -> Result<Option<StoredBusiness>, StoreError> {
    let conn = get_conn(pool).await?;
    let sql = format!(
        "SELECT {} FROM businesses WHERE identity_key = ?1",
        BUSINESS_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([identity_key], row_to_business)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Outreach listing: active, not yet contacted, best leads first.
pub async fn list_by_tier(
    pool: &DbPool,
    tier: Tier,
    limit: usize,
) -> Result<Vec<StoredBusiness>, StoreError> {
    let conn = get_conn(pool).await?;
    let sql = format!(
        "SELECT {} FROM businesses
         WHERE tier = ?1 AND is_active = 1 AND is_contacted = 0
         ORDER BY lead_score DESC LIMIT ?2",
        BUSINESS_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tier.number(), limit as i64], row_to_business)?;
    let mut businesses = Vec::new();
    for row in rows {
        businesses.push(row?);
    }
    Ok(businesses)
}

pub async fn list_by_min_score(
    pool: &DbPool,
    min_score: u8,
    limit: usize,
) -> Result<Vec<StoredBusiness>, StoreError> {
    let conn = get_conn(pool).await?;
    let sql = format!(
        "SELECT {} FROM businesses
         WHERE website_score >= ?1 AND is_active = 1 AND is_contacted = 0
         ORDER BY website_score DESC LIMIT ?2",
        BUSINESS_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![i64::from(min_score), limit as i64], row_to_business)?;
    let mut businesses = Vec::new();
    for row in rows {
        businesses.push(row?);
    }
    Ok(businesses)
}

/// Records with a website that have never been analyzed.
pub async fn list_pending_analysis(
    pool: &DbPool,
    limit: usize,
) -> Result<Vec<StoredBusiness>, StoreError> {
    let conn = get_conn(pool).await?;
    let sql = format!(
        "SELECT {} FROM businesses
         WHERE website IS NOT NULL AND website != '' AND last_analyzed IS NULL
         AND is_active = 1
         ORDER BY created_at ASC LIMIT ?1",
        BUSINESS_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit as i64], row_to_business)?;
    let mut businesses = Vec::new();
    for row in rows {
        businesses.push(row?);
    }
    Ok(businesses)
}

/// Replace the record's capability analysis wholesale; no partial merge.
pub async fn update_analysis(
    pool: &DbPool,
    identity_key: &str,
    analysis: &AnalysisResult,
    lead: &LeadScore,
) -> Result<(), StoreError> {
    let conn = get_conn(pool).await?;
    let analysis_json = serde_json::to_string(analysis)
        .map_err(|e| StoreError::Conflict(format!("analysis serialization failed: {}", e)))?;
    let now = Utc::now().to_rfc3339();

    write_with_retry(
        || {
            conn.execute(
                r#"
                UPDATE businesses SET
                    analysis_json = ?1,
                    has_website = ?2,
                    website_status = ?3,
                    tier = ?4,
                    tier_label = ?5,
                    fatal_count = ?6,
                    critical_count = ?7,
                    high_count = ?8,
                    medium_count = ?9,
                    low_count = ?10,
                    comprehensive_score = ?11,
                    lead_score = ?12,
                    priority = ?13,
                    last_analyzed = ?14,
                    updated_at = ?14
                WHERE identity_key = ?15
                "#,
                params![
                    analysis_json,
                    analysis.status.has_website(),
                    analysis.status.as_str(),
                    analysis.tier.number(),
                    analysis.tier.label(),
                    analysis.fatal_count() as i64,
                    analysis.critical_count() as i64,
                    analysis.high.len() as i64,
                    analysis.medium.len() as i64,
                    analysis.low.len() as i64,
                    i64::from(analysis.total_score),
                    i64::from(lead.score),
                    lead.priority.as_str(),
                    now,
                    identity_key,
                ],
            )
        },
        "update_analysis",
    )
    .await?;
    Ok(())
}

/// Replace the record's legacy analysis fields.
pub async fn update_legacy_analysis(
    pool: &DbPool,
    identity_key: &str,
    snapshot: &LegacySnapshot,
    lead: &LeadScore,
) -> Result<(), StoreError> {
    let conn = get_conn(pool).await?;
    let tech_stack = serde_json::to_string(&snapshot.tech_stack)
        .map_err(|e| StoreError::Conflict(format!("tech stack serialization failed: {}", e)))?;
    let issues = serde_json::to_string(&snapshot.issues)
        .map_err(|e| StoreError::Conflict(format!("issues serialization failed: {}", e)))?;
    let now = Utc::now().to_rfc3339();

    write_with_retry(
        || {
            conn.execute(
                r#"
                UPDATE businesses SET
                    website_score = ?1,
                    mobile_friendly = ?2,
                    has_ssl = ?3,
                    load_time = ?4,
                    tech_stack = ?5,
                    issues = ?6,
                    lead_score = ?7,
                    priority = ?8,
                    needs_redesign = ?9,
                    has_contact_form = ?10,
                    last_analyzed = ?11,
                    updated_at = ?11
                WHERE identity_key = ?12
                "#,
                params![
                    i64::from(snapshot.score),
                    snapshot.mobile_friendly,
                    snapshot.has_ssl,
                    snapshot.load_time_s,
                    tech_stack,
                    issues,
                    i64::from(lead.score),
                    lead.priority.as_str(),
                    snapshot.needs_redesign,
                    snapshot.has_contact_form,
                    now,
                    identity_key,
                ],
            )
        },
        "update_legacy_analysis",
    )
    .await?;
    Ok(())
}

pub async fn mark_contacted(pool: &DbPool, identity_key: &str) -> Result<(), StoreError> {
    let conn = get_conn(pool).await?;
    let now = Utc::now().to_rfc3339();
    write_with_retry(
        || {
            conn.execute(
                "UPDATE businesses SET is_contacted = 1, contact_date = ?1, updated_at = ?1
                 WHERE identity_key = ?2",
                params![now, identity_key],
            )
        },
        "mark_contacted",
    )
    .await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SweepRecord {
    pub id: String,
    pub location: String,
    pub category: String,
    pub radius_m: u32,
    pub candidates_found: usize,
    pub duplicates_removed: usize,
    pub no_results: bool,
    pub started_at: String,
    pub finished_at: String,
}

pub async fn record_sweep(pool: &DbPool, sweep: &SweepRecord) -> Result<(), StoreError> {
    let conn = get_conn(pool).await?;
    write_with_retry(
        || {
            conn.execute(
                r#"
                INSERT INTO sweeps (
                    id, location, category, radius_m, candidates_found,
                    duplicates_removed, no_results, started_at, finished_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    sweep.id,
                    sweep.location,
                    sweep.category,
                    sweep.radius_m,
                    sweep.candidates_found as i64,
                    sweep.duplicates_removed as i64,
                    sweep.no_results,
                    sweep.started_at,
                    sweep.finished_at,
                ],
            )
        },
        "record_sweep",
    )
    .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct StoreStats {
    pub total_businesses: i64,
    pub with_websites: i64,
    pub analyzed: i64,
    pub comprehensively_analyzed: i64,
    pub tier_counts: [i64; 4],
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}

pub async fn get_statistics(pool: &DbPool) -> Result<StoreStats, StoreError> {
    let conn = get_conn(pool).await?;
    let count = |sql: &str| -> Result<i64, rusqlite::Error> {
        conn.query_row(sql, [], |row| row.get(0))
    };

    let mut stats = StoreStats {
        total_businesses: count("SELECT COUNT(*) FROM businesses")?,
        with_websites: count(
            "SELECT COUNT(*) FROM businesses WHERE website IS NOT NULL AND website != ''",
        )?,
        analyzed: count("SELECT COUNT(*) FROM businesses WHERE last_analyzed IS NOT NULL")?,
        comprehensively_analyzed: count(
            "SELECT COUNT(*) FROM businesses WHERE analysis_json != '{}'",
        )?,
        high_priority: count("SELECT COUNT(*) FROM businesses WHERE lead_score >= 70")?,
        medium_priority: count(
            "SELECT COUNT(*) FROM businesses WHERE lead_score BETWEEN 40 AND 69",
        )?,
        low_priority: count("SELECT COUNT(*) FROM businesses WHERE lead_score < 40")?,
        ..Default::default()
    };
    for tier in 1..=4i64 {
        stats.tier_counts[(tier - 1) as usize] = conn.query_row(
            "SELECT COUNT(*) FROM businesses WHERE tier = ?1",
            [tier],
            |row| row.get(0),
        )?;
    }
    Ok(stats)
}
