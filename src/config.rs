use crate::components::feed::FeedSpec;
use crate::components::shifts::{SiteMeta, SummaryPolicy};
use crate::error::{config_error, env_error, ShiftResult};
use chrono::Duration;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Optional file overriding the built-in site table
pub const SITES_FILE: &str = "config/sites.toml";
/// How long fetched feed text is reused
pub const DEFAULT_CACHE_TTL_SECS: i64 = 60;
/// Per-request timeout for feed fetches
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
/// Icon used for sites that are not in the site table
pub const DEFAULT_SITE_ICON: &str = "📅";

/// A site the dashboard knows about, active once its env var holds a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    /// Environment variable holding the site's ICS URL
    pub env_var: String,
}

#[derive(Debug, Deserialize)]
struct SitesFile {
    sites: Vec<SiteDefinition>,
}

/// Built-in site table
pub fn default_sites() -> Vec<SiteDefinition> {
    vec![
        SiteDefinition {
            id: "dublin15".to_string(),
            label: "Dublin 15".to_string(),
            icon: "🇮🇪".to_string(),
            env_var: "WIW_ICS_URL_DUBLIN15".to_string(),
        },
        SiteDefinition {
            id: "espoo".to_string(),
            label: "Espoo".to_string(),
            icon: "🇫🇮".to_string(),
            env_var: "WIW_ICS_URL_ESPOO".to_string(),
        },
    ]
}

/// Where a shift's site comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteAttribution {
    /// The feed the event was read from
    #[default]
    Feed,
    /// The schedule name at the end of the event summary
    Summary,
}

impl SiteAttribution {
    /// Summary mismatch policy that goes with this attribution
    pub fn summary_policy(self) -> SummaryPolicy {
        match self {
            SiteAttribution::Feed => SummaryPolicy::Fallback,
            SiteAttribution::Summary => SummaryPolicy::Reject,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "feed" => Some(SiteAttribution::Feed),
            "summary" => Some(SiteAttribution::Summary),
            _ => None,
        }
    }
}

/// A configured site with its feed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSite {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub url: Url,
}

/// A feed together with the site it is attributed to in feed mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSite {
    pub meta: SiteMeta,
    pub feed: FeedSpec,
}

/// Application configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Sites with a feed URL, in site table order
    pub sites: Vec<ActiveSite>,
    /// Additional feeds from `WIW_ICS_EXTRA_URLS`
    pub extra_feed_urls: Vec<Url>,
    /// Schedule names to surface in summary attribution mode
    pub schedule_allow_list: Vec<String>,
    pub attribution: SiteAttribution,
    /// How long fetched feed text stays fresh
    pub cache_ttl: Duration,
    pub fetch_timeout_secs: u64,
    /// Zone used for displaying shift end times
    pub timezone: Tz,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            extra_feed_urls: Vec::new(),
            schedule_allow_list: Vec::new(),
            attribution: SiteAttribution::default(),
            cache_ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            timezone: Tz::UTC,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment and the optional sites file
    pub fn load() -> ShiftResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let definitions = load_site_definitions(Path::new(SITES_FILE))?;
        Self::from_lookup(&definitions, |key| env::var(key).ok())
    }

    /// Build configuration from a key lookup
    pub fn from_lookup<F>(definitions: &[SiteDefinition], lookup: F) -> ShiftResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut sites = Vec::new();
        for definition in definitions {
            if let Some(raw) = get(&definition.env_var) {
                sites.push(ActiveSite {
                    id: definition.id.clone(),
                    label: definition.label.clone(),
                    icon: definition.icon.clone(),
                    url: parse_feed_url(&definition.env_var, &raw)?,
                });
            }
        }

        let extra_feed_urls = split_list(get("WIW_ICS_EXTRA_URLS").as_deref())
            .iter()
            .map(|raw| parse_feed_url("WIW_ICS_EXTRA_URLS", raw))
            .collect::<ShiftResult<Vec<_>>>()?;

        let schedule_allow_list = split_list(get("WIW_SCHEDULE_ALLOWLIST").as_deref());

        let attribution = match get("SHIFT_SITE_ATTRIBUTION") {
            Some(value) => SiteAttribution::parse(&value)
                .ok_or_else(|| env_error("SHIFT_SITE_ATTRIBUTION"))?,
            None => SiteAttribution::default(),
        };

        let cache_ttl = match parse_number::<u64>(get("FEED_CACHE_TTL_SECS"), "FEED_CACHE_TTL_SECS")? {
            Some(secs) => cache_ttl_from_secs(secs)?,
            None => Duration::seconds(DEFAULT_CACHE_TTL_SECS),
        };
        let fetch_timeout_secs = parse_number(get("FEED_TIMEOUT_SECS"), "FEED_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if fetch_timeout_secs == 0 {
            return Err(config_error("FEED_TIMEOUT_SECS must be greater than zero"));
        }

        let timezone = match get("TIMEZONE") {
            Some(name) => crate::utils::time::parse_timezone(&name)
                .ok_or_else(|| config_error(&format!("Unknown time zone: {}", name)))?,
            None => Tz::UTC,
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = parse_number(get("PORT"), "PORT")?.unwrap_or(DEFAULT_PORT);

        if attribution == SiteAttribution::Feed && !schedule_allow_list.is_empty() {
            warn!("WIW_SCHEDULE_ALLOWLIST only applies when SHIFT_SITE_ATTRIBUTION=summary");
        }

        Ok(Config {
            sites,
            extra_feed_urls,
            schedule_allow_list,
            attribution,
            cache_ttl,
            fetch_timeout_secs,
            timezone,
            bind_addr,
            port,
        })
    }

    /// Whether any feed URL is configured
    pub fn has_feeds(&self) -> bool {
        !self.sites.is_empty() || !self.extra_feed_urls.is_empty()
    }

    /// Every configured feed paired with the site it stands for
    pub fn feed_sites(&self) -> Vec<FeedSite> {
        let configured = self.sites.iter().map(|site| FeedSite {
            meta: SiteMeta {
                id: site.id.clone(),
                label: site.label.clone(),
                icon: site.icon.clone(),
                source: site.id.clone(),
            },
            feed: FeedSpec::new(site.id.clone(), site.url.clone()),
        });

        let extra = self.extra_feed_urls.iter().enumerate().map(|(i, url)| {
            let id = format!("extra-{}", i + 1);
            FeedSite {
                meta: SiteMeta {
                    id: id.clone(),
                    label: url
                        .host_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Extra feed {}", i + 1)),
                    icon: DEFAULT_SITE_ICON.to_string(),
                    source: id.clone(),
                },
                feed: FeedSpec::new(id, url.clone()),
            }
        });

        configured.chain(extra).collect()
    }

    /// Whether a schedule name may be surfaced
    pub fn is_schedule_allowed(&self, schedule: &str) -> bool {
        self.schedule_allow_list.is_empty()
            || self.schedule_allow_list.iter().any(|s| s == schedule)
    }
}

/// Read the site table from `path`.
///
/// A missing file means the built-in table. An unreadable or malformed file
/// is an error.
pub fn load_site_definitions(path: &Path) -> ShiftResult<Vec<SiteDefinition>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No {}, using built-in sites", path.display());
            return Ok(default_sites());
        }
        Err(e) => {
            return Err(config_error(&format!("Failed to read {}: {}", path.display(), e)));
        }
    };

    let file: SitesFile = toml::from_str(&content)?;
    info!("Loaded {} site definitions from {}", file.sites.len(), path.display());
    Ok(file.sites)
}

/// Cache TTL as a duration, rejecting values chrono cannot represent
fn cache_ttl_from_secs(secs: u64) -> ShiftResult<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| config_error(&format!("FEED_CACHE_TTL_SECS is out of range: {}", secs)))
}

/// Split a comma-separated value, dropping blank items
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_feed_url(var: &str, raw: &str) -> ShiftResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| config_error(&format!("Invalid URL in {}: {}", var, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(config_error(&format!(
            "Unsupported URL scheme '{}' in {}",
            other, var
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, var: &str) -> ShiftResult<Option<T>> {
    value
        .map(|v| v.trim().parse::<T>().map_err(|_| env_error(var)))
        .transpose()
}
