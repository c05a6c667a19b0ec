use super::classify::RoleView;
use super::models::{ShiftEntry, SiteMeta, SiteSchedule};
use super::summary::{parse_summary, ParsedSummary, SummaryPolicy};
use crate::components::feed::FeedHandle;
use crate::components::ics::{extract_events, CalendarEvent};
use crate::config::{Config, FeedSite, SiteAttribution, DEFAULT_SITE_ICON};
use crate::error::{config_error, ShiftResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Raw text of a feed fetched for one render
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub site: FeedSite,
    pub text: String,
}

/// Builds per-site schedules from the configured feeds
#[derive(Clone)]
pub struct ShiftAggregator {
    config: Arc<Config>,
    feeds: FeedHandle,
}

impl ShiftAggregator {
    pub fn new(config: Arc<Config>, feeds: FeedHandle) -> Self {
        Self { config, feeds }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch every feed and group the shifts active at `now` by site.
    ///
    /// Feeds are fetched one after another; the first failure aborts the
    /// whole cycle.
    pub async fn active_shifts(&self, now: DateTime<Utc>) -> ShiftResult<Vec<SiteSchedule>> {
        if !self.config.has_feeds() {
            return Err(config_error("No ICS URLs configured"));
        }

        let mut fetched = Vec::new();
        for site in self.config.feed_sites() {
            let text = self.feeds.fetch(site.feed.clone(), now).await?;
            fetched.push(FetchedFeed { site, text });
        }

        aggregate(&fetched, &self.config, now)
    }

    /// Drop all cached feed text so the next render refetches
    pub async fn refresh(&self) -> ShiftResult<()> {
        info!("Manual refresh requested, clearing feed cache");
        self.feeds.invalidate_all().await
    }
}

/// Group the shifts active at `now` by site, using the configured attribution
pub fn aggregate(
    feeds: &[FetchedFeed],
    config: &Config,
    now: DateTime<Utc>,
) -> ShiftResult<Vec<SiteSchedule>> {
    let schedules = match config.attribution {
        SiteAttribution::Feed => aggregate_by_feed(feeds, config, now)?,
        SiteAttribution::Summary => aggregate_by_summary(feeds, config, now)?,
    };

    info!(
        "Aggregated {} active shifts across {} sites",
        schedules.iter().map(SiteSchedule::total).sum::<usize>(),
        schedules.len()
    );
    Ok(schedules)
}

fn aggregate_by_feed(
    feeds: &[FetchedFeed],
    config: &Config,
    now: DateTime<Utc>,
) -> ShiftResult<Vec<SiteSchedule>> {
    let policy = config.attribution.summary_policy();
    let mut schedules = Vec::with_capacity(feeds.len());

    for fetched in feeds {
        let events = extract_events(&fetched.text)?;
        let entries: Vec<ShiftEntry> = events
            .iter()
            .filter_map(|event| active_entry(event, policy, now))
            .collect();

        debug!("Site {}: {} active shifts", fetched.site.meta.id, entries.len());
        schedules.push(SiteSchedule::from_entries(
            fetched.site.meta.clone(),
            RoleView::Standard,
            entries,
        ));
    }

    Ok(schedules)
}

fn aggregate_by_summary(
    feeds: &[FetchedFeed],
    config: &Config,
    now: DateTime<Utc>,
) -> ShiftResult<Vec<SiteSchedule>> {
    let policy = config.attribution.summary_policy();

    // In allow-list or first-seen order
    let mut sites: Vec<SiteSlot> = Vec::new();
    for name in &config.schedule_allow_list {
        let site = schedule_site(name, "", &sites, config);
        sites.push((name.clone(), site, Vec::new()));
    }

    for fetched in feeds {
        for event in extract_events(&fetched.text)? {
            let Some(parsed) = event
                .summary
                .as_deref()
                .and_then(|s| parse_summary(s, policy))
            else {
                continue;
            };
            let Some(schedule) = parsed.schedule.as_deref() else {
                continue;
            };
            if !config.is_schedule_allowed(schedule) {
                continue;
            }

            let index = match sites.iter().position(|(name, _, _)| name == schedule) {
                Some(index) => index,
                None => {
                    let site = schedule_site(schedule, &fetched.site.feed.id, &sites, config);
                    sites.push((schedule.to_string(), site, Vec::new()));
                    sites.len() - 1
                }
            };

            // Allow-listed sites get the source of the first feed mentioning them
            let (_, site, entries) = &mut sites[index];
            if site.source.is_empty() {
                site.source = fetched.site.feed.id.clone();
            }

            if let Some(entry) = entry_for(&event, parsed, now) {
                entries.push(entry);
            }
        }
    }

    Ok(sites
        .into_iter()
        .map(|(_, site, entries)| SiteSchedule::from_entries(site, RoleView::Standard, entries))
        .collect())
}

/// Schedule name, its site and the site's active entries
type SiteSlot = (String, SiteMeta, Vec<ShiftEntry>);

/// Site metadata for a schedule name found in summaries
fn schedule_site(schedule: &str, source: &str, taken: &[SiteSlot], config: &Config) -> SiteMeta {
    let icon = config
        .sites
        .iter()
        .find(|site| schedule.starts_with(&site.label))
        .map(|site| site.icon.clone())
        .unwrap_or_else(|| DEFAULT_SITE_ICON.to_string());

    SiteMeta {
        id: unique_site_id(schedule, taken),
        label: schedule.to_string(),
        icon,
        source: source.to_string(),
    }
}

/// Parse an event into an entry if it is active at `now`
fn active_entry(event: &CalendarEvent, policy: SummaryPolicy, now: DateTime<Utc>) -> Option<ShiftEntry> {
    let parsed = parse_summary(event.summary.as_deref().unwrap_or_default(), policy)?;
    entry_for(event, parsed, now)
}

fn entry_for(event: &CalendarEvent, parsed: ParsedSummary, now: DateTime<Utc>) -> Option<ShiftEntry> {
    let (start, end) = event.span()?;
    // Both bounds inclusive
    if now < start || now > end || parsed.name.is_empty() {
        return None;
    }

    Some(ShiftEntry {
        bucket: RoleView::Standard.classify(&parsed.role),
        name: parsed.name,
        role: parsed.role,
        start,
        end,
    })
}

/// Site id for a schedule: its slug, `schedule-N` when the slug is empty,
/// with `-2`, `-3`, ... appended until no earlier site uses it
fn unique_site_id(schedule: &str, taken: &[SiteSlot]) -> String {
    let base = match slugify(schedule) {
        slug if slug.is_empty() => format!("schedule-{}", taken.len() + 1),
        slug => slug,
    };
    let is_taken = |id: &str| taken.iter().any(|(_, site, _)| site.id == id);

    let mut id = base.clone();
    let mut suffix = 2;
    while is_taken(&id) {
        id = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    id
}

/// Lowercase id made of alphanumerics separated by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Reclassify already aggregated schedules into the MC-focused buckets
pub fn regroup_for_mc_view(sites: &[SiteSchedule]) -> Vec<SiteSchedule> {
    sites
        .iter()
        .map(|schedule| {
            SiteSchedule::from_entries(
                schedule.site.clone(),
                RoleView::McFocused,
                schedule.all_entries().cloned().collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::feed::FeedSpec;
    use crate::components::shifts::{select_site, Bucket};
    use chrono::TimeZone;
    use url::Url;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 1, h, m, 0).unwrap()
    }

    fn feed(id: &str, text: &str) -> FetchedFeed {
        FetchedFeed {
            site: FeedSite {
                meta: SiteMeta {
                    id: id.to_string(),
                    label: id.to_string(),
                    icon: String::new(),
                    source: id.to_string(),
                },
                feed: FeedSpec::new(id, Url::parse("https://example.com/feed.ics").unwrap()),
            },
            text: text.to_string(),
        }
    }

    fn vevent(summary: &str, start: &str, end: &str) -> String {
        format!(
            "BEGIN:VEVENT\nDTSTART:{}\nDTEND:{}\nSUMMARY:{}\nEND:VEVENT\n",
            start, end, summary
        )
    }

    #[test]
    fn test_active_window_is_inclusive() {
        let text = vevent("Ann (Shift as Pilot)", "20251201T080000Z", "20251201T160000Z");
        let feeds = [feed("d15", &text)];
        let config = Config::default();

        for now in [at(8, 0), at(12, 0), at(16, 0)] {
            let result = aggregate(&feeds, &config, now).unwrap();
            assert_eq!(result[0].entries(Bucket::Pilot).len(), 1, "at {}", now);
        }
        for now in [at(7, 59), at(16, 1)] {
            let result = aggregate(&feeds, &config, now).unwrap();
            assert!(result[0].is_empty(), "at {}", now);
        }
    }

    #[test]
    fn test_events_without_times_are_skipped() {
        let text = "BEGIN:VEVENT\nSUMMARY:Ann (Shift as Pilot)\nDTSTART:20251201T080000Z\nEND:VEVENT\n";
        let result = aggregate(&[feed("d15", text)], &Config::default(), at(9, 0)).unwrap();
        assert!(result[0].is_empty());
    }

    #[test]
    fn test_sorted_by_name_and_stable() {
        let text = [
            vevent("zed (Shift as Pilot)", "20251201T080000Z", "20251201T160000Z"),
            vevent("Bob (Shift as Pilot (first))", "20251201T080000Z", "20251201T160000Z"),
            vevent("Amy (Shift as Pilot)", "20251201T080000Z", "20251201T160000Z"),
            vevent("Bob (Shift as Pilot (second))", "20251201T080000Z", "20251201T160000Z"),
        ]
        .concat();
        let result = aggregate(&[feed("d15", &text)], &Config::default(), at(9, 0)).unwrap();
        let pilots = result[0].entries(Bucket::Pilot);

        let names: Vec<&str> = pilots.iter().map(|e| e.name.as_str()).collect();
        // Ordinal order puts uppercase before lowercase
        assert_eq!(names, vec!["Amy", "Bob", "Bob", "zed"]);
        assert_eq!(pilots[1].role, "Pilot (first)");
        assert_eq!(pilots[2].role, "Pilot (second)");
    }

    #[test]
    fn test_empty_site_keeps_all_buckets() {
        let result = aggregate(&[feed("espoo", "")], &Config::default(), at(9, 0)).unwrap();
        assert_eq!(result.len(), 1);
        let buckets: Vec<Bucket> = result[0].buckets.iter().map(|g| g.bucket).collect();
        assert_eq!(buckets, vec![Bucket::Mc, Bucket::Pilot, Bucket::Other]);
        assert!(result[0].is_empty());
    }

    #[test]
    fn test_feed_mode_keeps_unparseable_summaries() {
        let text = vevent("Team briefing", "20251201T080000Z", "20251201T160000Z");
        let result = aggregate(&[feed("d15", &text)], &Config::default(), at(9, 0)).unwrap();
        let other = result[0].entries(Bucket::Other);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].name, "Team briefing");
        assert_eq!(other[0].role, "Unknown");
    }

    #[test]
    fn test_malformed_datetime_fails_cycle() {
        let text = vevent("Ann (Shift as Pilot)", "2025-12-01", "20251201T160000Z");
        assert!(aggregate(&[feed("d15", &text)], &Config::default(), at(9, 0)).is_err());
    }

    #[test]
    fn test_summary_mode_discovers_sites() {
        let text = [
            vevent(
                "Jane Doe (Shift as Mission Control (MC) at HQ at Dublin 15 Operations Schedule)",
                "20251201T080000Z",
                "20251201T160000Z",
            ),
            vevent(
                "Matti (Shift as Loader at Espoo Schedule)",
                "20251130T080000Z",
                "20251130T160000Z",
            ),
            vevent("No schedule (Shift as Pilot)", "20251201T080000Z", "20251201T160000Z"),
            vevent("Meeting", "20251201T080000Z", "20251201T160000Z"),
        ]
        .concat();
        let config = Config {
            attribution: SiteAttribution::Summary,
            ..Config::default()
        };

        let result = aggregate(&[feed("all", &text)], &config, at(9, 0)).unwrap();
        let labels: Vec<&str> = result.iter().map(|s| s.site.label.as_str()).collect();
        assert_eq!(labels, vec!["Dublin 15 Operations Schedule", "Espoo Schedule"]);

        assert_eq!(result[0].site.id, "dublin-15-operations-schedule");
        assert_eq!(result[0].site.source, "all");
        let mc = result[0].entries(Bucket::Mc);
        assert_eq!(mc.len(), 1);
        assert_eq!(mc[0].name, "Jane Doe");
        assert_eq!(mc[0].role, "Mission Control (MC)");

        // Espoo had no active shift but still appears
        assert!(result[1].is_empty());
        assert_eq!(result[1].buckets.len(), 3);
    }

    #[test]
    fn test_summary_mode_allow_list() {
        let text = [
            vevent("A (Shift as Pilot at Keep)", "20251201T080000Z", "20251201T160000Z"),
            vevent("B (Shift as Pilot at Drop)", "20251201T080000Z", "20251201T160000Z"),
        ]
        .concat();
        let config = Config {
            attribution: SiteAttribution::Summary,
            schedule_allow_list: vec!["Missing".to_string(), "Keep".to_string()],
            ..Config::default()
        };

        let result = aggregate(&[feed("all", &text)], &config, at(9, 0)).unwrap();
        let labels: Vec<&str> = result.iter().map(|s| s.site.label.as_str()).collect();
        assert_eq!(labels, vec!["Missing", "Keep"]);
        assert!(result[0].is_empty());
        assert_eq!(result[1].entries(Bucket::Pilot)[0].name, "A");
    }

    #[test]
    fn test_regroup_for_mc_view() {
        let text = [
            vevent("Fay (Shift as Flight Operator (FO))", "20251201T080000Z", "20251201T160000Z"),
            vevent("Lou (Shift as Warehouse Loader)", "20251201T080000Z", "20251201T160000Z"),
            vevent("Col (Shift as Collector)", "20251201T080000Z", "20251201T160000Z"),
            vevent("Mia (Shift as Mission Control (MC))", "20251201T080000Z", "20251201T160000Z"),
            vevent("Abe (Shift as Loader)", "20251201T080000Z", "20251201T160000Z"),
        ]
        .concat();
        let standard = aggregate(&[feed("d15", &text)], &Config::default(), at(9, 0)).unwrap();
        assert_eq!(standard[0].entries(Bucket::Other).len(), 3);

        let regrouped = regroup_for_mc_view(&standard);
        let site = &regrouped[0];
        assert_eq!(site.view, RoleView::McFocused);
        assert_eq!(site.total(), standard[0].total());
        assert_eq!(site.entries(Bucket::FlightOperator)[0].name, "Fay");
        let loaders: Vec<&str> = site.entries(Bucket::Loader).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(loaders, vec!["Abe", "Lou"]);
        assert_eq!(site.entries(Bucket::Collector)[0].name, "Col");
        assert_eq!(site.entries(Bucket::Other)[0].name, "Mia");
        assert!(site.entries(Bucket::Mc).is_empty());
        assert_eq!(site.entries(Bucket::Other)[0].bucket, Bucket::Other);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dublin 15 Operations Schedule"), "dublin-15-operations-schedule");
        assert_eq!(slugify("  Espoo / HQ  "), "espoo-hq");
        assert_eq!(slugify("Åland"), "åland");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_summary_mode_site_ids_are_unique() {
        let text = [
            vevent("A (Shift as Pilot at Dublin 15)", "20251201T080000Z", "20251201T160000Z"),
            vevent("B (Shift as Pilot at Dublin-15)", "20251201T080000Z", "20251201T160000Z"),
            vevent("C (Shift as Pilot at Åland)", "20251201T080000Z", "20251201T160000Z"),
            vevent("D (Shift as Pilot at ***)", "20251201T080000Z", "20251201T160000Z"),
            vevent("E (Shift as Pilot at Dublin 15)", "20251201T080000Z", "20251201T160000Z"),
        ]
        .concat();
        let config = Config {
            attribution: SiteAttribution::Summary,
            ..Config::default()
        };

        let result = aggregate(&[feed("all", &text)], &config, at(9, 0)).unwrap();
        let ids: Vec<&str> = result.iter().map(|s| s.site.id.as_str()).collect();
        assert_eq!(ids, vec!["dublin-15", "dublin-15-2", "åland", "schedule-4"]);
        assert_eq!(result[0].total(), 2);

        let selected = select_site(result, Some("dublin-15"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].site.label, "Dublin 15");
    }

    #[test]
    fn test_allow_listed_site_ids_are_unique() {
        let config = Config {
            attribution: SiteAttribution::Summary,
            schedule_allow_list: vec!["Espoo".to_string(), "ESPOO".to_string()],
            ..Config::default()
        };

        let result = aggregate(&[feed("all", "")], &config, at(9, 0)).unwrap();
        let ids: Vec<&str> = result.iter().map(|s| s.site.id.as_str()).collect();
        assert_eq!(ids, vec!["espoo", "espoo-2"]);
    }

    #[test]
    fn test_attribution_picks_summary_policy() {
        assert_eq!(SiteAttribution::Feed.summary_policy(), SummaryPolicy::Fallback);
        assert_eq!(SiteAttribution::Summary.summary_policy(), SummaryPolicy::Reject);
    }
}
