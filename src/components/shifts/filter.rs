use super::models::{BucketGroup, SiteSchedule};

/// Keep people whose name or role contains `search_text`, ignoring case.
///
/// Sites left without any match are dropped. A blank search returns the
/// input unchanged.
pub fn apply_search_filter(sites: &[SiteSchedule], search_text: &str) -> Vec<SiteSchedule> {
    let search = search_text.trim().to_lowercase();
    if search.is_empty() {
        return sites.to_vec();
    }

    sites
        .iter()
        .filter_map(|schedule| {
            let buckets: Vec<BucketGroup> = schedule
                .buckets
                .iter()
                .map(|group| BucketGroup {
                    bucket: group.bucket,
                    entries: group
                        .entries
                        .iter()
                        .filter(|e| {
                            e.name.to_lowercase().contains(&search)
                                || e.role.to_lowercase().contains(&search)
                        })
                        .cloned()
                        .collect(),
                })
                .collect();

            buckets
                .iter()
                .any(|group| !group.entries.is_empty())
                .then(|| SiteSchedule {
                    site: schedule.site.clone(),
                    view: schedule.view,
                    buckets,
                })
        })
        .collect()
}

/// Restrict to one site by id; `None` keeps every site.
///
/// An id that matches no site yields an empty list.
pub fn select_site(sites: Vec<SiteSchedule>, site_id: Option<&str>) -> Vec<SiteSchedule> {
    match site_id {
        Some(site_id) => sites.into_iter().filter(|s| s.site.id == site_id).collect(),
        None => sites,
    }
}
