use super::classify::{Bucket, RoleView};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A person currently on shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftEntry {
    pub name: String,
    /// Role text as written in the schedule
    pub role: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bucket: Bucket,
}

/// Display metadata for a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMeta {
    pub id: String,
    pub label: String,
    pub icon: String,
    /// Feed the site's shifts came from
    pub source: String,
}

impl SiteMeta {
    /// Icon and label, e.g. "🇮🇪 Dublin 15"
    pub fn display_name(&self) -> String {
        if self.icon.is_empty() {
            self.label.clone()
        } else {
            format!("{} {}", self.icon, self.label)
        }
    }
}

/// Entries of one bucket, sorted by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketGroup {
    pub bucket: Bucket,
    pub entries: Vec<ShiftEntry>,
}

/// Active shifts of one site grouped by bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSchedule {
    pub site: SiteMeta,
    pub view: RoleView,
    pub buckets: Vec<BucketGroup>,
}

impl SiteSchedule {
    /// Create a schedule with every bucket of the view present and empty
    pub fn empty(site: SiteMeta, view: RoleView) -> Self {
        let buckets = view
            .buckets()
            .iter()
            .map(|bucket| BucketGroup {
                bucket: *bucket,
                entries: Vec::new(),
            })
            .collect();

        Self {
            site,
            view,
            buckets,
        }
    }

    /// Build a schedule by classifying entries with the given view.
    ///
    /// Each bucket is sorted by name; equal names keep their input order.
    pub fn from_entries(site: SiteMeta, view: RoleView, entries: Vec<ShiftEntry>) -> Self {
        let mut schedule = Self::empty(site, view);

        for mut entry in entries {
            entry.bucket = view.classify(&entry.role);
            if let Some(group) = schedule.group_mut(entry.bucket) {
                group.entries.push(entry);
            }
        }

        for group in &mut schedule.buckets {
            group.entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        schedule
    }

    /// Entries of a bucket, empty if the bucket is not part of this view
    pub fn entries(&self, bucket: Bucket) -> &[ShiftEntry] {
        self.buckets
            .iter()
            .find(|group| group.bucket == bucket)
            .map(|group| group.entries.as_slice())
            .unwrap_or(&[])
    }

    fn group_mut(&mut self, bucket: Bucket) -> Option<&mut BucketGroup> {
        self.buckets.iter_mut().find(|group| group.bucket == bucket)
    }

    /// All entries in bucket order
    pub fn all_entries(&self) -> impl Iterator<Item = &ShiftEntry> {
        self.buckets.iter().flat_map(|group| group.entries.iter())
    }

    /// Total number of people on shift
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|group| group.entries.len()).sum()
    }

    /// Whether no bucket has any entry
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
