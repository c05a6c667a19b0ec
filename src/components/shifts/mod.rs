mod aggregator;
mod classify;
mod filter;
mod models;
mod status;
mod summary;

pub use aggregator::{aggregate, regroup_for_mc_view, slugify, FetchedFeed, ShiftAggregator};
pub use classify::{Bucket, RoleView};
pub use filter::{apply_search_filter, select_site};
pub use models::{BucketGroup, ShiftEntry, SiteMeta, SiteSchedule};
pub use status::ShiftStatus;
pub use summary::{parse_summary, ParsedSummary, SummaryPolicy, UNKNOWN_ROLE};
