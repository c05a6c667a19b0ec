use super::{DashboardQuery, ALL_SITES};
use crate::components::shifts::{Bucket, BucketGroup, RoleView, ShiftEntry, ShiftStatus, SiteMeta, SiteSchedule};
use crate::utils::time::{format_local_time, format_utc_timestamp};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_i18n::t;

const PAGE_TEMPLATE: &str = include_str!("../../assets/dashboard.html");

/// What the dashboard body shows below the controls
#[derive(Debug, Clone)]
pub enum DashboardOutcome {
    /// Sites to render, already selected, regrouped and filtered
    Sites(Vec<SiteSchedule>),
    /// The schedule lists no site at all
    NobodyScheduled,
    /// Site selection or search left nothing
    NoMatch,
    /// Fetching or parsing failed for this cycle
    FetchError(String),
}

/// Everything needed to render one dashboard page
#[derive(Debug, Clone)]
pub struct DashboardPage<'a> {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub query: &'a DashboardQuery,
    /// Sites offered in the selector
    pub site_options: Vec<SiteMeta>,
    pub outcome: DashboardOutcome,
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn wrap_page(content: &str) -> String {
    PAGE_TEMPLATE
        .replace("<!-- TITLE -->", &escape_html(&t!("page_title")))
        .replace("<!-- CONTENT -->", content)
}

/// Blocking page shown when no feed is configured
pub fn render_config_error(message: &str) -> String {
    let content = format!(
        "<h2>{}</h2>\n<div class=\"alert alert-error\">{}</div>",
        escape_html(&t!("page_title")),
        escape_html(message)
    );
    wrap_page(&content)
}

/// Full dashboard page
pub fn render_dashboard(page: &DashboardPage<'_>) -> String {
    let mut content = String::new();

    content.push_str(&render_header(page.now, page.timezone));
    content.push_str(&render_controls(page.query, &page.site_options));

    match &page.outcome {
        DashboardOutcome::FetchError(message) => {
            content.push_str(&format!(
                "<div class=\"alert alert-error\">{}</div>\n",
                escape_html(&t!("error_fetch", error = message))
            ));
        }
        DashboardOutcome::NobodyScheduled => {
            content.push_str(&format!(
                "<div class=\"alert alert-info\">{}</div>\n",
                escape_html(&t!("info_nobody"))
            ));
        }
        DashboardOutcome::NoMatch => {
            content.push_str(&format!(
                "<div class=\"alert alert-info\">{}</div>\n",
                escape_html(&t!("info_no_match"))
            ));
        }
        DashboardOutcome::Sites(sites) => {
            for schedule in sites {
                content.push_str(&render_site(schedule, page.now, page.timezone));
            }
        }
    }

    wrap_page(&content)
}

fn render_header(now: DateTime<Utc>, timezone: Tz) -> String {
    format!(
        "<header>\n<h2>{}</h2>\n<p class=\"caption\">{}</p>\n</header>\n<hr>\n",
        escape_html(&t!("page_title")),
        escape_html(&t!(
            "current_time",
            utc = format_utc_timestamp(&now),
            zone = timezone.name()
        ))
    )
}

fn render_controls(query: &DashboardQuery, site_options: &[SiteMeta]) -> String {
    let selected_site = query.site_id().unwrap_or(ALL_SITES);
    let view = query.role_view();

    let mut sites = format!(
        "<option value=\"{}\"{}>{}</option>",
        ALL_SITES,
        selected_attr(selected_site == ALL_SITES),
        escape_html(&t!("all_locations"))
    );
    for site in site_options {
        sites.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(&site.id),
            selected_attr(selected_site == site.id),
            escape_html(&site.display_name())
        ));
    }

    let views = [
        (RoleView::Standard, t!("view_standard")),
        (RoleView::McFocused, t!("view_mc")),
    ]
    .iter()
    .map(|(option, label)| {
        format!(
            "<option value=\"{}\"{}>{}</option>",
            option.query_value(),
            selected_attr(*option == view),
            escape_html(label)
        )
    })
    .collect::<String>();

    let search = escape_html(query.search());

    format!(
        r#"<div class="controls">
<form method="get" action="/" class="controls-filter">
<label>{location}<select name="site">{sites}</select></label>
<label>{search_label}<input type="text" name="q" value="{search}" placeholder="{placeholder}"></label>
<label>{view_label}<select name="view">{views}</select></label>
<button type="submit">{apply}</button>
</form>
<form method="post" action="/refresh" class="controls-refresh">
<input type="hidden" name="site" value="{site}">
<input type="hidden" name="q" value="{search}">
<input type="hidden" name="view" value="{view}">
<button type="submit">{refresh}</button>
</form>
</div>
"#,
        location = escape_html(&t!("location_label")),
        sites = sites,
        search_label = escape_html(&t!("search_label")),
        search = search,
        placeholder = escape_html(&t!("search_placeholder")),
        view_label = escape_html(&t!("view_label")),
        views = views,
        apply = escape_html(&t!("apply_button")),
        site = escape_html(selected_site),
        view = view.query_value(),
        refresh = escape_html(&t!("refresh_button")),
    )
}

fn selected_attr(selected: bool) -> &'static str {
    if selected {
        " selected"
    } else {
        ""
    }
}

/// One site section with count badges and bucket columns
pub fn render_site(schedule: &SiteSchedule, now: DateTime<Utc>, timezone: Tz) -> String {
    let mut html = format!(
        "<section class=\"site\" id=\"site-{}\">\n<h3>{}</h3>\n<div class=\"badges\">",
        escape_html(&schedule.site.id),
        escape_html(&schedule.site.display_name())
    );

    for group in &schedule.buckets {
        html.push_str(&format!(
            "<span class=\"badge badge-{}\">● {}: {}</span>",
            group.bucket.key(),
            escape_html(group.bucket.label()),
            group.entries.len()
        ));
    }
    html.push_str("</div>\n<div class=\"columns\">\n");

    for group in &schedule.buckets {
        html.push_str(&render_bucket(group, now, timezone));
    }

    html.push_str("</div>\n</section>\n<hr>\n");
    html
}

fn render_bucket(group: &BucketGroup, now: DateTime<Utc>, timezone: Tz) -> String {
    let mut cards = String::new();
    if group.entries.is_empty() {
        cards.push_str(&format!(
            "<p class=\"caption\">{}</p>\n",
            escape_html(&t!("none_on_shift"))
        ));
    }
    for entry in &group.entries {
        cards.push_str(&render_person_card(entry, now, timezone));
    }

    let header = format!(
        "<div class=\"bucket-header bucket-{}\">{}</div>\n",
        group.bucket.key(),
        escape_html(&bucket_title(group.bucket))
    );

    if group.bucket == Bucket::Other {
        format!(
            "<div class=\"column\">\n<details>\n<summary>{}</summary>\n{}{}</details>\n</div>\n",
            escape_html(&t!("other_roles", count = group.entries.len())),
            header,
            cards
        )
    } else {
        format!("<div class=\"column\">\n{}{}</div>\n", header, cards)
    }
}

fn bucket_title(bucket: Bucket) -> String {
    match bucket {
        Bucket::Other => t!("other_roles_title").to_string(),
        _ => bucket.label().to_uppercase(),
    }
}

fn status_label(status: ShiftStatus) -> String {
    match status {
        ShiftStatus::EndingNow => t!("status_ending_now").to_string(),
        ShiftStatus::EndingSoon => t!("status_ending_soon").to_string(),
        ShiftStatus::EndingLater => t!("status_ending_later").to_string(),
        ShiftStatus::PlentyOfTime => t!("status_plenty").to_string(),
    }
}

/// Card for a single person with their remaining-time status
pub fn render_person_card(entry: &ShiftEntry, now: DateTime<Utc>, timezone: Tz) -> String {
    let status = ShiftStatus::from_remaining(entry.end, now);
    format!(
        r#"<div class="card">
<div class="card-name">{name}</div>
<div class="card-role">{role}</div>
<div class="card-status"><span class="dot {class}"></span><span>{until}</span><span class="status-label">{label}</span></div>
</div>
"#,
        name = escape_html(&entry.name),
        role = escape_html(&entry.role),
        class = status.css_class(),
        until = escape_html(&t!("on_until", time = format_local_time(&entry.end, &timezone))),
        label = escape_html(&status_label(status)),
    )
}
