use serde::{Deserialize, Serialize};
use std::fmt;

/// Role bucket a shift is grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Mc,
    Pilot,
    FlightOperator,
    Loader,
    Collector,
    Other,
}

impl Bucket {
    /// Display name of the bucket
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Mc => "MC",
            Bucket::Pilot => "Pilot",
            Bucket::FlightOperator => "Flight Operator",
            Bucket::Loader => "Loader",
            Bucket::Collector => "Collector",
            Bucket::Other => "Other",
        }
    }

    /// Stable identifier used in CSS classes and JSON
    pub fn key(self) -> &'static str {
        match self {
            Bucket::Mc => "mc",
            Bucket::Pilot => "pilot",
            Bucket::FlightOperator => "flight_operator",
            Bucket::Loader => "loader",
            Bucket::Collector => "collector",
            Bucket::Other => "other",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which set of buckets roles are classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleView {
    /// MC / Pilot / Other
    #[default]
    Standard,
    /// Flight Operator / Loader / Collector / Other
    McFocused,
}

const STANDARD_RULES: &[(Bucket, &[&str])] = &[
    (Bucket::Mc, &["mission control", "(mc)"]),
    (Bucket::Pilot, &["flight operator", "(fo)", "pilot"]),
];

const MC_FOCUSED_RULES: &[(Bucket, &[&str])] = &[
    (Bucket::FlightOperator, &["flight operator", "(fo)"]),
    (Bucket::Loader, &["loader"]),
    (Bucket::Collector, &["collector"]),
];

impl RoleView {
    /// Buckets of this view in display order
    pub fn buckets(self) -> &'static [Bucket] {
        match self {
            RoleView::Standard => &[Bucket::Mc, Bucket::Pilot, Bucket::Other],
            RoleView::McFocused => &[
                Bucket::FlightOperator,
                Bucket::Loader,
                Bucket::Collector,
                Bucket::Other,
            ],
        }
    }

    /// Put a role into a bucket. First matching rule wins.
    pub fn classify(self, role: &str) -> Bucket {
        let rules = match self {
            RoleView::Standard => STANDARD_RULES,
            RoleView::McFocused => MC_FOCUSED_RULES,
        };

        let role = role.to_lowercase();
        rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| role.contains(k)))
            .map(|(bucket, _)| *bucket)
            .unwrap_or(Bucket::Other)
    }

    /// Parse the `view` query value
    pub fn from_query(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" | "" => Some(RoleView::Standard),
            "mc" | "mc_focused" => Some(RoleView::McFocused),
            _ => None,
        }
    }

    /// Value used for the `view` query parameter
    pub fn query_value(self) -> &'static str {
        match self {
            RoleView::Standard => "standard",
            RoleView::McFocused => "mc",
        }
    }
}
