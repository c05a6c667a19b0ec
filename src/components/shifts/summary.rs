/// Delimiter between the person's name and the shift description
const SHIFT_DELIMITER: &str = " (Shift as ";
/// Delimiter between role, venue and schedule name
const AT_DELIMITER: &str = " at ";
/// Role used when the summary does not follow the shift grammar
pub const UNKNOWN_ROLE: &str = "Unknown";

/// What to do with a summary that does not follow the shift grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPolicy {
    /// Use the whole summary as the name and `Unknown` as the role
    Fallback,
    /// Produce no result
    Reject,
}

/// Fields extracted from a shift summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    pub name: String,
    pub role: String,
    /// Schedule (site) name from the last `" at "` segment, if any
    pub schedule: Option<String>,
}

/// Parse a summary such as
/// `Stephen McSherry (Shift as Mission Control (MC) at MANNA HQ at Dublin 15 Operations Schedule)`.
pub fn parse_summary(summary: &str, policy: SummaryPolicy) -> Option<ParsedSummary> {
    let Some((name_part, rest)) = summary.split_once(SHIFT_DELIMITER) else {
        return match policy {
            SummaryPolicy::Fallback => Some(ParsedSummary {
                name: summary.trim().to_string(),
                role: UNKNOWN_ROLE.to_string(),
                schedule: None,
            }),
            SummaryPolicy::Reject => None,
        };
    };

    let (role_part, schedule) = match rest.split_once(AT_DELIMITER) {
        Some((role_part, _)) => {
            let last = rest.rsplit(AT_DELIMITER).next().unwrap_or_default();
            let schedule = strip_closing_paren(last).trim();
            let schedule = (!schedule.is_empty()).then(|| schedule.to_string());
            (role_part, schedule)
        }
        None => (strip_closing_paren(rest), None),
    };

    let role = match role_part.trim() {
        "" => UNKNOWN_ROLE.to_string(),
        role => role.to_string(),
    };

    Some(ParsedSummary {
        name: name_part.trim().to_string(),
        role,
        schedule,
    })
}

/// Cut at the final `)`, dropping it and anything after it
fn strip_closing_paren(text: &str) -> &str {
    match text.rfind(')') {
        Some(index) => &text[..index],
        None => text,
    }
}
