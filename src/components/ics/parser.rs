use super::models::CalendarEvent;
use crate::error::ShiftResult;
use crate::utils::time::{format_ics_datetime, parse_ics_datetime};
use tracing::debug;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const DTSTART: &str = "DTSTART:";
const DTEND: &str = "DTEND:";
const SUMMARY: &str = "SUMMARY:";
const LOCATION: &str = "LOCATION:";

/// Read `BEGIN:VEVENT` ... `END:VEVENT` blocks and extract
/// DTSTART, DTEND, SUMMARY and LOCATION.
///
/// A malformed date-time fails the whole document. A stray `END:VEVENT` is
/// ignored and an unterminated trailing block is dropped.
pub fn extract_events(ics_text: &str) -> ShiftResult<Vec<CalendarEvent>> {
    let mut events = Vec::new();
    let mut current: Option<CalendarEvent> = None;

    for raw_line in ics_text.lines() {
        let line = raw_line.trim();

        if line == BEGIN_EVENT {
            current = Some(CalendarEvent::default());
        } else if line == END_EVENT {
            if let Some(event) = current.take() {
                events.push(event);
            }
        } else if let Some(event) = current.as_mut() {
            if let Some(value) = line.strip_prefix(DTSTART) {
                event.start = Some(parse_ics_datetime(value)?);
            } else if let Some(value) = line.strip_prefix(DTEND) {
                event.end = Some(parse_ics_datetime(value)?);
            } else if let Some(value) = line.strip_prefix(SUMMARY) {
                event.summary = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix(LOCATION) {
                event.location = Some(value.to_string());
            }
        }
    }

    if current.is_some() {
        debug!("Dropping unterminated VEVENT block at end of document");
    }

    debug!("Extracted {} events from ICS document", events.len());
    Ok(events)
}

/// Write events back as a minimal VCALENDAR document.
///
/// Only the four tracked properties are written, so the output extracts back
/// to the same event sequence.
pub fn serialize_events(events: &[CalendarEvent]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//shiftboard//EN\r\n");

    for event in events {
        out.push_str(BEGIN_EVENT);
        out.push_str("\r\n");
        if let Some(start) = &event.start {
            out.push_str(&format!("{}{}\r\n", DTSTART, format_ics_datetime(start)));
        }
        if let Some(end) = &event.end {
            out.push_str(&format!("{}{}\r\n", DTEND, format_ics_datetime(end)));
        }
        if let Some(summary) = &event.summary {
            out.push_str(&format!("{}{}\r\n", SUMMARY, summary));
        }
        if let Some(location) = &event.location {
            out.push_str(&format!("{}{}\r\n", LOCATION, location));
        }
        out.push_str(END_EVENT);
        out.push_str("\r\n");
    }

    out.push_str("END:VCALENDAR\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "BEGIN:VCALENDAR\n\
VERSION:2.0\n\
BEGIN:VEVENT\n\
DTSTART:20251201T080000Z\n\
DTEND:20251201T160000Z\n\
SUMMARY:Jane Doe (Shift as Mission Control (MC) at HQ at Dublin 15 Operations Schedule)\n\
LOCATION:MANNA HQ\n\
UID:abc-123\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
SUMMARY:No times here\n\
END:VEVENT\n\
END:VCALENDAR\n";

    #[test]
    fn test_extracts_events_in_document_order() {
        let events = extract_events(SAMPLE).unwrap();
        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.start, Some(Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap()));
        assert_eq!(first.end, Some(Utc.with_ymd_and_hms(2025, 12, 1, 16, 0, 0).unwrap()));
        assert_eq!(
            first.summary.as_deref(),
            Some("Jane Doe (Shift as Mission Control (MC) at HQ at Dublin 15 Operations Schedule)")
        );
        assert_eq!(first.location.as_deref(), Some("MANNA HQ"));

        // Fields are only populated when their line was present
        let second = &events[1];
        assert_eq!(second.summary.as_deref(), Some("No times here"));
        assert!(second.start.is_none());
        assert!(second.end.is_none());
        assert!(second.location.is_none());
    }

    #[test]
    fn test_handles_crlf_line_endings() {
        let text = "BEGIN:VEVENT\r\nDTSTART:20250101T000000Z\r\nSUMMARY:A\r\nEND:VEVENT\r\n";
        let events = extract_events(text).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("A"));
    }

    #[test]
    fn test_ignores_stray_end_and_drops_unterminated_block() {
        let text = "END:VEVENT\n\
BEGIN:VEVENT\n\
SUMMARY:Complete\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
SUMMARY:Never closed\n";
        let events = extract_events(text).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("Complete"));
    }

    #[test]
    fn test_ignores_properties_outside_blocks() {
        let text = "SUMMARY:Calendar level\nBEGIN:VEVENT\nEND:VEVENT\n";
        let events = extract_events(text).unwrap();
        assert_eq!(events, vec![CalendarEvent::default()]);
    }

    #[test]
    fn test_malformed_datetime_fails_document() {
        let text = "BEGIN:VEVENT\nDTSTART:20251201\nEND:VEVENT\n";
        assert!(extract_events(text).is_err());
    }

    #[test]
    fn test_parameterised_properties_are_ignored() {
        // DTSTART with a TZID parameter does not match the plain prefix
        let text = "BEGIN:VEVENT\nDTSTART;TZID=Europe/Dublin:20251201T080000\nEND:VEVENT\n";
        let events = extract_events(text).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].start.is_none());
    }

    #[test]
    fn test_serialize_then_extract_is_stable() {
        let events = extract_events(SAMPLE).unwrap();
        let again = extract_events(&serialize_events(&events)).unwrap();
        assert_eq!(events, again);
    }
}
