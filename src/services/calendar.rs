//! iCalendar (RFC 5545) export of an itinerary.
//!
//! Every interval event becomes one `VEVENT`. Zero-duration notices
//! (arrival, doors) have no useful calendar shape on their own, so they are
//! listed in the description of a single summary event spanning the whole
//! evening.

use crate::error::{AppError, Result};
use crate::models::{Event, Itinerary};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

const PRODID: &str = "-//encore//itinerary//EN";
const MAX_LINE_OCTETS: usize = 75;

pub fn to_ics(itinerary: &Itinerary, calendar_name: &str) -> Result<String> {
    let stamp = utc_stamp(OffsetDateTime::now_utc())?;
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(calendar_name)),
    ];

    let notices: Vec<&Event> = itinerary.events.iter().filter(|e| e.is_notice()).collect();
    if !notices.is_empty() {
        let first = itinerary.events.iter().map(|e| e.start).min();
        let last = itinerary.events.iter().map(|e| e.end).max();
        if let (Some(first), Some(last)) = (first, last) {
            let description = notices
                .iter()
                .map(|n| Ok(format!("{} {}", clock(n.start)?, n.title)))
                .collect::<Result<Vec<_>>>()?
                .join("\n");
            push_event(&mut lines, &stamp, calendar_name, first, last, &description, None)?;
        }
    }

    for event in itinerary.events.iter().filter(|e| e.start < e.end) {
        push_event(
            &mut lines,
            &stamp,
            &event.title,
            event.start,
            event.end,
            &event.details,
            event.url.as_deref(),
        )?;
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold(&line));
        out.push_str("\r\n");
    }
    Ok(out)
}

fn push_event(
    lines: &mut Vec<String>,
    stamp: &str,
    summary: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
    description: &str,
    url: Option<&str>,
) -> Result<()> {
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}@encore", Uuid::new_v4()));
    lines.push(format!("DTSTAMP:{}", stamp));
    lines.push(format!("DTSTART:{}", utc_stamp(start)?));
    lines.push(format!("DTEND:{}", utc_stamp(end)?));
    lines.push(format!("SUMMARY:{}", escape_text(summary)));
    if !description.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(url) = url {
        // URIs carry no escapes; a raw line break would end the property
        lines.push(format!("URL:{}", url.replace(['\r', '\n'], "")));
    }
    lines.push("END:VEVENT".to_string());
    Ok(())
}

fn utc_stamp(at: OffsetDateTime) -> Result<String> {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]Z"
        ))
        .map_err(|e| AppError::Internal(format!("Failed to format calendar time: {}", e)))
}

fn clock(at: OffsetDateTime) -> Result<String> {
    at.format(format_description!("[hour]:[minute]"))
        .map_err(|e| AppError::Internal(format!("Failed to format calendar time: {}", e)))
}

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n")
}

/// Fold to 75 octets per line, continuation lines start with a space
fn fold(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        // Continuation lines carry one octet of leading space
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}
