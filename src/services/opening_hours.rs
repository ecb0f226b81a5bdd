//! Evaluator for the common forms of the OSM `opening_hours` tag.
//!
//! Supported: `24/7`, weekday lists and ranges (`Mo-Fr`, `Sa,Su`, wrapping
//! `Fr-Mo`), comma-separated time spans, spans past midnight
//! (`18:00-02:00`), and `off`/`closed`. Rules are applied in order and a
//! later rule replaces an earlier one for the days it names. Anything else
//! (holidays, months, sunrise, open-ended `+`) makes the whole value
//! unparseable, and the caller treats the place's hours as unknown.

use time::PrimitiveDateTime;

const MINUTES_PER_DAY: u16 = 24 * 60;
const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    open: u16,
    close: u16,
}

impl Span {
    fn wraps_midnight(&self) -> bool {
        self.close <= self.open
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    days: [bool; 7],
    /// Empty means closed on those days
    spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpeningHours {
    AlwaysOpen,
    Weekly(Vec<Rule>),
}

impl OpeningHours {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == "24/7" {
            return Some(OpeningHours::AlwaysOpen);
        }

        let rules = raw
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(parse_rule)
            .collect::<Option<Vec<_>>>()?;

        if rules.is_empty() {
            return None;
        }
        Some(OpeningHours::Weekly(rules))
    }

    /// Whether the place is open at a local wall-clock time
    pub fn is_open_at(&self, local: PrimitiveDateTime) -> bool {
        let rules = match self {
            OpeningHours::AlwaysOpen => return true,
            OpeningHours::Weekly(rules) => rules,
        };

        let today = local.weekday().number_days_from_monday() as usize;
        let yesterday = (today + 6) % 7;
        let minute = u16::from(local.hour()) * 60 + u16::from(local.minute());

        let open_today = spans_for(rules, today).iter().any(|span| {
            if span.wraps_midnight() {
                minute >= span.open
            } else {
                minute >= span.open && minute < span.close
            }
        });
        if open_today {
            return true;
        }

        // Spill-over from a span that started yesterday
        spans_for(rules, yesterday)
            .iter()
            .any(|span| span.wraps_midnight() && minute < span.close)
    }
}

/// The spans of the last rule naming `day`
fn spans_for(rules: &[Rule], day: usize) -> &[Span] {
    rules
        .iter()
        .rev()
        .find(|rule| rule.days[day])
        .map(|rule| rule.spans.as_slice())
        .unwrap_or(&[])
}

fn parse_rule(rule: &str) -> Option<Rule> {
    let (days, rest) = match rule.chars().next() {
        Some(c) if c.is_ascii_digit() => ([true; 7], rule),
        _ => {
            let (selector, rest) = rule.split_once(' ').unwrap_or((rule, ""));
            (parse_days(selector)?, rest.trim())
        }
    };

    let spans = match rest {
        "off" | "closed" => Vec::new(),
        "" => vec![Span {
            open: 0,
            close: MINUTES_PER_DAY,
        }],
        times => times
            .split(',')
            .map(|s| parse_span(s.trim()))
            .collect::<Option<Vec<_>>>()?,
    };

    Some(Rule { days, spans })
}

fn parse_days(selector: &str) -> Option<[bool; 7]> {
    let mut days = [false; 7];
    for part in selector.split(',') {
        match part.split_once('-') {
            Some((from, to)) => {
                let (from, to) = (weekday_index(from)?, weekday_index(to)?);
                let mut day = from;
                loop {
                    days[day] = true;
                    if day == to {
                        break;
                    }
                    day = (day + 1) % 7;
                }
            }
            None => days[weekday_index(part)?] = true,
        }
    }
    Some(days)
}

fn weekday_index(name: &str) -> Option<usize> {
    WEEKDAYS.iter().position(|d| *d == name.trim())
}

fn parse_span(span: &str) -> Option<Span> {
    let (open, close) = span.split_once('-')?;
    let open = parse_clock(open)?;
    let close = parse_clock(close)?;
    if open >= MINUTES_PER_DAY {
        return None;
    }
    // 00:00-24:00 is a full day, not a wrap
    let close = if close == MINUTES_PER_DAY && open == 0 {
        MINUTES_PER_DAY
    } else {
        close % MINUTES_PER_DAY
    };
    Some(Span { open, close })
}

fn parse_clock(clock: &str) -> Option<u16> {
    let (h, m) = clock.trim().split_once(':')?;
    if h.len() > 2 || m.len() != 2 {
        return None;
    }
    let h: u16 = h.parse().ok()?;
    let m: u16 = m.parse().ok()?;
    if h > 24 || m > 59 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // 2025-06-02 is a Monday
    fn open(raw: &str, at: PrimitiveDateTime) -> bool {
        OpeningHours::parse(raw).unwrap().is_open_at(at)
    }

    #[test]
    fn test_always_open() {
        assert!(open("24/7", datetime!(2025-06-04 03:00)));
    }

    #[test]
    fn test_weekday_ranges() {
        let hours = "Mo-Fr 11:00-22:00; Sa,Su 12:00-23:30";
        assert!(open(hours, datetime!(2025-06-02 11:00)));
        assert!(!open(hours, datetime!(2025-06-02 22:00)));
        assert!(!open(hours, datetime!(2025-06-07 11:30)));
        assert!(open(hours, datetime!(2025-06-08 23:00)));
    }

    #[test]
    fn test_span_past_midnight() {
        let hours = "Fr,Sa 18:00-02:00";
        assert!(open(hours, datetime!(2025-06-06 23:30)));
        // Saturday 01:00 is still Friday night
        assert!(open(hours, datetime!(2025-06-07 01:00)));
        // Monday 01:00 follows Sunday, which has no hours
        assert!(!open(hours, datetime!(2025-06-09 01:00)));
    }

    #[test]
    fn test_later_rule_overrides() {
        let hours = "Mo-Su 10:00-20:00; Tu off";
        assert!(open(hours, datetime!(2025-06-02 12:00)));
        assert!(!open(hours, datetime!(2025-06-03 12:00)));
    }

    #[test]
    fn test_wrapping_day_range_and_split_spans() {
        let hours = "Fr-Mo 12:00-14:30,17:00-23:00";
        assert!(open(hours, datetime!(2025-06-09 13:00)));
        assert!(!open(hours, datetime!(2025-06-09 15:00)));
        assert!(!open(hours, datetime!(2025-06-04 13:00)));
    }

    #[test]
    fn test_times_without_days_apply_daily() {
        assert!(open("07:00-19:00", datetime!(2025-06-05 18:59)));
        assert!(!open("07:00-19:00", datetime!(2025-06-05 19:00)));
    }

    #[test]
    fn test_unsupported_forms_are_unknown() {
        assert!(OpeningHours::parse("").is_none());
        assert!(OpeningHours::parse("Mo-Fr 09:00-17:00; PH off").is_none());
        assert!(OpeningHours::parse("sunrise-sunset").is_none());
        assert!(OpeningHours::parse("Mo-Fr 09:00+").is_none());
        assert!(OpeningHours::parse("Jan-Mar Mo 10:00-12:00").is_none());
    }
}
