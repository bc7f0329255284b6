//! iCalendar holiday feed.
//!
//! Only what a public-holiday feed needs: line unfolding, `VEVENT` blocks,
//! all-day `DTSTART` dates and `SUMMARY` text.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use acai_core::config::schema::HolidaysToolConfig;

use super::SourceError;

/// One event from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayEvent {
    /// All-day date, `None` for timed or undated events.
    pub date: Option<NaiveDate>,
    pub summary: String,
}

/// Anything that can list holiday events, in feed order.
#[async_trait]
pub trait HolidayFeed: Send + Sync {
    async fn events(&self) -> Result<Vec<HolidayEvent>, SourceError>;
}

// ─────────────────────────────────────────────
// IcsHolidayFeed
// ─────────────────────────────────────────────

/// Fetches and parses an `.ics` feed over HTTP on every call.
pub struct IcsHolidayFeed {
    client: Client,
    url: String,
}

impl IcsHolidayFeed {
    pub fn new(config: &HolidaysToolConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            url: config.calendar_url.clone(),
        })
    }
}

#[async_trait]
impl HolidayFeed for IcsHolidayFeed {
    async fn events(&self) -> Result<Vec<HolidayEvent>, SourceError> {
        debug!(url = %self.url, "fetching holiday feed");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_ics(&body)
    }
}

// ─────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────

/// Parse iCalendar text into events, preserving their order.
pub fn parse_ics(text: &str) -> Result<Vec<HolidayEvent>, SourceError> {
    let lines = unfold_lines(text);
    if !lines
        .iter()
        .any(|l| l.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(SourceError::Parse("missing BEGIN:VCALENDAR".into()));
    }

    let mut events = Vec::new();
    let mut current: Option<HolidayEvent> = None;

    for line in &lines {
        let Some((head, value)) = line.split_once(':') else {
            continue;
        };
        let mut parts = head.split(';');
        let name = parts.next().unwrap_or_default().to_ascii_uppercase();
        let params: Vec<&str> = parts.collect();

        match (name.as_str(), current.as_mut()) {
            ("BEGIN", None) if value.eq_ignore_ascii_case("VEVENT") => {
                current = Some(HolidayEvent {
                    date: None,
                    summary: String::new(),
                });
            }
            ("END", Some(_)) if value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(event) = current.take() {
                    events.push(event);
                }
            }
            ("DTSTART", Some(event)) => event.date = parse_all_day(&params, value),
            ("SUMMARY", Some(event)) => event.summary = unescape_text(value),
            _ => {}
        }
    }

    Ok(events)
}

/// Join continuation lines (RFC 5545 §3.1) and drop blank lines.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = line.strip_prefix([' ', '\t']) {
            if let Some(last) = out.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !line.trim().is_empty() {
            out.push(line.to_string());
        }
    }
    out
}

/// `VALUE=DATE` or a bare `YYYYMMDD` value is all-day; anything with a time
/// component is not.
fn parse_all_day(params: &[&str], value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let declared_date = params
        .iter()
        .any(|p| p.eq_ignore_ascii_case("VALUE=DATE"));
    let bare_date = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());
    if !(declared_date || bare_date) {
        return None;
    }
    NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push(' '),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out.trim().to_string()
}
