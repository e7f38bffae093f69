use chrono::{DateTime, Utc};

const WORDS_PER_MINUTE: usize = 200;

/// URL-safe slug: lowercase, trimmed, everything outside `[a-z0-9]`,
/// whitespace and `-` dropped, whitespace runs collapsed into `-`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept: String = lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Remove anything that looks like an HTML tag, including an unterminated
/// trailing one. Tags are dropped outright, so `foo<b>bar</b>` reads as a
/// single word.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' && chars.peek().is_some_and(|next| *next != '>') {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Estimated minutes to read a rich-text body at 200 words per minute.
///
/// An empty body still counts as one word, so the result is never zero.
pub fn reading_minutes(html: &str) -> usize {
    let words = strip_tags(html).split_whitespace().count().max(1);
    words.div_ceil(WORDS_PER_MINUTE)
}

pub fn reading_time(html: &str) -> String {
    format!("{} minute read", reading_minutes(html))
}

/// Derived lifecycle of an event relative to `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub enum EventStatus {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "ongoing")]
    Ongoing,
    #[serde(rename = "ended")]
    Ended,
}

pub fn event_status(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> EventStatus {
    if now < start {
        EventStatus::NotStarted
    } else if now <= end {
        EventStatus::Ongoing
    } else {
        EventStatus::Ended
    }
}

/// Collapse whitespace runs and upper-case the first letter of every word.
pub fn capitalize(words: &str) -> String {
    words
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loose `local@domain.tld` shape check.
pub fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
}
