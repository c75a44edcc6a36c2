//! English date matcher built on the `chrono-english` grammar.
//!
//! `chrono-english` parses a whole string as one date expression. To find
//! date mentions inside free text ("remind me tomorrow at 3pm please") the
//! matcher slides windows of words over the text, longest windows first,
//! and keeps every window the grammar accepts that does not overlap an
//! earlier, longer match.
//!
//! The grammar runs against a fixed offset, so only the wall-clock reading
//! of its answer is kept. Future-preference adjustments happen on that
//! wall clock, and the result is resolved through the target zone so it
//! carries the offset in force on the resolved date.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDateTime, TimeZone};
use chrono_english::{Dialect, parse_date_string};
use chrono_tz::Tz;

use super::{DateMatch, DateMatcher, MatchOptions};

/// Longest window, in words, handed to the grammar.
const MAX_SPAN: usize = 6;

/// Connectives the grammar does not understand ("tomorrow at 3pm").
const FILLER: &[&str] = &["at", "on", "by"];

/// Words that point backwards in time; such expressions are never moved forward.
const BACKWARD: &[&str] = &["last", "ago", "yesterday", "previous", "past"];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec",
];

const TRIM: &[char] = &[',', '.', ';', '!', '?', '(', ')', '"', '\''];

#[derive(Debug, Clone)]
struct Token {
    word: String,
    start: usize,
    end: usize,
}

/// [`DateMatcher`] for English date expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDateMatcher;

impl EnglishDateMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl DateMatcher for EnglishDateMatcher {
    fn find_matches(
        &self,
        text: &str,
        reference: DateTime<Tz>,
        options: &MatchOptions,
    ) -> Vec<DateMatch> {
        let tokens: Vec<Token> = tokenize(text)
            .into_iter()
            .filter(|t| !FILLER.contains(&t.word.as_str()))
            .collect();
        let month_first = is_month_first(options.locale.as_deref());
        let fixed_reference = reference.fixed_offset();
        let local_reference = reference.naive_local();
        let tz = reference.timezone();

        let mut matches = Vec::new();
        let mut covered = vec![false; tokens.len()];
        for len in (1..=MAX_SPAN.min(tokens.len())).rev() {
            for start in 0..=tokens.len() - len {
                let window = start..start + len;
                if covered[window.clone()].iter().any(|c| *c) {
                    continue;
                }
                let span = &tokens[window.clone()];
                let phrase = span
                    .iter()
                    .map(|t| grammar_word(&t.word))
                    .collect::<Vec<_>>()
                    .join(" ");
                let dialect = if month_first { Dialect::Us } else { Dialect::Uk };
                let Ok(parsed) = parse_date_string(&phrase, fixed_reference, dialect) else {
                    continue;
                };
                let mut local = parsed.naive_local();
                if options.prefer_future && local <= local_reference {
                    local = next_occurrence(span, local);
                }
                let Some(instant) = resolve_local(&tz, local) else {
                    continue;
                };
                let (from, to) = (span[0].start, span[len - 1].end);
                matches.push(DateMatch {
                    text: text[from..to].to_string(),
                    index: from,
                    start: instant,
                });
                covered[window].fill(true);
            }
        }
        matches
    }
}

/// Spell words the grammar lacks in a form it accepts.
fn grammar_word(word: &str) -> &str {
    match word {
        "noon" => "12:00",
        "midnight" => "00:00",
        other => other,
    }
}

/// Move a wall-clock time that is not after the reference to its next occurrence.
///
/// A bare time of day moves to the next day; a calendar date or month
/// without a year moves to the next year. Spans with an explicit year or
/// a backward-looking word are left alone.
fn next_occurrence(span: &[Token], local: NaiveDateTime) -> NaiveDateTime {
    if span
        .iter()
        .any(|t| BACKWARD.contains(&t.word.as_str()) || has_year(&t.word))
    {
        return local;
    }
    if is_time_of_day(span) {
        return local + Duration::days(1);
    }
    if is_calendar_date(span) {
        return local
            .date()
            .checked_add_months(Months::new(12))
            .map(|date| date.and_time(local.time()))
            .unwrap_or(local);
    }
    local
}

/// Map a wall-clock time onto `tz`, taking the earlier reading of a repeated
/// hour and skipping forward over a gap.
fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.fixed_offset())
}

/// Split on whitespace, keeping byte offsets into `text` and trimming punctuation.
fn tokenize(text: &str) -> Vec<Token> {
    let base = text.as_ptr() as usize;
    text.split_whitespace()
        .filter_map(|piece| {
            let word = piece.trim_matches(TRIM);
            if word.is_empty() {
                return None;
            }
            let start = word.as_ptr() as usize - base;
            Some(Token {
                word: word.to_lowercase(),
                start,
                end: start + word.len(),
            })
        })
        .collect()
}

/// Month-first for US English (and when no locale is given), day-first otherwise.
fn is_month_first(locale: Option<&str>) -> bool {
    match locale {
        None => true,
        Some(tag) => {
            let tag = tag.replace('_', "-").to_ascii_lowercase();
            tag == "en-us" || tag.starts_with("en-us-")
        }
    }
}

/// A four-digit run ("2026", "2026-03-01") or a fully numeric d/m/y date ("3/4/26").
fn has_year(word: &str) -> bool {
    let mut run = 0;
    for c in word.chars() {
        run = if c.is_ascii_digit() { run + 1 } else { 0 };
        if run == 4 {
            return true;
        }
    }
    word.matches('/').count() == 2
}

/// A month name, or a numeric day/month form like "3/4".
fn is_calendar_date(span: &[Token]) -> bool {
    span.iter().any(|t| {
        let w = t.word.as_str();
        MONTHS.contains(&w)
            || (w.contains('/') && w.chars().all(|c| c.is_ascii_digit() || c == '/'))
    })
}

fn is_time_of_day(span: &[Token]) -> bool {
    span.iter().all(|t| {
        let w = t.word.as_str();
        let has_digit = w.chars().any(|c| c.is_ascii_digit());
        matches!(w, "noon" | "midnight")
            || (has_digit && (w.ends_with("am") || w.ends_with("pm") || w.contains(':')))
    })
}
