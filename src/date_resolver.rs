//! Day expression resolution
//!
//! Maps free-form day phrases ("friday", "tomorrow", "21.10.", "this weekend")
//! onto offsets from today inside the forecast window. Offsets are always in
//! `0..=MAX_OFFSET`; explicit dates outside the window are errors, never clamped.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::error::ForecastChatError;

/// Number of days served by the forecast provider, today included
pub const FORECAST_DAYS: u8 = 7;
/// Largest offset from today that can be answered
pub const MAX_OFFSET: u8 = FORECAST_DAYS - 1;

/// Ordered set of day offsets, each within `0..=MAX_OFFSET`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOffsets(BTreeSet<u8>);

impl DayOffsets {
    /// Just today
    #[must_use]
    pub fn today() -> Self {
        Self(BTreeSet::from([0]))
    }

    /// Build from raw offsets; `None` when empty or any offset is outside the window
    #[must_use]
    pub fn from_offsets<I: IntoIterator<Item = u8>>(offsets: I) -> Option<Self> {
        let set: BTreeSet<u8> = offsets.into_iter().collect();
        if set.is_empty() || set.iter().any(|&offset| offset > MAX_OFFSET) {
            None
        } else {
            Some(Self(set))
        }
    }

    /// Offsets in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves day expressions against a given "today"
pub struct DateResolver;

impl DateResolver {
    /// Resolve an optional day expression into offsets from `today`.
    ///
    /// An absent or blank expression means today. Every term of a list must
    /// resolve; the first failing term fails the whole expression.
    pub fn resolve(expression: Option<&str>, today: NaiveDate) -> Result<DayOffsets> {
        let Some(raw) = expression else {
            return Ok(DayOffsets::today());
        };

        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Ok(DayOffsets::today());
        }

        let mut offsets = BTreeSet::new();
        for term in split_terms(&normalized) {
            match resolve_term(&term, today)? {
                Some(resolved) if !resolved.is_empty() => offsets.extend(resolved),
                _ => {
                    debug!("Unresolvable day term '{}' in '{}'", term, raw);
                    return Err(ForecastChatError::unresolved_date(raw.trim()));
                }
            }
        }

        let offsets = DayOffsets::from_offsets(offsets)
            .ok_or_else(|| ForecastChatError::unresolved_date(raw.trim()))?;
        debug!("Resolved day expression '{}' to {:?}", raw, offsets);
        Ok(offsets)
    }
}

fn normalize(expression: &str) -> String {
    let trimmed = expression.trim().trim_end_matches(['?', '!']);
    // keep the dot of "25.10." but drop a sentence full stop
    let trimmed = match trimmed.strip_suffix('.') {
        Some(rest) if !rest.ends_with(|c: char| c.is_ascii_digit()) => rest,
        _ => trimmed,
    };
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_year(word: &str) -> bool {
    word.len() == 4 && word.chars().all(|c| c.is_ascii_digit())
}

/// Split a list expression into independent terms.
/// A bare year after a comma ("oct 21, 2026") stays attached to its date.
fn split_terms(expression: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for part in expression.split([',', ';']).map(str::trim) {
        if part.is_empty() {
            continue;
        }
        if is_year(part) {
            if let Some(last) = terms.last_mut() {
                last.push(' ');
                last.push_str(part);
                continue;
            }
        }
        if part.starts_with("between ") {
            terms.push(part.to_string());
            continue;
        }
        for piece in part
            .split(" and ")
            .flat_map(|p| p.split(" & "))
            .flat_map(|p| p.split(" or "))
        {
            let piece = strip_fillers(piece.trim());
            if !piece.is_empty() {
                terms.push(piece.to_string());
            }
        }
    }

    terms
}

fn strip_fillers(mut term: &str) -> &str {
    const FILLERS: [&str; 7] = [
        "and ",
        "or ",
        "also ",
        "what about ",
        "how about ",
        "on ",
        "for ",
    ];
    loop {
        match FILLERS.iter().find_map(|filler| term.strip_prefix(*filler)) {
            Some(rest) => term = rest.trim_start(),
            None => return term,
        }
    }
}

fn resolve_term(term: &str, today: NaiveDate) -> Result<Option<Vec<u8>>> {
    if let Some(range) = resolve_range(term, today) {
        return Ok(Some(range));
    }
    if let Some(span) = resolve_span(term, today)? {
        return Ok(Some(span));
    }
    Ok(resolve_single(term, today)?.map(|offset| vec![offset]))
}

/// Offsets `0..count`, clipped to the window
fn window(count: u32) -> Vec<u8> {
    (0..u32::from(FORECAST_DAYS).min(count))
        .filter_map(|offset| u8::try_from(offset).ok())
        .collect()
}

fn in_window(offset: i64) -> Option<u8> {
    u8::try_from(offset).ok().filter(|&o| o <= MAX_OFFSET)
}

fn days_until(from: Weekday, to: Weekday) -> u8 {
    let diff = (to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7;
    u8::try_from(diff).unwrap_or(0)
}

/// Saturday and Sunday of the current (or following) weekend, clipped
fn weekend(today: NaiveDate, following: bool) -> Vec<u8> {
    let mut saturday = match today.weekday() {
        Weekday::Sun => -1,
        weekday => i64::from(days_until(weekday, Weekday::Sat)),
    };
    if following && matches!(today.weekday(), Weekday::Sat | Weekday::Sun) {
        saturday += 7;
    }
    [saturday, saturday + 1]
        .into_iter()
        .filter_map(in_window)
        .collect()
}

fn parse_count(word: &str) -> Option<u32> {
    let count = match word {
        "a" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return word.parse().ok(),
    };
    Some(count)
}

fn resolve_range(term: &str, today: NaiveDate) -> Option<Vec<u8>> {
    let term = term.strip_prefix("the ").unwrap_or(term);

    match term {
        "weekend" | "this weekend" | "coming weekend" | "upcoming weekend" | "over the weekend" => {
            return non_empty(weekend(today, false));
        }
        "next weekend" => return non_empty(weekend(today, true)),
        "week" | "this week" | "whole week" | "entire week" | "all week" | "coming week"
        | "next week" | "week ahead" | "rest of the week" => return Some(window(7)),
        "few days" | "next few days" | "coming days" | "coming few days" | "next days" => {
            return Some(window(3));
        }
        "couple of days" | "next couple of days" | "next couple days" => return Some(window(2)),
        _ => {}
    }

    // "next 3 days", "coming five days", "7 days"
    let rest = term
        .strip_prefix("next ")
        .or_else(|| term.strip_prefix("coming "))
        .unwrap_or(term);
    let count = rest
        .strip_suffix(" days")
        .or_else(|| rest.strip_suffix(" day"))
        .and_then(parse_count)?;
    non_empty(window(count))
}

fn non_empty(offsets: Vec<u8>) -> Option<Vec<u8>> {
    if offsets.is_empty() { None } else { Some(offsets) }
}

/// Contiguous spans: "friday to sunday", "between tuesday and thursday", "until wednesday"
fn resolve_span(term: &str, today: NaiveDate) -> Result<Option<Vec<u8>>> {
    for prefix in ["until ", "till ", "through ", "up to "] {
        if let Some(end) = term.strip_prefix(prefix) {
            return Ok(resolve_single(end, today)?.map(|end| (0..=end).collect()));
        }
    }

    let (body, separators): (&str, &[&str]) = match term.strip_prefix("between ") {
        Some(body) => (body, &[" and "]),
        None => (
            term.strip_prefix("from ").unwrap_or(term),
            &[" to ", " through ", " thru ", " until ", " till ", " - "],
        ),
    };

    let Some((start, end)) = separators.iter().find_map(|sep| body.split_once(*sep)) else {
        return Ok(None);
    };

    let (Some(start), Some(end)) = (
        resolve_single(start.trim(), today)?,
        resolve_single(end.trim(), today)?,
    ) else {
        return Ok(None);
    };

    if end < start {
        return Ok(None);
    }
    Ok(Some((start..=end).collect()))
}

fn strip_time_of_day(term: &str) -> &str {
    [" morning", " afternoon", " evening", " night"]
        .iter()
        .find_map(|suffix| term.strip_suffix(*suffix))
        .unwrap_or(term)
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" | "weds" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// A relative offset given explicitly ("in 3 days"); outside the window is an error
fn explicit_offset(days: i64, today: NaiveDate) -> Result<u8> {
    match in_window(days) {
        Some(offset) => Ok(offset),
        None => {
            let distance = Days::new(days.unsigned_abs());
            let date = if days < 0 {
                today.checked_sub_days(distance)
            } else {
                today.checked_add_days(distance)
            };
            Err(match date {
                Some(date) => ForecastChatError::out_of_range(date, today),
                None => ForecastChatError::unresolved_date(format!("{days} days from today")),
            })
        }
    }
}

fn resolve_single(term: &str, today: NaiveDate) -> Result<Option<u8>> {
    match term {
        "today" | "tonight" | "now" | "right now" | "later" | "later today" | "this morning"
        | "this afternoon" | "this evening" => return Ok(Some(0)),
        _ => {}
    }

    let term = strip_time_of_day(term);
    match term {
        "tomorrow" => return Ok(Some(1)),
        "day after tomorrow" | "the day after tomorrow" | "day after" | "the day after"
        | "the day after that" | "overmorrow" => return Ok(Some(2)),
        "yesterday" | "the day before" => return explicit_offset(-1, today).map(Some),
        _ => {}
    }

    if let Some(days) = relative_days(term) {
        return explicit_offset(days, today).map(Some);
    }

    let weekday_word = ["this ", "next ", "coming ", "upcoming ", "on "]
        .iter()
        .find_map(|prefix| term.strip_prefix(*prefix))
        .unwrap_or(term);
    if let Some(weekday) = parse_weekday(weekday_word) {
        return Ok(Some(days_until(today.weekday(), weekday)));
    }

    resolve_explicit_date(term, today)
}

/// "in 3 days", "in a week", "2 days from now"
fn relative_days(term: &str) -> Option<i64> {
    let body = term
        .strip_prefix("in ")
        .or_else(|| term.strip_suffix(" from now"))?;
    let (count, unit) = body.split_once(' ')?;
    let count = i64::from(parse_count(count)?);
    match unit {
        "day" | "days" => Some(count),
        "week" | "weeks" => Some(count * 7),
        _ => None,
    }
}

/// Explicit calendar date. Candidates that fall inside the window win, the
/// nearest one first; otherwise the candidate closest to today is reported.
fn resolve_explicit_date(term: &str, today: NaiveDate) -> Result<Option<u8>> {
    let candidates = date_candidates(term, today);

    if let Some(offset) = candidates
        .iter()
        .filter_map(|&date| in_window((date - today).num_days()))
        .min()
    {
        return Ok(Some(offset));
    }

    match candidates
        .into_iter()
        .min_by_key(|&date| (date - today).num_days().abs())
    {
        Some(date) => Err(ForecastChatError::out_of_range(date, today)),
        None => Ok(None),
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// "21st" -> "21"
fn strip_ordinal(word: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| {
            word.strip_suffix(*suffix)
                .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        })
        .unwrap_or(word)
}

fn numeric_parts(text: &str, separator: char) -> Option<Vec<u32>> {
    text.split(separator)
        .map(|part| part.parse::<u32>().ok())
        .collect()
}

fn date_candidates(term: &str, today: NaiveDate) -> Vec<NaiveDate> {
    let words: Vec<&str> = term
        .split_whitespace()
        .map(|word| strip_ordinal(word.trim_end_matches(',')))
        .filter(|word| !matches!(*word, "the" | "of" | "on"))
        .collect();
    let cleaned = words.join(" ");
    let this_year = today.year();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return vec![date];
        }
    }

    // 20.10. / 20.10
    if cleaned.contains('.') {
        if let Some(parts) = numeric_parts(cleaned.trim_end_matches('.'), '.') {
            match parts[..] {
                [day, month] => {
                    return [this_year, this_year + 1]
                        .into_iter()
                        .filter_map(|year| ymd(year, month, day))
                        .collect();
                }
                [day, month, year] => {
                    return i32::try_from(year)
                        .ok()
                        .and_then(|year| ymd(year, month, day))
                        .into_iter()
                        .collect();
                }
                _ => {}
            }
        }
    }

    // 10/21/2026, 21/10, ... both day-first and month-first readings
    if cleaned.contains('/') {
        if let Some(parts) = numeric_parts(&cleaned, '/') {
            let (first, second, years) = match parts[..] {
                [a, b] => (a, b, vec![this_year, this_year + 1]),
                [a, b, year] => match i32::try_from(year) {
                    Ok(year) => (a, b, vec![year]),
                    Err(_) => return Vec::new(),
                },
                _ => return Vec::new(),
            };
            return years
                .into_iter()
                .flat_map(|year| [ymd(year, second, first), ymd(year, first, second)])
                .flatten()
                .collect();
        }
    }

    // october 21 / 21 october / oct 21 2026
    if let Some(month) = words.iter().find_map(|word| parse_month(word)) {
        let numbers: Vec<u32> = words.iter().filter_map(|word| word.parse().ok()).collect();
        let (day, years) = match numbers[..] {
            [day] => (day, vec![this_year, this_year + 1]),
            [day, year] if year > 31 => match i32::try_from(year) {
                Ok(year) => (day, vec![year]),
                Err(_) => return Vec::new(),
            },
            [year, day] if year > 31 => match i32::try_from(year) {
                Ok(year) => (day, vec![year]),
                Err(_) => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        if words.len() != numbers.len() + 1 {
            return Vec::new();
        }
        return years
            .into_iter()
            .filter_map(|year| ymd(year, month, day))
            .collect();
    }

    // "the 21st": this month or next month
    if let [word] = words[..] {
        if let Ok(day) = word.parse::<u32>() {
            let first_of_month = today.with_day(1);
            return [0, 1]
                .into_iter()
                .filter_map(|months| first_of_month?.checked_add_months(Months::new(months)))
                .filter_map(|month_start| ymd(month_start.year(), month_start.month(), day))
                .collect();
        }
    }

    Vec::new()
}
