use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;

use crate::model::entity::Violation;

pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+$").expect("valid username pattern"));

pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[^\s@"(),:;<>\[\]\\]+@[^\s@"(),:;<>\[\]\\.]+(\.[^\s@"(),:;<>\[\]\\.]+)+$"#)
        .expect("valid email pattern")
});

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 30;

/// Collects violations for one record, field by field.
#[derive(Debug, Default)]
pub struct Rules {
    violations: Vec<Violation>,
}

impl Rules {
    pub fn new() -> Self {
        Rules::default()
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.violations.push(Violation::new(field, message));
        }
        self
    }

    pub fn not_blank(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(field, !value.trim().is_empty(), message)
    }

    /// Character count in `min..=max`. Blank values are left to `not_blank`.
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        let n = value.chars().count();
        self.check(field, (min..=max).contains(&n), message)
    }

    /// Full-match against `re`. Blank values are left to `not_blank`.
    pub fn pattern(&mut self, field: &str, value: &str, re: &Regex, message: &str) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        self.check(field, re.is_match(value), message)
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64, message: &str) -> &mut Self {
        self.check(field, (min..=max).contains(&value), message)
    }

    pub fn past_or_present<Tz: TimeZone>(
        &mut self,
        field: &str,
        at: &DateTime<Tz>,
        now: DateTime<Utc>,
        message: &str,
    ) -> &mut Self {
        self.check(field, at.with_timezone(&Utc) <= now, message)
    }

    /// Whole years from `date` to `today` within `min..=max`.
    pub fn years_elapsed(
        &mut self,
        field: &str,
        date: NaiveDate,
        today: NaiveDate,
        min: u32,
        max: u32,
        message: &str,
    ) -> &mut Self {
        let ok = today
            .years_since(date)
            .is_some_and(|years| (min..=max).contains(&years));
        self.check(field, ok, message)
    }

    pub fn finish(&mut self) -> Vec<Violation> {
        std::mem::take(&mut self.violations)
    }
}

/// A full name: at least two words of two or more characters each, with no
/// doubled spaces, hyphens or apostrophes anywhere.
pub fn is_person_name(value: &str) -> bool {
    if value.contains("  ") || value.contains("--") || value.contains("''") {
        return false;
    }
    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return false;
    }
    let words: Vec<&str> = value.split_whitespace().collect();
    words.len() >= 2 && words.iter().all(|w| w.chars().count() >= 2)
}
