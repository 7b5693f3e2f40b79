use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::config::parse_utc_offset;
use crate::model::entity::{Entity, RecordId, UniqueKey, ValidationContext, Violation};
use crate::ops::validate::{EMAIL_RE, Rules, USERNAME_MAX, USERNAME_MIN, USERNAME_RE, is_person_name};

pub const USER_INACTIVE: u8 = 0;
pub const USER_ACTIVE: u8 = 1;
pub const USER_SUSPENDED: u8 = 2;

/// Oldest plausible account holder, in years.
const MAX_AGE_YEARS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Gender> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhoneNumberType {
    Mobile,
    FixedLine,
    FixedLineOrMobile,
    Voip,
    Unknown,
}

/// A phone number split into its dialing parts.
///
/// Two numbers are the same subscriber when their `Display` forms match,
/// which is how the `phoneNumber` unique key compares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    /// ISO 3166 region, e.g. `BD`
    pub country_code: String,
    /// Dialing prefix without `+`, e.g. `880`
    pub country_calling_code: String,
    pub national_number: String,
    pub number_type: PhoneNumberType,
}

impl PhoneNumber {
    pub fn new(
        country_code: impl Into<String>,
        country_calling_code: impl Into<String>,
        national_number: impl Into<String>,
        number_type: PhoneNumberType,
    ) -> Self {
        PhoneNumber {
            country_code: country_code.into().to_ascii_uppercase(),
            country_calling_code: country_calling_code.into().trim_start_matches('+').to_string(),
            national_number: strip_formatting(&national_number.into()),
            number_type,
        }
    }

    /// Parse `CC:CALLING:NUMBER`, e.g. `BD:880:01712345678`. Leading zeros
    /// of the national number are trunk prefixes and are dropped.
    pub fn parse(s: &str) -> Option<PhoneNumber> {
        let mut parts = s.splitn(3, ':');
        let region = parts.next()?.trim();
        let calling = parts.next()?.trim();
        let national = parts.next()?.trim();
        let national = strip_formatting(national);
        let national = national.trim_start_matches('0');
        if region.is_empty() || calling.is_empty() || national.is_empty() {
            return None;
        }
        Some(PhoneNumber::new(region, calling, national, PhoneNumberType::Mobile))
    }

    fn violations(&self, rules: &mut Rules) {
        let cc = &self.country_code;
        rules.check(
            "phoneNumber",
            cc.len() == 2 && cc.chars().all(|c| c.is_ascii_uppercase()),
            "Country code should be 2 characters long",
        );
        let calling = &self.country_calling_code;
        rules.check(
            "phoneNumber",
            (1..=4).contains(&calling.len()) && calling.chars().all(|c| c.is_ascii_digit()),
            "Invalid country calling code",
        );
        let national = &self.national_number;
        rules.not_blank("phoneNumber", national, "National number cannot be blank");
        if !national.is_empty() {
            rules.check(
                "phoneNumber",
                (4..=14).contains(&national.len()) && national.chars().all(|c| c.is_ascii_digit()),
                "Invalid phone number",
            );
        }
    }
}

/// E.164 form: `+<calling code><national number>`
impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}{}", self.country_calling_code, self.national_number)
    }
}

fn strip_formatting(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

/// An account holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: RecordId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_number: PhoneNumber,
    pub timezone: String,
    pub added_at: DateTime<FixedOffset>,
    pub status: u8,
}

impl User {
    /// Build an unsaved, active user stamped with `added_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        phone_number: PhoneNumber,
        timezone: impl Into<String>,
        added_at: DateTime<FixedOffset>,
    ) -> Self {
        User {
            user_id: 0,
            name: name.into(),
            date_of_birth,
            gender: None,
            username: username.into(),
            password: password.into(),
            email: email.into(),
            phone_number,
            timezone: timezone.into(),
            added_at,
            status: USER_ACTIVE,
        }
    }

    /// The user's own offset, if the stored setting parses.
    pub fn offset(&self) -> Option<FixedOffset> {
        parse_utc_offset(&self.timezone)
    }

    fn username_key(user: &User) -> Option<String> {
        Some(user.username.clone()).filter(|s| !s.is_empty())
    }

    fn email_key(user: &User) -> Option<String> {
        Some(user.email.clone()).filter(|s| !s.is_empty())
    }

    fn phone_key(user: &User) -> Option<String> {
        Some(user.phone_number.to_string()).filter(|_| !user.phone_number.national_number.is_empty())
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    const UNIQUE_KEYS: &'static [UniqueKey<Self>] = &[
        UniqueKey {
            field: "username",
            value: User::username_key,
        },
        UniqueKey {
            field: "email",
            value: User::email_key,
        },
        UniqueKey {
            field: "phoneNumber",
            value: User::phone_key,
        },
    ];

    fn id(&self) -> RecordId {
        self.user_id
    }

    fn set_id(&mut self, id: RecordId) {
        self.user_id = id;
    }

    fn validate(&self, ctx: &ValidationContext) -> Vec<Violation> {
        let mut rules = Rules::new();
        rules
            .not_blank("name", &self.name, "Name required")
            .check(
                "name",
                self.name.trim().is_empty() || is_person_name(&self.name),
                "Please enter your full name",
            )
            .years_elapsed(
                "dateOfBirth",
                self.date_of_birth,
                ctx.today(),
                ctx.min_age_years,
                MAX_AGE_YEARS,
                &format!("You must be at least {} years old", ctx.min_age_years),
            )
            .not_blank("username", &self.username, "Username required")
            .length(
                "username",
                &self.username,
                USERNAME_MIN,
                USERNAME_MAX,
                "Username should be at least 4 characters long and less than 30",
            )
            .pattern(
                "username",
                &self.username,
                &USERNAME_RE,
                "Username can only contain letters (a-z) and digits (0-9)",
            )
            .not_blank("password", &self.password, "Password required")
            .not_blank("email", &self.email, "Email required")
            .pattern("email", &self.email, &EMAIL_RE, "Please enter a valid email address");
        self.phone_number.violations(&mut rules);
        rules
            .check("timezone", self.offset().is_some(), "Invalid timezone")
            .past_or_present(
                "addedAt",
                &self.added_at,
                ctx.now,
                "Account creation date should be in the past",
            )
            .range(
                "status",
                i64::from(self.status),
                i64::from(USER_INACTIVE),
                i64::from(USER_SUSPENDED),
                "Invalid status",
            );
        rules.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ValidationContext {
        ValidationContext::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(), 13)
    }

    fn alice() -> User {
        let offset = FixedOffset::east_opt(6 * 3600).unwrap();
        User::new(
            "Alice Liddell",
            NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
            "alice",
            "s3cret!Pass",
            "alice@example.com",
            PhoneNumber::parse("BD:880:01712345678").unwrap(),
            "+06:00",
            offset.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn valid_user_has_no_violations() {
        assert_eq!(alice().validate(&ctx()), vec![]);
    }

    #[test]
    fn phone_number_canonical_form() {
        let a = PhoneNumber::parse("BD:880:01712345678").unwrap();
        let b = PhoneNumber::new("bd", "+880", "1712-345 678", PhoneNumberType::Mobile);
        assert_eq!(a.to_string(), "+8801712345678");
        assert_eq!(a.to_string(), b.to_string());
        assert!(PhoneNumber::parse("BD:880").is_none());
        assert!(PhoneNumber::parse("BD:880:000").is_none());
    }

    #[test]
    fn reports_every_broken_field() {
        let mut user = alice();
        user.name = "Alice".into();
        user.username = "Al".into();
        user.email = "not-an-email".into();
        user.timezone = "Mars/Olympus".into();
        user.status = 9;
        user.date_of_birth = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let violations = user.validate(&ctx());
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "dateOfBirth",
                "username",
                "username",
                "email",
                "timezone",
                "status"
            ]
        );
    }

    #[test]
    fn unique_keys_render_canonical_values() {
        let user = alice();
        let rendered: Vec<(&str, Option<String>)> = User::UNIQUE_KEYS
            .iter()
            .map(|k| (k.field, (k.value)(&user)))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("username", Some("alice".to_string())),
                ("email", Some("alice@example.com".to_string())),
                ("phoneNumber", Some("+8801712345678".to_string())),
            ]
        );
    }

    #[test]
    fn json_keys_are_camel_case() {
        let mut user = alice();
        user.gender = Some(Gender::Female);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["userId"], 0);
        assert_eq!(value["dateOfBirth"], "1995-03-14");
        assert_eq!(value["gender"], "FEMALE");
        assert_eq!(value["phoneNumber"]["countryCallingCode"], "880");
        assert_eq!(value["phoneNumber"]["numberType"], "MOBILE");
        assert_eq!(value["addedAt"], "2024-05-01T09:00:00+06:00");
        assert_eq!(value["status"], 1);
    }
}
