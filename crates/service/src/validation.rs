use chrono::{DateTime, NaiveDate};

use crate::error::{FieldError, ServiceError};

/// Treats `None`, `""` and whitespace-only input alike: absent.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

/// Collects every failed field before reporting, so callers see them all at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn required(&mut self, param: &str, value: Option<String>, msg: &str) -> Option<String> {
        let value = present(value);
        if value.is_none() {
            self.errors.push(FieldError::new(param, msg));
        }
        value
    }

    pub fn required_date(&mut self, param: &str, value: Option<String>, msg: &str) -> Option<NaiveDate> {
        let value = self.required(param, value, msg)?;
        self.date(param, &value)
    }

    pub fn optional_date(&mut self, param: &str, value: Option<String>) -> Option<NaiveDate> {
        let value = present(value)?;
        self.date(param, &value)
    }

    fn date(&mut self, param: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.errors
                .push(FieldError::new(param, &format!("{value} is not a valid date")));
        }
        parsed
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_error(self) -> ServiceError {
        ServiceError::Validation(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_counts_as_missing() {
        assert_eq!(present(Some("  ".to_string())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(parse_date("2020-01-01"), expected);
        assert_eq!(parse_date("2020-01-01T00:00:00Z"), expected);
        assert_eq!(parse_date("last spring"), None);
    }

    #[test]
    fn collects_all_failures() {
        let mut check = Validator::default();
        check.required("title", None, "Title is required");
        check.required_date("from", Some("soon".to_string()), "From Date is required");
        check.optional_date("to", None);

        match check.into_error() {
            ServiceError::Validation(errors) => {
                let params: Vec<&str> = errors.iter().map(|e| e.param.as_str()).collect();
                assert_eq!(params, vec!["title", "from"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
