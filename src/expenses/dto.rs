use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime};

use crate::error::ApiError;
use crate::expenses::repo::{Category, ExpenseChanges};

/// Date filter with independently optional lower and upper bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Accepts either a plain calendar date (`2025-01-10`, midnight UTC) or a
/// full RFC 3339 timestamp.
pub fn parse_date_param(value: &str) -> Result<OffsetDateTime, ApiError> {
    let date_only = time::macros::format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(value, &date_only) {
        return Ok(date.midnight().assume_utc());
    }
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|_| ApiError::validation(format!("Invalid date: {value}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn into_range(self) -> Result<DateRange, ApiError> {
        let start = self.start_date.as_deref().map(parse_date_param).transpose()?;
        let end = self.end_date.as_deref().map(parse_date_param).transpose()?;
        Ok(DateRange { start, end })
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: Option<String>,
}

impl CreateExpenseRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_amount(self.amount)?;
        validate_description(&self.description)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl UpdateExpenseRequest {
    pub fn into_changes(self) -> Result<ExpenseChanges, ApiError> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        let date = self.date.as_deref().map(parse_date_param).transpose()?;
        Ok(ExpenseChanges {
            amount: self.amount,
            category: self.category,
            description: self.description.map(|d| d.trim().to_string()),
            date,
        })
    }
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount < 0.01 {
        return Err(ApiError::validation("Amount must be at least 0.01"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.trim().is_empty() {
        return Err(ApiError::validation("Description is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_calendar_date_as_midnight_utc() {
        assert_eq!(
            parse_date_param("2025-01-10").unwrap(),
            datetime!(2025-01-10 00:00 UTC)
        );
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        assert_eq!(
            parse_date_param("2025-01-10T15:30:00Z").unwrap(),
            datetime!(2025-01-10 15:30 UTC)
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date_param("10/01/2025").is_err());
        assert!(parse_date_param("yesterday").is_err());
    }

    #[test]
    fn range_query_bounds_are_independent() {
        let open_ended = DateRangeQuery {
            start_date: Some("2025-01-10".into()),
            end_date: None,
        }
        .into_range()
        .unwrap();
        assert_eq!(open_ended.start, Some(datetime!(2025-01-10 00:00 UTC)));
        assert_eq!(open_ended.end, None);

        let empty = DateRangeQuery {
            start_date: None,
            end_date: None,
        }
        .into_range()
        .unwrap();
        assert_eq!(empty, DateRange::default());
    }

    #[test]
    fn create_request_validation() {
        let ok = CreateExpenseRequest {
            amount: 10.0,
            category: Category::Food,
            description: "Lunch".into(),
            date: None,
        };
        assert!(ok.validate().is_ok());

        let too_small = CreateExpenseRequest { amount: 0.0, ..dummy() };
        assert!(too_small.validate().is_err());

        let nan = CreateExpenseRequest {
            amount: f64::NAN,
            ..dummy()
        };
        assert!(nan.validate().is_err());

        let blank = CreateExpenseRequest {
            description: "   ".into(),
            ..dummy()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn update_request_skips_absent_fields() {
        let changes = UpdateExpenseRequest {
            amount: None,
            category: Some(Category::Other),
            description: None,
            date: None,
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.amount, None);
        assert_eq!(changes.category, Some(Category::Other));
        assert_eq!(changes.description, None);
    }

    #[test]
    fn update_request_still_validates_present_fields() {
        let bad = UpdateExpenseRequest {
            amount: Some(-5.0),
            category: None,
            description: None,
            date: None,
        };
        assert!(bad.into_changes().is_err());
    }

    fn dummy() -> CreateExpenseRequest {
        CreateExpenseRequest {
            amount: 1.0,
            category: Category::Food,
            description: "x".into(),
            date: None,
        }
    }
}
