use serde::Serialize;
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::error::ApiError;
use crate::expenses::dto::DateRange;
use crate::expenses::repo::{Category, Expense};

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub total: f64,
    pub count: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DayTotal {
    pub date: String,
    pub total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub year: i32,
    pub total_expenses: f64,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub expenses_by_day: Vec<DayTotal>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryStats {
    pub category: Category,
    pub total: f64,
    pub count: u32,
    pub percentage: f64,
}

/// Closed interval covering a calendar month in UTC: first day 00:00:00
/// through last day 23:59:59. Rejects months outside 1..=12 and years the
/// calendar cannot represent.
pub fn month_window(year: i32, month: u8) -> Result<(Month, DateRange), ApiError> {
    let month = Month::try_from(month)
        .map_err(|_| ApiError::validation(format!("Invalid month: {month}")))?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| ApiError::validation(format!("Invalid year: {year}")))?;
    let last = Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
        .map_err(|_| ApiError::validation(format!("Invalid year: {year}")))?;
    let start = first.midnight().assume_utc();
    let end = last
        .with_hms(23, 59, 59)
        .map_err(|_| ApiError::validation("Invalid month window"))?
        .assume_utc();
    Ok((month, DateRange::between(start, end)))
}

fn day_key(at: OffsetDateTime) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    at.to_offset(UtcOffset::UTC)
        .date()
        .format(&fmt)
        .unwrap_or_default()
}

/// Groups by category in first-occurrence order, accumulating (sum, count).
fn group_by_category(expenses: &[Expense]) -> Vec<CategoryBreakdown> {
    let mut groups: Vec<CategoryBreakdown> = Vec::new();
    for exp in expenses {
        match groups.iter_mut().find(|g| g.category == exp.category) {
            Some(group) => {
                group.total += exp.amount;
                group.count += 1;
            }
            None => groups.push(CategoryBreakdown {
                category: exp.category,
                total: exp.amount,
                count: 1,
            }),
        }
    }
    groups
}

/// O(n) aggregation over one user's expenses for one month.
pub fn monthly_summary(year: i32, month: Month, expenses: &[Expense]) -> MonthlySummary {
    let total_expenses = expenses.iter().map(|e| e.amount).sum();
    let category_breakdown = group_by_category(expenses);

    let mut days: Vec<DayTotal> = Vec::new();
    for exp in expenses {
        let key = day_key(exp.date);
        match days.iter_mut().find(|d| d.date == key) {
            Some(day) => day.total += exp.amount,
            None => days.push(DayTotal {
                date: key,
                total: exp.amount,
            }),
        }
    }
    days.sort_by(|a, b| a.date.cmp(&b.date));

    MonthlySummary {
        month: month.to_string(),
        year,
        total_expenses,
        category_breakdown,
        expenses_by_day: days,
    }
}

/// Per-category share of the grand total. Percentages are 0 when there are
/// no matching expenses, never NaN.
pub fn category_stats(expenses: &[Expense]) -> Vec<CategoryStats> {
    let grand_total: f64 = expenses.iter().map(|e| e.amount).sum();
    group_by_category(expenses)
        .into_iter()
        .map(|g| CategoryStats {
            percentage: if grand_total > 0.0 {
                g.total / grand_total * 100.0
            } else {
                0.0
            },
            category: g.category,
            total: g.total,
            count: g.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn expense(amount: f64, category: Category, date: OffsetDateTime) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            amount,
            category,
            description: "test".into(),
            date,
            created_at: date,
            updated_at: date,
        }
    }

    fn january_sample() -> Vec<Expense> {
        vec![
            expense(100.0, Category::Food, datetime!(2025-01-05 10:00 UTC)),
            expense(50.0, Category::Food, datetime!(2025-01-20 18:00 UTC)),
            expense(30.0, Category::Transport, datetime!(2025-01-10 08:00 UTC)),
        ]
    }

    #[test]
    fn summary_totals_and_groups() {
        let summary = monthly_summary(2025, Month::January, &january_sample());
        assert_eq!(summary.month, "January");
        assert_eq!(summary.year, 2025);
        assert!((summary.total_expenses - 180.0).abs() < f64::EPSILON);

        let food = summary
            .category_breakdown
            .iter()
            .find(|g| g.category == Category::Food)
            .unwrap();
        assert_eq!((food.total, food.count), (150.0, 2));
        let transport = summary
            .category_breakdown
            .iter()
            .find(|g| g.category == Category::Transport)
            .unwrap();
        assert_eq!((transport.total, transport.count), (30.0, 1));
    }

    #[test]
    fn summary_days_sorted_ascending() {
        let summary = monthly_summary(2025, Month::January, &january_sample());
        assert_eq!(
            summary.expenses_by_day,
            vec![
                DayTotal {
                    date: "2025-01-05".into(),
                    total: 100.0
                },
                DayTotal {
                    date: "2025-01-10".into(),
                    total: 30.0
                },
                DayTotal {
                    date: "2025-01-20".into(),
                    total: 50.0
                },
            ]
        );
    }

    #[test]
    fn summary_invariants_hold() {
        let summary = monthly_summary(2025, Month::January, &january_sample());
        let by_category: f64 = summary.category_breakdown.iter().map(|g| g.total).sum();
        let by_day: f64 = summary.expenses_by_day.iter().map(|d| d.total).sum();
        assert!((by_category - summary.total_expenses).abs() < 1e-9);
        assert!((by_day - summary.total_expenses).abs() < 1e-9);
    }

    #[test]
    fn summary_over_zero_records_is_empty_not_an_error() {
        let summary = monthly_summary(2025, Month::March, &[]);
        assert_eq!(summary.total_expenses, 0.0);
        assert!(summary.category_breakdown.is_empty());
        assert!(summary.expenses_by_day.is_empty());
    }

    #[test]
    fn same_day_expenses_merge_into_one_bucket() {
        let expenses = vec![
            expense(10.0, Category::Food, datetime!(2025-02-01 08:00 UTC)),
            expense(15.0, Category::Shopping, datetime!(2025-02-01 20:00 UTC)),
        ];
        let summary = monthly_summary(2025, Month::February, &expenses);
        assert_eq!(summary.expenses_by_day.len(), 1);
        assert_eq!(summary.expenses_by_day[0].total, 25.0);
    }

    #[test]
    fn stats_percentages() {
        let stats = category_stats(&january_sample());
        let food = stats.iter().find(|s| s.category == Category::Food).unwrap();
        assert!((food.percentage - 83.333333).abs() < 1e-4);
        assert_eq!((food.total, food.count), (150.0, 2));
        let transport = stats
            .iter()
            .find(|s| s.category == Category::Transport)
            .unwrap();
        assert!((transport.percentage - 16.666666).abs() < 1e-4);

        let sum: f64 = stats.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn stats_on_empty_input_are_empty_with_zero_percentages() {
        assert!(category_stats(&[]).is_empty());
    }

    #[test]
    fn category_groups_keep_first_occurrence_order() {
        let expenses = vec![
            expense(1.0, Category::Other, datetime!(2025-01-02 00:00 UTC)),
            expense(2.0, Category::Food, datetime!(2025-01-03 00:00 UTC)),
            expense(3.0, Category::Other, datetime!(2025-01-04 00:00 UTC)),
        ];
        let groups = group_by_category(&expenses);
        assert_eq!(groups[0].category, Category::Other);
        assert_eq!(groups[0].total, 4.0);
        assert_eq!(groups[1].category, Category::Food);
    }

    #[test]
    fn month_window_covers_whole_month() {
        let (month, range) = month_window(2025, 1).unwrap();
        assert_eq!(month, Month::January);
        assert_eq!(range.start, Some(datetime!(2025-01-01 00:00 UTC)));
        assert_eq!(range.end, Some(datetime!(2025-01-31 23:59:59 UTC)));
    }

    #[test]
    fn month_window_handles_leap_february() {
        let (_, range) = month_window(2024, 2).unwrap();
        assert_eq!(range.end, Some(datetime!(2024-02-29 23:59:59 UTC)));
    }

    #[test]
    fn month_window_rejects_out_of_range_input() {
        assert!(month_window(2025, 0).is_err());
        assert!(month_window(2025, 13).is_err());
        assert!(month_window(-999_999, 1).is_err());
    }
}
