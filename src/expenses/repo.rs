use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::expenses::dto::DateRange;

/// Closed set of expense classifications. Stored as the Postgres enum
/// `expense_category`, serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "expense_category", rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Entertainment,
    Healthcare,
    Shopping,
    Education,
    Other,
}

/// Expense record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default)]
pub struct ExpenseChanges {
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
}

const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, description, date, created_at, updated_at";

impl Expense {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        amount: f64,
        category: Category,
        description: &str,
        date: Option<OffsetDateTime>,
    ) -> anyhow::Result<Expense> {
        let date = date.unwrap_or_else(OffsetDateTime::now_utc);
        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses (user_id, amount, category, description, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EXPENSE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(amount)
        .bind(category)
        .bind(description)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(expense)
    }

    /// All expenses for a user within an optional date range, newest first.
    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        range: &DateRange,
    ) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR date >= $2)
              AND ($3::timestamptz IS NULL OR date <= $3)
            ORDER BY date DESC
            "#,
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// `None` covers both a missing id and another user's expense.
    pub async fn find_by_id(
        db: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> anyhow::Result<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE id = $1 AND user_id = $2
            "#,
        ))
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(expense)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
        changes: ExpenseChanges,
    ) -> anyhow::Result<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            UPDATE expenses SET
                amount = COALESCE($3, amount),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                date = COALESCE($6, date),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {EXPENSE_COLUMNS}
            "#,
        ))
        .bind(expense_id)
        .bind(user_id)
        .bind(changes.amount)
        .bind(changes.category)
        .bind(changes.description)
        .bind(changes.date)
        .fetch_optional(db)
        .await?;
        Ok(expense)
    }

    /// Returns whether a row was deleted; repeating a delete is not an error.
    pub async fn delete(db: &PgPool, user_id: Uuid, expense_id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            DELETE FROM expenses
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(deleted.is_some())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Healthcare).unwrap(),
            r#""healthcare""#
        );
        assert_eq!(
            serde_json::from_str::<Category>(r#""food""#).unwrap(),
            Category::Food
        );
    }

    #[test]
    fn category_rejects_unknown_values() {
        assert!(serde_json::from_str::<Category>(r#""groceries""#).is_err());
    }

    #[test]
    fn expense_json_is_camel_case_rfc3339() {
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: 42.5,
            category: Category::Transport,
            description: "Bus pass".into(),
            date: time::macros::datetime!(2025-01-10 00:00 UTC),
            created_at: time::macros::datetime!(2025-01-10 12:00 UTC),
            updated_at: time::macros::datetime!(2025-01-10 12:00 UTC),
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["userId"], serde_json::json!(expense.user_id));
        assert!(json["date"]
            .as_str()
            .unwrap()
            .starts_with("2025-01-10T00:00:00"));
        assert!(json.get("createdAt").is_some());
    }
}
