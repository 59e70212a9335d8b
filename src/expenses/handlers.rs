use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    expenses::{
        dto::{
            parse_date_param, CreateExpenseRequest, DateRangeQuery, SummaryQuery,
            UpdateExpenseRequest,
        },
        repo::Expense,
        summary::{self, CategoryStats, MonthlySummary},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses/summary", get(get_summary))
        .route("/expenses/stats", get(get_stats))
        .route("/expenses/:id", get(get_expense))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    payload.validate()?;
    let date = payload.date.as_deref().map(parse_date_param).transpose()?;

    let expense = Expense::create(
        &state.db,
        user_id,
        payload.amount,
        payload.category,
        payload.description.trim(),
        date,
    )
    .await?;

    info!(user_id = %user_id, expense_id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let range = query.into_range()?;
    let expenses = Expense::list_for_user(&state.db, user_id, &range).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state))]
pub async fn get_expense(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Expense>, ApiError> {
    let expense = Expense::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Expense"))?;
    Ok(Json(expense))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let changes = payload.into_changes()?;
    let expense = Expense::update(&state.db, user_id, id, changes)
        .await?
        .ok_or(ApiError::NotFound("Expense"))?;

    info!(user_id = %user_id, expense_id = %expense.id, "expense updated");
    Ok(Json(expense))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !Expense::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Expense"));
    }
    info!(user_id = %user_id, expense_id = %id, "expense deleted");
    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}

/// GET /expenses/summary?year&month — defaults to the current UTC month.
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let year = query.year.unwrap_or(now.year());
    let month = query.month.unwrap_or(u8::from(now.month()));

    let (month, window) = summary::month_window(year, month)?;
    let expenses = Expense::list_for_user(&state.db, user_id, &window).await?;
    Ok(Json(summary::monthly_summary(year, month, &expenses)))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<CategoryStats>>, ApiError> {
    let range = query.into_range()?;
    let expenses = Expense::list_for_user(&state.db, user_id, &range).await?;
    Ok(Json(summary::category_stats(&expenses)))
}
