//! Sales reports and paid-bill history.
//!
//! Aggregation is done by the backend; the client only sums the returned
//! rows for the headline figures.

use chrono::{Datelike, NaiveDate};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::api::ApiClient;
use crate::cart::round_money;
use crate::error::ApiError;
use crate::models::{BillSale, DayReport, MonthReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<DayReport>,
    pub total: f64,
    pub days_with_sales: usize,
    pub best_day: Option<DayReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub year: i32,
    pub rows: Vec<MonthReport>,
    pub total: f64,
    pub best_month: Option<MonthReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillHistory {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub bills: Vec<BillSale>,
    pub total: f64,
}

fn validate_period(year: i32, month: Option<u32>) -> Result<(), ApiError> {
    let month = month.unwrap_or(1);
    if year < 2000 || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(ApiError::validation(format!(
            "Invalid report period {year}-{month:02}"
        )));
    }
    Ok(())
}

fn sum_amounts<'a>(amounts: impl Iterator<Item = &'a f64>) -> f64 {
    round_money(amounts.sum())
}

pub fn summarize_days(year: i32, month: u32, rows: Vec<DayReport>) -> DailySales {
    let total = sum_amounts(rows.iter().map(|r| &r.amount));
    let days_with_sales = rows.iter().filter(|r| r.amount > 0.0).count();
    let best_day = rows
        .iter()
        .filter(|r| r.amount > 0.0)
        .max_by(|a, b| a.amount.total_cmp(&b.amount))
        .cloned();
    DailySales {
        year,
        month,
        rows,
        total,
        days_with_sales,
        best_day,
    }
}

pub fn summarize_months(year: i32, rows: Vec<MonthReport>) -> MonthlySales {
    let total = sum_amounts(rows.iter().map(|r| &r.amount));
    let best_month = rows
        .iter()
        .filter(|r| r.amount > 0.0)
        .max_by(|a, b| a.amount.total_cmp(&b.amount))
        .cloned();
    MonthlySales {
        year,
        rows,
        total,
        best_month,
    }
}

pub async fn sales_per_day(api: &ApiClient, year: i32, month: u32) -> Result<DailySales, ApiError> {
    validate_period(year, Some(month))?;
    let path = format!("/api/report/report-sum-sale-per-day/{year}/{month}");
    let rows: Vec<DayReport> = api.get_data(&path).await?;
    let summary = summarize_days(year, month, rows);
    info!(year, month, total = summary.total, "daily sales loaded");
    Ok(summary)
}

pub async fn sales_per_month(api: &ApiClient, year: i32) -> Result<MonthlySales, ApiError> {
    validate_period(year, None)?;
    let path = format!("/api/report/report-sum-sale-per-month/{year}");
    let rows: Vec<MonthReport> = api.get_data(&path).await?;
    let summary = summarize_months(year, rows);
    info!(year, total = summary.total, "monthly sales loaded");
    Ok(summary)
}

/// Paid bills between two dates, inclusive.
pub async fn list_bills(
    api: &ApiClient,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BillHistory, ApiError> {
    if from > to {
        return Err(ApiError::validation("Start date must not be after end date"));
    }
    let body = json!({
        "startDate": from.format("%Y-%m-%d").to_string(),
        "endDate": to.format("%Y-%m-%d").to_string(),
    });
    let bills: Vec<BillSale> = api
        .request_data(Method::POST, "/api/bill-sale/list", Some(&body))
        .await?;
    let total = sum_amounts(bills.iter().map(|b| &b.amount));
    Ok(BillHistory {
        from,
        to,
        bills,
        total,
    })
}

pub async fn cancel_bill(api: &ApiClient, bill_id: i64) -> Result<(), ApiError> {
    api.send(
        Method::DELETE,
        "/api/bill-sale/delete",
        Some(&json!({ "id": bill_id })),
    )
    .await?;
    info!(bill_id, "bill cancelled");
    Ok(())
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(first);
    (first, last)
}
