//! Cart reconciliation for one table.
//!
//! The backend owns the open cart ("temp sale"). `CartView` mirrors it:
//! every mutation is a single write followed by a full reload, so the view
//! never derives state from its own previous contents.

mod http;
mod totals;
mod view;

pub use totals::{change_due, compute_totals, round_money, CartTotals};
pub use view::{CartView, CheckoutOutcome, LineEditor};

use serde::Serialize;

use crate::error::ApiError;
use crate::models::{PayType, SaleTemp};

/// Final payment submitted by checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSale {
    pub table_no: i64,
    pub user_id: i64,
    pub pay_type: PayType,
    pub input_money: f64,
    pub amount: f64,
    pub return_money: f64,
}

/// Temp-sale endpoints the cart view depends on.
///
/// `ApiClient` is the production implementation; tests drive the view with
/// an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait SaleTempBackend {
    /// Every open line visible to this operator, across tables.
    async fn list_lines(&self) -> Result<Vec<SaleTemp>, ApiError>;

    /// Create a line for the food, or bump an existing one.
    async fn add_line(&self, table_no: i64, user_id: i64, food_id: i64) -> Result<(), ApiError>;

    async fn update_qty(&self, line_id: i64, qty: i64) -> Result<(), ApiError>;

    async fn remove_line(&self, line_id: i64) -> Result<(), ApiError>;

    async fn clear_table(&self, table_no: i64, user_id: i64) -> Result<(), ApiError>;

    /// One line with its details and the food type's tastes and sizes.
    async fn line_info(&self, line_id: i64) -> Result<SaleTemp, ApiError>;

    async fn add_detail(&self, line_id: i64) -> Result<(), ApiError>;

    async fn remove_detail(&self, detail_id: i64) -> Result<(), ApiError>;

    async fn select_taste(&self, detail_id: i64, taste_id: i64) -> Result<(), ApiError>;

    async fn unselect_taste(&self, detail_id: i64) -> Result<(), ApiError>;

    async fn select_size(&self, detail_id: i64, size_id: i64) -> Result<(), ApiError>;

    async fn unselect_size(&self, detail_id: i64) -> Result<(), ApiError>;

    async fn end_sale(&self, sale: &EndSale) -> Result<(), ApiError>;

    /// Unpaid itemised bill; returns the rendered document's file name.
    async fn print_draft(&self, table_no: i64, user_id: i64) -> Result<String, ApiError>;

    /// Paid receipt for the sale just ended; returns its file name.
    async fn print_receipt(&self, table_no: i64, user_id: i64) -> Result<String, ApiError>;
}
