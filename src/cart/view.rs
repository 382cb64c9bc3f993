//! Client-side mirror of one table's open cart.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::totals::{change_due, compute_totals, CartTotals};
use super::{EndSale, SaleTempBackend};
use crate::error::{ApiError, CartError};
use crate::models::{FoodSize, PayType, SaleTemp, SaleTempDetail, Taste};
use crate::notice::{Notice, Notices};
use crate::session::SessionContext;

/// Side panel for one line's per-unit customisation.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEditor {
    pub line: SaleTemp,
    /// Tastes offered by the line's food type.
    pub tastes: Vec<Taste>,
    /// Sizes (with surcharge) offered by the line's food type.
    pub sizes: Vec<FoodSize>,
}

impl LineEditor {
    fn from_info(mut line: SaleTemp) -> Self {
        let food_type = line.food.food_type_info.take().unwrap_or_default();
        Self {
            line,
            tastes: food_type.tastes,
            sizes: food_type.food_sizes,
        }
    }

    pub fn line_id(&self) -> i64 {
        self.line.id
    }

    pub fn details(&self) -> &[SaleTempDetail] {
        &self.line.details
    }

    fn has_detail(&self, detail_id: i64) -> bool {
        self.line.details.iter().any(|d| d.id == detail_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub amount: f64,
    pub tendered: f64,
    pub change: f64,
    /// Receipt document, when receipt generation succeeded.
    pub receipt: Option<String>,
}

pub struct CartView<B> {
    backend: B,
    session: Arc<SessionContext>,
    table_no: i64,
    lines: Vec<SaleTemp>,
    totals: CartTotals,
    editor: Option<LineEditor>,
    notices: Notices,
}

impl<B: SaleTempBackend> CartView<B> {
    /// An empty view; call `refresh` to load the table.
    pub fn new(backend: B, session: Arc<SessionContext>, table_no: i64) -> Self {
        Self {
            backend,
            session,
            table_no,
            lines: Vec::new(),
            totals: CartTotals::default(),
            editor: None,
            notices: Notices::default(),
        }
    }

    // -- read side ----------------------------------------------------------

    pub fn table_no(&self) -> i64 {
        self.table_no
    }

    pub fn lines(&self) -> &[SaleTemp] {
        &self.lines
    }

    pub fn line(&self, line_id: i64) -> Option<&SaleTemp> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn total(&self) -> f64 {
        self.totals.total()
    }

    pub fn editor(&self) -> Option<&LineEditor> {
        self.editor.as_ref()
    }

    /// Whether the qty +/- controls for this line are enabled.
    pub fn can_edit_qty(&self, line_id: i64) -> bool {
        self.line(line_id).is_some_and(|l| !l.is_locked())
    }

    /// Whether the confirm button of the checkout dialog is enabled.
    pub fn can_checkout(&self, tendered: f64) -> bool {
        !self.lines.is_empty() && self.totals.covered_by(tendered)
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -- reload -------------------------------------------------------------

    /// Re-fetch this table's lines and recompute totals.
    pub async fn refresh(&mut self) -> Result<(), CartError> {
        self.reload_lines("Load cart").await
    }

    async fn reload_lines(&mut self, action: &str) -> Result<(), CartError> {
        let fetched = self.backend.list_lines().await;
        let all = self.settle(action, fetched)?;
        let table_no = self.table_no;
        self.lines = all.into_iter().filter(|l| l.table_no == table_no).collect();
        self.totals = compute_totals(&self.lines);
        debug!(
            table_no,
            lines = self.lines.len(),
            total = self.totals.total(),
            "cart reloaded"
        );
        Ok(())
    }

    async fn reload_editor(&mut self, action: &str) -> Result<(), CartError> {
        let Some(line_id) = self.editor.as_ref().map(LineEditor::line_id) else {
            return Ok(());
        };
        let fetched = self.backend.line_info(line_id).await;
        let info = self.settle(action, fetched)?;
        self.editor = Some(LineEditor::from_info(info));
        Ok(())
    }

    // -- line operations ----------------------------------------------------

    pub async fn add_item(&mut self, food_id: i64) -> Result<(), CartError> {
        let user_id = self.operator()?;
        let result = self.backend.add_line(self.table_no, user_id, food_id).await;
        self.settle("Add item failed", result)?;
        self.reload_lines("Reload cart failed").await?;
        self.notices.success("Item added");
        Ok(())
    }

    /// Set a line's quantity. Locked lines and negative quantities are
    /// refused without a request.
    pub async fn change_qty(&mut self, line_id: i64, new_qty: i64) -> Result<(), CartError> {
        let Some(line) = self.line(line_id) else {
            return Err(self.reject(format!("Line {line_id} is not in this cart")));
        };
        if line.is_locked() {
            return Err(self.reject("Quantity is fixed once a line has detail slots"));
        }
        if new_qty < 0 {
            return Err(self.reject("Quantity cannot go below zero"));
        }

        let result = self.backend.update_qty(line_id, new_qty).await;
        self.settle("Update quantity failed", result)?;
        self.reload_lines("Reload cart failed").await
    }

    pub async fn increment(&mut self, line_id: i64) -> Result<(), CartError> {
        let qty = self.line(line_id).map(|l| l.qty).unwrap_or(0);
        self.change_qty(line_id, qty + 1).await
    }

    pub async fn decrement(&mut self, line_id: i64) -> Result<(), CartError> {
        let qty = self.line(line_id).map(|l| l.qty).unwrap_or(0);
        self.change_qty(line_id, qty - 1).await
    }

    pub async fn remove_line(&mut self, line_id: i64) -> Result<(), CartError> {
        let result = self.backend.remove_line(line_id).await;
        self.settle("Remove item failed", result)?;
        if self.editor.as_ref().is_some_and(|e| e.line_id() == line_id) {
            self.editor = None;
        }
        self.reload_lines("Reload cart failed").await?;
        self.notices.success("Item removed");
        Ok(())
    }

    /// Bulk-delete every line this operator has on the table.
    pub async fn clear_table(&mut self) -> Result<(), CartError> {
        let user_id = self.operator()?;
        let result = self.backend.clear_table(self.table_no, user_id).await;
        self.settle("Clear table failed", result)?;
        self.editor = None;
        self.reload_lines("Reload cart failed").await?;
        self.notices.success("Table cleared");
        Ok(())
    }

    // -- detail editor ------------------------------------------------------

    pub async fn open_detail(&mut self, line_id: i64) -> Result<(), CartError> {
        let fetched = self.backend.line_info(line_id).await;
        let info = self.settle("Load line detail failed", fetched)?;
        self.editor = Some(LineEditor::from_info(info));
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.editor = None;
    }

    /// Add one customisation slot under the open line. The line becomes
    /// locked, so both the detail and the line list are reloaded.
    pub async fn add_detail_slot(&mut self) -> Result<(), CartError> {
        let line_id = self.open_line_id()?;
        let result = self.backend.add_detail(line_id).await;
        self.settle("Add detail failed", result)?;
        self.reload_lines("Reload cart failed").await?;
        self.reload_editor("Reload line detail failed").await?;
        self.notices.success("Detail added");
        Ok(())
    }

    pub async fn remove_detail_slot(&mut self, detail_id: i64) -> Result<(), CartError> {
        self.open_detail_slot(detail_id)?;
        let result = self.backend.remove_detail(detail_id).await;
        self.settle("Remove detail failed", result)?;
        self.reload_lines("Reload cart failed").await?;
        self.reload_editor("Reload line detail failed").await?;
        self.notices.success("Detail removed");
        Ok(())
    }

    pub async fn select_taste(&mut self, detail_id: i64, taste_id: i64) -> Result<(), CartError> {
        self.open_detail_slot(detail_id)?;
        let offered = self
            .editor
            .as_ref()
            .is_some_and(|e| e.tastes.iter().any(|t| t.id == taste_id));
        if !offered {
            return Err(self.reject(format!("Taste {taste_id} is not offered for this item")));
        }
        let result = self.backend.select_taste(detail_id, taste_id).await;
        self.settle("Select taste failed", result)?;
        self.reload_after_detail_edit().await
    }

    pub async fn unselect_taste(&mut self, detail_id: i64) -> Result<(), CartError> {
        self.open_detail_slot(detail_id)?;
        let result = self.backend.unselect_taste(detail_id).await;
        self.settle("Clear taste failed", result)?;
        self.reload_after_detail_edit().await
    }

    pub async fn select_size(&mut self, detail_id: i64, size_id: i64) -> Result<(), CartError> {
        self.open_detail_slot(detail_id)?;
        let offered = self
            .editor
            .as_ref()
            .is_some_and(|e| e.sizes.iter().any(|s| s.id == size_id));
        if !offered {
            return Err(self.reject(format!("Size {size_id} is not offered for this item")));
        }
        let result = self.backend.select_size(detail_id, size_id).await;
        self.settle("Select size failed", result)?;
        self.reload_after_detail_edit().await
    }

    pub async fn unselect_size(&mut self, detail_id: i64) -> Result<(), CartError> {
        self.open_detail_slot(detail_id)?;
        let result = self.backend.unselect_size(detail_id).await;
        self.settle("Clear size failed", result)?;
        self.reload_after_detail_edit().await
    }

    async fn reload_after_detail_edit(&mut self) -> Result<(), CartError> {
        self.reload_editor("Reload line detail failed").await?;
        self.reload_lines("Reload cart failed").await
    }

    // -- billing ------------------------------------------------------------

    /// Render the unpaid itemised bill for the table.
    pub async fn print_draft(&mut self) -> Result<String, CartError> {
        if self.lines.is_empty() {
            return Err(self.reject("Cart is empty"));
        }
        let user_id = self.operator()?;
        let result = self.backend.print_draft(self.table_no, user_id).await;
        let file = self.settle("Print bill failed", result)?;
        self.notices.success("Bill ready");
        Ok(file)
    }

    /// End the sale with the computed total, then request the receipt.
    ///
    /// Refused without a request while the cart is empty or `tendered` is
    /// below the total. A receipt failure after a successful end-sale is
    /// reported but does not fail the checkout.
    pub async fn checkout(
        &mut self,
        pay_type: PayType,
        tendered: f64,
    ) -> Result<CheckoutOutcome, CartError> {
        if self.lines.is_empty() {
            return Err(self.reject("Cart is empty"));
        }
        if !self.totals.covered_by(tendered) {
            return Err(self.reject(format!(
                "Tendered {tendered:.2} is less than total {:.2}",
                self.total()
            )));
        }
        let user_id = self.operator()?;

        let amount = self.total();
        let sale = EndSale {
            table_no: self.table_no,
            user_id,
            pay_type,
            input_money: tendered,
            amount,
            return_money: change_due(amount, tendered),
        };
        let result = self.backend.end_sale(&sale).await;
        self.settle("Checkout failed", result)?;
        info!(
            table_no = sale.table_no,
            amount = sale.amount,
            change = sale.return_money,
            pay_type = pay_type.as_str(),
            "sale ended"
        );
        self.notices.success("Sale completed");

        // The sale is closed; nothing of it may stay payable locally.
        self.editor = None;
        self.lines.clear();
        self.totals = CartTotals::default();
        if self.reload_lines("Reload cart failed").await.is_err() {
            debug!(table_no = self.table_no, "cart reload after sale failed");
        }

        let printed = self.backend.print_receipt(self.table_no, user_id).await;
        let receipt = self.settle("Print receipt failed", printed).ok();

        Ok(CheckoutOutcome {
            amount,
            tendered,
            change: sale.return_money,
            receipt,
        })
    }

    // -- helpers ------------------------------------------------------------

    fn operator(&mut self) -> Result<i64, CartError> {
        match self.session.user_id() {
            Some(id) => Ok(id),
            None => Err(self.reject("Sign in before editing the cart")),
        }
    }

    fn open_line_id(&mut self) -> Result<i64, CartError> {
        match self.editor.as_ref().map(LineEditor::line_id) {
            Some(id) => Ok(id),
            None => Err(self.reject("Open a line's detail first")),
        }
    }

    fn open_detail_slot(&mut self, detail_id: i64) -> Result<(), CartError> {
        self.open_line_id()?;
        if self.editor.as_ref().is_some_and(|e| e.has_detail(detail_id)) {
            Ok(())
        } else {
            Err(self.reject(format!("Detail {detail_id} is not on the open line")))
        }
    }

    fn reject(&mut self, message: impl Into<String>) -> CartError {
        let message = message.into();
        self.notices.warning(message.clone());
        CartError::rejected(message)
    }

    /// Surface a failed request as a notice. 401s were already handled by
    /// the session and are passed through silently.
    fn settle<T>(&mut self, action: &str, result: Result<T, ApiError>) -> Result<T, CartError> {
        result.map_err(|err| {
            if !err.is_unauthorized() {
                self.notices.error(action, err.to_string());
            }
            CartError::Api(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Food, FoodType};
    use crate::notice::NoticeLevel;
    use std::sync::Mutex;

    const OPERATOR: i64 = 7;

    #[derive(Default)]
    struct FakeState {
        lines: Vec<SaleTemp>,
        next_id: i64,
        calls: Vec<String>,
        fail_next: Option<ApiError>,
        fail_on: Option<String>,
        ended: Vec<EndSale>,
    }

    /// In-memory stand-in for the temp-sale endpoints.
    struct FakeBackend {
        foods: Vec<Food>,
        food_type: FoodType,
        state: Mutex<FakeState>,
    }

    impl FakeBackend {
        fn new() -> Self {
            let food_type = FoodType {
                id: 1,
                name: "Main".into(),
                tastes: vec![Taste {
                    id: 11,
                    name: "Spicy".into(),
                    ..Taste::default()
                }],
                food_sizes: vec![FoodSize {
                    id: 21,
                    name: "Large".into(),
                    money_added: 10.0,
                    ..FoodSize::default()
                }],
                ..FoodType::default()
            };
            let foods = vec![
                Food {
                    id: 1,
                    name: "Pad Thai".into(),
                    price: 50.0,
                    food_type_id: 1,
                    ..Food::default()
                },
                Food {
                    id: 2,
                    name: "Iced Tea".into(),
                    price: 25.0,
                    food_type_id: 1,
                    ..Food::default()
                },
                Food {
                    id: 3,
                    name: "Mango Rice".into(),
                    price: 80.0,
                    food_type_id: 1,
                    ..Food::default()
                },
            ];
            Self {
                foods,
                food_type,
                state: Mutex::new(FakeState {
                    next_id: 100,
                    ..FakeState::default()
                }),
            }
        }

        fn fail_next(&self, err: ApiError) {
            self.state.lock().unwrap().fail_next = Some(err);
        }

        /// Fail the first call whose log entry starts with `prefix`.
        fn fail_on(&self, prefix: &str) {
            self.state.lock().unwrap().fail_on = Some(prefix.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        /// A line added behind the view's back (another terminal).
        fn seed_line(&self, table_no: i64, food_id: i64, qty: i64) -> i64 {
            let food = self.food(food_id);
            let mut st = self.state.lock().unwrap();
            st.next_id += 1;
            let id = st.next_id;
            st.lines.push(SaleTemp {
                id,
                user_id: OPERATOR,
                table_no,
                food_id,
                qty,
                food,
                details: vec![],
            });
            id
        }

        fn food(&self, food_id: i64) -> Food {
            self.foods
                .iter()
                .find(|f| f.id == food_id)
                .cloned()
                .unwrap_or_default()
        }

        fn begin(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
            let mut st = self.state.lock().unwrap();
            if st.fail_on.as_deref().is_some_and(|p| call.starts_with(p)) {
                st.fail_on = None;
                st.calls.push(call);
                return Err(ApiError::Status {
                    status: 500,
                    message: "Backend server error (HTTP 500)".into(),
                });
            }
            st.calls.push(call);
            match st.fail_next.take() {
                Some(err) => Err(err),
                None => Ok(st),
            }
        }

        fn not_found(what: &str) -> ApiError {
            ApiError::Status {
                status: 404,
                message: format!("{what} not found"),
            }
        }
    }

    fn with_detail<'a>(
        st: &'a mut FakeState,
        detail_id: i64,
    ) -> Result<&'a mut SaleTempDetail, ApiError> {
        st.lines
            .iter_mut()
            .flat_map(|l| l.details.iter_mut())
            .find(|d| d.id == detail_id)
            .ok_or_else(|| FakeBackend::not_found("detail"))
    }

    impl SaleTempBackend for FakeBackend {
        async fn list_lines(&self) -> Result<Vec<SaleTemp>, ApiError> {
            let st = self.begin("list".into())?;
            Ok(st.lines.clone())
        }

        async fn add_line(&self, table_no: i64, user_id: i64, food_id: i64) -> Result<(), ApiError> {
            let food = self.food(food_id);
            let mut st = self.begin(format!("add {food_id}"))?;
            if let Some(line) = st
                .lines
                .iter_mut()
                .find(|l| l.table_no == table_no && l.food_id == food_id && l.details.is_empty())
            {
                line.qty += 1;
                return Ok(());
            }
            st.next_id += 1;
            let id = st.next_id;
            st.lines.push(SaleTemp {
                id,
                user_id,
                table_no,
                food_id,
                qty: 1,
                food,
                details: vec![],
            });
            Ok(())
        }

        async fn update_qty(&self, line_id: i64, qty: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("qty {line_id} {qty}"))?;
            let line = st
                .lines
                .iter_mut()
                .find(|l| l.id == line_id)
                .ok_or_else(|| Self::not_found("line"))?;
            line.qty = qty;
            Ok(())
        }

        async fn remove_line(&self, line_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("remove {line_id}"))?;
            st.lines.retain(|l| l.id != line_id);
            Ok(())
        }

        async fn clear_table(&self, table_no: i64, user_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("clear {table_no}"))?;
            st.lines
                .retain(|l| !(l.table_no == table_no && l.user_id == user_id));
            Ok(())
        }

        async fn line_info(&self, line_id: i64) -> Result<SaleTemp, ApiError> {
            let st = self.begin(format!("info {line_id}"))?;
            let mut line = st
                .lines
                .iter()
                .find(|l| l.id == line_id)
                .cloned()
                .ok_or_else(|| Self::not_found("line"))?;
            line.food.food_type_info = Some(self.food_type.clone());
            Ok(line)
        }

        async fn add_detail(&self, line_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("add-detail {line_id}"))?;
            st.next_id += 1;
            let id = st.next_id;
            let line = st
                .lines
                .iter_mut()
                .find(|l| l.id == line_id)
                .ok_or_else(|| Self::not_found("line"))?;
            line.details.push(SaleTempDetail {
                id,
                sale_temp_id: line_id,
                food_id: line.food_id,
                ..SaleTempDetail::default()
            });
            Ok(())
        }

        async fn remove_detail(&self, detail_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("remove-detail {detail_id}"))?;
            for line in st.lines.iter_mut() {
                line.details.retain(|d| d.id != detail_id);
            }
            Ok(())
        }

        async fn select_taste(&self, detail_id: i64, taste_id: i64) -> Result<(), ApiError> {
            let taste = self.food_type.tastes.iter().find(|t| t.id == taste_id).cloned();
            let mut st = self.begin(format!("taste {detail_id} {taste_id}"))?;
            let detail = with_detail(&mut st, detail_id)?;
            detail.taste_id = Some(taste_id);
            detail.taste = taste;
            Ok(())
        }

        async fn unselect_taste(&self, detail_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("untaste {detail_id}"))?;
            let detail = with_detail(&mut st, detail_id)?;
            detail.taste_id = None;
            detail.taste = None;
            Ok(())
        }

        async fn select_size(&self, detail_id: i64, size_id: i64) -> Result<(), ApiError> {
            let size = self
                .food_type
                .food_sizes
                .iter()
                .find(|s| s.id == size_id)
                .cloned();
            let mut st = self.begin(format!("size {detail_id} {size_id}"))?;
            let detail = with_detail(&mut st, detail_id)?;
            detail.food_size_id = Some(size_id);
            detail.food_size = size;
            Ok(())
        }

        async fn unselect_size(&self, detail_id: i64) -> Result<(), ApiError> {
            let mut st = self.begin(format!("unsize {detail_id}"))?;
            let detail = with_detail(&mut st, detail_id)?;
            detail.food_size_id = None;
            detail.food_size = None;
            Ok(())
        }

        async fn end_sale(&self, sale: &EndSale) -> Result<(), ApiError> {
            let mut st = self.begin("end-sale".into())?;
            st.lines
                .retain(|l| !(l.table_no == sale.table_no && l.user_id == sale.user_id));
            st.ended.push(sale.clone());
            Ok(())
        }

        async fn print_draft(&self, table_no: i64, _user_id: i64) -> Result<String, ApiError> {
            let _st = self.begin("print-draft".into())?;
            Ok(format!("draft-table-{table_no}.pdf"))
        }

        async fn print_receipt(&self, table_no: i64, _user_id: i64) -> Result<String, ApiError> {
            let _st = self.begin("print-receipt".into())?;
            Ok(format!("receipt-table-{table_no}.pdf"))
        }
    }

    fn view(table_no: i64) -> CartView<FakeBackend> {
        let session = Arc::new(SessionContext::signed_in("tok", OPERATOR, "Cashier"));
        CartView::new(FakeBackend::new(), session, table_no)
    }

    fn server_total(view: &CartView<FakeBackend>) -> f64 {
        let st = view.backend().state.lock().unwrap();
        let lines: Vec<SaleTemp> = st
            .lines
            .iter()
            .filter(|l| l.table_no == view.table_no())
            .cloned()
            .collect();
        compute_totals(&lines).total()
    }

    #[tokio::test]
    async fn worked_example_from_add_to_checkout() {
        let mut cart = view(1);
        cart.refresh().await.expect("refresh");
        cart.add_item(1).await.expect("add");
        cart.add_item(1).await.expect("add again");
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.total(), 100.0);

        let line_id = cart.lines()[0].id;
        cart.open_detail(line_id).await.expect("open detail");
        cart.add_detail_slot().await.expect("add slot");
        assert!(!cart.can_edit_qty(line_id));

        let detail_id = cart.editor().unwrap().details()[0].id;
        cart.select_size(detail_id, 21).await.expect("select size");
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.total(), 110.0);

        assert!(!cart.can_checkout(100.0));
        assert!(cart.can_checkout(110.0));

        let outcome = cart.checkout(PayType::Cash, 110.0).await.expect("checkout");
        assert_eq!(outcome.amount, 110.0);
        assert_eq!(outcome.change, 0.0);
        assert_eq!(outcome.receipt.as_deref(), Some("receipt-table-1.pdf"));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert!(cart.editor().is_none());

        let st = cart.backend().state.lock().unwrap();
        assert_eq!(st.ended.len(), 1);
        assert_eq!(st.ended[0].amount, 110.0);
        assert_eq!(st.ended[0].input_money, 110.0);
        assert_eq!(st.ended[0].return_money, 0.0);
        assert_eq!(st.ended[0].user_id, OPERATOR);
    }

    #[tokio::test]
    async fn total_always_matches_latest_fetch() {
        let mut cart = view(2);
        cart.refresh().await.unwrap();
        for food_id in [1, 2, 3, 2, 1] {
            cart.add_item(food_id).await.unwrap();
            assert_eq!(cart.total(), server_total(&cart));
        }
        // another terminal adds to the same table
        cart.backend().seed_line(2, 3, 2);
        let first = cart.lines()[0].id;
        cart.remove_line(first).await.unwrap();
        assert_eq!(cart.total(), server_total(&cart));
        assert_eq!(cart.lines().len(), 3);
    }

    #[tokio::test]
    async fn locked_line_rejects_qty_edits_without_request() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 1, 2);
        cart.refresh().await.unwrap();
        cart.open_detail(line_id).await.unwrap();
        cart.add_detail_slot().await.unwrap();

        let before = cart.calls_len();
        let err = cart.increment(line_id).await.expect_err("locked");
        assert!(err.is_rejected());
        let err = cart.change_qty(line_id, 5).await.expect_err("locked");
        assert!(err.is_rejected());
        assert_eq!(cart.calls_len(), before);
        assert_eq!(
            cart.notices().last().map(|n| n.level),
            Some(NoticeLevel::Warning)
        );
    }

    #[tokio::test]
    async fn qty_never_goes_negative() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 2, 1);
        cart.refresh().await.unwrap();

        cart.decrement(line_id).await.expect("1 -> 0 is allowed");
        assert_eq!(cart.line(line_id).map(|l| l.qty), Some(0));

        let before = cart.calls_len();
        let err = cart.decrement(line_id).await.expect_err("0 -> -1");
        assert!(err.is_rejected());
        assert_eq!(cart.calls_len(), before);
    }

    #[tokio::test]
    async fn removing_last_line_returns_to_empty_state() {
        let mut cart = view(3);
        cart.add_item(3).await.unwrap();
        let line_id = cart.lines()[0].id;
        cart.open_detail(line_id).await.unwrap();

        cart.remove_line(line_id).await.unwrap();
        assert_eq!(cart.lines().len(), 0);
        assert_eq!(cart.total(), 0.0);
        assert!(cart.editor().is_none());
        assert!(!cart.can_checkout(1000.0));
    }

    #[tokio::test]
    async fn clear_table_empties_cart_regardless_of_customisation() {
        let mut cart = view(4);
        cart.backend().seed_line(4, 1, 1);
        cart.backend().seed_line(4, 2, 3);
        let custom = cart.backend().seed_line(4, 3, 1);
        let other_table = cart.backend().seed_line(5, 1, 1);
        cart.refresh().await.unwrap();
        cart.open_detail(custom).await.unwrap();
        cart.add_detail_slot().await.unwrap();
        assert_eq!(cart.lines().len(), 3);

        cart.clear_table().await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert!(cart.editor().is_none());

        let st = cart.backend().state.lock().unwrap();
        assert!(st.lines.iter().any(|l| l.id == other_table));
    }

    #[tokio::test]
    async fn failure_leaves_state_untouched_and_is_not_retried() {
        let mut cart = view(1);
        cart.add_item(1).await.unwrap();
        let before_lines = cart.lines().to_vec();
        let before_calls = cart.calls_len();

        cart.backend().fail_next(ApiError::Status {
            status: 500,
            message: "Backend server error (HTTP 500)".into(),
        });
        let err = cart.add_item(2).await.expect_err("server failure");
        assert!(matches!(err, CartError::Api(ApiError::Status { status: 500, .. })));
        assert_eq!(cart.lines(), before_lines.as_slice());
        assert_eq!(cart.calls_len(), before_calls + 1);

        let notice = cart.notices().last().cloned().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Add item failed");
    }

    #[tokio::test]
    async fn unauthorized_is_left_to_the_session() {
        let mut cart = view(1);
        cart.refresh().await.unwrap();
        cart.drain_notices();

        cart.backend().fail_next(ApiError::Unauthorized);
        let err = cart.add_item(1).await.expect_err("401");
        assert!(matches!(err, CartError::Api(ApiError::Unauthorized)));
        assert!(cart.notices().is_empty());
    }

    #[tokio::test]
    async fn checkout_guarded_by_tendered_amount() {
        let mut cart = view(1);
        cart.add_item(3).await.unwrap();
        assert_eq!(cart.total(), 80.0);

        let before = cart.calls_len();
        let err = cart
            .checkout(PayType::Transfer, 79.99)
            .await
            .expect_err("short tender");
        assert!(err.is_rejected());
        assert_eq!(cart.calls_len(), before);

        let outcome = cart.checkout(PayType::Transfer, 100.0).await.unwrap();
        assert_eq!(outcome.change, 20.0);
    }

    #[tokio::test]
    async fn checkout_survives_receipt_failure() {
        let mut cart = view(1);
        cart.add_item(2).await.unwrap();
        cart.backend().fail_on("print-receipt");

        let outcome = cart
            .checkout(PayType::Cash, 25.0)
            .await
            .expect("sale already ended");
        assert!(outcome.receipt.is_none());
        assert!(cart.is_empty());
        assert!(cart
            .notices()
            .iter()
            .any(|n| n.title == "Print receipt failed"));
    }

    #[tokio::test]
    async fn checkout_closes_cart_even_if_reload_fails() {
        let mut cart = view(1);
        cart.add_item(1).await.unwrap();
        cart.backend().fail_on("list");

        let outcome = cart.checkout(PayType::Cash, 50.0).await.expect("sale ended");
        assert_eq!(outcome.amount, 50.0);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert!(!cart.can_checkout(50.0));
        assert!(cart
            .notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.title == "Reload cart failed"));

        let before = cart.calls_len();
        let err = cart
            .checkout(PayType::Cash, 50.0)
            .await
            .expect_err("nothing left to pay");
        assert!(err.is_rejected());
        assert_eq!(cart.calls_len(), before);
        assert_eq!(cart.backend().state.lock().unwrap().ended.len(), 1);
    }

    #[tokio::test]
    async fn tender_below_total_by_a_fraction_is_refused() {
        let mut cart = view(1);
        cart.add_item(1).await.unwrap();
        cart.add_item(1).await.unwrap();
        assert_eq!(cart.total(), 100.0);
        assert!(!cart.can_checkout(99.995));

        let before = cart.calls_len();
        for tendered in [99.995, f64::INFINITY, f64::NAN] {
            let err = cart
                .checkout(PayType::Cash, tendered)
                .await
                .expect_err("not covered");
            assert!(err.is_rejected());
        }
        assert_eq!(cart.calls_len(), before);
        assert!(cart.backend().state.lock().unwrap().ended.is_empty());
    }

    #[tokio::test]
    async fn removing_last_detail_unlocks_line() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 1, 2);
        cart.refresh().await.unwrap();
        cart.open_detail(line_id).await.unwrap();
        cart.add_detail_slot().await.unwrap();
        let detail_id = cart.editor().unwrap().details()[0].id;
        cart.select_size(detail_id, 21).await.unwrap();
        assert_eq!(cart.total(), 110.0);
        assert!(!cart.can_edit_qty(line_id));

        cart.remove_detail_slot(detail_id).await.unwrap();
        assert!(cart.editor().unwrap().details().is_empty());
        assert!(cart.can_edit_qty(line_id));
        assert_eq!(cart.totals().surcharges, 0.0);
        assert_eq!(cart.total(), 100.0);

        let err = cart
            .remove_detail_slot(detail_id)
            .await
            .expect_err("already gone");
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn unselecting_size_drops_its_surcharge() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 1, 1);
        cart.refresh().await.unwrap();
        cart.open_detail(line_id).await.unwrap();
        cart.add_detail_slot().await.unwrap();
        let detail_id = cart.editor().unwrap().details()[0].id;

        cart.select_size(detail_id, 21).await.unwrap();
        assert_eq!(cart.total(), 60.0);

        cart.unselect_size(detail_id).await.unwrap();
        assert_eq!(cart.total(), 50.0);
        assert_eq!(cart.editor().unwrap().details()[0].food_size_id, None);
        assert!(!cart.can_edit_qty(line_id));
    }

    #[tokio::test]
    async fn draft_bill_needs_lines() {
        let mut cart = view(6);
        cart.refresh().await.unwrap();
        let before = cart.calls_len();
        let err = cart.print_draft().await.expect_err("empty cart");
        assert!(err.is_rejected());
        assert_eq!(cart.calls_len(), before);

        cart.add_item(2).await.unwrap();
        let file = cart.print_draft().await.expect("draft");
        assert_eq!(file, "draft-table-6.pdf");
        assert_eq!(
            cart.notices().last().map(|n| (n.level, n.title.as_str())),
            Some((NoticeLevel::Success, "Bill ready"))
        );
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn taste_selection_reloads_editor_and_lines() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 1, 1);
        cart.refresh().await.unwrap();
        cart.open_detail(line_id).await.unwrap();
        cart.add_detail_slot().await.unwrap();
        let detail_id = cart.editor().unwrap().details()[0].id;

        let before = cart.calls();
        cart.select_taste(detail_id, 11).await.unwrap();
        let after = cart.calls();
        assert_eq!(
            &after[before.len()..],
            &[
                format!("taste {detail_id} 11"),
                format!("info {line_id}"),
                "list".to_string()
            ]
        );
        assert_eq!(cart.editor().unwrap().details()[0].taste_id, Some(11));

        let err = cart.select_taste(detail_id, 99).await.expect_err("unknown taste");
        assert!(err.is_rejected());

        cart.unselect_taste(detail_id).await.unwrap();
        assert_eq!(cart.editor().unwrap().details()[0].taste_id, None);
    }

    #[tokio::test]
    async fn detail_ops_need_an_open_editor() {
        let mut cart = view(1);
        cart.add_item(1).await.unwrap();
        let err = cart.add_detail_slot().await.expect_err("no editor");
        assert!(err.is_rejected());
        let err = cart.select_size(1, 21).await.expect_err("no editor");
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn view_only_shows_its_table() {
        let mut cart = view(1);
        cart.backend().seed_line(1, 1, 1);
        cart.backend().seed_line(2, 3, 4);
        cart.refresh().await.unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total(), 50.0);

        cart.clear_table().await.unwrap();
        let st = cart.backend().state.lock().unwrap();
        assert_eq!(st.lines.len(), 1);
        assert_eq!(st.lines[0].table_no, 2);
    }

    #[tokio::test]
    async fn closing_detail_blocks_detail_edits() {
        let mut cart = view(1);
        let line_id = cart.backend().seed_line(1, 1, 1);
        cart.refresh().await.unwrap();
        cart.open_detail(line_id).await.unwrap();
        assert_eq!(cart.editor().map(LineEditor::line_id), Some(line_id));

        let before = cart.calls_len();
        cart.close_detail();
        assert!(cart.editor().is_none());
        assert_eq!(cart.calls_len(), before);
        assert!(cart.add_detail_slot().await.expect_err("closed").is_rejected());
        assert_eq!(cart.calls_len(), before);
    }

    #[tokio::test]
    async fn signed_out_operator_cannot_mutate() {
        let session = Arc::new(SessionContext::new());
        let mut cart = CartView::new(FakeBackend::new(), session, 1);
        let err = cart.add_item(1).await.expect_err("no operator");
        assert!(err.is_rejected());
        assert!(cart.calls().is_empty());
    }

    impl CartView<FakeBackend> {
        fn calls(&self) -> Vec<String> {
            self.backend.calls()
        }

        fn calls_len(&self) -> usize {
            self.backend.calls().len()
        }
    }
}
