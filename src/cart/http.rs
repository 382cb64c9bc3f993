//! `SaleTempBackend` over the REST API.

use reqwest::Method;
use serde_json::{json, Value};

use super::{EndSale, SaleTempBackend};
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{ApiResponse, FileRef, SaleTemp};

impl SaleTempBackend for ApiClient {
    async fn list_lines(&self) -> Result<Vec<SaleTemp>, ApiError> {
        self.get_data("/api/sale-temp/list").await
    }

    async fn add_line(&self, table_no: i64, user_id: i64, food_id: i64) -> Result<(), ApiError> {
        let body = json!({ "tableNo": table_no, "userId": user_id, "foodId": food_id });
        self.send(Method::POST, "/api/sale-temp/create", Some(&body))
            .await
    }

    async fn update_qty(&self, line_id: i64, qty: i64) -> Result<(), ApiError> {
        let body = json!({ "id": line_id, "qty": qty });
        self.send(Method::DELETE, "/api/sale-temp/update-qty", Some(&body))
            .await
    }

    async fn remove_line(&self, line_id: i64) -> Result<(), ApiError> {
        let path = format!("/api/sale-temp/remove/{line_id}");
        self.send::<Value>(Method::POST, &path, None).await
    }

    async fn clear_table(&self, table_no: i64, user_id: i64) -> Result<(), ApiError> {
        let body = json!({ "tableNo": table_no, "userId": user_id });
        self.send(Method::DELETE, "/api/sale-temp/remove-all", Some(&body))
            .await
    }

    async fn line_info(&self, line_id: i64) -> Result<SaleTemp, ApiError> {
        let path = format!("/api/sale-temp/info/{line_id}");
        let envelope: ApiResponse<SaleTemp> =
            self.request::<_, Value>(Method::GET, &path, None).await?;
        envelope.into_data().ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("Cart line {line_id} not found"),
        })
    }

    async fn add_detail(&self, line_id: i64) -> Result<(), ApiError> {
        let body = json!({ "saleTempId": line_id });
        self.send(
            Method::POST,
            "/api/sale-temp/create-sale-temp-detail",
            Some(&body),
        )
        .await
    }

    async fn remove_detail(&self, detail_id: i64) -> Result<(), ApiError> {
        let body = json!({ "saleTempDetailId": detail_id });
        self.send(
            Method::DELETE,
            "/api/sale-temp/remove-sale-temp-detail",
            Some(&body),
        )
        .await
    }

    async fn select_taste(&self, detail_id: i64, taste_id: i64) -> Result<(), ApiError> {
        let body = json!({ "tasteId": taste_id, "saleTempDetailId": detail_id });
        self.send(Method::PUT, "/api/sale-temp/select-taste", Some(&body))
            .await
    }

    async fn unselect_taste(&self, detail_id: i64) -> Result<(), ApiError> {
        let body = json!({ "saleTempDetailId": detail_id });
        self.send(Method::PUT, "/api/sale-temp/unselect-taste", Some(&body))
            .await
    }

    async fn select_size(&self, detail_id: i64, size_id: i64) -> Result<(), ApiError> {
        let body = json!({ "sizeId": size_id, "saleTempDetailId": detail_id });
        self.send(Method::PUT, "/api/sale-temp/select-size", Some(&body))
            .await
    }

    async fn unselect_size(&self, detail_id: i64) -> Result<(), ApiError> {
        let body = json!({ "saleTempDetailId": detail_id });
        self.send(Method::PUT, "/api/sale-temp/unselect-size", Some(&body))
            .await
    }

    async fn end_sale(&self, sale: &EndSale) -> Result<(), ApiError> {
        self.send(Method::PUT, "/api/sale-temp/end-sale", Some(sale))
            .await
    }

    async fn print_draft(&self, table_no: i64, user_id: i64) -> Result<String, ApiError> {
        let body = json!({ "tableNo": table_no, "userId": user_id });
        let file: FileRef = self
            .request(
                Method::POST,
                "/api/sale-temp/print-bill-before-pay",
                Some(&body),
            )
            .await?;
        Ok(file.file_name)
    }

    async fn print_receipt(&self, table_no: i64, user_id: i64) -> Result<String, ApiError> {
        let body = json!({ "tableNo": table_no, "userId": user_id });
        let file: FileRef = self
            .request(
                Method::POST,
                "/api/sale-temp/print-bill-after-pay",
                Some(&body),
            )
            .await?;
        Ok(file.file_name)
    }
}
