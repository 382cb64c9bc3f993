//! Menu catalog: foods, food types, sizes and tastes.
//!
//! Thin wrappers over the backend's CRUD endpoints. Drafts are validated
//! and trimmed locally; an invalid draft never produces a request.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{ApiResponse, Food, FoodKind, FoodSize, FoodType, Taste};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn require_name(name: &str, what: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{what} name is required")));
    }
    Ok(trimmed.to_string())
}

fn require_amount(amount: f64, what: &str) -> Result<f64, ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::validation(format!("{what} cannot be negative")));
    }
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Foods
// ---------------------------------------------------------------------------

/// Create (`id == 0`) or update payload for a food.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDraft {
    pub id: i64,
    pub name: String,
    pub remark: String,
    pub price: f64,
    pub img: String,
    pub food_type: FoodKind,
    pub food_type_id: i64,
}

impl FoodDraft {
    pub fn validated(self) -> Result<Self, ApiError> {
        if self.food_type_id <= 0 {
            return Err(ApiError::validation("Choose a food type"));
        }
        Ok(Self {
            name: require_name(&self.name, "Food")?,
            remark: self.remark.trim().to_string(),
            price: require_amount(self.price, "Price")?,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodPage {
    pub page: u32,
    pub limit: u32,
    pub foods: Vec<Food>,
    pub total_pages: u32,
    pub total_items: u64,
}

pub async fn list_foods(api: &ApiClient) -> Result<Vec<Food>, ApiError> {
    api.get_data("/api/food/list").await
}

pub async fn filter_foods(api: &ApiClient, kind: FoodKind) -> Result<Vec<Food>, ApiError> {
    api.get_data(&format!("/api/food/filter/{}", kind.as_str()))
        .await
}

pub async fn paginate_foods(api: &ApiClient, page: u32, limit: u32) -> Result<FoodPage, ApiError> {
    let page = page.max(1);
    let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
    let body = json!({ "page": page, "limit": limit });
    let resp: ApiResponse<Vec<Food>> = api
        .request(Method::POST, "/api/food/paginate", Some(&body))
        .await?;
    let total_pages = resp.total_pages.unwrap_or(0);
    let total_items = resp.total_items.unwrap_or(0);
    Ok(FoodPage {
        page,
        limit,
        foods: resp.into_data().unwrap_or_default(),
        total_pages,
        total_items,
    })
}

/// Page to show after deleting one row from `current_page`: step back when
/// the deleted row was the only one on a page past the first.
pub fn page_after_delete(current_page: u32, rows_on_page: usize) -> u32 {
    if rows_on_page <= 1 && current_page > 1 {
        current_page - 1
    } else {
        current_page.max(1)
    }
}

pub async fn save_food(api: &ApiClient, draft: FoodDraft) -> Result<(), ApiError> {
    let draft = draft.validated()?;
    if draft.id == 0 {
        api.send(Method::POST, "/api/food/create", Some(&draft))
            .await?;
    } else {
        let path = format!("/api/food/update/{}", draft.id);
        api.send(Method::PUT, &path, Some(&draft)).await?;
    }
    info!(food_id = draft.id, name = %draft.name, "food saved");
    Ok(())
}

pub async fn delete_food(api: &ApiClient, food_id: i64) -> Result<(), ApiError> {
    let path = format!("/api/food/delete/{food_id}");
    api.send::<Value>(Method::DELETE, &path, None).await
}

/// Delete a food from the paginated listing and load the page to show next.
pub async fn delete_food_on_page(
    api: &ApiClient,
    food_id: i64,
    current: &FoodPage,
) -> Result<FoodPage, ApiError> {
    if !current.foods.iter().any(|f| f.id == food_id) {
        return Err(ApiError::validation(format!(
            "Food {food_id} is not on page {}",
            current.page
        )));
    }
    let path = format!("/api/food-paginate/delete/{food_id}");
    api.send::<Value>(Method::DELETE, &path, None).await?;
    info!(food_id, page = current.page, "food deleted from page");
    let next = page_after_delete(current.page, current.foods.len());
    paginate_foods(api, next, current.limit).await
}

/// Store a food picture; returns the file name to put in `FoodDraft::img`.
pub async fn upload_food_image(
    api: &ApiClient,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, ApiError> {
    let stored = api
        .upload("/api/food/upload-image", file_name, bytes)
        .await?;
    info!(file = %stored.file_name, "food image uploaded");
    Ok(stored.file_name)
}

// ---------------------------------------------------------------------------
// Food types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodTypeDraft {
    pub id: i64,
    pub name: String,
    pub remark: String,
}

pub async fn list_food_types(api: &ApiClient) -> Result<Vec<FoodType>, ApiError> {
    api.get_data("/api/food-type/list").await
}

pub async fn save_food_type(api: &ApiClient, draft: FoodTypeDraft) -> Result<(), ApiError> {
    let draft = FoodTypeDraft {
        name: require_name(&draft.name, "Food type")?,
        remark: draft.remark.trim().to_string(),
        ..draft
    };
    let path = if draft.id == 0 {
        "/api/food-type/create"
    } else {
        "/api/food-type/update"
    };
    api.send(Method::POST, path, Some(&draft)).await
}

pub async fn delete_food_type(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send(Method::POST, "/api/food-type/delete", Some(&json!({ "id": id })))
        .await
}

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSizeDraft {
    pub id: i64,
    pub name: String,
    pub remark: String,
    pub food_type_id: i64,
    pub money_added: f64,
}

impl FoodSizeDraft {
    pub fn validated(self) -> Result<Self, ApiError> {
        if self.food_type_id <= 0 {
            return Err(ApiError::validation("Choose a food type"));
        }
        Ok(Self {
            name: require_name(&self.name, "Size")?,
            remark: self.remark.trim().to_string(),
            money_added: require_amount(self.money_added, "Surcharge")?,
            ..self
        })
    }
}

pub async fn list_food_sizes(api: &ApiClient) -> Result<Vec<FoodSize>, ApiError> {
    api.get_data("/api/food-size/list").await
}

pub async fn save_food_size(api: &ApiClient, draft: FoodSizeDraft) -> Result<(), ApiError> {
    let draft = draft.validated()?;
    if draft.id == 0 {
        api.send(Method::POST, "/api/food-size/create", Some(&draft))
            .await
    } else {
        let path = format!("/api/food-size/update/{}", draft.id);
        api.send(Method::PUT, &path, Some(&draft)).await
    }
}

pub async fn delete_food_size(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    let path = format!("/api/food-size/delete/{id}");
    api.send::<Value>(Method::DELETE, &path, None).await
}

// ---------------------------------------------------------------------------
// Tastes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteDraft {
    pub id: i64,
    pub name: String,
    pub remark: String,
    pub food_type_id: i64,
}

pub async fn list_tastes(api: &ApiClient) -> Result<Vec<Taste>, ApiError> {
    api.get_data("/api/taste/list").await
}

pub async fn save_taste(api: &ApiClient, draft: TasteDraft) -> Result<(), ApiError> {
    if draft.food_type_id <= 0 {
        return Err(ApiError::validation("Choose a food type"));
    }
    let draft = TasteDraft {
        name: require_name(&draft.name, "Taste")?,
        remark: draft.remark.trim().to_string(),
        ..draft
    };
    let path = if draft.id == 0 {
        "/api/taste/create"
    } else {
        "/api/taste/update"
    };
    api.send(Method::POST, path, Some(&draft)).await
}

pub async fn delete_taste(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send(Method::POST, "/api/taste/delete", Some(&json!({ "id": id })))
        .await
}
