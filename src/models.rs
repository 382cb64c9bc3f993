//! Wire types for the back-office REST backend.
//!
//! Field names follow the backend's JSON: camelCase scalars, and
//! PascalCase for included relations (`Food`, `SaleTempDetails`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Standard response wrapper. Endpoints disagree on `result` vs `results`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub results: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> Option<T> {
        self.result.or(self.results)
    }
}

/// `{ fileName }` reply of the upload and print endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_name: String,
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    Food,
    Drink,
}

impl FoodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Drink => "drink",
        }
    }
}

impl std::str::FromStr for FoodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "drink" => Ok(Self::Drink),
            other => Err(format!("Unknown food kind: {other}. Must be food or drink")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodType {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub remark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "Tastes", default, deserialize_with = "null_default", skip_serializing)]
    pub tastes: Vec<Taste>,
    #[serde(rename = "FoodSizes", default, deserialize_with = "null_default", skip_serializing)]
    pub food_sizes: Vec<FoodSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub remark: String,
    #[serde(default, deserialize_with = "null_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub img: String,
    /// `food` or `drink`.
    #[serde(default, deserialize_with = "null_default")]
    pub food_type: String,
    #[serde(default)]
    pub food_type_id: i64,
    #[serde(rename = "FoodType", default, skip_serializing)]
    pub food_type_info: Option<FoodType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Food {
    pub fn kind(&self) -> Option<FoodKind> {
        self.food_type.parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSize {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub remark: String,
    #[serde(default)]
    pub food_type_id: i64,
    /// Surcharge added to the line total when this size is selected.
    #[serde(default, deserialize_with = "null_default")]
    pub money_added: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taste {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub remark: String,
    #[serde(default)]
    pub food_type_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Temp sale (open cart)
// ---------------------------------------------------------------------------

/// One cart line: a food item on a table with a quantity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTemp {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub table_no: i64,
    #[serde(default)]
    pub food_id: i64,
    #[serde(default)]
    pub qty: i64,
    #[serde(rename = "Food", default)]
    pub food: Food,
    #[serde(rename = "SaleTempDetails", default, deserialize_with = "null_default")]
    pub details: Vec<SaleTempDetail>,
}

impl SaleTemp {
    /// A line with detail slots can no longer have its quantity edited.
    pub fn is_locked(&self) -> bool {
        !self.details.is_empty()
    }

    pub fn unit_price(&self) -> f64 {
        self.food.price
    }
}

/// Per-unit customisation slot under a cart line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTempDetail {
    pub id: i64,
    #[serde(default)]
    pub sale_temp_id: i64,
    #[serde(default)]
    pub food_id: i64,
    #[serde(default)]
    pub taste_id: Option<i64>,
    #[serde(default)]
    pub food_size_id: Option<i64>,
    #[serde(rename = "Food", default)]
    pub food: Option<Food>,
    #[serde(rename = "FoodSize", default)]
    pub food_size: Option<FoodSize>,
    #[serde(rename = "Taste", default)]
    pub taste: Option<Taste>,
}

impl SaleTempDetail {
    pub fn surcharge(&self) -> f64 {
        self.food_size.as_ref().map(|s| s.money_added).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayType {
    #[default]
    Cash,
    Promptpay,
    Transfer,
}

impl PayType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Promptpay => "promptpay",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for PayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "promptpay" => Ok(Self::Promptpay),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!(
                "Invalid pay type: {other}. Must be cash, promptpay, or transfer"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSale {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub created_date: String,
    #[serde(default)]
    pub pay_date: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub pay_type: PayType,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub input_money: f64,
    #[serde(default)]
    pub return_money: f64,
    #[serde(default)]
    pub table_no: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(rename = "User", default)]
    pub user: Option<BillUser>,
    #[serde(rename = "BillSaleDetails", default, deserialize_with = "null_default")]
    pub details: Vec<BillSaleDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSaleDetail {
    pub id: i64,
    #[serde(default)]
    pub bill_sale_id: i64,
    #[serde(default)]
    pub food_id: i64,
    #[serde(default)]
    pub taste_id: Option<i64>,
    #[serde(default)]
    pub food_size_id: Option<i64>,
    #[serde(default)]
    pub money_added: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "Food", default)]
    pub food: Option<Food>,
    #[serde(rename = "FoodSize", default)]
    pub food_size: Option<FoodSize>,
    #[serde(rename = "Taste", default)]
    pub taste: Option<Taste>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthReport {
    pub month: String,
    #[serde(default)]
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub level: crate::session::UserLevel,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, skip_serializing)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub website: String,
    #[serde(default, deserialize_with = "null_default")]
    pub promptpay: String,
    #[serde(default, deserialize_with = "null_default")]
    pub logo: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tax_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_temp_parses_nested_relations() {
        let line: SaleTemp = serde_json::from_value(serde_json::json!({
            "id": 4,
            "userId": 1,
            "tableNo": 2,
            "foodId": 10,
            "qty": 2,
            "Food": { "id": 10, "name": "Pad Thai", "price": 50, "foodType": "food", "remark": null },
            "SaleTempDetails": [
                { "id": 1, "saleTempId": 4, "foodId": 10, "foodSizeId": 3,
                  "FoodSize": { "id": 3, "name": "L", "moneyAdded": 10 } },
                { "id": 2, "saleTempId": 4, "foodId": 10, "FoodSize": null }
            ]
        }))
        .expect("parse sale temp");

        assert_eq!(line.unit_price(), 50.0);
        assert_eq!(line.food.kind(), Some(FoodKind::Food));
        assert!(line.is_locked());
        assert_eq!(line.details[0].surcharge(), 10.0);
        assert_eq!(line.details[1].surcharge(), 0.0);
    }

    #[test]
    fn null_details_parse_as_unlocked_line() {
        let line: SaleTemp = serde_json::from_value(serde_json::json!({
            "id": 1, "qty": 1, "Food": { "id": 1, "name": "Tea", "price": 20 },
            "SaleTempDetails": null
        }))
        .expect("parse");
        assert!(!line.is_locked());
    }

    #[test]
    fn envelope_accepts_result_or_results() {
        let a: ApiResponse<Vec<i64>> =
            serde_json::from_value(serde_json::json!({ "result": [1, 2] })).unwrap();
        let b: ApiResponse<Vec<i64>> =
            serde_json::from_value(serde_json::json!({ "results": [3] })).unwrap();
        let c: ApiResponse<Vec<i64>> =
            serde_json::from_value(serde_json::json!({ "message": "ok" })).unwrap();
        assert_eq!(a.into_data(), Some(vec![1, 2]));
        assert_eq!(b.into_data(), Some(vec![3]));
        assert_eq!(c.into_data(), None);
    }

    #[test]
    fn pay_type_round_trips_lowercase() {
        assert_eq!("PromptPay".parse::<PayType>(), Ok(PayType::Promptpay));
        assert_eq!(
            serde_json::to_value(PayType::Transfer).unwrap(),
            serde_json::json!("transfer")
        );
        assert!("card".parse::<PayType>().is_err());
    }

    #[test]
    fn food_type_exposes_tastes_and_sizes() {
        let ft: FoodType = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Noodles",
            "Tastes": [{ "id": 1, "name": "Spicy" }],
            "FoodSizes": [{ "id": 2, "name": "Large", "moneyAdded": 15 }]
        }))
        .unwrap();
        assert_eq!(ft.tastes.len(), 1);
        assert_eq!(ft.food_sizes[0].money_added, 15.0);
    }
}
