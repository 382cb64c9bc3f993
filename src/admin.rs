//! Staff accounts and the shop profile printed on bills.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Organization, User};
use crate::session::UserLevel;

/// Create (`id == 0`) or update payload for a staff account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDraft {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub username: String,
    /// Omitted on update to keep the current password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub level: UserLevel,
}

impl UserDraft {
    pub fn validated(self) -> Result<Self, ApiError> {
        let name = self.name.trim().to_string();
        let username = self.username.trim().to_string();
        if name.is_empty() || username.is_empty() {
            return Err(ApiError::validation("Name and username are required"));
        }
        let password = self
            .password
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if self.id == 0 && password.is_none() {
            return Err(ApiError::validation("A password is required for new users"));
        }
        Ok(Self {
            name,
            username,
            password,
            ..self
        })
    }
}

pub async fn list_users(api: &ApiClient) -> Result<Vec<User>, ApiError> {
    api.get_data("/api/user/get-users").await
}

pub async fn save_user(api: &ApiClient, draft: UserDraft) -> Result<(), ApiError> {
    let draft = draft.validated()?;
    if draft.id == 0 {
        api.send(Method::POST, "/api/user/signup", Some(&draft))
            .await?;
    } else {
        let path = format!("/api/user/update-user/{}", draft.id);
        api.send(Method::PUT, &path, Some(&draft)).await?;
    }
    info!(username = %draft.username, level = ?draft.level, "user saved");
    Ok(())
}

pub async fn delete_user(api: &ApiClient, user_id: i64) -> Result<(), ApiError> {
    if api.session().user_id() == Some(user_id) {
        return Err(ApiError::validation("You cannot delete your own account"));
    }
    let path = format!("/api/user/delete-user/{user_id}");
    api.send::<Value>(Method::DELETE, &path, None).await
}

pub async fn organization(api: &ApiClient) -> Result<Option<Organization>, ApiError> {
    api.get_data("/api/organization/info").await
}

/// Upsert the single organization record.
pub async fn save_organization(api: &ApiClient, org: Organization) -> Result<(), ApiError> {
    let org = Organization {
        name: org.name.trim().to_string(),
        phone: org.phone.trim().to_string(),
        address: org.address.trim().to_string(),
        email: org.email.trim().to_string(),
        website: org.website.trim().to_string(),
        promptpay: org.promptpay.trim().to_string(),
        tax_code: org.tax_code.trim().to_string(),
        ..org
    };
    if org.name.is_empty() {
        return Err(ApiError::validation("Organization name is required"));
    }
    api.send(Method::POST, "/api/organization/create", Some(&org))
        .await
}

/// Store a shop logo; returns the file name to put in `Organization::logo`.
pub async fn upload_logo(api: &ApiClient, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
    let stored = api
        .upload("/api/organization/upload-file", file_name, bytes)
        .await?;
    info!(file = %stored.file_name, "organization logo uploaded");
    Ok(stored.file_name)
}
