//! Account management.
//!
//! Account creation supports two flows: the classical one with an email and
//! password on the account itself, and anonymous creation via an onboarding
//! token that can later be used with
//! [`TokenManager::authorize_with_onboarding_token`](crate::TokenManager::authorize_with_onboarding_token).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use trellis_client::{ClientError, ClientResult, Request, Requestor};
use trellis_types::Muid;

/// A service account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_password: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_muid: Option<Muid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Set on creation only; the server never returns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Account operations against the service.
pub struct AccountService {
    requestor: Arc<dyn Requestor>,
}

impl AccountService {
    /// Creates a service over the shared requestor.
    pub fn new(requestor: Arc<dyn Requestor>) -> Self {
        Self { requestor }
    }

    /// Creates an account, either with identity fields on the account or
    /// anonymously via an onboarding token. A conflicting identity surfaces
    /// as [`ClientError::AlreadyExists`].
    pub async fn create_account(
        &self,
        account: &Account,
        onboarding_token: Option<&str>,
    ) -> ClientResult<Account> {
        let mut body = json!({ "user": serde_json::to_value(account)? });
        if let Some(token) = onboarding_token {
            body["onboarding_token"] = Value::String(token.to_string());
        }
        let response = self
            .requestor
            .request(Request::post("users").body(body))
            .await?;
        Self::account_from(&response.content)
    }

    /// Fetches an account; `None` means the authenticated account itself.
    pub async fn get_account(&self, id: Option<i64>) -> ClientResult<Account> {
        let path = match id {
            Some(id) => format!("users/{id}"),
            None => "users/self".to_string(),
        };
        let response = self.requestor.request(Request::get(path)).await?;
        Self::account_from(&response.content)
    }

    /// Updates the authenticated account. Only the avatar MUID travels on
    /// the wire; a creation-time password never does.
    pub async fn update_account(&self, account: &Account) -> ClientResult<Account> {
        let mut user = serde_json::to_value(account)?;
        if let Some(user) = user.as_object_mut() {
            user.remove("password");
        }
        let response = self
            .requestor
            .request(Request::post("users/self").body(json!({ "user": user })))
            .await?;
        Self::account_from(&response.content)
    }

    /// Changes the account password. `old_password` must be present when
    /// the account already has one.
    pub async fn change_password(
        &self,
        old_password: Option<&str>,
        new_password: &str,
    ) -> ClientResult<()> {
        let mut body = json!({ "new_password": new_password });
        if let Some(old) = old_password {
            body["old_password"] = Value::String(old.to_string());
        }
        self.requestor
            .request(Request::post("users/self/change-password").body(body))
            .await?;
        Ok(())
    }

    fn account_from(content: &Value) -> ClientResult<Account> {
        let user = content.get("user").cloned().ok_or_else(|| {
            ClientError::Protocol("response is missing the user payload".to_string())
        })?;
        Ok(serde_json::from_value(user)?)
    }
}
