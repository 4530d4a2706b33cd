//! API client for communicating with the SkillSwap REST backend.
//!
//! This module provides the `ApiClient` struct for building requests against
//! the resolved base URL, attaching the bearer token, and turning every
//! response or transport failure into either decoded JSON or an `ApiError`.

use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::Config;
use crate::models::auth::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
};
use crate::models::swap::StatusUpdate;
use crate::models::{
    LoginResponse, Match, NewFeedback, NewSwapRequest, ProfileUpdate, SignupRequest, SwapStatus,
    UserProfileUpdate,
};

use super::error::INVALID_FORMAT_MESSAGE;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Multipart field the backend reads the uploaded picture from.
pub const PROFILE_PHOTO_FIELD: &str = "profilePhoto";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether a call carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Bearer,
}

/// API client for the SkillSwap backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    /// Resolved base URL; empty means same-origin.
    base_url: String,
    origin: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("origin", &self.origin)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (already resolved) running under `origin`.
    ///
    /// No request timeout is set; calls rely on transport defaults.
    pub fn new(base_url: impl Into<String>, origin: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            origin: origin.into(),
            token: None,
        })
    }

    /// Create a client from configuration, resolving the base URL once.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.resolve_base_url(), config.origin())
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            origin: self.origin.clone(),
            token,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The backend as named in connection errors.
    fn backend(&self) -> &str {
        if self.base_url.is_empty() {
            &self.origin
        } else {
            &self.base_url
        }
    }

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so caller-supplied ids cannot alter the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(self.backend()).map_err(|e| {
            ApiError::InvalidRequest(format!("bad base URL {}: {}", self.backend(), e))
        })?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("bad base URL {}", self.backend())))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, access: Access, json: bool) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if json {
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
        }
        headers.insert(
            header::ORIGIN,
            header::HeaderValue::from_str(&self.origin)
                .map_err(|_| ApiError::InvalidRequest(format!("bad origin {}", self.origin)))?,
        );
        if access == Access::Bearer {
            if let Some(ref token) = self.token {
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                        ApiError::InvalidRequest("token is not a valid header value".to_string())
                    })?,
                );
            }
        }
        Ok(headers)
    }

    /// Dispatch a request, classifying failures where no response arrived.
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| {
            if e.is_builder() {
                return ApiError::InvalidRequest(e.to_string());
            }
            // The URL is logged separately and must not feed the classification.
            let signature = ApiError::transport_signature(&e.without_url());
            let err = ApiError::from_transport(&signature, self.backend(), &self.origin);
            error!(
                url = %url,
                base_url = %self.base_url,
                origin = %self.origin,
                cause = %signature,
                "Network error"
            );
            err
        })
    }

    /// Decode a success body, or classify a failure status.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("");
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), reason, &url, &body);
            error!(
                url = %url,
                status = status.as_u16(),
                status_text = reason,
                error_message = %err,
                base_url = %self.base_url,
                body = %ApiError::truncate_body(&body),
                "API error"
            );
            return Err(err);
        }

        let text = response.text().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to read response body");
            ApiError::Validation(INVALID_FORMAT_MESSAGE.to_string())
        })?;

        serde_json::from_str(&text).map_err(|e| {
            error!(
                url = %url,
                error = %e,
                body = %ApiError::truncate_body(&text),
                "Failed to parse response as JSON"
            );
            ApiError::Validation(INVALID_FORMAT_MESSAGE.to_string())
        })
    }

    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        access: Access,
    ) -> Result<T, ApiError> {
        let bearer = access == Access::Bearer && self.token.is_some();
        debug!(method = %method, url = %url, bearer, "Sending request");

        let mut request = self
            .client
            .request(method, url.clone())
            .headers(self.headers(access, true)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.send(request, &url).await?;
        self.handle_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.call::<T, ()>(Method::GET, url, None, Access::Bearer).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.call::<T, ()>(Method::DELETE, url, None, Access::Bearer).await
    }

    async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        self.call(Method::POST, url, Some(body), Access::Public).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        self.call(method, url, Some(body), Access::Bearer).await
    }

    // ===== Auth =====

    /// Register a new account. Required profile fields are enforced by the backend.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "auth", "signup"])?;
        self.post_public(url, request).await
    }

    /// Exchange credentials for a token and user record.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["api", "auth", "login"])?;
        self.post_public(url, &LoginRequest { email, password }).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "auth", "forgot-password"])?;
        self.post_public(url, &ForgotPasswordRequest { email }).await
    }

    /// Set a new password using the token from a reset email.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "auth", "reset-password", reset_token])?;
        self.post_public(url, &ResetPasswordRequest { password }).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "auth", "change-password"])?;
        let body = ChangePasswordRequest {
            current_password,
            new_password,
        };
        self.send_json(Method::POST, url, &body).await
    }

    // ===== User =====

    /// Fetch the dashboard. Without a user id the backend identifies the
    /// caller from the bearer token.
    pub async fn get_dashboard(&self, user_id: Option<&str>) -> Result<Value, ApiError> {
        let url = match user_id {
            Some(id) => self.endpoint(&["api", "users", "dashboard", id])?,
            None => self.endpoint(&["api", "user", "dashboard"])?,
        };
        self.get(url).await
    }

    pub async fn get_dashboard_stats(&self, user_id: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "users", "dashboard", user_id])?;
        self.get(url).await
    }

    /// `PUT /api/user/profile`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "user", "profile"])?;
        self.send_json(Method::PUT, url, update).await
    }

    /// `PUT /api/users/profile`. Overlaps with `update_profile`; both are kept
    /// until the backend settles on one.
    pub async fn update_user_profile(&self, update: &UserProfileUpdate) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "users", "profile"])?;
        self.send_json(Method::PUT, url, update).await
    }

    /// Upload a profile picture as multipart form data. No JSON content type
    /// is set so the transport can add the multipart boundary.
    pub async fn upload_profile_picture(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "users", "profile-picture"])?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::InvalidRequest(format!("bad MIME type {}: {}", mime, e)))?;
        let form = multipart::Form::new().part(PROFILE_PHOTO_FIELD, part);

        debug!(url = %url, file_name, "Uploading profile picture");
        let request = self
            .client
            .post(url.clone())
            .headers(self.headers(Access::Bearer, false)?)
            .multipart(form);

        let response = self.send(request, &url).await?;
        self.handle_response(response).await
    }

    /// List users, optionally only those offering `skill`.
    pub async fn search_users(&self, skill: Option<&str>) -> Result<Value, ApiError> {
        let mut url = self.endpoint(&["api", "users"])?;
        if let Some(skill) = skill.filter(|s| !s.is_empty()) {
            url.query_pairs_mut().append_pair("skill", skill);
        }
        self.get(url).await
    }

    // ===== Swap requests =====

    pub async fn send_request(&self, request: &NewSwapRequest) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "swap", "request"])?;
        self.send_json(Method::POST, url, request).await
    }

    pub async fn get_requests(&self) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "swap", "requests"])?;
        self.get(url).await
    }

    pub async fn update_request_status(
        &self,
        request_id: &str,
        status: SwapStatus,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "swap", "requests", request_id])?;
        self.send_json(Method::PATCH, url, &StatusUpdate { status }).await
    }

    pub async fn delete_request(&self, request_id: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "swap", "requests", request_id])?;
        self.delete(url).await
    }

    // ===== Feedback =====

    pub async fn submit_feedback(&self, feedback: &NewFeedback) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "feedback"])?;
        self.send_json(Method::POST, url, feedback).await
    }

    pub async fn get_feedback(&self) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "feedback"])?;
        self.get(url).await
    }

    // ===== Matches =====

    /// Suggested exchange partners for the current user.
    pub async fn get_matches(&self) -> Result<Vec<Match>, ApiError> {
        let url = self.endpoint(&["api", "matches"])?;
        self.get(url).await
    }
}
