use crate::{errors::ServiceError, ApiResponse};
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

/// Standard success response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Standard created response
pub fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    /// Defaults depend on the listing.
    pub per_page: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

/// Body of every status-change endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StatusChangeRequest {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub id: i32,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: i32) -> Self {
        Self { id, deleted: true }
    }
}

/// Treats an empty or whitespace-only query value as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_are_dropped() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("MP".into())).as_deref(), Some("MP"));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn status_change_needs_a_status() {
        let request = StatusChangeRequest {
            status: String::new(),
            note: None,
        };
        assert!(validate_input(&request).is_err());
    }
}
