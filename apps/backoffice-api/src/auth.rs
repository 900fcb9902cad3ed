//! Acting principal.
//!
//! Authentication happens upstream. Requests arrive with the store and
//! (optionally) the staff member already resolved, as headers that are
//! trusted as given.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::ApiError;

pub const STORE_HEADER: &str = "x-store-id";
pub const STAFF_HEADER: &str = "x-staff-id";

/// Who is acting: the store (required) and the staff account (optional).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub store_id: String,
    pub staff_id: Option<String>,
}

impl Principal {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let store_id = header_value(headers, STORE_HEADER)?
            .ok_or_else(|| ApiError::validation(format!("{STORE_HEADER} header is required")))?;
        let staff_id = header_value(headers, STAFF_HEADER)?;

        Ok(Principal { store_id, staff_id })
    }
}

/// Trimmed header value, `None` when absent or blank.
fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let Ok(value) = value.to_str() else {
        return Err(ApiError::validation(format!("{name} header is not valid text")));
    };

    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Principal::from_headers(&parts.headers)
    }
}
