use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::fetch::SourceError;
use crate::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{service} API key not configured. Register at {signup} to enable the {feature} feature.")]
    NotConfigured {
        service: &'static str,
        feature: &'static str,
        signup: &'static str,
    },
    #[error("{service} API quota exceeded. Try again tomorrow or upgrade your plan.")]
    QuotaExceeded { service: &'static str },
    #[error("{service} API key invalid or unauthorized. Check your {service} account.")]
    Unauthorized { service: &'static str, status: u16 },
    #[error("{service} API request timed out. Service may be slow, try again in a moment.")]
    Timeout { service: &'static str },
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::NotConfigured { .. } => StatusCode::BAD_REQUEST,
            ApiError::QuotaExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream status echoed back to the client, when there is one.
    fn status_code_hint(&self) -> Option<u16> {
        match self {
            ApiError::QuotaExceeded { .. } => Some(402),
            ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Timeout { .. } => Some(504),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            status_code: self.status_code_hint(),
            error: match self {
                ApiError::Internal { detail, .. } => Some(detail),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotConfigured {
                service,
                feature,
                signup,
            } => ApiError::NotConfigured {
                service,
                feature,
                signup: signup.unwrap_or("the provider's website"),
            },
            SourceError::Upstream {
                service,
                feature,
                source,
            } => match source {
                UpstreamError::Status { status: 402, .. } => ApiError::QuotaExceeded { service },
                UpstreamError::Status {
                    status: status @ (401 | 403),
                    ..
                } => ApiError::Unauthorized { service, status },
                UpstreamError::Timeout => ApiError::Timeout { service },
                UpstreamError::NoData(message) => ApiError::NotFound(message),
                other => ApiError::internal(
                    format!(
                        "Unable to fetch {feature} data. {service} API may be temporarily unavailable."
                    ),
                    other,
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_failure(source: UpstreamError) -> ApiError {
        SourceError::Upstream {
            service: "OpenUV",
            feature: "UV index",
            source,
        }
        .into()
    }

    #[test]
    fn test_missing_credential_is_a_bad_request() {
        let err: ApiError = SourceError::NotConfigured {
            service: "OpenUV",
            feature: "UV index",
            signup: Some("openuv.io"),
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("not configured"));
        assert!(err.to_string().contains("openuv.io"));
    }

    #[test]
    fn test_upstream_status_mapping() {
        let quota = upstream_failure(UpstreamError::Status {
            status: 402,
            body: String::new(),
        });
        assert_eq!(quota.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(quota.status_code_hint(), Some(402));

        let forbidden = upstream_failure(UpstreamError::Status {
            status: 403,
            body: String::new(),
        });
        assert_eq!(forbidden.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.status_code_hint(), Some(403));

        let timeout = upstream_failure(UpstreamError::Timeout);
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let missing = upstream_failure(UpstreamError::NoData("No climate data".into()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let outage = upstream_failure(UpstreamError::Status {
            status: 503,
            body: String::new(),
        });
        assert_eq!(outage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outage.status_code_hint(), None);
    }
}
