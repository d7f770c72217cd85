use crate::dto::response::ErrorBody;
use crate::registry::CreateError;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;

/// boundary error with a machine-readable kind. internal errors are
/// logged with their chain and returned opaque.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("resource not found")]
    NotFound,
    #[error("run failed")]
    RunFailed { reason: Option<String> },
    #[error("run cancelled")]
    Cancelled { reason: Option<String> },
    #[error("run exceeded its time budget")]
    Timeout { reason: Option<String> },
    #[error("simulation is still running")]
    NotReady,
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error("rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<CreateError> for ApiError {
    fn from(e: CreateError) -> Self {
        match e {
            CreateError::UnknownGame(_) => ApiError::NotFound,
            CreateError::Store(inner) => ApiError::Upstream(format!("{:#}", inner)),
            invalid => ApiError::InvalidInput(invalid.to_string()),
        }
    }
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound => "not_found",
            ApiError::RunFailed { .. } => "internal",
            ApiError::Cancelled { .. } => "cancelled",
            ApiError::Timeout { .. } => "timeout",
            ApiError::NotReady => "not_ready",
            ApiError::Upstream(_) => "upstream_unavailable",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RunFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Cancelled { .. } => StatusCode::GONE,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::NotReady => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ApiError::RateLimited { retry_after } => {
                Some(serde_json::json!({ "retry_after_secs": retry_after }))
            }
            ApiError::RunFailed { reason }
            | ApiError::Cancelled { reason }
            | ApiError::Timeout { reason } => {
                reason.as_ref().map(|r| serde_json::json!({ "reason": r }))
            }
            _ => None,
        };
        let message = match self {
            // never leak internals
            ApiError::Internal(e) => {
                log::error!("internal error at the boundary: {:#}", e);
                String::from("internal error")
            }
            other => other.to_string(),
        };
        let mut response = HttpResponse::build(self.status_code());
        if let ApiError::RateLimited { retry_after } = self {
            response.insert_header(("retry-after", retry_after.to_string()));
        }
        response.json(ErrorBody {
            error: message,
            code: self.code().to_string(),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use uuid::Uuid;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(
            ApiError::InvalidInput(String::from("bad season")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotReady.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::RateLimited { retry_after: 30 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("secret detail")).code(),
            "internal"
        );
    }

    #[test]
    fn run_failures_are_distinguishable_from_unknown_ids() {
        let cancelled = ApiError::Cancelled { reason: Some(String::from("operator")) };
        let timed_out = ApiError::Timeout { reason: None };
        assert_eq!(cancelled.code(), "cancelled");
        assert_eq!(cancelled.status_code(), StatusCode::GONE);
        assert_eq!(timed_out.code(), "timeout");
        assert_eq!(timed_out.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_ne!(cancelled.code(), ApiError::NotFound.code());
        assert_ne!(cancelled.status_code(), ApiError::NotFound.status_code());
    }

    #[test]
    fn admission_errors_translate_from_the_registry() {
        let unknown: ApiError = CreateError::UnknownGame(Uuid::nil()).into();
        assert_eq!(unknown.code(), "not_found");
        let oversized: ApiError = CreateError::InvalidCount(200_000).into();
        assert_eq!(oversized.code(), "invalid_input");
        assert_eq!(oversized.status_code(), StatusCode::BAD_REQUEST);
    }
}
