use super::error::ApiError;
use chrono::Datelike;
use uuid::Uuid;

const FIRST_SEASON: i32 = 1876;
const MAX_PAGE_SIZE: i64 = 200;

pub fn season(season: i32) -> Result<i32, ApiError> {
    let latest = chrono::Utc::now().year() + 1;
    if (FIRST_SEASON..=latest).contains(&season) {
        Ok(season)
    } else {
        Err(ApiError::InvalidInput(format!(
            "season must be between {} and {}",
            FIRST_SEASON, latest
        )))
    }
}

pub fn page(page: i64) -> Result<i64, ApiError> {
    if page >= 1 {
        Ok(page)
    } else {
        Err(ApiError::InvalidInput(String::from("page must be at least 1")))
    }
}

pub fn page_size(size: i64) -> Result<i64, ApiError> {
    if (1..=MAX_PAGE_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(ApiError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )))
    }
}

pub fn uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::InvalidInput(format!("expected a UUID, got {:?}", clipped(raw))))
}

/// free-text inputs may not smuggle control characters or SQL
/// metacharacters past the boundary
pub fn sanitized(input: &str) -> Result<&str, ApiError> {
    let hostile = input.chars().any(|c| c.is_control())
        || input.contains('\'')
        || input.contains('"')
        || input.contains(';')
        || input.contains('\\')
        || input.contains("--")
        || input.contains("/*");
    if hostile {
        Err(ApiError::InvalidInput(String::from(
            "input contains forbidden characters",
        )))
    } else {
        Ok(input)
    }
}

fn clipped(raw: &str) -> &str {
    match raw.char_indices().nth(48) {
        Some((end, _)) => &raw[..end],
        None => raw,
    }
}
