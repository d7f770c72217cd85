use super::Gateway;
use super::error::ApiError;
use super::metrics::Metrics;
use super::validate;
use crate::dto::request::ListQuery;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use actix_web::web;
use std::time::Duration;

/// cache key: path plus canonicalized (sorted) query parameters
pub fn cache_key(path: &str, query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
    pairs.sort_unstable();
    format!("{}?{}", path, pairs.join("&"))
}

/// per-endpoint freshness: reference entities move slowly, schedules
/// less so
fn ttl_for(path: &str, fallback: Duration) -> Duration {
    if path.starts_with("/teams") || path.starts_with("/stadiums") {
        Duration::from_secs(3_600)
    } else if path.starts_with("/players") {
        Duration::from_secs(1_800)
    } else {
        fallback
    }
}

/// proxied reference listing (`/teams`, `/players`, `/games`)
pub async fn listing(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    check(&query)?;
    forward(&gateway, &req).await
}

/// proxied reference entity (`/teams/{id}`, ...)
pub async fn entity(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    validate::uuid(&path)?;
    forward(&gateway, &req).await
}

fn check(query: &ListQuery) -> Result<(), ApiError> {
    if let Some(season) = query.season {
        validate::season(season)?;
    }
    if let Some(page) = query.page {
        validate::page(page)?;
    }
    if let Some(size) = query.page_size {
        validate::page_size(size)?;
    }
    if let Some(q) = &query.q {
        validate::sanitized(q)?;
    }
    Ok(())
}

async fn forward(gateway: &Gateway, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let key = cache_key(req.path(), req.query_string());
    if let Some(body) = gateway.cache.lock().expect("query cache lock").get(&key) {
        Metrics::bump(&gateway.metrics.cache_hits);
        return Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body));
    }
    Metrics::bump(&gateway.metrics.cache_misses);
    let url = format!("{}{}", gateway.settings.data_service_url, req.uri());
    let response = gateway.http.get(&url).send().await.map_err(|e| {
        Metrics::bump(&gateway.metrics.upstream_errors);
        ApiError::Upstream(e.to_string())
    })?;
    if !response.status().is_success() {
        Metrics::bump(&gateway.metrics.upstream_errors);
        return Err(ApiError::Upstream(format!(
            "data service returned {}",
            response.status()
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    gateway.cache.lock().expect("query cache lock").insert(
        key,
        body.clone(),
        ttl_for(req.path(), gateway.settings.cache_ttl),
    );
    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_canonicalize_parameter_order() {
        assert_eq!(
            cache_key("/players", "season=2024&page=2"),
            cache_key("/players", "page=2&season=2024"),
        );
        assert_ne!(
            cache_key("/players", "season=2024"),
            cache_key("/players", "season=2023"),
        );
        assert_ne!(cache_key("/players", ""), cache_key("/teams", ""));
    }

    #[test]
    fn reference_ttls_outlive_the_default() {
        let fallback = Duration::from_secs(300);
        assert_eq!(ttl_for("/teams", fallback), Duration::from_secs(3_600));
        assert_eq!(ttl_for("/players/abc", fallback), Duration::from_secs(1_800));
        assert_eq!(ttl_for("/games", fallback), fallback);
    }
}
