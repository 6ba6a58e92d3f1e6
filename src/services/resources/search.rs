use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, warn};

use super::ResourceService;
use crate::models::{
    ApiResponse, ErrorCode,
    resources::{requests::ResourceSearchQuery, responses::ResourceSearchResponse},
};
use crate::services::{internal_error, require_actor};

pub async fn search_resources(
    service: &ResourceService,
    request: &HttpRequest,
    query: ResourceSearchQuery,
) -> ActixResult<HttpResponse> {
    if let Err(resp) = require_actor(request) {
        return Ok(resp);
    }

    let keyword = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SearchQueryRequired,
                "Search query is required",
            )));
        }
    };
    let category = query.category().to_string();
    let limit = query.limit();

    let storage = service.get_storage(request);
    let existing = match storage.search_resources(&keyword, limit as u64).await {
        Ok(found) => found,
        Err(e) => return Ok(internal_error("Failed to search resources", e)),
    };

    // 推荐失败时按空列表处理
    let suggestions = if existing.len() < limit {
        let suggester = service.get_suggester(request);
        match suggester.suggest(&keyword, &category, limit).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("AI suggestions failed for '{}': {}", keyword, e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    debug!(
        "Search '{}' returned {} resources and {} suggestions",
        keyword,
        existing.len(),
        suggestions.len()
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResourceSearchResponse::combine(keyword, category, existing, suggestions, limit),
        "Search completed successfully",
    )))
}
