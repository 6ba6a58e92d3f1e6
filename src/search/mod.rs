//! 学习资源的 AI 推荐
//!
//! 推荐失败不影响检索结果，调用方拿到错误后按空列表处理。

pub mod gemini;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::resources::responses::SuggestedResource;

pub use gemini::GeminiSuggester;

#[async_trait::async_trait]
pub trait ResourceSuggester: Send + Sync {
    async fn suggest(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<SuggestedResource>>;
}

/// 未配置 API Key 时使用，始终返回空列表
pub struct DisabledSuggester;

#[async_trait::async_trait]
impl ResourceSuggester for DisabledSuggester {
    async fn suggest(&self, _: &str, _: &str, _: usize) -> Result<Vec<SuggestedResource>> {
        Ok(Vec::new())
    }
}

pub fn create_suggester() -> Arc<dyn ResourceSuggester> {
    let config = AppConfig::get();
    if !config.gemini_enabled() {
        warn!("GEMINI_API_KEY not configured, AI resource suggestions disabled");
        return Arc::new(DisabledSuggester);
    }

    match GeminiSuggester::from_config(&config.search) {
        Ok(suggester) => {
            info!("AI resource suggestions enabled ({})", config.search.gemini_model);
            Arc::new(suggester)
        }
        Err(e) => {
            warn!("Failed to create Gemini client, suggestions disabled: {}", e);
            Arc::new(DisabledSuggester)
        }
    }
}
