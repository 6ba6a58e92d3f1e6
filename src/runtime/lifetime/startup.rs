use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::object_store::ObjectStore;
use crate::search::ResourceSuggester;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub object_store: Arc<dyn ObjectStore>,
    pub suggester: Arc<dyn ResourceSuggester>,
}

// 按名称构造缓存后端
async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>, String> {
    let constructor = get_object_cache_plugin(name)
        .ok_or_else(|| format!("Cache backend '{name}' not found in registry"))?;
    constructor()
        .await
        .map(Arc::from)
        .map_err(|e| format!("Failed to create {name} cache: {e}"))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            return Ok(cache);
        }
        Err(e) => warn!("{}", e),
    }

    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        match build_cache("moka").await {
            Ok(cache) => {
                warn!("Successfully created fallback Moka (in-memory) cache backend");
                return Ok(cache);
            }
            Err(e) => warn!("{}", e),
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 准备服务器启动的上下文
/// 包括存储、缓存、对象存储和资源推荐
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        debug!(
            "Registered cache backends: {:?}",
            crate::cache::register::registered_object_cache_plugins()
        );
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let object_store = crate::object_store::create_object_store()
        .await
        .expect("Failed to create object store");
    warn!(
        "Object store initialized at {}",
        AppConfig::get().upload.dir
    );

    let suggester = crate::search::create_suggester();

    StartupContext {
        storage,
        cache,
        object_store,
        suggester,
    }
}
