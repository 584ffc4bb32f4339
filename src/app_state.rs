use std::sync::Arc;

use tracing::warn;

use crate::completion::{CompletionEngine, OpenAiEngine};
use crate::config::Settings;
use crate::config_store::{ConfigStore, FirestoreConfigStore};

/// 全局共享状态：
/// - store: 读取 spirit code 配置
/// - engine: OpenAI 补全引擎；没有 API key 时为 None，由 handler 返回 500
/// - default_model: 配置里没有 model 时使用
pub struct AppState {
    pub store: Arc<dyn ConfigStore>,
    pub engine: Option<Arc<dyn CompletionEngine>>,
    pub default_model: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        engine: Option<Arc<dyn CompletionEngine>>,
        default_model: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            engine,
            default_model: default_model.into(),
        })
    }

    /// 冷启动：构造 Firestore 配置来源并尝试初始化一次
    pub fn from_settings(settings: Settings) -> Arc<Self> {
        let engine: Option<Arc<dyn CompletionEngine>> = match &settings.openai_api_key {
            Some(key) => Some(OpenAiEngine::new(key.as_str(), &settings.openai_base_url)),
            None => {
                warn!("ZENAI_BACKEND: OPENAI_API_KEY is not set");
                None
            }
        };
        let default_model = settings.default_model.clone();

        let store = FirestoreConfigStore::new(settings);
        // 失败已被记录并缓存，请求时会以 500 返回
        let _ = store.initialize();

        Self::new(store, engine, default_model)
    }
}
