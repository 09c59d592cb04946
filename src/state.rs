use crate::config::Config;
use crate::gemini_client::GeminiClient;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct AppState {
    // Swapped wholesale on reload; handlers take a snapshot per request
    pub config: Arc<RwLock<Arc<Config>>>,
    pub gemini_client: Arc<GeminiClient>,
}

impl AppState {
    pub fn new(config: Config, gemini_client: Arc<GeminiClient>) -> Self {
        Self {
            config: Arc::new(RwLock::new(Arc::new(config))),
            gemini_client,
        }
    }

    pub async fn config(&self) -> Arc<Config> {
        self.config.read().await.clone()
    }

    pub async fn replace_config(&self, config: Config) {
        *self.config.write().await = Arc::new(config);
    }
}
