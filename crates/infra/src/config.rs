use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub log_level: String,
    pub input_path: String,
    pub output_path: String,
    pub venue_id: String,
    pub worker_concurrency: usize,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = Self::builder()?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("log_level", "info")?
            .set_default("input_path", "output/all_notes_readable.json")?
            .set_default("output_path", "output/structured_review_conversations.json")?
            .set_default("venue_id", forumchain_domain::paper::DEFAULT_VENUE_ID)?
            .set_default("worker_concurrency", 4)?
            .set_default("metrics_enabled", false)
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn worker_concurrency(&self) -> usize {
        self.worker_concurrency.max(1)
    }
}
