pub mod broker;
pub mod domain;
pub mod model;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub broker_api_base_url: Option<String>,
        pub broker_api_key: Option<String>,
        pub broker_api_secret: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                broker_api_base_url: std::env::var("BROKER_API_BASE_URL").ok(),
                broker_api_key: std::env::var("BROKER_API_KEY").ok(),
                broker_api_secret: std::env::var("BROKER_API_SECRET").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_broker_api_base_url(&self) -> anyhow::Result<&str> {
            self.broker_api_base_url
                .as_deref()
                .context("BROKER_API_BASE_URL is required")
        }
    }
}
