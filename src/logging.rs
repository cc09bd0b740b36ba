use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_SERVICE_NAME: &str = "medforecast";
const DEFAULT_LOG_LEVEL: &str = "info,tower_http=debug";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same keys as `from_env`, read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            loki_enabled: lookup("LOKI_ENABLED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(false),
            loki_url: lookup("LOKI_URL").filter(|v| !v.trim().is_empty()),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| format!("invalid RUST_LOG '{}': {}", self.log_level, e))?;
        Ok(())
    }

    fn loki_url(&self) -> Option<&str> {
        self.loki_url.as_deref().filter(|_| self.loki_enabled)
    }
}

/// Install the global subscriber: console output always, Loki shipping when
/// configured. Must run inside the tokio runtime when Loki is on.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let console = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level)?)
        .with(fmt::layer().with_target(true));

    #[cfg(feature = "loki")]
    console.with(loki_layer(&config)?).try_init()?;
    #[cfg(not(feature = "loki"))]
    console.try_init()?;

    match config.loki_url() {
        Some(url) if cfg!(feature = "loki") => {
            tracing::info!("Logging to console and Loki at {} ({})", url, config.environment)
        }
        Some(_) => tracing::warn!("LOKI_ENABLED is set but this build has no Loki support"),
        None => tracing::info!("Console logging initialized ({})", config.environment),
    }
    Ok(())
}

/// `None` when Loki is off, so the subscriber stack has one shape either way.
#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, Box<dyn std::error::Error>> {
    let Some(loki_url) = config.loki_url() else {
        return Ok(None);
    };

    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url::Url::parse(loki_url)?)?;

    // ships buffered events
    tokio::spawn(task);
    Ok(Some(layer))
}
