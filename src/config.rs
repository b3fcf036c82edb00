use std::time::Duration;

/// Placeholder left in the webhook URL until the spreadsheet script is deployed.
pub const DEMO_PLACEHOLDER: &str = "YOUR_SCRIPT_ID_HERE";

/// Source tag recorded with every lead unless `LEAD_SOURCE` overrides it.
pub const DEFAULT_LEAD_SOURCE: &str = "Landing Page CTA";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_url: String,
    pub lead_source: String,
    pub banner_ttl: Duration,
    pub webhook_timeout: Option<Duration>,
    pub demo_mode: bool,
    pub rate_limit_per_second: Option<u64>,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Lead webhook URL: {}", config.webhook_url);
        tracing::debug!("Lead source: {}", config.lead_source);
        tracing::debug!("Server Port: {}", config.port);
        if config.demo_mode {
            tracing::warn!("Demo mode enabled: submissions are simulated, nothing is delivered");
        }

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_url = var("LEAD_WEBHOOK_URL")
            .ok_or_else(|| anyhow::anyhow!("LEAD_WEBHOOK_URL environment variable required"))
            .and_then(|raw| {
                let url = raw.trim().to_string();
                let parsed = url::Url::parse(&url)
                    .map_err(|e| anyhow::anyhow!("LEAD_WEBHOOK_URL is not a valid URL: {}", e))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    anyhow::bail!("LEAD_WEBHOOK_URL must start with http:// or https://");
                }
                Ok(url)
            })?;

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let banner_ttl_secs: u64 = var("BANNER_TTL_SECS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("BANNER_TTL_SECS must be a whole number of seconds"))?;

        let webhook_timeout = var("WEBHOOK_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| anyhow::anyhow!("WEBHOOK_TIMEOUT_SECS must be a whole number of seconds"))
            })
            .transpose()?;

        let demo_flag = var("LEAD_DEMO_MODE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let rate_limit_per_second = match var("RATE_LIMIT_PER_SECOND") {
            None => Some(10),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => anyhow::bail!("RATE_LIMIT_PER_SECOND must be a non-negative number"),
            },
        };

        let rate_limit_burst = var("RATE_LIMIT_BURST")
            .unwrap_or_else(|| "20".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))?;

        Ok(Self {
            port,
            demo_mode: demo_flag || webhook_url.contains(DEMO_PLACEHOLDER),
            webhook_url,
            lead_source: var("LEAD_SOURCE")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
            banner_ttl: Duration::from_secs(banner_ttl_secs),
            webhook_timeout,
            rate_limit_per_second,
            rate_limit_burst,
        })
    }
}
