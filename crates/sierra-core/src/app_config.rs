use std::net::SocketAddr;
use std::path::PathBuf;

/// How raw PDP HTML is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Direct origin fetch with manual redirect following and cookie capture.
    Direct,
    /// Third-party rendering proxy; requires `SIERRA_RENDER_API_KEY`.
    Render,
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::Direct => write!(f, "direct"),
            FetchStrategy::Render => write!(f, "render"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub allowed_host_suffix: String,
    pub fetch_strategy: FetchStrategy,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub product_ttl_secs: u64,
    pub inventory_ttl_secs: u64,
    pub render_api_key: Option<String>,
    pub render_base_url: String,
    pub inventory_base_url: String,
    pub debug_dump_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("allowed_host_suffix", &self.allowed_host_suffix)
            .field("fetch_strategy", &self.fetch_strategy)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("product_ttl_secs", &self.product_ttl_secs)
            .field("inventory_ttl_secs", &self.inventory_ttl_secs)
            .field(
                "render_api_key",
                &self.render_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("render_base_url", &self.render_base_url)
            .field("inventory_base_url", &self.inventory_base_url)
            .field("debug_dump_path", &self.debug_dump_path)
            .finish()
    }
}
