use crate::app_config::{AppConfig, FetchStrategy};
use crate::ConfigError;

/// Browser User-Agent sent upstream by default. The origin rejects
/// non-browser agents with a bot challenge.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the real environment so it
/// can be tested with a plain `HashMap` lookup, without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let bind_addr = parse_addr("SIERRA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SIERRA_LOG_LEVEL", "info");
    let allowed_host_suffix = or_default("SIERRA_ALLOWED_HOST_SUFFIX", "sierra.com");
    let fetch_strategy = parse_fetch_strategy(&or_default("SIERRA_FETCH_STRATEGY", "direct"))?;
    let fetch_timeout_secs = parse_u64("SIERRA_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SIERRA_USER_AGENT", DEFAULT_USER_AGENT);
    let product_ttl_secs = parse_u64("SIERRA_PRODUCT_TTL_SECS", "90")?;
    let inventory_ttl_secs = parse_u64("SIERRA_INVENTORY_TTL_SECS", "120")?;
    let render_api_key = lookup("SIERRA_RENDER_API_KEY").ok();
    let render_base_url = or_default("SIERRA_RENDER_BASE_URL", "https://api.scraperapi.com/");
    let inventory_base_url = or_default("SIERRA_INVENTORY_BASE_URL", "https://www.sierra.com");
    let debug_dump_path = lookup("SIERRA_DEBUG_DUMP_PATH").ok().map(PathBuf::from);

    // The rendering proxy cannot run without its key; fail at startup, not
    // on the first request.
    if fetch_strategy == FetchStrategy::Render && render_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "SIERRA_RENDER_API_KEY".to_string(),
        ));
    }

    Ok(AppConfig {
        bind_addr,
        log_level,
        allowed_host_suffix,
        fetch_strategy,
        fetch_timeout_secs,
        user_agent,
        product_ttl_secs,
        inventory_ttl_secs,
        render_api_key,
        render_base_url,
        inventory_base_url,
        debug_dump_path,
    })
}

/// Parse a string into a `FetchStrategy` variant.
fn parse_fetch_strategy(s: &str) -> Result<FetchStrategy, ConfigError> {
    match s {
        "direct" => Ok(FetchStrategy::Direct),
        "render" => Ok(FetchStrategy::Render),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SIERRA_FETCH_STRATEGY".to_string(),
            reason: format!("unknown fetch strategy \"{other}\" (expected direct|render)"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.allowed_host_suffix, "sierra.com");
        assert_eq!(cfg.fetch_strategy, FetchStrategy::Direct);
        assert_eq!(cfg.fetch_timeout_secs, 30);
        assert_eq!(cfg.product_ttl_secs, 90);
        assert_eq!(cfg.inventory_ttl_secs, 120);
        assert!(cfg.render_api_key.is_none());
        assert_eq!(cfg.inventory_base_url, "https://www.sierra.com");
        assert!(cfg.debug_dump_path.is_none());
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SIERRA_BIND_ADDR"),
            "expected InvalidEnvVar(SIERRA_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn render_strategy_without_key_fails_at_startup() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_FETCH_STRATEGY", "render");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SIERRA_RENDER_API_KEY"),
            "expected MissingEnvVar(SIERRA_RENDER_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn render_strategy_with_key_succeeds() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_FETCH_STRATEGY", "render");
        map.insert("SIERRA_RENDER_API_KEY", "k-123");
        let cfg = build_app_config(lookup_from_map(&map)).expect("render config");
        assert_eq!(cfg.fetch_strategy, FetchStrategy::Render);
        assert_eq!(cfg.render_api_key.as_deref(), Some("k-123"));
    }

    #[test]
    fn unknown_fetch_strategy_is_rejected() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_FETCH_STRATEGY", "headless");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SIERRA_FETCH_STRATEGY"),
            "expected InvalidEnvVar(SIERRA_FETCH_STRATEGY), got: {result:?}"
        );
    }

    #[test]
    fn ttl_overrides_are_applied() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_PRODUCT_TTL_SECS", "45");
        map.insert("SIERRA_INVENTORY_TTL_SECS", "300");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.product_ttl_secs, 45);
        assert_eq!(cfg.inventory_ttl_secs, 300);
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_PRODUCT_TTL_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SIERRA_PRODUCT_TTL_SECS"),
            "expected InvalidEnvVar(SIERRA_PRODUCT_TTL_SECS), got: {result:?}"
        );
    }

    #[test]
    fn debug_dump_path_is_optional_and_parsed() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SIERRA_DEBUG_DUMP_PATH", "/tmp/sierra-last.html");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.debug_dump_path.as_deref(),
            Some(std::path::Path::new("/tmp/sierra-last.html"))
        );
    }
}
