/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "planning_poker=debug,tower_http=debug";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Server settings read from the environment
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Tell the actor why an event was dropped instead of ignoring it silently
    pub notify_rejections: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("POKER_BIND_ADDR")
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let notify_rejections = lookup("POKER_NOTIFY_REJECTIONS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(false);

        Self {
            bind_addr,
            notify_rejections,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
