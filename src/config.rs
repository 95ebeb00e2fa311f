use std::env;

const DEFAULT_V1_URL: &str = "http://localhost/v1";
const DEFAULT_V2_URL: &str = "http://localhost:3333/v2";
const DEFAULT_SIPI_URL: &str = "http://localhost:1024";
const DEFAULT_PROXY: &str = "http://localhost:3333";
const DEFAULT_PASSWORD: &str = "test";

/// Connection settings shared by all scenarios.
///
/// `username` is optional because every scenario brings its own default user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub v1_url: String,
    pub v2_url: String,
    pub sipi_url: String,
    pub proxy: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// An empty `SMOKE_PROXY` disables the proxy.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            v1_url: non_empty("SMOKE_V1_URL").unwrap_or_else(|| DEFAULT_V1_URL.to_string()),
            v2_url: non_empty("SMOKE_V2_URL").unwrap_or_else(|| DEFAULT_V2_URL.to_string()),
            sipi_url: non_empty("SMOKE_SIPI_URL").unwrap_or_else(|| DEFAULT_SIPI_URL.to_string()),
            proxy: match lookup("SMOKE_PROXY") {
                Some(p) if p.trim().is_empty() => None,
                Some(p) => Some(p),
                None => Some(DEFAULT_PROXY.to_string()),
            },
            username: non_empty("SMOKE_USER"),
            password: non_empty("SMOKE_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.v1_url, "http://localhost/v1");
        assert_eq!(config.v2_url, "http://localhost:3333/v2");
        assert_eq!(config.proxy.as_deref(), Some("http://localhost:3333"));
        assert_eq!(config.username, None);
        assert_eq!(config.password, "test");
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SMOKE_V1_URL", "http://knora.test/v1"),
            ("SMOKE_PROXY", ""),
            ("SMOKE_USER", "root"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.v1_url, "http://knora.test/v1");
        assert_eq!(config.proxy, None);
        assert_eq!(config.username.as_deref(), Some("root"));
        assert_eq!(config.sipi_url, "http://localhost:1024");
    }
}
