use anyhow::Context;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match get("TIMETABLER__SERVER__PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("TIMETABLER__SERVER__PORT is not a port: {v}"))?,
            None => DEFAULT_PORT,
        };
        let body_limit = match get("TIMETABLER__SERVER__BODY_LIMIT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("TIMETABLER__SERVER__BODY_LIMIT is not a byte count: {v}"))?,
            None => DEFAULT_BODY_LIMIT,
        };
        Ok(Self { port, body_limit })
    }

    pub fn addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ServerConfig { port: 8080, body_limit: 2 * 1024 * 1024 });
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_overrides_and_rejects_garbage() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("TIMETABLER__SERVER__PORT", "9000"),
            ("TIMETABLER__SERVER__BODY_LIMIT", "1024"),
        ]))
        .unwrap();
        assert_eq!((cfg.port, cfg.body_limit), (9000, 1024));
        assert!(ServerConfig::from_lookup(lookup(&[("TIMETABLER__SERVER__PORT", "http")])).is_err());
    }
}
