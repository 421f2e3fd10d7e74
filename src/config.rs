use std::net::SocketAddr;

use crate::documents::{GeneratorOptions, DEFAULT_LETTERHEAD, DEFAULT_SIGNER};

const DEFAULT_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_SIGNATURE: &str = "static/images/signature.png";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// File path or `http(s)://` URL of the signature image.
    pub signature_source: Option<String>,
    pub options: GeneratorOptions,
}

impl ServerConfig {
    /// Read `SHIPDOC_*` variables; call `dotenvy::dotenv()` first to pick up
    /// a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr: SocketAddr = var("SHIPDOC_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()?;

        // An explicitly empty value disables the signature image
        let signature_source = match lookup("SHIPDOC_SIGNATURE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_SIGNATURE.to_string()),
        };

        let options = GeneratorOptions {
            letterhead: var("SHIPDOC_LETTERHEAD").unwrap_or_else(|| DEFAULT_LETTERHEAD.to_string()),
            signer_name: var("SHIPDOC_SIGNER").unwrap_or_else(|| DEFAULT_SIGNER.to_string()),
            ..GeneratorOptions::default()
        };

        Ok(ServerConfig {
            addr,
            signature_source,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:3001".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.signature_source.as_deref(), Some(DEFAULT_SIGNATURE));
        assert_eq!(cfg.options, GeneratorOptions::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("SHIPDOC_ADDR", "0.0.0.0:8080"),
            ("SHIPDOC_SIGNATURE", ""),
            ("SHIPDOC_SIGNER", "J. Doe"),
        ])
        .unwrap();
        assert_eq!(cfg.addr.port(), 8080);
        assert_eq!(cfg.signature_source, None);
        assert_eq!(cfg.options.signer_name, "J. Doe");
        assert_eq!(cfg.options.letterhead, DEFAULT_LETTERHEAD);
    }

    #[test]
    fn test_bad_address() {
        assert!(config(&[("SHIPDOC_ADDR", "not-an-address")]).is_err());
    }
}
