//! Runtime configuration for RPC exchanges.

use serde::Deserialize;
use tracing::warn;

use crate::error::{LstError, Result};

/// What the receiver does with a node kind it has no codec for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKindPolicy {
    /// Abort the exchange with [`LstError::UnregisteredKindName`].
    Reject,
    /// Capture the node's frame into an opaque node and pass it through.
    #[default]
    Preserve,
}

impl UnknownKindPolicy {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Some(UnknownKindPolicy::Reject),
            "preserve" => Some(UnknownKindPolicy::Preserve),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LstConfig {
    /// Ops buffered by a send queue before a batch is flushed.
    pub rpc_batch_size: usize,
    pub unknown_kinds: UnknownKindPolicy,
    /// Trace every op batch on the `lst_js::wire` target.
    pub wire_log: bool,
}

impl Default for LstConfig {
    fn default() -> Self {
        LstConfig { rpc_batch_size: 1000, unknown_kinds: UnknownKindPolicy::default(), wire_log: false }
    }
}

impl LstConfig {
    /// Reads `LST_RPC_BATCH_SIZE`, `LST_UNKNOWN_KINDS` and `LST_WIRE_LOG`,
    /// keeping the default for anything unset or unparseable.
    pub fn from_env_or_default() -> Self {
        let mut config = LstConfig::default();

        if let Ok(size) = std::env::var("LST_RPC_BATCH_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.rpc_batch_size = size,
                _ => warn!("Invalid LST_RPC_BATCH_SIZE '{}', using {}", size, config.rpc_batch_size),
            }
        }

        if let Ok(policy) = std::env::var("LST_UNKNOWN_KINDS") {
            match UnknownKindPolicy::parse(&policy) {
                Some(policy) => config.unknown_kinds = policy,
                None => warn!("Unknown LST_UNKNOWN_KINDS '{}', using {:?}", policy, config.unknown_kinds),
            }
        }

        if let Ok(flag) = std::env::var("LST_WIRE_LOG") {
            config.wire_log = matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LstConfig = serde_json::from_str(json).map_err(|e| LstError::Config(e.to_string()))?;
        if config.rpc_batch_size == 0 {
            return Err(LstError::Config("rpcBatchSize must be greater than zero".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LstConfig::default();
        assert_eq!(config.rpc_batch_size, 1000);
        assert_eq!(config.unknown_kinds, UnknownKindPolicy::Preserve);
        assert!(!config.wire_log);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = LstConfig::from_json_str(r#"{"unknownKinds": "reject"}"#).unwrap();
        assert_eq!(config.unknown_kinds, UnknownKindPolicy::Reject);
        assert_eq!(config.rpc_batch_size, 1000);
    }

    #[test]
    fn test_from_json_rejects_zero_batch() {
        assert!(matches!(LstConfig::from_json_str(r#"{"rpcBatchSize": 0}"#), Err(LstError::Config(_))));
        assert!(matches!(LstConfig::from_json_str("not json"), Err(LstError::Config(_))));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(UnknownKindPolicy::parse(" Reject "), Some(UnknownKindPolicy::Reject));
        assert_eq!(UnknownKindPolicy::parse("drop"), None);
    }
}
