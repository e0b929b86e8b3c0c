//! Registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every room the registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// How long a disconnected player keeps their seat before being
    /// removed for good.
    pub grace_period: Duration,

    /// Number of characters in a room code.
    pub code_length: usize,

    /// Capacity of each room actor's command mailbox.
    pub mailbox_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(120),
            code_length: 4,
            mailbox_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(120));
        assert_eq!(config.code_length, 4);
        assert_eq!(config.mailbox_capacity, 64);
    }
}
