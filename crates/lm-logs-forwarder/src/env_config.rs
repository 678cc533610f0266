// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use lm_logs::config::{self, OutputConfig};
use lm_logs::errors::ConfigError;

/// Environment variable holding an output configuration key.
pub fn env_var_for(key: &str) -> Option<&'static str> {
    Some(match key {
        config::KEY_ID => "LM_OUTPUT_ID",
        config::KEY_COMPANY_NAME => "LM_COMPANY_NAME",
        config::KEY_ACCESS_ID => "LM_ACCESS_ID",
        config::KEY_ACCESS_KEY => "LM_ACCESS_KEY",
        config::KEY_BEARER_TOKEN => "LM_BEARER_TOKEN",
        config::KEY_RESOURCE_MAPPING => "LM_RESOURCE_MAPPING",
        config::KEY_INCLUDE_METADATA => "LM_INCLUDE_METADATA",
        config::KEY_BODY_SIZE_THRESHOLD => "LM_BODY_SIZE_THRESHOLD_MB",
        config::KEY_DEBUG => "LM_DEBUG",
        config::KEY_LOG_SOURCE => "LM_LOG_SOURCE",
        config::KEY_VERSION_ID => "LM_VERSION_ID",
        config::KEY_ENDPOINT => "LM_ENDPOINT",
        config::KEY_FLUSH_TIMEOUT => "LM_FLUSH_TIMEOUT_SECS",
        config::KEY_TAG_ENRICHMENT => "LM_TAG_ENRICHMENT",
        _ => return None,
    })
}

pub fn output_config_from_env() -> Result<OutputConfig, ConfigError> {
    OutputConfig::from_lookup(|key| env_var_for(key).and_then(|name| env::var(name).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lm_logs::config::{Credentials, ALL_KEYS};
    use serial_test::serial;

    fn clear_env() {
        for key in ALL_KEYS {
            if let Some(name) = env_var_for(key) {
                env::remove_var(name);
            }
        }
    }

    #[test]
    fn test_every_key_has_a_variable() {
        for key in ALL_KEYS {
            assert!(env_var_for(key).is_some(), "{key}");
        }
        assert_eq!(env_var_for("unknown"), None);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        env::set_var("LM_COMPANY_NAME", "acme.logicmonitor.com");
        env::set_var("LM_BEARER_TOKEN", "tok");
        env::set_var("LM_OUTPUT_ID", "stdin");
        env::set_var("LM_BODY_SIZE_THRESHOLD_MB", "42");

        let config = output_config_from_env().unwrap();

        assert_eq!(config.id, "stdin");
        assert_eq!(config.credentials, Credentials::Bearer("tok".to_string()));
        assert_eq!(config.size_threshold_bytes, 8 * 1024 * 1024);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_company_from_env() {
        clear_env();
        env::set_var("LM_BEARER_TOKEN", "tok");

        assert_eq!(
            output_config_from_env().unwrap_err(),
            ConfigError::MissingCompanyName
        );
        clear_env();
    }
}
