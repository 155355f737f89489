// file: src/config/loader.rs
// version: 2.1.0
// guid: 8f84d377-374a-4dbd-bf86-1dfebe9f5993

//! Configuration file loading and environment variable substitution

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use super::AgentConfig;
use crate::Result;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load agent configuration from a YAML file
    pub fn load_agent_config<P: AsRef<Path>>(&self, path: P) -> Result<AgentConfig> {
        debug!("Loading configuration from {}", path.as_ref().display());
        let content = fs::read_to_string(&path).map_err(|e| {
            crate::error::AgentError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let config: AgentConfig = serde_yaml::from_str(&expanded)?;

        config.validate()?;

        Ok(config)
    }

    /// Expand `${VAR}` references in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            crate::error::AgentError::config(format!("Invalid regex pattern: {}", e))
        })?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else if !missing_vars.iter().any(|v| v == var_name) {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(crate::error::AgentError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
