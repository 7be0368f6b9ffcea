//! Per-invocation configuration

use secrethook_core::{HookError, Result};
use serde::Deserialize;

/// Environment variable naming the parameter or secret
pub const PARAMETER_NAME_VAR: &str = "PARAMETER_NAME";

/// Environment variable selecting Secrets Manager over Parameter Store
pub const USE_SECRETS_MANAGER_VAR: &str = "USE_SECRETS_MANAGER";

/// Configuration read once per invocation and passed to the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    /// Target parameter or secret name
    pub parameter_name: String,
    /// Secrets Manager when set, Parameter Store otherwise
    pub use_secrets_manager: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    parameter_name: Option<String>,
    use_secrets_manager: Option<String>,
}

impl HookConfig {
    pub fn new(parameter_name: impl Into<String>, use_secrets_manager: bool) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            use_secrets_manager,
        }
    }

    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_map(std::env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            if key != PARAMETER_NAME_VAR && key != USE_SECRETS_MANAGER_VAR {
                return None;
            }
            Some((key, value.into_string().ok()?))
        }))
    }

    /// Load from explicit environment-style key/value pairs
    pub fn from_map<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let raw: RawConfig = config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| HookError::Config(e.to_string()))?;

        let parameter_name = raw
            .parameter_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| HookError::Config(format!("{} must be set", PARAMETER_NAME_VAR)))?;

        Ok(Self {
            parameter_name,
            use_secrets_manager: parse_backend_flag(raw.use_secrets_manager.as_deref()),
        })
    }
}

/// Exact, case-sensitive match on `"true"` or `"1"`
pub fn parse_backend_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_flag_exact_match() {
        assert!(parse_backend_flag(Some("true")));
        assert!(parse_backend_flag(Some("1")));

        for value in ["True", "TRUE", "yes", "on", "0", "false", "", " true", "1 "] {
            assert!(!parse_backend_flag(Some(value)), "value: {:?}", value);
        }
        assert!(!parse_backend_flag(None));
    }

    #[test]
    fn test_from_map() {
        let config =
            HookConfig::from_map([("PARAMETER_NAME", "db-pass"), ("USE_SECRETS_MANAGER", "1")])
                .unwrap();

        assert_eq!(config, HookConfig::new("db-pass", true));
    }

    #[test]
    fn test_flag_unset_selects_parameter_store() {
        let config = HookConfig::from_map([("PARAMETER_NAME", "db-pass")]).unwrap();
        assert!(!config.use_secrets_manager);

        let config =
            HookConfig::from_map([("PARAMETER_NAME", "db-pass"), ("USE_SECRETS_MANAGER", "True")])
                .unwrap();
        assert!(!config.use_secrets_manager);
    }

    #[test]
    fn test_parameter_name_is_kept_verbatim() {
        let config = HookConfig::from_map([("PARAMETER_NAME", "/App/Prod/DB_Pass")]).unwrap();
        assert_eq!(config.parameter_name, "/App/Prod/DB_Pass");
    }

    #[test]
    fn test_missing_parameter_name_fails() {
        let result = HookConfig::from_map([("USE_SECRETS_MANAGER", "true")]);
        assert!(matches!(result, Err(HookError::Config(_))));

        let result = HookConfig::from_map([("PARAMETER_NAME", "")]);
        assert!(matches!(result, Err(HookError::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_skips_non_utf8_variables() {
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("SECRETHOOK_NON_UTF8", std::ffi::OsStr::from_bytes(&[0x66, 0xff]));
        std::env::set_var(PARAMETER_NAME_VAR, "db-pass");

        let config = HookConfig::load().unwrap();
        assert_eq!(config.parameter_name, "db-pass");
    }
}
