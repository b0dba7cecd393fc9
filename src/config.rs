use std::{env, fmt};

use crate::error::ConfigError;

const URL_VARIABLES: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
const KEY_VARIABLES: [&str; 2] = ["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_ANON_KEY"];

/// Supabase project URL and access key (service role preferred over anon).
#[derive(Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl SupabaseConfig {
    /// Reads the process environment after loading a `.env` file, if any.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .flat_map(|name| lookup(*name))
                .find(|value| !value.trim().is_empty())
        };

        match (first_set(&URL_VARIABLES[..]), first_set(&KEY_VARIABLES[..])) {
            (Some(url), Some(key)) => Ok(SupabaseConfig { url, key }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn prefers_primary_variables() {
        let config = SupabaseConfig::from_lookup(lookup_in(&[
            ("SUPABASE_URL", "https://primary.supabase.co"),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://primary.supabase.co");
        assert_eq!(config.key, "service");
    }

    #[test]
    fn falls_back_to_secondary_variables() {
        let config = SupabaseConfig::from_lookup(lookup_in(&[
            ("SUPABASE_URL", ""),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://vite.supabase.co");
        assert_eq!(config.key, "anon");
    }

    #[test]
    fn missing_key_is_an_error() {
        let result =
            SupabaseConfig::from_lookup(lookup_in(&[("SUPABASE_URL", "https://x.supabase.co")]));
        assert!(matches!(result, Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = SupabaseConfig {
            url: "https://x.supabase.co".to_string(),
            key: "secret".to_string(),
        };
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
