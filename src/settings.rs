//! Environment-sourced configuration for the object-storage backend.

use std::env;

/// Object-storage connection settings.
///
/// Each field is read from the upper-cased environment variable of the same
/// name (`AWS_HOST`, `AWS_BUCKET_NAME`, ...), with placeholder defaults when
/// unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub aws_host: String,
    pub aws_bucket_name: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            aws_host: env_or("AWS_HOST", "host"),
            aws_bucket_name: env_or("AWS_BUCKET_NAME", "bucket"),
            aws_access_key_id: env_or("AWS_ACCESS_KEY_ID", "access_key_id"),
            aws_secret_access_key: env_or("AWS_SECRET_ACCESS_KEY", "secret_access_key"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_returns_default_when_unset() {
        assert_eq!(env_or("GMONITOR_LIB_UNSET_TEST_VAR", "fallback"), "fallback");
    }

    #[test]
    fn test_env_or_reads_variable() {
        // set_var is unsafe in edition 2024; scope it to this one variable
        unsafe { env::set_var("GMONITOR_LIB_SET_TEST_VAR", "configured") };
        assert_eq!(env_or("GMONITOR_LIB_SET_TEST_VAR", "fallback"), "configured");
        unsafe { env::remove_var("GMONITOR_LIB_SET_TEST_VAR") };
    }

    #[test]
    fn test_from_env_defaults() {
        let settings = Settings::from_env();
        // Only assert fields no test environment is expected to override.
        assert!(!settings.aws_host.is_empty());
        assert!(!settings.aws_bucket_name.is_empty());
    }
}
