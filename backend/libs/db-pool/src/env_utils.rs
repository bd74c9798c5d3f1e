//! Environment variable parsing utilities
//!
//! Parse environment variables with defaults, without unwrap() calls.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// # Example
/// ```ignore
/// let max: u32 = parse_env_with_default("DB_MAX_CONNECTIONS", 10);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, returning None if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_env_with_default() {
        let result: u32 = parse_env_with_default("DB_POOL_TEST_MISSING", 42);
        assert_eq!(result, 42);

        std::env::set_var("DB_POOL_TEST_PORT", " 8080 ");
        let result: u16 = parse_env_with_default("DB_POOL_TEST_PORT", 3000);
        assert_eq!(result, 8080);
        std::env::remove_var("DB_POOL_TEST_PORT");
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_value_falls_back() {
        std::env::set_var("DB_POOL_TEST_BAD", "many");
        let result: u32 = parse_env_with_default("DB_POOL_TEST_BAD", 7);
        assert_eq!(result, 7);
        std::env::remove_var("DB_POOL_TEST_BAD");
    }
}
