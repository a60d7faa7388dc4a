//! Settings loading from configuration files.
//!
//! Loads [`Settings`] from TOML or JSON files and applies environment
//! variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `WARDEN_DEBUG` | `debug` |
//! | `WARDEN_LOG_LEVEL` | `log_level` |
//! | `WARDEN_ENCRYPT_PASSWORDS` | `password.encrypt_passwords` |
//! | `WARDEN_PASSWORD_ALGORITHM` | `password.algorithm` |
//! | `WARDEN_PASSWORD_USE_SALT` | `password.use_salt` |
//! | `WARDEN_DEFAULT_ADMIN_USERNAME` | `default_admin.username` |
//! | `WARDEN_DEFAULT_ADMIN_PASSWORD` | `default_admin.password` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use warden_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/warden.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::WardenError;
use crate::settings::{DefaultAdminSettings, Settings};

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, WardenError> {
    // Round-trip through serde_json so the document can be deep-merged
    // over the serialized defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| WardenError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, WardenError> {
    from_toml_str(&read_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, WardenError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, WardenError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| WardenError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, WardenError> {
    from_json_str(&read_file(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, WardenError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, WardenError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_file_with_env(path)
    } else {
        from_toml_file_with_env(path)
    }
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" as true and anything else as
/// false. The bootstrap administrator is only overridden when both its
/// username and password variables are present.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("WARDEN_DEBUG") {
        settings.debug = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("WARDEN_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("WARDEN_ENCRYPT_PASSWORDS") {
        settings.password.encrypt_passwords = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("WARDEN_PASSWORD_ALGORITHM") {
        settings.password.algorithm = val.trim().to_string();
    }

    if let Ok(val) = std::env::var("WARDEN_PASSWORD_USE_SALT") {
        settings.password.use_salt = parse_bool(&val);
    }

    if let (Ok(username), Ok(password)) = (
        std::env::var("WARDEN_DEFAULT_ADMIN_USERNAME"),
        std::env::var("WARDEN_DEFAULT_ADMIN_PASSWORD"),
    ) {
        settings.default_admin = Some(DefaultAdminSettings { username, password });
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_file(path: &Path, format: &str) -> Result<String, WardenError> {
    std::fs::read_to_string(path).map_err(|e| {
        WardenError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to read {format} file '{}': {e}", path.display()),
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, WardenError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        WardenError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        WardenError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_password_section() {
        let toml = r#"
            [password]
            algorithm = "sha256"
            use_salt = false
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.password.algorithm, "sha256");
        assert!(!settings.password.use_salt);
        // Defaults preserved inside the partially specified table
        assert!(settings.password.encrypt_passwords);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_default_admin() {
        let toml = r#"
            [default_admin]
            username = "root"
            password = "s3cret"
        "#;

        let settings = from_toml_str(toml).unwrap();
        let admin = settings.default_admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.password, "s3cret");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.password.algorithm, "sha1");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(WardenError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_incomplete_admin_is_rejected() {
        let toml = r#"
            [default_admin]
            username = "root"
        "#;
        assert!(from_toml_str(toml).is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "log_level": "debug",
            "password": { "encrypt_passwords": false }
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.password.encrypt_passwords);
        assert_eq!(settings.password.algorithm, "sha1");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
        assert!(settings.default_admin.is_none());
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "log_level = \"warn\"\n[password]\nalgorithm = \"md5\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.password.algorithm, "md5");
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.json");
        std::fs::write(&path, r#"{"password": {"algorithm": "sha512"}}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert_eq!(settings.password.algorithm, "sha512");
    }

    #[test]
    fn test_from_file_with_env_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("warden.json");
        std::fs::write(&json_path, r#"{"debug": false}"#).unwrap();
        let toml_path = dir.path().join("warden.toml");
        std::fs::write(&toml_path, "debug = false\n").unwrap();

        assert!(!from_file_with_env(&json_path).unwrap().debug);
        assert!(!from_file_with_env(&toml_path).unwrap().debug);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/warden.toml").unwrap_err();
        assert_eq!(err.code(), "io_error");
        assert!(err.to_string().contains("/nonexistent/path/warden.toml"));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(from_json_file("/nonexistent/path/warden.json").is_err());
    }

    // ── Environment variable overrides ──────────────────────────────
    //
    // Each test owns the variables it touches so they can run in parallel.

    #[test]
    fn test_apply_env_overrides_log_level() {
        let mut settings = Settings::default();
        std::env::set_var("WARDEN_LOG_LEVEL", "debug");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.log_level, "debug");
        std::env::remove_var("WARDEN_LOG_LEVEL");
    }

    #[test]
    fn test_apply_env_overrides_password_policy() {
        let mut settings = Settings::default();
        std::env::set_var("WARDEN_PASSWORD_ALGORITHM", " sha384 ");
        std::env::set_var("WARDEN_PASSWORD_USE_SALT", "no");
        std::env::set_var("WARDEN_ENCRYPT_PASSWORDS", "1");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.password.algorithm, "sha384");
        assert!(!settings.password.use_salt);
        assert!(settings.password.encrypt_passwords);
        std::env::remove_var("WARDEN_PASSWORD_ALGORITHM");
        std::env::remove_var("WARDEN_PASSWORD_USE_SALT");
        std::env::remove_var("WARDEN_ENCRYPT_PASSWORDS");
    }

    #[test]
    fn test_apply_env_overrides_default_admin_requires_both() {
        let mut settings = Settings::default();
        std::env::set_var("WARDEN_DEFAULT_ADMIN_USERNAME", "ops");
        apply_env_overrides(&mut settings);
        assert!(settings.default_admin.is_none());

        std::env::set_var("WARDEN_DEFAULT_ADMIN_PASSWORD", "hunter2");
        apply_env_overrides(&mut settings);
        let admin = settings.default_admin.unwrap();
        assert_eq!(admin.username, "ops");
        assert_eq!(admin.password, "hunter2");

        std::env::remove_var("WARDEN_DEFAULT_ADMIN_USERNAME");
        std::env::remove_var("WARDEN_DEFAULT_ADMIN_PASSWORD");
    }

    #[test]
    fn test_toml_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "debug = true\n").unwrap();

        std::env::set_var("WARDEN_DEBUG", "false");
        let settings = from_toml_file_with_env(&path).unwrap();
        assert!(!settings.debug);
        std::env::remove_var("WARDEN_DEBUG");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(parse_bool(" 1 "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("maybe"));
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_merge_json_replaces_null() {
        let base = serde_json::json!({"default_admin": null});
        let over = serde_json::json!({"default_admin": {"username": "a", "password": "b"}});
        let merged = merge_json(base, over);
        assert_eq!(merged["default_admin"]["username"], "a");
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["nested"]["key"], "value");
    }
}
