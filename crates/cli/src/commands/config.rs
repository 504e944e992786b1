use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quotedesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

pub fn run(overrides: ConfigOverrides) -> String {
    let cli_keys = overridden_keys(&overrides);
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 12] = [
        ("database.url", config.database.url.clone(), &["QUOTEDESK_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["QUOTEDESK_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["QUOTEDESK_DATABASE_TIMEOUT_SECS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["QUOTEDESK_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["QUOTEDESK_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["QUOTEDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("api.base_url", config.api.base_url.clone(), &["QUOTEDESK_API_BASE_URL"]),
        (
            "api.timeout_secs",
            config.api.timeout_secs.to_string(),
            &["QUOTEDESK_API_TIMEOUT_SECS"],
        ),
        (
            "api.connect_timeout_secs",
            config.api.connect_timeout_secs.to_string(),
            &["QUOTEDESK_API_CONNECT_TIMEOUT_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["QUOTEDESK_LOGGING_LEVEL", "QUOTEDESK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["QUOTEDESK_LOGGING_FORMAT", "QUOTEDESK_LOG_FORMAT"],
        ),
        (
            "config.file",
            config_file_path
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            &[],
        ),
    ];

    let mut lines = vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
    ];
    for (key, value, env_keys) in &fields {
        let source = if cli_keys.iter().any(|cli_key| cli_key == key) {
            "flag".to_string()
        } else {
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
        };
        lines.push(render_line(key, value, source));
    }

    lines.join("\n")
}

fn overridden_keys(overrides: &ConfigOverrides) -> Vec<&'static str> {
    let mut keys = Vec::new();
    if overrides.database_url.is_some() {
        keys.push("database.url");
    }
    if overrides.api_base_url.is_some() {
        keys.push("api.base_url");
    }
    if overrides.server_port.is_some() {
        keys.push("server.port");
    }
    if overrides.log_level.is_some() {
        keys.push("logging.level");
    }
    keys
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("quotedesk.toml"), PathBuf::from("config/quotedesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
