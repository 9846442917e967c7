use std::{fs, time::Duration};

use skill_api::{ControlBodyPolicy, SkillContext};

const SETTINGS_FILE: &str = "bridge.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub device_api_base_url: String,
    pub switch_url: Option<String>,
    pub request_timeout_seconds: u64,
    pub inspect_control_body: bool,
    pub need_more_help: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            device_api_base_url: "http://127.0.0.1:9000/api".into(),
            switch_url: None,
            request_timeout_seconds: 10,
            inspect_control_body: false,
            need_more_help: true,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn control_body_policy(&self) -> ControlBodyPolicy {
        if self.inspect_control_body {
            ControlBodyPolicy::Inspect
        } else {
            ControlBodyPolicy::Ignore
        }
    }

    pub fn skill_context(&self) -> SkillContext {
        SkillContext {
            need_more_help: self.need_more_help,
        }
    }
}

/// Defaults, then `bridge.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<toml::Table>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.server_bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("device_api_base_url").and_then(toml::Value::as_str) {
        settings.device_api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("switch_url").and_then(toml::Value::as_str) {
        settings.switch_url = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("request_timeout_seconds")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_seconds = v;
    }
    if let Some(v) = file_cfg.get("inspect_control_body").and_then(toml::Value::as_bool) {
        settings.inspect_control_body = v;
    }
    if let Some(v) = file_cfg.get("need_more_help").and_then(toml::Value::as_bool) {
        settings.need_more_help = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = lookup("DEVICE_API_BASE_URL") {
        settings.device_api_base_url = v;
    }
    if let Some(v) = lookup("APP__DEVICE_API_BASE_URL") {
        settings.device_api_base_url = v;
    }

    if let Some(v) = lookup("SWITCH_URL") {
        settings.switch_url = Some(v);
    }
    if let Some(v) = lookup("APP__SWITCH_URL") {
        settings.switch_url = Some(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    if let Some(v) = lookup("APP__INSPECT_CONTROL_BODY") {
        if let Some(parsed) = parse_flag(&v) {
            settings.inspect_control_body = parsed;
        }
    }
    if let Some(v) = lookup("APP__NEED_MORE_HELP") {
        if let Some(parsed) = parse_flag(&v) {
            settings.need_more_help = parsed;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
