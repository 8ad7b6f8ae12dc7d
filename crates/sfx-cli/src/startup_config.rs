//! JSON config loading and validation for the `sfxbridge` binary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sfx_chat::{normalize_channel_name, TwitchCredentials};
use sfx_dispatch::{CommandSpec, DispatchGateConfig, DEFAULT_TRIGGER_PREFIX};
use sfx_gateway::GatewayServerConfig;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";

fn default_trigger_prefix() -> String {
    DEFAULT_TRIGGER_PREFIX.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// On-disk config. Legacy field names are accepted as aliases.
pub(crate) struct SfxBridgeConfig {
    pub channel: String,
    #[serde(default = "default_trigger_prefix")]
    pub trigger_prefix: String,
    #[serde(default, alias = "timeBetweenCommands")]
    pub global_cooldown_seconds: u64,
    #[serde(default, alias = "audioCommands")]
    pub commands: Vec<CommandSpec>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl SfxBridgeConfig {
    pub(crate) fn gate_config(&self) -> DispatchGateConfig {
        DispatchGateConfig {
            trigger_prefix: self.trigger_prefix.clone(),
            global_cooldown_seconds: self.global_cooldown_seconds,
            commands: self.commands.clone(),
        }
    }

    pub(crate) fn server_config(
        &self,
        bind_host: Option<&str>,
        port: Option<u16>,
        audio_dir: PathBuf,
    ) -> GatewayServerConfig {
        let host = bind_host.unwrap_or(&self.host);
        let port = port.unwrap_or(self.port);
        let bind = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
        GatewayServerConfig {
            bind,
            channel: self.channel.clone(),
            audio_dir,
        }
    }

    /// Both `username` and `password` must be non-empty to log in; otherwise
    /// chat is read anonymously.
    pub(crate) fn chat_credentials(&self) -> Option<TwitchCredentials> {
        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_deref().map(str::trim).unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            if !username.is_empty() || !password.is_empty() {
                warn!("chat username and password must both be set; reading chat anonymously");
            }
            return None;
        }
        Some(TwitchCredentials {
            username: username.to_string(),
            oauth_token: password.to_string(),
        })
    }
}

/// Directory relative config paths are resolved against.
pub(crate) fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub(crate) fn resolve_against(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

pub(crate) fn load_startup_config(path: &Path) -> Result<SfxBridgeConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str::<SfxBridgeConfig>(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_startup_config(&config)?;
    Ok(config)
}

pub(crate) fn validate_startup_config(config: &SfxBridgeConfig) -> Result<()> {
    if config.channel.trim().trim_start_matches('#').is_empty() {
        bail!("config field 'channel' must not be empty");
    }
    normalize_channel_name(&config.channel)
        .with_context(|| "config field 'channel' is not a valid Twitch channel name")?;
    if config.trigger_prefix.is_empty() {
        bail!("config field 'triggerPrefix' must not be empty");
    }

    for (index, command) in config.commands.iter().enumerate() {
        if command.trigger.trim().is_empty() {
            bail!("command {index} ('{}') has an empty trigger", command.name);
        }
        if command.file_path.as_os_str().is_empty() {
            bail!("command {index} ('{}') has an empty file path", command.name);
        }
    }
    for warning in command_table_warnings(config) {
        warn!("{warning}");
    }
    Ok(())
}

/// Table entries that load fine but can never fire.
pub(crate) fn command_table_warnings(config: &SfxBridgeConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen_triggers = HashSet::new();
    for command in &config.commands {
        if !seen_triggers.insert(command.trigger.trim()) {
            warnings.push(format!(
                "duplicate trigger '{}' ('{}'); only the first entry will ever fire",
                command.trigger, command.name
            ));
        }
        if command.trigger != command.trigger.trim() {
            warnings.push(format!(
                "trigger '{}' ('{}') has surrounding whitespace; chat text is trimmed before matching so it can never match",
                command.trigger, command.name
            ));
        }
        if !command.trigger.starts_with(&config.trigger_prefix) {
            warnings.push(format!(
                "trigger '{}' ('{}') does not start with the trigger prefix '{}' and can never match",
                command.trigger, command.name, config.trigger_prefix
            ));
        }
    }
    if config.commands.is_empty() {
        warnings.push("config has no commands; chat will never trigger a sound".to_string());
    }
    warnings
}

pub(crate) fn render_command_table(config: &SfxBridgeConfig) -> String {
    let mut lines = vec![format!(
        "channel=#{} prefix={} global_cooldown={}s commands={}",
        config.channel.trim_start_matches('#'),
        config.trigger_prefix,
        config.global_cooldown_seconds,
        config.commands.len()
    )];
    for command in &config.commands {
        lines.push(format!(
            "  {} -> {} ({}s) [{}]",
            command.trigger,
            command.file_path.display(),
            command.cooldown_seconds,
            command.name
        ));
    }
    lines.join("\n")
}
