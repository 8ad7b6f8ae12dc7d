use std::path::PathBuf;

use clap::Parser;

fn parse_port(value: &str) -> Result<u16, String> {
    let parsed = value
        .parse::<u16>()
        .map_err(|error| format!("failed to parse port: {error}"))?;
    if parsed == 0 {
        return Err("port must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "sfxbridge",
    about = "Plays sound effects in browser viewers when chat commands are typed",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "SFX_CONFIG",
        default_value = "config.json",
        help = "Path to the JSON command table. Relative command files and the audio directory resolve against its directory."
    )]
    pub config: PathBuf,

    #[arg(
        long,
        env = "SFX_BIND",
        help = "Host address to listen on. Overrides the config `host` field."
    )]
    pub bind: Option<String>,

    #[arg(
        long,
        env = "SFX_PORT",
        value_parser = parse_port,
        help = "Port to listen on. Overrides the config `port` field."
    )]
    pub port: Option<u16>,

    #[arg(
        long = "audio-dir",
        env = "SFX_AUDIO_DIR",
        default_value = "audio",
        help = "Directory served under /audio."
    )]
    pub audio_dir: PathBuf,

    #[arg(
        long = "check-config",
        help = "Validate the config, print the command table and exit."
    )]
    pub check_config: bool,
}
