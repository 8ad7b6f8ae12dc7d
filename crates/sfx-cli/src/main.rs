mod bootstrap_helpers;
mod cli_args;
mod startup_config;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sfx_chat::TwitchChatSource;
use sfx_core::SystemClock;
use sfx_dispatch::{DispatchGate, FsPayloadLoader};
use sfx_gateway::{run_gateway_server, GatewayServerState};
use tracing::info;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::startup_config::{
    config_base_dir, load_startup_config, render_command_table, resolve_against,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_startup_config(&cli.config)?;
    if cli.check_config {
        println!("{}", render_command_table(&config));
        return Ok(());
    }

    let base_dir = config_base_dir(&cli.config);
    let audio_dir = resolve_against(&base_dir, &cli.audio_dir);
    let server_config = config.server_config(cli.bind.as_deref(), cli.port, audio_dir);

    let credentials = config.chat_credentials();
    info!(
        channel = %config.channel,
        commands = config.commands.len(),
        authenticated = credentials.is_some(),
        "loaded sfxbridge config"
    );

    let gate = DispatchGate::new(
        config.gate_config(),
        Arc::new(FsPayloadLoader::new(base_dir)),
    );
    let state = GatewayServerState::new(
        server_config,
        Arc::new(gate),
        Arc::new(TwitchChatSource::with_credentials(credentials)),
        Arc::new(SystemClock),
    );
    run_gateway_server(state).await
}
