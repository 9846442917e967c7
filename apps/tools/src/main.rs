use std::{io::Read, path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use device_client::{DeviceApiConfig, HttpDeviceClient};
use shared::protocol::Directive;
use skill_api::{route, ControlBodyPolicy, DirectiveContext};

/// Runs one directive against the device API and prints the outcome as JSON.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DEVICE_API_BASE_URL")]
    device_api_base_url: String,
    /// Directive JSON file; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    timeout_seconds: u64,
    #[arg(long)]
    inspect_control_body: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let raw = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read directive from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read directive from stdin")?;
            buf
        }
    };
    let directive: Directive = serde_json::from_str(&raw).context("invalid directive JSON")?;

    let devices = HttpDeviceClient::new(DeviceApiConfig {
        base_url: cli.device_api_base_url,
        switch_url: None,
        request_timeout: Some(Duration::from_secs(cli.timeout_seconds)),
    })?;
    let policy = if cli.inspect_control_body {
        ControlBodyPolicy::Inspect
    } else {
        ControlBodyPolicy::Ignore
    };
    let ctx = DirectiveContext::new(Arc::new(devices)).with_control_body(policy);

    match route(&ctx, &directive).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
