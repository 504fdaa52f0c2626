use std::process::ExitCode;

use clap::Parser;
use marketdesk_server::{serve, telemetry, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "marketdesk stopped");
            ExitCode::from(error.exit_code())
        }
    }
}
