mod cmd;
mod util;

use std::process::ExitCode;

use actions_logs_core::config::token_from_env;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

// Runs are processed strictly one after another
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let args: cmd::export::Args = argp::parse_args_or_exit(argp::DEFAULT);

    // Variables already set in the environment take precedence over .env
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        tracing::warn!("Failed to load .env file: {}", e);
    }

    match cmd::export::run(args, token_from_env()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
