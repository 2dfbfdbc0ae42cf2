//! User Service - CLI entry point.

use clap::Parser;

use user_service_lib::{
    cli::{Cli, Commands},
    commands,
    config::UserServiceConfig,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    common::init_tracing(cli.verbose);

    let config = UserServiceConfig::from_env();
    tracing::debug!("Configuration loaded");

    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args, &config).await,
        Commands::User(args) => user_service_lib::run_user_command(args, &config).await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
