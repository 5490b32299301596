use clap::Parser;
use std::env;
use std::error::Error;
use std::process;

use dcapp::cli::Args;
use dcapp::settings::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting dcapp v{}", VERSION);

    let args = Args::parse();
    let settings = Settings::load(&args)?;
    log::debug!("Using settings {settings:?}");

    // Exit explicitly: the blocking stdin reader would keep the runtime alive
    match dcapp::app::run(settings).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}
