use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use promptforge::repositories::imagen::ImagenApi;
use promptforge::services::{self, console};
use promptforge::settings::Settings;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "promptforge.toml")]
    config: String,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let settings = Settings::load(&args.config)?;

    init_logging(&args.log4rs)?;
    log::info!("Starting promptforge session.");

    if settings.generation.api_key.is_empty() {
        log::warn!("No image generation API key configured, generation requests will fail.");
    }
    let generator = Arc::new(ImagenApi::new(
        settings.generation.api_key.clone(),
        settings.generation.url.clone(),
        settings.generation.model.clone(),
    ));

    let session = services::start_services(settings, generator).await?;
    console::run(session).await?;

    log::info!("Session ended.");
    Ok(())
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => {
            println!("[*] Logging initialized successfully.");
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}
