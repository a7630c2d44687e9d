use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subzone_choropleth::{config, pipeline, server};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the choropleth SVG and its hosting page
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated page with a hover lookup API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            info!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // Load, join, fit projection and colour scale
            let scene = pipeline::build_scene(&app_config).await?;

            // Draw and write artifacts
            pipeline::write_outputs(&app_config, &scene)?;

            info!("Generation complete!");
        }
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // The hover API needs the projected shapes, so rebuild them
            let scene = pipeline::build_scene(&app_config).await?;
            if !app_config.output.page_path().exists() {
                pipeline::write_outputs(&app_config, &scene)?;
            }

            server::start_server(app_config, scene).await?;
        }
    }

    Ok(())
}
