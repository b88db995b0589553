mod config;
mod generate_cmd;
mod render_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use treino_core::model::gemini::DEFAULT_MODEL;
use treino_core::{GeminiModel, PlanService, UserProfile};

use config::TreinoConfig;

#[derive(Parser)]
#[command(name = "treino", about = "Personalized workout plans: generation and PDF export")]
struct Cli {
    /// Model name (overrides TREINO_MODEL env var and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a treino config file (stores --model, if given)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides TREINO_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Listen port (overrides TREINO_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one plan and print it as JSON
    Generate {
        /// Training goal
        #[arg(long)]
        objetivo: String,
        /// Experience level
        #[arg(long)]
        nivel: String,
        /// Available equipment
        #[arg(long)]
        acesso_equipamentos: String,
        /// Physical restrictions
        #[arg(long)]
        restricoes: Option<String>,
        /// Training specialization
        #[arg(long)]
        especificacao: Option<String>,
        /// Write the JSON to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a plan JSON file (or `-` for stdin) to PDF
    Render {
        /// Plan JSON file, or `-` for stdin
        file: String,
        /// Output PDF path
        #[arg(long, default_value = treino_core::render::FILENAME)]
        output: PathBuf,
    },
}

/// Execute the `treino init` command: write config file.
fn cmd_init(model: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        model: config::ModelSection {
            name: model.to_string(),
            ..Default::default()
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  model.name = {}", cfg.model.name);
    println!("  model.api_key_env = {}", cfg.model.api_key_env);
    println!("  server = {}:{}", cfg.server.bind, cfg.server.port);
    println!();
    println!(
        "Next: export {} (or put it in .env), then run `treino serve`.",
        cfg.model.api_key_env
    );

    Ok(())
}

/// Build the plan service over the configured model backend.
fn build_service(config: &TreinoConfig) -> anyhow::Result<PlanService> {
    let model = GeminiModel::new(config.gemini_config()?)?;
    Ok(PlanService::new(Arc::new(model)))
}

/// The error from loading `.env`, unless the file simply does not exist.
fn dotenv_problem(result: &Result<PathBuf, dotenvy::Error>) -> Option<&dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so RUST_LOG may come from .env.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Some(problem) = dotenv_problem(&dotenv) {
        tracing::warn!(error = %problem, "ignoring unreadable .env file");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.model.as_deref().unwrap_or(DEFAULT_MODEL), force)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = TreinoConfig::resolve(cli.model.as_deref(), bind.as_deref(), port)?;
            let service = build_service(&resolved)?;
            serve_cmd::run_serve(service, &resolved.bind, resolved.port).await?;
        }
        Commands::Generate {
            objetivo,
            nivel,
            acesso_equipamentos,
            restricoes,
            especificacao,
            output,
        } => {
            let resolved = TreinoConfig::resolve(cli.model.as_deref(), None, None)?;
            let service = build_service(&resolved)?;
            let profile = UserProfile {
                objetivo: Some(objetivo),
                nivel: Some(nivel),
                acesso_equipamentos: Some(acesso_equipamentos),
                restricoes,
                especificacao,
            };
            generate_cmd::run_generate(&service, profile, output.as_deref()).await?;
        }
        Commands::Render { file, output } => {
            render_cmd::run_render(&file, &output).await?;
        }
    }

    Ok(())
}
