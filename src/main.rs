use anyhow::Context;
use clap::Parser;
use cropwise::cli::{Cli, Commands, PlanArgs};
use cropwise::config::Config;
use cropwise::datasources::FixedPosition;
use cropwise::error::CropWiseError;
use cropwise::logic::PlanningService;
use cropwise::report::{
    connection_summary, geocode_summary, refresh_summary, ParametersView, SuggestionsView,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<CropWiseError>() {
            Some(CropWiseError::Config(_)) | None => eprintln!("Error: {:#}", e),
            Some(err) => {
                tracing::debug!("{:?}", err);
                eprintln!("Error: {}", err.user_message());
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,cropwise=debug",
        _ => "info,cropwise=trace",
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => {
            let (_, path) = Config::setup_interactive()?;
            info!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Check => check(config_path).await,
        Commands::Locate { text } => {
            let service = service(config_path)?;
            service
                .session()
                .write()
                .await
                .edit_location(&text)
                .map_err(CropWiseError::from)?;
            let resolved = service.resolve_location().await?;
            println!("{}", geocode_summary(&text, resolved.as_ref()));
            Ok(())
        }
        Commands::Here { lat, lon, accuracy } => {
            let service = service(config_path)?;
            // no device positioning here; only coordinates given as flags
            let provider = match (lat, lon) {
                (Some(lat), Some(lon)) => FixedPosition::new(lat, lon, accuracy),
                _ => FixedPosition::unsupported(),
            };
            let outcome = service.use_current_location(&provider).await?;

            match &outcome.refresh {
                Some(refresh) => {
                    println!("{}\n", refresh_summary(refresh));
                    if !refresh.all_ok() {
                        warn!("Some estimates failed; those fields keep their previous values");
                    }
                }
                None => println!(
                    "Could not describe this position; enter a place name to estimate conditions.\n"
                ),
            }
            println!("{}", ParametersView::new(&service.parameters().await));
            Ok(())
        }
        Commands::Estimate { location } => {
            let service = service(config_path)?;
            service
                .session()
                .write()
                .await
                .edit_location(&location)
                .map_err(CropWiseError::from)?;
            let outcome = service.refresh_environment().await?;

            println!("{}\n", refresh_summary(&outcome));
            println!("{}", ParametersView::new(&service.parameters().await));
            if let (Err(e), Err(_)) = (&outcome.climate, &outcome.soil) {
                anyhow::bail!("{}", e.user_message());
            }
            Ok(())
        }
        Commands::Plan(args) => plan(config_path, args).await,
    }
}

fn service(config_path: Option<&Path>) -> anyhow::Result<PlanningService> {
    if !Config::exists(config_path) {
        anyhow::bail!("No configuration found. Run `cropwise init` to create one.");
    }
    let config = Config::load(config_path).context(
        "Failed to load configuration. Run `cropwise init`, or copy config/config.yaml.example to config/config.yaml",
    )?;
    Ok(PlanningService::from_config(&config)?)
}

async fn check(config_path: Option<&Path>) -> anyhow::Result<()> {
    let service = service(config_path)?;
    println!("Configuration OK");

    let status = service.check_connections().await;
    println!("{}", connection_summary(&status));
    if !status.all_connected() {
        anyhow::bail!("one or more services are unreachable");
    }
    Ok(())
}

async fn plan(config_path: Option<&Path>, mut args: PlanArgs) -> anyhow::Result<()> {
    if args.interactive {
        args.prompt_missing()?;
    }

    let service = service(config_path)?;
    {
        let session = service.session();
        let mut session = session.write().await;
        if let Some(location) = &args.location {
            session
                .edit_location(location)
                .map_err(CropWiseError::from)?;
        }
        for (field, value) in args.text_values() {
            session
                .edit_text(field, Some(value))
                .map_err(CropWiseError::from)?;
        }
        for (field, value) in args.numeric_values() {
            session
                .edit_numeric(field, value)
                .map_err(CropWiseError::from)?;
        }
    }

    if args.refresh {
        let outcome = service.refresh_environment().await?;
        println!("{}\n", refresh_summary(&outcome));
        if let Some(err) = outcome.first_error() {
            warn!("Continuing with previous values: {}", err);
        }
        // explicit flags win over estimates
        for (field, value) in args.numeric_values() {
            service.edit_numeric(field, value).await?;
        }
    }

    let submission = service.submit().await?;
    if !submission.filled.is_empty() {
        let filled: Vec<&str> = submission.filled.iter().map(|f| f.as_str()).collect();
        println!("Estimated blank fields: {}\n", filled.join(", "));
    }
    println!("{}\n", ParametersView::new(&submission.parameters));
    println!(
        "{}",
        SuggestionsView::new(&submission.result).with_charts(!args.no_charts)
    );
    Ok(())
}
