//! sonarun - automated SonarQube analysis runs
use clap::Parser;
use log::{error, info};
use sonarun::{Cli, Commands, RunConfig, default_metrics, load_env_files};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if cli.command.resolves_config() {
        if let Err(e) = load_env_files(cli.env_file.as_deref()) {
            error!("❌ {e}");
            std::process::exit(2);
        }
    }

    match cli.command {
        Commands::Run(args) => match sonarun::run(&args.overrides()).await {
            Ok(summary) => {
                for warning in &summary.warnings {
                    info!("   Warning: {warning}");
                }
                if cli.json {
                    match serde_json::to_string_pretty(&summary) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            error!("❌ Failed to serialize run summary: {e}");
                            std::process::exit(1);
                        }
                    }
                } else {
                    println!("{}", summary.output_file.display());
                }
            }
            Err(e) => {
                error!("❌ {e}");
                std::process::exit(e.exit_code());
            }
        },
        Commands::Check(args) => match RunConfig::resolve(&args.overrides()) {
            Ok(config) => {
                config.log_summary();
                info!("✅ Configuration is valid");
            }
            Err(e) => {
                error!("❌ {e}");
                std::process::exit(2);
            }
        },
        Commands::Metrics => {
            for metric in default_metrics() {
                println!("{metric}");
            }
        }
    }
}
