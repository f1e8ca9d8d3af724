use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    ConfigOverrides, ENV_COMPOSE_FILE, ENV_COMPOSE_PROJECT_NAME, ENV_EXCLUSIONS, ENV_HOST_URL,
    ENV_INTERNAL_URL, ENV_METRICS, ENV_OUTPUT_PATH, ENV_PARTICIPANT, ENV_PROJECT_PATH,
    ENV_SCANNER_SERVICE,
};

#[derive(Parser, Debug)]
#[command(name = "sonarun")]
#[command(
    about = "Automates a SonarQube analysis run: starts the containers, scans a project, waits for the analysis and exports its metrics to CSV."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug mode for detailed output
    #[arg(
        long = "debug",
        short = 'd',
        help = "Enable debug mode for detailed diagnostic output",
        global = true
    )]
    pub debug: bool,

    /// Environment file to load instead of .env and app/.env
    #[arg(long = "env-file", help = "Load settings from this file instead of .env and app/.env", global = true)]
    pub env_file: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long = "json", help = "Print the run summary as JSON instead of the result file path", global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a complete analysis and write the metrics CSV
    Run(RunArgs),

    /// Resolve and validate the configuration without side effects
    Check(RunArgs),

    /// Print the default metric keys
    Metrics,
}

impl Commands {
    /// Whether the command reads a run configuration, and so the `.env` files
    #[must_use]
    pub fn resolves_config(&self) -> bool {
        matches!(self, Commands::Run(_) | Commands::Check(_))
    }
}

/// Settings that may be given on the command line instead of the environment
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct RunArgs {
    /// Project directory to analyze (PROJECT_PATH)
    #[arg(long = "project-path", short = 'p', help = "Directory of the project to analyze")]
    pub project_path: Option<String>,

    /// Output directory (OUTPUT_PATH)
    #[arg(long = "output-path", short = 'o', help = "Directory receiving sonar_analysis_output/")]
    pub output_path: Option<String>,

    /// Participant label (PARTICIPANT)
    #[arg(long = "participant", help = "Participant label written to every row")]
    pub participant: Option<String>,

    /// Backend URL reachable from this machine (SONAR_HOST_URL)
    #[arg(long = "host-url", help = "Backend URL reachable from this machine")]
    pub host_url: Option<String>,

    /// Backend URL reachable from inside the scanner container (SONAR_INTERNAL_URL)
    #[arg(long = "internal-url", help = "Backend URL reachable from the scanner container")]
    pub internal_url: Option<String>,

    /// Exclusion globs, comma-separated (SONAR_EXCLUSIONS)
    #[arg(long = "exclusions", help = "Comma-separated exclusion globs (e.g., '**/*.java,build/**')")]
    pub exclusions: Option<String>,

    /// Metric keys, comma-separated (SONAR_METRICS)
    #[arg(long = "metrics", help = "Comma-separated metric keys replacing the default list")]
    pub metrics: Option<String>,

    /// Compose file (COMPOSE_FILE)
    #[arg(long = "compose-file", short = 'f', help = "Compose file defining the backend and scanner services")]
    pub compose_file: Option<String>,

    /// Compose project name (COMPOSE_PROJECT_NAME)
    #[arg(long = "compose-project", help = "Compose project name")]
    pub compose_project: Option<String>,

    /// Scanner service name (SONAR_SCANNER_SERVICE)
    #[arg(long = "scanner-service", help = "Compose service running the scanner CLI")]
    pub scanner_service: Option<String>,
}

impl RunArgs {
    /// Command line values keyed by the environment variables they replace
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        overrides.set(ENV_PROJECT_PATH, self.project_path.clone());
        overrides.set(ENV_OUTPUT_PATH, self.output_path.clone());
        overrides.set(ENV_PARTICIPANT, self.participant.clone());
        overrides.set(ENV_HOST_URL, self.host_url.clone());
        overrides.set(ENV_INTERNAL_URL, self.internal_url.clone());
        overrides.set(ENV_EXCLUSIONS, self.exclusions.clone());
        overrides.set(ENV_METRICS, self.metrics.clone());
        overrides.set(ENV_COMPOSE_FILE, self.compose_file.clone());
        overrides.set(ENV_COMPOSE_PROJECT_NAME, self.compose_project.clone());
        overrides.set(ENV_SCANNER_SERVICE, self.scanner_service.clone());
        overrides
    }
}
