mod commands;
mod context;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rankscope_core::AnalysisScope;

#[derive(Debug, Parser)]
#[command(name = "rankscope-cli")]
#[command(about = "Estimate the revenue an SEO campaign could unlock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full opportunity analysis and print the report
    Analyze {
        /// The client's website
        #[arg(long)]
        url: String,
        /// What the business does (e.g. "Roofing")
        #[arg(long)]
        business_type: String,
        /// "City, State" for local analyses
        #[arg(long, default_value = "")]
        location: String,
        /// Provider location code; resolved from --location when omitted
        #[arg(long)]
        location_code: Option<i64>,
        /// Average value of one customer
        #[arg(long)]
        customer_value: f64,
        #[arg(long, default_value = "local")]
        scope: AnalysisScope,
        /// Competitor URL; repeat to supply several and skip detection
        #[arg(long = "competitor")]
        competitors: Vec<String>,
    },
    /// Resolve a state, and optionally a city, to a location code
    Locate {
        #[arg(long)]
        state: String,
        #[arg(long)]
        city: Option<String>,
        /// List the state's cities instead of resolving
        #[arg(long)]
        list_cities: bool,
    },
    /// Detect competitors without running the analysis
    Competitors {
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        business_type: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        location_code: Option<i64>,
        #[arg(long, default_value = "local")]
        scope: AnalysisScope,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = rankscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = context::Context::from_config(&config)?;

    match cli.command {
        Commands::Analyze {
            url,
            business_type,
            location,
            location_code,
            customer_value,
            scope,
            competitors,
        } => {
            let request = rankscope_core::AnalysisRequest {
                business_url: url,
                business_type,
                location,
                location_code,
                customer_value: Some(customer_value),
                analysis_scope: scope,
                competitors,
            };
            commands::run_analyze(&ctx, request).await
        }
        Commands::Locate {
            state,
            city,
            list_cities,
        } => commands::run_locate(&ctx, &state, city.as_deref(), list_cities).await,
        Commands::Competitors {
            url,
            business_type,
            location,
            location_code,
            scope,
        } => {
            let request = rankscope_core::AnalysisRequest {
                business_url: url,
                business_type,
                location,
                location_code,
                analysis_scope: scope,
                ..rankscope_core::AnalysisRequest::default()
            };
            commands::run_competitors(&ctx, &request).await
        }
    }
}
