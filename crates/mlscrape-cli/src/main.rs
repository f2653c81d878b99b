use clap::{Parser, Subcommand};
use mlscrape_scraper::{FetcherConfig, Marketplace};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mlscrape-cli")]
#[command(about = "Scrape MercadoLibre offers, search results and product pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Daily offers listing
    Offers {
        /// Pages to follow; 0 follows every page
        #[arg(long, default_value_t = 1)]
        max_pages: u32,
    },
    /// Search results for a query
    Search {
        query: String,
        /// Pages to follow; 0 follows every page
        #[arg(long, default_value_t = 1)]
        max_pages: u32,
    },
    /// Detail of a single product page
    Product { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = mlscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let marketplace = Marketplace::from_config(FetcherConfig::from_app_config(&config))?;

    match cli.command {
        Commands::Offers { max_pages } => print_json(&marketplace.list_offers(max_pages).await?),
        Commands::Search { query, max_pages } => {
            print_json(&marketplace.search(&query, max_pages).await?)
        }
        Commands::Product { url } => print_json(&marketplace.get_product(&url).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
