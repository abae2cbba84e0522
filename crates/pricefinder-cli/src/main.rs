mod lookup;
mod stats;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricefinder-cli")]
#[command(about = "Uniqlo Japan price lookup command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a product by serial number or product code
    Lookup {
        /// Six-digit serial, or any product code the storefront search accepts
        product_id: String,

        /// Print the full lookup result as JSON instead of the chat reply
        #[arg(long)]
        json: bool,

        /// Skip Postgres; cache and history live only for this invocation
        #[arg(long)]
        no_db: bool,
    },
    /// Show search statistics and the most recent searches
    Stats {
        /// Number of recent searches to list
        #[arg(long, default_value_t = 10)]
        recent: i64,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("pricefinder-cli: no command given; try `pricefinder-cli lookup 474479`");
        return Ok(());
    };

    let config = pricefinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Lookup {
            product_id,
            json,
            no_db,
        } => {
            if no_db {
                lookup::run_lookup_in_memory(&config, &product_id, json).await?;
            } else {
                let pool = pricefinder_db::connect_pool_from_config(&config).await?;
                lookup::run_lookup(&config, pool, &product_id, json).await?;
            }
        }
        Commands::Stats { recent } => {
            let pool = pricefinder_db::connect_pool_from_config(&config).await?;
            stats::run_stats(&pool, recent).await?;
        }
        Commands::Db { command } => {
            let pool = pricefinder_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => {
                    pricefinder_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = pricefinder_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
    }

    Ok(())
}
