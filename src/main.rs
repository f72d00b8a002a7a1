use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;

use crm_backend::config::Config;
use crm_backend::storage::{InMemoryStorage, Storage};
use crm_backend::{jobs, logging, seeder, server};

#[cfg(feature = "db")]
use crm_backend::db::{DatabaseManager, LibsqlStorage};

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "CRM backend: GraphQL API server, data seeder and maintenance jobs")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        /// Port to listen on (overrides config.toml)
        #[arg(short, long)]
        port: Option<u16>,

        /// Use database storage instead of in-memory
        #[arg(long)]
        use_database: bool,
    },
    /// Seed the database with sample customers, products and orders
    Seed {
        /// Number of customers to create
        #[arg(long, default_value_t = 10)]
        customers: usize,

        /// Number of products to create
        #[arg(long, default_value_t = 8)]
        products: usize,

        /// Number of orders to create
        #[arg(long, default_value_t = 15)]
        orders: usize,

        /// Use database storage instead of in-memory
        #[arg(long)]
        use_database: bool,
    },
    /// Append a liveness heartbeat and probe the GraphQL endpoint
    Heartbeat,
    /// Restock low-inventory products through the API
    Restock,
    /// Log reminders for orders placed in the trailing week
    OrderReminders,
    /// Append a summary report line (customers, orders, revenue)
    Report,
}

async fn create_storage(use_database: bool) -> Result<Arc<dyn Storage>> {
    if use_database {
        #[cfg(feature = "db")]
        {
            tracing::info!("Initializing database storage...");
            let manager = DatabaseManager::new().await?;
            manager.run_migrations().await?;
            tracing::info!("Database storage initialized successfully");
            Ok(Arc::new(LibsqlStorage::new(manager)))
        }
        #[cfg(not(feature = "db"))]
        {
            anyhow::bail!("Database feature not enabled. Rebuild with --features db");
        }
    } else {
        Ok(Arc::new(InMemoryStorage::new()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, use_database } => {
            let storage = create_storage(use_database).await?;
            let port = port.unwrap_or(config.server.port);
            server::start_server(storage, port)
                .await
                .map_err(|e| anyhow::anyhow!("Server failed: {e}"))?;
        }
        Commands::Seed {
            customers,
            products,
            orders,
            use_database,
        } => {
            let storage = create_storage(use_database).await?;
            println!("Starting database seeding...");
            let summary = seeder::seed(storage.as_ref(), customers, products, orders).await?;
            println!(
                "Seeded {} customers, {} products and {} orders.",
                summary.customers, summary.products, summary.orders
            );
            if !use_database {
                println!("Note: in-memory storage is ephemeral; use --use-database to persist.");
            }
        }
        // Jobs never propagate failures to the scheduler: every error is
        // caught and logged, and the process exits normally.
        Commands::Heartbeat => {
            if let Err(e) = jobs::heartbeat::run(&config).await {
                error!("Heartbeat job failed: {e}");
            }
        }
        Commands::Restock => {
            if let Err(e) = jobs::restock::run(&config).await {
                error!("Restock job failed: {e}");
            }
        }
        Commands::OrderReminders => {
            if let Err(e) = jobs::reminders::run(&config).await {
                error!("Order reminders job failed: {e}");
            }
        }
        Commands::Report => {
            if let Err(e) = jobs::report::run(&config).await {
                error!("Report job failed: {e}");
            }
        }
    }
    Ok(())
}
