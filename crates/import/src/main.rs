use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tea_core::import::ImportOptions;
use tea_import::{read_records, write_records, ImportError, Importer};

/// Bulk import and export for the TEA techniques catalogue.
#[derive(Parser, Debug)]
#[command(name = "tea-import")]
#[command(about = "Bulk import and export for the TEA techniques catalogue")]
#[command(version)]
struct Cli {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import techniques from a JSON array file.
    Import {
        /// Path to the import file.
        file: PathBuf,

        /// Log and skip failed records instead of aborting.
        #[arg(long)]
        force: bool,

        /// Validate the file and report counts without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every technique, then import.
    ResetAndImport {
        /// Path to the import file.
        file: PathBuf,

        /// Log and skip failed records instead of aborting.
        #[arg(long)]
        force: bool,
    },

    /// Dump the catalogue to a file in the import format.
    Export {
        /// Path to write.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tea_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> Result<(), ImportError> {
    let pool = tea_db::create_pool(&cli.database_url).await?;
    let importer = Importer::new(pool);

    match cli.command {
        Command::Import {
            file,
            force,
            dry_run,
        } => {
            let records = read_records(&file)?;
            let stats = importer
                .import(&records, ImportOptions { force, dry_run })
                .await?;
            if dry_run {
                println!(
                    "dry-run: validated={} skipped={}",
                    stats.processed - stats.skipped,
                    stats.skipped
                );
            } else {
                println!("{}", stats.summary());
            }
        }
        Command::ResetAndImport { file, force } => {
            let records = read_records(&file)?;
            let stats = importer
                .reset_and_import(
                    &records,
                    ImportOptions {
                        force,
                        dry_run: false,
                    },
                )
                .await?;
            println!("{}", stats.summary());
        }
        Command::Export { file } => {
            let records = importer.export().await?;
            write_records(&file, &records)?;
            println!("exported {} techniques to {}", records.len(), file.display());
        }
    }

    Ok(())
}
