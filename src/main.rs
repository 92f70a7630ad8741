use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheet_sql::command::GenerateCommand;
use sheet_sql::config::{Config, DEFAULT_CONFIG_FILE};
use sheet_sql::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sheet_sql")]
#[command(about = "Generates SQL files from spreadsheet worksheets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one .sql file per worksheet: generate -data=<workbook>
    Generate {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = Config::load(DEFAULT_CONFIG_FILE).unwrap_or_else(|e| {
        eprintln!("Ignoring {}: {}", DEFAULT_CONFIG_FILE, e);
        Config::default()
    });
    if let Err(e) = logging::init(&config.cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config) {
        error!(error = %format!("{:#}", e), "generate failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Generate { args } => {
            let stdout = std::io::stdout();
            let mut command = GenerateCommand::new(stdout.lock(), config.generate);
            let written = command.run(&args).context("Generate SQL failed")?;
            info!(files = written.len(), "generate finished");
        }
    }
    Ok(())
}
