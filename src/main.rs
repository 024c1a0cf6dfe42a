use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};

use betsmart::cli::{self, output::OutputMode, Cli, Commands};
use betsmart::config::AppConfig;
use betsmart::persistence::{JsonFileDirectory, JsonFileLedgerStore};
use betsmart::services::{AccountSession, SessionDefaults};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: could not load config from {} ({e}), using defaults", cli.config);
            AppConfig::default()
        }
    };

    let _log_guard = if cli.command.is_read_only() {
        init_logging_simple();
        None
    } else {
        init_logging(&config.logging)
    };

    if let Err(errors) = config.validate() {
        for e in &errors {
            warn!(error = %e, "invalid configuration");
        }
    }

    let data_dir = config.storage.resolved_data_dir();
    debug!(data_dir = %data_dir.display(), account = %cli.account, "opening account");

    let store = Arc::new(JsonFileLedgerStore::new(&data_dir));
    let directory = Arc::new(JsonFileDirectory::new(&data_dir));
    let mut session = AccountSession::open(
        &cli.account,
        store,
        directory,
        SessionDefaults::from(&config),
    )
    .await?;

    let mode = OutputMode::from_json_flag(cli.json);

    match cli.command {
        Commands::Bet(cmd) => cmd.run(&mut session, mode).await?,
        Commands::Bankroll(cmd) => cmd.run(&mut session, mode).await?,
        Commands::Kelly {
            odds,
            win_prob,
            profile,
            no_safety_margin,
            bankroll,
        } => {
            let mut calculator = config.staking.calculator();
            if let Some(profile) = profile {
                calculator.risk_profile = profile;
            }
            if no_safety_margin {
                calculator = calculator.with_safety_margin(false);
            }
            cli::staking::run(&session, &calculator, &odds, &win_prob, bankroll, mode)?;
        }
        Commands::Stats => cli::report::stats(&session, mode)?,
        Commands::Equity => cli::report::equity(&session, mode)?,
        Commands::Clv => cli::report::clv(&session, mode)?,
        Commands::Export { output } => cli::report::export(&session, output).await?,
    }

    Ok(())
}
