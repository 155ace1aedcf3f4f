//! Lendguard CLI - Main entry point

use clap::{Parser, Subcommand};
use lendguard_actions::Action;
use lendguard_cli::{commands, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lendguard")]
#[command(about = "Lendguard - lending risk and rewards engine", long_about = None)]
struct Cli {
    /// Market snapshot JSON file
    #[arg(short, long, default_value = "./market.json")]
    snapshot: PathBuf,

    /// Action validator config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reserves with rates and rewards
    Reserves,

    /// Show an obligation's health
    Health {
        /// Obligation ID
        obligation: String,
    },

    /// Maximum amount for an action
    Max {
        /// deposit, borrow, withdraw or repay
        action: Action,
        /// Reserve symbol
        symbol: String,
        /// Obligation ID
        #[arg(long)]
        obligation: Option<String>,
        /// Wallet balance of the reserve's coin
        #[arg(long, default_value = "0")]
        balance: Decimal,
    },

    /// Validate an amount for an action
    Check {
        /// deposit, borrow, withdraw or repay
        action: Action,
        /// Reserve symbol
        symbol: String,
        /// Amount in token units
        amount: Decimal,
        /// Obligation ID
        #[arg(long)]
        obligation: Option<String>,
        /// Wallet balance of the reserve's coin
        #[arg(long, default_value = "0")]
        balance: Decimal,
    },

    /// Show an obligation's claimable rewards
    Rewards {
        /// Obligation ID
        obligation: String,
    },

    /// Plan a liquidation
    Liquidate {
        /// Obligation ID
        obligation: String,
        /// Symbol of the borrow to repay
        #[arg(long)]
        repay: String,
        /// Symbol of the deposit to seize
        #[arg(long)]
        withdraw: String,
        /// Liquidator wallet coins JSON file
        #[arg(long)]
        wallet: PathBuf,
        /// Liquidator address
        #[arg(long)]
        liquidator: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let ctx = AppContext::load(&cli.snapshot, cli.config.as_deref()).await?;

    match cli.command {
        Commands::Reserves => commands::reserves(&ctx).await?,

        Commands::Health { obligation } => commands::health(&ctx, &obligation).await?,

        Commands::Max {
            action,
            symbol,
            obligation,
            balance,
        } => {
            commands::max(&ctx, action, &symbol, obligation.as_deref(), balance).await?;
        }

        Commands::Check {
            action,
            symbol,
            amount,
            obligation,
            balance,
        } => {
            commands::check(
                &ctx,
                action,
                &symbol,
                amount,
                obligation.as_deref(),
                balance,
            )
            .await?;
        }

        Commands::Rewards { obligation } => commands::rewards(&ctx, &obligation).await?,

        Commands::Liquidate {
            obligation,
            repay,
            withdraw,
            wallet,
            liquidator,
        } => {
            commands::liquidate(&ctx, &obligation, &repay, &withdraw, &wallet, &liquidator)
                .await?;
        }
    }

    Ok(())
}
