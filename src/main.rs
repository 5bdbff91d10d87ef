use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use identity_admin_agent::blockchain::parse_address;
use identity_admin_agent::jobs::top_up::TopUpOutcome;
use identity_admin_agent::{AdminWallet, AgentConfig, TopUpJob, TopUpRequest};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "identity-admin-agent", about = "Administrative agent for the identity and token contracts")]
struct Cli {
    /// Path to the agent configuration file
    #[arg(short, long, default_value = "configs/agent.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize and report wallet state, admin address and balances
    Status,
    /// Mark an address as verified
    Whitelist {
        address: String,
        external_id: String,
    },
    /// Mark an address as unverified
    Blacklist { address: String },
    /// Check whether an address is verified
    IsVerified { address: String },
    /// Send native currency to an address under the top-up policy
    TopUp {
        address: String,
        /// Skip the verification check
        #[arg(long)]
        force: bool,
        /// Time of the previous top-up (RFC 3339)
        #[arg(long)]
        last_topping: Option<DateTime<Utc>>,
        /// Print the decision without sending
        #[arg(long)]
        dry_run: bool,
        /// Wait for the transfer receipt
        #[arg(long)]
        wait: bool,
    },
    /// Native balance of an address, in wei
    Balance { address: String },
    /// Native balance of the admin account, in ether
    AdminBalance,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_admin_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AgentConfig::load(&cli.config)?;

    info!(
        network = %config.network.name,
        network_id = config.network.id,
        environment = ?config.environment,
        "Configuration loaded"
    );

    let mut wallet = AdminWallet::new(config);
    wallet.initialize().await?;
    let wallet = Arc::new(wallet);

    match cli.command {
        Command::Status => {
            println!("state: {}", wallet.state().as_str());
            if let Some(admin) = wallet.admin_address() {
                println!("admin: {}", admin);
            }
            match wallet.admin_balance().await {
                Ok(balance) => println!("admin balance: {} ETH", balance),
                Err(e) => println!("admin balance: unavailable ({})", e),
            }
        }
        Command::Whitelist { address, external_id } => {
            let receipt = wallet.whitelist(parse_address(&address)?, &external_id).await?;
            println!("whitelisted {} in tx {:?} (block {})", address, receipt.hash, receipt.block_number);
        }
        Command::Blacklist { address } => {
            let receipt = wallet.blacklist(parse_address(&address)?).await?;
            println!("blacklisted {} in tx {:?} (block {})", address, receipt.hash, receipt.block_number);
        }
        Command::IsVerified { address } => {
            println!("{}", wallet.is_verified(parse_address(&address)?).await?);
        }
        Command::TopUp {
            address,
            force,
            last_topping,
            dry_run,
            wait,
        } => {
            let request = TopUpRequest {
                address: parse_address(&address)?,
                last_topping,
                force,
            };
            match TopUpJob::new(wallet.clone(), dry_run, wait).execute(&request).await? {
                TopUpOutcome::Planned(decision) => println!(
                    "decision: {:?}, amount: {} wei, deficit: {} wei",
                    decision.reason, decision.amount_to_send, decision.deficit
                ),
                TopUpOutcome::Submitted(tx_hash) => println!("top-up submitted: {:?}", tx_hash),
                TopUpOutcome::Confirmed(receipt) => {
                    println!("top-up confirmed: {:?} (block {})", receipt.hash, receipt.block_number)
                }
            }
        }
        Command::Balance { address } => {
            println!("{}", wallet.address_balance(parse_address(&address)?).await?);
        }
        Command::AdminBalance => {
            println!("{}", wallet.admin_balance().await?);
        }
    }

    Ok(())
}
