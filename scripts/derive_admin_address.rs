use anyhow::Result;
use identity_admin_agent::config::AgentConfig;
use identity_admin_agent::signer::{AdminAccount, KeySource};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CONFIG_PATH>", args[0]);
        std::process::exit(1);
    }

    let config = AgentConfig::load(&args[1])?;
    let account = AdminAccount::from_settings(&config.account, config.network.id)?;

    let source = match account.source() {
        KeySource::PrivateKey => "private key".to_string(),
        KeySource::Mnemonic { derived } => format!("mnemonic (index 0 of {})", derived),
    };
    println!("Admin address: {}", account.address());
    println!("Derived from: {}", source);
    println!("Network: {} (id {})", config.network.name, config.network.id);
    println!("Fund this address with native currency to pay for gas and top-ups");

    Ok(())
}
