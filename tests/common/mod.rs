//! Shared fixtures: an in-memory chain that understands the identity and
//! token calls, plus helpers to build an initialized wallet on top of it.

#![allow(dead_code)]

use alloy::primitives::{address, Address, Bytes, TxKind, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use identity_admin_agent::contracts::identity::IIdentity;
use identity_admin_agent::contracts::token::IToken;
use identity_admin_agent::contracts::ContractKind;
use identity_admin_agent::deployments::{ContractArtifact, Deployments, NetworkDeployment};
use identity_admin_agent::signer::AdminAccount;
use identity_admin_agent::{AdminWallet, AgentConfig, ChainRpc, TransactionReceipt, TransactionStatus, WalletError, WalletResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Anvil's first development key.
pub const ADMIN_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ADMIN: Address = address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

pub const IDENTITY: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const TOKEN: Address = address!("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
pub const REDEMPTION: Address = address!("0xcccccccccccccccccccccccccccccccccccccccc");
pub const RESERVE: Address = address!("0xdddddddddddddddddddddddddddddddddddddddd");

pub const USER: Address = address!("0x1000000000000000000000000000000000000001");

pub const GWEI: u64 = 1_000_000_000;

pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::from(GWEI)
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(1_000_000_000_000_000_000u128)
}

#[derive(Default)]
struct MockState {
    balances: HashMap<Address, U256>,
    token_balances: HashMap<Address, U256>,
    verified: HashSet<Address>,
    sent: Vec<TransactionRequest>,
    receipts: HashMap<B256, TransactionReceipt>,
    nonce: u64,
}

/// In-memory node: identity whitelist state, native and token balances.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
    pub fail_reads: AtomicBool,
    /// Fail `eth_call` only; native balance reads still succeed.
    pub fail_calls: AtomicBool,
    pub fail_sends: AtomicBool,
    pub revert_sends: AtomicBool,
    pub withhold_receipts: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        let chain = Self::default();
        chain.set_balance(ADMIN, ether(10));
        Arc::new(chain)
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    pub fn set_token_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().token_balances.insert(address, balance);
    }

    pub fn verify(&self, address: Address) {
        self.state.lock().unwrap().verified.insert(address);
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn transfers(&self) -> Vec<TransactionRequest> {
        self.sent()
            .into_iter()
            .filter(|tx| tx.input.input().map_or(true, |input| input.is_empty()))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn apply(&self, tx: &TransactionRequest) -> WalletResult<()> {
        let mut state = self.state.lock().unwrap();
        let to = match tx.to {
            Some(TxKind::Call(to)) => to,
            _ => return Err(WalletError::Transport("contract creation not supported".to_string())),
        };
        let input = tx.input.input().cloned().unwrap_or_default();

        if input.is_empty() {
            let value = tx.value.unwrap_or_default();
            let from = tx.from.unwrap_or(ADMIN);
            let sender = state.balances.entry(from).or_default();
            *sender = sender.saturating_sub(value);
            *state.balances.entry(to).or_default() += value;
            return Ok(());
        }

        if to != IDENTITY {
            return Err(WalletError::Transport(format!("no contract at {}", to)));
        }
        if let Ok(call) = IIdentity::whitelistCall::abi_decode(&input) {
            state.verified.insert(call.account);
        } else if let Ok(call) = IIdentity::blacklistCall::abi_decode(&input) {
            state.verified.remove(&call.account);
        } else {
            return Err(WalletError::Transport("unknown identity method".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn get_balance(&self, address: Address) -> WalletResult<U256> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(WalletError::Transport("connection refused".to_string()));
        }
        Ok(self.state.lock().unwrap().balances.get(&address).copied().unwrap_or_default())
    }

    async fn call(&self, tx: TransactionRequest) -> WalletResult<Bytes> {
        if self.fail_reads.load(Ordering::SeqCst) || self.fail_calls.load(Ordering::SeqCst) {
            return Err(WalletError::Transport("connection refused".to_string()));
        }
        let input = tx.input.input().cloned().unwrap_or_default();
        let state = self.state.lock().unwrap();

        if let Ok(call) = IIdentity::isVerifiedCall::abi_decode(&input) {
            return Ok(state.verified.contains(&call.account).abi_encode().into());
        }
        if let Ok(call) = IToken::balanceOfCall::abi_decode(&input) {
            let balance = state.token_balances.get(&call.account).copied().unwrap_or_default();
            return Ok(balance.abi_encode().into());
        }
        Err(WalletError::Transport("execution reverted".to_string()))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> WalletResult<B256> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(WalletError::Transport("insufficient funds for gas".to_string()));
        }

        let reverted = self.revert_sends.load(Ordering::SeqCst);
        if !reverted {
            self.apply(&tx)?;
        }

        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        let nonce = state.nonce;
        let hash = B256::left_padding_from(&nonce.to_be_bytes());
        state.sent.push(tx);
        state.receipts.insert(
            hash,
            TransactionReceipt {
                hash,
                block_number: nonce,
                gas_used: U256::from(21_000u64),
                status: if reverted { TransactionStatus::Failed } else { TransactionStatus::Success },
                logs: Vec::new(),
            },
        );
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: B256) -> WalletResult<Option<TransactionReceipt>> {
        if self.withhold_receipts.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).cloned())
    }
}

pub fn test_config(environment: &str) -> AgentConfig {
    AgentConfig::from_toml_str(&format!(
        r#"
environment = "{}"

[network]
name = "test"
id = 42
url = "http://127.0.0.1:8545"

[account]
private_key = "{}"

[contracts]
manifest_path = "deployments/manifest.json"
artifacts_dir = "deployments/abis"

[monitoring]
transaction_timeout_seconds = 0
poll_interval_seconds = 1
"#,
        environment, ADMIN_KEY
    ))
    .expect("test config parses")
}

fn artifact(network_id: u64, address: Address) -> ContractArtifact {
    ContractArtifact {
        networks: HashMap::from([(
            network_id.to_string(),
            NetworkDeployment { address: Some(address.to_string()) },
        )]),
        ..Default::default()
    }
}

/// Artifacts deployed on network id 42, no manifest entries.
pub fn test_deployments() -> Deployments {
    let mut deployments = Deployments::default();
    deployments.artifacts.insert(ContractKind::Identity, artifact(42, IDENTITY));
    deployments.artifacts.insert(ContractKind::Token, artifact(42, TOKEN));
    deployments.artifacts.insert(ContractKind::Redemption, artifact(42, REDEMPTION));
    deployments.artifacts.insert(ContractKind::Reserve, artifact(42, RESERVE));
    deployments
}

pub async fn wallet_on(chain: Arc<MockChain>, environment: &str) -> AdminWallet {
    let config = test_config(environment);
    let account = AdminAccount::from_settings(&config.account, config.network.id).expect("admin key");
    let mut wallet = AdminWallet::new(config);
    wallet
        .initialize_with(chain, account, &test_deployments())
        .await
        .expect("wallet binds");
    wallet
}

pub async fn ready_wallet(environment: &str) -> (AdminWallet, Arc<MockChain>) {
    let chain = MockChain::new();
    let wallet = wallet_on(chain.clone(), environment).await;
    (wallet, chain)
}
