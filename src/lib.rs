pub mod balance;
pub mod blockchain;
pub mod config;
pub mod contracts;
pub mod deployments;
pub mod error;
pub mod executor;
pub mod jobs;
pub mod registry;
pub mod signer;
pub mod topup;
pub mod transaction_monitor;
pub mod wallet;

pub use blockchain::{ChainRpc, Transport};
pub use config::AgentConfig;
pub use error::{WalletError, WalletResult};
pub use jobs::TopUpJob;
pub use topup::{PendingTopUp, TopUpDecision, TopUpReason, TopUpRequest};
pub use transaction_monitor::{TransactionMonitor, TransactionReceipt, TransactionStatus};
pub use wallet::{AdminWallet, WalletState};
