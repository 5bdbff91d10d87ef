//! Uniform execution path for contract calls and transfers.
//!
//! Reads go straight to `eth_call`. Submissions from the admin account pass
//! through a FIFO queue: one transaction is signed and broadcast at a time,
//! so nonces are assigned in submission order. There is no retry; each call
//! is attempted once and the error goes back to the caller.

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blockchain::ChainRpc;
use crate::contracts::ContractBinding;
use crate::error::{WalletError, WalletResult};
use crate::transaction_monitor::{TransactionMonitor, TransactionReceipt, TransactionStatus};

#[derive(Clone)]
pub struct TransactionExecutor {
    chain: Arc<dyn ChainRpc>,
    monitor: TransactionMonitor,
    // tokio's Mutex grants the lock in FIFO order.
    submissions: Arc<Mutex<()>>,
}

impl TransactionExecutor {
    pub fn new(chain: Arc<dyn ChainRpc>, monitor: TransactionMonitor) -> Self {
        Self {
            chain,
            monitor,
            submissions: Arc::new(Mutex::new(())),
        }
    }

    /// Read-only contract call, decoded into the call's return type.
    pub async fn read<C: SolCall>(
        &self,
        binding: &ContractBinding,
        call: &C,
        operation: &str,
    ) -> WalletResult<C::Return> {
        let result = self
            .chain
            .call(binding.request(call))
            .await
            .and_then(|data| C::abi_decode_returns(&data).map_err(WalletError::transport));

        if let Err(e) = &result {
            tracing::error!(operation, contract = %binding.kind, error = %e, "Contract read failed");
        }
        result
    }

    /// State-changing contract call; resolves once the receipt is in.
    pub async fn send<C: SolCall>(
        &self,
        binding: &ContractBinding,
        call: &C,
        operation: &str,
    ) -> WalletResult<TransactionReceipt> {
        let tx_hash = self.submit(binding.request(call), operation).await?;
        let receipt = self.confirm(tx_hash, operation).await?;

        tracing::info!(
            operation,
            contract = %binding.kind,
            tx_hash = %receipt.hash,
            gas_used = %receipt.gas_used,
            "Transaction succeeded"
        );
        Ok(receipt)
    }

    /// Queue and broadcast a transaction; returns once the node accepted it.
    pub async fn submit(&self, tx: TransactionRequest, operation: &str) -> WalletResult<B256> {
        let _slot = self.submissions.lock().await;

        match self.chain.send_transaction(tx).await {
            Ok(tx_hash) => {
                tracing::debug!(operation, tx_hash = %tx_hash, "Transaction submitted");
                Ok(tx_hash)
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Transaction submission failed");
                Err(e)
            }
        }
    }

    /// Wait for a submitted transaction; reverts and timeouts become errors.
    pub async fn confirm(&self, tx_hash: B256, operation: &str) -> WalletResult<TransactionReceipt> {
        let receipt = self.monitor.monitor_transaction(tx_hash).await?;
        match receipt.status {
            TransactionStatus::Success => Ok(receipt),
            TransactionStatus::Failed => {
                tracing::error!(operation, tx_hash = %tx_hash, block = receipt.block_number, "Transaction reverted");
                Err(WalletError::Transport(format!("transaction {} reverted", tx_hash)))
            }
            TransactionStatus::Timeout => {
                tracing::error!(operation, tx_hash = %tx_hash, "Transaction receipt not found before timeout");
                Err(WalletError::Transport(format!("transaction {} not confirmed before timeout", tx_hash)))
            }
        }
    }

    /// Native balance of `address` in wei.
    pub async fn balance(&self, address: Address, operation: &str) -> WalletResult<U256> {
        let result = self.chain.get_balance(address).await;
        if let Err(e) = &result {
            tracing::error!(operation, address = %address, error = %e, "Balance query failed");
        }
        result
    }
}
