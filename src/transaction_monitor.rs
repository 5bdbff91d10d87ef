use alloy::primitives::{Log, B256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::blockchain::ChainRpc;
use crate::error::WalletResult;

#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
    pub status: TransactionStatus,
    /// Emitted logs, not interpreted by the agent.
    pub logs: Vec<Log>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    Success,
    Failed,
    Timeout,
}

#[derive(Clone)]
pub struct TransactionMonitor {
    chain: Arc<dyn ChainRpc>,
    max_wait_time: Duration,
    poll_interval: Duration,
}

impl TransactionMonitor {
    pub fn new(chain: Arc<dyn ChainRpc>, max_wait_time: Duration, poll_interval: Duration) -> Self {
        Self {
            chain,
            max_wait_time,
            poll_interval,
        }
    }

    /// Poll for the receipt until it lands or `max_wait_time` elapses.
    ///
    /// RPC errors while polling are logged and polling continues.
    pub async fn monitor_transaction(&self, tx_hash: B256) -> WalletResult<TransactionReceipt> {
        tracing::debug!(tx_hash = %tx_hash, "Monitoring transaction");

        let start_time = std::time::Instant::now();

        loop {
            match self.chain.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        status = ?receipt.status,
                        block = receipt.block_number,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Error checking transaction status");
                }
            }

            if start_time.elapsed() >= self.max_wait_time {
                tracing::warn!(tx_hash = %tx_hash, waited = ?self.max_wait_time, "Transaction monitoring timeout");
                return Ok(TransactionReceipt {
                    hash: tx_hash,
                    block_number: 0,
                    gas_used: U256::ZERO,
                    status: TransactionStatus::Timeout,
                    logs: Vec::new(),
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}
