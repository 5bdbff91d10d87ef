use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use crate::config::{NetworkSettings, TransportKind};
use crate::error::{WalletError, WalletResult};
use crate::transaction_monitor::{TransactionReceipt, TransactionStatus};

/// The JSON-RPC surface the agent needs from a node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn get_balance(&self, address: Address) -> WalletResult<U256>;

    /// `eth_call`; returns the raw return data.
    async fn call(&self, tx: TransactionRequest) -> WalletResult<Bytes>;

    /// Sign with the installed wallet and broadcast; returns the hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> WalletResult<B256>;

    async fn get_transaction_receipt(&self, tx_hash: B256) -> WalletResult<Option<TransactionReceipt>>;
}

/// Node endpoint selected from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    WebSocket(Url),
    Http(Url),
}

impl Transport {
    /// WebSocket uses the URL as configured; HTTP appends the API key.
    pub fn from_settings(settings: &NetworkSettings) -> WalletResult<Self> {
        match settings.transport {
            TransportKind::WebSocket => Ok(Self::WebSocket(parse_url(&settings.url)?)),
            TransportKind::Http => {
                let endpoint = format!("{}{}", settings.url, settings.api_key().unwrap_or(""));
                Ok(Self::Http(parse_url(&endpoint)?))
            }
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Self::WebSocket(url) | Self::Http(url) => url,
        }
    }

    /// Build a provider with `wallet` as its signer.
    ///
    /// HTTP construction never touches the network. WebSocket construction
    /// performs the handshake, so an unreachable node fails here.
    pub async fn connect(&self, wallet: EthereumWallet) -> WalletResult<AlloyChain> {
        let provider: Arc<dyn Provider<Ethereum>> = match self {
            Self::Http(url) => Arc::new(ProviderBuilder::new().wallet(wallet).connect_http(url.clone())),
            Self::WebSocket(url) => {
                let provider = ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_ws(WsConnect::new(url.as_str()))
                    .await
                    .map_err(|e| WalletError::Initialization(format!("WebSocket connect to {} failed: {}", url, e)))?;
                Arc::new(provider)
            }
        };

        tracing::info!(transport = self.kind(), "Provider constructed");
        Ok(AlloyChain { provider })
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::WebSocket(_) => "websocket",
            Self::Http(_) => "http",
        }
    }
}

/// `ChainRpc` backed by an alloy provider.
#[derive(Clone)]
pub struct AlloyChain {
    provider: Arc<dyn Provider<Ethereum>>,
}

impl AlloyChain {
    pub fn provider(&self) -> Arc<dyn Provider<Ethereum>> {
        self.provider.clone()
    }
}

#[async_trait]
impl ChainRpc for AlloyChain {
    async fn get_balance(&self, address: Address) -> WalletResult<U256> {
        self.provider.get_balance(address).await.map_err(WalletError::transport)
    }

    async fn call(&self, tx: TransactionRequest) -> WalletResult<Bytes> {
        self.provider.call(tx).await.map_err(WalletError::transport)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> WalletResult<B256> {
        let pending = self.provider.send_transaction(tx).await.map_err(WalletError::transport)?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, tx_hash: B256) -> WalletResult<Option<TransactionReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(WalletError::transport)?;

        Ok(receipt.map(|receipt| TransactionReceipt {
            hash: tx_hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: U256::from(receipt.gas_used),
            status: if receipt.status() {
                TransactionStatus::Success
            } else {
                TransactionStatus::Failed
            },
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        }))
    }
}

pub fn parse_address(addr: &str) -> WalletResult<Address> {
    Address::from_str(addr.trim()).map_err(|e| WalletError::InvalidAddress(format!("{}: {}", addr, e)))
}

fn parse_url(raw: &str) -> WalletResult<Url> {
    Url::parse(raw).map_err(|e| WalletError::Initialization(format!("Invalid RPC URL '{}': {}", raw, e)))
}
