//! Administrative account initialization.
//!
//! The agent signs with exactly one account, loaded either from a raw private
//! key or derived from a BIP-39 mnemonic. Key material never leaves the
//! signer; `Debug` output only shows the address.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use alloy::signers::Signer;

use crate::config::AccountSettings;
use crate::error::{WalletError, WalletResult};

/// Number of HD addresses derived from a mnemonic.
pub const HD_DERIVATION_COUNT: u32 = 10;

/// Where the admin key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    PrivateKey,
    Mnemonic { derived: u32 },
}

/// The single signing account of the agent.
#[derive(Clone)]
pub struct AdminAccount {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    source: KeySource,
}

impl AdminAccount {
    /// Build the admin account from configuration.
    ///
    /// A private key takes precedence over a mnemonic. With neither configured
    /// the call fails instead of leaving the agent without a signer.
    pub fn from_settings(settings: &AccountSettings, chain_id: u64) -> WalletResult<Self> {
        if let Some(private_key) = settings.private_key() {
            return Self::from_private_key(private_key, chain_id);
        }
        if let Some(phrase) = settings.mnemonic() {
            return Self::from_mnemonic(phrase, chain_id);
        }
        Err(WalletError::Initialization(
            "no admin account configured: set account.private_key or account.mnemonic".to_string(),
        ))
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> WalletResult<Self> {
        let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::Initialization(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(address = %signer.address(), chain_id, "Admin account loaded from private key");

        Ok(Self {
            wallet: EthereumWallet::new(signer.clone()),
            signer,
            source: KeySource::PrivateKey,
        })
    }

    /// Derive `m/44'/60'/0'/0/{0..10}`; index 0 is the admin account.
    pub fn from_mnemonic(phrase: &str, chain_id: u64) -> WalletResult<Self> {
        let mut derived = Vec::with_capacity(HD_DERIVATION_COUNT as usize);
        for index in 0..HD_DERIVATION_COUNT {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase.trim())
                .index(index)
                .and_then(|builder| builder.build())
                .map_err(|e| WalletError::Initialization(format!("Invalid mnemonic: {}", e)))?;
            derived.push(signer.with_chain_id(Some(chain_id)));
        }

        let mut signers = derived.into_iter();
        let admin = signers
            .next()
            .ok_or_else(|| WalletError::Initialization("mnemonic derived no accounts".to_string()))?;

        // The admin key is re-imported from its raw bytes so the default
        // signer does not depend on the HD builder.
        let admin = PrivateKeySigner::from_bytes(&admin.to_bytes())
            .map_err(|e| WalletError::Initialization(format!("Invalid derived key: {}", e)))?
            .with_chain_id(Some(chain_id));

        let mut wallet = EthereumWallet::new(admin.clone());
        for signer in signers {
            wallet.register_signer(signer);
        }

        tracing::info!(
            address = %admin.address(),
            chain_id,
            derived = HD_DERIVATION_COUNT,
            "Admin account derived from mnemonic"
        );

        Ok(Self {
            signer: admin,
            wallet,
            source: KeySource::Mnemonic { derived: HD_DERIVATION_COUNT },
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet to install on the provider; the admin signer is its default.
    pub fn wallet(&self) -> EthereumWallet {
        self.wallet.clone()
    }

    pub fn source(&self) -> KeySource {
        self.source
    }
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("address", &self.address())
            .field("source", &self.source)
            .finish()
    }
}
