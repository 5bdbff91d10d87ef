use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};

use crate::contracts::token::IToken;
use crate::contracts::ContractBinding;
use crate::error::{WalletError, WalletResult};
use crate::executor::TransactionExecutor;

/// Native-currency and token balance lookups.
#[derive(Clone, Copy)]
pub struct BalanceQuery<'a> {
    token: &'a ContractBinding,
    executor: &'a TransactionExecutor,
    admin: Address,
}

impl<'a> BalanceQuery<'a> {
    pub fn new(token: &'a ContractBinding, executor: &'a TransactionExecutor, admin: Address) -> Self {
        Self { token, executor, admin }
    }

    /// Raw native balance in wei.
    pub async fn address_balance(&self, address: Address) -> WalletResult<U256> {
        self.executor.balance(address, "addressBalance").await
    }

    /// Admin native balance in ether, e.g. `"1.250000000000000000"`.
    pub async fn admin_balance(&self) -> WalletResult<String> {
        let balance = self.executor.balance(self.admin, "adminBalance").await?;
        format_units(balance, "ether").map_err(|e| {
            tracing::error!(error = %e, "Failed to format admin balance");
            WalletError::transport(e)
        })
    }

    pub async fn token_balance(&self, address: Address) -> WalletResult<U256> {
        let call = IToken::balanceOfCall { account: address };
        self.executor.read(self.token, &call, "tokenBalance").await
    }

    pub async fn admin_token_balance(&self) -> WalletResult<U256> {
        self.token_balance(self.admin).await
    }
}
