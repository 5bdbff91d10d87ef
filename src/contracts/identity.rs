use alloy::primitives::Address;
use alloy::sol;

use crate::contracts::ContractBinding;
use crate::error::WalletResult;
use crate::executor::TransactionExecutor;
use crate::transaction_monitor::TransactionReceipt;

sol! {
    #[sol(rpc)]
    interface IIdentity {
        function whitelist(address account, string externalId) external;
        function blacklist(address account) external;
        function isVerified(address account) external view returns (bool);
    }
}

/// Whitelist/blacklist/verify operations on the identity contract.
#[derive(Clone, Copy)]
pub struct IdentityGateway<'a> {
    binding: &'a ContractBinding,
    executor: &'a TransactionExecutor,
}

impl<'a> IdentityGateway<'a> {
    pub fn new(binding: &'a ContractBinding, executor: &'a TransactionExecutor) -> Self {
        Self { binding, executor }
    }

    pub async fn whitelist(&self, account: Address, external_id: &str) -> WalletResult<TransactionReceipt> {
        let call = IIdentity::whitelistCall {
            account,
            externalId: external_id.to_string(),
        };
        let receipt = self.executor.send(self.binding, &call, "whitelist").await?;

        tracing::info!(
            address = %account,
            external_id,
            tx_hash = %receipt.hash,
            block = receipt.block_number,
            "Address whitelisted"
        );
        Ok(receipt)
    }

    pub async fn blacklist(&self, account: Address) -> WalletResult<TransactionReceipt> {
        let call = IIdentity::blacklistCall { account };
        let receipt = self.executor.send(self.binding, &call, "blacklist").await?;

        tracing::info!(
            address = %account,
            tx_hash = %receipt.hash,
            block = receipt.block_number,
            "Address blacklisted"
        );
        Ok(receipt)
    }

    pub async fn is_verified(&self, account: Address) -> WalletResult<bool> {
        let call = IIdentity::isVerifiedCall { account };
        self.executor.read(self.binding, &call, "isVerified").await
    }
}
