use alloy::primitives::Address;
use std::collections::HashMap;

use crate::config::NetworkSettings;
use crate::contracts::{CallOptions, ContractBinding, ContractKind};
use crate::deployments::Deployments;
use crate::error::{WalletError, WalletResult};

const GWEI: u128 = 1_000_000_000;

/// Bound handles for every contract the agent talks to.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    bindings: HashMap<ContractKind, ContractBinding>,
}

impl ContractRegistry {
    /// Resolve and bind every contract kind for the configured network.
    ///
    /// Fails on the first contract without an address; a partially bound
    /// registry is never returned.
    pub fn bind(deployments: &Deployments, network: &NetworkSettings, admin: Address) -> WalletResult<Self> {
        let defaults = CallOptions {
            from: admin,
            gas: network.contract_gas_limit,
            gas_price: u128::from(network.gas_price_gwei) * GWEI,
        };

        let mut bindings = HashMap::new();
        for kind in ContractKind::ALL {
            let (address, source) = deployments.resolve(kind, &network.name, network.id)?;
            let binding = ContractBinding {
                kind,
                address,
                source,
                abi: deployments.artifact(kind).map(|a| a.abi.clone()).unwrap_or_default(),
                defaults,
            };

            let missing = binding.missing_functions();
            if !missing.is_empty() {
                tracing::warn!(contract = %kind, missing = ?missing, "Bound ABI lacks functions the agent calls");
            }
            tracing::info!(contract = %kind, address = %address, source = ?source, "Contract bound");

            bindings.insert(kind, binding);
        }

        Ok(Self { bindings })
    }

    pub fn get(&self, kind: ContractKind) -> WalletResult<&ContractBinding> {
        self.bindings
            .get(&kind)
            .ok_or_else(|| WalletError::NotReady(format!("{} is not bound", kind)))
    }

    pub fn identity(&self) -> WalletResult<&ContractBinding> {
        self.get(ContractKind::Identity)
    }

    pub fn token(&self) -> WalletResult<&ContractBinding> {
        self.get(ContractKind::Token)
    }

    pub fn redemption(&self) -> WalletResult<&ContractBinding> {
        self.get(ContractKind::Redemption)
    }

    pub fn reserve(&self) -> WalletResult<&ContractBinding> {
        self.get(ContractKind::Reserve)
    }
}
