//! Contract kinds, bindings, and the per-contract call surfaces.

pub mod identity;
pub mod token;

use alloy::json_abi::JsonAbi;
use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;

pub use identity::IdentityGateway;

/// The contracts the agent binds at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Identity,
    Token,
    Redemption,
    Reserve,
}

impl ContractKind {
    pub const ALL: [ContractKind; 4] = [
        ContractKind::Identity,
        ContractKind::Token,
        ContractKind::Redemption,
        ContractKind::Reserve,
    ];

    /// Name used as the manifest key and the artifact file stem.
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::Identity => "Identity",
            ContractKind::Token => "Token",
            ContractKind::Redemption => "Redemption",
            ContractKind::Reserve => "Reserve",
        }
    }

    /// Functions the agent calls on this contract.
    pub fn required_functions(&self) -> &'static [&'static str] {
        match self {
            ContractKind::Identity => &["whitelist", "blacklist", "isVerified"],
            ContractKind::Token => &["balanceOf"],
            ContractKind::Redemption | ContractKind::Reserve => &[],
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which deployment source produced a binding's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    Manifest,
    Artifact,
}

/// Options stamped on every request built from a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    pub from: Address,
    pub gas: u64,
    pub gas_price: u128,
}

#[derive(Debug, Clone)]
pub struct ContractBinding {
    pub kind: ContractKind,
    pub address: Address,
    pub source: AddressSource,
    pub abi: JsonAbi,
    pub defaults: CallOptions,
}

impl ContractBinding {
    /// Encode `call` into a request addressed to this contract.
    pub fn request<C: SolCall>(&self, call: &C) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.defaults.from)
            .with_to(self.address)
            .with_input(call.abi_encode())
            .with_gas_limit(self.defaults.gas)
            .with_gas_price(self.defaults.gas_price)
    }

    /// Required functions absent from the bound ABI.
    pub fn missing_functions(&self) -> Vec<&'static str> {
        self.kind
            .required_functions()
            .iter()
            .copied()
            .filter(|name| self.abi.function(name).is_none())
            .collect()
    }
}
