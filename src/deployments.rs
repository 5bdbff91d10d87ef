//! Static deployment data: a manifest of per-network addresses plus one
//! compiled artifact per contract carrying its ABI and a network-id
//! address table.
//!
//! ```text
//! manifest.json            { "kovan": { "Identity": "0x..", "Token": "0x.." } }
//! <artifacts>/Identity.json { "abi": [...], "networks": { "42": { "address": "0x.." } } }
//! ```

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::DeploymentSettings;
use crate::contracts::{AddressSource, ContractKind};
use crate::error::{WalletError, WalletResult};

/// network name -> contract name -> address
pub type DeploymentManifest = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName")]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub abi: JsonAbi,
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkDeployment {
    pub address: Option<String>,
}

impl ContractArtifact {
    pub fn address_for(&self, network_id: u64) -> Option<&str> {
        self.networks
            .get(&network_id.to_string())
            .and_then(|deployment| deployment.address.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Deployments {
    pub manifest: DeploymentManifest,
    pub artifacts: HashMap<ContractKind, ContractArtifact>,
}

impl Deployments {
    /// Read the manifest and every artifact from disk.
    ///
    /// A missing manifest is treated as empty; a missing artifact leaves the
    /// contract to be resolved from the manifest alone.
    pub fn load(settings: &DeploymentSettings) -> WalletResult<Self> {
        let manifest = if settings.manifest_path.exists() {
            read_json(&settings.manifest_path)?
        } else {
            tracing::warn!(path = %settings.manifest_path.display(), "Deployment manifest not found, using artifact addresses");
            DeploymentManifest::new()
        };

        let mut artifacts = HashMap::new();
        for kind in ContractKind::ALL {
            let path = settings.artifacts_dir.join(format!("{}.json", kind.name()));
            if path.exists() {
                artifacts.insert(kind, read_json(&path)?);
            } else {
                tracing::warn!(contract = %kind, path = %path.display(), "Contract artifact not found");
            }
        }

        Ok(Self { manifest, artifacts })
    }

    pub fn artifact(&self, kind: ContractKind) -> Option<&ContractArtifact> {
        self.artifacts.get(&kind)
    }

    /// Manifest entry for the named network first, then the artifact's
    /// entry for the numeric network id.
    pub fn resolve(
        &self,
        kind: ContractKind,
        network_name: &str,
        network_id: u64,
    ) -> WalletResult<(Address, AddressSource)> {
        let from_manifest = self
            .manifest
            .get(network_name)
            .and_then(|contracts| contracts.get(kind.name()));
        if let Some(raw) = from_manifest {
            return Ok((parse_deployed_address(kind, raw)?, AddressSource::Manifest));
        }

        let from_artifact = self.artifact(kind).and_then(|artifact| artifact.address_for(network_id));
        if let Some(raw) = from_artifact {
            return Ok((parse_deployed_address(kind, raw)?, AddressSource::Artifact));
        }

        Err(WalletError::Initialization(format!(
            "no address for {} on network '{}' (id {})",
            kind, network_name, network_id
        )))
    }
}

fn parse_deployed_address(kind: ContractKind, raw: &str) -> WalletResult<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| WalletError::Initialization(format!("invalid {} address '{}': {}", kind, raw, e)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> WalletResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| WalletError::Initialization(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| WalletError::Initialization(format!("failed to parse {}: {}", path.display(), e)))
}
