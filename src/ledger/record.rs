use crate::chains::ChainSlug;
use crate::switchboard::IntegrationType;
use alloy_primitives::Address;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Ledger key of the integrations map
const INTEGRATIONS_KEY: &str = "integrations";
/// Ledger key of the deployment start block
const START_BLOCK_KEY: &str = "startBlock";

/// Integrations configured towards one sibling chain, by integration type.
pub type SiblingIntegrations = BTreeMap<IntegrationType, IntegrationConfig>;

/// Whole ledger: one record per chain.
pub type DeploymentAddresses = BTreeMap<ChainSlug, ChainRecord>;

/// Switchboard wiring for one (sibling, integration type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    /// Switchboard governing the pair
    pub switchboard: Address,
    /// Capacitor created by the socket at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitor: Option<Address>,
    /// Decapacitor created by the socket at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decapacitor: Option<Address>,
    /// Capacitor type the switchboard was registered with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitor_type: Option<u32>,
    /// Packet length the switchboard was registered with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_packet_length: Option<u32>,
    /// Counterpart switchboard the native pointer was linked to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_switchboard: Option<Address>,
}

impl IntegrationConfig {
    /// An unregistered entry pointing at `switchboard`.
    pub fn new(switchboard: Address) -> Self {
        Self {
            switchboard,
            capacitor: None,
            decapacitor: None,
            capacitor_type: None,
            max_packet_length: None,
            remote_switchboard: None,
        }
    }

    /// Whether this entry already records a registration with exactly these parameters.
    pub fn matches_registration(
        &self,
        switchboard: Address,
        capacitor_type: u32,
        max_packet_length: u32,
    ) -> bool {
        self.switchboard == switchboard
            && self.capacitor_type == Some(capacitor_type)
            && self.max_packet_length == Some(max_packet_length)
    }
}

/// Deployed contracts and switchboard wiring of one chain.
///
/// Serialized as a flat JSON object: every contract role is a top-level key, next
/// to the optional `startBlock` and `integrations` keys. Top-level values that are
/// not addresses are kept verbatim in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRecord {
    /// Contract role name → deployed address
    pub contracts: BTreeMap<String, Address>,
    /// Block the deployment started at
    pub start_block: Option<u64>,
    /// Sibling chain → integration type → wiring. `None` means nothing configured yet.
    pub integrations: Option<BTreeMap<ChainSlug, SiblingIntegrations>>,
    /// Other top-level keys, owned by other tools
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ChainRecord {
    /// Address deployed under a contract role.
    pub fn contract(&self, role: &str) -> Option<Address> {
        self.contracts.get(role).copied()
    }

    /// Record a deployed contract address.
    pub fn with_contract(mut self, role: &str, address: Address) -> Self {
        self.contracts.insert(role.to_string(), address);
        self
    }

    /// Wiring for one (sibling, integration type), if recorded.
    pub fn integration(
        &self,
        sibling: ChainSlug,
        integration: IntegrationType,
    ) -> Option<&IntegrationConfig> {
        self.integrations.as_ref()?.get(&sibling)?.get(&integration)
    }

    /// Mutable wiring for one (sibling, integration type), if recorded.
    pub fn integration_mut(
        &mut self,
        sibling: ChainSlug,
        integration: IntegrationType,
    ) -> Option<&mut IntegrationConfig> {
        self.integrations.as_mut()?.get_mut(&sibling)?.get_mut(&integration)
    }

    /// Insert or overwrite the wiring for one (sibling, integration type).
    pub fn set_integration(
        &mut self,
        sibling: ChainSlug,
        integration: IntegrationType,
        config: IntegrationConfig,
    ) {
        self.integrations
            .get_or_insert_with(BTreeMap::new)
            .entry(sibling)
            .or_default()
            .insert(integration, config);
    }

    /// Siblings for which a native integration has been requested.
    pub fn native_siblings(&self) -> Vec<ChainSlug> {
        self.integrations
            .iter()
            .flatten()
            .filter(|(_, by_type)| by_type.contains_key(&IntegrationType::Native))
            .map(|(sibling, _)| *sibling)
            .collect()
    }
}

impl Serialize for ChainRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.contracts.len()
            + usize::from(self.start_block.is_some())
            + usize::from(self.integrations.is_some())
            + self.extra.len();
        let mut map = serializer.serialize_map(Some(len))?;
        for (role, address) in &self.contracts {
            map.serialize_entry(role, address)?;
        }
        if let Some(start_block) = &self.start_block {
            map.serialize_entry(START_BLOCK_KEY, start_block)?;
        }
        if let Some(integrations) = &self.integrations {
            map.serialize_entry(INTEGRATIONS_KEY, integrations)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChainRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Buffer through `Value` so the integer-keyed integrations map parses from
        // JSON string keys.
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;

        let mut record = ChainRecord::default();
        for (key, value) in raw {
            match key.as_str() {
                INTEGRATIONS_KEY => {
                    if !value.is_null() {
                        record.integrations = Some(
                            serde_json::from_value(value)
                                .map_err(|e| D::Error::custom(format!("integrations: {e}")))?,
                        );
                    }
                }
                START_BLOCK_KEY => {
                    record.start_block = serde_json::from_value(value)
                        .map_err(|e| D::Error::custom(format!("startBlock: {e}")))?;
                }
                // A hex string is a contract role and must hold a valid address.
                _ if value.as_str().is_some_and(|s| s.starts_with("0x")) => {
                    let address = serde_json::from_value(value)
                        .map_err(|e| D::Error::custom(format!("{key}: {e}")))?;
                    record.contracts.insert(key, address);
                }
                _ => {
                    record.extra.insert(key, value);
                }
            }
        }
        Ok(record)
    }
}
