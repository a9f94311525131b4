/// Capacitor type passed to `registerSwitchBoard` when none is configured (1 = single capacitor)
pub const DEFAULT_CAPACITOR_TYPE: u32 = 1;
/// Maximum number of messages a capacitor seals into one packet
pub const DEFAULT_MAX_PACKET_LENGTH: u32 = 10;
/// Gas the transmitter is allowed to spend proposing a packet on the destination
pub const DEFAULT_PROPOSE_GAS_LIMIT: u64 = 150_000;
/// Gas an attester is allowed to spend attesting a packet on the destination
pub const DEFAULT_ATTEST_GAS_LIMIT: u64 = 150_000;
/// Fixed execution overhead charged per message on the destination
pub const DEFAULT_EXECUTION_OVERHEAD: u64 = 300_000;
/// Seconds to wait for a submitted transaction to be mined
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
/// Environment variable holding the operator private key
pub const SIGNER_KEY_ENV: &str = "SOCKET_SIGNER_KEY";
/// Environment variable holding the operator keystore password
pub const SIGNER_PASSWORD_ENV: &str = "SOCKET_SIGNER_PASSWORD";
/// Ledger file name suffix: `<mode>_addresses.json`
pub const ADDRESSES_FILE_SUFFIX: &str = "_addresses.json";

/// Contract role names as they appear in the address ledger.
pub mod roles {
    /// Messaging endpoint
    pub const SOCKET: &str = "socket";
    /// Attester registry
    pub const NOTARY: &str = "notary";
    /// Fast-path switchboard (one per chain)
    pub const FAST_SWITCHBOARD: &str = "FastSwitchboard";
    /// Optimistic switchboard (one per chain)
    pub const OPTIMISTIC_SWITCHBOARD: &str = "OptimisticSwitchboard";
    /// Holds the propose gas limits and transmitter nonces
    pub const TRANSMIT_MANAGER: &str = "TransmitManager";
    /// Batching entry point for signed parameter updates
    pub const SOCKET_BATCHER: &str = "SocketBatcher";
}
