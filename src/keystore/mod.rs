//! Operator key from an encrypted keystore
//!
//! Reads Ethereum Keystore V3 files (the format geth, foundry's `cast wallet` and
//! hardhat export) so the operator key does not have to sit in plain text in the
//! environment. Only the PBKDF2-HMAC-SHA256 / AES-128-CTR flavour is supported.
//!
//! # Format
//!
//! ```json
//! {
//!   "version": 3,
//!   "id": "uuid-v4",
//!   "address": "hex-address-without-0x",
//!   "crypto": {
//!     "cipher": "aes-128-ctr",
//!     "ciphertext": "hex-encrypted-key",
//!     "cipherparams": { "iv": "hex-initialization-vector" },
//!     "kdf": "pbkdf2",
//!     "kdfparams": { "dklen": 32, "c": 262144, "prf": "hmac-sha256", "salt": "hex-salt" },
//!     "mac": "hex-keccak256-mac"
//!   }
//! }
//! ```

use aes::cipher::{KeyIvInit, StreamCipher};
use alloy_primitives::{keccak256, Address, B256};
use alloy_signer_local::PrivateKeySigner;
use eyre::{bail, ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// AES-128-CTR cipher type alias
type Aes128Ctr = ctr::Ctr64BE<aes::Aes128>;

/// Ethereum Keystore V3 file
#[derive(Debug, Clone, Deserialize)]
pub struct KeystoreFile {
    /// Keystore version (always 3)
    pub version: u32,
    /// Account address (hex, without 0x prefix); some tools omit it
    #[serde(default)]
    pub address: Option<String>,
    /// Encrypted key data
    pub crypto: CryptoJson,
}

/// Encrypted key data following the V3 crypto JSON format
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoJson {
    pub cipher: String,
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
    /// keccak256(derived_key[16..32] || ciphertext)
    pub mac: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CipherParams {
    /// Hex-encoded 16-byte initialization vector
    pub iv: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KdfParams {
    pub dklen: u32,
    /// Iteration count
    pub c: u32,
    pub prf: String,
    /// Hex-encoded salt
    pub salt: String,
}

/// Decrypt the operator key stored at `path`.
///
/// When the file records an address, the decrypted key must match it.
pub fn load_signer(path: impl AsRef<Path>, password: &str) -> Result<PrivateKeySigner> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read keystore {}", path.display()))?;
    let keystore: KeystoreFile = serde_json::from_str(&data)
        .wrap_err_with(|| format!("Failed to parse keystore {}", path.display()))?;

    let signer = PrivateKeySigner::from_bytes(&decrypt_key(&keystore, password)?)
        .map_err(|_| eyre::eyre!("Keystore {} holds an invalid private key", path.display()))?;

    if let Some(recorded) = keystore.address.as_deref() {
        let recorded = parse_address(recorded)?;
        if recorded != signer.address() {
            bail!(
                "Keystore {} records address {} but holds the key for {}",
                path.display(),
                recorded,
                signer.address()
            );
        }
    }
    Ok(signer)
}

/// Decrypt a keystore into the raw 32-byte private key.
pub fn decrypt_key(keystore: &KeystoreFile, password: &str) -> Result<B256> {
    ensure!(
        keystore.version == 3,
        "Unsupported keystore version: {}",
        keystore.version
    );
    let crypto = &keystore.crypto;
    let derived_key = derive_key(&crypto.kdf, &crypto.kdfparams, password)?;

    let ciphertext = hex::decode(&crypto.ciphertext).wrap_err("Invalid ciphertext hex")?;
    ensure!(
        ciphertext.len() == 32,
        "Ciphertext must be 32 bytes, got {}",
        ciphertext.len()
    );
    verify_mac(&derived_key, &ciphertext, &crypto.mac)?;

    let mut key = B256::from_slice(&ciphertext);
    apply_cipher(&crypto.cipher, &crypto.cipherparams, &derived_key, key.as_mut_slice())?;
    Ok(key)
}

/// Stretch `password` with the keystore's KDF. Only PBKDF2-HMAC-SHA256 is accepted.
fn derive_key(kdf: &str, params: &KdfParams, password: &str) -> Result<Vec<u8>> {
    match (kdf, params.prf.as_str()) {
        ("pbkdf2", "hmac-sha256") => {}
        ("pbkdf2", prf) => bail!("Unsupported PRF: {prf}"),
        (kdf, _) => bail!("Unsupported KDF: {kdf} (only pbkdf2 is supported)"),
    }
    ensure!(
        params.dklen >= 32,
        "Derived key length must be at least 32, got {}",
        params.dklen
    );
    let salt = hex::decode(&params.salt).wrap_err("Invalid salt hex")?;

    let mut derived_key = vec![0u8; params.dklen as usize];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password.as_bytes(), &salt, params.c, &mut derived_key);
    Ok(derived_key)
}

/// The MAC is keccak256 over the second half of the derived key and the ciphertext.
fn verify_mac(derived_key: &[u8], ciphertext: &[u8], mac_hex: &str) -> Result<()> {
    let expected = hex::decode(mac_hex).wrap_err("Invalid MAC hex")?;
    let computed = keccak256([&derived_key[16..32], ciphertext].concat());
    ensure!(
        computed.as_slice() == expected.as_slice(),
        "MAC verification failed: wrong password or corrupted keystore"
    );
    Ok(())
}

/// Decrypt `data` in place with the first half of the derived key.
fn apply_cipher(
    cipher: &str,
    params: &CipherParams,
    derived_key: &[u8],
    data: &mut [u8],
) -> Result<()> {
    ensure!(cipher == "aes-128-ctr", "Unsupported cipher: {cipher}");
    let iv = hex::decode(&params.iv).wrap_err("Invalid IV hex")?;
    ensure!(iv.len() == 16, "IV must be 16 bytes, got {}", iv.len());

    Aes128Ctr::new(derived_key[..16].into(), iv.as_slice().into()).apply_keystream(data);
    Ok(())
}

/// Parse an address string (with or without 0x prefix).
fn parse_address(addr_str: &str) -> Result<Address> {
    let trimmed = addr_str.trim_start_matches("0x").trim_start_matches("0X");
    format!("0x{trimmed}")
        .parse::<Address>()
        .map_err(|e| eyre::eyre!("Invalid address '{}': {}", addr_str, e))
}
