//! Per-schema address validation.

use hapi_core::NetworkSchema;

use crate::error::{ClientError, Result};

/// Checks that a string is a well-formed address of one network family.
pub trait AddressFormat: Send + Sync {
    /// Schema this format belongs to.
    fn schema(&self) -> NetworkSchema;

    /// Whether `address` is well formed.
    fn is_valid(&self, address: &str) -> bool;

    /// Reject malformed addresses with [`ClientError::InvalidAddress`].
    fn validate(&self, address: &str) -> Result<()> {
        if self.is_valid(address) {
            Ok(())
        } else {
            Err(ClientError::InvalidAddress {
                schema: self.schema().to_string(),
                address: address.to_string(),
            })
        }
    }
}

/// Any non-empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormat;

impl AddressFormat for PlainFormat {
    fn schema(&self) -> NetworkSchema {
        NetworkSchema::Plain
    }

    fn is_valid(&self, address: &str) -> bool {
        !address.is_empty()
    }
}

/// `0x`-prefixed 20-byte hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthereumFormat;

impl AddressFormat for EthereumFormat {
    fn schema(&self) -> NetworkSchema {
        NetworkSchema::Ethereum
    }

    fn is_valid(&self, address: &str) -> bool {
        match address.strip_prefix("0x") {
            Some(body) => body.len() == 40 && hex::decode(body).is_ok(),
            None => false,
        }
    }
}

/// Base58 encoded 32-byte public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaFormat;

impl AddressFormat for SolanaFormat {
    fn schema(&self) -> NetworkSchema {
        NetworkSchema::Solana
    }

    fn is_valid(&self, address: &str) -> bool {
        matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32)
    }
}

/// Mainnet legacy base58check (P2PKH, P2SH) or segwit addresses; segwit
/// may also be testnet (`tb1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinFormat;

impl AddressFormat for BitcoinFormat {
    fn schema(&self) -> NetworkSchema {
        NetworkSchema::Bitcoin
    }

    fn is_valid(&self, address: &str) -> bool {
        if let Ok((hrp, _, _)) = bech32::segwit::decode(address) {
            return hrp == bech32::hrp::BC || hrp == bech32::hrp::TB;
        }

        // version byte and 20-byte hash, checksum stripped
        match bs58::decode(address).with_check(None).into_vec() {
            Ok(payload) => payload.len() == 21 && matches!(payload[0], 0x00 | 0x05),
            Err(_) => false,
        }
    }
}

/// NEAR account id: 2 to 64 characters of `[a-z0-9._-]`, separators
/// neither leading, trailing nor doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearFormat;

impl AddressFormat for NearFormat {
    fn schema(&self) -> NetworkSchema {
        NetworkSchema::Near
    }

    fn is_valid(&self, address: &str) -> bool {
        if !(2..=64).contains(&address.len()) {
            return false;
        }

        let mut previous_separator = true;
        for c in address.chars() {
            match c {
                'a'..='z' | '0'..='9' => previous_separator = false,
                '.' | '_' | '-' => {
                    if previous_separator {
                        return false;
                    }
                    previous_separator = true;
                }
                _ => return false,
            }
        }
        !previous_separator
    }
}

/// Address format of a network schema.
pub fn address_format(schema: NetworkSchema) -> Box<dyn AddressFormat> {
    match schema {
        NetworkSchema::Plain => Box::new(PlainFormat),
        NetworkSchema::Solana => Box::new(SolanaFormat),
        NetworkSchema::Ethereum => Box::new(EthereumFormat),
        NetworkSchema::Bitcoin => Box::new(BitcoinFormat),
        NetworkSchema::Near => Box::new(NearFormat),
    }
}
