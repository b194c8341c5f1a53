//! Entity addressing for the HAPI registry.
//!
//! Every record lives at an address derived from a namespace tag and its
//! parent keys: `keccak256(tag || 0x00 || parent_1 || ... || parent_n)`.
//! Identical inputs always yield the same address, which makes a second
//! create of the same entity resolve to an already occupied slot.

use crate::constants::{
    SEED_ADDRESS, SEED_ASSET, SEED_CASE, SEED_CONFIRMATION, SEED_NETWORK, SEED_REPORTER,
    SEED_REPORTER_REWARD, SEED_SEPARATOR,
};
use crate::types::{AddressKey, AssetId, CaseId, EntityAddress, NetworkName, ReporterId};
use alloy_primitives::{keccak256 as alloy_keccak256, B256};

/// Compute keccak256 hash of input data.
///
/// This is a re-export of Alloy's keccak256 for convenience.
pub fn keccak256(data: &[u8]) -> B256 {
    alloy_keccak256(data)
}

/// Derive the storage address for a namespace tag and ordered parent keys.
///
/// # Example
///
/// ```
/// use hapi_core::hashing::derive_address;
///
/// let a = derive_address(b"network", &[b"ethereum"]);
/// let b = derive_address(b"network", &[b"ethereum"]);
/// assert_eq!(a, b);
/// ```
pub fn derive_address(tag: &[u8], parents: &[&[u8]]) -> EntityAddress {
    let len = tag.len() + 1 + parents.iter().map(|p| p.len()).sum::<usize>();
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(tag);
    data.push(SEED_SEPARATOR);
    for parent in parents {
        data.extend_from_slice(parent);
    }

    EntityAddress::from(keccak256(&data))
}

/// Address of a network record.
pub fn network_address(name: &NetworkName) -> EntityAddress {
    derive_address(SEED_NETWORK, &[name.as_bytes()])
}

/// Address of a reporter record within a network.
pub fn reporter_address(network: &EntityAddress, id: ReporterId) -> EntityAddress {
    derive_address(SEED_REPORTER, &[network.as_bytes(), &id.seed()])
}

/// Address of a case record within a network.
pub fn case_address(network: &EntityAddress, id: CaseId) -> EntityAddress {
    derive_address(SEED_CASE, &[network.as_bytes(), &id.seed()])
}

/// Address of a flagged address record within a network.
pub fn address_address(network: &EntityAddress, address: &AddressKey) -> EntityAddress {
    derive_address(SEED_ADDRESS, &[network.as_bytes(), address.as_bytes()])
}

/// Address of a flagged asset record within a network.
pub fn asset_address(
    network: &EntityAddress,
    address: &AddressKey,
    asset_id: &AssetId,
) -> EntityAddress {
    derive_address(
        SEED_ASSET,
        &[network.as_bytes(), address.as_bytes(), asset_id.as_bytes()],
    )
}

/// Address of the confirmation of `entity` by a reporter.
pub fn confirmation_address(entity: &EntityAddress, reporter: ReporterId) -> EntityAddress {
    derive_address(SEED_CONFIRMATION, &[entity.as_bytes(), &reporter.seed()])
}

/// Address of a reporter's reward counters within a network.
pub fn reporter_reward_address(network: &EntityAddress, reporter: ReporterId) -> EntityAddress {
    derive_address(SEED_REPORTER_REWARD, &[network.as_bytes(), &reporter.seed()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    fn network() -> EntityAddress {
        network_address(&NetworkName::new("ethereum").unwrap())
    }

    #[test]
    fn test_keccak256() {
        // Keccak256, not SHA3-256
        let expected = B256::from(hex!(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        ));
        assert_eq!(keccak256(b""), expected);

        let expected = B256::from(hex!(
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        ));
        assert_eq!(keccak256(b"abc"), expected);
    }

    #[test]
    fn test_derive_address_preimage() {
        let name = NetworkName::new("ethereum").unwrap();

        let mut preimage = b"network".to_vec();
        preimage.push(0x00);
        preimage.extend_from_slice(name.as_bytes());
        assert_eq!(preimage.len(), 7 + 1 + 32);

        assert_eq!(network_address(&name).0, keccak256(&preimage));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let id = ReporterId::parse("9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d").unwrap();
        assert_eq!(reporter_address(&network(), id), reporter_address(&network(), id));
    }

    #[test]
    fn test_tag_separates_namespaces() {
        // Same parents, different tags
        let key = 0x1234_u128;
        let reporter = reporter_address(&network(), ReporterId(key));
        let case = case_address(&network(), CaseId(key));
        let reward = reporter_reward_address(&network(), ReporterId(key));

        assert_ne!(reporter, case);
        assert_ne!(reporter, reward);
        assert_ne!(case, reward);
    }

    #[test]
    fn test_parents_scope_addresses() {
        let other = network_address(&NetworkName::new("solana").unwrap());
        let address = AddressKey::new("0x922ffdfcb57de5dd6f641f275e98b684ce5576a3").unwrap();

        assert_ne!(address_address(&network(), &address), address_address(&other, &address));

        let first = asset_address(&network(), &address, &AssetId::new("1").unwrap());
        let second = asset_address(&network(), &address, &AssetId::new("2").unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn test_confirmation_is_per_reporter() {
        let address = AddressKey::new("0x922ffdfcb57de5dd6f641f275e98b684ce5576a3").unwrap();
        let entity = address_address(&network(), &address);

        let a = confirmation_address(&entity, ReporterId(1));
        let b = confirmation_address(&entity, ReporterId(2));
        assert_ne!(a, b);
        assert_eq!(a, confirmation_address(&entity, ReporterId(1)));
    }

    #[test]
    fn test_seed_uses_big_endian_key() {
        let id = ReporterId(1);
        let mut preimage = b"reporter".to_vec();
        preimage.push(0x00);
        preimage.extend_from_slice(network().as_bytes());
        preimage.extend_from_slice(&[0u8; 15]);
        preimage.push(1);

        assert_eq!(reporter_address(&network(), id).0, keccak256(&preimage));
    }
}
