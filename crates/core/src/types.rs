//! Core types for the HAPI registry.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::{bytes_to_string, key_to_uuid, to_fixed, uuid_to_key, validate_key};
use crate::constants::{ADDRESS_LEN, ASSET_ID_LEN, MAX_RISK, NETWORK_NAME_LEN};
use crate::error::CoreError;

/// Token amount (stake or reward), in the token's smallest unit.
pub type Amount = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

macro_rules! key_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub B256);

        impl $name {
            /// Create from a 32-byte value.
            pub const fn new(bytes: B256) -> Self {
                $name(bytes)
            }

            /// Get the inner B256.
            pub const fn inner(&self) -> &B256 {
                &self.0
            }

            /// Convert to bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0 .0
            }
        }

        impl From<B256> for $name {
            fn from(b: B256) -> Self {
                $name(b)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                $name(B256::from(bytes))
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                crate::codec::parse_key_hex(s).map(Self::from)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

key_newtype!(
    /// Signing identity of a wallet (network authority, reporter account).
    AccountKey
);

key_newtype!(
    /// Deterministically derived storage location of a record.
    EntityAddress
);

key_newtype!(
    /// Identifier of a bonded token (stake or reward mint).
    TokenId
);

impl EntityAddress {
    /// The account key that owns custody accounts of this entity.
    ///
    /// Networks hold stake and reward custody under their own address.
    pub const fn as_owner(&self) -> AccountKey {
        AccountKey(self.0)
    }
}

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u128);

        impl $name {
            /// Parse from a v4 UUID string.
            pub fn parse(s: &str) -> Result<Self, CoreError> {
                uuid_to_key(s).map($name)
            }

            /// Reject keys that are not v4 UUIDs.
            pub fn validate(&self) -> Result<Self, CoreError> {
                validate_key(self.0).map($name)
            }

            /// Get the raw 128-bit key.
            pub const fn key(&self) -> u128 {
                self.0
            }

            /// Big-endian seed bytes used for address derivation.
            pub const fn seed(&self) -> [u8; 16] {
                self.0.to_be_bytes()
            }
        }

        impl From<u128> for $name {
            fn from(key: u128) -> Self {
                $name(key)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&key_to_uuid(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&key_to_uuid(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

uuid_newtype!(
    /// Reporter UUID.
    ReporterId
);

uuid_newtype!(
    /// Case UUID.
    CaseId
);

/// Network name, stored as a 32-byte zero-padded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkName([u8; NETWORK_NAME_LEN]);

impl NetworkName {
    /// Create a network name, failing with `BufferTooSmall` above 32 bytes.
    pub fn new(name: &str) -> Result<Self, CoreError> {
        if name.is_empty() {
            return Err(CoreError::InvalidData("network name cannot be empty".to_string()));
        }
        Ok(NetworkName(to_fixed(name.as_bytes())?))
    }

    /// Create from the raw padded field.
    pub const fn from_bytes(bytes: [u8; NETWORK_NAME_LEN]) -> Self {
        NetworkName(bytes)
    }

    /// The raw padded field.
    pub fn as_bytes(&self) -> &[u8; NETWORK_NAME_LEN] {
        &self.0
    }
}

impl FromStr for NetworkName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match bytes_to_string(&self.0) {
            Ok(name) => f.write_str(&name),
            Err(_) => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl Serialize for NetworkName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NetworkName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NetworkName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A flagged address on the target network, zero-padded to 64 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressKey([u8; ADDRESS_LEN]);

impl AddressKey {
    /// Create from the textual address (e.g. `0x...` on EVM, base58 on Solana).
    pub fn new(address: &str) -> Result<Self, CoreError> {
        if address.is_empty() {
            return Err(CoreError::InvalidData("address cannot be empty".to_string()));
        }
        Ok(AddressKey(to_fixed(address.as_bytes())?))
    }

    /// Create from the raw padded field.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        AddressKey(bytes)
    }

    /// The raw padded field.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match bytes_to_string(&self.0) {
            Ok(address) => f.write_str(&address),
            Err(_) => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl FromStr for AddressKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Asset id within its contract (e.g. an NFT token id), zero-padded to 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId([u8; ASSET_ID_LEN]);

impl AssetId {
    /// Create from the textual id.
    pub fn new(id: &str) -> Result<Self, CoreError> {
        if id.is_empty() {
            return Err(CoreError::InvalidData("asset id cannot be empty".to_string()));
        }
        Ok(AssetId(to_fixed(id.as_bytes())?))
    }

    /// Create from the raw padded field.
    pub const fn from_bytes(bytes: [u8; ASSET_ID_LEN]) -> Self {
        AssetId(bytes)
    }

    /// The raw padded field.
    pub fn as_bytes(&self) -> &[u8; ASSET_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match bytes_to_string(&self.0) {
            Ok(id) => f.write_str(&id),
            Err(_) => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl FromStr for AssetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

macro_rules! padded_string_serde {
    ($($name:ident),+) => {
        $(
            impl Serialize for $name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(&self.to_string())
                }
            }

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let s = String::deserialize(deserializer)?;
                    $name::new(&s).map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

padded_string_serde!(AddressKey, AssetId);

/// Risk score from 0 (safe) to 10 (maximum risk).
///
/// Validated on construction and on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create a new RiskScore, validating the range.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > MAX_RISK {
            return Err(CoreError::RiskOutOfRange(value));
        }
        Ok(RiskScore(value))
    }

    /// Get the raw value.
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RiskScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RiskScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        RiskScore::new(value).map_err(serde::de::Error::custom)
    }
}

/// Closed wire enumeration with a total, fallible decode.
///
/// Every variant has a fixed numeric code and a lowercase name. Unknown codes
/// or names are rejected with `CoreError::UnknownVariant`, never mapped to a
/// default variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            /// All variants in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Numeric wire code.
            pub const fn as_u8(&self) -> u8 {
                *self as u8
            }

            /// Canonical lowercase name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = CoreError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok($name::$variant),)+
                    _ => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum!(
    /// Reporter role within a network.
    ReporterRole, "reporter role" {
        /// Can confirm records reported by others.
        Validator = 0 => "validator",
        /// Can report addresses and assets, and confirm others' records.
        Tracer = 1 => "tracer",
        /// Can report cases, addresses and assets, and update its own.
        Publisher = 2 => "publisher",
        /// Publisher rights plus updates over any reporter's records.
        Authority = 3 => "authority",
    }
);

wire_enum!(
    /// Reporter activation status.
    ReporterStatus, "reporter status" {
        /// Not staked; can activate after staking.
        Inactive = 0 => "inactive",
        /// Staked and able to report.
        Active = 1 => "active",
        /// Unstaking requested; stake is locked until the unlock time.
        Unstaking = 2 => "unstaking",
    }
);

wire_enum!(
    /// Investigation case status.
    CaseStatus, "case status" {
        /// Investigations over this case are finished.
        Closed = 0 => "closed",
        /// The case is ongoing.
        Open = 1 => "open",
    }
);

wire_enum!(
    /// Address format family of a network.
    NetworkSchema, "network schema" {
        /// Opaque string addresses.
        Plain = 0 => "plain",
        /// Base58 ed25519 public keys.
        Solana = 1 => "solana",
        /// 20-byte hex addresses.
        Ethereum = 2 => "ethereum",
        /// Bitcoin addresses.
        Bitcoin = 3 => "bitcoin",
        /// NEAR account ids.
        Near = 4 => "near",
    }
);

wire_enum!(
    /// Primary category of activity detected on an address or asset.
    Category, "category" {
        /// No category.
        None = 0 => "none",
        /// Custodial or mixed wallet service.
        WalletService = 1 => "wallet_service",
        /// Merchant service.
        MerchantService = 2 => "merchant_service",
        /// Mining pool.
        MiningPool = 3 => "mining_pool",
        /// Exchange.
        Exchange = 4 => "exchange",
        /// DeFi application.
        DeFi = 5 => "defi",
        /// OTC broker.
        OtcBroker = 6 => "otc_broker",
        /// Cryptocurrency ATM.
        Atm = 7 => "atm",
        /// Gambling.
        Gambling = 8 => "gambling",
        /// Illicit organization.
        IllicitOrganization = 9 => "illicit_organization",
        /// Mixer.
        Mixer = 10 => "mixer",
        /// Darknet market or service.
        DarknetService = 11 => "darknet_service",
        /// Scam.
        Scam = 12 => "scam",
        /// Ransomware.
        Ransomware = 13 => "ransomware",
        /// Theft (stolen funds).
        Theft = 14 => "theft",
        /// Counterfeit (fake assets).
        Counterfeit = 15 => "counterfeit",
        /// Terrorist financing.
        TerroristFinancing = 16 => "terrorist_financing",
        /// Sanctions.
        Sanctions = 17 => "sanctions",
        /// Child abuse materials.
        ChildAbuse = 18 => "child_abuse",
        /// Belongs to a hacker or a group of hackers.
        Hacker = 19 => "hacker",
        /// Person or organization from a high risk jurisdiction.
        HighRiskJurisdiction = 20 => "high_risk_jurisdiction",
    }
);

/// Stake requirements of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakeConfiguration {
    /// Seconds between deactivation and the moment stake can be withdrawn.
    pub unlock_duration: u64,
    /// Stake required from a validator.
    pub validator_stake: Amount,
    /// Stake required from a tracer.
    pub tracer_stake: Amount,
    /// Stake required from a publisher.
    pub publisher_stake: Amount,
    /// Stake required from an authority.
    pub authority_stake: Amount,
}

impl StakeConfiguration {
    /// Stake required for the given role.
    pub const fn stake_for(&self, role: ReporterRole) -> Amount {
        match role {
            ReporterRole::Validator => self.validator_stake,
            ReporterRole::Tracer => self.tracer_stake,
            ReporterRole::Publisher => self.publisher_stake,
            ReporterRole::Authority => self.authority_stake,
        }
    }
}

/// Reward amounts paid per qualifying action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardConfiguration {
    /// Reward for reporting an address.
    pub address_tracer_reward: Amount,
    /// Reward for confirming an address.
    pub address_confirmation_reward: Amount,
    /// Reward for reporting an asset.
    pub asset_tracer_reward: Amount,
    /// Reward for confirming an asset.
    pub asset_confirmation_reward: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_score_creation() {
        for i in 0..=10 {
            assert_eq!(RiskScore::new(i).unwrap().value(), i);
        }
        assert_eq!(RiskScore::new(11), Err(CoreError::RiskOutOfRange(11)));
        assert_eq!(RiskScore::new(255), Err(CoreError::RiskOutOfRange(255)));
    }

    #[test]
    fn test_risk_score_deserialization_invalid() {
        for invalid in [11, 100, 255] {
            let result: Result<RiskScore, _> = serde_json::from_str(&invalid.to_string());
            assert!(result.is_err(), "risk {invalid} must be rejected");
        }

        let risk: RiskScore = serde_json::from_str("7").unwrap();
        assert_eq!(risk.value(), 7);
    }

    #[test]
    fn test_role_wire_mapping_is_total() {
        for role in ReporterRole::ALL {
            assert_eq!(ReporterRole::try_from(role.as_u8()).unwrap(), *role);
            assert_eq!(role.as_str().parse::<ReporterRole>().unwrap(), *role);
        }

        // Appraiser (4) and anything beyond are not registry roles
        for code in 4..=u8::MAX {
            assert!(matches!(
                ReporterRole::try_from(code),
                Err(CoreError::UnknownVariant { kind: "reporter role", .. })
            ));
        }
        assert!("appraiser".parse::<ReporterRole>().is_err());
        assert!("Validator".parse::<ReporterRole>().is_err());
    }

    #[test]
    fn test_status_wire_mapping_is_total() {
        for status in ReporterStatus::ALL {
            assert_eq!(ReporterStatus::try_from(status.as_u8()).unwrap(), *status);
        }
        assert!(ReporterStatus::try_from(3).is_err());

        assert_eq!(CaseStatus::try_from(0).unwrap(), CaseStatus::Closed);
        assert_eq!(CaseStatus::try_from(1).unwrap(), CaseStatus::Open);
        assert!(CaseStatus::try_from(2).is_err());
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::ALL.len(), 21);
        for (code, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.as_u8() as usize, code);
        }
        assert_eq!(Category::Mixer.as_u8(), 10);
        assert!(Category::try_from(21).is_err());
        assert_eq!("mixer".parse::<Category>().unwrap(), Category::Mixer);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&ReporterRole::Tracer).unwrap(), "\"tracer\"");
        let role: ReporterRole = serde_json::from_str("\"publisher\"").unwrap();
        assert_eq!(role, ReporterRole::Publisher);

        let result: Result<ReporterRole, _> = serde_json::from_str("\"root\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_stake_for_role() {
        let config = StakeConfiguration {
            unlock_duration: 60,
            validator_stake: 1,
            tracer_stake: 2,
            publisher_stake: 3,
            authority_stake: 4,
        };

        assert_eq!(config.stake_for(ReporterRole::Validator), 1);
        assert_eq!(config.stake_for(ReporterRole::Tracer), 2);
        assert_eq!(config.stake_for(ReporterRole::Publisher), 3);
        assert_eq!(config.stake_for(ReporterRole::Authority), 4);
    }

    #[test]
    fn test_uuid_newtypes() {
        let id: CaseId = "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d".parse().unwrap();
        assert_eq!(id.to_string(), "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d");
        assert_eq!(id.seed(), id.key().to_be_bytes());

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d\"");

        let invalid: Result<ReporterId, _> =
            serde_json::from_str("\"c232ab00-9414-11ec-b3c8-9e6bdeced846\"");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_padded_keys() {
        let name = NetworkName::new("ethereum").unwrap();
        assert_eq!(name.to_string(), "ethereum");
        assert_eq!(&name.as_bytes()[..8], b"ethereum");
        assert!(name.as_bytes()[8..].iter().all(|&b| b == 0));

        assert!(matches!(
            NetworkName::new(&"x".repeat(33)),
            Err(CoreError::BufferTooSmall { len: 33, capacity: 32 })
        ));

        let address = AddressKey::new("0x922ffdfcb57de5dd6f641f275e98b684ce5576a3").unwrap();
        assert_eq!(address.to_string(), "0x922ffdfcb57de5dd6f641f275e98b684ce5576a3");
        assert!(AddressKey::new(&"a".repeat(65)).is_err());

        let asset = AssetId::new("42").unwrap();
        assert_eq!(asset.to_string(), "42");
    }

    #[test]
    fn test_account_key_from_hex() {
        let key: AccountKey = format!("0x{}", "ab".repeat(32)).parse().unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);
    }
}
