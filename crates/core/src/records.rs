//! Fixed-layout registry records.
//!
//! Every record starts with an 8-byte discriminator (the first 8 bytes of
//! `sha256("account:<Name>")`) and a `u16` layout version, followed by its
//! fields in declaration order. Integers are little-endian, UUID keys are
//! stored as little-endian `u128`, strings are zero-padded to their field
//! width. Record sizes are a compatibility surface and never change within a
//! layout version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::{bytes_to_string, string_to_bytes};
use crate::constants::{
    ADDRESS_LEN, ASSET_ID_LEN, DISCRIMINATOR_LENGTH, KEY_LEN, NAME_LEN, NETWORK_NAME_LEN,
    RECORD_VERSION, URL_LEN,
};
use crate::error::{CoreError, Result};
use crate::types::{
    AccountKey, AddressKey, Amount, AssetId, CaseId, CaseStatus, Category, EntityAddress,
    NetworkName, NetworkSchema, ReporterId, ReporterRole, ReporterStatus, RewardConfiguration,
    RiskScore, StakeConfiguration, Timestamp, TokenId,
};

/// Record discriminator for a type name.
pub fn discriminator(name: &str) -> [u8; DISCRIMINATOR_LENGTH] {
    let hash = Sha256::digest(format!("account:{name}").as_bytes());
    let mut disc = [0u8; DISCRIMINATOR_LENGTH];
    disc.copy_from_slice(&hash[..DISCRIMINATOR_LENGTH]);
    disc
}

/// A record with a fixed byte layout.
pub trait Record: Sized {
    /// Type name hashed into the discriminator.
    const NAME: &'static str;

    /// Encoded size in bytes, header included.
    const LEN: usize;

    /// Discriminator identifying this record type.
    fn discriminator() -> [u8; DISCRIMINATOR_LENGTH] {
        discriminator(Self::NAME)
    }

    /// Write the fields after the header.
    fn write_fields(&self, w: &mut ByteWriter) -> Result<()>;

    /// Read the fields after the header.
    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self>;

    /// Encode into exactly `LEN` bytes.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_capacity(Self::LEN);
        w.put_bytes(&Self::discriminator());
        w.put_u16(RECORD_VERSION);
        self.write_fields(&mut w)?;

        let bytes = w.finish();
        if bytes.len() != Self::LEN {
            return Err(CoreError::InvalidData(format!(
                "{} encoded to {} bytes, expected {}",
                Self::NAME,
                bytes.len(),
                Self::LEN
            )));
        }
        Ok(bytes)
    }

    /// Decode from exactly `LEN` bytes, checking discriminator and version.
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(CoreError::InvalidData(format!(
                "{} must be {} bytes, got {}",
                Self::NAME,
                Self::LEN,
                bytes.len()
            )));
        }

        let mut r = ByteReader::new(bytes);
        if r.array::<DISCRIMINATOR_LENGTH>()? != Self::discriminator() {
            return Err(CoreError::InvalidData(format!(
                "discriminator mismatch for {}",
                Self::NAME
            )));
        }
        let version = r.u16()?;
        if version != RECORD_VERSION {
            return Err(CoreError::InvalidData(format!(
                "unsupported {} version {version}",
                Self::NAME
            )));
        }

        Self::read_fields(&mut r)
    }
}

/// Little-endian field writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a little-endian u16.
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a little-endian u32.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a little-endian u128.
    pub fn put_u128(&mut self, value: u128) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a string zero-padded to `width`.
    pub fn put_str(&mut self, value: &str, width: usize) -> Result<()> {
        self.buf.extend_from_slice(&string_to_bytes(value, width)?);
        Ok(())
    }

    /// Consume the writer.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Little-endian field reader.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| CoreError::InvalidData("unexpected end of record".to_string()))?;
        self.pos = end;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Read a little-endian u32.
    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Read a little-endian u64.
    pub fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// Read a little-endian u128.
    pub fn u128(&mut self) -> Result<u128> {
        Ok(u128::from_le_bytes(self.array()?))
    }

    /// Read a 0/1 boolean.
    pub fn bool(&mut self) -> Result<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CoreError::InvalidData(format!("invalid bool byte {other}"))),
        }
    }

    /// Read a zero-padded string of `width` bytes.
    pub fn string(&mut self, width: usize) -> Result<String> {
        bytes_to_string(self.take(width)?)
    }

    /// Read a 32-byte key.
    pub fn key(&mut self) -> Result<[u8; KEY_LEN]> {
        self.array()
    }
}

/// Per-network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Key allowed to administer this network.
    pub authority: AccountKey,
    /// Unique network name.
    pub name: NetworkName,
    /// Address format family.
    pub schema: NetworkSchema,
    /// Token bonded as reporter stake.
    pub stake_token: TokenId,
    /// Stake requirements.
    pub stake_configuration: StakeConfiguration,
    /// Token paid out as rewards.
    pub reward_token: TokenId,
    /// Reward amounts.
    pub reward_configuration: RewardConfiguration,
}

impl Record for Network {
    const NAME: &'static str = "Network";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + KEY_LEN + NETWORK_NAME_LEN + 1 + KEY_LEN + 40 + KEY_LEN + 32;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_bytes(self.authority.as_bytes());
        w.put_bytes(self.name.as_bytes());
        w.put_u8(self.schema.as_u8());
        w.put_bytes(self.stake_token.as_bytes());
        let stake = &self.stake_configuration;
        w.put_u64(stake.unlock_duration);
        w.put_u64(stake.validator_stake);
        w.put_u64(stake.tracer_stake);
        w.put_u64(stake.publisher_stake);
        w.put_u64(stake.authority_stake);
        w.put_bytes(self.reward_token.as_bytes());
        let reward = &self.reward_configuration;
        w.put_u64(reward.address_tracer_reward);
        w.put_u64(reward.address_confirmation_reward);
        w.put_u64(reward.asset_tracer_reward);
        w.put_u64(reward.asset_confirmation_reward);
        Ok(())
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Network {
            authority: AccountKey::from(r.key()?),
            name: NetworkName::from_bytes(r.array()?),
            schema: NetworkSchema::try_from(r.u8()?)?,
            stake_token: TokenId::from(r.key()?),
            stake_configuration: StakeConfiguration {
                unlock_duration: r.u64()?,
                validator_stake: r.u64()?,
                tracer_stake: r.u64()?,
                publisher_stake: r.u64()?,
                authority_stake: r.u64()?,
            },
            reward_token: TokenId::from(r.key()?),
            reward_configuration: RewardConfiguration {
                address_tracer_reward: r.u64()?,
                address_confirmation_reward: r.u64()?,
                asset_tracer_reward: r.u64()?,
                asset_confirmation_reward: r.u64()?,
            },
        })
    }
}

/// A whitelisted reporter of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    /// Reporter UUID.
    pub id: ReporterId,
    /// Network entity address.
    pub network: EntityAddress,
    /// Signing identity of the reporter.
    pub account: AccountKey,
    /// Display name.
    pub name: String,
    /// Role within the network.
    pub role: ReporterRole,
    /// Activation status.
    pub status: ReporterStatus,
    /// Currently bonded stake.
    pub stake: Amount,
    /// Time after which stake can be withdrawn (only while unstaking).
    pub unlock_time: Timestamp,
    /// Set by the network authority to block every reporter action.
    pub is_frozen: bool,
    /// Public page of the reporter.
    pub url: String,
}

impl Record for Reporter {
    const NAME: &'static str = "Reporter";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + 16 + KEY_LEN + KEY_LEN + NAME_LEN + 1 + 1 + 8 + 8 + 1 + URL_LEN;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_u128(self.id.key());
        w.put_bytes(self.network.as_bytes());
        w.put_bytes(self.account.as_bytes());
        w.put_str(&self.name, NAME_LEN)?;
        w.put_u8(self.role.as_u8());
        w.put_u8(self.status.as_u8());
        w.put_u64(self.stake);
        w.put_u64(self.unlock_time);
        w.put_u8(u8::from(self.is_frozen));
        w.put_str(&self.url, URL_LEN)
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Reporter {
            id: ReporterId(r.u128()?),
            network: EntityAddress::from(r.key()?),
            account: AccountKey::from(r.key()?),
            name: r.string(NAME_LEN)?,
            role: ReporterRole::try_from(r.u8()?)?,
            status: ReporterStatus::try_from(r.u8()?)?,
            stake: r.u64()?,
            unlock_time: r.u64()?,
            is_frozen: r.bool()?,
            url: r.string(URL_LEN)?,
        })
    }
}

/// An investigation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case UUID.
    pub id: CaseId,
    /// Network entity address.
    pub network: EntityAddress,
    /// Short description.
    pub name: String,
    /// Creating reporter.
    pub reporter_id: ReporterId,
    /// Open or closed.
    pub status: CaseStatus,
    /// Link to case materials.
    pub url: String,
}

impl Record for Case {
    const NAME: &'static str = "Case";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + 16 + KEY_LEN + NAME_LEN + 16 + 1 + URL_LEN;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_u128(self.id.key());
        w.put_bytes(self.network.as_bytes());
        w.put_str(&self.name, NAME_LEN)?;
        w.put_u128(self.reporter_id.key());
        w.put_u8(self.status.as_u8());
        w.put_str(&self.url, URL_LEN)
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Case {
            id: CaseId(r.u128()?),
            network: EntityAddress::from(r.key()?),
            name: r.string(NAME_LEN)?,
            reporter_id: ReporterId(r.u128()?),
            status: CaseStatus::try_from(r.u8()?)?,
            url: r.string(URL_LEN)?,
        })
    }
}

/// A flagged address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Network entity address.
    pub network: EntityAddress,
    /// The flagged address.
    pub address: AddressKey,
    /// Primary category of detected activity.
    pub category: Category,
    /// Risk score.
    pub risk: RiskScore,
    /// Case this address belongs to.
    pub case_id: CaseId,
    /// Creating reporter.
    pub reporter_id: ReporterId,
    /// Number of independent confirmations.
    pub confirmations: u32,
}

impl Record for AddressRecord {
    const NAME: &'static str = "Address";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + KEY_LEN + ADDRESS_LEN + 1 + 1 + 16 + 16 + 4;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_bytes(self.network.as_bytes());
        w.put_bytes(self.address.as_bytes());
        w.put_u8(self.category.as_u8());
        w.put_u8(self.risk.value());
        w.put_u128(self.case_id.key());
        w.put_u128(self.reporter_id.key());
        w.put_u32(self.confirmations);
        Ok(())
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(AddressRecord {
            network: EntityAddress::from(r.key()?),
            address: AddressKey::from_bytes(r.array()?),
            category: Category::try_from(r.u8()?)?,
            risk: RiskScore::new(r.u8()?)?,
            case_id: CaseId(r.u128()?),
            reporter_id: ReporterId(r.u128()?),
            confirmations: r.u32()?,
        })
    }
}

/// A flagged asset (an address plus an id within it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Network entity address.
    pub network: EntityAddress,
    /// Contract address of the asset.
    pub address: AddressKey,
    /// Id within the contract.
    pub asset_id: AssetId,
    /// Primary category of detected activity.
    pub category: Category,
    /// Risk score.
    pub risk: RiskScore,
    /// Case this asset belongs to.
    pub case_id: CaseId,
    /// Creating reporter.
    pub reporter_id: ReporterId,
    /// Number of independent confirmations.
    pub confirmations: u32,
}

impl Record for AssetRecord {
    const NAME: &'static str = "Asset";
    const LEN: usize =
        DISCRIMINATOR_LENGTH + 2 + KEY_LEN + ADDRESS_LEN + ASSET_ID_LEN + 1 + 1 + 16 + 16 + 4;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_bytes(self.network.as_bytes());
        w.put_bytes(self.address.as_bytes());
        w.put_bytes(self.asset_id.as_bytes());
        w.put_u8(self.category.as_u8());
        w.put_u8(self.risk.value());
        w.put_u128(self.case_id.key());
        w.put_u128(self.reporter_id.key());
        w.put_u32(self.confirmations);
        Ok(())
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(AssetRecord {
            network: EntityAddress::from(r.key()?),
            address: AddressKey::from_bytes(r.array()?),
            asset_id: AssetId::from_bytes(r.array()?),
            category: Category::try_from(r.u8()?)?,
            risk: RiskScore::new(r.u8()?)?,
            case_id: CaseId(r.u128()?),
            reporter_id: ReporterId(r.u128()?),
            confirmations: r.u32()?,
        })
    }
}

/// Proof that a reporter confirmed an address or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Network entity address.
    pub network: EntityAddress,
    /// Entity address of the confirmed record.
    pub account: EntityAddress,
    /// Confirming reporter.
    pub reporter_id: ReporterId,
}

impl Record for Confirmation {
    const NAME: &'static str = "Confirmation";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + KEY_LEN + KEY_LEN + 16;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_bytes(self.network.as_bytes());
        w.put_bytes(self.account.as_bytes());
        w.put_u128(self.reporter_id.key());
        Ok(())
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Confirmation {
            network: EntityAddress::from(r.key()?),
            account: EntityAddress::from(r.key()?),
            reporter_id: ReporterId(r.u128()?),
        })
    }
}

/// Pending reward counters of a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReporterReward {
    /// Network entity address.
    pub network: EntityAddress,
    /// Rewarded reporter.
    pub reporter_id: ReporterId,
    /// Addresses reported and not yet claimed.
    pub address_tracer_counter: u64,
    /// Address confirmations not yet claimed.
    pub address_confirmation_counter: u64,
    /// Assets reported and not yet claimed.
    pub asset_tracer_counter: u64,
    /// Asset confirmations not yet claimed.
    pub asset_confirmation_counter: u64,
}

impl ReporterReward {
    /// Empty counters for a reporter.
    pub fn new(network: EntityAddress, reporter_id: ReporterId) -> Self {
        ReporterReward {
            network,
            reporter_id,
            ..Default::default()
        }
    }

    /// Payout owed under `config`, or `None` on overflow.
    pub fn payout(&self, config: &RewardConfiguration) -> Option<Amount> {
        let parts = [
            self.address_tracer_counter.checked_mul(config.address_tracer_reward)?,
            self.address_confirmation_counter
                .checked_mul(config.address_confirmation_reward)?,
            self.asset_tracer_counter.checked_mul(config.asset_tracer_reward)?,
            self.asset_confirmation_counter
                .checked_mul(config.asset_confirmation_reward)?,
        ];
        parts.iter().try_fold(0u64, |acc, part| acc.checked_add(*part))
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.address_tracer_counter = 0;
        self.address_confirmation_counter = 0;
        self.asset_tracer_counter = 0;
        self.asset_confirmation_counter = 0;
    }
}

impl Record for ReporterReward {
    const NAME: &'static str = "ReporterReward";
    const LEN: usize = DISCRIMINATOR_LENGTH + 2 + KEY_LEN + 16 + 4 * 8;

    fn write_fields(&self, w: &mut ByteWriter) -> Result<()> {
        w.put_bytes(self.network.as_bytes());
        w.put_u128(self.reporter_id.key());
        w.put_u64(self.address_tracer_counter);
        w.put_u64(self.address_confirmation_counter);
        w.put_u64(self.asset_tracer_counter);
        w.put_u64(self.asset_confirmation_counter);
        Ok(())
    }

    fn read_fields(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(ReporterReward {
            network: EntityAddress::from(r.key()?),
            reporter_id: ReporterId(r.u128()?),
            address_tracer_counter: r.u64()?,
            address_confirmation_counter: r.u64()?,
            asset_tracer_counter: r.u64()?,
            asset_confirmation_counter: r.u64()?,
        })
    }
}
