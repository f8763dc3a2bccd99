//! # Domain Entities
//!
//! Operators, their per-operator parameters, module parameters and
//! inactivating-queue entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::address::Address;
use super::coins::{Coins, DecCoins};
use super::decimal::Dec;
use super::errors::{OperatorsError, OperatorsResult};

/// Sequential operator identifier. Zero is never assigned.
pub type OperatorId = u32;

/// Block time in nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Sentinel meaning "leave this field unchanged" in update requests.
pub const DO_NOT_MODIFY: &str = "[do-not-modify]";

/// Default period an operator spends inactivating: 3 days.
pub const DEFAULT_DEACTIVATION_TIME: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// `time + duration`, or `None` past `u64::MAX` nanoseconds.
pub fn timestamp_after(time: Timestamp, duration: Duration) -> Option<Timestamp> {
    let nanos = u64::try_from(duration.as_nanos()).ok()?;
    time.checked_add(nanos)
}

/// Execution context supplied by the scheduler for every command and tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockContext {
    pub height: u64,
    pub time: Timestamp,
}

impl BlockContext {
    pub fn new(height: u64, time: Timestamp) -> Self {
        Self { height, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OperatorStatus {
    #[default]
    Unspecified = 0,
    Active = 1,
    Inactivating = 2,
    Inactive = 3,
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatorStatus::Unspecified => "unspecified",
            OperatorStatus::Active => "active",
            OperatorStatus::Inactivating => "inactivating",
            OperatorStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

/// A registered infrastructure provider and its delegation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub status: OperatorStatus,
    pub admin: String,
    pub address: String,
    pub moniker: String,
    pub website: String,
    pub picture_url: String,
    pub tokens: Coins,
    pub delegator_shares: DecCoins,
}

impl Operator {
    /// New operator with an empty pool and its derived custodial address.
    pub fn new(
        id: OperatorId,
        status: OperatorStatus,
        moniker: impl Into<String>,
        website: impl Into<String>,
        picture_url: impl Into<String>,
        admin: impl Into<String>,
    ) -> Self {
        Self {
            id,
            status,
            admin: admin.into(),
            address: Address::for_operator(id).to_string(),
            moniker: moniker.into(),
            website: website.into(),
            picture_url: picture_url.into(),
            tokens: Coins::empty(),
            delegator_shares: DecCoins::empty(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OperatorStatus::Active
    }

    pub fn validate(&self) -> OperatorsResult<()> {
        if self.id == 0 {
            return Err(OperatorsError::InvalidOperatorId { id: self.id });
        }
        if self.status == OperatorStatus::Unspecified {
            return Err(OperatorsError::UnspecifiedStatus { id: self.id });
        }
        if self.moniker.trim().is_empty() {
            return Err(OperatorsError::BlankMoniker);
        }
        validate_identity("admin", &self.admin)?;
        validate_identity("operator", &self.address)?;
        self.tokens
            .validate()
            .map_err(|reason| OperatorsError::InvalidCoins { reason })?;
        self.delegator_shares
            .validate()
            .map_err(|reason| OperatorsError::InvalidCoins { reason })?;
        Ok(())
    }

    /// Apply an update, skipping fields set to [`DO_NOT_MODIFY`].
    pub fn update(&self, update: &OperatorUpdate) -> Operator {
        let pick = |new: &str, old: &str| {
            if new == DO_NOT_MODIFY {
                old.to_string()
            } else {
                new.to_string()
            }
        };
        Operator {
            moniker: pick(&update.moniker, &self.moniker),
            website: pick(&update.website, &self.website),
            picture_url: pick(&update.picture_url, &self.picture_url),
            ..self.clone()
        }
    }
}

/// Parse an identity string, tagging failures with the field name.
pub fn validate_identity(field: &'static str, value: &str) -> OperatorsResult<Address> {
    value
        .parse::<Address>()
        .map_err(|_| OperatorsError::InvalidIdentity {
            field,
            value: value.to_string(),
        })
}

/// Metadata update. Each field may be [`DO_NOT_MODIFY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorUpdate {
    pub moniker: String,
    pub website: String,
    pub picture_url: String,
}

impl OperatorUpdate {
    pub fn new(
        moniker: impl Into<String>,
        website: impl Into<String>,
        picture_url: impl Into<String>,
    ) -> Self {
        Self {
            moniker: moniker.into(),
            website: website.into(),
            picture_url: picture_url.into(),
        }
    }
}

impl Default for OperatorUpdate {
    fn default() -> Self {
        Self::new(DO_NOT_MODIFY, DO_NOT_MODIFY, DO_NOT_MODIFY)
    }
}

/// Per-operator parameters. Absent record means the default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperatorParams {
    pub commission_rate: Dec,
}

impl OperatorParams {
    pub fn new(commission_rate: Dec) -> Self {
        Self { commission_rate }
    }

    pub fn validate(&self) -> OperatorsResult<()> {
        if self.commission_rate > Dec::one() {
            return Err(OperatorsError::InvalidCommissionRate {
                rate: self.commission_rate,
            });
        }
        Ok(())
    }
}

/// Genesis record binding params to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorParamsRecord {
    pub operator_id: OperatorId,
    pub params: OperatorParams,
}

/// Module-level parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub registration_fee: Coins,
    pub deactivation_time: Duration,
}

impl Params {
    pub fn new(registration_fee: Coins, deactivation_time: Duration) -> Self {
        Self {
            registration_fee,
            deactivation_time,
        }
    }

    pub fn validate(&self) -> OperatorsResult<()> {
        if self.deactivation_time.is_zero() {
            return Err(OperatorsError::InvalidDeactivationTime);
        }
        self.registration_fee
            .validate()
            .map_err(|reason| OperatorsError::InvalidCoins { reason })
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new(Coins::empty(), DEFAULT_DEACTIVATION_TIME)
    }
}

/// Entry of the inactivating queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnbondingOperator {
    // Field order gives (time, id) ordering.
    pub completion_time: Timestamp,
    pub operator_id: OperatorId,
}

impl UnbondingOperator {
    pub fn new(operator_id: OperatorId, completion_time: Timestamp) -> Self {
        Self {
            completion_time,
            operator_id,
        }
    }
}
