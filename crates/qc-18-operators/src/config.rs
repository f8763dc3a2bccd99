//! Configuration for the Operators subsystem.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::domain::address::Address;
use crate::domain::entities::{validate_identity, Params};
use crate::domain::errors::{OperatorsError, OperatorsResult};

/// Module allowed to update module params by default.
pub const DEFAULT_AUTHORITY_MODULE: &str = "gov";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorsConfig {
    /// Identity allowed to send `MsgUpdateParams`.
    pub authority: String,
    /// Params used until genesis or a params update stores some.
    pub default_params: Params,
    /// Upper bound for `PageRequest::limit`.
    pub max_page_limit: usize,
    /// Limit used when a page request has none.
    pub default_page_limit: usize,
    /// Run invariant checks at the end of every tick.
    pub check_invariants_on_tick: bool,
}

impl Default for OperatorsConfig {
    fn default() -> Self {
        Self {
            authority: Address::module_address(DEFAULT_AUTHORITY_MODULE).to_string(),
            default_params: Params::default(),
            max_page_limit: 1000,
            default_page_limit: 100,
            check_invariants_on_tick: false,
        }
    }
}

impl OperatorsConfig {
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_default_params(mut self, params: Params) -> Self {
        self.default_params = params;
        self
    }

    pub fn with_page_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.default_page_limit = default_limit;
        self.max_page_limit = max_limit;
        self
    }

    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants_on_tick = enabled;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_OPERATORS_AUTHORITY`: params authority (default: `gov` module address)
    /// - `QC_OPERATORS_DEACTIVATION_SECS`: default deactivation time (default: 3 days)
    /// - `QC_OPERATORS_DEFAULT_PAGE_LIMIT`: default page size (default: 100)
    /// - `QC_OPERATORS_MAX_PAGE_LIMIT`: maximum page size (default: 1000)
    /// - `QC_OPERATORS_CHECK_INVARIANTS`: check invariants every tick (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());

        let mut default_params = defaults.default_params;
        if let Some(secs) = parsed("QC_OPERATORS_DEACTIVATION_SECS") {
            default_params.deactivation_time = Duration::from_secs(secs);
        }

        Self {
            authority: lookup("QC_OPERATORS_AUTHORITY").unwrap_or(defaults.authority),
            default_params,
            max_page_limit: parsed("QC_OPERATORS_MAX_PAGE_LIMIT")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_page_limit),
            default_page_limit: parsed("QC_OPERATORS_DEFAULT_PAGE_LIMIT")
                .map(|v| v as usize)
                .unwrap_or(defaults.default_page_limit),
            check_invariants_on_tick: lookup("QC_OPERATORS_CHECK_INVARIANTS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.check_invariants_on_tick),
        }
    }

    pub fn validate(&self) -> OperatorsResult<()> {
        let invalid = |reason: &str| OperatorsError::InvalidConfig {
            reason: reason.to_string(),
        };
        validate_identity("authority", &self.authority)?;
        if self.max_page_limit == 0 || self.default_page_limit == 0 {
            return Err(invalid("page limits must be positive"));
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(invalid("default page limit exceeds maximum"));
        }
        self.default_params.validate()
    }
}
