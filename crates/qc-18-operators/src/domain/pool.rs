//! # Delegation Pool Accounting
//!
//! Token/share conversion for an operator's pool, per denomination:
//!
//! ```text
//! rate   = tokens / delegator_shares        (1 when no shares exist)
//! shares = delegator_shares * amount / tokens
//! tokens = tokens * shares / delegator_shares
//! ```
//!
//! Every conversion multiplies before dividing through a 512-bit
//! intermediate. Shares of token `denom` are tracked under
//! `operator/{id}/{denom}`.
//!
//! All functions are pure: they return an updated `Operator` and the caller
//! persists it.

use primitive_types::U256;

use super::coins::{Coins, DecCoins};
use super::decimal::{mul_div_floor, mul_div_round, Dec};
use super::entities::Operator;
use super::errors::{OperatorsError, OperatorsResult};

const SHARES_DENOM_PREFIX: &str = "operator";

impl Operator {
    /// Shares denomination for deposits of `token_denom`.
    pub fn shares_denom(&self, token_denom: &str) -> String {
        format!("{}/{}/{}", SHARES_DENOM_PREFIX, self.id, token_denom)
    }

    /// Token denomination backing a shares denomination of this operator.
    pub fn token_denom<'a>(&self, shares_denom: &'a str) -> OperatorsResult<&'a str> {
        let prefix = format!("{}/{}/", SHARES_DENOM_PREFIX, self.id);
        shares_denom
            .strip_prefix(prefix.as_str())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| OperatorsError::InvalidCoins {
                reason: format!(
                    "{} is not a shares denom of operator {}",
                    shares_denom, self.id
                ),
            })
    }

    /// True if some denomination has outstanding shares but no tokens left.
    pub fn is_invalid_exchange_rate(&self) -> bool {
        self.delegator_shares.iter().any(|(shares_denom, shares)| {
            shares.is_positive()
                && self
                    .token_denom(shares_denom)
                    .map(|denom| self.tokens.amount_of(denom).is_zero())
                    .unwrap_or(false)
        })
    }

    /// Shares a deposit of `amount` would buy at the current rate, truncated.
    ///
    /// Fails with `InsufficientPool` when a deposited denomination has no
    /// tokens backing it.
    pub fn shares_from_tokens(&self, amount: &Coins) -> OperatorsResult<DecCoins> {
        let mut issued = DecCoins::empty();
        for (denom, deposit) in amount.iter() {
            let shares = self.shares_for_denom(denom, *deposit)?;
            issued = issued
                .checked_add(&DecCoins::single(self.shares_denom(denom), shares))
                .ok_or(OperatorsError::Overflow {
                    context: "shares_from_tokens",
                })?;
        }
        Ok(issued)
    }

    fn shares_for_denom(&self, denom: &str, deposit: U256) -> OperatorsResult<Dec> {
        let tokens = self.tokens.amount_of(denom);
        if tokens.is_zero() {
            return Err(OperatorsError::InsufficientPool {
                id: self.id,
                denom: denom.to_string(),
            });
        }
        let total_shares = self.delegator_shares.amount_of(&self.shares_denom(denom));
        total_shares
            .mul_div_floor(deposit, tokens)
            .ok_or(OperatorsError::Overflow {
                context: "shares_from_tokens",
            })
    }

    /// Add a delegation to the pool and return the issued shares.
    ///
    /// A denomination without outstanding shares is priced 1:1. A
    /// denomination with shares but no tokens is rejected with
    /// `InvalidExchangeRate`.
    pub fn add_tokens_from_delegation(&self, amount: &Coins) -> OperatorsResult<(Operator, DecCoins)> {
        let mut issued = DecCoins::empty();
        for (denom, deposit) in amount.iter() {
            let shares_denom = self.shares_denom(denom);
            let total_shares = self.delegator_shares.amount_of(&shares_denom);
            let shares = if total_shares.is_zero() {
                Dec::from_int(*deposit).ok_or(OperatorsError::Overflow {
                    context: "add_tokens_from_delegation",
                })?
            } else if self.tokens.amount_of(denom).is_zero() {
                return Err(OperatorsError::InvalidExchangeRate {
                    id: self.id,
                    denom: denom.clone(),
                });
            } else {
                self.shares_for_denom(denom, *deposit)?
            };
            issued = issued
                .checked_add(&DecCoins::single(shares_denom, shares))
                .ok_or(OperatorsError::Overflow {
                    context: "add_tokens_from_delegation",
                })?;
        }

        let overflow = || OperatorsError::Overflow {
            context: "add_tokens_from_delegation",
        };
        let mut updated = self.clone();
        updated.tokens = self.tokens.checked_add(amount).ok_or_else(overflow)?;
        updated.delegator_shares = self
            .delegator_shares
            .checked_add(&issued)
            .ok_or_else(overflow)?;
        Ok((updated, issued))
    }

    /// Token value of `shares`, rounded to the nearest unit.
    pub fn tokens_from_shares(&self, shares: &DecCoins) -> OperatorsResult<Coins> {
        self.convert_shares(shares, mul_div_round)
    }

    /// Token value of `shares`, truncated. Used to price withdrawals.
    pub fn tokens_from_shares_truncated(&self, shares: &DecCoins) -> OperatorsResult<Coins> {
        self.convert_shares(shares, mul_div_floor)
    }

    fn convert_shares(
        &self,
        shares: &DecCoins,
        mul_div: fn(U256, U256, U256) -> Option<U256>,
    ) -> OperatorsResult<Coins> {
        let mut out = Coins::empty();
        for (shares_denom, amount) in shares.iter() {
            let denom = self.token_denom(shares_denom)?;
            let total_shares = self.delegator_shares.amount_of(shares_denom);
            if total_shares.is_zero() {
                return Err(OperatorsError::InsufficientShares {
                    id: self.id,
                    denom: shares_denom.clone(),
                });
            }
            let tokens = mul_div(
                self.tokens.amount_of(denom),
                amount.raw(),
                total_shares.raw(),
            )
            .ok_or(OperatorsError::Overflow {
                context: "tokens_from_shares",
            })?;
            out = out
                .checked_add(&Coins::single(denom, tokens))
                .ok_or(OperatorsError::Overflow {
                    context: "tokens_from_shares",
                })?;
        }
        Ok(out)
    }

    /// Burn `shares` and release the tokens they are worth.
    ///
    /// Burning the last shares of a denomination releases all of its tokens;
    /// otherwise the payout is truncated and the remainder stays in the pool.
    pub fn remove_del_shares(&self, shares: &DecCoins) -> OperatorsResult<(Operator, Coins)> {
        let mut updated = self.clone();
        let mut released = Coins::empty();

        for (shares_denom, amount) in shares.iter() {
            let denom = self.token_denom(shares_denom)?;
            let total_shares = self.delegator_shares.amount_of(shares_denom);
            let remaining = total_shares.checked_sub(*amount).ok_or_else(|| {
                OperatorsError::InsufficientShares {
                    id: self.id,
                    denom: shares_denom.clone(),
                }
            })?;

            let pool_tokens = self.tokens.amount_of(denom);
            let payout = if remaining.is_zero() {
                pool_tokens
            } else {
                mul_div_floor(pool_tokens, amount.raw(), total_shares.raw()).ok_or(
                    OperatorsError::Overflow {
                        context: "remove_del_shares",
                    },
                )?
            };
            released = released
                .checked_add(&Coins::single(denom, payout))
                .ok_or(OperatorsError::Overflow {
                    context: "remove_del_shares",
                })?;
        }

        updated.delegator_shares = self
            .delegator_shares
            .checked_sub(shares)
            .ok_or_else(|| OperatorsError::InsufficientShares {
                id: self.id,
                denom: "shares".to_string(),
            })?;
        updated.tokens = self
            .tokens
            .checked_sub(&released)
            .ok_or(OperatorsError::Overflow {
                context: "remove_del_shares",
            })?;
        Ok((updated, released))
    }
}
