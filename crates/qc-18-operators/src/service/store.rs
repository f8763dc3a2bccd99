//! Ledger entity store: operators, per-operator params, module params and
//! the id allocator.

use tracing::info;

use super::OperatorsService;
use crate::adapters::codec::BincodeCodec;
use crate::domain::address::Address;
use crate::domain::entities::{
    validate_identity, Operator, OperatorId, OperatorParams, OperatorParamsRecord, Params,
};
use crate::domain::errors::{OperatorsError, OperatorsResult};
use crate::domain::keys::{
    self, address_set_key, decode_id, encode_id, next_prefix, operator_key, operator_params_key,
    KeyPrefix, NEXT_OPERATOR_ID_KEY, PARAMS_KEY,
};
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    // ---------------------------------------------------------------------
    // ID allocator
    // ---------------------------------------------------------------------

    /// Id the next registration will receive. Starts at 1.
    pub fn peek_next_operator_id(&self) -> OperatorsResult<OperatorId> {
        match self.store.get(NEXT_OPERATOR_ID_KEY)? {
            Some(bytes) => decode_id(&bytes).ok_or_else(|| OperatorsError::Serialization {
                message: format!("corrupt next operator id: {} bytes", bytes.len()),
            }),
            None => Ok(1),
        }
    }

    pub(crate) fn set_next_operator_id(&mut self, id: OperatorId) -> OperatorsResult<()> {
        self.store.put(NEXT_OPERATOR_ID_KEY, &encode_id(id))?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Operators
    // ---------------------------------------------------------------------

    pub fn get_operator(&self, id: OperatorId) -> OperatorsResult<Option<Operator>> {
        self.read(&operator_key(id))
    }

    /// Like `get_operator`, but absence is `OperatorNotFound`.
    pub fn must_get_operator(&self, id: OperatorId) -> OperatorsResult<Operator> {
        self.get_operator(id)?
            .ok_or(OperatorsError::OperatorNotFound { id })
    }

    /// Upsert the operator and its address-set entry.
    pub(crate) fn put_operator(&mut self, operator: &Operator) -> OperatorsResult<()> {
        let address = validate_identity("operator", &operator.address)?;
        self.write(&operator_key(operator.id), operator)?;
        self.store.put(&address_set_key(&address), &[])?;
        Ok(())
    }

    /// Persist an operator outside of a command, e.g. after pool accounting.
    pub fn save_operator(&mut self, operator: &Operator) -> OperatorsResult<()> {
        operator.validate()?;
        self.run_atomic("save_operator", |svc| svc.put_operator(operator))
    }

    /// Persist, then ensure the custodial account exists.
    pub(crate) fn create_operator(&mut self, operator: &Operator) -> OperatorsResult<()> {
        let address = validate_identity("operator", &operator.address)?;
        self.put_operator(operator)?;
        self.accounts.create_account_if_absent(&address);
        info!(
            operator_id = operator.id,
            address = %operator.address,
            "[qc-18] operator created"
        );
        Ok(())
    }

    /// Charge the registration fee, create the operator and notify hooks.
    ///
    /// Store writes come first so that every step after the fee transfer is
    /// infallible. The fee, the custodial account and the hooks are outside
    /// the write buffer and cannot be undone. Does not advance the id
    /// allocator.
    pub(crate) fn register(&mut self, operator: &Operator) -> OperatorsResult<()> {
        let admin = validate_identity("admin", &operator.admin)?;
        let address = validate_identity("operator", &operator.address)?;
        let params = self.get_params()?;

        self.put_operator(operator)?;
        if !params.registration_fee.is_zero() {
            self.token_ledger
                .fund_shared_pool(&admin, &params.registration_fee)?;
        }

        self.accounts.create_account_if_absent(&address);
        info!(
            operator_id = operator.id,
            address = %operator.address,
            "[qc-18] operator created"
        );
        self.hooks.after_operator_registered(operator.id);
        Ok(())
    }

    /// Remove the operator record and its address-set entry.
    pub(crate) fn remove_operator_record(&mut self, operator: &Operator) -> OperatorsResult<()> {
        self.store.delete(&operator_key(operator.id))?;
        if let Ok(address) = operator.address.parse::<Address>() {
            self.store.delete(&address_set_key(&address))?;
        }
        Ok(())
    }

    pub fn is_operator_address(&self, address: &Address) -> OperatorsResult<bool> {
        Ok(self.store.exists(&address_set_key(address))?)
    }

    /// Every operator, ordered by id.
    pub fn get_operators(&self) -> OperatorsResult<Vec<Operator>> {
        let mut operators = Vec::new();
        self.scan_operators(None, |op| {
            operators.push(op);
            Ok(true)
        })?;
        Ok(operators)
    }

    /// Visit operators in id order starting at `start`. Stop when `visit`
    /// returns `false`.
    pub(crate) fn scan_operators<F>(&self, start: Option<OperatorId>, mut visit: F) -> OperatorsResult<()>
    where
        F: FnMut(Operator) -> OperatorsResult<bool>,
    {
        let prefix = KeyPrefix::Operator.as_bytes();
        let from = match start {
            Some(id) => operator_key(id),
            None => prefix.to_vec(),
        };
        let end = next_prefix(&prefix);
        for (key, value) in self.store.range_scan(&from, end.as_deref())? {
            keys::parse_id_key(KeyPrefix::Operator, &key)?;
            let operator: Operator = BincodeCodec::decode(&value)?;
            if !visit(operator)? {
                break;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Operator params
    // ---------------------------------------------------------------------

    /// Stored params, or the default record when none exist.
    pub fn get_operator_params(&self, id: OperatorId) -> OperatorsResult<OperatorParams> {
        Ok(self.read(&operator_params_key(id))?.unwrap_or_default())
    }

    pub(crate) fn save_operator_params(
        &mut self,
        id: OperatorId,
        params: &OperatorParams,
    ) -> OperatorsResult<()> {
        params.validate()?;
        self.write(&operator_params_key(id), params)
    }

    pub(crate) fn delete_operator_params(&mut self, id: OperatorId) -> OperatorsResult<()> {
        self.store.delete(&operator_params_key(id))?;
        Ok(())
    }

    /// Every stored params record, ordered by operator id.
    pub fn get_all_operator_params_records(&self) -> OperatorsResult<Vec<OperatorParamsRecord>> {
        self.store
            .prefix_scan(&KeyPrefix::OperatorParams.as_bytes())?
            .into_iter()
            .map(|(key, value)| {
                Ok(OperatorParamsRecord {
                    operator_id: keys::parse_id_key(KeyPrefix::OperatorParams, &key)?,
                    params: BincodeCodec::decode(&value)?,
                })
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Module params
    // ---------------------------------------------------------------------

    /// Stored params, or the configured defaults before any are stored.
    pub fn get_params(&self) -> OperatorsResult<Params> {
        Ok(self
            .read(PARAMS_KEY)?
            .unwrap_or_else(|| self.config.default_params.clone()))
    }

    pub(crate) fn set_params(&mut self, params: &Params) -> OperatorsResult<()> {
        params.validate()?;
        self.write(PARAMS_KEY, params)
    }
}
