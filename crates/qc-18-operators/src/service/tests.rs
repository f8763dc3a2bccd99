use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::adapters::bank::{InMemoryAccounts, InMemoryTokenLedger};
use crate::adapters::storage::InMemoryKVStore;
use crate::config::OperatorsConfig;
use crate::domain::address::Address;
use crate::domain::coins::{Coins, DecCoins};
use crate::domain::decimal::Dec;
use crate::domain::entities::{
    BlockContext, OperatorId, OperatorParams, OperatorStatus, Params, Timestamp, UnbondingOperator,
    DO_NOT_MODIFY,
};
use crate::domain::errors::{ErrorKind, OperatorsError, OperatorsResult};
use crate::domain::events::OperatorEvent;
use crate::domain::genesis::GenesisState;
use crate::domain::keys::operator_key;
use crate::ports::inbound::{
    GenesisApi, MsgDeactivateOperator, MsgReactivateOperator, MsgRegisterOperator,
    MsgSetOperatorParams, MsgTransferOperatorOwnership, MsgUpdateOperator, MsgUpdateParams,
    OperatorsMsgApi, OperatorsQueryApi, PageRequest, TickApi,
};
use crate::ports::outbound::{AccountService, KeyValueStore, OperatorsHooks, TokenLedger};

type TestService = OperatorsService<InMemoryKVStore, InMemoryTokenLedger, InMemoryAccounts>;

const SECOND: u64 = 1_000_000_000;
const HOUR: u64 = 3_600 * SECOND;
const T0: Timestamp = 1_700_000_000 * SECOND;

fn make_test_service() -> TestService {
    make_test_service_with(OperatorsConfig::default())
}

fn make_test_service_with(config: OperatorsConfig) -> TestService {
    OperatorsService::new(
        OperatorsDependencies {
            store: InMemoryKVStore::new(),
            token_ledger: InMemoryTokenLedger::new(),
            accounts: InMemoryAccounts::new(),
        },
        config,
    )
    .unwrap()
}

fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn admin(n: u8) -> String {
    addr(n).to_string()
}

fn ctx(time: Timestamp) -> BlockContext {
    BlockContext::new(1, time)
}

fn register(svc: &mut TestService, owner: u8, moniker: &str) -> OperatorId {
    svc.register_operator(&ctx(T0), MsgRegisterOperator::new(admin(owner), moniker))
        .unwrap()
}

fn set_params(svc: &mut TestService, params: Params) {
    let authority = svc.config().authority.clone();
    svc.update_params(&ctx(T0), MsgUpdateParams { authority, params })
        .unwrap();
}

fn deactivate(svc: &mut TestService, owner: u8, id: OperatorId, time: Timestamp) {
    svc.deactivate_operator(
        &ctx(time),
        MsgDeactivateOperator {
            sender: admin(owner),
            operator_id: id,
        },
    )
    .unwrap();
}

fn dump(store: &InMemoryKVStore) -> Vec<(Vec<u8>, Vec<u8>)> {
    store.range_scan(&[], None).unwrap().collect()
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_register_first_operator() {
    let mut svc = make_test_service();

    let id = register(&mut svc, 1, "A");

    assert_eq!(id, 1);
    assert_eq!(svc.peek_next_operator_id().unwrap(), 2);
    let op = svc.operator(1).unwrap();
    assert_eq!(op.status, OperatorStatus::Active);
    assert_eq!(op.moniker, "A");
    assert_eq!(op.admin, admin(1));
    assert!(op.tokens.is_zero());
    assert_eq!(op.address, Address::for_operator(1).to_string());
    assert!(svc.accounts().has_account(&Address::for_operator(1)));
    assert!(svc.is_operator_address(&Address::for_operator(1)).unwrap());
    assert_eq!(svc.drain_events(), vec![OperatorEvent::Registered { operator_id: 1 }]);
}

#[test]
fn test_register_assigns_sequential_ids() {
    let mut svc = make_test_service();
    let ids: Vec<_> = (0..3).map(|i| register(&mut svc, 1, &format!("op-{}", i))).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(svc.peek_next_operator_id().unwrap(), 4);
}

#[test]
fn test_register_rejects_reserved_and_blank_values() {
    let mut svc = make_test_service();

    let err = svc
        .register_operator(&ctx(T0), MsgRegisterOperator::new(admin(1), DO_NOT_MODIFY))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = svc
        .register_operator(
            &ctx(T0),
            MsgRegisterOperator::new(admin(1), "A").with_website(DO_NOT_MODIFY),
        )
        .unwrap_err();
    assert_eq!(err, OperatorsError::ReservedValue { field: "website" });

    let err = svc
        .register_operator(&ctx(T0), MsgRegisterOperator::new(admin(1), "  "))
        .unwrap_err();
    assert_eq!(err, OperatorsError::BlankMoniker);

    let err = svc
        .register_operator(&ctx(T0), MsgRegisterOperator::new("alice", "A"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(svc.peek_next_operator_id().unwrap(), 1);
    assert!(svc.store().is_empty());
}

#[test]
fn test_register_charges_fee_into_shared_pool() {
    let mut svc = make_test_service();
    let fee = Coins::single("uatom", 100u64);
    set_params(&mut svc, Params::new(fee.clone(), Duration::from_secs(60)));
    svc.token_ledger_mut()
        .mint(&addr(1), &Coins::single("uatom", 250u64))
        .unwrap();

    register(&mut svc, 1, "A");

    assert_eq!(svc.token_ledger().balance(&addr(1)), Coins::single("uatom", 150u64));
    assert_eq!(svc.token_ledger().shared_pool(), fee);
}

#[test]
fn test_register_insufficient_funds_leaves_no_trace() {
    let mut svc = make_test_service();
    set_params(
        &mut svc,
        Params::new(Coins::single("uatom", 100u64), Duration::from_secs(60)),
    );
    svc.drain_events();
    let before = dump(svc.store());

    let err = svc
        .register_operator(&ctx(T0), MsgRegisterOperator::new(admin(1), "A"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(dump(svc.store()), before);
    assert_eq!(svc.peek_next_operator_id().unwrap(), 1);
    assert!(svc.get_operator(1).unwrap().is_none());
    assert!(svc.accounts().is_empty());
    assert!(svc.drain_events().is_empty());
}

#[test]
fn test_register_with_exhausted_ids_charges_nothing() {
    let log = Log::default();
    let fee = Coins::single("uatom", 100u64);
    let mut svc = make_test_service();
    svc.set_hooks(vec![Box::new(RecordingHooks {
        name: "h",
        log: log.clone(),
        fail: false,
    })])
    .unwrap();
    svc.init_genesis(&GenesisState {
        next_operator_id: OperatorId::MAX,
        params: Params::new(fee, Duration::from_secs(60)),
        ..Default::default()
    })
    .unwrap();
    svc.token_ledger_mut()
        .mint(&addr(1), &Coins::single("uatom", 250u64))
        .unwrap();
    let before = dump(svc.store());

    let err = svc
        .register_operator(&ctx(T0), MsgRegisterOperator::new(admin(1), "A"))
        .unwrap_err();

    assert_eq!(
        err,
        OperatorsError::Overflow {
            context: "next operator id"
        }
    );
    assert_eq!(dump(svc.store()), before);
    assert_eq!(svc.token_ledger().balance(&addr(1)), Coins::single("uatom", 250u64));
    assert!(svc.token_ledger().shared_pool().is_zero());
    assert!(!svc.accounts().has_account(&Address::for_operator(OperatorId::MAX)));
    assert!(log.lock().unwrap().is_empty());
    assert!(svc.drain_events().is_empty());
}

// =============================================================================
// Update, ownership, params
// =============================================================================

#[test]
fn test_update_operator_keeps_sentinel_fields() {
    let mut svc = make_test_service();
    svc.register_operator(
        &ctx(T0),
        MsgRegisterOperator::new(admin(1), "A").with_website("https://a.example"),
    )
    .unwrap();

    svc.update_operator(
        &ctx(T0),
        MsgUpdateOperator {
            sender: admin(1),
            operator_id: 1,
            moniker: "A2".into(),
            website: DO_NOT_MODIFY.into(),
            picture_url: "https://a.example/p.png".into(),
        },
    )
    .unwrap();

    let op = svc.operator(1).unwrap();
    assert_eq!(op.moniker, "A2");
    assert_eq!(op.website, "https://a.example");
    assert_eq!(op.picture_url, "https://a.example/p.png");
}

#[test]
fn test_update_by_non_admin_is_unauthorized() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    let before = svc.store().get(&operator_key(1)).unwrap();

    let err = svc
        .update_operator(
            &ctx(T0),
            MsgUpdateOperator {
                sender: admin(2),
                operator_id: 1,
                moniker: "stolen".into(),
                website: DO_NOT_MODIFY.into(),
                picture_url: DO_NOT_MODIFY.into(),
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(svc.store().get(&operator_key(1)).unwrap(), before);
    assert_eq!(svc.operator(1).unwrap().moniker, "A");
}

#[test]
fn test_update_missing_operator_is_not_found() {
    let mut svc = make_test_service();
    let err = svc
        .update_operator(
            &ctx(T0),
            MsgUpdateOperator {
                sender: admin(1),
                operator_id: 9,
                moniker: "x".into(),
                website: String::new(),
                picture_url: String::new(),
            },
        )
        .unwrap_err();
    assert_eq!(err, OperatorsError::OperatorNotFound { id: 9 });
}

#[test]
fn test_transfer_ownership() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");

    svc.transfer_operator_ownership(
        &ctx(T0),
        MsgTransferOperatorOwnership {
            sender: admin(1),
            operator_id: 1,
            new_admin: admin(2),
        },
    )
    .unwrap();

    assert_eq!(svc.operator(1).unwrap().admin, admin(2));
    // The previous admin lost control.
    let err = svc
        .deactivate_operator(
            &ctx(T0),
            MsgDeactivateOperator {
                sender: admin(1),
                operator_id: 1,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    deactivate(&mut svc, 2, 1, T0);
}

#[test]
fn test_transfer_ownership_rejects_malformed_admin() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    let err = svc
        .transfer_operator_ownership(
            &ctx(T0),
            MsgTransferOperatorOwnership {
                sender: admin(1),
                operator_id: 1,
                new_admin: "bob".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(svc.operator(1).unwrap().admin, admin(1));
}

#[test]
fn test_operator_params_set_and_query() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    assert_eq!(svc.operator_params(1).unwrap(), OperatorParams::default());

    let params = OperatorParams::new("0.05".parse().unwrap());
    svc.set_operator_params(
        &ctx(T0),
        MsgSetOperatorParams {
            sender: admin(1),
            operator_id: 1,
            params: params.clone(),
        },
    )
    .unwrap();
    assert_eq!(svc.operator_params(1).unwrap(), params);

    let err = svc
        .set_operator_params(
            &ctx(T0),
            MsgSetOperatorParams {
                sender: admin(1),
                operator_id: 1,
                params: OperatorParams::new(Dec::from_u64(2)),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(svc.operator_params(1).unwrap(), params);

    assert_eq!(
        svc.operator_params(7).unwrap_err(),
        OperatorsError::OperatorNotFound { id: 7 }
    );
}

#[test]
fn test_update_params_requires_authority() {
    let mut svc = make_test_service();
    let params = Params::new(Coins::empty(), Duration::from_secs(10));

    let err = svc
        .update_params(
            &ctx(T0),
            MsgUpdateParams {
                authority: admin(1),
                params: params.clone(),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(svc.params().unwrap(), Params::default());

    set_params(&mut svc, params.clone());
    assert_eq!(svc.params().unwrap(), params);

    let authority = svc.config().authority.clone();
    let err = svc
        .update_params(
            &ctx(T0),
            MsgUpdateParams {
                authority,
                params: Params::new(Coins::empty(), Duration::ZERO),
            },
        )
        .unwrap_err();
    assert_eq!(err, OperatorsError::InvalidDeactivationTime);
}

// =============================================================================
// Lifecycle and tick
// =============================================================================

#[test]
fn test_inactivation_completes_exactly_at_deadline() {
    let mut svc = make_test_service();
    set_params(&mut svc, Params::new(Coins::empty(), Duration::from_secs(6 * 3_600)));
    register(&mut svc, 1, "A");

    deactivate(&mut svc, 1, 1, T0);
    let deadline = T0 + 6 * HOUR;
    assert_eq!(
        svc.inactivating_operators().unwrap(),
        vec![UnbondingOperator::new(1, deadline)]
    );

    let summary = svc
        .begin_block(&BlockContext::new(2, deadline - 1_000_000))
        .unwrap();
    assert!(summary.completed.is_empty());
    assert_eq!(svc.operator(1).unwrap().status, OperatorStatus::Inactivating);
    assert_eq!(svc.inactivating_operators().unwrap().len(), 1);

    let summary = svc.begin_block(&BlockContext::new(3, deadline)).unwrap();
    assert_eq!(summary.completed, vec![1]);
    assert_eq!(summary.height, 3);
    assert_eq!(svc.operator(1).unwrap().status, OperatorStatus::Inactive);
    assert!(svc.inactivating_operators().unwrap().is_empty());
}

#[test]
fn test_deactivate_twice_is_invalid_state() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    deactivate(&mut svc, 1, 1, T0);

    let err = svc
        .deactivate_operator(
            &ctx(T0 + SECOND),
            MsgDeactivateOperator {
                sender: admin(1),
                operator_id: 1,
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(svc.inactivating_operators().unwrap().len(), 1);
}

#[test]
fn test_tick_completes_in_time_then_id_order() {
    let mut svc = make_test_service();
    set_params(&mut svc, Params::new(Coins::empty(), Duration::from_secs(60)));
    for i in 0..4 {
        register(&mut svc, 1, &format!("op-{}", i));
    }
    deactivate(&mut svc, 1, 3, T0);
    deactivate(&mut svc, 1, 2, T0 + SECOND);
    deactivate(&mut svc, 1, 1, T0);
    deactivate(&mut svc, 1, 4, T0 + 10 * SECOND);

    let queue: Vec<_> = svc
        .inactivating_operators()
        .unwrap()
        .into_iter()
        .map(|e| e.operator_id)
        .collect();
    assert_eq!(queue, vec![1, 3, 2, 4]);

    let summary = svc
        .begin_block(&BlockContext::new(9, T0 + 61 * SECOND))
        .unwrap();
    assert_eq!(summary.completed, vec![1, 3, 2]);
    assert_eq!(svc.operator(4).unwrap().status, OperatorStatus::Inactivating);
}

#[test]
fn test_iterate_due_stops_early() {
    let mut svc = make_test_service();
    for i in 0..3 {
        register(&mut svc, 1, &format!("op-{}", i));
        deactivate(&mut svc, 1, i + 1, T0 + u64::from(i) * SECOND);
    }

    let cutoff = T0 + svc.params().unwrap().deactivation_time.as_nanos() as u64 + SECOND;
    let mut seen = Vec::new();
    svc.iterate_due(cutoff, |entry| {
        seen.push(entry.operator_id);
        Ok(seen.len() == 1)
    })
    .unwrap();
    assert_eq!(seen, vec![1]);

    assert_eq!(svc.due_entries(cutoff).unwrap().len(), 2);
}

#[test]
fn test_reactivate_and_delete() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    svc.set_operator_params(
        &ctx(T0),
        MsgSetOperatorParams {
            sender: admin(1),
            operator_id: 1,
            params: OperatorParams::new("0.1".parse().unwrap()),
        },
    )
    .unwrap();

    let reactivate = MsgReactivateOperator {
        sender: admin(1),
        operator_id: 1,
    };
    let err = svc.reactivate_operator(&ctx(T0), reactivate.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    svc.start_operator_inactivation(&ctx(T0), 1).unwrap();
    svc.complete_operator_inactivation(1).unwrap();
    assert_eq!(svc.operator(1).unwrap().status, OperatorStatus::Inactive);
    assert!(svc.get_all_operator_params_records().unwrap().is_empty());
    assert!(svc.inactivating_operators().unwrap().is_empty());

    svc.reactivate_operator(&ctx(T0), reactivate).unwrap();
    assert!(svc.operator(1).unwrap().is_active());

    assert_eq!(
        svc.delete_operator(1).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    svc.start_operator_inactivation(&ctx(T0), 1).unwrap();
    svc.complete_operator_inactivation(1).unwrap();
    svc.delete_operator(1).unwrap();

    assert!(svc.get_operator(1).unwrap().is_none());
    assert!(!svc.is_operator_address(&Address::for_operator(1)).unwrap());
    assert_eq!(svc.peek_next_operator_id().unwrap(), 2);
}

#[test]
fn test_complete_without_queue_entry_fails() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    let err = svc.complete_operator_inactivation(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_failed_command_drops_events() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    svc.drain_events();

    let _ = svc.deactivate_operator(
        &ctx(T0),
        MsgDeactivateOperator {
            sender: admin(2),
            operator_id: 1,
        },
    );
    assert!(svc.drain_events().is_empty());

    deactivate(&mut svc, 1, 1, T0);
    let events = svc.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operator_id(), Some(1));
}

// =============================================================================
// Hooks
// =============================================================================

type Log = Arc<Mutex<Vec<String>>>;

struct RecordingHooks {
    name: &'static str,
    log: Log,
    fail: bool,
}

impl RecordingHooks {
    fn record(&self, what: &str, id: OperatorId) -> OperatorsResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}:{}", self.name, what, id));
        if self.fail {
            return Err(OperatorsError::HookFailed {
                reason: "rejected".into(),
            });
        }
        Ok(())
    }
}

impl OperatorsHooks for RecordingHooks {
    fn after_operator_registered(&self, id: OperatorId) -> OperatorsResult<()> {
        self.record("registered", id)
    }

    fn after_operator_inactivating_started(&self, id: OperatorId) -> OperatorsResult<()> {
        self.record("started", id)
    }

    fn after_operator_inactivating_completed(&self, id: OperatorId) -> OperatorsResult<()> {
        self.record("completed", id)
    }

    fn after_operator_reactivated(&self, id: OperatorId) -> OperatorsResult<()> {
        self.record("reactivated", id)
    }
}

#[test]
fn test_hooks_fire_in_order_and_failures_do_not_abort() {
    let log = Log::default();
    let mut svc = make_test_service();
    svc.set_hooks(vec![
        Box::new(RecordingHooks {
            name: "h1",
            log: log.clone(),
            fail: true,
        }),
        Box::new(RecordingHooks {
            name: "h2",
            log: log.clone(),
            fail: false,
        }),
    ])
    .unwrap();

    register(&mut svc, 1, "A");
    deactivate(&mut svc, 1, 1, T0);
    let done = T0 + svc.params().unwrap().deactivation_time.as_nanos() as u64;
    svc.begin_block(&BlockContext::new(5, done)).unwrap();
    svc.reactivate_inactive_operator(1).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "h1:registered:1",
            "h2:registered:1",
            "h1:started:1",
            "h2:started:1",
            "h1:completed:1",
            "h2:completed:1",
            "h1:reactivated:1",
            "h2:reactivated:1",
        ]
    );
    assert!(svc.operator(1).unwrap().is_active());
}

#[test]
fn test_hooks_can_only_be_set_once() {
    let mut svc = make_test_service();
    svc.set_hooks(vec![]).unwrap();
    let err = svc.set_hooks(vec![]).unwrap_err();
    assert!(matches!(err, OperatorsError::HooksAlreadySet { .. }));
}

#[test]
fn test_genesis_import_fires_no_hooks() {
    let log = Log::default();
    let mut source = make_test_service();
    register(&mut source, 1, "A");
    let state = source.export_genesis().unwrap();

    let mut target = make_test_service();
    target
        .set_hooks(vec![Box::new(RecordingHooks {
            name: "h",
            log: log.clone(),
            fail: false,
        })])
        .unwrap();
    target.init_genesis(&state).unwrap();

    assert!(log.lock().unwrap().is_empty());
    assert!(target.accounts().has_account(&Address::for_operator(1)));
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_operators_pagination_and_status_filter() {
    let mut svc = make_test_service();
    for i in 0..5 {
        register(&mut svc, 1, &format!("op-{}", i));
    }
    deactivate(&mut svc, 1, 2, T0);
    deactivate(&mut svc, 1, 4, T0);

    let page = svc
        .operators(&PageRequest {
            limit: Some(2),
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<_> = page.operators.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(page.next_key, Some(3));

    let page = svc
        .operators(&PageRequest {
            key: page.next_key,
            limit: Some(10),
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<_> = page.operators.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
    assert_eq!(page.next_key, None);

    let page = svc
        .operators(&PageRequest {
            status: Some(OperatorStatus::Inactivating),
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.operators[0].id, 2);
    assert_eq!(page.next_key, Some(4));

    let err = svc
        .operators(&PageRequest {
            limit: Some(0),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_operators_limit_is_clamped() {
    let mut svc = make_test_service_with(OperatorsConfig::default().with_page_limits(2, 3));
    for i in 0..5 {
        register(&mut svc, 1, &format!("op-{}", i));
    }
    let page = svc
        .operators(&PageRequest {
            limit: Some(100),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.operators.len(), 3);
    assert_eq!(page.next_key, Some(4));

    let page = svc.operators(&PageRequest::default()).unwrap();
    assert_eq!(page.operators.len(), 2);
}

// =============================================================================
// Genesis and invariants
// =============================================================================

fn populated_service() -> TestService {
    let mut svc = make_test_service();
    set_params(&mut svc, Params::new(Coins::empty(), Duration::from_secs(120)));
    for i in 0..4 {
        register(&mut svc, 1, &format!("op-{}", i));
    }
    svc.set_operator_params(
        &ctx(T0),
        MsgSetOperatorParams {
            sender: admin(1),
            operator_id: 1,
            params: OperatorParams::new("0.2".parse().unwrap()),
        },
    )
    .unwrap();
    deactivate(&mut svc, 1, 2, T0);
    deactivate(&mut svc, 1, 3, T0);
    svc.begin_block(&BlockContext::new(2, T0 + 120 * SECOND)).unwrap();
    deactivate(&mut svc, 1, 4, T0 + 200 * SECOND);
    svc
}

#[test]
fn test_genesis_export_import_reproduces_store() {
    let source = populated_service();
    let state = source.export_genesis().unwrap();
    assert_eq!(state.next_operator_id, 5);
    assert_eq!(state.operators.len(), 4);
    assert_eq!(state.operators_params.len(), 1);
    assert_eq!(state.unbonding_operators.len(), 1);

    let mut target = make_test_service();
    target.init_genesis(&state).unwrap();

    assert_eq!(dump(target.store()), dump(source.store()));
    assert_eq!(target.export_genesis().unwrap(), state);
}

#[test]
fn test_genesis_rejects_invalid_state_atomically() {
    let mut state = populated_service().export_genesis().unwrap();
    state.unbonding_operators.clear();

    let mut target = make_test_service();
    let err = target.init_genesis(&state).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(target.store().is_empty());
}

#[test]
fn test_genesis_default_state() {
    let mut svc = make_test_service();
    svc.init_genesis(&GenesisState::default()).unwrap();
    assert_eq!(svc.peek_next_operator_id().unwrap(), 1);
    assert_eq!(svc.params().unwrap(), Params::default());
    assert_eq!(register(&mut svc, 1, "A"), 1);
}

#[test]
fn test_invariants_hold_after_activity() {
    let svc = populated_service();
    let report = svc.check_invariants().unwrap();
    assert!(report.is_ok(), "{:?}", report.broken);
}

#[test]
fn test_invariants_detect_orphan_queue_entry() {
    let mut svc = populated_service();
    svc.run_atomic("corrupt", |svc| svc.queue_insert(1, T0))
        .unwrap();

    let report = svc.check_invariants().unwrap();
    assert!(!report.is_ok());
    assert!(report.broken[0].contains("operator 1"));
}

#[test]
fn test_invariants_accept_wiped_out_pool() {
    let mut svc = make_test_service();
    register(&mut svc, 1, "A");
    let mut operator = svc.operator(1).unwrap();
    operator.delegator_shares = DecCoins::single(operator.shares_denom("umilk"), Dec::from_u64(100));
    svc.save_operator(&operator).unwrap();
    assert!(svc.operator(1).unwrap().is_invalid_exchange_rate());

    let report = svc.check_invariants().unwrap();

    assert!(report.is_ok(), "{:?}", report.broken);
}

#[test]
fn test_tick_with_invariant_checks_enabled() {
    let mut svc = make_test_service_with(OperatorsConfig::default().with_invariant_checks(true));
    register(&mut svc, 1, "A");
    deactivate(&mut svc, 1, 1, T0);
    let done = T0 + svc.params().unwrap().deactivation_time.as_nanos() as u64;
    let summary = svc.begin_block(&BlockContext::new(2, done)).unwrap();
    assert_eq!(summary.completed, vec![1]);
}
