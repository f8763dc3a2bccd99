//! Per-block tick: complete every inactivation whose time has come.

use tracing::{error, info};

use super::OperatorsService;
use crate::domain::entities::BlockContext;
use crate::domain::errors::OperatorsResult;
use crate::ports::inbound::{TickApi, TickSummary};
use crate::ports::outbound::{AccountService, KeyValueStore, TokenLedger};

impl<KV, TL, AS> TickApi for OperatorsService<KV, TL, AS>
where
    KV: KeyValueStore,
    TL: TokenLedger,
    AS: AccountService,
{
    fn begin_block(&mut self, ctx: &BlockContext) -> OperatorsResult<TickSummary> {
        self.run_atomic("begin_block", |svc| {
            // Collect first: completing an entry deletes it from the range.
            let due = svc.due_entries(ctx.time)?;

            let mut completed = Vec::with_capacity(due.len());
            for entry in due {
                svc.complete_inactivation(entry.operator_id, Some(entry.completion_time))?;
                completed.push(entry.operator_id);
            }

            if svc.config.check_invariants_on_tick {
                let report = svc.check_invariants()?;
                for violation in &report.broken {
                    error!(height = ctx.height, violation = %violation, "[qc-18] invariant broken");
                }
            }

            if !completed.is_empty() {
                info!(
                    height = ctx.height,
                    time = ctx.time,
                    completed = completed.len(),
                    "[qc-18] inactivations completed"
                );
            }

            Ok(TickSummary {
                height: ctx.height,
                completed,
            })
        })
    }
}
