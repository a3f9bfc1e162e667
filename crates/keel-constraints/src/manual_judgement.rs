use keel_core::models::constraint_state::{ConstraintState, ConstraintStatus};
use keel_core::models::delivery_config::Constraint;
use keel_storage::BoxFuture;

use crate::error::ConstraintError;
use crate::stateful::{DecisionContext, StatefulConstraintLogic};

/// Waits for a human. Only an operator override decides it, unless the
/// constraint has a `timeout`, after which it fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualJudgement;

/// Recorded as `judged_by` when a judgement times out.
pub const AUTOMATIC_JUDGE: &str = "keel";

impl StatefulConstraintLogic for ManualJudgement {
    fn constraint_type(&self) -> &'static str {
        Constraint::MANUAL_JUDGEMENT
    }

    fn decide<'a>(
        &'a self,
        ctx: &'a DecisionContext<'a>,
        state: &'a mut ConstraintState,
    ) -> BoxFuture<'a, Result<(), ConstraintError>> {
        Box::pin(async move {
            let Constraint::ManualJudgement {
                timeout: Some(timeout),
            } = ctx.constraint
            else {
                return Ok(());
            };

            if timeout.is_negative() {
                return Err(ConstraintError::NegativeTimeout(*timeout));
            }
            // a deadline past the last representable instant never arrives
            let Ok(deadline) = state.created_at.checked_add(*timeout) else {
                return Ok(());
            };
            if ctx.now >= deadline {
                state.judge(ConstraintStatus::Fail, AUTOMATIC_JUDGE, ctx.now);
                state.comment = Some("timed out waiting for judgement".into());
            }
            Ok(())
        })
    }
}
