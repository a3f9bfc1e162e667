//! keel-constraints
//!
//! Promotion gates. Each evaluator answers one question: may this version of
//! this artifact be promoted into this environment right now?

pub mod allowed_times;
pub mod depends_on;
pub mod error;
pub mod evaluator;
pub mod manual_judgement;
pub mod overrides;
pub mod promotion;
pub mod stateful;
pub mod veto;

pub use crate::allowed_times::AllowedTimesEvaluator;
pub use crate::depends_on::DependsOnEvaluator;
pub use crate::error::ConstraintError;
pub use crate::evaluator::{ConstraintEvaluator, constraint_for};
pub use crate::manual_judgement::ManualJudgement;
pub use crate::overrides::ConstraintOverrides;
pub use crate::promotion::{EnvironmentPromotionChecker, PromotionDecision};
pub use crate::stateful::{DecisionContext, StatefulConstraintLogic, StatefulEvaluator};
pub use crate::veto::VetoEvaluator;
