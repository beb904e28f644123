//! Condition evaluation logic
//!
//! Resolves conditions and condition groups against the variable registry.
//! Evaluation never mutates the store and never fails: a reference that
//! cannot be resolved simply yields `false`.

use at_core::{CombineLogic, Comparison, Condition, ConditionGroup, ConditionSource};
use at_store::AutomationStore;
use tracing::trace;

/// Condition evaluator
///
/// Borrows the store immutably for the duration of an evaluation.
pub struct ConditionEvaluator<'a> {
    store: &'a AutomationStore,
}

impl<'a> ConditionEvaluator<'a> {
    /// Create a new condition evaluator
    pub fn new(store: &'a AutomationStore) -> Self {
        Self { store }
    }

    /// Evaluate one condition against its target variable
    ///
    /// A missing or disabled target yields `false`. The condition's own
    /// `status` is not consulted here; callers decide what a disabled
    /// condition means in their context.
    pub fn evaluate(&self, condition: &Condition) -> bool {
        let key = condition.target();
        let Some(var) = self.store.active_variable(key) else {
            trace!(con = condition.num, target = %key, "Target missing or inactive");
            return false;
        };

        let result = match condition.comparison {
            Comparison::IsTrue => var.state,
            Comparison::IsFalse => !var.state,
            Comparison::IsEqual => var.value == condition.value,
            Comparison::IsLess => var.value < condition.value,
            Comparison::IsGreater => var.value > condition.value,
            Comparison::FlagIsTrue => var.flag,
            Comparison::FlagIsFalse => !var.flag,
        };

        trace!(
            con = condition.num,
            target = %key,
            comparison = ?condition.comparison,
            result,
            "Condition evaluated"
        );
        result
    }

    /// Evaluate the active condition with id `num`
    ///
    /// Missing and disabled conditions yield `false`.
    pub fn evaluate_by_id(&self, num: u8) -> bool {
        match self.store.condition(num) {
            Some(condition) if condition.status => self.evaluate(condition),
            _ => {
                trace!(con = num, "Condition missing or disabled");
                false
            }
        }
    }

    /// Fold a group's members with its logic
    ///
    /// Zero slots, missing conditions and disabled conditions are skipped as
    /// if absent. With no eligible members an AND group is `true` and an OR
    /// group is `false`.
    pub fn evaluate_group(&self, group: &ConditionGroup) -> bool {
        let eligible = group
            .member_ids()
            .filter_map(|id| self.store.condition(id))
            .filter(|condition| condition.status);

        let mut members = eligible.map(|condition| self.evaluate(condition));
        let result = match group.logic {
            CombineLogic::And => members.all(|held| held),
            CombineLogic::Or => members.any(|held| held),
        };

        trace!(group = group.num, logic = ?group.logic, result, "Group evaluated");
        result
    }

    /// Evaluate the active group with id `num`
    ///
    /// Missing and disabled groups yield `false`.
    pub fn evaluate_group_by_id(&self, num: u8) -> bool {
        match self.store.condition_group(num) {
            Some(group) if group.status => self.evaluate_group(group),
            _ => {
                trace!(group = num, "Condition group missing or disabled");
                false
            }
        }
    }

    /// Resolve a rule's condition source
    pub fn evaluate_source(&self, source: ConditionSource) -> bool {
        match source {
            ConditionSource::Condition(num) => self.evaluate_by_id(num),
            ConditionSource::Group(num) => self.evaluate_group_by_id(num),
        }
    }
}
