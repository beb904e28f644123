//! Rule engine tick
//!
//! One tick is a single pass over the rule sequence. Every active rule is
//! evaluated exactly once, in sequence order, and rules never stop each
//! other: there is no "first match wins". Broken references degrade to a
//! false condition or a no-op action.

use at_store::AutomationStore;
use tracing::{debug, trace};

use crate::eval::ConditionEvaluator;
use crate::exec::ActionExecutor;

/// Summary of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Active rules whose condition source was evaluated
    pub rules_evaluated: usize,
    /// Rules whose condition source held
    pub rules_fired: usize,
    /// Individual actions that mutated a variable
    pub actions_applied: usize,
}

/// Drives ticks over an [`AutomationStore`]
#[derive(Debug, Default)]
pub struct RuleEngine {
    ticks: u64,
}

impl RuleEngine {
    /// Create a new rule engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one complete pass over the rule sequence
    ///
    /// The caller must hold exclusive access to the store for the whole
    /// call. A rule id listed more than once in the sequence only runs at its
    /// first position.
    pub fn tick(&mut self, store: &mut AutomationStore) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport::default();
        let mut seen = [false; 256];

        let sequence = store.rule_sequence;
        for id in sequence.iter() {
            if std::mem::replace(&mut seen[usize::from(id)], true) {
                trace!(rule = id, "Rule already ran this tick");
                continue;
            }

            let rule = match store.rule(id) {
                Some(rule) if rule.status => *rule,
                _ => {
                    trace!(rule = id, "Rule missing or disabled");
                    continue;
                }
            };

            report.rules_evaluated += 1;
            let held = ConditionEvaluator::new(store).evaluate_source(rule.source());
            if !held {
                continue;
            }

            report.rules_fired += 1;
            let applied = ActionExecutor::new(store).apply_target(rule.target());
            report.actions_applied += applied;
            trace!(rule = id, applied, "Rule fired");
        }

        debug!(
            tick = self.ticks,
            evaluated = report.rules_evaluated,
            fired = report.rules_fired,
            applied = report.actions_applied,
            "Tick complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use at_core::{
        Action, ActionType, Comparison, Condition, DataType, Rule, RuleSequence, VariableKey,
    };

    const SOFT_1: VariableKey = VariableKey {
        data_type: DataType::SoftIo,
        num: 1,
    };

    fn make_store() -> AutomationStore {
        let mut store = AutomationStore::with_defaults();
        let var = store.variable_mut(SOFT_1).unwrap();
        var.status = true;
        var.state = true;
        store.conditions[0] = Condition {
            num: 1,
            target_type: DataType::SoftIo,
            target_num: 1,
            comparison: Comparison::IsTrue,
            value: 0,
            status: true,
        };
        store.actions[0] = Action {
            num: 1,
            target_type: DataType::SoftIo,
            target_num: 1,
            action: ActionType::Increment,
            value: 1,
            status: true,
        };
        store.rules[0] = Rule {
            num: 1,
            use_condition_group: false,
            condition_source_id: 1,
            use_action_group: false,
            action_target_id: 1,
            status: true,
        };
        store
    }

    #[test]
    fn test_tick_fires_active_rule() {
        let mut store = make_store();
        let mut engine = RuleEngine::new();
        let report = engine.tick(&mut store);
        assert_eq!(
            report,
            TickReport {
                rules_evaluated: 1,
                rules_fired: 1,
                actions_applied: 1,
            }
        );
        assert_eq!(store.variable(SOFT_1).unwrap().value, 1);
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn test_duplicate_sequence_entry_runs_once() {
        let mut store = make_store();
        store.rule_sequence = RuleSequence::from_ids(&[1, 1, 1]);
        let report = RuleEngine::new().tick(&mut store);
        assert_eq!(report.rules_evaluated, 1);
        assert_eq!(store.variable(SOFT_1).unwrap().value, 1);
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let mut store = make_store();
        store.rules[0].status = false;
        let report = RuleEngine::new().tick(&mut store);
        assert_eq!(report, TickReport::default());
        assert_eq!(store.variable(SOFT_1).unwrap().value, 0);
    }

    #[test]
    fn test_zero_action_target_is_noop() {
        let mut store = make_store();
        store.rules[0].action_target_id = 0;
        let report = RuleEngine::new().tick(&mut store);
        assert_eq!(report.rules_fired, 1);
        assert_eq!(report.actions_applied, 0);
    }
}
