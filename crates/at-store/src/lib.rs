//! Fixed-capacity table store for the controller
//!
//! This crate provides the [`AutomationStore`], the single aggregate that
//! owns the variable registry and every rule-layer table. All tables are
//! sized once from the capacity constants in `at-core` and are only ever
//! overwritten in place; nothing grows or shrinks at runtime.

mod defaults;

use at_core::{
    Action, ActionGroup, Condition, ConditionGroup, DataType, DeviceSettings, IoVariable,
    OperationMode, Rule, RuleSequence, VariableKey, MAX_ACTIONS, MAX_ACTION_GROUPS,
    MAX_CONDITIONS, MAX_CONDITION_GROUPS, MAX_RULES, MAX_VARIABLES,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub use defaults::{
    default_actions, default_action_groups, default_condition_groups, default_conditions,
    default_rules, default_variables, ANALOG_IN_PINS, DIGITAL_IN_PINS, DIGITAL_OUT_PINS,
};

/// The complete in-memory state of the controller
///
/// Slot positions are storage details. Entities are addressed by their ids:
/// `(type, num)` for variables and `num` for everything else. Id 0 never
/// resolves, and when two slots share an id the first one in array order
/// wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationStore {
    pub device: DeviceSettings,
    pub variables: [IoVariable; MAX_VARIABLES],
    pub conditions: [Condition; MAX_CONDITIONS],
    pub condition_groups: [ConditionGroup; MAX_CONDITION_GROUPS],
    pub actions: [Action; MAX_ACTIONS],
    pub action_groups: [ActionGroup; MAX_ACTION_GROUPS],
    pub rules: [Rule; MAX_RULES],
    pub rule_sequence: RuleSequence,
}

impl AutomationStore {
    /// Create a store holding the deterministic boot baseline
    pub fn with_defaults() -> Self {
        Self {
            device: DeviceSettings::default(),
            variables: default_variables(),
            conditions: default_conditions(),
            condition_groups: default_condition_groups(),
            actions: default_actions(),
            action_groups: default_action_groups(),
            rules: default_rules(),
            rule_sequence: RuleSequence::identity(),
        }
    }

    /// Overwrite every table with the boot baseline
    pub fn reset_to_defaults(&mut self) {
        *self = Self::with_defaults();
    }

    // --- Lookups by identity ---

    /// Find a variable by `(type, num)`, active or not
    pub fn variable(&self, key: VariableKey) -> Option<&IoVariable> {
        self.variables.iter().find(|v| v.matches(key))
    }

    /// Find a variable by `(type, num)` for mutation
    pub fn variable_mut(&mut self, key: VariableKey) -> Option<&mut IoVariable> {
        self.variables.iter_mut().find(|v| v.matches(key))
    }

    /// Find an active variable; disabled definitions resolve to `None`
    pub fn active_variable(&self, key: VariableKey) -> Option<&IoVariable> {
        self.variable(key).filter(|v| v.status)
    }

    /// Find an active variable for mutation
    pub fn active_variable_mut(&mut self, key: VariableKey) -> Option<&mut IoVariable> {
        self.variable_mut(key).filter(|v| v.status)
    }

    pub fn condition(&self, num: u8) -> Option<&Condition> {
        find_by_num(&self.conditions, num, |c| c.num)
    }

    pub fn condition_group(&self, num: u8) -> Option<&ConditionGroup> {
        find_by_num(&self.condition_groups, num, |g| g.num)
    }

    pub fn action(&self, num: u8) -> Option<&Action> {
        find_by_num(&self.actions, num, |a| a.num)
    }

    pub fn action_group(&self, num: u8) -> Option<&ActionGroup> {
        find_by_num(&self.action_groups, num, |g| g.num)
    }

    pub fn rule(&self, num: u8) -> Option<&Rule> {
        find_by_num(&self.rules, num, |r| r.num)
    }

    /// Variables of one type, in slot order
    pub fn variables_of(&self, data_type: DataType) -> impl Iterator<Item = &IoVariable> {
        self.variables
            .iter()
            .filter(move |v| v.data_type == data_type)
    }

    /// Clear runtime state that must not survive a reboot
    ///
    /// Soft I/O variables in `Persistent` mode keep their state, value and
    /// flag; every other variable is zeroed.
    pub fn reset_volatile_state(&mut self) {
        let mut kept = 0usize;
        for var in self.variables.iter_mut() {
            if var.data_type == DataType::SoftIo && var.mode == OperationMode::Persistent {
                kept += 1;
                continue;
            }
            var.clear_runtime();
        }
        debug!(kept, "Cleared volatile variable state");
    }
}

impl Default for AutomationStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn find_by_num<T>(table: &[T], num: u8, id: impl Fn(&T) -> u8) -> Option<&T> {
    if num == 0 {
        return None;
    }
    table.iter().find(|entry| id(entry) == num)
}

/// Store shared between the tick task and the configuration boundary
///
/// A tick holds the write lock for its whole pass, and so does a decode, so
/// neither can observe the other half-finished.
pub type SharedStore = Arc<RwLock<AutomationStore>>;

/// Wrap a store for sharing
pub fn shared(store: AutomationStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_identity_not_position() {
        let mut store = AutomationStore::with_defaults();
        // Swap two soft I/O slots; lookups must follow the numbers
        store.variables.swap(14, 15);
        let var = store
            .variable(VariableKey::new(DataType::SoftIo, 1))
            .unwrap();
        assert_eq!(var.num, 1);
        assert_eq!(var.name, "Soft IO 1");
    }

    #[test]
    fn test_active_variable_filters_disabled() {
        let mut store = AutomationStore::with_defaults();
        let key = VariableKey::new(DataType::Timer, 2);
        assert!(store.variable(key).is_some());
        assert!(store.active_variable(key).is_none());

        store.variable_mut(key).unwrap().status = true;
        assert!(store.active_variable(key).is_some());
    }

    #[test]
    fn test_zero_ids_never_resolve() {
        let mut store = AutomationStore::with_defaults();
        store.conditions[0].num = 0;
        assert!(store.condition(0).is_none());
        assert!(store.rule(0).is_none());
        assert!(store.action_group(0).is_none());
    }

    #[test]
    fn test_duplicate_ids_first_slot_wins() {
        let mut store = AutomationStore::with_defaults();
        store.actions[3].num = 1;
        store.actions[3].value = 99;
        assert_eq!(store.action(1).unwrap().value, 0);
    }

    #[test]
    fn test_reset_volatile_state_keeps_persistent_soft_io() {
        let mut store = AutomationStore::with_defaults();
        for var in store.variables.iter_mut() {
            var.state = true;
            var.value = 7;
            var.flag = true;
        }
        let persistent = VariableKey::new(DataType::SoftIo, 5);
        store.variable_mut(persistent).unwrap().mode = OperationMode::Persistent;

        store.reset_volatile_state();

        let kept = store.variable(persistent).unwrap();
        assert!(kept.state && kept.flag);
        assert_eq!(kept.value, 7);

        let cleared = store
            .variable(VariableKey::new(DataType::SoftIo, 6))
            .unwrap();
        assert!(!cleared.state && !cleared.flag);
        assert_eq!(cleared.value, 0);
    }

    #[tokio::test]
    async fn test_shared_store_round_trip() {
        let store = shared(AutomationStore::with_defaults());
        store.write().await.device.run = true;
        assert!(store.read().await.device.run);
    }
}
