//! Action execution
//!
//! Applies actions and action groups to the variable registry. This is the
//! only place the rule layer mutates variable state. An action whose target
//! is missing or inactive is a no-op, never an error.

use at_core::{Action, ActionGroup, ActionTarget, ActionType};
use at_store::AutomationStore;
use tracing::trace;

/// Action executor
///
/// Borrows the store mutably for the duration of an execution.
pub struct ActionExecutor<'a> {
    store: &'a mut AutomationStore,
}

impl<'a> ActionExecutor<'a> {
    /// Create a new action executor
    pub fn new(store: &'a mut AutomationStore) -> Self {
        Self { store }
    }

    /// Apply one action to its target variable
    ///
    /// Returns `true` when the target was found active and mutated.
    /// `Increment` and `Decrement` add the operand literally (an operand of 0
    /// changes nothing) and wrap on overflow.
    pub fn apply(&mut self, action: &Action) -> bool {
        let key = action.target();
        let Some(var) = self.store.active_variable_mut(key) else {
            trace!(act = action.num, target = %key, "Target missing or inactive");
            return false;
        };

        match action.action {
            ActionType::Set => var.state = true,
            ActionType::Reset => var.state = false,
            ActionType::SetValue => var.value = action.value,
            ActionType::Increment => var.value = var.value.wrapping_add(action.value),
            ActionType::Decrement => var.value = var.value.wrapping_sub(action.value),
            ActionType::SetFlag => var.flag = true,
            ActionType::Clear => var.flag = false,
        }

        trace!(
            act = action.num,
            target = %key,
            action = ?action.action,
            state = var.state,
            value = var.value,
            flag = var.flag,
            "Action applied"
        );
        true
    }

    /// Apply the active action with id `num`
    ///
    /// Returns the number of actions applied (0 or 1).
    pub fn apply_by_id(&mut self, num: u8) -> usize {
        match self.store.action(num).copied() {
            Some(action) if action.status => usize::from(self.apply(&action)),
            _ => {
                trace!(act = num, "Action missing or disabled");
                0
            }
        }
    }

    /// Apply a group's members in declared order
    ///
    /// Zero slots, missing actions and disabled actions are skipped. Later
    /// members see the effects of earlier ones. Returns the number of actions
    /// applied.
    pub fn apply_group(&mut self, group: &ActionGroup) -> usize {
        let applied: usize = group.member_ids().map(|id| self.apply_by_id(id)).sum();
        trace!(group = group.num, applied, "Action group applied");
        applied
    }

    /// Apply the active action group with id `num`
    pub fn apply_group_by_id(&mut self, num: u8) -> usize {
        match self.store.action_group(num).copied() {
            Some(group) if group.status => self.apply_group(&group),
            _ => {
                trace!(group = num, "Action group missing or disabled");
                0
            }
        }
    }

    /// Invoke a rule's action target
    pub fn apply_target(&mut self, target: ActionTarget) -> usize {
        match target {
            ActionTarget::Action(num) => self.apply_by_id(num),
            ActionTarget::Group(num) => self.apply_group_by_id(num),
        }
    }
}
