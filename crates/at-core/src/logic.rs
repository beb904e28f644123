//! Rule layer types
//!
//! Conditions test one variable, actions mutate one variable, groups bundle
//! them by id, and rules bind a condition source to an action target.
//! Member and source ids of 0 mean "nothing" and never resolve.

use crate::variable::VariableKey;
use crate::wire::{ActionType, CombineLogic, Comparison, DataType};
use crate::{MAX_ACTIONS_PER_GROUP, MAX_CONDITIONS_PER_GROUP, MAX_RULES};

/// A single boolean test against one variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Condition {
    /// Unique id (`conNum`)
    pub num: u8,
    pub target_type: DataType,
    pub target_num: u8,
    pub comparison: Comparison,
    /// Operand for `IsEqual`, `IsLess` and `IsGreater`
    pub value: i32,
    pub status: bool,
}

impl Condition {
    pub fn target(&self) -> VariableKey {
        VariableKey::new(self.target_type, self.target_num)
    }
}

/// An AND/OR combination of conditions referenced by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionGroup {
    pub num: u8,
    /// Member condition ids, zero-padded
    pub members: [u8; MAX_CONDITIONS_PER_GROUP],
    pub logic: CombineLogic,
    pub status: bool,
}

impl ConditionGroup {
    /// Non-zero member ids in array order
    pub fn member_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.members.iter().copied().filter(|id| *id != 0)
    }
}

/// A single mutation applied to one variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Action {
    /// Unique id (`actNum`)
    pub num: u8,
    pub target_type: DataType,
    pub target_num: u8,
    pub action: ActionType,
    /// Operand for `SetValue`, `Increment` and `Decrement`
    pub value: i32,
    pub status: bool,
}

impl Action {
    pub fn target(&self) -> VariableKey {
        VariableKey::new(self.target_type, self.target_num)
    }
}

/// An ordered list of actions referenced by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionGroup {
    pub num: u8,
    /// Member action ids, zero-padded
    pub members: [u8; MAX_ACTIONS_PER_GROUP],
    pub status: bool,
}

impl ActionGroup {
    /// Non-zero member ids in execution order
    pub fn member_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.members.iter().copied().filter(|id| *id != 0)
    }
}

/// What a rule evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSource {
    Condition(u8),
    Group(u8),
}

/// What a rule performs when its source holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    Action(u8),
    Group(u8),
}

/// Binding from one condition source to one action target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rule {
    pub num: u8,
    pub use_condition_group: bool,
    pub condition_source_id: u8,
    pub use_action_group: bool,
    pub action_target_id: u8,
    pub status: bool,
}

impl Rule {
    pub fn source(&self) -> ConditionSource {
        if self.use_condition_group {
            ConditionSource::Group(self.condition_source_id)
        } else {
            ConditionSource::Condition(self.condition_source_id)
        }
    }

    pub fn target(&self) -> ActionTarget {
        if self.use_action_group {
            ActionTarget::Group(self.action_target_id)
        } else {
            ActionTarget::Action(self.action_target_id)
        }
    }
}

/// Evaluation order of rules, by rule id
///
/// Every slot always holds an id in `1..=MAX_RULES`; anything else written
/// through [`RuleSequence::set`] falls back to `position + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSequence([u8; MAX_RULES]);

impl RuleSequence {
    /// Identity order `1, 2, ..., MAX_RULES`
    pub fn identity() -> Self {
        Self(std::array::from_fn(Self::default_at))
    }

    /// Id a position falls back to
    pub fn default_at(position: usize) -> u8 {
        (position + 1) as u8
    }

    /// Build from a list; missing or out-of-range entries take their default
    pub fn from_ids(ids: &[u8]) -> Self {
        let mut sequence = Self::identity();
        for (position, id) in ids.iter().take(MAX_RULES).enumerate() {
            sequence.set(position, i64::from(*id));
        }
        sequence
    }

    /// Write `id` at `position`, normalising out-of-range ids
    ///
    /// Positions beyond the capacity are ignored.
    pub fn set(&mut self, position: usize, id: i64) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = if (1..=MAX_RULES as i64).contains(&id) {
                id as u8
            } else {
                Self::default_at(position)
            };
        }
    }

    /// Reset `position` to its default id
    pub fn reset(&mut self, position: usize) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = Self::default_at(position);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Default for RuleSequence {
    fn default() -> Self {
        Self::identity()
    }
}
