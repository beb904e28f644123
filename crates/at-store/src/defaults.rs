//! Boot baseline for every table
//!
//! Used when no stored configuration exists. Variables are numbered from 1
//! within each type, physical types take their pins from the fixed tables
//! below, and every definition starts inactive.

use at_core::{
    Action, ActionGroup, Condition, ConditionGroup, DataType, IoVariable, OperationMode, Rule,
    MAX_ACTIONS, MAX_ACTION_GROUPS, MAX_ANALOG_IN, MAX_CONDITIONS, MAX_CONDITION_GROUPS,
    MAX_DIGITAL_IN, MAX_DIGITAL_OUT, MAX_RULES, MAX_SOFTIO, MAX_TIMERS, MAX_VARIABLES,
};

/// GPIO pins wired to the digital inputs
pub const DIGITAL_IN_PINS: [u8; MAX_DIGITAL_IN] = [4, 2, 15, 13, 12, 14];

/// GPIO pins wired to the digital outputs
pub const DIGITAL_OUT_PINS: [u8; MAX_DIGITAL_OUT] = [27, 26, 25, 33];

/// GPIO pins wired to the analog inputs
pub const ANALOG_IN_PINS: [u8; MAX_ANALOG_IN] = [35, 34, 39, 36];

/// Registry layout: type, count, pin table (empty for non-physical types)
static LAYOUT: [(DataType, usize, &[u8]); 5] = [
    (DataType::DigitalInput, MAX_DIGITAL_IN, &DIGITAL_IN_PINS),
    (DataType::DigitalOutput, MAX_DIGITAL_OUT, &DIGITAL_OUT_PINS),
    (DataType::AnalogInput, MAX_ANALOG_IN, &ANALOG_IN_PINS),
    (DataType::SoftIo, MAX_SOFTIO, &[]),
    (DataType::Timer, MAX_TIMERS, &[]),
];

pub fn default_variables() -> [IoVariable; MAX_VARIABLES] {
    let mut slots = LAYOUT.iter().flat_map(|(data_type, count, pins)| {
        (0..*count).map(move |i| {
            let num = (i + 1) as u8;
            let gpio = pins.get(i).copied().unwrap_or(0);
            let name = format!("{} {}", data_type.label(), num);
            let mode = if *data_type == DataType::Timer {
                OperationMode::OneShot
            } else {
                OperationMode::None
            };
            IoVariable::new(*data_type, num, gpio, &name).with_mode(mode)
        })
    });
    // LAYOUT counts sum to MAX_VARIABLES
    std::array::from_fn(|_| slots.next().unwrap_or_default())
}

pub fn default_conditions() -> [Condition; MAX_CONDITIONS] {
    std::array::from_fn(|i| Condition {
        num: (i + 1) as u8,
        ..Condition::default()
    })
}

pub fn default_condition_groups() -> [ConditionGroup; MAX_CONDITION_GROUPS] {
    std::array::from_fn(|i| ConditionGroup {
        num: (i + 1) as u8,
        ..ConditionGroup::default()
    })
}

pub fn default_actions() -> [Action; MAX_ACTIONS] {
    std::array::from_fn(|i| Action {
        num: (i + 1) as u8,
        ..Action::default()
    })
}

pub fn default_action_groups() -> [ActionGroup; MAX_ACTION_GROUPS] {
    std::array::from_fn(|i| ActionGroup {
        num: (i + 1) as u8,
        ..ActionGroup::default()
    })
}

pub fn default_rules() -> [Rule; MAX_RULES] {
    std::array::from_fn(|i| Rule {
        num: (i + 1) as u8,
        ..Rule::default()
    })
}
