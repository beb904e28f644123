//! End-to-end tick behaviour over a full store

use at_automation::{Clock, IoReconciler, ManualClock, RuleEngine, SimulatedIo};
use at_core::{
    Action, ActionGroup, ActionType, CombineLogic, Comparison, Condition, ConditionGroup,
    DataType, Rule, RuleSequence, VariableKey,
};
use at_store::AutomationStore;

const SHARED: VariableKey = VariableKey {
    data_type: DataType::SoftIo,
    num: 1,
};

fn activate(store: &mut AutomationStore, key: VariableKey) {
    store.variable_mut(key).unwrap().status = true;
}

fn condition(num: u8, key: VariableKey, comparison: Comparison, value: i32) -> Condition {
    Condition {
        num,
        target_type: key.data_type,
        target_num: key.num,
        comparison,
        value,
        status: true,
    }
}

fn action(num: u8, key: VariableKey, kind: ActionType, value: i32) -> Action {
    Action {
        num,
        target_type: key.data_type,
        target_num: key.num,
        action: kind,
        value,
        status: true,
    }
}

fn rule(num: u8, condition_id: u8, action_id: u8) -> Rule {
    Rule {
        num,
        use_condition_group: false,
        condition_source_id: condition_id,
        use_action_group: false,
        action_target_id: action_id,
        status: true,
    }
}

#[test]
fn test_sequence_order_drives_side_effects() {
    let mut store = AutomationStore::with_defaults();
    activate(&mut store, SHARED);
    // Always true: SoftIO 1 is never set
    store.conditions[0] = condition(1, SHARED, Comparison::IsFalse, 0);
    store.actions[0] = action(1, SHARED, ActionType::Increment, 1);
    store.actions[1] = action(2, SHARED, ActionType::SetValue, 5);
    store.rules[0] = rule(1, 1, 1);
    store.rules[1] = rule(2, 1, 2);
    store.rule_sequence = RuleSequence::from_ids(&[2, 1]);

    RuleEngine::new().tick(&mut store);
    assert_eq!(store.variable(SHARED).unwrap().value, 6);

    // Reversed order: increment first, then overwrite
    store.variable_mut(SHARED).unwrap().value = 0;
    store.rule_sequence = RuleSequence::from_ids(&[1, 2]);
    RuleEngine::new().tick(&mut store);
    assert_eq!(store.variable(SHARED).unwrap().value, 5);
}

#[test]
fn test_repeated_ticks_are_deterministic() {
    let mut store = AutomationStore::with_defaults();
    activate(&mut store, SHARED);
    let out = VariableKey::new(DataType::SoftIo, 2);
    activate(&mut store, out);
    store.conditions[0] = condition(1, SHARED, Comparison::IsFalse, 0);
    store.actions[0] = action(1, out, ActionType::SetValue, 42);
    store.actions[1] = action(2, out, ActionType::Set, 0);
    store.action_groups[0] = ActionGroup {
        num: 1,
        members: [1, 2, 0, 0, 0, 0, 0, 0, 0, 0],
        status: true,
    };
    store.rules[0] = Rule {
        use_action_group: true,
        ..rule(1, 1, 1)
    };

    let mut engine = RuleEngine::new();
    engine.tick(&mut store);
    let after_first = store.clone();
    for _ in 0..5 {
        engine.tick(&mut store);
        assert_eq!(store, after_first);
    }
    assert_eq!(engine.ticks(), 6);
    let var = store.variable(out).unwrap();
    assert!(var.state);
    assert_eq!(var.value, 42);
}

#[test]
fn test_dangling_condition_source_is_false() {
    let mut store = AutomationStore::with_defaults();
    activate(&mut store, SHARED);
    store.actions[0] = action(1, SHARED, ActionType::SetValue, 9);
    // Condition 200 does not exist; condition group 99 does not exist
    store.rules[0] = rule(1, 200, 1);
    store.rules[1] = Rule {
        use_condition_group: true,
        ..rule(2, 99, 1)
    };
    let before = store.clone();

    let report = RuleEngine::new().tick(&mut store);
    assert_eq!(report.rules_evaluated, 2);
    assert_eq!(report.rules_fired, 0);
    assert_eq!(store, before);
}

#[test]
fn test_empty_groups_as_rule_sources() {
    let mut store = AutomationStore::with_defaults();
    activate(&mut store, SHARED);
    store.condition_groups[0] = ConditionGroup {
        num: 1,
        logic: CombineLogic::And,
        status: true,
        ..ConditionGroup::default()
    };
    store.condition_groups[1] = ConditionGroup {
        num: 2,
        logic: CombineLogic::Or,
        status: true,
        ..ConditionGroup::default()
    };
    store.actions[0] = action(1, SHARED, ActionType::Increment, 1);
    store.actions[1] = action(2, SHARED, ActionType::Increment, 100);
    store.rules[0] = Rule {
        use_condition_group: true,
        ..rule(1, 1, 1)
    };
    store.rules[1] = Rule {
        use_condition_group: true,
        ..rule(2, 2, 2)
    };

    RuleEngine::new().tick(&mut store);
    assert_eq!(store.variable(SHARED).unwrap().value, 1);
}

#[test]
fn test_later_rule_sees_earlier_effects_in_same_tick() {
    let mut store = AutomationStore::with_defaults();
    activate(&mut store, SHARED);
    let gate = VariableKey::new(DataType::SoftIo, 2);
    activate(&mut store, gate);
    store.conditions[0] = condition(1, SHARED, Comparison::IsFalse, 0);
    store.conditions[1] = condition(2, gate, Comparison::IsTrue, 0);
    store.actions[0] = action(1, gate, ActionType::Set, 0);
    store.actions[1] = action(2, SHARED, ActionType::SetFlag, 0);
    store.rules[0] = rule(1, 1, 1);
    store.rules[1] = rule(2, 2, 2);

    RuleEngine::new().tick(&mut store);
    assert!(store.variable(SHARED).unwrap().flag);
}

#[test]
fn test_input_edge_drives_output_pin() {
    let mut store = AutomationStore::with_defaults();
    let button = VariableKey::new(DataType::DigitalInput, 1);
    let lamp = VariableKey::new(DataType::DigitalOutput, 1);
    activate(&mut store, lamp);
    {
        let var = store.variable_mut(button).unwrap();
        var.status = true;
        var.mode = at_core::OperationMode::Rising;
    }
    store.conditions[0] = condition(1, button, Comparison::FlagIsTrue, 0);
    store.actions[0] = action(1, lamp, ActionType::Set, 0);
    store.actions[1] = action(2, button, ActionType::Clear, 0);
    store.action_groups[0] = ActionGroup {
        num: 1,
        members: [1, 2, 0, 0, 0, 0, 0, 0, 0, 0],
        status: true,
    };
    store.rules[0] = Rule {
        use_action_group: true,
        ..rule(1, 1, 1)
    };

    let io = SimulatedIo::new();
    let clock = ManualClock::new(0);
    let mut reconciler = IoReconciler::new();
    let mut engine = RuleEngine::new();
    let mut cycle = |store: &mut AutomationStore| {
        reconciler.sample_inputs(store, &io, clock.now_ms());
        engine.tick(store);
        reconciler.drive_outputs(store, &io);
        clock.advance(100);
    };

    cycle(&mut store);
    assert!(!io.digital(27));

    io.set_digital(4, true);
    cycle(&mut store);
    assert!(io.digital(27));
    assert!(!store.variable(button).unwrap().flag);
}
