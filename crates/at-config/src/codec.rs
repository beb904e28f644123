//! Configuration document codec
//!
//! The document is a single JSON object with one key for device settings
//! and one per table:
//!
//! ```json
//! {
//!   "deviceSettings":  {"SSID": "..", "PASS": "..", "DeviceName": "..", "run": false},
//!   "ioVariables":     [{"n": 1, "t": 0, "g": 4, "m": 0, "nm": "..", "st": false, "v": 0, "f": false, "s": false}],
//!   "conditions":      [{"cn": 1, "t": 3, "tn": 1, "cp": 0, "v": 0, "s": true}],
//!   "conditionGroups": [{"n": 1, "ca": [1, 2, 0, 0, 0, 0, 0, 0, 0, 0], "l": 0, "s": true}],
//!   "actions":         [{"an": 1, "t": 1, "tn": 1, "a": 0, "v": 0, "s": true}],
//!   "actionGroups":    [{"n": 1, "ar": [1, 0, 0, 0, 0, 0, 0, 0, 0, 0], "s": true}],
//!   "rules":           [{"n": 1, "cg": false, "ci": 1, "ag": false, "ai": 1, "s": true}],
//!   "ruleSequence":    [1, 2, 3]
//! }
//! ```
//!
//! Encoding always writes every table in full. Decoding overwrites tables in
//! place by array position and keeps the current value of any field that is
//! missing or malformed, so a document carrying only `deviceSettings` leaves
//! every table alone.

use at_core::{
    Action, ActionGroup, Condition, ConditionGroup, DeviceSettings, IoVariable, Rule, WireEnum,
    MAX_ACTIONS_PER_GROUP, MAX_CONDITIONS_PER_GROUP, MAX_RULES,
};
use at_store::AutomationStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::fallback::{field, field_enum, field_label, member_ids, Object};

pub const DEVICE_SETTINGS: &str = "deviceSettings";
pub const IO_VARIABLES: &str = "ioVariables";
pub const CONDITIONS: &str = "conditions";
pub const CONDITION_GROUPS: &str = "conditionGroups";
pub const ACTIONS: &str = "actions";
pub const ACTION_GROUPS: &str = "actionGroups";
pub const RULES: &str = "rules";
pub const RULE_SEQUENCE: &str = "ruleSequence";

// --- Encoding ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    device_settings: DeviceDoc<'a>,
    io_variables: Vec<VariableDoc<'a>>,
    conditions: Vec<ConditionDoc>,
    condition_groups: Vec<ConditionGroupDoc>,
    actions: Vec<ActionDoc>,
    action_groups: Vec<ActionGroupDoc>,
    rules: Vec<RuleDoc>,
    rule_sequence: &'a [u8],
}

#[derive(Serialize)]
struct DeviceDoc<'a> {
    #[serde(rename = "SSID")]
    ssid: &'a str,
    #[serde(rename = "PASS")]
    password: &'a str,
    #[serde(rename = "DeviceName")]
    device_name: &'a str,
    run: bool,
}

impl<'a> From<&'a DeviceSettings> for DeviceDoc<'a> {
    fn from(d: &'a DeviceSettings) -> Self {
        Self {
            ssid: &d.ssid,
            password: &d.password,
            device_name: &d.device_name,
            run: d.run,
        }
    }
}

#[derive(Serialize)]
struct VariableDoc<'a> {
    n: u8,
    t: u8,
    g: u8,
    m: u8,
    nm: &'a str,
    st: bool,
    v: i32,
    f: bool,
    s: bool,
}

impl<'a> From<&'a IoVariable> for VariableDoc<'a> {
    fn from(var: &'a IoVariable) -> Self {
        Self {
            n: var.num,
            t: var.data_type.to_wire(),
            g: var.gpio,
            m: var.mode.to_wire(),
            nm: &var.name,
            st: var.state,
            v: var.value,
            f: var.flag,
            s: var.status,
        }
    }
}

#[derive(Serialize)]
struct ConditionDoc {
    cn: u8,
    t: u8,
    tn: u8,
    cp: u8,
    v: i32,
    s: bool,
}

impl From<&Condition> for ConditionDoc {
    fn from(c: &Condition) -> Self {
        Self {
            cn: c.num,
            t: c.target_type.to_wire(),
            tn: c.target_num,
            cp: c.comparison.to_wire(),
            v: c.value,
            s: c.status,
        }
    }
}

#[derive(Serialize)]
struct ConditionGroupDoc {
    n: u8,
    ca: [u8; MAX_CONDITIONS_PER_GROUP],
    l: u8,
    s: bool,
}

impl From<&ConditionGroup> for ConditionGroupDoc {
    fn from(g: &ConditionGroup) -> Self {
        Self {
            n: g.num,
            ca: g.members,
            l: g.logic.to_wire(),
            s: g.status,
        }
    }
}

#[derive(Serialize)]
struct ActionDoc {
    an: u8,
    t: u8,
    tn: u8,
    a: u8,
    v: i32,
    s: bool,
}

impl From<&Action> for ActionDoc {
    fn from(a: &Action) -> Self {
        Self {
            an: a.num,
            t: a.target_type.to_wire(),
            tn: a.target_num,
            a: a.action.to_wire(),
            v: a.value,
            s: a.status,
        }
    }
}

#[derive(Serialize)]
struct ActionGroupDoc {
    n: u8,
    ar: [u8; MAX_ACTIONS_PER_GROUP],
    s: bool,
}

impl From<&ActionGroup> for ActionGroupDoc {
    fn from(g: &ActionGroup) -> Self {
        Self {
            n: g.num,
            ar: g.members,
            s: g.status,
        }
    }
}

#[derive(Serialize)]
struct RuleDoc {
    n: u8,
    cg: bool,
    ci: u8,
    ag: bool,
    ai: u8,
    s: bool,
}

impl From<&Rule> for RuleDoc {
    fn from(r: &Rule) -> Self {
        Self {
            n: r.num,
            cg: r.use_condition_group,
            ci: r.condition_source_id,
            ag: r.use_action_group,
            ai: r.action_target_id,
            s: r.status,
        }
    }
}

/// Serialize the whole store into one document
pub fn encode(store: &AutomationStore) -> serde_json::Result<Vec<u8>> {
    let document = Document {
        device_settings: DeviceDoc::from(&store.device),
        io_variables: store.variables.iter().map(VariableDoc::from).collect(),
        conditions: store.conditions.iter().map(ConditionDoc::from).collect(),
        condition_groups: store
            .condition_groups
            .iter()
            .map(ConditionGroupDoc::from)
            .collect(),
        actions: store.actions.iter().map(ActionDoc::from).collect(),
        action_groups: store.action_groups.iter().map(ActionGroupDoc::from).collect(),
        rules: store.rules.iter().map(RuleDoc::from).collect(),
        rule_sequence: store.rule_sequence.as_slice(),
    };
    serde_json::to_vec(&document)
}

// --- Decoding ---

/// What a [`decode`] call did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Whether the input parsed as JSON at all
    pub valid_json: bool,
    /// Top-level keys that were present with the right shape and applied
    pub applied: Vec<&'static str>,
    /// Array items beyond table capacity that were ignored
    pub dropped: usize,
}

impl DecodeReport {
    pub fn was_applied(&self, section: &str) -> bool {
        self.applied.iter().any(|s| *s == section)
    }
}

/// Overwrite the store from a document
///
/// Never fails. Malformed JSON is treated as a document with no keys and
/// leaves the store untouched. The returned report lets callers be
/// stricter.
pub fn decode(store: &mut AutomationStore, bytes: &[u8]) -> DecodeReport {
    let mut report = DecodeReport::default();
    let root = match serde_json::from_slice::<Value>(bytes) {
        Ok(root) => {
            report.valid_json = true;
            root
        }
        Err(err) => {
            warn!(%err, "Malformed configuration document, keeping current values");
            Value::Null
        }
    };
    let Some(root) = root.as_object() else {
        return report;
    };

    if let Some(obj) = root.get(DEVICE_SETTINGS).and_then(Value::as_object) {
        apply_device(&mut store.device, obj);
        report.applied.push(DEVICE_SETTINGS);
    }

    decode_table(root, IO_VARIABLES, &mut store.variables, &mut report, apply_variable);
    decode_table(root, CONDITIONS, &mut store.conditions, &mut report, apply_condition);
    decode_table(
        root,
        CONDITION_GROUPS,
        &mut store.condition_groups,
        &mut report,
        apply_condition_group,
    );
    decode_table(root, ACTIONS, &mut store.actions, &mut report, apply_action);
    decode_table(
        root,
        ACTION_GROUPS,
        &mut store.action_groups,
        &mut report,
        apply_action_group,
    );
    decode_table(root, RULES, &mut store.rules, &mut report, apply_rule);

    if let Some(ids) = root.get(RULE_SEQUENCE).and_then(Value::as_array) {
        for position in 0..MAX_RULES {
            match ids.get(position) {
                // Non-integers normalise to the position default
                Some(id) => store.rule_sequence.set(position, id.as_i64().unwrap_or(0)),
                None => store.rule_sequence.reset(position),
            }
        }
        note_overflow(RULE_SEQUENCE, ids.len(), MAX_RULES, &mut report);
        report.applied.push(RULE_SEQUENCE);
    }

    debug!(
        applied = ?report.applied,
        dropped = report.dropped,
        "Configuration document decoded"
    );
    report
}

/// Apply array items to table slots by position
///
/// Items that are not objects take their slot but change nothing.
fn decode_table<T>(
    root: &Object,
    key: &'static str,
    table: &mut [T],
    report: &mut DecodeReport,
    apply: impl Fn(&mut T, &Object),
) {
    let Some(items) = root.get(key).and_then(Value::as_array) else {
        return;
    };
    for (slot, item) in table.iter_mut().zip(items) {
        if let Some(obj) = item.as_object() {
            apply(slot, obj);
        }
    }
    note_overflow(key, items.len(), table.len(), report);
    report.applied.push(key);
}

fn note_overflow(key: &str, incoming: usize, capacity: usize, report: &mut DecodeReport) {
    if incoming > capacity {
        let dropped = incoming - capacity;
        warn!(section = key, incoming, capacity, dropped, "Items beyond capacity ignored");
        report.dropped += dropped;
    }
}

fn apply_device(device: &mut DeviceSettings, obj: &Object) {
    device.ssid = field_label(obj, "SSID", &device.ssid);
    device.password = field_label(obj, "PASS", &device.password);
    device.device_name = field_label(obj, "DeviceName", &device.device_name);
    device.run = field(obj, "run", device.run);
}

fn apply_variable(var: &mut IoVariable, obj: &Object) {
    var.num = field(obj, "n", var.num);
    var.data_type = field_enum(obj, "t", var.data_type);
    var.gpio = field(obj, "g", var.gpio);
    var.mode = field_enum(obj, "m", var.mode);
    var.name = field_label(obj, "nm", &var.name);
    var.state = field(obj, "st", var.state);
    var.value = field(obj, "v", var.value);
    var.flag = field(obj, "f", var.flag);
    var.status = field(obj, "s", var.status);
}

fn apply_condition(c: &mut Condition, obj: &Object) {
    c.num = field(obj, "cn", c.num);
    c.target_type = field_enum(obj, "t", c.target_type);
    c.target_num = field(obj, "tn", c.target_num);
    c.comparison = field_enum(obj, "cp", c.comparison);
    c.value = field(obj, "v", c.value);
    c.status = field(obj, "s", c.status);
}

fn apply_condition_group(g: &mut ConditionGroup, obj: &Object) {
    g.num = field(obj, "n", g.num);
    g.members = member_ids(obj.get("ca"));
    g.logic = field_enum(obj, "l", g.logic);
    g.status = field(obj, "s", g.status);
}

fn apply_action(a: &mut Action, obj: &Object) {
    a.num = field(obj, "an", a.num);
    a.target_type = field_enum(obj, "t", a.target_type);
    a.target_num = field(obj, "tn", a.target_num);
    a.action = field_enum(obj, "a", a.action);
    a.value = field(obj, "v", a.value);
    a.status = field(obj, "s", a.status);
}

fn apply_action_group(g: &mut ActionGroup, obj: &Object) {
    g.num = field(obj, "n", g.num);
    g.members = member_ids(obj.get("ar"));
    g.status = field(obj, "s", g.status);
}

fn apply_rule(r: &mut Rule, obj: &Object) {
    r.num = field(obj, "n", r.num);
    r.use_condition_group = field(obj, "cg", r.use_condition_group);
    r.condition_source_id = field(obj, "ci", r.condition_source_id);
    r.use_action_group = field(obj, "ag", r.use_action_group);
    r.action_target_id = field(obj, "ai", r.action_target_id);
    r.status = field(obj, "s", r.status);
}
