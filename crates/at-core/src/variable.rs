//! I/O variable type and its addressing key

use std::fmt;

use crate::wire::{DataType, OperationMode};
use crate::MAX_LABEL_LEN;

/// Address of a variable: its type plus its number within that type
///
/// This pair is the only stable identity of a variable. The slot a variable
/// occupies in the registry is a storage detail and may change across reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableKey {
    pub data_type: DataType,
    pub num: u8,
}

impl VariableKey {
    pub fn new(data_type: DataType, num: u8) -> Self {
        Self { data_type, num }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.data_type, self.num)
    }
}

/// A typed I/O point or internal variable with its runtime state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoVariable {
    /// Number within its type, 1-based
    pub num: u8,
    pub data_type: DataType,
    /// Hardware pin; 0 when the variable is not physical
    pub gpio: u8,
    pub mode: OperationMode,
    /// Display label, at most [`MAX_LABEL_LEN`] bytes
    pub name: String,

    // Runtime state
    pub state: bool,
    pub value: i32,
    pub flag: bool,

    /// Whether this definition is active
    pub status: bool,
}

impl IoVariable {
    /// Create an inactive variable with zeroed runtime state
    pub fn new(data_type: DataType, num: u8, gpio: u8, name: &str) -> Self {
        Self {
            num,
            data_type,
            gpio,
            mode: OperationMode::None,
            name: truncate_label(name),
            state: false,
            value: 0,
            flag: false,
            status: false,
        }
    }

    /// Builder: set the operation mode
    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Address of this variable
    pub fn key(&self) -> VariableKey {
        VariableKey::new(self.data_type, self.num)
    }

    /// Whether this variable answers to `key`
    ///
    /// Number 0 never addresses anything.
    pub fn matches(&self, key: VariableKey) -> bool {
        key.num != 0 && self.num == key.num && self.data_type == key.data_type
    }

    /// Clear state, value and flag
    pub fn clear_runtime(&mut self) {
        self.state = false;
        self.value = 0;
        self.flag = false;
    }
}

/// Bound a label to [`MAX_LABEL_LEN`] bytes without splitting a character
pub fn truncate_label(label: &str) -> String {
    if label.len() <= MAX_LABEL_LEN {
        return label.to_string();
    }
    let mut end = MAX_LABEL_LEN;
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    label[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_variable_is_inactive() {
        let var = IoVariable::new(DataType::SoftIo, 3, 0, "Soft IO 3");
        assert!(!var.status);
        assert!(!var.state);
        assert_eq!(var.value, 0);
        assert_eq!(var.key(), VariableKey::new(DataType::SoftIo, 3));
    }

    #[test]
    fn test_matches_requires_type_and_number() {
        let var = IoVariable::new(DataType::DigitalInput, 2, 4, "Digital Input 2");
        assert!(var.matches(VariableKey::new(DataType::DigitalInput, 2)));
        assert!(!var.matches(VariableKey::new(DataType::DigitalOutput, 2)));
        assert!(!var.matches(VariableKey::new(DataType::DigitalInput, 1)));
    }

    #[test]
    fn test_zero_never_matches() {
        let var = IoVariable::new(DataType::Timer, 0, 0, "unnumbered");
        assert!(!var.matches(VariableKey::new(DataType::Timer, 0)));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Timer 1"), "Timer 1");
        let long = "a".repeat(40);
        assert_eq!(truncate_label(&long).len(), MAX_LABEL_LEN);

        // 'é' is two bytes; byte 29 falls inside the 15th one
        let accented = "é".repeat(20);
        let cut = truncate_label(&accented);
        assert_eq!(cut.len(), 28);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_key_display() {
        let key = VariableKey::new(DataType::AnalogInput, 4);
        assert_eq!(key.to_string(), "Analog Input 4");
    }
}
