//! Enumerations with a fixed integer wire encoding
//!
//! The configuration document stores every enum as its declaration index.
//! Each enum here carries an explicit table mapping variant <-> integer, and
//! decoding an integer outside the table is an error instead of a cast.

use std::fmt;
use thiserror::Error;

/// Error for an integer that has no variant in a wire table
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{value} is not a valid {kind} code")]
pub struct WireError {
    pub kind: &'static str,
    pub value: i64,
}

/// Bidirectional mapping between an enum and its wire integer
pub trait WireEnum: Copy + Sized + 'static {
    /// Type name used in error messages
    const KIND: &'static str;

    /// Every variant paired with its wire integer, in declaration order
    const TABLE: &'static [(Self, u8)];

    /// Wire integer for this variant
    fn to_wire(self) -> u8;

    /// Variant for a wire integer, if the integer is in the table
    fn from_wire(value: i64) -> Result<Self, WireError> {
        Self::TABLE
            .iter()
            .find(|(_, code)| i64::from(*code) == value)
            .map(|(variant, _)| *variant)
            .ok_or(WireError {
                kind: Self::KIND,
                value,
            })
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl WireEnum for $name {
            const KIND: &'static str = $kind;
            const TABLE: &'static [(Self, u8)] = &[ $( ($name::$variant, $code), )+ ];

            fn to_wire(self) -> u8 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }
        }

        impl TryFrom<i64> for $name {
            type Error = WireError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                <$name as WireEnum>::from_wire(value)
            }
        }
    };
}

wire_enum! {
    /// Kind of I/O point or internal variable
    DataType, "data type" {
        DigitalInput = 0,
        DigitalOutput = 1,
        AnalogInput = 2,
        SoftIo = 3,
        Timer = 4,
    }
}

wire_enum! {
    /// Behavioral modifier; its meaning depends on the variable's type
    OperationMode, "operation mode" {
        /// No modifier
        None = 0,
        /// Latch the flag on a low-to-high edge (digital input)
        Rising = 1,
        /// Latch the flag on a high-to-low edge (digital input)
        Falling = 2,
        /// Latch the flag on any edge (digital input)
        StateChange = 3,
        /// Drive the pin high for a single tick (digital output)
        Pulse = 4,
        /// Stop after expiring once (timer)
        OneShot = 5,
        /// Restart after expiring (timer)
        Repeating = 6,
        /// Map the raw reading into 0..=100 (analog input)
        Scaled = 7,
        /// Keep runtime state across reboot (soft I/O)
        Persistent = 8,
    }
}

wire_enum! {
    /// Test a condition applies to its target variable
    Comparison, "comparison" {
        IsTrue = 0,
        IsFalse = 1,
        IsEqual = 2,
        IsLess = 3,
        IsGreater = 4,
        FlagIsTrue = 5,
        FlagIsFalse = 6,
    }
}

wire_enum! {
    /// Mutation an action applies to its target variable
    ActionType, "action type" {
        Set = 0,
        Reset = 1,
        SetValue = 2,
        Increment = 3,
        Decrement = 4,
        SetFlag = 5,
        Clear = 6,
    }
}

wire_enum! {
    /// How a condition group folds its members
    CombineLogic, "combine logic" {
        And = 0,
        Or = 1,
    }
}

impl DataType {
    /// Human-readable label used for default variable names
    pub fn label(self) -> &'static str {
        match self {
            DataType::DigitalInput => "Digital Input",
            DataType::DigitalOutput => "Digital Output",
            DataType::AnalogInput => "Analog Input",
            DataType::SoftIo => "Soft IO",
            DataType::Timer => "Timer",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::DigitalInput
    }
}

impl Default for OperationMode {
    fn default() -> Self {
        OperationMode::None
    }
}

impl Default for Comparison {
    fn default() -> Self {
        Comparison::IsTrue
    }
}

impl Default for ActionType {
    fn default() -> Self {
        ActionType::Set
    }
}

impl Default for CombineLogic {
    fn default() -> Self {
        CombineLogic::And
    }
}
