//! Definition state of a path
//!
//! What exists at and beneath a path, mirroring the vendor's `$DATA`
//! codes 0, 1, 10 and 11.

use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefinitionState {
    /// Nothing at or beneath the path
    Undefined,
    /// A value at the path, nothing beneath it
    ValueOnly,
    /// Entries beneath the path, no value at it
    ChildrenOnly,
    /// Both a value at the path and entries beneath it
    ValueAndChildren,
}

impl DefinitionState {
    /// Build the state from its two components
    pub fn from_parts(has_value: bool, has_children: bool) -> Self {
        match (has_value, has_children) {
            (false, false) => DefinitionState::Undefined,
            (true, false) => DefinitionState::ValueOnly,
            (false, true) => DefinitionState::ChildrenOnly,
            (true, true) => DefinitionState::ValueAndChildren,
        }
    }

    /// The vendor `isDefined` return code
    pub fn code(&self) -> u8 {
        match self {
            DefinitionState::Undefined => 0,
            DefinitionState::ValueOnly => 1,
            DefinitionState::ChildrenOnly => 10,
            DefinitionState::ValueAndChildren => 11,
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self, DefinitionState::ValueOnly | DefinitionState::ValueAndChildren)
    }

    pub fn has_children(&self) -> bool {
        matches!(self, DefinitionState::ChildrenOnly | DefinitionState::ValueAndChildren)
    }

    /// Anything stored at or beneath the path
    pub fn is_defined(&self) -> bool {
        *self != DefinitionState::Undefined
    }
}

impl fmt::Display for DefinitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionState::Undefined => "undefined",
            DefinitionState::ValueOnly => "value only",
            DefinitionState::ChildrenOnly => "children only",
            DefinitionState::ValueAndChildren => "value and children",
        };
        write!(f, "{}", name)
    }
}
