//! Dropdown option list model.

use serde::{Deserialize, Serialize};

/// A named category of selectable values, e.g. `unit_type` or
/// `maintenance_category`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionList {
    pub category: String,
    pub values: Vec<String>,
}
