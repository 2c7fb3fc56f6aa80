use serde::{Deserialize, Serialize};

/// Prefix of labels that place an issue on a board column.
pub const STATUS_PREFIX: &str = "status:";

/// Prefix of labels naming the department an issue belongs to.
pub const DEPARTMENT_PREFIX: &str = "dept:";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Label {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            color: color.to_string(),
            description: None,
        }
    }

    pub fn is_status(&self) -> bool {
        self.name.starts_with(STATUS_PREFIX)
    }

    pub fn is_department(&self) -> bool {
        self.name.starts_with(DEPARTMENT_PREFIX)
    }

    /// Department name without the `dept:` prefix.
    pub fn department_name(&self) -> Option<&str> {
        self.name.strip_prefix(DEPARTMENT_PREFIX)
    }
}
