use serde::{Deserialize, Serialize};

/// A top-level content category, identified by a stable slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    /// Display name, the uppercased id unless explicitly supplied.
    pub name: String,
}

impl Subject {
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = id.to_uppercase();
        Self { id, name }
    }
}
