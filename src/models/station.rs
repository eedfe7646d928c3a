// Base station identity from the entity directory

use serde::{Deserialize, Serialize};

/// Station lifecycle; serializes to lowercase JSON (e.g. "active").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Active,
    Maintenance,
    #[serde(other)]
    Offline,
}

impl LifecycleStatus {
    /// Parse from the directory's status string. Anything unrecognised counts as offline.
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "active" => LifecycleStatus::Active,
            "maintenance" => LifecycleStatus::Maintenance,
            _ => LifecycleStatus::Offline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "active",
            LifecycleStatus::Maintenance => "maintenance",
            LifecycleStatus::Offline => "offline",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    pub location: String,
    pub lifecycle: LifecycleStatus,
}
