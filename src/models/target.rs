//! Polymorphic target references used by califications, witnesses and files

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::EventHubError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Event,
    Activity,
    User,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Event => "Event",
            TargetKind::Activity => "Activity",
            TargetKind::User => "User",
        }
    }
}

impl FromStr for TargetKind {
    type Err = EventHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "event" => Ok(TargetKind::Event),
            "activity" => Ok(TargetKind::Activity),
            "user" => Ok(TargetKind::User),
            _ => Err(EventHubError::validation(format!("Invalid target model: {}", s))),
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{kind, id}` pair, written as `{"target": id, "targetModel": kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(rename = "targetModel")]
    pub kind: TargetKind,
    #[serde(rename = "target")]
    pub id: Uuid,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn event(id: Uuid) -> Self {
        Self::new(TargetKind::Event, id)
    }

    pub fn activity(id: Uuid) -> Self {
        Self::new(TargetKind::Activity, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_ref_wire_names() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(TargetRef::event(id)).unwrap();
        assert_eq!(value["targetModel"], "Event");
        assert_eq!(value["target"], id.to_string());
    }

    #[test]
    fn test_target_kind_parse() {
        assert_eq!("Activity".parse::<TargetKind>().unwrap(), TargetKind::Activity);
        assert_eq!("event".parse::<TargetKind>().unwrap(), TargetKind::Event);
        assert!("Ticket".parse::<TargetKind>().is_err());
    }
}
