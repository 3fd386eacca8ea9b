use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied optimization weights, carried opaquely.
///
/// The rule-based scorer ignores them; they are forwarded verbatim to the
/// external optimizer and recorded in the plan's `aiModelInfo.parameters` so
/// the plan documents what the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningConstraints(pub Value);

impl PlanningConstraints {
    pub fn as_value(&self) -> Value {
        self.0.clone()
    }
}
