use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::enums::GameModelId;

/// Caller-supplied policy input for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalPolicy {
    /// `None` when the caller sent nothing usable; treated as zero goals.
    pub goals_available: Option<i64>,
    pub game_model_id: Option<GameModelId>,
}

impl GoalPolicy {
    pub fn new(goals_available: i64) -> Self {
        Self {
            goals_available: Some(goals_available),
            game_model_id: None,
        }
    }

    /// Read `goalsAvailable` / `gameModelId` from a loosely-shaped body.
    /// Non-integer values are ignored.
    pub fn from_value(value: &Value) -> Self {
        Self {
            goals_available: value.get("goalsAvailable").and_then(integer_goals),
            game_model_id: value
                .get("gameModelId")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn goals(&self) -> i64 {
        self.goals_available.unwrap_or(0)
    }
}

/// Generation request, originally the body of `POST /ai/generate-drill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillRequest {
    #[serde(default)]
    pub game_model_id: Option<String>,
    #[serde(default = "default_age_group")]
    pub age_group: String,
    #[serde(default = "default_phase")]
    pub phase: String,
    #[serde(default = "default_zone")]
    pub zone: String,
    #[serde(default = "default_numbers_min")]
    pub numbers_min: u32,
    #[serde(default = "default_numbers_max")]
    pub numbers_max: u32,
    #[serde(default = "default_space_constraint")]
    pub space_constraint: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub goals_available: Option<i64>,
    #[serde(default)]
    pub gk_optional: bool,
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
}

impl Default for DrillRequest {
    fn default() -> Self {
        Self {
            game_model_id: None,
            age_group: default_age_group(),
            phase: default_phase(),
            zone: default_zone(),
            numbers_min: default_numbers_min(),
            numbers_max: default_numbers_max(),
            space_constraint: default_space_constraint(),
            goals_available: None,
            gk_optional: false,
            duration_min: default_duration_min(),
        }
    }
}

impl DrillRequest {
    pub fn policy(&self) -> GoalPolicy {
        GoalPolicy {
            goals_available: self.goals_available,
            game_model_id: self
                .game_model_id
                .as_deref()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn goals(&self) -> i64 {
        self.goals_available.unwrap_or(0)
    }
}

fn default_age_group() -> String {
    "U12".into()
}

fn default_phase() -> String {
    "ATTACKING".into()
}

fn default_zone() -> String {
    "ATTACKING_THIRD".into()
}

fn default_numbers_min() -> u32 {
    10
}

fn default_numbers_max() -> u32 {
    12
}

fn default_space_constraint() -> String {
    "HALF".into()
}

fn default_duration_min() -> u32 {
    20
}

/// Accept any JSON for an integer field; keep it only if it is an integer.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_goals(&value))
}

/// Integer value of a goals field. Integers above `i64::MAX` saturate so
/// they still count as "two or more".
fn integer_goals(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
}
