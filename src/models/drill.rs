use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::enums::{Dimension, GoalMode};
use crate::pipeline::normalize::NormalizeError;

/// Per-dimension 0–5 scores, iterated in the fixed dimension order.
pub type ScoreMap = BTreeMap<Dimension, u8>;

/// One team entry of a drill diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub label: String,
    pub color: String,
    pub count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Team {
    pub fn new(label: &str, color: &str, count: u32) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            count,
            extra: Map::new(),
        }
    }

    /// Lenient conversion: non-object entries are rejected, wrongly-typed
    /// fields fall back to empty/zero.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut extra = obj.clone();
        let label = take_string(&mut extra, "label").unwrap_or_default();
        let color = take_string(&mut extra, "color").unwrap_or_default();
        let count = extra
            .remove("count")
            .and_then(|v| v.as_u64())
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0);
        Some(Self {
            label,
            color,
            count,
            extra,
        })
    }
}

/// The diagram substructure. `teams` and `mini_goals` carry goal-mode
/// invariants; everything else is opaque and passes through.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub teams: Vec<Team>,
    pub mini_goals: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Diagram {
    fn from_map(map: &Map<String, Value>) -> Self {
        let mut extra = map.clone();
        let teams = match extra.remove("teams") {
            Some(Value::Array(items)) => items.iter().filter_map(Team::from_value).collect(),
            _ => Vec::new(),
        };
        let mini_goals = extra
            .remove("miniGoals")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Self {
            teams,
            mini_goals,
            extra,
        }
    }
}

/// QA block attached to a scored drill.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QaReport {
    pub pass: bool,
    pub scores: ScoreMap,
    pub notes: Vec<String>,
}

impl QaReport {
    /// Read a QA block produced elsewhere (a reviewer, a client). Missing or
    /// non-numeric scores are skipped.
    pub fn from_value(value: &Value) -> Self {
        let pass = value.get("pass").and_then(Value::as_bool).unwrap_or(false);
        let scores = value.get("scores").map(scores_from_value).unwrap_or_default();
        let notes = value
            .get("notes")
            .map(string_list)
            .unwrap_or_default();
        Self {
            pass,
            scores,
            notes,
        }
    }

    /// Mean of all present scores, `None` when there are none.
    pub fn average(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: u32 = self.scores.values().map(|&v| u32::from(v)).sum();
        Some(f64::from(total) / self.scores.len() as f64)
    }
}

/// Extract a score map from a JSON object keyed by dimension name.
/// Values are clamped to 0..=5; fractional values are truncated.
pub fn scores_from_value(value: &Value) -> ScoreMap {
    let mut scores = ScoreMap::new();
    let Some(obj) = value.as_object() else {
        return scores;
    };
    for dim in Dimension::ALL {
        let Some(raw) = obj.get(dim.as_str()).and_then(Value::as_f64) else {
            continue;
        };
        if raw.is_finite() {
            scores.insert(*dim, raw.clamp(0.0, 5.0) as u8);
        }
    }
    scores
}

/// A training drill as produced by the generator and resolved by
/// normalization. Optional text fields distinguish absent (`None`) from
/// present-but-empty (`Some("")`); unknown fields survive in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub coaching_points: Vec<String>,
    pub progression: Vec<String>,
    pub constraints: Vec<String>,
    pub equipment: Vec<String>,
    pub goal_mode: Option<GoalMode>,
    pub goals_supported: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psych_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_detail: Option<String>,
    pub diagram: Diagram,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa: Option<QaReport>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrillDocument {
    /// Trimmed character length of a text field; absent counts as zero.
    pub fn text_len(field: &Option<String>) -> usize {
        field.as_deref().map_or(0, |s| s.trim().chars().count())
    }

    /// Coaching points that contain something other than whitespace.
    pub fn non_empty_coaching_points(&self) -> usize {
        self.coaching_points
            .iter()
            .filter(|p| !p.trim().is_empty())
            .count()
    }

    /// Serialize into the storage/wire JSON shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl TryFrom<Value> for DrillDocument {
    type Error = NormalizeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut obj = match value {
            Value::Object(map) => map,
            other => return Err(NormalizeError::NotAnObject(json_kind(&other).to_string())),
        };

        let diagram = match obj.remove("diagram") {
            None | Some(Value::Null) => Diagram::default(),
            Some(Value::Object(map)) => Diagram::from_map(&map),
            Some(other) => {
                return Err(NormalizeError::InvalidContainer {
                    field: "diagram",
                    expected: "object",
                    found: json_kind(&other).to_string(),
                })
            }
        };

        let game_model_id =
            take_string(&mut obj, "gameModelId").or_else(|| take_string(&mut obj, "gameModel"));
        let goal_mode = obj
            .remove("goalMode")
            .and_then(|v| v.as_str().and_then(|s| s.parse::<GoalMode>().ok()));
        let goals_supported = obj
            .remove("goalsSupported")
            .and_then(|v| match v {
                Value::Array(items) => Some(items.iter().filter_map(Value::as_i64).collect()),
                _ => None,
            })
            .unwrap_or_default();
        let qa = obj
            .remove("qa")
            .filter(Value::is_object)
            .map(|v| QaReport::from_value(&v));

        Ok(Self {
            title: take_string(&mut obj, "title"),
            description: take_string(&mut obj, "description"),
            organization: take_string(&mut obj, "organization"),
            coaching_points: take_list(&mut obj, "coachingPoints"),
            progression: take_list(&mut obj, "progression"),
            constraints: take_list(&mut obj, "constraints"),
            equipment: take_list(&mut obj, "equipment"),
            goal_mode,
            goals_supported,
            game_model_id,
            psych_theme: take_string(&mut obj, "psychTheme"),
            key_detail: take_string(&mut obj, "keyDetail"),
            diagram,
            qa,
            extra: obj,
        })
    }
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_list(obj: &mut Map<String, Value>, key: &str) -> Vec<String> {
    obj.remove(key).as_ref().map(string_list).unwrap_or_default()
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
