pub mod diagram;
pub mod equipment;
pub mod goal_mode;
pub mod youth;

pub use diagram::*;
pub use equipment::*;
pub use goal_mode::*;
pub use youth::*;

use thiserror::Error;

use crate::models::{DrillDocument, GoalMode, GoalPolicy};

/// Input-shape errors. Quality problems are never errors; they end up as
/// low scores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Drill document must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Drill field '{field}' must be {expected}, got {found}")]
    InvalidContainer {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Resolve every goal-dependent field of a drill in one pass: goal mode,
/// goals supported, diagram and equipment. Any `goalMode` the generator
/// supplied is overwritten.
pub fn normalize_drill(drill: &mut DrillDocument, policy: &GoalPolicy) -> GoalMode {
    let mode = decide_goal_mode(policy.goals());

    drill.goal_mode = Some(mode);
    drill.goals_supported = derive_goals_supported(mode);
    enforce_diagram(&mut drill.diagram, mode);
    drill.equipment = canonicalize_equipment(&drill.equipment, mode);

    if drill.game_model_id.is_none() {
        if let Some(id) = policy.game_model_id {
            drill.game_model_id = Some(id.as_str().to_string());
        }
    }

    tracing::debug!(
        goal_mode = %mode,
        mini_goals = drill.diagram.mini_goals,
        teams = drill.diagram.teams.len(),
        equipment = ?drill.equipment,
        "Drill normalized"
    );

    mode
}

/// Whether a drill already satisfies every goal-mode invariant.
pub fn is_normalized(drill: &DrillDocument) -> bool {
    let Some(mode) = drill.goal_mode else {
        return false;
    };
    goals_supported_consistent(mode, &drill.goals_supported)
        && diagram_matches_mode(&drill.diagram, mode)
        && equipment_matches_mode(&drill.equipment, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> DrillDocument {
        DrillDocument::try_from(value).unwrap()
    }

    #[test]
    fn full_size_goal_path() {
        let mut drill = parse(json!({
            "equipment": ["Footballs", "Team bibs", "Cones or disc markers"],
            "diagram": {"teams": []}
        }));
        let mode = normalize_drill(&mut drill, &GoalPolicy::new(1));

        assert_eq!(mode, GoalMode::Large);
        assert_eq!(drill.goal_mode, Some(GoalMode::Large));
        assert_eq!(drill.diagram.mini_goals, 0);
        assert_eq!(
            drill.diagram.teams.iter().filter(|t| t.label == "GK").count(),
            1
        );
        for item in ["Soccer balls", "Bibs (2 colors)", "Cones", "1 Full-size goal"] {
            assert!(drill.equipment.iter().any(|e| e == item), "missing {item}");
        }
        assert!(drill
            .equipment
            .iter()
            .all(|e| !e.to_lowercase().contains("mini-goal")));
        assert_eq!(drill.goals_supported, vec![1]);
    }

    #[test]
    fn mini_goal_path() {
        let mut drill = parse(json!({
            "equipment": ["Pinnies", "Cones/Discs"],
            "diagram": {"teams": [{"label": "GK", "count": 1}]}
        }));
        normalize_drill(&mut drill, &GoalPolicy::new(2));

        assert_eq!(drill.goal_mode, Some(GoalMode::Mini2));
        assert_eq!(drill.diagram.mini_goals, 2);
        assert!(drill.diagram.teams.iter().all(|t| t.label != "GK"));
        assert!(drill.equipment.iter().any(|e| e == "2 Mini-goals"));
        assert!(drill
            .equipment
            .iter()
            .all(|e| !e.to_lowercase().contains("full-size")));
    }

    #[test]
    fn no_goal_path() {
        let mut drill = parse(json!({
            "equipment": ["1 Full-size goal", "2 mini goals"],
            "diagram": {"teams": [{"label": "GK", "count": 1}], "miniGoals": 2}
        }));
        normalize_drill(&mut drill, &GoalPolicy::new(0));

        assert_eq!(drill.goal_mode, Some(GoalMode::NoGoal));
        assert_eq!(drill.diagram.mini_goals, 0);
        assert!(drill.diagram.teams.is_empty());
        assert_eq!(drill.equipment, vec!["Cones", "Bibs (2 colors)", "Soccer balls"]);
        assert_eq!(drill.goals_supported, vec![0]);
    }

    #[test]
    fn missing_goals_available_is_no_goal() {
        let mut drill = DrillDocument::default();
        let mode = normalize_drill(&mut drill, &GoalPolicy::default());
        assert_eq!(mode, GoalMode::NoGoal);
    }

    #[test]
    fn untrusted_goal_mode_is_overwritten() {
        let mut drill = parse(json!({"goalMode": "MINI2", "goalsSupported": [2]}));
        normalize_drill(&mut drill, &GoalPolicy::new(1));
        assert_eq!(drill.goal_mode, Some(GoalMode::Large));
        assert_eq!(drill.goals_supported, vec![1]);
    }

    #[test]
    fn policy_game_model_fills_missing_id() {
        let mut drill = DrillDocument::default();
        let policy = GoalPolicy::from_value(&json!({"goalsAvailable": 1, "gameModelId": "PRESSING"}));
        normalize_drill(&mut drill, &policy);
        assert_eq!(drill.game_model_id.as_deref(), Some("PRESSING"));

        let mut drill = parse(json!({"gameModelId": "POSSESSION"}));
        normalize_drill(&mut drill, &policy);
        assert_eq!(drill.game_model_id.as_deref(), Some("POSSESSION"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for goals in [0, 1, 2] {
            let mut once = parse(json!({
                "equipment": ["Goals", "pugg goals", "balls", "Ladder"],
                "diagram": {"teams": [{"label": "Keeper", "count": 2}], "miniGoals": 5}
            }));
            normalize_drill(&mut once, &GoalPolicy::new(goals));
            assert!(is_normalized(&once));
            let mut twice = once.clone();
            normalize_drill(&mut twice, &GoalPolicy::new(goals));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn raw_generator_output_is_not_normalized() {
        assert!(!is_normalized(&DrillDocument::default()));
    }

    #[test]
    fn suffixed_goal_mentions_break_normalized_state() {
        let mut drill = parse(json!({"equipment": ["Mini-goalposts", "Cones"]}));
        normalize_drill(&mut drill, &GoalPolicy::new(1));
        assert!(is_normalized(&drill));
        assert!(!drill.equipment.iter().any(|e| e.contains("Mini")));

        drill.equipment.push("Mini-goalposts".into());
        assert!(!is_normalized(&drill));
    }
}
