use crate::models::{Diagram, GoalMode, Team};

/// Label of the goalkeeper team entry.
pub const GOALKEEPER_LABEL: &str = "GK";

/// Color given to a synthesized goalkeeper entry.
pub const GOALKEEPER_COLOR: &str = "green";

/// Labels the generator uses for a goalkeeper entry.
pub fn is_goalkeeper_label(label: &str) -> bool {
    matches!(
        label.trim().to_lowercase().as_str(),
        "gk" | "gks" | "goalkeeper" | "goalkeepers" | "keeper" | "keepers" | "goalie" | "goalies"
    )
}

/// Bring `teams` and `mini_goals` in line with the goal mode.
///
/// Blank-label entries are dropped. With a full-size goal the first
/// goalkeeper-like entry is kept (relabelled "GK", count 1) and any others
/// removed; a synthetic one is appended if none exists. Without one, every
/// goalkeeper-like entry is removed. Other entries keep their order.
pub fn enforce_diagram(diagram: &mut Diagram, mode: GoalMode) {
    diagram.mini_goals = mode.mini_goals();

    let keep_keeper = mode.requires_goalkeeper();
    let mut keeper_kept = false;

    diagram.teams.retain_mut(|team| {
        if team.label.trim().is_empty() {
            return false;
        }
        if !is_goalkeeper_label(&team.label) {
            return true;
        }
        if keep_keeper && !keeper_kept {
            keeper_kept = true;
            team.label = GOALKEEPER_LABEL.to_string();
            team.count = 1;
            if team.color.trim().is_empty() {
                team.color = GOALKEEPER_COLOR.to_string();
            }
            return true;
        }
        false
    });

    if keep_keeper && !keeper_kept {
        diagram
            .teams
            .push(Team::new(GOALKEEPER_LABEL, GOALKEEPER_COLOR, 1));
    }
}

/// Whether a diagram satisfies the goal-mode invariants.
pub fn diagram_matches_mode(diagram: &Diagram, mode: GoalMode) -> bool {
    let gk_entries = diagram
        .teams
        .iter()
        .filter(|t| t.label == GOALKEEPER_LABEL)
        .count();
    let gk_like = diagram
        .teams
        .iter()
        .filter(|t| is_goalkeeper_label(&t.label))
        .count();

    match mode {
        GoalMode::Large => diagram.mini_goals == 0 && gk_entries == 1 && gk_like == 1,
        GoalMode::Mini2 => diagram.mini_goals == 2 && gk_like == 0,
        GoalMode::NoGoal => diagram.mini_goals == 0 && gk_like == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(label: &str, color: &str, count: u32) -> Team {
        Team::new(label, color, count)
    }

    fn labels(diagram: &Diagram) -> Vec<&str> {
        diagram.teams.iter().map(|t| t.label.as_str()).collect()
    }

    fn garbled() -> Diagram {
        Diagram {
            teams: vec![
                team("GK", "green", 1),
                team("Attack", "blue", 4),
                team("goalkeeper", "yellow", 2),
                team("", "red", 3),
                team("Defend", "red", 3),
                team("Gk", "green", 1),
            ],
            mini_goals: 7,
            ..Diagram::default()
        }
    }

    #[test]
    fn large_mode_inserts_single_gk() {
        let mut diagram = Diagram {
            teams: vec![team("Attack", "blue", 4), team("Defend", "red", 3)],
            mini_goals: 2,
            ..Diagram::default()
        };
        enforce_diagram(&mut diagram, GoalMode::Large);
        assert_eq!(diagram.mini_goals, 0);
        assert_eq!(labels(&diagram), vec!["Attack", "Defend", "GK"]);
        let gk = &diagram.teams[2];
        assert_eq!(gk.color, GOALKEEPER_COLOR);
        assert_eq!(gk.count, 1);
    }

    #[test]
    fn large_mode_collapses_duplicate_keepers() {
        let mut diagram = garbled();
        enforce_diagram(&mut diagram, GoalMode::Large);
        assert_eq!(labels(&diagram), vec!["GK", "Attack", "Defend"]);
        assert!(diagram_matches_mode(&diagram, GoalMode::Large));
    }

    #[test]
    fn large_mode_relabels_goalkeeper_entry() {
        let mut diagram = Diagram {
            teams: vec![team("Goalkeeper", "orange", 2)],
            ..Diagram::default()
        };
        enforce_diagram(&mut diagram, GoalMode::Large);
        assert_eq!(diagram.teams, vec![team("GK", "orange", 1)]);
    }

    #[test]
    fn mini2_mode_removes_every_keeper() {
        let mut diagram = garbled();
        enforce_diagram(&mut diagram, GoalMode::Mini2);
        assert_eq!(diagram.mini_goals, 2);
        assert_eq!(labels(&diagram), vec!["Attack", "Defend"]);
        assert!(diagram_matches_mode(&diagram, GoalMode::Mini2));
    }

    #[test]
    fn no_goal_mode_zeroes_minis_and_removes_keepers() {
        let mut diagram = garbled();
        enforce_diagram(&mut diagram, GoalMode::NoGoal);
        assert_eq!(diagram.mini_goals, 0);
        assert!(diagram_matches_mode(&diagram, GoalMode::NoGoal));
    }

    #[test]
    fn outfield_counts_are_not_rebalanced() {
        let mut diagram = Diagram {
            teams: vec![team("Attack", "blue", 9), team("Defend", "red", 1)],
            ..Diagram::default()
        };
        enforce_diagram(&mut diagram, GoalMode::Mini2);
        assert_eq!(diagram.teams[0].count, 9);
        assert_eq!(diagram.teams[1].count, 1);
    }

    #[test]
    fn enforcement_is_idempotent_for_every_mode() {
        for mode in GoalMode::ALL {
            let mut once = garbled();
            enforce_diagram(&mut once, *mode);
            let mut twice = once.clone();
            enforce_diagram(&mut twice, *mode);
            assert_eq!(once, twice, "not idempotent for {mode}");
        }
    }

    #[test]
    fn invariants_hold_after_switching_modes() {
        for from in GoalMode::ALL {
            for to in GoalMode::ALL {
                let mut diagram = garbled();
                enforce_diagram(&mut diagram, *from);
                enforce_diagram(&mut diagram, *to);
                assert!(diagram_matches_mode(&diagram, *to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn opaque_fields_pass_through() {
        let mut diagram = Diagram::default();
        diagram
            .extra
            .insert("pitch".into(), serde_json::json!("CUSTOM"));
        enforce_diagram(&mut diagram, GoalMode::Large);
        assert_eq!(diagram.extra["pitch"], "CUSTOM");
    }
}
