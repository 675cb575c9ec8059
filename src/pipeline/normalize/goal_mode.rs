use crate::models::GoalMode;

/// Map the number of goals available to the canonical goal mode.
///
/// Total over all integers: anything below one is a no-goal game, exactly
/// one is a full-size goal with a keeper, two or more collapse to mini-goals.
pub fn decide_goal_mode(goals_available: i64) -> GoalMode {
    match goals_available {
        i64::MIN..=0 => GoalMode::NoGoal,
        1 => GoalMode::Large,
        _ => GoalMode::Mini2,
    }
}

/// `goalsSupported` value stored alongside a normalized drill.
pub fn derive_goals_supported(mode: GoalMode) -> Vec<i64> {
    vec![mode.goal_count()]
}

/// A goals-supported list agrees with a mode when it is non-empty and
/// every entry equals the mode's goal count.
pub fn goals_supported_consistent(mode: GoalMode, supported: &[i64]) -> bool {
    !supported.is_empty() && supported.iter().all(|&g| g == mode.goal_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(decide_goal_mode(0), GoalMode::NoGoal);
        assert_eq!(decide_goal_mode(1), GoalMode::Large);
        assert_eq!(decide_goal_mode(2), GoalMode::Mini2);
    }

    #[test]
    fn negative_and_huge_values_stay_in_range() {
        assert_eq!(decide_goal_mode(-5), GoalMode::NoGoal);
        assert_eq!(decide_goal_mode(i64::MIN), GoalMode::NoGoal);
        assert_eq!(decide_goal_mode(7), GoalMode::Mini2);
        assert_eq!(decide_goal_mode(i64::MAX), GoalMode::Mini2);
    }

    #[test]
    fn monotone_over_a_range() {
        let mut last = decide_goal_mode(-100).goal_count();
        for g in -99..100 {
            let current = decide_goal_mode(g).goal_count();
            assert!(current >= last, "mode went backwards at {g}");
            last = current;
        }
    }

    #[test]
    fn goals_supported_matches_mode() {
        assert_eq!(derive_goals_supported(GoalMode::Large), vec![1]);
        assert_eq!(derive_goals_supported(GoalMode::Mini2), vec![2]);
        assert_eq!(derive_goals_supported(GoalMode::NoGoal), vec![0]);
    }

    #[test]
    fn consistency_check() {
        assert!(goals_supported_consistent(GoalMode::Large, &[1]));
        assert!(!goals_supported_consistent(GoalMode::Large, &[1, 2]));
        assert!(!goals_supported_consistent(GoalMode::Mini2, &[]));
        assert!(goals_supported_consistent(GoalMode::NoGoal, &[0]));
    }
}
