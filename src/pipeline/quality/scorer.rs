use crate::models::{Dimension, DrillDocument, GameModelId, QaReport, ScoreMap};
use crate::pipeline::normalize::goals_supported_consistent;

/// Minimum trimmed length of a usable title.
pub const MIN_TITLE_CHARS: usize = 8;

/// Minimum trimmed length of a usable description.
pub const MIN_DESCRIPTION_CHARS: usize = 40;

/// Minimum trimmed length of a usable organization text.
pub const MIN_ORGANIZATION_CHARS: usize = 20;

/// Minimum trimmed length of a key detail, when one is given.
pub const MIN_KEY_DETAIL_CHARS: usize = 20;

/// Non-empty coaching points required.
pub const MIN_COACHING_POINTS: usize = 3;

/// Score awarded to a satisfied check.
pub const SCORE_MET: u8 = 5;

/// Default pass threshold for every dimension.
pub const DEFAULT_THRESHOLD: u8 = 4;

/// Per-dimension pass thresholds. The only place thresholds live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaThresholds {
    overrides: ScoreMap,
    default: u8,
}

impl Default for QaThresholds {
    fn default() -> Self {
        Self {
            overrides: ScoreMap::new(),
            default: DEFAULT_THRESHOLD,
        }
    }
}

impl QaThresholds {
    pub fn with_threshold(mut self, dim: Dimension, threshold: u8) -> Self {
        self.overrides.insert(dim, threshold.min(SCORE_MET));
        self
    }

    pub fn get(&self, dim: Dimension) -> u8 {
        self.overrides.get(&dim).copied().unwrap_or(self.default)
    }
}

/// The seven structural checks the scores are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralChecks {
    pub structure: bool,
    pub game_model: bool,
    pub psych: bool,
    pub clarity: bool,
    pub constraints: bool,
}

impl StructuralChecks {
    pub fn evaluate(drill: &DrillDocument) -> Self {
        let title_ok = DrillDocument::text_len(&drill.title) >= MIN_TITLE_CHARS;
        let description_ok =
            DrillDocument::text_len(&drill.description) >= MIN_DESCRIPTION_CHARS;
        let coaching_ok = drill.non_empty_coaching_points() >= MIN_COACHING_POINTS;
        let organization_ok =
            DrillDocument::text_len(&drill.organization) >= MIN_ORGANIZATION_CHARS;
        let key_detail_ok = drill.key_detail.is_none()
            || DrillDocument::text_len(&drill.key_detail) >= MIN_KEY_DETAIL_CHARS;

        let game_model = drill
            .game_model_id
            .as_deref()
            .is_some_and(|id| id.parse::<GameModelId>().is_ok());
        let psych = DrillDocument::text_len(&drill.psych_theme) > 0;
        let constraints = drill
            .goal_mode
            .is_some_and(|mode| goals_supported_consistent(mode, &drill.goals_supported));

        Self {
            structure: title_ok && description_ok && coaching_ok && organization_ok,
            game_model,
            psych,
            clarity: description_ok && coaching_ok && key_detail_ok,
            constraints,
        }
    }

    /// Score for one dimension. `realism` and `safety` follow the
    /// structural check.
    pub fn score(&self, dim: Dimension) -> u8 {
        let (ok, fallback) = match dim {
            Dimension::Structure => (self.structure, 2),
            Dimension::GameModel => (self.game_model, 2),
            Dimension::Psych => (self.psych, 2),
            Dimension::Clarity => (self.clarity, 1),
            Dimension::Realism => (self.structure, 2),
            Dimension::Constraints => (self.constraints, 2),
            Dimension::Safety => (self.structure, 3),
        };
        if ok {
            SCORE_MET
        } else {
            fallback
        }
    }
}

fn remediation(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Structure => {
            "Structure: provide a title (8+ chars), a description (40+ chars), \
             organization (20+ chars) and at least 3 coaching points."
        }
        Dimension::GameModel => {
            "Game model: set gameModelId to one of POSSESSION, PRESSING, TRANSITION, COACHAI."
        }
        Dimension::Psych => "Psych: add a non-empty psychTheme.",
        Dimension::Clarity => {
            "Clarity: description and coaching points must be complete; keyDetail needs 20+ chars."
        }
        Dimension::Realism => "Realism: fix the structural gaps so the drill can be run as written.",
        Dimension::Constraints => {
            "Constraints: goalMode and goalsSupported must both be set and agree."
        }
        Dimension::Safety => "Safety: organization must describe a safe, runnable setup.",
    }
}

/// Score a drill against the default thresholds.
pub fn score(drill: &DrillDocument) -> QaReport {
    score_with_thresholds(drill, &QaThresholds::default())
}

pub fn score_with_thresholds(drill: &DrillDocument, thresholds: &QaThresholds) -> QaReport {
    let checks = StructuralChecks::evaluate(drill);
    let scores: ScoreMap = Dimension::ALL
        .iter()
        .map(|&dim| (dim, checks.score(dim)))
        .collect();

    let failing: Vec<Dimension> = scores
        .iter()
        .filter(|(dim, value)| **value < thresholds.get(**dim))
        .map(|(dim, _)| *dim)
        .collect();
    let pass = failing.is_empty();

    let notes = if pass {
        vec!["QA: strict thresholds met; no remediation needed.".to_string()]
    } else {
        std::iter::once("QA: strict thresholds NOT met.".to_string())
            .chain(failing.iter().map(|dim| remediation(*dim).to_string()))
            .collect()
    };

    QaReport {
        pass,
        scores,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoalMode;

    fn complete_drill() -> DrillDocument {
        DrillDocument {
            title: Some("Third-Man Breakthrough".into()),
            description: Some(
                "Attackers combine through a third man to break a compact back line.".into(),
            ),
            organization: Some("4v3+GK in a 44x35yd area, 90s bouts".into()),
            coaching_points: vec![
                "Scan before receiving".into(),
                "Open body shape".into(),
                "Time the run beyond".into(),
            ],
            game_model_id: Some("POSSESSION".into()),
            psych_theme: Some("Composure".into()),
            goal_mode: Some(GoalMode::Large),
            goals_supported: vec![1],
            ..DrillDocument::default()
        }
    }

    #[test]
    fn complete_drill_passes() {
        let qa = score(&complete_drill());
        assert!(qa.pass);
        assert_eq!(qa.scores.len(), 7);
        assert!(qa.scores.values().all(|&v| v == 5));
        assert_eq!(qa.notes.len(), 1);
        assert!(qa.notes[0].contains("met"));
    }

    #[test]
    fn empty_drill_fails_every_dimension() {
        let qa = score(&DrillDocument::default());
        assert!(!qa.pass);
        assert_eq!(qa.scores[&Dimension::Structure], 2);
        assert_eq!(qa.scores[&Dimension::GameModel], 2);
        assert_eq!(qa.scores[&Dimension::Psych], 2);
        assert_eq!(qa.scores[&Dimension::Realism], 2);
        assert_eq!(qa.scores[&Dimension::Constraints], 2);
        assert_eq!(qa.scores[&Dimension::Safety], 3);
        // key detail absent still leaves clarity failing on description
        assert_eq!(qa.scores[&Dimension::Clarity], 1);
        assert_eq!(qa.notes.len(), 8);
        assert!(qa.notes[0].contains("NOT met"));
    }

    #[test]
    fn notes_follow_dimension_order() {
        let mut drill = complete_drill();
        drill.psych_theme = Some("   ".into());
        drill.game_model_id = Some("TIKI_TAKA".into());
        let qa = score(&drill);
        assert_eq!(qa.notes.len(), 3);
        assert!(qa.notes[1].starts_with("Game model"));
        assert!(qa.notes[2].starts_with("Psych"));
    }

    #[test]
    fn game_model_must_be_an_exact_member() {
        let mut drill = complete_drill();
        drill.game_model_id = Some(" POSSESSION ".into());
        assert_eq!(score(&drill).scores[&Dimension::GameModel], 2);
        drill.game_model_id = Some("possession".into());
        assert_eq!(score(&drill).scores[&Dimension::GameModel], 2);
    }

    #[test]
    fn short_key_detail_hurts_clarity_only() {
        let mut drill = complete_drill();
        drill.key_detail = Some("Be quick".into());
        let qa = score(&drill);
        assert_eq!(qa.scores[&Dimension::Clarity], 1);
        assert_eq!(qa.scores[&Dimension::Structure], 5);
        assert!(!qa.pass);
    }

    #[test]
    fn whitespace_coaching_points_do_not_count() {
        let mut drill = complete_drill();
        drill.coaching_points[2] = "  ".into();
        let qa = score(&drill);
        assert_eq!(qa.scores[&Dimension::Structure], 2);
        assert_eq!(qa.scores[&Dimension::Safety], 3);
    }

    #[test]
    fn inconsistent_goals_supported_fails_constraints() {
        let mut drill = complete_drill();
        drill.goals_supported = vec![2];
        assert_eq!(score(&drill).scores[&Dimension::Constraints], 2);
        drill.goal_mode = None;
        drill.goals_supported = vec![1];
        assert_eq!(score(&drill).scores[&Dimension::Constraints], 2);
    }

    #[test]
    fn thresholds_are_configurable_per_dimension() {
        let mut drill = complete_drill();
        drill.coaching_points.clear();
        let strict = score(&drill);
        assert!(!strict.pass);

        let lenient = QaThresholds::default()
            .with_threshold(Dimension::Structure, 2)
            .with_threshold(Dimension::Clarity, 1)
            .with_threshold(Dimension::Realism, 2)
            .with_threshold(Dimension::Safety, 3);
        assert!(score_with_thresholds(&drill, &lenient).pass);
    }

    #[test]
    fn scoring_does_not_mutate() {
        let drill = complete_drill();
        let before = drill.clone();
        score(&drill);
        assert_eq!(drill, before);
    }
}
