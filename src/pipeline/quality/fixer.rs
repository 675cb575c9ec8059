use serde::Serialize;

use crate::models::{FixDecisionCode, ScoreMap};

/// Scores at or below this value invalidate the whole drill.
pub const REGEN_MAX_SCORE: u8 = 2;

/// Every dimension at or above this value means no fix is needed.
pub const OK_MIN_SCORE: u8 = 4;

/// What the orchestrator should do with a scored drill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixDecision {
    pub code: FixDecisionCode,
    pub reason: String,
}

/// One planned step in a fix report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixAction {
    pub code: FixDecisionCode,
    pub reason: String,
}

/// Outcome of `fix_drill`. The drill itself is never changed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    pub decision: FixDecision,
    pub actions: Vec<FixAction>,
    pub fixed: bool,
}

/// Classify a score set. Looks only at the scores, never at `pass`.
///
/// Rules apply in order: no scores, any score <= 2, all scores >= 4,
/// otherwise patchable.
pub fn decide_fix(scores: &ScoreMap) -> FixDecision {
    let (Some(min), Some(max)) = (scores.values().min(), scores.values().max()) else {
        return FixDecision {
            code: FixDecisionCode::NoQaOrPass,
            reason: "No QA scores present; fixer is a no-op except for logging / metadata."
                .into(),
        };
    };

    if *min <= REGEN_MAX_SCORE {
        return FixDecision {
            code: FixDecisionCode::NeedsRegen,
            reason: format!(
                "At least one QA dimension is <={REGEN_MAX_SCORE}; treat as hard fail, full regeneration required."
            ),
        };
    }

    if *min >= OK_MIN_SCORE {
        return FixDecision {
            code: FixDecisionCode::Ok,
            reason: format!("All QA dimensions are >={OK_MIN_SCORE}; no fixer needed."),
        };
    }

    let reason = if scores.values().any(|&v| v == 3) {
        "All QA dimensions are >=3 but at least one = 3; patchable with targeted fixes.".to_string()
    } else {
        format!("Scores in [{min}, {max}]; treat as patchable with targeted fixes.")
    };
    FixDecision {
        code: FixDecisionCode::Patchable,
        reason,
    }
}

/// Plan fixes for a drill's QA scores without touching the drill.
pub fn fix_drill(scores: &ScoreMap) -> FixReport {
    let decision = decide_fix(scores);
    let reason = match decision.code {
        FixDecisionCode::NeedsRegen => {
            "At least one QA dimension is <=2; recommend regenerating the drill instead of auto-fix."
        }
        FixDecisionCode::Patchable => "Safe to apply localized text / constraint fixes via LLM.",
        FixDecisionCode::Ok => "Drill quality is high; no fixer mutations needed.",
        FixDecisionCode::NoQaOrPass => "No usable QA scores; fixer is effectively a no-op.",
    };
    let actions = vec![FixAction {
        code: decision.code,
        reason: reason.to_string(),
    }];

    FixReport {
        decision,
        actions,
        fixed: false,
    }
}
