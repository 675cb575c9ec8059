pub mod fixer;
pub mod scorer;

pub use fixer::*;
pub use scorer::*;

use crate::models::{DrillDocument, QaReport};

/// Score a drill and classify the result in one step.
pub fn assess(drill: &DrillDocument, thresholds: &QaThresholds) -> (QaReport, FixDecision) {
    let qa = score_with_thresholds(drill, thresholds);
    let decision = decide_fix(&qa.scores);
    (qa, decision)
}
