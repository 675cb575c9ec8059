use std::sync::Arc;

use serde_json::{json, Value};

use super::parser::parse_drill_response;
use super::prompt::{
    build_drill_prompt, build_fixer_prompt, DRILL_SYSTEM_PROMPT, FIXER_SYSTEM_PROMPT,
};
use super::types::{DrillStore, GenerationOutcome, LlmClient, SaveReceipt};
use super::GenerationError;
use crate::models::{DrillDocument, DrillRequest, FixDecisionCode, GoalPolicy, QaReport};
use crate::pipeline::normalize::{apply_youth_guards, has_goalkeeper_point, normalize_drill};
use crate::pipeline::quality::{assess, FixDecision, QaThresholds};
use crate::pipeline_config::PipelineConfig;

const GK_COACHING_POINT: &str =
    "GK: starting position and communication on cutbacks (angle/near-post, claim vs. set).";

/// Runs one drill request end to end:
/// prompt → model → parse → youth guards → defaults → normalize → score →
/// decide → (regenerate | patch) → persist.
pub struct DrillGenerator {
    llm: Box<dyn LlmClient + Send + Sync>,
    store: Option<Arc<dyn DrillStore + Send + Sync>>,
    config: PipelineConfig,
    thresholds: QaThresholds,
}

/// A drill after the engine ran on it.
struct Assessed {
    drill: DrillDocument,
    qa: QaReport,
    decision: FixDecision,
}

impl DrillGenerator {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, config: PipelineConfig) -> Self {
        Self {
            llm,
            store: None,
            config,
            thresholds: QaThresholds::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DrillStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_thresholds(mut self, thresholds: QaThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Models the underlying client can use.
    pub fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        self.llm.list_models()
    }

    pub fn generate(&self, request: &DrillRequest) -> Result<GenerationOutcome, GenerationError> {
        let _span = tracing::info_span!(
            "generate_drill",
            age_group = %request.age_group,
            goals = request.goals(),
            fast = self.config.fast_mode
        )
        .entered();
        let policy = request.policy();

        let (mut current, attempts, patched) = if self.config.fast_mode {
            let mut drill = stub_drill(request);
            (self.run_engine(&mut drill, request, &policy), 0, false)
        } else {
            let (current, attempts) = self.generate_fresh(request, &policy)?;
            self.maybe_patch(current, request, &policy, attempts)
        };

        current.drill.qa = Some(current.qa.clone());
        let saved = self.persist(&current.drill)?;

        tracing::info!(
            decision = %current.decision.code,
            pass = current.qa.pass,
            attempts,
            patched,
            saved = saved.is_some(),
            "Drill generation complete"
        );

        Ok(GenerationOutcome {
            drill: current.drill,
            qa: current.qa,
            decision: current.decision,
            saved,
            attempts,
            patched,
        })
    }

    /// Generate from scratch, regenerating while the decision is
    /// `NEEDS_REGEN` and attempts remain.
    fn generate_fresh(
        &self,
        request: &DrillRequest,
        policy: &GoalPolicy,
    ) -> Result<(Assessed, u32), GenerationError> {
        let prompt = build_drill_prompt(request);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let text = self.llm.generate(&prompt, DRILL_SYSTEM_PROMPT)?;
            let mut drill = DrillDocument::try_from(parse_drill_response(&text)?)?;
            apply_youth_guards(&mut drill, &request.age_group, request.goals());
            let assessed = self.run_engine(&mut drill, request, policy);

            let regen = assessed.decision.code == FixDecisionCode::NeedsRegen;
            if regen && attempts <= self.config.max_regen_attempts {
                tracing::warn!(
                    attempt = attempts,
                    scores = ?assessed.qa.scores,
                    "Drill needs regeneration"
                );
                continue;
            }
            return Ok((assessed, attempts));
        }
    }

    /// One fixer round for a `PATCHABLE` drill. The patched version is kept
    /// only if its decision is no worse. Fixer failures keep the original.
    fn maybe_patch(
        &self,
        current: Assessed,
        request: &DrillRequest,
        policy: &GoalPolicy,
        attempts: u32,
    ) -> (Assessed, u32, bool) {
        if !self.config.auto_patch || current.decision.code != FixDecisionCode::Patchable {
            return (current, attempts, false);
        }

        let prompt = build_fixer_prompt(&current.drill, &current.qa, request);
        let patched = self
            .llm
            .generate(&prompt, FIXER_SYSTEM_PROMPT)
            .and_then(|text| parse_drill_response(&text))
            .and_then(|value| DrillDocument::try_from(value).map_err(GenerationError::from));

        match patched {
            Ok(mut drill) => {
                let candidate = self.run_engine(&mut drill, request, policy);
                if candidate.decision.code.severity() <= current.decision.code.severity() {
                    tracing::info!(decision = %candidate.decision.code, "Patched drill accepted");
                    (candidate, attempts, true)
                } else {
                    tracing::warn!(
                        decision = %candidate.decision.code,
                        "Patched drill scored worse, keeping original"
                    );
                    (current, attempts, false)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Drill fixer failed, keeping original");
                (current, attempts, false)
            }
        }
    }

    fn run_engine(
        &self,
        drill: &mut DrillDocument,
        request: &DrillRequest,
        policy: &GoalPolicy,
    ) -> Assessed {
        apply_request_defaults(drill, request);
        normalize_drill(drill, policy);
        let (qa, decision) = assess(drill, &self.thresholds);
        Assessed {
            drill: drill.clone(),
            qa,
            decision,
        }
    }

    fn persist(&self, drill: &DrillDocument) -> Result<Option<SaveReceipt>, GenerationError> {
        if !self.config.persist {
            return Ok(None);
        }
        let Some(store) = &self.store else {
            tracing::warn!("Persistence enabled but no drill store configured");
            return Ok(None);
        };
        let id = store.save(drill)?;
        tracing::info!(drill_id = %id, "Drill saved");
        Ok(Some(SaveReceipt { saved: true, id }))
    }
}

/// Fill fields the model left out from the request, and add a GK coaching
/// point when a goal is available.
pub fn apply_request_defaults(drill: &mut DrillDocument, request: &DrillRequest) {
    if request.goals() >= 1 && !has_goalkeeper_point(&drill.coaching_points) {
        drill.coaching_points.push(GK_COACHING_POINT.to_string());
    }

    let numbers = drill
        .extra
        .entry("numbers")
        .or_insert_with(|| json!({}));
    if !numbers.is_object() {
        *numbers = json!({});
    }
    if let Some(obj) = numbers.as_object_mut() {
        if !obj.get("min").is_some_and(Value::is_number) {
            obj.insert("min".into(), json!(request.numbers_min));
        }
        if !obj.get("max").is_some_and(Value::is_number) {
            obj.insert("max".into(), json!(request.numbers_max));
        }
    }

    if drill.game_model_id.is_none() {
        drill.game_model_id = request.game_model_id.clone();
    }
    for (key, value) in [
        ("phase", json!(request.phase)),
        ("zone", json!(request.zone)),
        ("ageGroup", json!(request.age_group)),
        ("durationMin", json!(request.duration_min)),
    ] {
        drill.extra.entry(key).or_insert(value);
    }
}

/// Deterministic drill used in fast mode instead of a model call.
pub fn stub_drill(request: &DrillRequest) -> DrillDocument {
    DrillDocument {
        title: Some("Fast Stub: Third-Man Combination".into()),
        description: Some(
            "Deterministic stub drill. Attackers combine through a third man to \
             break a compact line and finish."
                .into(),
        ),
        organization: Some(format!(
            "{}-{} players in a {} area, {} minutes.",
            request.numbers_min, request.numbers_max, request.space_constraint, request.duration_min
        )),
        coaching_points: vec![
            "Scan before receiving".into(),
            "Open body shape to play forward".into(),
            "Time the third-man run".into(),
        ],
        progression: vec!["Limit attackers to two touches".into()],
        game_model_id: Some(
            request
                .game_model_id
                .clone()
                .unwrap_or_else(|| "COACHAI".into()),
        ),
        psych_theme: Some("Composure under pressure".into()),
        ..DrillDocument::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseError;
    use crate::models::GoalMode;
    use crate::pipeline::generation::MockLlmClient;
    use std::sync::Mutex;

    const GOOD_DRILL: &str = r#"```json
{
  "title": "Third-Man Breakthrough",
  "description": "Attackers combine through a third man to break a compact back line and finish.",
  "organization": "4v3 in a 30x25 yard area with two lines of cones",
  "coachingPoints": ["Scan early", "Open body shape", "Time the run beyond"],
  "psychTheme": "Composure",
  "gameModelId": "POSSESSION",
  "equipment": ["Footballs", "Pinnies", "Pop-up goals"],
  "diagram": {"teams": [{"label": "Attack", "color": "blue", "count": 4}]}
}
```"#;

    // psych missing: scores 5 except psych = 2
    const WEAK_DRILL: &str = r#"{
  "title": "Third-Man Breakthrough",
  "description": "Attackers combine through a third man to break a compact back line and finish.",
  "organization": "4v3 in a 30x25 yard area with two lines of cones",
  "coachingPoints": ["Scan early", "Open body shape", "Time the run beyond"],
  "gameModelId": "POSSESSION"
}"#;

    struct RecordingStore {
        saved: Mutex<Vec<DrillDocument>>,
    }

    impl DrillStore for RecordingStore {
        fn save(&self, drill: &DrillDocument) -> Result<String, DatabaseError> {
            let mut saved = self.saved.lock().unwrap();
            saved.push(drill.clone());
            Ok(format!("drill-{}", saved.len()))
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn request(goals: i64) -> DrillRequest {
        DrillRequest {
            age_group: "U15".into(),
            goals_available: Some(goals),
            ..DrillRequest::default()
        }
    }

    #[test]
    fn good_drill_is_normalized_scored_and_accepted() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new(GOOD_DRILL)), config());
        let outcome = generator.generate(&request(2)).unwrap();

        assert_eq!(outcome.decision.code, FixDecisionCode::Ok);
        assert!(outcome.qa.pass);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.drill.goal_mode, Some(GoalMode::Mini2));
        assert_eq!(outcome.drill.diagram.mini_goals, 2);
        assert!(outcome.drill.equipment.contains(&"2 Mini-goals".to_string()));
        assert_eq!(outcome.drill.qa.as_ref(), Some(&outcome.qa));
        assert!(outcome.saved.is_none());
    }

    #[test]
    fn gk_point_and_request_defaults_are_added() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new(GOOD_DRILL)), config());
        let outcome = generator.generate(&request(1)).unwrap();
        let drill = &outcome.drill;

        assert!(has_goalkeeper_point(&drill.coaching_points));
        assert_eq!(drill.extra["numbers"]["min"], 10);
        assert_eq!(drill.extra["phase"], "ATTACKING");
        assert_eq!(drill.extra["ageGroup"], "U15");
        assert!(drill.diagram.teams.iter().any(|t| t.label == "GK"));
    }

    #[test]
    fn needs_regen_triggers_one_fresh_attempt() {
        let llm = MockLlmClient::with_script(vec![WEAK_DRILL, GOOD_DRILL]);
        let generator = DrillGenerator::new(Box::new(llm), config());
        let outcome = generator.generate(&request(1)).unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.decision.code, FixDecisionCode::Ok);
    }

    #[test]
    fn regeneration_is_bounded() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new(WEAK_DRILL)), config());
        let outcome = generator.generate(&request(1)).unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.decision.code, FixDecisionCode::NeedsRegen);
        assert!(!outcome.qa.pass);
    }

    #[test]
    fn fixer_failure_keeps_original() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new("not json")), config());
        let mut drill = stub_drill(&request(1));
        let mut current = generator.run_engine(&mut drill, &request(1), &request(1).policy());
        current.decision.code = FixDecisionCode::Patchable;
        let (kept, _, patched) =
            generator.maybe_patch(current, &request(1), &request(1).policy(), 1);
        assert!(!patched);
        assert_eq!(kept.drill.title.as_deref(), Some("Fast Stub: Third-Man Combination"));
    }

    #[test]
    fn patched_drill_replaces_original_when_no_worse() {
        let llm = MockLlmClient::new(GOOD_DRILL);
        let generator = DrillGenerator::new(Box::new(llm), config());
        let mut drill = stub_drill(&request(1));
        let mut current = generator.run_engine(&mut drill, &request(1), &request(1).policy());
        current.decision.code = FixDecisionCode::Patchable;
        let (kept, _, patched) =
            generator.maybe_patch(current, &request(1), &request(1).policy(), 1);
        assert!(patched);
        assert_eq!(kept.drill.title.as_deref(), Some("Third-Man Breakthrough"));
        assert_eq!(kept.drill.goal_mode, Some(GoalMode::Large));
    }

    #[test]
    fn auto_patch_off_skips_fixer() {
        let cfg = PipelineConfig {
            auto_patch: false,
            ..config()
        };
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new(GOOD_DRILL)), cfg);
        let mut drill = stub_drill(&request(1));
        let mut current = generator.run_engine(&mut drill, &request(1), &request(1).policy());
        current.decision.code = FixDecisionCode::Patchable;
        let (_, _, patched) = generator.maybe_patch(current, &request(1), &request(1).policy(), 1);
        assert!(!patched);
    }

    #[test]
    fn non_json_reply_is_an_error() {
        let generator =
            DrillGenerator::new(Box::new(MockLlmClient::new("I can't do that")), config());
        assert!(matches!(
            generator.generate(&request(1)),
            Err(GenerationError::NonJsonDrill)
        ));
    }

    #[test]
    fn non_object_reply_is_a_shape_error() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new("[1, 2, 3]")), config());
        assert!(matches!(
            generator.generate(&request(1)),
            Err(GenerationError::Shape(_))
        ));
    }

    #[test]
    fn model_failure_propagates() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::failing("down")), config());
        assert!(matches!(
            generator.generate(&request(1)),
            Err(GenerationError::Connection(_))
        ));
    }

    #[test]
    fn fast_mode_skips_the_model() {
        let cfg = PipelineConfig {
            fast_mode: true,
            ..config()
        };
        let generator = DrillGenerator::new(Box::new(MockLlmClient::failing("unused")), cfg);
        let outcome = generator.generate(&request(1)).unwrap();
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.decision.code, FixDecisionCode::Ok);
        assert_eq!(
            outcome.drill.equipment,
            vec!["Cones", "Bibs (2 colors)", "Soccer balls", "1 Full-size goal"]
        );
    }

    #[test]
    fn persistence_uses_the_store() {
        let store = Arc::new(RecordingStore {
            saved: Mutex::new(Vec::new()),
        });
        let cfg = PipelineConfig {
            persist: true,
            fast_mode: true,
            ..config()
        };
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new("")), cfg)
            .with_store(store.clone());
        let outcome = generator.generate(&request(2)).unwrap();

        assert_eq!(
            outcome.saved,
            Some(SaveReceipt {
                saved: true,
                id: "drill-1".into()
            })
        );
        let saved = store.saved.lock().unwrap();
        assert!(saved[0].qa.is_some());
        assert_eq!(saved[0].goal_mode, Some(GoalMode::Mini2));
    }

    #[test]
    fn youth_request_gets_youth_format() {
        let generator = DrillGenerator::new(Box::new(MockLlmClient::new(GOOD_DRILL)), config());
        let req = DrillRequest {
            age_group: "U11".into(),
            goals_available: Some(1),
            ..DrillRequest::default()
        };
        let outcome = generator.generate(&req).unwrap();
        let labels: Vec<&str> = outcome
            .drill
            .diagram
            .teams
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Attack", "Defend", "GK"]);
        assert_eq!(outcome.drill.diagram.extra["pitch"], "CUSTOM");
    }

    #[test]
    fn request_defaults_keep_model_values() {
        let mut drill = DrillDocument::try_from(json!({
            "numbers": {"min": 6, "max": "lots"},
            "phase": "DEFENDING",
            "gameModelId": "PRESSING",
            "coachingPoints": ["Goalkeeper: set early"]
        }))
        .unwrap();
        apply_request_defaults(&mut drill, &request(1));
        assert_eq!(drill.extra["numbers"]["min"], 6);
        assert_eq!(drill.extra["numbers"]["max"], 12);
        assert_eq!(drill.extra["phase"], "DEFENDING");
        assert_eq!(drill.game_model_id.as_deref(), Some("PRESSING"));
        assert_eq!(drill.coaching_points.len(), 1);
    }
}
