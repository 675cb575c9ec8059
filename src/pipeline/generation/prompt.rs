use crate::models::{DrillDocument, DrillRequest, QaReport};

/// System prompt for drill generation.
pub const DRILL_SYSTEM_PROMPT: &str = "You are COACH-AI-GENERATOR, a UEFA A-licensed coach \
with expertise in youth development (U9-U18), sport science (work:rest, load), sport psychology \
(focus cues, emotional regulation), tactical periodization and game model alignment \
(POSSESSION, PRESSING, TRANSITION, COACHAI universal model). You answer with JSON only.";

/// System prompt for the drill fixer.
pub const FIXER_SYSTEM_PROMPT: &str =
    "You are a UEFA A-License coach and drill editor. You answer with JSON only, no markdown.";

const DEFAULT_GAME_MODEL: &str = "COACHAI";

fn game_model(request: &DrillRequest) -> &str {
    request
        .game_model_id
        .as_deref()
        .unwrap_or(DEFAULT_GAME_MODEL)
}

/// Build the generation prompt for one drill.
pub fn build_drill_prompt(request: &DrillRequest) -> String {
    let goals = request.goals();
    let gk_rule = if goals >= 1 {
        "goalsAvailable >= 1: include a GK coaching point."
    } else {
        "goalsAvailable = 0: no GK."
    };

    format!(
        r#"### OBJECTIVE
Generate a *single* elite-quality soccer training drill as **pure JSON** only.

### REQUIREMENTS (STRICT)
1. Title: short, vivid, tactical, not generic (e.g. "Third-Man Breakthrough in the Half-Space").
2. Description: 2-4 sentences, crystal clear, outcome-driven.
3. Organization: exact setup, numbers, spacing, constraints, triggers, scoring.
4. Coaching Points: 4-7 items, specific & actionable.
5. Progression: 1-2 ways to increase challenge.
6. Psych Theme: REQUIRED, aligned with age group and game model
   (POSSESSION: scanning, patience, support cues; PRESSING: triggers, first defender mentality;
   TRANSITION: first 3 seconds, reactions).
7. Realism: decisions must mirror match actions (angles, pressure cues, timing).
8. GK Integration: {gk_rule}
9. Age Appropriate: U9-U11 simple triggers, 15-20m spaces; U12-U14 more tactical cues;
   U15+ full tactical periodization.
10. JSON ONLY. NO commentary.

### JSON FORMAT (STRICT)
{{
  "title": "...",
  "description": "...",
  "organization": "...",
  "coachingPoints": ["...", "...", "..."],
  "progression": ["..."],
  "psychTheme": "...",
  "equipment": ["..."],
  "diagram": {{ "teams": [{{ "label": "...", "color": "...", "count": 0 }}] }},
  "durationMin": {duration},
  "numbers": {{ "min": {min}, "max": {max} }},
  "gameModelId": "{game_model}",
  "phase": "{phase}",
  "zone": "{zone}",
  "spaceConstraint": "{space}",
  "goalsAvailable": {goals}
}}

### AGE GROUP
Generate for **{age}**.

### TASK
Produce only the JSON."#,
        duration = request.duration_min,
        min = request.numbers_min,
        max = request.numbers_max,
        game_model = game_model(request),
        phase = request.phase,
        zone = request.zone,
        space = request.space_constraint,
        age = request.age_group,
    )
}

/// Build the prompt asking the model to revise a drill using its QA review.
pub fn build_fixer_prompt(drill: &DrillDocument, qa: &QaReport, request: &DrillRequest) -> String {
    let original = serde_json::to_string(&drill.to_value()).unwrap_or_default();
    let review = serde_json::to_string(qa).unwrap_or_default();

    format!(
        r#"Given a drill JSON and its QA review, produce a REVISED drill JSON that:
- addresses every QA note,
- keeps the same theme/intention,
- keeps fields and types identical to the original,
- and ensures age-appropriateness and safety.

Hard rules:
- Complete the diagram: teams, startingPositions with x,y, >=3 arrows (pass, run, dribble), and coach {{x,y,restart}}.
- Age {age}: limit concurrent constraints to <=2; keep player numbers simple; include clear work:rest within duration {duration} minutes.
- Game model {game_model}, phase {phase}, zone {zone}.
- GoalsAvailable={goals}: if >=1, include a Goalkeeper role and coaching cue.

Return ONLY the full corrected drill JSON (no markdown):

Original:
{original}

QA:
{review}
"#,
        age = request.age_group,
        duration = request.duration_min,
        game_model = game_model(request),
        phase = request.phase,
        zone = request.zone,
        goals = request.goals(),
    )
}
