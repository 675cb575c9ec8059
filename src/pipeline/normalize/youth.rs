//! Youth guards for U9–U12 drills.
//!
//! Rewrites the generated format to a small-sided 4v3 (+GK when a goal is
//! available) in a reduced area, with short work bouts and no mandatory
//! third-man rules. Goal normalization runs afterwards and still owns
//! `miniGoals`, the GK entry and equipment.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::models::{DrillDocument, Team};

const ATTACKERS: u32 = 4;
const DEFENDERS: u32 = 3;
const AREA_TEXT: &str = "Width of the 18-yard box to the halfway line (~44x35yd for U12)";
const CONTROLLED_START: &str =
    "Controlled start: Defenders cannot press beyond the CAM's starting line until after the CAM's first touch.";
const THIRD_MAN_CHALLENGE: &str =
    "Coaching challenge: Encourage third-man runs with guided questions and freeze moments.";
const RECOVERING_DEFENDER: &str =
    "Add one recovering defender from halfway on coach signal, creating a momentary 4v4 transition.";
const THIRD_MAN_BONUS: &str =
    "+1 bonus point for a goal scored by a third-man runner (e.g., CAM timing beyond the 9).";
const GK_COACHING_POINT: &str =
    "GK: starting position & communication on cutbacks; quick distribution on saves.";

static YOUTH_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^U(?:9|10|11|12)\b").unwrap());
static DEFENDERS_STAY_HOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)defend(?:er|ers).*(?:must|should).*remain.*defensive\s+half").unwrap()
});
static THIRD_MAN_MANDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)third-?man.*(?:must|required|only)").unwrap());
static CONTROLLED_START_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)controlled start|first touch").unwrap());
static BIG_SIDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:5v5|6v6|7v7|8v8|9v9|10v10|11v11)\b").unwrap());
static STRUCTURE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^structure:").unwrap());
static THIRD_MAN_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)third-?man").unwrap());
static GK_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:GK|Goalkeeper)\b").unwrap());

/// Whether an age group gets the youth format.
pub fn is_youth_age_group(age_group: &str) -> bool {
    YOUTH_AGE.is_match(age_group.trim())
}

/// Whether any coaching point already addresses the goalkeeper.
pub fn has_goalkeeper_point(points: &[String]) -> bool {
    points.iter().any(|p| GK_POINT.is_match(p.trim()))
}

/// Apply the youth format when `age_group` is U9–U12. Returns whether the
/// drill was changed.
pub fn apply_youth_guards(drill: &mut DrillDocument, age_group: &str, goals_available: i64) -> bool {
    if !is_youth_age_group(age_group) {
        return false;
    }
    let has_gk = goals_available >= 1;
    let format = if has_gk {
        format!("{ATTACKERS}v{DEFENDERS}+GK")
    } else {
        format!("{ATTACKERS}v{DEFENDERS}")
    };

    drill.extra.insert(
        "loadNotes".into(),
        json!({
            "structure": "8 x 90s with 90s rest (1:1), rotate groups briskly",
            "rationale": "Short work intervals preserve decision quality and avoid excessive fatigue for U12."
        }),
    );
    drill.extra.insert(
        "setup".into(),
        Value::String(format!(
            "Set up {format} in {AREA_TEXT}. Coach at midfield with balls. Mark a wide channel \
             (for winger isolation) and a cutback zone. Start from CAM on coach restart."
        )),
    );
    drill.organization = Some(format!(
        "Format: {format} (U12). Area: {AREA_TEXT}. Objective: POSSESSION principles \
         (switch, third-man timing, cutback). Rotation via 90s bouts (1:1 rest)."
    ));

    rewrite_diagram(drill, has_gk, goals_available);
    drill.constraints = guard_constraints(&drill.constraints);
    drill.progression = guard_progression(&drill.progression);

    let mut hints: Vec<Value> = match drill.extra.remove("scoringHints") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let has_bonus = hints
        .iter()
        .any(|h| h.as_str().is_some_and(|s| THIRD_MAN_MENTION.is_match(s)));
    if !has_bonus {
        hints.push(Value::String(THIRD_MAN_BONUS.into()));
    }
    drill.extra.insert("scoringHints".into(), Value::Array(hints));

    if has_gk && !has_goalkeeper_point(&drill.coaching_points) {
        drill.coaching_points.push(GK_COACHING_POINT.into());
    }

    true
}

fn rewrite_diagram(drill: &mut DrillDocument, has_gk: bool, goals_available: i64) {
    let diagram = &mut drill.diagram;
    diagram.extra.insert("pitch".into(), json!("CUSTOM"));
    diagram
        .extra
        .insert("fieldSize".into(), json!({"widthYards": 44, "lengthYards": 35}));
    if goals_available == 2 {
        diagram.mini_goals = 2;
    }

    diagram.teams = vec![
        Team::new("Attack", "blue", ATTACKERS),
        Team::new("Defend", "red", DEFENDERS),
    ];
    if has_gk {
        diagram.teams.push(Team::new("GK", "green", 1));
    }
    diagram
        .extra
        .insert("startingShapeAttack".into(), json!("2-1-1"));
    diagram
        .extra
        .insert("startingShapeDefend".into(), json!("2-1-0"));

    let mut positions = vec![
        json!({"id": "A1", "label": "Build-L", "team": "Attack", "x": 35, "y": 70}),
        json!({"id": "A2", "label": "Build-R", "team": "Attack", "x": 60, "y": 68}),
        json!({"id": "A3", "label": "CAM", "team": "Attack", "x": 50, "y": 55}),
        json!({"id": "A4", "label": "Winger", "team": "Attack", "x": 85, "y": 48}),
        json!({"id": "D1", "label": "CB-L", "team": "Defend", "x": 45, "y": 40}),
        json!({"id": "D2", "label": "CB-R", "team": "Defend", "x": 55, "y": 40}),
        json!({"id": "D3", "label": "DM", "team": "Defend", "x": 50, "y": 52}),
    ];
    if has_gk {
        positions.push(json!({"id": "G1", "label": "GK", "team": "GK", "x": 50, "y": 20}));
    }
    positions.extend([
        json!({"id": "M1", "label": "Endline", "team": "Marker", "x": 92, "y": 18}),
        json!({"id": "M2", "label": "CutbackSpot", "team": "Marker", "x": 56, "y": 30}),
        json!({"id": "M3", "label": "BoxRun", "team": "Marker", "x": 54, "y": 34}),
    ]);

    let id_of = |label: &str| -> Value {
        positions
            .iter()
            .find(|p| {
                p["label"]
                    .as_str()
                    .is_some_and(|l| l.eq_ignore_ascii_case(label))
            })
            .map(|p| p["id"].clone())
            .unwrap_or(Value::Null)
    };
    let arrow = |kind: &str, from: &str, to: &str, style: &str| -> Value {
        json!({
            "type": kind, "from": from, "to": to, "style": style,
            "fromId": id_of(from), "toId": id_of(to)
        })
    };
    let arrows = vec![
        arrow("pass", "Build-L", "CAM", "solid"),
        arrow("pass", "CAM", "Winger", "solid"),
        arrow("dribble", "Winger", "Endline", "dotted"),
        arrow("pass", "Endline", "CutbackSpot", "solid"),
        arrow("run", "Build-R", "BoxRun", "dashed"),
    ];

    diagram.extra.insert("arrows".into(), Value::Array(arrows));
    diagram
        .extra
        .insert("startingPositions".into(), Value::Array(positions));
    diagram.extra.insert(
        "coach".into(),
        json!({"x": 10, "y": 80, "restart": "Coach plays into CAM to start each 90s rep"}),
    );
}

fn guard_constraints(constraints: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut has_controlled_start = false;
    for c in constraints {
        let s = c.trim();
        if s.is_empty() || DEFENDERS_STAY_HOME.is_match(s) || THIRD_MAN_MANDATE.is_match(s) {
            continue;
        }
        if CONTROLLED_START_MENTION.is_match(s) {
            has_controlled_start = true;
        }
        out.push(s.to_string());
    }
    if !has_controlled_start {
        out.insert(0, CONTROLLED_START.to_string());
    }
    out
}

fn guard_progression(progression: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut added_recovering = false;
    for p in progression {
        let mut s = p.trim().to_string();
        if s.is_empty() {
            continue;
        }
        if THIRD_MAN_MANDATE.is_match(&s) {
            s = THIRD_MAN_CHALLENGE.to_string();
        }
        if BIG_SIDED.is_match(&s) {
            if !added_recovering {
                out.push(RECOVERING_DEFENDER.to_string());
                added_recovering = true;
            }
            continue;
        }
        // timing lives in loadNotes
        if STRUCTURE_PREFIX.is_match(&s) {
            continue;
        }
        out.push(s);
    }
    if out.is_empty() {
        out.push(THIRD_MAN_CHALLENGE.to_string());
    }
    if !added_recovering {
        out.push(RECOVERING_DEFENDER.to_string());
    }
    out
}
