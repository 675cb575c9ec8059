//! Equipment canonicalization.
//!
//! Free-text equipment strings are mapped onto a closed vocabulary through
//! an exact synonym table, then an ordered list of fallback pattern rules.
//! Anything unrecognized is kept as a caller-supplied extra. The result is
//! filtered by goal mode, topped up with the essentials, deduplicated and
//! put in a fixed order.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::GoalMode;

/// Closed equipment vocabulary. Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalItem {
    Cones,
    Bibs,
    Balls,
    MiniGoals,
    FullSizeGoal,
}

impl CanonicalItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cones => "Cones",
            Self::Bibs => "Bibs (2 colors)",
            Self::Balls => "Soccer balls",
            Self::MiniGoals => "2 Mini-goals",
            Self::FullSizeGoal => "1 Full-size goal",
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, Self::MiniGoals | Self::FullSizeGoal)
    }

    /// The goal item a mode requires, if any.
    pub fn for_goal_mode(mode: GoalMode) -> Option<Self> {
        match mode {
            GoalMode::NoGoal => None,
            GoalMode::Large => Some(Self::FullSizeGoal),
            GoalMode::Mini2 => Some(Self::MiniGoals),
        }
    }
}

/// Present in every normalized drill regardless of generator output.
pub const ESSENTIALS: [CanonicalItem; 3] = [
    CanonicalItem::Cones,
    CanonicalItem::Bibs,
    CanonicalItem::Balls,
];

/// Exact synonyms, keyed by the trimmed lowercase item.
static SYNONYMS: &[(&str, CanonicalItem)] = &[
    // canonical labels map to themselves
    ("cones", CanonicalItem::Cones),
    ("bibs (2 colors)", CanonicalItem::Bibs),
    ("soccer balls", CanonicalItem::Balls),
    ("2 mini-goals", CanonicalItem::MiniGoals),
    ("1 full-size goal", CanonicalItem::FullSizeGoal),
    // cones
    ("cones or disc markers", CanonicalItem::Cones),
    ("cones or discs", CanonicalItem::Cones),
    ("cones/discs", CanonicalItem::Cones),
    ("cones/disc", CanonicalItem::Cones),
    ("disc markers", CanonicalItem::Cones),
    ("disc cones", CanonicalItem::Cones),
    ("markers", CanonicalItem::Cones),
    // bibs
    ("bibs", CanonicalItem::Bibs),
    ("team bibs", CanonicalItem::Bibs),
    ("bibs (two colors)", CanonicalItem::Bibs),
    ("bibs (two different colors)", CanonicalItem::Bibs),
    ("bibs (two different colours)", CanonicalItem::Bibs),
    ("pinnies", CanonicalItem::Bibs),
    ("pinnies (2 colors)", CanonicalItem::Bibs),
    ("pinnies/bibs (2 colors)", CanonicalItem::Bibs),
    ("pinnies (2 distinct colors)", CanonicalItem::Bibs),
    ("pinnies (2 distinct colours)", CanonicalItem::Bibs),
    ("training vests", CanonicalItem::Bibs),
    // balls
    ("balls", CanonicalItem::Balls),
    ("footballs", CanonicalItem::Balls),
    ("soccer ball", CanonicalItem::Balls),
    ("football", CanonicalItem::Balls),
    // goals
    ("mini goal", CanonicalItem::MiniGoals),
    ("mini-goal", CanonicalItem::MiniGoals),
    ("mini goals", CanonicalItem::MiniGoals),
    ("two mini-goals", CanonicalItem::MiniGoals),
    ("1 small/mini goal", CanonicalItem::MiniGoals),
    ("small goal", CanonicalItem::MiniGoals),
    ("pugg goal", CanonicalItem::MiniGoals),
    ("pugg goals", CanonicalItem::MiniGoals),
    ("full-size goal", CanonicalItem::FullSizeGoal),
    ("1 full size goal", CanonicalItem::FullSizeGoal),
    ("1 full-sized goal", CanonicalItem::FullSizeGoal),
    ("1 large goal", CanonicalItem::FullSizeGoal),
    ("2 full-size goals", CanonicalItem::FullSizeGoal),
    ("2 regular goals", CanonicalItem::FullSizeGoal),
];

/// A fallback pattern rule, tried in order after the synonym table.
struct FallbackRule {
    regex: Regex,
    item: CanonicalItem,
}

fn rule(pattern: &str, item: CanonicalItem) -> FallbackRule {
    FallbackRule {
        regex: Regex::new(pattern).expect("equipment pattern must compile"),
        item,
    }
}

// Goal rules come first so "cones as mini-goals" is treated as a goal item.
static FALLBACK_RULES: LazyLock<Vec<FallbackRule>> = LazyLock::new(|| {
    vec![
        rule(
            r"(?i)\b(?:mini|small|pugg|pop[-\s]?up)[-\s]?goal",
            CanonicalItem::MiniGoals,
        ),
        rule(
            r"(?i)\b(?:full[-\s]?size[d]?|large|big|regular|standard|regulation|11[-\s]?a[-\s]?side)\s+goal",
            CanonicalItem::FullSizeGoal,
        ),
        rule(r"(?i)^(?:\d+\s*)?goals?$", CanonicalItem::FullSizeGoal),
        rule(
            r"(?i)^(?:\d+\s*(?:x\s*)?)?(?:sets?\s+of\s+)?(?:team\s+|training\s+|colou?red\s+)?(?:bibs?|pinnies|pinny|vests?)\b",
            CanonicalItem::Bibs,
        ),
        rule(
            r"(?i)^(?:\d+\s*(?:x\s*)?)?(?:flat\s+|disc\s+|marker\s+|tall\s+|small\s+)?(?:cones?|discs?|markers?)\b",
            CanonicalItem::Cones,
        ),
        rule(
            r"(?i)^(?:\d+\s*(?:x\s*)?)?(?:size\s*\d\s+)?(?:soccer\s*|foot\s*)?balls?(?:\s*[(,:\-].*)?$",
            CanonicalItem::Balls,
        ),
    ]
});

// Raw goal mentions, matched anywhere in an item. Used on final strings.
static MINI_GOAL_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mini[-\s]?goal").unwrap());
static FULL_SIZE_GOAL_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:full[-\s]?size[d]?|large)\s?goal").unwrap());

/// Which goal item a string mentions by its raw text, if any.
pub fn mentioned_goal(item: &str) -> Option<CanonicalItem> {
    if MINI_GOAL_TEXT.is_match(item) {
        Some(CanonicalItem::MiniGoals)
    } else if FULL_SIZE_GOAL_TEXT.is_match(item) {
        Some(CanonicalItem::FullSizeGoal)
    } else {
        None
    }
}

/// Outcome of the lexical mapping step for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Canonical(CanonicalItem),
    /// Unrecognized; trimmed but otherwise as the caller wrote it.
    Extra(String),
}

/// Map one raw item onto the vocabulary. `None` for blank input.
pub fn classify_item(raw: &str) -> Option<Classified> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key = trimmed.to_lowercase();

    if let Some((_, item)) = SYNONYMS.iter().find(|(synonym, _)| *synonym == key) {
        return Some(Classified::Canonical(*item));
    }

    if let Some(fallback) = FALLBACK_RULES.iter().find(|r| r.regex.is_match(trimmed)) {
        return Some(Classified::Canonical(fallback.item));
    }

    Some(Classified::Extra(trimmed.to_string()))
}

/// Canonicalize an equipment list for a goal mode.
///
/// Goal items that disagree with the mode are dropped and the mode's own
/// goal item is guaranteed; the essentials are added when missing. Output
/// is the canonical items in vocabulary order followed by extras in
/// first-seen order, deduplicated case-insensitively. Idempotent.
pub fn canonicalize_equipment(items: &[String], mode: GoalMode) -> Vec<String> {
    let required_goal = CanonicalItem::for_goal_mode(mode);

    let mut canonical: BTreeSet<CanonicalItem> = BTreeSet::new();
    let mut extras: Vec<String> = Vec::new();
    let mut seen_extras: HashSet<String> = HashSet::new();

    for raw in items {
        match classify_item(raw) {
            None => {}
            Some(Classified::Canonical(item)) => {
                if item.is_goal() && Some(item) != required_goal {
                    continue;
                }
                canonical.insert(item);
            }
            // goal items are owned by the mode
            Some(Classified::Extra(extra)) if mentioned_goal(&extra).is_some() => {}
            Some(Classified::Extra(extra)) => {
                if seen_extras.insert(extra.to_lowercase()) {
                    extras.push(extra);
                }
            }
        }
    }

    canonical.extend(required_goal);
    canonical.extend(ESSENTIALS);

    canonical
        .iter()
        .map(|item| item.label().to_string())
        .chain(extras)
        .collect()
}

/// Whether a list mentions a goal item that contradicts the mode, or lacks
/// the one the mode requires. Reads the raw strings, not the classifier.
pub fn equipment_matches_mode(items: &[String], mode: GoalMode) -> bool {
    let mentioned: Vec<CanonicalItem> = items
        .iter()
        .filter_map(|item| mentioned_goal(item))
        .collect();

    match CanonicalItem::for_goal_mode(mode) {
        None => mentioned.is_empty(),
        Some(goal) => mentioned == [goal] && items.iter().any(|i| i == goal.label()),
    }
}
