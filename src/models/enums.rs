use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation is the same string as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(GoalMode {
    NoGoal => "NOGOAL",
    Large => "LARGE",
    Mini2 => "MINI2",
});

str_enum!(GameModelId {
    Possession => "POSSESSION",
    Pressing => "PRESSING",
    Transition => "TRANSITION",
    CoachAi => "COACHAI",
});

str_enum!(FixDecisionCode {
    NoQaOrPass => "NO_QA_OR_PASS",
    NeedsRegen => "NEEDS_REGEN",
    Patchable => "PATCHABLE",
    Ok => "OK",
});

// Declaration order is the fixed dimension order used for notes and storage.
str_enum!(Dimension {
    Structure => "structure",
    GameModel => "gameModel",
    Psych => "psych",
    Clarity => "clarity",
    Realism => "realism",
    Constraints => "constraints",
    Safety => "safety",
});

impl GoalMode {
    /// Number of goals this mode puts on the pitch (the `goalsSupported` value).
    pub fn goal_count(&self) -> i64 {
        match self {
            Self::NoGoal => 0,
            Self::Large => 1,
            Self::Mini2 => 2,
        }
    }

    /// Mini-goals drawn on the diagram.
    pub fn mini_goals(&self) -> i64 {
        match self {
            Self::Mini2 => 2,
            Self::NoGoal | Self::Large => 0,
        }
    }

    /// A full-size goal needs a goalkeeper; mini-goals and no-goal games don't.
    pub fn requires_goalkeeper(&self) -> bool {
        matches!(self, Self::Large)
    }
}

impl FixDecisionCode {
    /// Relative restrictiveness: higher means a less favourable outcome.
    /// `NoQaOrPass` sits outside the ordering and ranks as 0.
    pub fn severity(&self) -> u8 {
        match self {
            Self::NoQaOrPass => 0,
            Self::Ok => 1,
            Self::Patchable => 2,
            Self::NeedsRegen => 3,
        }
    }
}
