//! Hallway junctions: which archetype waits behind each branch.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::EventCategory;
use crate::rng::RandomSource;

/// Resample budget for the right branch before stepping to the next archetype.
const JUNCTION_RESAMPLE_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventArchetype {
    Ambient,
    Combat,
    Treasure,
    Object,
    Mystic,
}

impl EventArchetype {
    pub const ALL: [Self; 5] = [
        Self::Ambient,
        Self::Combat,
        Self::Treasure,
        Self::Object,
        Self::Mystic,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Combat => "combat",
            Self::Treasure => "treasure",
            Self::Object => "object",
            Self::Mystic => "mystic",
        }
    }

    /// Event pool behind this archetype. Combat has none.
    #[must_use]
    pub const fn category(self) -> Option<EventCategory> {
        match self {
            Self::Ambient => Some(EventCategory::Ambient),
            Self::Treasure => Some(EventCategory::Shop),
            Self::Object => Some(EventCategory::Object),
            Self::Mystic => Some(EventCategory::Mystic),
            Self::Combat => None,
        }
    }

    fn draw<R>(rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let idx = rng.pick_index(Self::ALL.len());
        Self::ALL.get(idx).copied().unwrap_or(Self::Ambient)
    }

    fn successor(self) -> Self {
        let idx = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EventArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// The two branches offered at a hallway fork. Always distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junction {
    pub left: EventArchetype,
    pub right: EventArchetype,
}

impl Default for Junction {
    fn default() -> Self {
        Self {
            left: EventArchetype::Ambient,
            right: EventArchetype::Combat,
        }
    }
}

impl Junction {
    /// Draw left, then resample right until it differs.
    pub fn draw<R>(rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let left = EventArchetype::draw(rng);
        let mut right = EventArchetype::draw(rng);
        let mut attempts = 1;
        while right == left {
            if attempts >= JUNCTION_RESAMPLE_LIMIT {
                right = left.successor();
                break;
            }
            right = EventArchetype::draw(rng);
            attempts += 1;
        }
        log::debug!("junction drawn: left={left}, right={right}");
        Self { left, right }
    }

    #[must_use]
    pub const fn archetype(&self, direction: Direction) -> EventArchetype {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GameRng, ScriptedRolls};

    #[test]
    fn resamples_until_distinct() {
        let mut rng = ScriptedRolls::new(vec![0.0, 0.1, 0.5]);
        let junction = Junction::draw(&mut rng);
        assert_eq!(junction.left, EventArchetype::Ambient);
        assert_eq!(junction.right, EventArchetype::Treasure);
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn stuck_stream_still_yields_distinct_branches() {
        let mut rng = ScriptedRolls::new(vec![0.9]);
        let junction = Junction::draw(&mut rng);
        assert_eq!(junction.left, EventArchetype::Mystic);
        assert_eq!(junction.right, EventArchetype::Ambient);
    }

    #[test]
    fn seeded_junctions_are_always_distinct() {
        let mut rng = GameRng::from_user_seed(7);
        for _ in 0..200 {
            let junction = Junction::draw(&mut rng);
            assert_ne!(junction.left, junction.right);
        }
    }

    #[test]
    fn archetypes_map_to_pools() {
        assert_eq!(EventArchetype::Treasure.category(), Some(EventCategory::Shop));
        assert_eq!(EventArchetype::Combat.category(), None);
        let junction = Junction::default();
        assert_eq!(junction.archetype(Direction::Right), EventArchetype::Combat);
    }
}
