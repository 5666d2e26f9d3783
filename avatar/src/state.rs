//! Animation state identifiers and the enum-keyed clip table.

use core::ops::{Index, IndexMut};
use core::str::FromStr;

/// Closed set of animation states the avatar can be in.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Standing still, looping idle clip.
    Idle = 0,
    /// Forward/backward movement without sprint.
    Walk = 1,
    /// Forward/backward movement with sprint held.
    Run = 2,
    /// One-shot emote; returns to idle when its clip finishes.
    Dance = 3,
}

impl StateKind {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Walk, Self::Run, Self::Dance];

    /// Stable name used at the public `set_state_by_name` boundary and in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Dance => "dance",
        }
    }

    /// Locomotion gaits share phase-matched cross-fades.
    #[must_use]
    pub const fn is_gait(self) -> bool {
        matches!(self, Self::Walk | Self::Run)
    }

    /// Clips of these states repeat until another state takes over.
    #[must_use]
    pub const fn loops(self) -> bool {
        !matches!(self, Self::Dance)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for StateKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateKind {
    type Err = UnknownStateName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| UnknownStateName(value.to_owned()))
    }
}

/// Error returned when a state name does not match any [`StateKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateName(pub String);

impl core::fmt::Display for UnknownStateName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown animation state '{}'", self.0)
    }
}

impl std::error::Error for UnknownStateName {}

/// Fixed table holding one value per [`StateKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSet<T> {
    entries: [T; 4],
}

impl<T> ClipSet<T> {
    /// Builds the table by evaluating `f` once per state kind.
    pub fn from_fn(mut f: impl FnMut(StateKind) -> T) -> Self {
        Self {
            entries: StateKind::ALL.map(&mut f),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateKind, &T)> {
        StateKind::ALL.into_iter().zip(self.entries.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (StateKind, &mut T)> {
        StateKind::ALL.into_iter().zip(self.entries.iter_mut())
    }

    /// Mutable access to two different entries at once.
    ///
    /// Returns `None` when `a == b`.
    pub fn pair_mut(&mut self, a: StateKind, b: StateKind) -> Option<(&mut T, &mut T)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.entries.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.entries.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }
}

impl<T> ClipSet<Option<T>> {
    /// `Some` only when every state has a value.
    pub fn transpose(self) -> Option<ClipSet<T>> {
        let [idle, walk, run, dance] = self.entries;
        Some(ClipSet {
            entries: [idle?, walk?, run?, dance?],
        })
    }
}

impl<T: Default> Default for ClipSet<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<StateKind> for ClipSet<T> {
    type Output = T;

    fn index(&self, kind: StateKind) -> &Self::Output {
        &self.entries[kind.index()]
    }
}

impl<T> IndexMut<StateKind> for ClipSet<T> {
    fn index_mut(&mut self, kind: StateKind) -> &mut Self::Output {
        &mut self.entries[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back_to_the_same_kind() {
        for kind in StateKind::ALL {
            assert_eq!(kind.name().parse::<StateKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "jump".parse::<StateKind>().unwrap_err();
        assert_eq!(err, UnknownStateName("jump".into()));
        assert_eq!(err.to_string(), "unknown animation state 'jump'");
    }

    #[test]
    fn only_dance_is_one_shot() {
        assert!(StateKind::Idle.loops());
        assert!(StateKind::Run.loops());
        assert!(!StateKind::Dance.loops());
        assert!(StateKind::Walk.is_gait());
        assert!(!StateKind::Idle.is_gait());
    }

    #[test]
    fn pair_mut_returns_entries_in_argument_order() {
        let mut set = ClipSet::from_fn(|kind| kind.name().len());
        let (run, walk) = set.pair_mut(StateKind::Run, StateKind::Walk).unwrap();
        *run = 10;
        *walk = 20;
        assert_eq!(set[StateKind::Run], 10);
        assert_eq!(set[StateKind::Walk], 20);
        assert!(set.pair_mut(StateKind::Idle, StateKind::Idle).is_none());
    }

    #[test]
    fn transpose_requires_every_entry() {
        let full = ClipSet::from_fn(|kind| Some(kind.name()));
        assert_eq!(full.transpose().unwrap()[StateKind::Dance], "dance");

        let partial = ClipSet::from_fn(|kind| (kind != StateKind::Run).then_some(1));
        assert!(partial.transpose().is_none());
    }
}
