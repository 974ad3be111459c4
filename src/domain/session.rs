// ============================================================
// Layer 3 — Session Keys
// ============================================================
// A session key names one recording: the environment it was
// filmed in, which hand the camera watched, and the session
// number. Label arrays are stored per session, so this key is
// what connects a frame file on disk to its row of labels.
//
// Session numbers 1–3 are the training recordings, 4–6 the
// evaluation recordings. On disk both splits reuse the folder
// names "1".."3"; the split decides the offset added on parse.
//
// Reference: Rust Book §6 (Enums), §10 (Derivable Traits)

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Session folder names that appear under `frames/<split>/<env>/`
pub const ON_DISK_SESSIONS: RangeInclusive<u8> = 1..=3;

// ─── Environment ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Environment {
    House,
    Lab,
    Office,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::House, Environment::Lab, Environment::Office];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::House  => "house",
            Environment::Lab    => "lab",
            Environment::Office => "office",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "house"  => Ok(Environment::House),
            "lab"    => Ok(Environment::Lab),
            "office" => Ok(Environment::Office),
            _        => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Side ─────────────────────────────────────────────────────────────────────
/// Which hand a hand-view camera recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Name used in label file names (`obj_left1.npy`)
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left  => "left",
            Side::Right => "right",
        }
    }

    /// Name of the hand-view frame directory (`Lhand` / `Rhand`)
    pub fn hand_dir(self) -> &'static str {
        match self {
            Side::Left  => "Lhand",
            Side::Right => "Rhand",
        }
    }

    pub fn from_hand_dir(dir: &str) -> Option<Side> {
        match dir {
            "Lhand" => Some(Side::Left),
            "Rhand" => Some(Side::Right),
            _       => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Split ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// Directory name under `frames/`
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val   => "val",
            Split::Test  => "test",
        }
    }

    /// Added to the on-disk session folder number to get the
    /// session number of the label arrays.
    pub fn session_offset(self) -> u8 {
        match self {
            Split::Train            => 0,
            Split::Val | Split::Test => 3,
        }
    }

    /// Session numbers (label-file numbering) visible in this split
    pub fn sessions(self) -> RangeInclusive<u8> {
        let offset = self.session_offset();
        (ON_DISK_SESSIONS.start() + offset)..=(ON_DISK_SESSIONS.end() + offset)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── SessionKey ───────────────────────────────────────────────────────────────
/// Composite key for one recording's label arrays.
///
/// `session` uses label-file numbering (1..=6), i.e. the split
/// offset has already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub environment: Environment,
    pub side:        Side,
    pub session:     u8,
}

impl SessionKey {
    pub fn new(environment: Environment, side: Side, session: u8) -> Self {
        Self { environment, side, session }
    }

    /// Every key a split can see, in a fixed order
    pub fn all_for(split: Split) -> impl Iterator<Item = SessionKey> {
        Environment::ALL.into_iter().flat_map(move |environment| {
            Side::ALL.into_iter().flat_map(move |side| {
                split
                    .sessions()
                    .map(move |session| SessionKey::new(environment, side, session))
            })
        })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.environment, self.side, self.session)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sessions() {
        assert_eq!(Split::Train.sessions().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(Split::Test.sessions().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(Split::Val.sessions().collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn test_all_keys_for_split() {
        let keys: Vec<_> = SessionKey::all_for(Split::Train).collect();
        // 3 environments x 2 sides x 3 sessions
        assert_eq!(keys.len(), 18);
        assert!(keys.iter().all(|k| (1..=3).contains(&k.session)));
    }

    #[test]
    fn test_hand_dir_round_trip() {
        for side in Side::ALL {
            assert_eq!(Side::from_hand_dir(side.hand_dir()), Some(side));
        }
        assert_eq!(Side::from_hand_dir("head"), None);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("lab".parse::<Environment>(), Ok(Environment::Lab));
        assert!("garage".parse::<Environment>().is_err());
    }
}
