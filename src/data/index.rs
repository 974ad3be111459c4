// ============================================================
// Layer 4 — Sample Index
// ============================================================
// Enumerates the hand-view frames of a split and parses each
// path into the session key + frame offset used for labels.
//
//   <root>/frames/<split>/<env>/<session>/<Lhand|Rhand>/<prefix><digits>.png
//                         ──┬── ────┬──── ─────┬─────  ───────┬────────
//                     environment  on-disk   side       frame offset
//                                  session
//
// The session folder is shifted by the split offset (+3 for
// val/test) to get the label-file session number.
//
// A path that breaks the convention is rejected with
// MalformedPath; enumeration logs it and leaves it out of the
// index. The index is sorted by path so it is stable for a
// fixed filesystem snapshot. The data loader shuffles it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{
    errors::DatasetError,
    frame::{FrameName, FrameRef, FRAME_EXTENSION, HEAD_DIR},
    session::{Environment, SessionKey, Side, Split, ON_DISK_SESSIONS},
    traits::FrameSource,
};

static FRAME_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(\d+)\.png$").expect("static regex"));

/// Parse one hand-view frame path into its frame identity.
pub fn parse_frame_path(path: &Path, split: Split) -> Result<FrameRef, DatasetError> {
    // Trailing segments, last first: file, side, session, environment
    let segments: Vec<&str> = path
        .iter()
        .rev()
        .take(4)
        .map(|s| s.to_str())
        .collect::<Option<_>>()
        .ok_or_else(|| DatasetError::malformed(path, "path is not valid UTF-8"))?;
    if segments.len() < 4 {
        return Err(DatasetError::malformed(
            path,
            "expected <env>/<session>/<side>/<frame>.png",
        ));
    }
    let (file_name, side_dir, session_dir, env_dir) =
        (segments[0], segments[1], segments[2], segments[3]);

    let captures = FRAME_NAME_RE
        .captures(file_name)
        .ok_or_else(|| DatasetError::malformed(path, "file name has no numeric suffix"))?;
    let name = FrameName {
        prefix: captures[1].to_string(),
        digits: captures[2].to_string(),
    };
    let offset: usize = name
        .digits
        .parse()
        .map_err(|_| DatasetError::malformed(path, "frame number does not fit in usize"))?;

    let side = Side::from_hand_dir(side_dir)
        .ok_or_else(|| DatasetError::malformed(path, format!("unknown side directory '{side_dir}'")))?;

    let on_disk: u8 = session_dir
        .parse()
        .ok()
        .filter(|n| ON_DISK_SESSIONS.contains(n))
        .ok_or_else(|| DatasetError::malformed(path, format!("bad session folder '{session_dir}'")))?;

    let environment: Environment = env_dir
        .parse()
        .map_err(|_| DatasetError::malformed(path, format!("unknown environment '{env_dir}'")))?;

    let key = SessionKey::new(environment, side, on_disk + split.session_offset());
    Ok(FrameRef::new(key, offset, name))
}

/// All hand-view frames of one split.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    root:   PathBuf,
    split:  Split,
    frames: Vec<FrameRef>,
}

impl SampleIndex {
    /// Walk `<root>/frames/<split>` and parse every hand-view frame.
    pub fn enumerate(root: &Path, split: Split) -> Result<Self, DatasetError> {
        let split_dir = root.join("frames").join(split.as_str());

        let mut candidates = Vec::new();
        for env_dir in sorted_dirs(&split_dir)? {
            for session_dir in sorted_dirs(&env_dir)? {
                for view_dir in sorted_dirs(&session_dir)? {
                    if view_dir.file_name().and_then(|n| n.to_str()) == Some(HEAD_DIR) {
                        continue;
                    }
                    candidates.extend(frame_files(&view_dir)?);
                }
            }
        }
        candidates.sort();

        let mut frames   = Vec::with_capacity(candidates.len());
        let mut rejected = 0usize;
        for path in &candidates {
            match parse_frame_path(path, split) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    rejected += 1;
                    tracing::warn!("Excluding frame: {}", e);
                }
            }
        }

        tracing::info!(
            "Indexed {} frames for split '{}' ({} excluded)",
            frames.len(),
            split,
            rejected
        );
        Ok(Self { root: root.to_path_buf(), split, frames })
    }

    /// Build an index from already-known frames.
    #[cfg(test)]
    pub(crate) fn from_frames(root: &Path, split: Split, frames: Vec<FrameRef>) -> Self {
        Self { root: root.to_path_buf(), split, frames }
    }
}

impl FrameSource for SampleIndex {
    fn root(&self) -> &Path {
        &self.root
    }

    fn split(&self) -> Split {
        self.split
    }

    fn frames(&self) -> &[FrameRef] {
        &self.frames
    }
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))? {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    Ok(read_dir_paths(dir)?.into_iter().filter(|p| p.is_dir()).collect())
}

fn frame_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    Ok(read_dir_paths(dir)?
        .into_iter()
        .filter(|p| p.is_file())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(FRAME_EXTENSION))
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_parse_train_path() {
        let path  = Path::new("/data/frames/train/lab/2/Rhand/Image105.png");
        let frame = parse_frame_path(path, Split::Train).unwrap();
        assert_eq!(frame.key, SessionKey::new(Environment::Lab, Side::Right, 2));
        assert_eq!(frame.offset, 105);
    }

    #[test]
    fn test_parse_test_path_shifts_session() {
        let path  = Path::new("/data/frames/test/house/1/Lhand/Image0.png");
        let frame = parse_frame_path(path, Split::Test).unwrap();
        assert_eq!(frame.key.session, 4);
        assert_eq!(frame.offset, 0);
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        let bad = [
            "/data/frames/train/lab/2/Rhand/Image.png",
            "/data/frames/train/lab/2/Rhand/Image12.jpg",
            "/data/frames/train/lab/x/Rhand/Image1.png",
            "/data/frames/train/lab/4/Rhand/Image1.png",
            "/data/frames/train/lab/2/head/Image1.png",
            "/data/frames/train/garage/2/Lhand/Image1.png",
            "Image1.png",
        ];
        for p in bad {
            assert!(
                matches!(parse_frame_path(Path::new(p), Split::Train), Err(DatasetError::MalformedPath { .. })),
                "expected MalformedPath for {p}"
            );
        }
    }

    #[test]
    fn test_enumerate_skips_head_and_malformed_entries() {
        let dir  = tempfile::tempdir().unwrap();
        let root = dir.path();
        let base = root.join("frames/train");

        touch(&base.join("house/1/Lhand/Image2.png"));
        touch(&base.join("house/1/Lhand/Image10.png"));
        touch(&base.join("house/1/head/Image2.png"));
        touch(&base.join("house/1/Lhand/notes.txt"));
        touch(&base.join("house/1/Lhand/cover.png"));
        touch(&base.join("office/3/Rhand/Image7.png"));
        touch(&base.join("garage/1/Rhand/Image7.png"));

        let index = SampleIndex::enumerate(root, Split::Train).unwrap();
        let found: Vec<(SessionKey, usize)> =
            index.frames().iter().map(|f| (f.key, f.offset)).collect();

        assert_eq!(
            found,
            vec![
                (SessionKey::new(Environment::House, Side::Left, 1), 10),
                (SessionKey::new(Environment::House, Side::Left, 1), 2),
                (SessionKey::new(Environment::Office, Side::Right, 3), 7),
            ]
        );
    }

    #[test]
    fn test_enumerate_missing_split_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SampleIndex::enumerate(dir.path(), Split::Val),
            Err(DatasetError::Io { .. })
        ));
    }

    fn arb_split() -> impl Strategy<Value = Split> {
        prop_oneof![Just(Split::Train), Just(Split::Val), Just(Split::Test)]
    }

    proptest! {
        #[test]
        fn prop_parse_reconstruct_round_trip(
            env in 0usize..3,
            side in 0usize..2,
            on_disk in 1u8..=3,
            split in arb_split(),
            prefix in "[A-Za-z_]{0,8}",
            offset in 0usize..100_000,
            pad in 0usize..3,
        ) {
            let key = SessionKey::new(
                Environment::ALL[env],
                Side::ALL[side],
                on_disk + split.session_offset(),
            );
            let digits = format!("{:0width$}", offset, width = pad + offset.to_string().len());
            let frame  = FrameRef::new(key, offset, FrameName { prefix, digits });

            let path   = frame.hand_path(Path::new("/root"), split);
            let parsed = parse_frame_path(&path, split).unwrap();
            prop_assert_eq!(&parsed, &frame);
            prop_assert_eq!(parsed.hand_path(Path::new("/root"), split), path);
        }
    }
}
