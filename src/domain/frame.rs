// ============================================================
// Layer 3 — Frame Identity
// ============================================================
// A frame is identified by its session key and its offset in
// that session's label arrays. The offset is the trailing
// number of the image file name ("Image42.png" → 42).
//
// The file name's prefix and digit string are kept verbatim so
// the exact on-disk path can be rebuilt (zero padding included).
//
// Directory convention for one frame:
//
//   <root>/frames/<split>/<env>/<session>/Lhand/Image42.png   hand view
//   <root>/frames/<split>/<env>/<session>/head/Image42.png    head view
//
// where <session> is the on-disk folder number (1..=3).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::session::{SessionKey, Split};

/// Directory that holds the head-view frames of a session
pub const HEAD_DIR: &str = "head";

/// Extension of every frame image
pub const FRAME_EXTENSION: &str = "png";

/// Parsed `<prefix><digits>.png` file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameName {
    pub prefix: String,
    pub digits: String,
}

impl FrameName {
    /// `Image<offset>.png`
    #[cfg(test)]
    pub(crate) fn canonical(offset: usize) -> Self {
        Self { prefix: "Image".to_string(), digits: offset.to_string() }
    }

    pub fn file_name(&self) -> String {
        format!("{}{}.{}", self.prefix, self.digits, FRAME_EXTENSION)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRef {
    pub key:    SessionKey,
    pub offset: usize,
    pub name:   FrameName,
}

impl FrameRef {
    pub fn new(key: SessionKey, offset: usize, name: FrameName) -> Self {
        Self { key, offset, name }
    }

    fn session_dir(&self, root: &Path, split: Split) -> PathBuf {
        let on_disk = self.key.session.saturating_sub(split.session_offset());
        root.join("frames")
            .join(split.as_str())
            .join(self.key.environment.as_str())
            .join(on_disk.to_string())
    }

    /// Hand-view path, exactly as the index parses it
    pub fn hand_path(&self, root: &Path, split: Split) -> PathBuf {
        self.session_dir(root, split)
            .join(self.key.side.hand_dir())
            .join(self.name.file_name())
    }

    /// Paired head-view path: same session and file name, `head` directory
    pub fn head_path(&self, root: &Path, split: Split) -> PathBuf {
        self.session_dir(root, split)
            .join(HEAD_DIR)
            .join(self.name.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{Environment, Side};

    #[test]
    fn test_paths_for_test_split_use_on_disk_folder() {
        let key   = SessionKey::new(Environment::Office, Side::Right, 5);
        let frame = FrameRef::new(key, 17, FrameName::canonical(17));
        let root  = Path::new("/data");

        assert_eq!(
            frame.hand_path(root, Split::Test),
            PathBuf::from("/data/frames/test/office/2/Rhand/Image17.png")
        );
        assert_eq!(
            frame.head_path(root, Split::Test),
            PathBuf::from("/data/frames/test/office/2/head/Image17.png")
        );
    }

    #[test]
    fn test_zero_padding_is_preserved() {
        let name = FrameName { prefix: String::new(), digits: "0007".to_string() };
        assert_eq!(name.file_name(), "0007.png");
    }
}
