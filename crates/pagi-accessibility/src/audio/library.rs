//! Named cue clips loaded from a directory of `*.wav` files.
//!
//! Clip bytes are shared (`Arc<[u8]>`); every play decodes its own voice from them, so
//! several voices can reference one clip at once.

use crate::error::{AccessError, AccessResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One loaded audio clip.
#[derive(Debug, Clone)]
pub struct Clip {
    name: String,
    data: Arc<[u8]>,
    looping: bool,
}

impl Clip {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>, looping: bool) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            looping,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Whether the clip loops by default when played.
    pub fn looping(&self) -> bool {
        self.looping
    }
}

/// Clip name to clip, for one mixer.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: HashMap<String, Clip>,
    looping: Vec<String>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from clips already in memory.
    pub fn from_clips(clips: impl IntoIterator<Item = Clip>) -> Self {
        let mut library = Self::new();
        for clip in clips {
            library.insert(clip);
        }
        library
    }

    /// Mark clip names that should loop when loaded. Applies to clips loaded afterwards.
    pub fn with_looping<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.looping.extend(names.into_iter().map(Into::into));
        self
    }

    /// Load every `*.wav` file in `dir`.
    ///
    /// A missing directory is created and yields an empty library; files that fail to
    /// read are logged and skipped.
    pub fn load_dir(mut self, dir: &Path) -> AccessResult<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            warn!(dir = %dir.display(), "Created empty clip folder. Add WAV files!");
            return Ok(self);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_wav(p))
            .collect();
        paths.sort();

        for path in paths {
            if let Err(e) = self.load_file(&path) {
                warn!("Skipping clip: {}", e);
            }
        }

        info!(dir = %dir.display(), count = self.clips.len(), "Loaded cue clips");
        Ok(self)
    }

    /// Load a single file under its file name.
    pub fn load_file(&mut self, path: &Path) -> AccessResult<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AccessError::ClipLoad {
                name: path.display().to_string(),
                reason: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();
        let bytes = fs::read(path).map_err(|e| AccessError::ClipLoad {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let looping = self.looping.iter().any(|l| *l == name);
        debug!(clip = %name, looping, bytes = bytes.len(), "Loaded clip");
        self.insert(Clip::new(name, bytes, looping));
        Ok(())
    }

    pub fn insert(&mut self, clip: Clip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    pub fn get(&self, name: &str) -> AccessResult<&Clip> {
        self.clips
            .get(name)
            .ok_or_else(|| AccessError::ClipNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}
