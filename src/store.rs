//! Level files on disk
//!
//! Levels live as `<name>.lvl` text files in three bucket folders under a
//! root: shipped levels, hidden bonus levels that unlock during play, and the
//! player's own creations.

use std::path::{Path, PathBuf};

use crate::level::{self, LevelDef, LevelError};

/// File extension of stored levels
pub const EXTENSION: &str = "lvl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Builtin,
    Hidden,
    Custom,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Builtin, Bucket::Hidden, Bucket::Custom];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Bucket::Builtin => "builtin",
            Bucket::Hidden => "hidden",
            Bucket::Custom => "custom",
        }
    }
}

/// File stem for a level name; path separators and reserved characters become `_`
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\n' | '\r' => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem.starts_with('.') {
        format!("_{stem}")
    } else {
        stem
    }
}

#[derive(Debug, Clone)]
pub struct LevelStore {
    root: PathBuf,
}

impl LevelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, bucket: Bucket, name: &str) -> PathBuf {
        self.root
            .join(bucket.dir_name())
            .join(format!("{}.{EXTENSION}", file_stem(name)))
    }

    /// Raw level text
    pub fn load_text(&self, bucket: Bucket, name: &str) -> Result<String, LevelError> {
        let path = self.path(bucket, name);
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LevelError::NotFound(format!("{}/{name}", bucket.dir_name())),
            _ => LevelError::Io(e),
        })
    }

    pub fn load(&self, bucket: Bucket, name: &str) -> Result<LevelDef, LevelError> {
        let text = self.load_text(bucket, name)?;
        level::decode(&text)
    }

    /// Encode and write `level` under its own name
    pub fn save(&self, bucket: Bucket, level: &LevelDef) -> Result<PathBuf, LevelError> {
        let path = self.path(bucket, &level.name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, level::encode(level) + "\n")?;
        log::info!("saved {:?} to {}", level.name, path.display());
        Ok(path)
    }

    /// Level names in a bucket, sorted; a missing bucket folder is empty
    pub fn list(&self, bucket: Bucket) -> Result<Vec<String>, LevelError> {
        let dir = self.root.join(bucket.dir_name());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION)
                && let Some(stem) = path.file_stem()
            {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Copy a hidden bonus level into the custom bucket once it is unlocked
    pub fn reveal(&self, name: &str) -> Result<PathBuf, LevelError> {
        let text = self.load_text(Bucket::Hidden, name)?;
        let path = self.path(Bucket::Custom, name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, text)?;
        log::info!("revealed bonus level {name:?}");
        Ok(path)
    }

    /// Decode every stored level, reporting each result
    pub fn validate_all(&self) -> Result<Vec<(Bucket, String, Result<LevelDef, LevelError>)>, LevelError> {
        let mut results = Vec::new();
        for bucket in Bucket::ALL {
            for name in self.list(bucket)? {
                let loaded = self.load(bucket, &name);
                results.push((bucket, name, loaded));
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;
    use crate::grid::Coord;
    use crate::level::Block;

    fn scratch(name: &str) -> LevelStore {
        let dir = std::env::temp_dir().join(format!("gravity-grid-store-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        LevelStore::new(dir)
    }

    #[test]
    fn save_load_and_list() {
        let store = scratch("roundtrip");
        let mut level = LevelDef::blank("first steps");
        level.set_block(Coord::new(0, 1), Block::new(BlockKind::Ground));
        store.save(Bucket::Custom, &level).unwrap();
        store.save(Bucket::Custom, &LevelDef::blank("a/b")).unwrap();

        assert_eq!(store.load(Bucket::Custom, "first steps").unwrap(), level);
        assert_eq!(store.list(Bucket::Custom).unwrap(), ["a_b", "first steps"]);
        assert!(store.list(Bucket::Builtin).unwrap().is_empty());
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn missing_levels_are_not_found() {
        let store = scratch("missing");
        assert!(matches!(store.load(Bucket::Builtin, "nope"), Err(LevelError::NotFound(_))));
    }

    #[test]
    fn reveal_and_validate() {
        let store = scratch("reveal");
        store.save(Bucket::Hidden, &LevelDef::blank("secret")).unwrap();
        std::fs::create_dir_all(store.root().join("builtin")).unwrap();
        std::fs::write(store.path(Bucket::Builtin, "broken"), "5zz").unwrap();

        store.reveal("secret").unwrap();
        assert_eq!(store.list(Bucket::Custom).unwrap(), ["secret"]);

        let results = store.validate_all().unwrap();
        assert_eq!(results.len(), 3);
        let broken = results.iter().find(|(_, name, _)| name == "broken").unwrap();
        assert!(broken.2.is_err());
        assert!(results.iter().filter(|(_, name, _)| name == "secret").all(|r| r.2.is_ok()));
        let _ = std::fs::remove_dir_all(store.root());
    }
}
