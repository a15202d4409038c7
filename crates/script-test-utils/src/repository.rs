//! [`LocalRepository`]: a temp directory with the artifact layout local
//! repository resolvers search.
//!
//! Artifacts are placed at
//! `<root>/<group path>/<artifact>/<version>/<artifact>-<version>.jar`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct LocalRepository {
    temp_dir: TempDir,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `file://` URL of the repository root, usable as a repository directive.
    pub fn url(&self) -> String {
        format!("file://{}", self.root().display())
    }

    /// Publish an artifact for `coordinate` (`[group:]artifact:version`).
    ///
    /// # Panics
    /// Panics if the coordinate does not have two or three parts.
    pub fn publish(&self, coordinate: &str) -> PathBuf {
        let parts: Vec<&str> = coordinate.split(':').collect();
        let (group, artifact, version) = match parts.as_slice() {
            [artifact, version] => (None, *artifact, *version),
            [group, artifact, version] => (Some(*group), *artifact, *version),
            _ => panic!("LocalRepository::publish: bad coordinate '{coordinate}'"),
        };

        let mut dir = self.root().to_path_buf();
        if let Some(group) = group {
            dir.extend(group.split('.'));
        }
        dir.push(artifact);
        dir.push(version);
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join(format!("{artifact}-{version}.jar"));
        fs::write(&path, coordinate).unwrap();
        path
    }
}
