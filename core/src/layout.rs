//! On-disk layout of a generated `.xcodeproj` bundle.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PbxError;
use crate::error::Result;

const PROJECT_FILE: &str = "project.pbxproj";

/// `<root>/<name>.xcodeproj` and the files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBundle {
    root: PathBuf,
    name: String,
}

/// Paths written by [`ProjectBundle::write_generated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub project_file: PathBuf,
    pub scheme_file: PathBuf,
}

impl ProjectBundle {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.root.join(format!("{}.xcodeproj", self.name))
    }

    pub fn project_file(&self) -> PathBuf {
        self.bundle_dir().join(PROJECT_FILE)
    }

    pub fn scheme_file(&self) -> PathBuf {
        self.bundle_dir()
            .join("xcshareddata")
            .join("xcschemes")
            .join(format!("{}.xcscheme", self.name))
    }

    pub fn user_data_dir(&self) -> PathBuf {
        self.bundle_dir().join("xcuserdata")
    }

    /// Write the project file and shared scheme, creating the bundle
    /// directories (including an empty `xcuserdata`) first.
    pub fn write_generated(&self, project: &str, scheme: &str) -> Result<WrittenArtifacts> {
        fs::create_dir_all(self.user_data_dir())?;
        let artifacts = WrittenArtifacts {
            project_file: self.project_file(),
            scheme_file: self.scheme_file(),
        };
        write_atomic(&artifacts.project_file, project)?;
        write_atomic(&artifacts.scheme_file, scheme)?;
        Ok(artifacts)
    }
}

/// Replace `path` with `contents` through a temporary file in the same
/// directory, so readers never observe a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    match fs::metadata(path) {
        Ok(existing) => temp.as_file().set_permissions(existing.permissions())?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => set_default_mode(temp.as_file())?,
        Err(err) => return Err(err.into()),
    }
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| PbxError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Mode for files that did not exist before (`rw-r--r--`).
#[cfg(unix)]
fn set_default_mode(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_mode(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
