//! Project directory store.
//!
//! A project is a directory directly under the projects root. It holds the
//! rendered frames, batch logs and the [`StatusFile`]. Scene files shared by
//! all projects live in the reserved `input_files` directory.
//!
//! All operations are synchronous filesystem calls; async callers should
//! run them on a blocking thread.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;
use crate::paths::{display_name, join_component, project_dir_name};
use crate::status_file::StatusFile;

/// Shared directory for uploaded scene files.
pub const INPUT_FILES_DIR: &str = "input_files";

/// Name that routes to the "new project" view instead of a project.
pub const NEW_PROJECT_NAME: &str = "new";

/// Extension of rendered frame images.
const FRAME_EXTENSION: &str = "png";

/// Extension of Blender scene files.
const SCENE_EXTENSION: &str = "blend";

/// Whether `name` is reserved and cannot be used as a project.
pub fn is_reserved_name(name: &str) -> bool {
    name == INPUT_FILES_DIR || name == NEW_PROJECT_NAME
}

/// Summary of a project for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub display_name: String,
}

impl ProjectEntry {
    fn new(name: String) -> Self {
        let display_name = display_name(&name);
        Self { name, display_name }
    }
}

/// Contents of a single project at the time it was read.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSnapshot {
    pub name: String,
    pub display_name: String,
    pub path: PathBuf,
    /// File names of rendered frames, sorted.
    pub images: Vec<String>,
    pub status: StatusFile,
}

#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_files_dir(&self) -> PathBuf {
        self.root.join(INPUT_FILES_DIR)
    }

    /// Create the projects root and the shared input directory.
    pub fn ensure_layout(&self) -> Result<(), CoreError> {
        std::fs::create_dir_all(self.input_files_dir())?;
        Ok(())
    }

    /// Resolve a project directory name to its path under the root.
    pub fn project_path(&self, name: &str) -> Result<PathBuf, CoreError> {
        if is_reserved_name(name) {
            return Err(CoreError::Validation(format!(
                "'{name}' is reserved and cannot be used as a project"
            )));
        }
        join_component(&self.root, name)
    }

    /// Resolve a file name inside the shared input directory.
    pub fn input_file_path(&self, file_name: &str) -> Result<PathBuf, CoreError> {
        join_component(&self.input_files_dir(), file_name)
    }

    /// Path of an existing project directory.
    pub fn existing_project_path(&self, name: &str) -> Result<PathBuf, CoreError> {
        let path = self.project_path(name)?;
        if !path.is_dir() {
            return Err(not_found(name));
        }
        Ok(path)
    }

    /// Create a project from a user-typed name; returns its directory name.
    ///
    /// Spaces become underscores. The new project starts with an empty
    /// status file.
    pub fn create(&self, name: &str) -> Result<String, CoreError> {
        let dir_name = project_dir_name(name);
        let path = self.project_path(&dir_name)?;
        if path.exists() {
            return Err(CoreError::Conflict(format!(
                "Project '{dir_name}' already exists"
            )));
        }

        std::fs::create_dir_all(&path)?;
        StatusFile::default().save(&path)?;
        tracing::info!(project = %dir_name, "Created project");
        Ok(dir_name)
    }

    /// Copy `source` to a new project `new_name`; the source is kept.
    ///
    /// Returns the new directory name.
    pub fn duplicate(&self, source: &str, new_name: &str) -> Result<String, CoreError> {
        let source_path = self.existing_project_path(source)?;
        let dest_name = project_dir_name(new_name);
        let dest_path = self.project_path(&dest_name)?;
        if dest_path.exists() {
            return Err(CoreError::Conflict(format!(
                "Project '{dest_name}' already exists"
            )));
        }

        copy_dir_recursive(&source_path, &dest_path)?;
        tracing::info!(source, dest = %dest_name, "Duplicated project");
        Ok(dest_name)
    }

    /// Remove a project and everything in it.
    pub fn delete(&self, name: &str) -> Result<(), CoreError> {
        let path = self.existing_project_path(name)?;
        std::fs::remove_dir_all(&path)?;
        tracing::info!(project = name, "Deleted project");
        Ok(())
    }

    /// All projects, sorted by directory name.
    pub fn list(&self) -> Result<Vec<ProjectEntry>, CoreError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == INPUT_FILES_DIR {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names.into_iter().map(ProjectEntry::new).collect())
    }

    /// Read a project's rendered frames and status file.
    ///
    /// A missing status file is created empty.
    pub fn open(&self, name: &str) -> Result<ProjectSnapshot, CoreError> {
        let path = self.existing_project_path(name)?;
        let images = files_with_extension(&path, FRAME_EXTENSION).map_err(|e| {
            tracing::warn!(project = name, error = %e, "Project directory unreadable");
            not_found(name)
        })?;
        let status = StatusFile::load_or_create(&path)?;

        Ok(ProjectSnapshot {
            name: name.to_string(),
            display_name: display_name(name),
            path,
            images,
            status,
        })
    }

    /// Names of scene files previously uploaded to the shared directory.
    pub fn uploaded_blend_files(&self) -> Result<Vec<String>, CoreError> {
        let dir = self.input_files_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        Ok(files_with_extension(&dir, SCENE_EXTENSION)?)
    }
}

fn not_found(name: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id: name.to_string(),
    }
}

/// Sorted names of regular files in `dir` ending in `.{extension}`.
fn files_with_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
