//! Path construction for user-supplied names.
//!
//! Every path built from request input goes through [`safe_join`], which
//! only accepts plain relative components, so the result always stays under
//! the given root.

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

/// Join `relative` onto `root`, rejecting anything that could escape it.
///
/// Rejected: empty input, absolute paths, `..`, `.` and NUL bytes.
pub fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    if relative.trim().is_empty() {
        return Err(CoreError::Validation("Path must not be empty".to_string()));
    }
    if relative.contains('\0') {
        return Err(CoreError::Validation(
            "Path must not contain NUL bytes".to_string(),
        ));
    }

    let mut joined = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            _ => {
                return Err(CoreError::Validation(format!(
                    "Path '{relative}' must stay inside its parent directory"
                )))
            }
        }
    }
    Ok(joined)
}

/// Like [`safe_join`], but `name` must be a single path component.
pub fn join_component(root: &Path, name: &str) -> Result<PathBuf, CoreError> {
    if name.contains('/') || name.contains('\\') {
        return Err(CoreError::Validation(format!(
            "Name '{name}' must not contain path separators"
        )));
    }
    safe_join(root, name)
}

/// Directory name for a project name typed by the user.
pub fn project_dir_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Human-readable name for a project directory.
pub fn display_name(dir_name: &str) -> String {
    dir_name.replace('_', " ")
}
