use std::borrow::Cow;
use std::env;
use std::path::{Component, Path};

use anyhow::{Result, bail};

/// Validates that a project path recorded in a log is safe to display and
/// filter on: absolute and free of `..` components.
///
/// # Errors
///
/// Returns an error if:
/// - The path contains '..' components (path traversal)
/// - The path is not absolute
pub fn validate_project_path(path: &Path) -> Result<()> {
    if path.components().any(|c| c == Component::ParentDir) {
        bail!("Path contains '..' component: {}", path.display());
    }

    if !path.is_absolute() {
        bail!("Path must be absolute: {}", path.display());
    }

    Ok(())
}

/// Last component of a project path, used as its short display name
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ai_history_search::utils::project_name;
///
/// assert_eq!(project_name(Some(Path::new("/Users/alice/code/api"))), "api");
/// assert_eq!(project_name(None), "?");
/// ```
pub fn project_name(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "?".to_string())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use ai_history_search::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Documents");
/// // Returns "~/Documents" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
