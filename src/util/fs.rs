//! Filesystem utilities.

use std::path::{Component, Path, PathBuf};

/// Make a path absolute against the current directory without touching the
/// filesystem, then clean `.` and `..` lexically.
pub fn absolute_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    clean_path(&absolute)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&base.join(path))
    }
}

/// Remove `.` components and fold `..` into its parent, lexically.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    cleaned.components().next_back(),
                    Some(Component::Normal(_))
                ) && cleaned.pop();
                if !popped && !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Convert a path string as written in an MSBuild file (backslash
/// separated) into a host path.
pub fn host_path(raw: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(raw)
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes, as external tools expect in lists.
pub fn display_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_folds_parent_components() {
        assert_eq!(
            clean_path(Path::new("/work/app/./src/../include")),
            PathBuf::from("/work/app/include")
        );
        assert_eq!(clean_path(Path::new("../shared/./inc")), PathBuf::from("../shared/inc"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/work/app");
        assert_eq!(
            resolve_against(base, Path::new("../lib/include")),
            PathBuf::from("/work/lib/include")
        );
        assert_eq!(
            resolve_against(base, Path::new("/opt/include")),
            PathBuf::from("/opt/include")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_host_path_converts_backslashes() {
        assert_eq!(host_path(r"..\common\include"), PathBuf::from("../common/include"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/work"), Path::new("/work/app/src")),
            PathBuf::from("app/src")
        );
    }
}
