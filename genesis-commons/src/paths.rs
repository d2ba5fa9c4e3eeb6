use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Paths without a tilde prefix, and every path when no home directory can
/// be determined, are returned unchanged.
pub fn expand_home(raw: &str) -> PathBuf {
    expand_home_with(raw, dirs::home_dir().as_deref())
}

/// Same as [`expand_home`] with an explicit home directory.
pub fn expand_home_with(raw: &str, home: Option<&Path>) -> PathBuf {
    let trimmed = raw.trim();
    if let Some(home) = home {
        if trimmed == "~" {
            return home.to_path_buf();
        }
        if let Some(rest) = trimmed
            .strip_prefix("~/")
            .or_else(|| trimmed.strip_prefix("~\\"))
        {
            return home.join(rest);
        }
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_parent_components() {
        let path = Path::new("/srv/genesis/./sandboxes/../workspace");
        assert_eq!(normalize_path(path), PathBuf::from("/srv/genesis/workspace"));
    }

    #[test]
    fn tilde_is_expanded_against_home() {
        let home = Path::new("/home/ada");
        assert_eq!(
            expand_home_with("~/sandboxes", Some(home)),
            PathBuf::from("/home/ada/sandboxes")
        );
        assert_eq!(expand_home_with("~", Some(home)), PathBuf::from("/home/ada"));
    }

    #[test]
    fn non_tilde_paths_are_untouched() {
        let home = Path::new("/home/ada");
        assert_eq!(
            expand_home_with("/var/lib/genesis", Some(home)),
            PathBuf::from("/var/lib/genesis")
        );
        assert_eq!(
            expand_home_with("~other/dir", Some(home)),
            PathBuf::from("~other/dir")
        );
        assert_eq!(expand_home_with("~/x", None), PathBuf::from("~/x"));
    }
}
