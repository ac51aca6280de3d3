use std::path::{Component, Path, PathBuf};

/// Resolves paths written in a config file relative to that file's directory.
#[derive(Clone, Debug)]
pub struct PathResolver {
    base_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Self {
        let base_dir = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        clean(&self.base_dir.join(p))
    }

    pub fn resolve_str(&self, s: &mut String) {
        if s.trim().is_empty() {
            return;
        }
        let resolved = self.resolve(Path::new(s.as_str()));
        *s = resolved.to_string_lossy().to_string();
    }
}

fn clean(joined: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in joined.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::Normal(_) => {
                out.push(c.as_os_str())
            }
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_config_dir() {
        let r = PathResolver::new(Path::new("studies/pilot/study.yaml"));
        assert_eq!(r.resolve(Path::new("out")), PathBuf::from("studies/pilot/out"));
        assert_eq!(
            r.resolve(Path::new("../shared/benign.db")),
            PathBuf::from("studies/shared/benign.db")
        );
    }

    #[test]
    fn absolute_and_empty_are_untouched() {
        let r = PathResolver::new(Path::new("study.yaml"));
        assert_eq!(r.resolve(Path::new("/tmp/out")), PathBuf::from("/tmp/out"));
        let mut empty = String::new();
        r.resolve_str(&mut empty);
        assert!(empty.is_empty());
        let mut bare = "out".to_string();
        r.resolve_str(&mut bare);
        assert_eq!(bare, "out");
    }
}
