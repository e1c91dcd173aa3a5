//! Relative link-target computation.
//!
//! Symbolic links created by the engine are always expressed relative to the
//! directory that contains them, so a checkout deployed at one absolute
//! location keeps working when the whole project moves. The computation is
//! purely lexical and independent of the current working directory.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem.
///
/// A `..` at the start of a relative path (or one that would climb past a
/// root) is preserved.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Compute the path of `target` relative to the directory `base`.
///
/// Both paths should be absolute; they are lexically normalized first. If
/// the two paths share no common prefix (e.g. different drive prefixes on
/// Windows), the normalized `target` is returned unchanged.
#[must_use]
pub fn relative_from(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);

    let base_components: Vec<Component<'_>> = base.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let common = base_components
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return target;
    }

    let mut out = PathBuf::new();
    for _ in base_components.iter().skip(common) {
        out.push("..");
    }
    for component in target_components.iter().skip(common) {
        out.push(component);
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
