//! Build a [`TmTree`] from files and folders.

use std::path::{Path, MAIN_SEPARATOR_STR};

use crate::path_format::PathFormat;
use crate::{NodeId, TmTree};

/// Folders are internal nodes, regular files are leaves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileSystemFormat;

impl PathFormat for FileSystemFormat {
    fn separator(&self) -> &str {
        MAIN_SEPARATOR_STR
    }

    fn suffix(&self, is_leaf: bool) -> &str {
        if is_leaf {
            " (file)"
        } else {
            " (folder)"
        }
    }
}

/// Create a tree of all the files and folders below `path`.
///
/// Files are sized by their length in bytes.
/// A folder without entries is a leaf of size 1.
/// Symlinks are not followed.
///
/// # Errors
///
/// Errors when `path` itself can not be read.
/// Entries below it which can not be read are skipped.
pub fn from_path(path: &Path) -> std::io::Result<TmTree> {
    from_path_into(TmTree::new(), path)
}

/// Same as [`from_path`] but inserts into the given `tree`, keeping its colour source.
///
/// # Errors
///
/// Errors when `path` itself can not be read.
pub fn from_path_into(tree: TmTree, path: &Path) -> std::io::Result<TmTree> {
    let mut tree = tree.with_format(FileSystemFormat);
    insert_recursive(&mut tree, path)?;
    Ok(tree)
}

fn name_of(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn insert_recursive(tree: &mut TmTree, path: &Path) -> std::io::Result<NodeId> {
    let metadata = path.symlink_metadata()?;
    let name = name_of(path);
    if !metadata.is_dir() {
        return Ok(tree.insert_leaf(name, metadata.len()));
    }

    let mut entries = path
        .read_dir()?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                log::warn!("skip entry of {}: {err}", path.display());
                None
            }
        })
        .collect::<Vec<_>>();
    entries.sort();

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        match insert_recursive(tree, &entry) {
            Ok(child) => children.push(child),
            Err(err) => log::warn!("skip {}: {err}", entry.display()),
        }
    }

    if children.is_empty() {
        return Ok(tree.insert_leaf(name, 1));
    }
    let id = tree
        .insert(name, children)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    Ok(id)
}

#[cfg(test)]
fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tui-treemap-{name}-{}-{}",
        std::process::id(),
        fastrand::u64(..)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn folders_sum_up_their_files() {
    let dir = scratch_dir("sum");
    std::fs::write(dir.join("b.txt"), [0; 20]).unwrap();
    std::fs::write(dir.join("a.txt"), [0; 10]).unwrap();
    std::fs::create_dir(dir.join("empty")).unwrap();
    std::fs::create_dir(dir.join("sub")).unwrap();
    std::fs::write(dir.join("sub").join("c.txt"), [0; 5]).unwrap();

    let tree = from_path(&dir).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let root = tree.root().unwrap();
    assert_eq!(tree[root].data_size(), 10 + 20 + 1 + 5);
    let names = tree[root]
        .children()
        .iter()
        .map(|&child| tree[child].name().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, ["a.txt", "b.txt", "empty", "sub"]);
    tree.check_invariants().unwrap();

    let sub = tree[root].children()[3];
    let c = tree[sub].children()[0];
    let expected = format!(
        "{}{MAIN_SEPARATOR_STR}sub{MAIN_SEPARATOR_STR}c.txt (file)",
        name_of(&dir)
    );
    assert_eq!(tree.path_string(c, true).unwrap(), expected);
    assert!(tree.path_string(sub, true).unwrap().ends_with("sub (folder)"));
}

#[test]
fn single_file_is_a_leaf() {
    let dir = scratch_dir("file");
    let file = dir.join("only.bin");
    std::fs::write(&file, [0; 42]).unwrap();
    let tree = from_path(&file).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let root = tree.root().unwrap();
    assert!(tree[root].is_leaf());
    assert_eq!(tree[root].data_size(), 42);
    assert_eq!(tree.path_string(root, true).unwrap(), "only.bin (file)");
}

#[test]
fn missing_path_errors() {
    let dir = scratch_dir("missing");
    let result = from_path(&dir.join("does-not-exist"));
    std::fs::remove_dir_all(&dir).unwrap();
    assert!(result.is_err());
}
