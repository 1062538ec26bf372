use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read as _, Write as _};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{DirectorError, Result};

/// The filesystem as the engine sees it.
///
/// Script paths are relative to `base_dir`. Validation reasons about files
/// through an in-memory tracked set, so a statement can rely on a file an
/// earlier statement will create. Once active, every access is redirected
/// into `sandbox_root`, and the first touch of a path copies the real file
/// there; the real tree is only written by [`StagingFs::commit`].
#[derive(Debug)]
pub struct StagingFs {
    base_dir: PathBuf,
    sandbox_root: PathBuf,
    active: bool,
    /// Paths known to exist before they physically do.
    tracked: HashSet<PathBuf>,
    /// Paths known to be gone before they physically are.
    untracked: HashSet<PathBuf>,
    /// Paths with a sandbox copy.
    staged: BTreeSet<PathBuf>,
    /// Staged paths whose content or mode changed; only these are committed.
    written: BTreeSet<PathBuf>,
    /// Paths whose real file is deleted on commit.
    removed: BTreeSet<PathBuf>,
}

impl StagingFs {
    pub fn new(base_dir: impl Into<PathBuf>, sandbox_root: impl Into<PathBuf>) -> Self {
        StagingFs {
            base_dir: base_dir.into(),
            sandbox_root: sandbox_root.into(),
            active: false,
            tracked: HashSet::new(),
            untracked: HashSet::new(),
            staged: BTreeSet::new(),
            written: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn sandbox_root(&self) -> &Path {
        &self.sandbox_root
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Redirect all further access into the sandbox, forgetting any earlier run.
    pub fn activate(&mut self) {
        self.active = true;
        self.staged.clear();
        self.written.clear();
        self.removed.clear();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    // -----------------------------------------------------------------------
    // Validation-time reasoning
    // -----------------------------------------------------------------------

    /// True if the path exists on the real filesystem or has been tracked,
    /// and has not been untracked since.
    pub fn exists(&self, path: &str) -> bool {
        let key = key(path);
        if self.untracked.contains(&key) {
            return false;
        }
        self.tracked.contains(&key) || self.base_dir.join(&key).is_file()
    }

    /// Like [`StagingFs::exists`], but any real entry counts: a directory or
    /// a dangling symlink occupies the path as much as a file does.
    pub fn occupied(&self, path: &str) -> bool {
        let key = key(path);
        if self.untracked.contains(&key) {
            return false;
        }
        self.tracked.contains(&key) || fs::symlink_metadata(self.base_dir.join(&key)).is_ok()
    }

    pub fn track(&mut self, path: &str) {
        let key = key(path);
        self.untracked.remove(&key);
        self.tracked.insert(key);
    }

    pub fn untrack(&mut self, path: &str) {
        let key = key(path);
        self.tracked.remove(&key);
        self.untracked.insert(key);
    }

    pub fn reset_tracking(&mut self) {
        self.tracked.clear();
        self.untracked.clear();
    }

    /// Whether the path stays inside the base directory once resolved.
    pub fn is_confined(path: &str) -> bool {
        normalize(path).is_some_and(|p| p.components().next().is_some())
    }

    /// Whether the path falls inside the sandbox root, which is rebuilt on
    /// every run and deleted after apply.
    pub fn is_reserved(&self, path: &str) -> bool {
        let Some(root) = self
            .sandbox_root
            .strip_prefix(&self.base_dir)
            .ok()
            .and_then(Path::to_str)
            .and_then(normalize)
        else {
            return false;
        };
        root.components().next().is_some() && key(path).starts_with(&root)
    }

    // -----------------------------------------------------------------------
    // Staged access
    // -----------------------------------------------------------------------

    /// Where `path` lives right now: under the sandbox root once active,
    /// otherwise its real location.
    pub fn canonicalize(&self, path: &str) -> PathBuf {
        if self.active {
            self.sandbox_root.join(key(path))
        } else {
            self.base_dir.join(key(path))
        }
    }

    pub fn open_for_read(&mut self, path: &str) -> Result<File> {
        let target = self.stage(path)?;
        File::open(&target).map_err(|e| DirectorError::io(&target, e))
    }

    pub fn open_for_write(&mut self, path: &str) -> Result<File> {
        let target = self.stage(path)?;
        self.mark_written(path);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&target)
            .map_err(|e| DirectorError::io(&target, e))
    }

    /// The file's lines, each keeping its terminator.
    pub fn read_lines(&mut self, path: &str) -> Result<Vec<String>> {
        let mut content = String::new();
        self.open_for_read(path)?
            .read_to_string(&mut content)
            .map_err(|e| DirectorError::io(self.canonicalize(path), e))?;
        Ok(content.split_inclusive('\n').map(str::to_string).collect())
    }

    /// Replace the file's content. Writing back what is already there is a
    /// no-op and does not mark the path for commit.
    pub fn write_content(&mut self, path: &str, content: &str) -> Result<()> {
        let target = self.stage(path)?;
        if fs::read(&target).is_ok_and(|current| current == content.as_bytes()) {
            return Ok(());
        }
        self.open_for_write(path)?
            .write_all(content.as_bytes())
            .map_err(|e| DirectorError::io(self.canonicalize(path), e))
    }

    /// Create an empty file. Refuses a path that already exists on the real
    /// filesystem unless an earlier statement removed it.
    pub fn create_file(&mut self, path: &str) -> Result<()> {
        let key = key(path);
        let real = self.base_dir.join(&key);
        if real.exists() && !self.removed.contains(&key) {
            return Err(DirectorError::io(
                &real,
                io::Error::new(io::ErrorKind::AlreadyExists, "file already exists"),
            ));
        }

        let target = self.canonicalize(path);
        ensure_parent(&target)?;
        File::create(&target).map_err(|e| DirectorError::io(&target, e))?;
        debug!(path = %target.display(), "created file");

        self.removed.remove(&key);
        if self.active {
            self.staged.insert(key.clone());
            self.written.insert(key);
        }
        Ok(())
    }

    /// Drop the sandbox copy, if any, and stage the real file for deletion.
    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        let key = key(path);
        if !self.active {
            let real = self.base_dir.join(&key);
            return fs::remove_file(&real).map_err(|e| DirectorError::io(&real, e));
        }

        let target = self.sandbox_root.join(&key);
        if target.exists() {
            fs::remove_file(&target).map_err(|e| DirectorError::io(&target, e))?;
        }
        debug!(path = %key.display(), "staged removal");
        self.staged.remove(&key);
        self.written.remove(&key);
        self.removed.insert(key);
        Ok(())
    }

    #[cfg(unix)]
    pub fn chmod(&mut self, path: &str, mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let target = self.stage(path)?;
        fs::set_permissions(&target, fs::Permissions::from_mode(mode))
            .map_err(|e| DirectorError::io(&target, e))?;
        self.mark_written(path);
        debug!(path = %target.display(), "changed mode to {:o}", mode);
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn chmod(&mut self, path: &str, _mode: u32) -> Result<()> {
        Err(DirectorError::io(
            self.canonicalize(path),
            io::Error::new(io::ErrorKind::Unsupported, "permission modes need a unix host"),
        ))
    }

    /// Relative paths that have a sandbox copy, in order.
    pub fn staged_paths(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(PathBuf::as_path)
    }

    /// Relative paths whose sandbox copy differs from the real file, in order.
    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        self.written.iter().map(PathBuf::as_path)
    }

    /// Relative paths staged for deletion, in order.
    pub fn removed_paths(&self) -> impl Iterator<Item = &Path> {
        self.removed.iter().map(PathBuf::as_path)
    }

    /// Copy every written file over its real location and delete every file
    /// staged for removal. Files that were only read are left alone.
    /// Returns the number of real files written or deleted.
    pub fn commit(&mut self) -> Result<usize> {
        let mut changed = 0;

        for key in &self.written {
            let staged = self.sandbox_root.join(key);
            let real = self.base_dir.join(key);
            if !staged.is_file() {
                continue;
            }
            ensure_parent(&real)?;
            fs::copy(&staged, &real).map_err(|e| DirectorError::io(&real, e))?;
            debug!(path = %key.display(), "committed");
            changed += 1;
        }

        for key in &self.removed {
            let real = self.base_dir.join(key);
            if real.is_file() {
                fs::remove_file(&real).map_err(|e| DirectorError::io(&real, e))?;
                debug!(path = %key.display(), "removed");
                changed += 1;
            }
        }

        Ok(changed)
    }

    fn mark_written(&mut self, path: &str) {
        if self.active {
            self.written.insert(key(path));
        }
    }

    /// Canonical location of `path`, creating parent directories and, on the
    /// first touch while active, copying the real file into the sandbox.
    fn stage(&mut self, path: &str) -> Result<PathBuf> {
        let target = self.canonicalize(path);
        ensure_parent(&target)?;

        if !self.active {
            return Ok(target);
        }

        let key = key(path);
        if self.staged.contains(&key) {
            return Ok(target);
        }

        let real = self.base_dir.join(&key);
        if real.is_file() && !self.removed.contains(&key) {
            fs::copy(&real, &target).map_err(|e| DirectorError::io(&target, e))?;
            debug!(path = %key.display(), "copied into sandbox");
        }
        self.staged.insert(key);
        Ok(target)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| DirectorError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Lexically resolve `.` and `..`. `None` for absolute paths and paths that
/// climb out of the base directory.
fn normalize(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn key(path: &str) -> PathBuf {
    normalize(path).unwrap_or_else(|| PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::StagingFs;

    #[test]
    fn confinement() {
        assert!(StagingFs::is_confined("a.txt"));
        assert!(StagingFs::is_confined("./dir/../a.txt"));
        assert!(!StagingFs::is_confined("../a.txt"));
        assert!(!StagingFs::is_confined("/etc/passwd"));
        assert!(!StagingFs::is_confined("."));
    }

    #[test]
    fn tracking_is_path_normalized() {
        let mut fs = StagingFs::new("/nonexistent-base", "/nonexistent-base/.sandbox");
        fs.track("./dir/a.txt");
        assert!(fs.exists("dir/a.txt"));
        fs.untrack("dir/./a.txt");
        assert!(!fs.exists("dir/a.txt"));
    }

    #[test]
    fn sandbox_paths_are_reserved() {
        let fs = StagingFs::new("/base", "/base/.sandbox");
        assert!(fs.is_reserved(".sandbox/x.txt"));
        assert!(fs.is_reserved("./.sandbox"));
        assert!(fs.is_reserved("dir/../.sandbox/x"));
        assert!(!fs.is_reserved(".sandboxes/x"));
        assert!(!fs.is_reserved("x.txt"));

        let outside = StagingFs::new("/base", "/elsewhere/.sandbox");
        assert!(!outside.is_reserved(".sandbox/x.txt"));
    }

    #[test]
    fn canonicalize_follows_activation() {
        let mut fs = StagingFs::new("/base", "/base/.sandbox");
        assert_eq!(fs.canonicalize("a/b.txt"), std::path::Path::new("/base/a/b.txt"));
        fs.activate();
        assert_eq!(
            fs.canonicalize("a/b.txt"),
            std::path::Path::new("/base/.sandbox/a/b.txt")
        );
    }
}
