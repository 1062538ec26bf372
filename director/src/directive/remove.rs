use crate::error::{Result, Verdict};
use crate::extract::Extract;
use crate::staging::StagingFs;

use super::{require_existing, require_targets};

/// `REMOVE 'a'`: delete files. The deletion is staged and only reaches the
/// real filesystem on apply.
#[derive(Debug, Default)]
pub struct Remove;

impl Remove {
    pub fn validate(&mut self, fs: &mut StagingFs, extract: &Extract) -> Verdict {
        require_targets(extract)?;
        for path in extract.paths() {
            require_existing(fs, &path)?;
        }
        for path in extract.paths() {
            fs.untrack(&path);
        }
        Ok(())
    }

    pub fn setup(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        for path in extract.paths() {
            fs.remove_file(&path)?;
        }
        Ok(())
    }
}
