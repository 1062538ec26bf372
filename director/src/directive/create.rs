use crate::error::{Rejection, Result, Verdict};
use crate::extract::Extract;
use crate::staging::StagingFs;

use super::{require_targets, require_usable};

/// `CREATE 'a' 'b'`: make new empty files.
#[derive(Debug, Default)]
pub struct Create;

impl Create {
    pub fn validate(&mut self, fs: &mut StagingFs, extract: &Extract) -> Verdict {
        require_targets(extract)?;
        for path in extract.paths() {
            require_usable(fs, &path)?;
            if fs.occupied(&path) {
                return Err(Rejection::new(format!("file '{}' already exists", path)));
            }
            fs.track(&path);
        }
        Ok(())
    }

    pub fn setup(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        for path in extract.paths() {
            fs.create_file(&path)?;
        }
        Ok(())
    }
}
