use crate::cursor::TargetCursor;
use crate::error::{Result, Verdict};
use crate::extract::Extract;
use crate::procedure::Procedure;
use crate::staging::StagingFs;

use super::{DirectiveKind, require_existing, require_procedure, require_targets};

/// `EDIT 'a' 'b' <procedure>`: buffer every target, let the procedure
/// rewrite each buffer in turn, then write them all back.
#[derive(Debug, Default)]
pub struct Edit {
    buffers: Vec<Vec<String>>,
    pub(super) cursor: TargetCursor,
}

impl Edit {
    pub fn validate(
        &mut self,
        fs: &mut StagingFs,
        extract: &Extract,
        procedure: Option<&Procedure>,
    ) -> Verdict {
        require_targets(extract)?;
        for path in extract.paths() {
            require_existing(fs, &path)?;
        }
        require_procedure(DirectiveKind::Edit, procedure)
    }

    pub fn setup(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        self.buffers = extract
            .paths()
            .map(|path| fs.read_lines(&path))
            .collect::<Result<_>>()?;
        self.cursor = TargetCursor::new(self.buffers.len());
        Ok(())
    }

    pub fn teardown(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        for (path, buffer) in extract.paths().zip(&self.buffers) {
            fs.write_content(&path, &buffer.concat())?;
        }
        Ok(())
    }

    /// The buffer of the target the cursor is on.
    pub fn current_mut(&mut self) -> Option<&mut Vec<String>> {
        let index = self.cursor.current_index()?;
        self.buffers.get_mut(index)
    }

    pub fn buffers(&self) -> &[Vec<String>] {
        &self.buffers
    }
}
