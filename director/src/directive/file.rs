use crate::cursor::TargetCursor;
use crate::error::Verdict;
use crate::extract::Extract;
use crate::staging::StagingFs;

use super::require_existing;

/// `FILE 'a' 'b' <procedure>`: select files for a procedure that works on
/// the files themselves rather than their content, such as CHMOD.
#[derive(Debug, Default)]
pub struct FileSelect {
    targets: Vec<String>,
    pub(super) cursor: TargetCursor,
}

impl FileSelect {
    pub fn validate(&mut self, fs: &mut StagingFs, extract: &Extract) -> Verdict {
        for path in extract.paths() {
            require_existing(fs, &path)?;
        }
        Ok(())
    }

    pub fn setup(&mut self, extract: &Extract) -> crate::error::Result<()> {
        self.targets = extract.paths().map(|p| p.into_owned()).collect();
        self.cursor = TargetCursor::new(self.targets.len());
        Ok(())
    }

    /// The path the cursor is on.
    pub fn current(&self) -> Option<&str> {
        let index = self.cursor.current_index()?;
        self.targets.get(index).map(String::as_str)
    }
}
