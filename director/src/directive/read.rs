use crate::error::{Rejection, Result, Verdict};
use crate::extract::Extract;
use crate::procedure::Procedure;
use crate::staging::StagingFs;

use super::require_existing;

/// `READ 'a' <procedure>`: buffer one file's lines for a procedure to
/// consume. The source file itself is never written.
#[derive(Debug, Default)]
pub struct Read {
    lines: Vec<String>,
    /// Destinations recorded by COPYTO, written at teardown.
    copies: Vec<String>,
}

impl Read {
    pub fn validate(
        &mut self,
        fs: &mut StagingFs,
        extract: &Extract,
        _procedure: Option<&Procedure>,
    ) -> Verdict {
        if extract.params.len() != 1 {
            return Err(Rejection::new(format!(
                "takes exactly one path, got {}",
                extract.params.len()
            )));
        }
        for path in extract.paths() {
            require_existing(fs, &path)?;
        }
        // A bare READ only checks that the file is there.
        Ok(())
    }

    pub fn setup(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        self.copies.clear();
        self.lines = match extract.paths().next() {
            Some(path) => fs.read_lines(&path)?,
            None => Vec::new(),
        };
        Ok(())
    }

    pub fn teardown(&mut self, fs: &mut StagingFs) -> Result<()> {
        let content = self.lines.concat();
        for destination in &self.copies {
            fs.write_content(destination, &content)?;
        }
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn copy_to(&mut self, destination: impl Into<String>) {
        self.copies.push(destination.into());
    }
}
