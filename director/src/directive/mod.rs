pub mod create;
pub mod edit;
pub mod file;
pub mod read;
pub mod remove;

use std::borrow::Cow;
use std::fmt;

pub use create::Create;
pub use edit::Edit;
pub use file::FileSelect;
pub use read::Read;
pub use remove::Remove;

use crate::error::{Rejection, Result, Verdict};
use crate::extract::Extract;
use crate::procedure::Procedure;
use crate::staging::StagingFs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Create,
    Read,
    Edit,
    Remove,
    File,
}

impl DirectiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Create => "CREATE",
            DirectiveKind::Read => "READ",
            DirectiveKind::Edit => "EDIT",
            DirectiveKind::Remove => "REMOVE",
            DirectiveKind::File => "FILE",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One occurrence of a directive in a script, owning its own state.
#[derive(Debug)]
pub enum Directive {
    Create(Create),
    Read(Read),
    Edit(Edit),
    Remove(Remove),
    File(FileSelect),
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Create(_) => DirectiveKind::Create,
            Directive::Read(_) => DirectiveKind::Read,
            Directive::Edit(_) => DirectiveKind::Edit,
            Directive::Remove(_) => DirectiveKind::Remove,
            Directive::File(_) => DirectiveKind::File,
        }
    }

    /// Check the targets against the staging filesystem. May track or
    /// untrack paths so later statements see this one's effect.
    pub fn validate(
        &mut self,
        fs: &mut StagingFs,
        extract: &Extract,
        procedure: Option<&Procedure>,
    ) -> Verdict {
        match self {
            Directive::Create(d) => d.validate(fs, extract),
            Directive::Read(d) => d.validate(fs, extract, procedure),
            Directive::Edit(d) => d.validate(fs, extract, procedure),
            Directive::Remove(d) => d.validate(fs, extract),
            Directive::File(d) => d.validate(fs, extract),
        }
    }

    /// Runs once, before any procedure runs.
    pub fn setup(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        match self {
            Directive::Create(d) => d.setup(fs, extract),
            Directive::Read(d) => d.setup(fs, extract),
            Directive::Edit(d) => d.setup(fs, extract),
            Directive::Remove(d) => d.setup(fs, extract),
            Directive::File(d) => d.setup(extract),
        }
    }

    /// Runs once, after every procedure run.
    pub fn teardown(&mut self, fs: &mut StagingFs, extract: &Extract) -> Result<()> {
        match self {
            Directive::Read(d) => d.teardown(fs),
            Directive::Edit(d) => d.teardown(fs, extract),
            Directive::Create(_) | Directive::Remove(_) | Directive::File(_) => Ok(()),
        }
    }

    /// Whether the bound procedure runs once per target rather than once.
    pub fn repeat_per_target(&self) -> bool {
        matches!(self, Directive::Edit(_) | Directive::File(_))
    }

    pub fn advance(&mut self) -> bool {
        match self {
            Directive::Edit(d) => d.cursor.advance(),
            Directive::File(d) => d.cursor.advance(),
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Directive::Edit(d) => d.cursor.reset(),
            Directive::File(d) => d.cursor.reset(),
            _ => {}
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            Directive::Edit(d) => d.cursor.current_index(),
            Directive::File(d) => d.cursor.current_index(),
            _ => None,
        }
    }

    /// The path the cursor is on, for directives that repeat per target.
    pub fn current_target<'a>(&self, extract: &'a Extract) -> Option<Cow<'a, str>> {
        let index = self.current_index()?;
        extract.params.get(index).map(|p| p.joined())
    }
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn require_targets(extract: &Extract) -> Verdict {
    if extract.params.is_empty() {
        return Err(Rejection::new("needs at least one path"));
    }
    Ok(())
}

/// The path must be non-blank, stay inside the working directory and exist
/// (really or through an earlier statement).
fn require_existing(fs: &StagingFs, path: &str) -> Verdict {
    require_usable(fs, path)?;
    if !fs.exists(path) {
        return Err(Rejection::new(format!("file '{}' does not exist", path)));
    }
    Ok(())
}

/// The path must be non-blank and name a file the script may touch: inside
/// the working directory and outside the sandbox.
pub(crate) fn require_usable(fs: &StagingFs, path: &str) -> Verdict {
    if path.is_empty() {
        return Err(Rejection::new("path must not be blank"));
    }
    if !StagingFs::is_confined(path) {
        return Err(Rejection::new(format!(
            "path '{}' escapes the working directory",
            path
        )));
    }
    if fs.is_reserved(path) {
        return Err(Rejection::new(format!(
            "path '{}' is inside the sandbox directory",
            path
        )));
    }
    Ok(())
}

fn require_procedure(
    kind: DirectiveKind,
    procedure: Option<&Procedure>,
) -> Verdict {
    if procedure.is_none() {
        return Err(Rejection::new(format!("{} needs a procedure", kind)));
    }
    Ok(())
}
