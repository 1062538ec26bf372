pub mod append;
pub mod chmod;
pub mod copy_to;
pub mod replace;
pub mod set;

use std::fmt;

pub use append::Append;
pub use chmod::ChMod;
pub use copy_to::CopyTo;
pub use replace::Replace;
pub use set::Set;

use crate::directive::{Directive, DirectiveKind};
use crate::error::{DirectorError, Result, Verdict};
use crate::extract::Extract;
use crate::staging::StagingFs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Append,
    Replace,
    Set,
    ChMod,
    CopyTo,
}

impl ProcedureKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ProcedureKind::Append => "APPEND",
            ProcedureKind::Replace => "REPLACE",
            ProcedureKind::Set => "SET",
            ProcedureKind::ChMod => "CHMOD",
            ProcedureKind::CopyTo => "COPYTO",
        }
    }

    /// The directive kind this procedure can be bound to.
    pub fn target(&self) -> DirectiveKind {
        match self {
            ProcedureKind::Append | ProcedureKind::Replace | ProcedureKind::Set => {
                DirectiveKind::Edit
            }
            ProcedureKind::ChMod => DirectiveKind::File,
            ProcedureKind::CopyTo => DirectiveKind::Read,
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One occurrence of a procedure bound to a directive.
#[derive(Debug)]
pub enum Procedure {
    Append(Append),
    Replace(Replace),
    Set(Set),
    ChMod(ChMod),
    CopyTo(CopyTo),
}

impl Procedure {
    pub fn kind(&self) -> ProcedureKind {
        match self {
            Procedure::Append(_) => ProcedureKind::Append,
            Procedure::Replace(_) => ProcedureKind::Replace,
            Procedure::Set(_) => ProcedureKind::Set,
            Procedure::ChMod(_) => ProcedureKind::ChMod,
            Procedure::CopyTo(_) => ProcedureKind::CopyTo,
        }
    }

    pub fn applies_to(&self, directive: DirectiveKind) -> bool {
        self.kind().target() == directive
    }

    pub fn validate(&mut self, fs: &mut StagingFs, extract: &Extract) -> Verdict {
        match self {
            Procedure::Append(_) => Ok(()),
            Procedure::Replace(p) => p.validate(extract),
            Procedure::Set(p) => p.validate(extract),
            Procedure::ChMod(p) => p.validate(extract),
            Procedure::CopyTo(p) => p.validate(fs, extract),
        }
    }

    /// Act on the state the directive owns. Only CHMOD goes through the
    /// staging filesystem, and only to change permissions.
    pub fn run(
        &mut self,
        fs: &mut StagingFs,
        directive: &mut Directive,
        extract: &Extract,
    ) -> Result<()> {
        let kind = self.kind();
        match (self, directive) {
            (Procedure::Append(p), Directive::Edit(edit)) => p.run(current_buffer(kind, edit)?, extract),
            (Procedure::Replace(p), Directive::Edit(edit)) => p.run(current_buffer(kind, edit)?, extract),
            (Procedure::Set(p), Directive::Edit(edit)) => p.run(current_buffer(kind, edit)?, extract),
            (Procedure::ChMod(p), Directive::File(file)) => {
                let path = file.current().ok_or_else(|| no_current_target(kind))?;
                p.run(fs, path)
            }
            (Procedure::CopyTo(p), Directive::Read(read)) => {
                p.run(read, extract);
                Ok(())
            }
            (_, directive) => Err(DirectorError::precondition(format!(
                "procedure {} is not applicable to directive {}",
                kind,
                directive.kind()
            ))),
        }
    }
}

fn current_buffer(
    kind: ProcedureKind,
    edit: &mut crate::directive::Edit,
) -> Result<&mut Vec<String>> {
    edit.current_mut().ok_or_else(|| no_current_target(kind))
}

fn no_current_target(kind: ProcedureKind) -> DirectorError {
    DirectorError::precondition(format!("{} ran with no current target", kind))
}
