use std::fs;
use std::path::{Path, PathBuf};

use fsdir::Script;
use fsdir::parser::Parser;
use tracing::{debug, info};

use crate::directive::Directive;
use crate::error::{DirectorError, Rejection, Result};
use crate::extract::Extract;
use crate::procedure::Procedure;
use crate::registry::Registry;
use crate::staging::StagingFs;

pub const DEFAULT_SANDBOX_DIR: &str = ".fsdir-sandbox";

/// Where a run reads from and stages into.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory script paths are relative to.
    pub base_dir: PathBuf,
    /// Sandbox directory; relative values resolve against `base_dir`.
    pub sandbox_dir: PathBuf,
    /// Keep the sandbox after a successful apply.
    pub keep: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            base_dir: PathBuf::from("."),
            sandbox_dir: PathBuf::from(DEFAULT_SANDBOX_DIR),
            keep: false,
        }
    }
}

impl Options {
    pub fn sandbox_root(&self) -> PathBuf {
        self.base_dir.join(&self.sandbox_dir)
    }
}

/// Lifecycle of one director run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing loaded yet.
    Empty,
    /// Parsed and resolved against the registry.
    Indexed,
    /// Every statement accepted.
    Validated,
    /// Every statement executed inside the sandbox.
    Sandboxed,
    /// Sandbox committed to the real filesystem.
    Applied,
    /// Sandbox thrown away.
    Discarded,
}

/// A resolved statement: fresh instruction instances plus their parameters.
#[derive(Debug)]
pub struct CacheEntry {
    pub directive: Directive,
    pub procedure: Option<Procedure>,
    pub extract: Extract,
}

/// Validates a whole script before anything runs, runs it inside a sandbox,
/// and commits or discards the sandbox as a whole.
pub struct Director {
    registry: Registry,
    options: Options,
    fs: StagingFs,
    cache: Vec<CacheEntry>,
    state: State,
    source_id: usize,
}

impl Director {
    pub fn new(options: Options) -> Self {
        Self::with_registry(options, Registry::builtin())
    }

    pub fn with_registry(options: Options, registry: Registry) -> Self {
        let fs = StagingFs::new(options.base_dir.clone(), options.sandbox_root());
        Director {
            registry,
            options,
            fs,
            cache: Vec::new(),
            state: State::Empty,
            source_id: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn cache(&self) -> &[CacheEntry] {
        &self.cache
    }

    pub fn staging(&self) -> &StagingFs {
        &self.fs
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn sandbox_root(&self) -> &Path {
        self.fs.sandbox_root()
    }

    /// The source file ID the loaded script was parsed with.
    pub fn source_id(&self) -> usize {
        self.source_id
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Load a script from a file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| DirectorError::io(path, e))?;
        self.loads(&source, 0)
    }

    /// Load a script from a string, replacing anything loaded before.
    pub fn loads(&mut self, source: &str, file_id: usize) -> Result<()> {
        self.cache.clear();
        self.fs.reset_tracking();
        self.state = State::Empty;
        self.source_id = file_id;

        let script = Parser::new(source.to_string(), file_id).parse()?;
        self.index(script)
    }

    fn index(&mut self, script: Script) -> Result<()> {
        let mut cache = Vec::with_capacity(script.commands.len());

        for (i, command) in script.commands.iter().enumerate() {
            let position = i + 1;

            let directive = self.registry.directive(&command.directive).ok_or_else(|| {
                DirectorError::UnknownDirective {
                    position,
                    keyword: command.directive.clone(),
                    span: command.span.clone(),
                }
            })?;

            let procedure = match &command.procedure {
                Some(keyword) => Some(self.registry.procedure(keyword).ok_or_else(|| {
                    DirectorError::UnknownProcedure {
                        position,
                        keyword: keyword.clone(),
                        span: command.span.clone(),
                    }
                })?),
                None => None,
            };

            cache.push(CacheEntry {
                directive,
                procedure,
                extract: Extract::from_command(command),
            });
        }

        info!(statements = cache.len(), "script indexed");
        self.cache = cache;
        self.state = State::Indexed;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validate
    // -----------------------------------------------------------------------

    /// Validate every statement in script order. The first rejection aborts
    /// and nothing is touched on disk. Safe to call again on the same script.
    pub fn validate(&mut self) -> Result<()> {
        if !matches!(self.state, State::Indexed | State::Validated) {
            return Err(DirectorError::precondition(format!(
                "validate needs a loaded script (state: {:?})",
                self.state
            )));
        }

        self.state = State::Indexed;
        self.fs.reset_tracking();

        for (i, entry) in self.cache.iter_mut().enumerate() {
            let position = i + 1;
            let CacheEntry {
                directive,
                procedure,
                extract,
            } = entry;

            extract.error = None;
            if let Err(rejection) = directive.validate(&mut self.fs, extract, procedure.as_ref()) {
                return Err(reject(position, extract, rejection));
            }

            let (Some(procedure), Some(sub)) = (procedure.as_mut(), extract.sub_extract.as_deref_mut())
            else {
                continue;
            };

            sub.error = None;
            if !procedure.applies_to(directive.kind()) {
                let rejection = Rejection::new(format!(
                    "procedure {} is not applicable to directive {}",
                    sub.keyword,
                    directive.kind()
                ));
                return Err(reject(position, sub, rejection));
            }
            if let Err(rejection) = procedure.validate(&mut self.fs, sub) {
                return Err(reject(position, sub, rejection));
            }
        }

        info!(statements = self.cache.len(), "script validated");
        self.state = State::Validated;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sandbox run
    // -----------------------------------------------------------------------

    /// Recreate the sandbox and execute every statement into it, in order.
    pub fn sandbox_run(&mut self) -> Result<()> {
        if self.state != State::Validated {
            return Err(DirectorError::precondition(format!(
                "sandbox_run needs a validated script (state: {:?})",
                self.state
            )));
        }

        self.recreate_sandbox()?;
        self.fs.activate();

        for (i, entry) in self.cache.iter_mut().enumerate() {
            let position = i + 1;
            let keyword = entry.extract.keyword.clone();
            let span = entry.extract.span.clone();
            execute(&mut self.fs, entry).map_err(|e| e.in_statement(position, &keyword, span))?;
        }

        info!(root = %self.fs.sandbox_root().display(), "sandbox run complete");
        self.state = State::Sandboxed;
        Ok(())
    }

    fn recreate_sandbox(&mut self) -> Result<()> {
        let root = self.fs.sandbox_root().to_path_buf();
        let base = std::path::absolute(self.fs.base_dir())
            .map_err(|e| DirectorError::io(self.fs.base_dir(), e))?;
        let absolute_root = std::path::absolute(&root).map_err(|e| DirectorError::io(&root, e))?;
        if base.starts_with(&absolute_root) {
            return Err(DirectorError::precondition(format!(
                "sandbox '{}' would contain the working directory",
                root.display()
            )));
        }

        if root.exists() {
            debug!(root = %root.display(), "clearing previous sandbox");
            fs::remove_dir_all(&root).map_err(|e| DirectorError::io(&root, e))?;
        }
        fs::create_dir_all(&root).map_err(|e| DirectorError::io(&root, e))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Apply / discard
    // -----------------------------------------------------------------------

    /// Commit the sandbox to the real filesystem, then delete the sandbox
    /// unless `keep` is set. Returns the number of real files changed.
    pub fn apply(&mut self) -> Result<usize> {
        self.require_sandboxed("apply")?;

        let changed = self.fs.commit()?;
        self.fs.deactivate();
        if !self.options.keep {
            self.remove_sandbox()?;
        }

        info!(changed, kept = self.options.keep, "sandbox applied");
        self.state = State::Applied;
        Ok(changed)
    }

    /// Throw the sandbox away without touching the real filesystem.
    pub fn discard(&mut self) -> Result<()> {
        self.require_sandboxed("discard")?;

        self.fs.deactivate();
        self.remove_sandbox()?;

        info!("sandbox discarded");
        self.state = State::Discarded;
        Ok(())
    }

    fn require_sandboxed(&self, operation: &str) -> Result<()> {
        if self.state != State::Sandboxed {
            return Err(DirectorError::precondition(format!(
                "{} needs a completed sandbox run (state: {:?})",
                operation, self.state
            )));
        }
        Ok(())
    }

    fn remove_sandbox(&self) -> Result<()> {
        let root = self.fs.sandbox_root();
        if root.exists() {
            fs::remove_dir_all(root).map_err(|e| DirectorError::io(root, e))?;
        }
        Ok(())
    }
}

/// setup, then the procedure once or once per target, then teardown.
fn execute(fs: &mut StagingFs, entry: &mut CacheEntry) -> Result<()> {
    let CacheEntry {
        directive,
        procedure,
        extract,
    } = entry;

    debug!(keyword = %extract.keyword, "setup");
    directive.setup(fs, extract)?;

    if let (Some(procedure), Some(sub)) = (procedure.as_mut(), extract.sub_extract.as_deref()) {
        if directive.repeat_per_target() {
            directive.reset();
            while directive.advance() {
                let target = directive.current_target(extract).unwrap_or_default();
                debug!(keyword = %sub.keyword, %target, "run");
                procedure.run(fs, directive, sub)?;
            }
        } else {
            debug!(keyword = %sub.keyword, "run");
            procedure.run(fs, directive, sub)?;
        }
    }

    debug!(keyword = %extract.keyword, "teardown");
    directive.teardown(fs, extract)
}

fn reject(position: usize, extract: &mut Extract, rejection: Rejection) -> DirectorError {
    let Rejection(reason) = rejection;
    extract.error = Some(reason.clone());
    DirectorError::Validation {
        position,
        keyword: extract.keyword.clone(),
        params: extract.describe_params(),
        reason,
        span: extract.span.clone(),
    }
}
