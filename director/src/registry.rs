use std::collections::HashMap;

use crate::directive::{Create, Directive, Edit, FileSelect, Read, Remove};
use crate::procedure::{Append, ChMod, CopyTo, Procedure, Replace, Set};

pub type DirectiveFactory = fn() -> Directive;
pub type ProcedureFactory = fn() -> Procedure;

/// Keyword → constructor catalog. Each lookup builds a fresh instance, so no
/// two statements ever share instruction state.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    directives: HashMap<String, DirectiveFactory>,
    procedures: HashMap<String, ProcedureFactory>,
}

impl Registry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Registry::default()
    }

    /// Every directive and procedure the engine ships with.
    pub fn builtin() -> Self {
        let mut registry = Registry::empty();

        registry.register_directive("CREATE", || Directive::Create(Create));
        registry.register_directive("READ", || Directive::Read(Read::default()));
        registry.register_directive("EDIT", || Directive::Edit(Edit::default()));
        registry.register_directive("REMOVE", || Directive::Remove(Remove));
        registry.register_directive("FILE", || Directive::File(FileSelect::default()));

        registry.register_procedure("APPEND", || Procedure::Append(Append));
        registry.register_procedure("REPLACE", || Procedure::Replace(Replace::default()));
        registry.register_procedure("SETTO", || Procedure::Replace(Replace::default()));
        registry.register_procedure("SET", || Procedure::Set(Set));
        registry.register_procedure("CHMOD", || Procedure::ChMod(ChMod::default()));
        registry.register_procedure("COPYTO", || Procedure::CopyTo(CopyTo));

        registry
    }

    pub fn register_directive(&mut self, keyword: &str, factory: DirectiveFactory) {
        self.directives.insert(keyword.to_string(), factory);
    }

    pub fn register_procedure(&mut self, keyword: &str, factory: ProcedureFactory) {
        self.procedures.insert(keyword.to_string(), factory);
    }

    /// A fresh directive occurrence for the keyword.
    pub fn directive(&self, keyword: &str) -> Option<Directive> {
        self.directives.get(keyword).map(|factory| factory())
    }

    /// A fresh procedure occurrence for the keyword.
    pub fn procedure(&self, keyword: &str) -> Option<Procedure> {
        self.procedures.get(keyword).map(|factory| factory())
    }

    pub fn directive_keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }

    pub fn procedure_keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.procedures.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use crate::procedure::ProcedureKind;

    #[test]
    fn builtin_catalog() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.directive_keywords(),
            vec!["CREATE", "EDIT", "FILE", "READ", "REMOVE"]
        );
        assert_eq!(
            registry.directive("EDIT").map(|d| d.kind()),
            Some(DirectiveKind::Edit)
        );
        assert!(registry.directive("edit").is_none());
    }

    #[test]
    fn setto_builds_replace() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.procedure("SETTO").map(|p| p.kind()),
            Some(ProcedureKind::Replace)
        );
    }

    #[test]
    fn partial_registry() {
        let mut registry = Registry::empty();
        registry.register_directive("CREATE", || Directive::Create(Create));
        assert!(registry.directive("CREATE").is_some());
        assert!(registry.directive("READ").is_none());
        assert!(registry.procedure_keywords().is_empty());
    }
}
