//! Non-fatal generation diagnostics
//!
//! Apart from malformed input, nothing that goes wrong while loading or
//! flattening stops a run. Each problem is logged with its environment and
//! package context and recorded here so callers can inspect what happened.

use std::{cell::RefCell, fmt};

use log::{error, warn};

use crate::config::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// GIR file that cannot be parsed or lacks required elements
    MalformedModule,
    UnresolvedType,
    DuplicateSymbol,
    DuplicateConstant,
    /// Transitive dependency without a GIR file on disk
    MissingDependency,
    /// Requested or discovered module that could not be found
    MissingModule,
    CyclicInheritance,
    RecursionLimit,
}

impl DiagnosticKind {
    /// Errors are logged at `error` level, everything else at `warn`
    pub const fn is_error(self) -> bool {
        matches!(self, Self::MalformedModule | Self::MissingDependency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Package name the diagnostic was raised for, e.g. `Gtk-3.0`
    pub package: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.package, self.message)
    }
}

/// Diagnostic sink for one generation pass
///
/// Shared by reference across all pipeline stages; recording only needs `&self`.
#[derive(Debug)]
pub struct Diagnostics {
    environment: Environment,
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn report(&self, kind: DiagnosticKind, package: &str, message: impl Into<String>) {
        let message = message.into();
        if kind.is_error() {
            error!("[{}][{}] {}", self.environment, package, message);
        } else {
            warn!("[{}][{}] {}", self.environment, package, message);
        }
        self.entries.borrow_mut().push(Diagnostic {
            kind,
            package: package.to_owned(),
            message,
        });
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|diagnostic| diagnostic.kind == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of everything recorded so far, in report order
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_count() {
        let diagnostics = Diagnostics::new(Environment::Gjs);
        assert!(diagnostics.is_empty());

        diagnostics.report(DiagnosticKind::UnresolvedType, "Foo-1.0", "Could not find type");
        diagnostics.report(DiagnosticKind::UnresolvedType, "Foo-1.0", "Could not find type");
        diagnostics.report(DiagnosticKind::MissingDependency, "Foo-1.0", "C-1.0");

        assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedType), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::MissingDependency), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::RecursionLimit), 0);
        assert_eq!(diagnostics.entries()[2].to_string(), "[Foo-1.0] C-1.0");
    }
}
