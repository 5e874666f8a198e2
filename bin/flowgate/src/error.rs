//! Runner errors.
//!
//! Lower layers report through rootcause; the runner attaches one of these
//! as context so the printed report says which step failed.

use std::fmt;
use std::path::PathBuf;

/// Why the runner stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// Wrong command-line arguments.
    Usage,
    /// Configuration could not be loaded.
    Config,
    /// A file could not be read.
    ReadFile { path: PathBuf },
    /// A file is not valid JSON of the expected shape.
    ParseFile { path: PathBuf },
    /// A node names a dependency that is not defined before it.
    UnknownDependency { node: String, dependency: String },
    /// Two nodes in a definition share a name.
    DuplicateNodeName { name: String },
    /// The seeded Admin user could not be found.
    AdminMissing { username: String },
    /// The workflow could not be installed.
    Install,
    /// The workflow could not be executed.
    Execution,
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage => write!(f, "usage: flowgate <workflow.json> <trigger.json>"),
            Self::Config => write!(f, "failed to load configuration"),
            Self::ReadFile { path } => write!(f, "failed to read {}", path.display()),
            Self::ParseFile { path } => write!(f, "failed to parse {}", path.display()),
            Self::UnknownDependency { node, dependency } => {
                write!(f, "node '{node}' depends on undefined node '{dependency}'")
            }
            Self::DuplicateNodeName { name } => write!(f, "node name '{name}' is used twice"),
            Self::AdminMissing { username } => write!(f, "admin user '{username}' not found"),
            Self::Install => write!(f, "failed to install workflow"),
            Self::Execution => write!(f, "failed to execute workflow"),
        }
    }
}

impl std::error::Error for RunnerError {}
