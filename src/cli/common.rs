//! Shared clap argument types.

use std::fmt;

use clap::ValueEnum;
use deckcodec::IncludePolicy;

/// CLI-facing include failure policy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludePolicyArg {
    /// Fail the run when an include cannot be read.
    Abort,
    /// Record the failure and keep the unresolved reference.
    Skip,
}

impl Default for IncludePolicyArg {
    fn default() -> Self {
        IncludePolicyArg::Abort
    }
}

impl fmt::Display for IncludePolicyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludePolicyArg::Abort => write!(f, "abort"),
            IncludePolicyArg::Skip => write!(f, "skip"),
        }
    }
}

impl From<IncludePolicyArg> for IncludePolicy {
    fn from(arg: IncludePolicyArg) -> Self {
        match arg {
            IncludePolicyArg::Abort => IncludePolicy::Abort,
            IncludePolicyArg::Skip => IncludePolicy::Skip,
        }
    }
}
