use std::{fmt, os::unix::process::ExitStatusExt, process::ExitStatus};

use nix::sys::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TishExitStatus {
    Process(ExitStatus),
    Builtin(BuiltinExitStatus),
}

impl From<ExitStatus> for TishExitStatus {
    fn from(value: ExitStatus) -> Self {
        Self::Process(value)
    }
}

impl From<BuiltinExitStatus> for TishExitStatus {
    fn from(value: BuiltinExitStatus) -> Self {
        Self::Builtin(value)
    }
}

impl TishExitStatus {
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Process(status) => status.code(),
            Self::Builtin(status) => status.code(),
        }
    }

    pub fn success(&self) -> bool {
        match self {
            Self::Process(status) => status.success(),
            Self::Builtin(status) => status.success(),
        }
    }

    /// The signal that terminated the process, if any.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Self::Process(status) => status.signal().and_then(|s| Signal::try_from(s).ok()),
            Self::Builtin(_) => None,
        }
    }
}

impl fmt::Display for TishExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.signal()) {
            (Some(code), _) => write!(f, "exit {code}"),
            (None, Some(signal)) => write!(f, "killed by {signal}"),
            (None, None) => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinExitStatus(Option<i32>);

impl BuiltinExitStatus {
    pub fn new_success() -> Self {
        Self(Some(0))
    }

    pub fn new_failure() -> Self {
        Self(Some(1))
    }

    pub fn success(&self) -> bool {
        self.0 == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.0
    }
}
