use std::io;

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::process::BuiltinExitStatus;

pub mod cd;
pub mod echo;
pub mod env;
pub mod exit;
pub mod pwd;
pub mod setenv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    Continue(BuiltinExitStatus),
    Exit,
}

impl BuiltinOutcome {
    pub fn success() -> Self {
        Self::Continue(BuiltinExitStatus::new_success())
    }

    pub fn failure() -> Self {
        Self::Continue(BuiltinExitStatus::new_failure())
    }
}

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{builtin}: expected {expected}")]
    Usage {
        builtin: &'static str,
        expected: &'static str,
    },
    #[error("{builtin}: {source}")]
    Io {
        builtin: &'static str,
        #[source]
        source: io::Error,
    },
}

impl BuiltinError {
    pub(crate) fn io(builtin: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { builtin, source }
    }
}

#[async_trait]
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    async fn execute(
        &self,
        args: &[String],
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError>;
}

#[enum_dispatch]
#[derive(Debug, EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Pwd(pwd::Pwd),
    Echo(echo::Echo),
    Exit(exit::Exit),
    Env(env::Env),
    Setenv(setenv::Setenv),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_builtin_by_name() {
        for name in ["cd", "pwd", "echo", "exit", "env", "setenv"] {
            let builtin = BuiltinCommands::from_name(name).unwrap();
            assert_eq!(builtin.name(), name);
        }
    }

    #[test]
    fn external_programs_are_not_builtins() {
        assert!(BuiltinCommands::from_name("ls").is_none());
        assert!(BuiltinCommands::from_name("").is_none());
    }
}
