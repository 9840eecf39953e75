use std::io;

use nix::unistd::Pid;
use strum::Display;
use tokio::process::{Child, Command};

use super::status::TishExitStatus;

/// What a spawned process is doing for the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    Foreground,
    Background,
    PipeWriter,
    PipeReader,
}

/// A spawned process together with its pid and role. The status is
/// collected through [`StageChild::wait`]; dropping an unwaited handle leaves
/// reaping to the runtime.
#[derive(Debug)]
pub struct StageChild {
    child: Child,
    pid: Pid,
    role: Role,
}

impl StageChild {
    pub fn spawn(cmd: &mut Command, role: Role) -> io::Result<Self> {
        let child = cmd.spawn()?;
        let pid = child
            .id()
            .map(|id| Pid::from_raw(id as i32))
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "Child exited unexpectedly"))?;

        trace!(%pid, %role, "spawned child");

        Ok(Self { child, pid, role })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub async fn wait(&mut self) -> io::Result<TishExitStatus> {
        let status: TishExitStatus = self.child.wait().await?.into();
        trace!(pid = %self.pid, role = %self.role, %status, "child exited");
        Ok(status)
    }
}
