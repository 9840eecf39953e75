use std::{
    io::{self, Write},
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use nix::{
    fcntl::OFlag,
    sys::signal::{signal, SigHandler, Signal},
    unistd::{pipe2, Pid},
};
use thiserror::Error;
use tokio::process::Command;

use super::{
    execution_plan::{CommandStage, ExecutionPlan, Pipeline},
    watchdog::Watchdog,
};
use crate::process::{self, Role, StageChild, TishExitStatus};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pipe error: {0}")]
    Pipe(#[source] nix::Error),
    #[error("wait error: {0}")]
    Wait(#[source] io::Error),
}

/// What happened to the processes of one plan.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Foreground work finished; one status per stage, in stage order.
    Completed(Vec<TishExitStatus>),
    /// Processes were left running; their pids in stage order.
    Background(Vec<Pid>),
}

#[derive(Debug)]
pub struct Executor {
    watchdog: Watchdog,
}

impl Executor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            watchdog: Watchdog::new(timeout),
        }
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub async fn execute(&self, plan: &ExecutionPlan) -> Result<Outcome, ExecError> {
        match &plan.pipeline {
            Pipeline::Execute(stage) => self.execute_single(stage, plan.background).await,
            Pipeline::Pipe(first, second) => {
                self.execute_pipe(first, second, plan.background).await
            }
        }
    }

    async fn execute_single(
        &self,
        stage: &CommandStage,
        background: bool,
    ) -> Result<Outcome, ExecError> {
        let role = if background {
            Role::Background
        } else {
            Role::Foreground
        };

        let mut child = {
            let stdin = stage_stdin(stage)?.unwrap_or_else(Stdio::inherit);
            let stdout = stage_stdout(stage)?.unwrap_or_else(Stdio::inherit);
            spawn_stage(stage, stdin, stdout, role)?
        };

        if background {
            announce_background(&[child.pid()]);
            return Ok(Outcome::Background(vec![child.pid()]));
        }

        let armed = self.watchdog.arm(child.pid());
        let status = child.wait().await;
        armed.disarm();

        Ok(Outcome::Completed(vec![status.map_err(ExecError::Wait)?]))
    }

    async fn execute_pipe(
        &self,
        first: &CommandStage,
        second: &CommandStage,
        background: bool,
    ) -> Result<Outcome, ExecError> {
        // every file and the pipe are acquired before anything is spawned
        let first_stdin = stage_stdin(first)?;
        let first_stdout = stage_stdout(first)?;
        let second_stdin = stage_stdin(second)?;
        let second_stdout = stage_stdout(second)?;

        // close-on-exec so neither child inherits the end it does not use
        let (reader, writer) = pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;

        trace!(?first, ?second, "spawning pipeline");

        let mut writer_child = spawn_stage(
            first,
            first_stdin.unwrap_or_else(Stdio::inherit),
            first_stdout.unwrap_or_else(|| Stdio::from(writer)),
            Role::PipeWriter,
        )?;

        let reader_child = spawn_stage(
            second,
            second_stdin.unwrap_or_else(|| Stdio::from(reader)),
            second_stdout.unwrap_or_else(Stdio::inherit),
            Role::PipeReader,
        );

        let mut reader_child = match reader_child {
            Ok(child) => child,
            Err(err) => {
                // the writer sees a closed pipe; it still has to be reaped
                if let Err(wait_err) = writer_child.wait().await {
                    warn!(%wait_err, "failed to reap pipeline writer");
                }
                return Err(err);
            }
        };

        if background {
            let pids = vec![writer_child.pid(), reader_child.pid()];
            announce_background(&pids);
            return Ok(Outcome::Background(pids));
        }

        let (first_status, second_status) = tokio::join!(writer_child.wait(), reader_child.wait());

        Ok(Outcome::Completed(vec![
            first_status.map_err(ExecError::Wait)?,
            second_status.map_err(ExecError::Wait)?,
        ]))
    }
}

fn stage_stdin(stage: &CommandStage) -> Result<Option<Stdio>, ExecError> {
    stage
        .input_redirect
        .as_ref()
        .map(|path| {
            process::input_file(path).map_err(|source| ExecError::Redirect {
                path: path.clone(),
                source,
            })
        })
        .transpose()
}

fn stage_stdout(stage: &CommandStage) -> Result<Option<Stdio>, ExecError> {
    stage
        .output_redirect
        .as_ref()
        .map(|path| {
            process::output_file(path).map_err(|source| ExecError::Redirect {
                path: path.clone(),
                source,
            })
        })
        .transpose()
}

/// Spawns one stage. The command builder, and with it the interpreter's copy
/// of every descriptor handed to the child, is dropped before returning.
fn spawn_stage(
    stage: &CommandStage,
    stdin: Stdio,
    stdout: Stdio,
    role: Role,
) -> Result<StageChild, ExecError> {
    let mut cmd = Command::new(stage.program());
    cmd.args(stage.args()).stdin(stdin).stdout(stdout);

    // SAFETY: only async-signal-safe calls (sigaction) run between fork and exec
    unsafe {
        cmd.pre_exec(reset_signals);
    }

    trace!(?cmd, %role, "spawning command");

    StageChild::spawn(&mut cmd, role).map_err(|source| ExecError::Spawn {
        program: stage.program().to_owned(),
        source,
    })
}

/// Puts back the default dispositions for the signals the interpreter
/// handles itself.
fn reset_signals() -> io::Result<()> {
    for sig in [Signal::SIGINT, Signal::SIGALRM] {
        unsafe { signal(sig, SigHandler::SigDfl) }?;
    }
    Ok(())
}

fn announce_background(pids: &[Pid]) {
    let mut stdout = io::stdout().lock();
    for pid in pids {
        let _ = writeln!(stdout, "Process running in background with PID {pid}");
    }
    let _ = stdout.flush();
}
