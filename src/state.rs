use std::{
    fmt,
    io::{self, Write},
    time::Duration,
};

use color_eyre::Result;
use termion::color;
use tokio::{io::AsyncWriteExt, select, signal::unix::Signal};

use crate::{
    builtins::{BuiltinCommand, BuiltinCommands, BuiltinOutcome},
    cmd::{Executor, Outcome},
    config::Config,
    input::{InputMessage, InputReader},
    parse::{parse_command, ParsedCommand},
    process::TishExitStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct State {
    pub config: Config,
    pub executor: Executor,
}

impl State {
    pub fn new(config: Config) -> Self {
        let executor = Executor::new(config.timeout());
        Self { config, executor }
    }

    pub fn render<W: Write>(&self, stdout: &mut W) -> Result<()> {
        let prompt = match std::env::current_dir() {
            Ok(cwd) => self.config.render_prompt(&cwd),
            Err(err) => {
                self.report(&format!("getcwd() error: {err}"));
                "> ".into()
            }
        };

        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        Ok(())
    }

    /// The read loop. Returns when input ends or `exit` runs.
    pub async fn run(&mut self, input: &mut InputReader, interrupts: &mut Signal) -> Result<()> {
        loop {
            self.render(&mut io::stdout().lock())?;

            let msg = if input.request().is_ok() {
                self.wait_for_line(input, interrupts).await?
            } else {
                InputMessage::Eof
            };

            match msg {
                InputMessage::Line(line) => {
                    if self.execute(&line).await == Flow::Exit {
                        trace!("exit requested");
                        break;
                    }
                    drain_interrupts(interrupts).await;
                }
                InputMessage::Eof => {
                    println!();
                    break;
                }
                InputMessage::Error(err) => {
                    self.report(&format!("read error: {err}"));
                    break;
                }
            }
        }

        Ok(())
    }

    async fn wait_for_line(
        &self,
        input: &mut InputReader,
        interrupts: &mut Signal,
    ) -> Result<InputMessage> {
        loop {
            select! {
                msg = input.recv() => break Ok(msg),
                Some(()) = interrupts.recv() => {
                    trace!("interrupt while reading");
                    println!();
                    self.render(&mut io::stdout().lock())?;
                }
            }
        }
    }

    /// Runs one line. Every error is reported and swallowed here so the loop
    /// always continues.
    pub async fn execute(&mut self, line: &str) -> Flow {
        let plan = match parse_command(line, self.config.max_args) {
            Ok(None) => return Flow::Continue,
            Ok(Some(ParsedCommand::Builtin(builtin, args))) => {
                return self.execute_builtin(builtin, &args).await;
            }
            Ok(Some(ParsedCommand::Plan(plan))) => plan,
            Err(err) => {
                self.report(&err);
                return Flow::Continue;
            }
        };

        trace!(?plan, "execution plan");

        match self.executor.execute(&plan).await {
            Ok(Outcome::Completed(statuses)) => {
                debug!(?statuses, "foreground work finished");
            }
            Ok(Outcome::Background(pids)) => {
                debug!(?pids, "left running in background");
            }
            Err(err) => self.report(&err),
        }

        Flow::Continue
    }

    async fn execute_builtin(&self, builtin: BuiltinCommands, args: &[String]) -> Flow {
        trace!(name = builtin.name(), ?args, "dispatching builtin");

        let mut stdout = tokio::io::stdout();
        let res = builtin.execute(args, &mut stdout).await;

        if let Err(err) = stdout.flush().await {
            warn!(%err, "failed to flush builtin output");
        }

        match res {
            Ok(BuiltinOutcome::Exit) => Flow::Exit,
            Ok(BuiltinOutcome::Continue(status)) => {
                let status = TishExitStatus::from(status);
                debug!(name = builtin.name(), %status, "builtin finished");
                Flow::Continue
            }
            Err(err) => {
                self.report(&err);
                Flow::Continue
            }
        }
    }

    pub fn report(&self, err: &dyn fmt::Display) {
        error!("{err}");

        let stderr = io::stderr();
        let colored = termion::is_tty(&stderr);
        let mut stderr = stderr.lock();

        let _ = if colored {
            writeln!(
                stderr,
                "{}tish:{} {err}",
                color::Fg(color::Red),
                color::Fg(color::Reset)
            )
        } else {
            writeln!(stderr, "tish: {err}")
        };
    }
}

/// Discards interrupts that arrived while a command was running, printing a
/// single newline if there were any.
async fn drain_interrupts(interrupts: &mut Signal) {
    let mut seen = false;
    while let Ok(Some(())) = tokio::time::timeout(Duration::ZERO, interrupts.recv()).await {
        seen = true;
    }
    if seen {
        println!();
    }
}
