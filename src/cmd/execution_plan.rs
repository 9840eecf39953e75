use std::path::PathBuf;

use itertools::Itertools;
use strum::Display;
use thiserror::Error;

pub const PIPE: &str = "|";
pub const READ: &str = "<";
pub const WRITE: &str = ">";
pub const BACKGROUND: &str = "&";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub pipeline: Pipeline,
    pub background: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pipeline {
    Execute(CommandStage),
    Pipe(CommandStage, CommandStage),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStage {
    pub argv: Vec<String>,
    pub input_redirect: Option<PathBuf>,
    pub output_redirect: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RedirectKind {
    #[strum(serialize = "<")]
    Input,
    #[strum(serialize = ">")]
    Output,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("syntax error: expected filename after '{0}'")]
    MissingRedirectTarget(RedirectKind),
    #[error("syntax error: only a single '|' is supported")]
    TooManyPipes,
}

/// True when the token list carries an operator the engine has to handle.
pub fn has_control_tokens(tokens: &[String]) -> bool {
    tokens.last().is_some_and(|t| t == BACKGROUND)
        || tokens.iter().any(|t| t == PIPE || t == READ || t == WRITE)
}

impl ExecutionPlan {
    pub fn from_tokens(mut tokens: Vec<String>) -> Result<Self, PlanError> {
        let background = tokens.last().is_some_and(|t| t == BACKGROUND);
        if background {
            tokens.pop();
        }

        let pipes = tokens.iter().positions(|t| t == PIPE).collect_vec();

        let pipeline = match pipes.as_slice() {
            [] => Pipeline::Execute(CommandStage::from_tokens(tokens)?),
            [at] => {
                let second = tokens.split_off(*at + 1);
                tokens.pop();
                Pipeline::Pipe(
                    CommandStage::from_tokens(tokens)?,
                    CommandStage::from_tokens(second)?,
                )
            }
            _ => return Err(PlanError::TooManyPipes),
        };

        Ok(Self {
            pipeline,
            background,
        })
    }

    pub fn stages(&self) -> Vec<&CommandStage> {
        match &self.pipeline {
            Pipeline::Execute(stage) => vec![stage],
            Pipeline::Pipe(first, second) => vec![first, second],
        }
    }
}

impl CommandStage {
    /// Pulls `< file` and `> file` out of one pipeline segment. Only the first
    /// occurrence of each operator is honored; later ones are dropped.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self, PlanError> {
        let mut stage = Self::default();
        let mut tokens = tokens.into_iter();

        while let Some(token) = tokens.next() {
            let (kind, slot) = match token.as_str() {
                READ => (RedirectKind::Input, &mut stage.input_redirect),
                WRITE => (RedirectKind::Output, &mut stage.output_redirect),
                _ => {
                    stage.argv.push(token);
                    continue;
                }
            };

            let target = tokens
                .next()
                .filter(|target| !matches!(target.as_str(), READ | WRITE | PIPE))
                .ok_or(PlanError::MissingRedirectTarget(kind))?;

            if slot.is_none() {
                *slot = Some(PathBuf::from(target));
            } else {
                debug!(%kind, %target, "ignoring repeated redirection");
            }
        }

        Ok(stage)
    }

    /// The program to launch. Empty stages resolve to an empty name and fail
    /// at spawn time.
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}
