use logos::Logos;
use thiserror::Error;

use crate::{
    builtins::BuiltinCommands,
    cmd::execution_plan::{has_control_tokens, ExecutionPlan, PlanError, BACKGROUND},
};

use self::token::{LexerError, Token};

pub mod token;

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("failed to tokenize command")]
    Lexer(Vec<LexerError>),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Splits `line` into words, replacing every `$NAME` word with the value of
/// the environment variable (or an empty string when unset). At most
/// `max_args - 1` words are kept.
pub fn tokenize(line: &str, max_args: usize) -> Result<Vec<String>, CommandParseError> {
    tokenize_with(line, max_args, |name| std::env::var(name).ok())
}

pub fn tokenize_with<F>(
    line: &str,
    max_args: usize,
    lookup: F,
) -> Result<Vec<String>, CommandParseError>
where
    F: Fn(&str) -> Option<String>,
{
    let limit = max_args.saturating_sub(1);
    let tokens = Token::lexer(line).take(limit).collect::<Vec<_>>();

    if tokens.iter().any(|r| r.is_err()) {
        return Err(CommandParseError::Lexer(
            tokens.into_iter().filter_map(|r| r.err()).collect(),
        ));
    }

    let words = tokens
        .into_iter()
        .flatten()
        .map(|token| match token {
            Token::Word(word) => word.to_owned(),
            Token::Variable(name) => lookup(name).unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    if words.len() == limit && Token::lexer(line).nth(limit).is_some() {
        debug!(limit, "argument list truncated");
    }

    Ok(words)
}

/// What one input line asks for.
#[derive(Debug)]
pub enum ParsedCommand {
    Builtin(BuiltinCommands, Vec<String>),
    Plan(ExecutionPlan),
}

/// Tokenizes a line and decides who runs it. Built-ins get first refusal on
/// lines without operators; a trailing `&` is ignored for every built-in but
/// `echo`, which runs externally so it can be backgrounded. Returns
/// `Ok(None)` for blank input.
pub fn parse_command(
    line: &str,
    max_args: usize,
) -> Result<Option<ParsedCommand>, CommandParseError> {
    let mut tokens = tokenize(line, max_args)?;

    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    if let Some(builtin) = BuiltinCommands::from_name(first) {
        let backgrounded = tokens.last().is_some_and(|t| t == BACKGROUND)
            && !has_control_tokens(&tokens[..tokens.len() - 1]);

        if !has_control_tokens(&tokens)
            || (backgrounded && !matches!(builtin, BuiltinCommands::Echo(_)))
        {
            if backgrounded {
                tokens.pop();
            }
            tokens.remove(0);
            return Ok(Some(ParsedCommand::Builtin(builtin, tokens)));
        }
    }

    Ok(Some(ParsedCommand::Plan(ExecutionPlan::from_tokens(tokens)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinCommand;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "USER" => Some("ferris".into()),
            "OUT" => Some("out.txt".into()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_variables() {
        let tokens = tokenize_with("echo $USER", 128, lookup).unwrap();
        assert_eq!(tokens, vec!["echo", "ferris"]);
    }

    #[test]
    fn unset_variable_becomes_empty_token() {
        let tokens = tokenize_with("echo $NOPE done", 128, lookup).unwrap();
        assert_eq!(tokens, vec!["echo", "", "done"]);
    }

    #[test]
    fn blank_line_has_no_tokens() {
        assert!(tokenize_with(" \t \r\n", 128, lookup).unwrap().is_empty());
    }

    #[test]
    fn keeps_at_most_max_args_minus_one() {
        let tokens = tokenize_with("a b c d e f", 4, lookup).unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn operators_survive_as_words() {
        let tokens = tokenize_with("ls | wc > $OUT &", 128, lookup).unwrap();
        assert_eq!(tokens, vec!["ls", "|", "wc", ">", "out.txt", "&"]);
    }

    fn builtin(line: &str) -> (&'static str, Vec<String>) {
        match parse_command(line, 128).unwrap() {
            Some(ParsedCommand::Builtin(builtin, args)) => (builtin.name(), args),
            other => panic!("expected builtin, got {other:?}"),
        }
    }

    fn planned(line: &str) -> ExecutionPlan {
        match parse_command(line, 128).unwrap() {
            Some(ParsedCommand::Plan(plan)) => plan,
            other => panic!("expected plan, got {other:?}"),
        }
    }

    #[test]
    fn builtins_get_first_refusal() {
        assert_eq!(builtin("cd /tmp"), ("cd", vec!["/tmp".to_string()]));

        let (name, args) = builtin("echo a & b");
        assert_eq!(name, "echo");
        assert_eq!(args, vec!["a", "&", "b"]);
    }

    #[test]
    fn trailing_ampersand_is_dropped_for_builtins() {
        assert_eq!(builtin("cd /tmp &"), ("cd", vec!["/tmp".to_string()]));
        assert_eq!(builtin("exit &"), ("exit", Vec::new()));
    }

    #[test]
    fn redirected_or_backgrounded_echo_runs_externally() {
        let plan = planned("echo hi > out.txt");
        assert_eq!(plan.stages()[0].argv, vec!["echo", "hi"]);

        let plan = planned("echo hi &");
        assert!(plan.background);
    }

    #[test]
    fn builtin_with_pipe_is_planned() {
        let plan = planned("pwd | cat &");
        assert!(plan.background);
        assert_eq!(plan.stages().len(), 2);
    }

    #[test]
    fn parse_command_skips_blank_lines() {
        assert!(parse_command("   ", 128).unwrap().is_none());
    }

    #[test]
    fn parse_command_surfaces_syntax_errors() {
        assert!(matches!(
            parse_command("cat >", 128),
            Err(CommandParseError::Plan(PlanError::MissingRedirectTarget(_)))
        ));
    }
}
