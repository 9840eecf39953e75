use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Env;

#[async_trait]
impl BuiltinCommand for Env {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn execute(
        &self,
        args: &[String],
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        let (text, outcome) = match args.first() {
            Some(name) => match std::env::var_os(name) {
                Some(value) => (
                    format!("{name}={}\n", value.to_string_lossy()),
                    BuiltinOutcome::success(),
                ),
                None => (format!("{name} not found\n"), BuiltinOutcome::failure()),
            },
            None => {
                let mut text = String::new();
                for (key, value) in std::env::vars_os() {
                    text.push_str(&format!(
                        "{}={}\n",
                        key.to_string_lossy(),
                        value.to_string_lossy()
                    ));
                }
                (text, BuiltinOutcome::success())
            }
        };

        out.write_all(text.as_bytes())
            .await
            .map_err(BuiltinError::io(self.name()))?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prints_single_variable() {
        std::env::set_var("TISH_TEST_ENV_SINGLE", "value");

        let mut out: Vec<u8> = Vec::new();
        let outcome = Env
            .execute(&["TISH_TEST_ENV_SINGLE".into()], &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, BuiltinOutcome::success());
        assert_eq!(out, b"TISH_TEST_ENV_SINGLE=value\n");
    }

    #[tokio::test]
    async fn reports_missing_variable() {
        let mut out: Vec<u8> = Vec::new();
        let outcome = Env
            .execute(&["TISH_TEST_ENV_MISSING".into()], &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, BuiltinOutcome::failure());
        assert_eq!(out, b"TISH_TEST_ENV_MISSING not found\n");
    }

    #[tokio::test]
    async fn lists_whole_environment() {
        std::env::set_var("TISH_TEST_ENV_LIST", "1");

        let mut out: Vec<u8> = Vec::new();
        Env.execute(&[], &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().any(|line| line == "TISH_TEST_ENV_LIST=1"));
    }
}
