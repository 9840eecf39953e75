use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Cd;

#[async_trait]
impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    async fn execute(
        &self,
        args: &[String],
        _out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        trace!("executing cd builtin: {args:?}");

        let path = args.first().ok_or(BuiltinError::Usage {
            builtin: self.name(),
            expected: "argument",
        })?;

        std::env::set_current_dir(path).map_err(BuiltinError::io(self.name()))?;

        trace!("cd: {:?}", path);

        Ok(BuiltinOutcome::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requires_an_argument() {
        let err = Cd.execute(&[], &mut Vec::<u8>::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "cd: expected argument");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let err = Cd
            .execute(&["/nonexistent/tish/dir".into()], &mut Vec::<u8>::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BuiltinError::Io { builtin: "cd", .. }));
    }
}
