use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Pwd;

#[async_trait]
impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    async fn execute(
        &self,
        _args: &[String],
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        let cwd = std::env::current_dir().map_err(BuiltinError::io(self.name()))?;

        let line = format!("{}\n", cwd.to_string_lossy());
        out.write_all(line.as_bytes())
            .await
            .map_err(BuiltinError::io(self.name()))?;

        Ok(BuiltinOutcome::success())
    }
}
