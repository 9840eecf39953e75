use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Echo;

#[async_trait]
impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn execute(
        &self,
        args: &[String],
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        let mut line = args.iter().map(|arg| format!("{arg} ")).collect::<String>();
        line.push('\n');

        out.write_all(line.as_bytes())
            .await
            .map_err(BuiltinError::io(self.name()))?;

        Ok(BuiltinOutcome::success())
    }
}
