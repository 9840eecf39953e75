use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Exit;

#[async_trait]
impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    async fn execute(
        &self,
        _args: &[String],
        _out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        Ok(BuiltinOutcome::Exit)
    }
}
