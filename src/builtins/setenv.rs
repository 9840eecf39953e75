use std::io;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{BuiltinCommand, BuiltinError, BuiltinOutcome};

#[derive(Debug, Default)]
pub struct Setenv;

#[async_trait]
impl BuiltinCommand for Setenv {
    fn name(&self) -> &'static str {
        "setenv"
    }

    async fn execute(
        &self,
        args: &[String],
        _out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<BuiltinOutcome, BuiltinError> {
        let [name, value, ..] = args else {
            return Err(BuiltinError::Usage {
                builtin: self.name(),
                expected: "variable and value",
            });
        };

        // set_var panics on these instead of failing
        if name.is_empty() || name.contains(['=', '\0']) || value.contains('\0') {
            return Err(BuiltinError::Io {
                builtin: self.name(),
                source: io::ErrorKind::InvalidInput.into(),
            });
        }

        trace!(%name, %value, "setting environment variable");
        std::env::set_var(name, value);

        Ok(BuiltinOutcome::success())
    }
}
