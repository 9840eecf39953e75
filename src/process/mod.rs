use std::{fs::OpenOptions, io, os::unix::fs::OpenOptionsExt, path::Path, process::Stdio};

pub mod child;
pub mod status;

pub use self::child::{Role, StageChild};
pub use self::status::{BuiltinExitStatus, TishExitStatus};

/// Opens `path` read-only for use as a child's standard input.
pub fn input_file(path: &Path) -> io::Result<Stdio> {
    let file = OpenOptions::new().read(true).open(path)?;
    Ok(Stdio::from(file))
}

/// Creates or truncates `path` for use as a child's standard output.
pub fn output_file(path: &Path) -> io::Result<Stdio> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    Ok(Stdio::from(file))
}
