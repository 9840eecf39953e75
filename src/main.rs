use color_eyre::{eyre::WrapErr, Result};
use tish::{config::Config, input::InputReader, state::State};
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::prelude::*;

#[macro_use]
extern crate tracing;

// One control thread: the watchdog timer only runs while the read loop is
// suspended on a foreground wait.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &config.log_dir,
        &config.log_file,
    ));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    trace!(?config, "loaded config");

    let mut interrupts =
        signal(SignalKind::interrupt()).wrap_err("failed to register SIGINT handler")?;

    trace!("spawning input thread");
    let mut input = InputReader::spawn(config.max_line_len)?;

    let mut state = State::new(config);
    state.run(&mut input, &mut interrupts).await?;

    trace!("goodbye");

    Ok(())
}
