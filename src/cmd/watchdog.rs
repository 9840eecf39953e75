use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
    },
    time::Duration,
};

use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tokio::task::JoinHandle;

/// The pid of the foreground process currently being waited on. Zero means
/// nothing is tracked.
#[derive(Debug, Default)]
pub struct ForegroundSlot(AtomicI32);

impl ForegroundSlot {
    pub fn get(&self) -> Option<Pid> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(Pid::from_raw(pid)),
        }
    }

    fn set(&self, pid: Pid) {
        self.0.store(pid.as_raw(), Ordering::SeqCst);
    }

    fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    /// Empties the slot and returns what it held.
    fn take(&self) -> Option<Pid> {
        match self.0.swap(0, Ordering::SeqCst) {
            0 => None,
            pid => Some(Pid::from_raw(pid)),
        }
    }
}

/// Enforces a run time limit on one foreground process at a time.
#[derive(Debug)]
pub struct Watchdog {
    limit: Duration,
    slot: Arc<ForegroundSlot>,
}

impl Watchdog {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            slot: Arc::default(),
        }
    }

    pub fn foreground(&self) -> Option<Pid> {
        self.slot.get()
    }

    /// Records `pid` and starts the countdown. The returned guard must be
    /// disarmed (or dropped) as soon as the wait on `pid` returns.
    pub fn arm(&self, pid: Pid) -> ArmedWatchdog<'_> {
        self.slot.set(pid);

        let slot = Arc::clone(&self.slot);
        let limit = self.limit;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            expire(&slot);
        });

        trace!(%pid, ?limit, "watchdog armed");

        ArmedWatchdog {
            slot: &self.slot,
            timer,
        }
    }
}

fn expire(slot: &ForegroundSlot) {
    let Some(pid) = slot.take() else {
        return;
    };

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\nProcess {pid} exceeded time limit. Terminating it.");
    let _ = stdout.flush();

    warn!(%pid, "foreground process exceeded time limit");

    if let Err(err) = kill(pid, Signal::SIGKILL) {
        error!(%pid, %err, "failed to kill foreground process");
    }
}

#[must_use = "dropping the guard disarms the watchdog immediately"]
pub struct ArmedWatchdog<'a> {
    slot: &'a ForegroundSlot,
    timer: JoinHandle<()>,
}

impl ArmedWatchdog<'_> {
    pub fn disarm(self) {}
}

impl Drop for ArmedWatchdog<'_> {
    fn drop(&mut self) {
        self.timer.abort();
        self.slot.clear();
        trace!("watchdog disarmed");
    }
}
