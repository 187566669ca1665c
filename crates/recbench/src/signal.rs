//! Interrupt handling for headless runs

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::info;

/// Set `stop_flag` on Ctrl+C (or SIGTERM on unix).
///
/// Signals are registered before this returns, so an interrupt arriving
/// during the first invocation is not lost. The runner observes the flag
/// between iterations.
pub fn spawn_interrupt_watcher(stop_flag: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let shutdown = {
        let _guard = runtime.enter();
        shutdown_signal()?
    };

    thread::Builder::new()
        .name("recbench-signals".to_string())
        .spawn(move || {
            runtime.block_on(shutdown);
            info!("interrupt received, stopping after the current iteration");
            stop_flag.store(true, Ordering::SeqCst);
        })?;

    Ok(())
}

#[cfg(unix)]
fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
