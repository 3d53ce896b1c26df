//! Process-wide SIGINT handling for graceful pool shutdown.
//!
//! Every worker thread blocks SIGINT with `sigemptyset` / `sigaddset` /
//! `pthread_sigmask` so a stray Ctrl-C can't tear a worker out of a
//! critical section. A single dedicated handler thread sits in `sigwait`
//! and, on delivery, drains every registered pool before the process
//! exits. A second, internal-only signal (`SIGUSR2`) wakes that same
//! `sigwait` at process teardown; the `atexit` hook sends it and then
//! joins the handler thread, so it never outlives `main`.
//!
//! There is exactly one handler thread per process, started lazily the
//! first time a `Pool` is created.

use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

use taskpool_core::{kdebug, kerror};

use crate::registry;

/// Internal signal used only to wake the handler thread's `sigwait` at
/// process exit. Never delivered by the user.
const STOP_SIGNAL: libc::c_int = libc::SIGUSR2;

/// The handler thread's join handle, so `on_process_exit` can wait for it
/// to actually exit after signaling it, rather than just firing the
/// signal and hoping. `None` until `spawn_handler_thread` succeeds.
static HANDLER_THREAD: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);
static INSTALL_ONCE: OnceLock<()> = OnceLock::new();

/// Ensure the dedicated signal-handling thread is running. Safe to call
/// from every `Pool::new` — only the first call does anything.
pub fn ensure_installed() {
    INSTALL_ONCE.get_or_init(|| {
        block_in_current_thread();
        spawn_handler_thread();
        unsafe {
            libc::atexit(on_process_exit);
        }
    });
}

/// Block SIGINT (and the internal stop signal) on the calling thread.
/// Called for the installing thread and for every worker thread spawned
/// by a `Pool`, so only the handler thread ever observes SIGINT directly.
pub fn block_in_current_thread() {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGINT);
        libc::sigaddset(&mut set, STOP_SIGNAL);
        libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());
    }
}

fn spawn_handler_thread() {
    let builder = std::thread::Builder::new().name("taskpool-interrupt".to_string());
    match builder.spawn(handler_loop) {
        Ok(handle) => {
            *HANDLER_THREAD.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        }
        Err(e) => {
            kerror!("failed to spawn interrupt handler thread: {}", e);
        }
    }
}

fn handler_loop() {
    block_in_current_thread();

    let mut wait_set: libc::sigset_t = unsafe { std::mem::zeroed() };
    unsafe {
        libc::sigemptyset(&mut wait_set);
        libc::sigaddset(&mut wait_set, libc::SIGINT);
        libc::sigaddset(&mut wait_set, STOP_SIGNAL);
    }

    loop {
        let mut received: libc::c_int = 0;
        let rc = unsafe { libc::sigwait(&wait_set, &mut received) };
        if rc != 0 {
            // Interrupted by something other than the signals we asked
            // for; retry rather than spin down the handler thread.
            continue;
        }

        if received == STOP_SIGNAL {
            kdebug!("interrupt handler thread exiting");
            return;
        }

        if received == libc::SIGINT {
            kdebug!("SIGINT received, draining all registered pools");
            registry::drain_all_for_interrupt();
            std::process::exit(130);
        }
    }
}

extern "C" fn on_process_exit() {
    let handle = HANDLER_THREAD
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();
    if let Some(handle) = handle {
        unsafe {
            libc::kill(libc::getpid(), STOP_SIGNAL);
        }
        let _ = handle.join();
    }
}
