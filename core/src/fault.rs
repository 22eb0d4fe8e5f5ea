//! Fail-fast exit path and the fatal-fault trap.
//!
//! The trap only turns a crash into a recognisable diagnostic and exit
//! status. It does no cleanup: buffered log lines may be lost. Anything that
//! needs to survive a crash should watch the exit status from outside.

use crate::error::{ExtractError, FatalFault, EXIT_FATAL};
use crate::logging;

pub const CRASH_MESSAGE: &str = "Internal crash detected.";

/// Install the panic hook and, on unix, the `SIGSEGV`/`SIGBUS` handlers.
pub fn install() -> Result<(), FatalFault> {
    std::panic::set_hook(Box::new(|info| {
        if !logging::writes_to_stderr() {
            tracing::error!("{}: {}", CRASH_MESSAGE, info);
        }
        eprintln!("{CRASH_MESSAGE}");
        eprintln!("{info}");
        std::process::exit(EXIT_FATAL);
    }));

    #[cfg(unix)]
    unix::install()?;

    Ok(())
}

/// Print the diagnostic for `err`. Help goes to stdout, everything else to
/// stderr. A log file also gets the failure; a stderr log does not, since the
/// plain line already lands there.
pub fn report(err: &ExtractError) {
    if err.is_help() {
        println!("{err}");
        return;
    }
    if !logging::writes_to_stderr() {
        tracing::error!(exit_code = err.exit_code(), "{}", err);
    }
    eprintln!("{err}");
}

pub fn fail_fast(err: &ExtractError) -> ! {
    report(err);
    std::process::exit(err.exit_code())
}

#[cfg(unix)]
mod unix {
    use crate::error::{FatalFault, EXIT_FATAL};

    const SIGNALS: [libc::c_int; 2] = [libc::SIGSEGV, libc::SIGBUS];
    const CRASH_LINE: &[u8] = b"Internal crash detected.\n";

    extern "C" fn on_fatal_signal(_signum: libc::c_int) {
        // SAFETY: write(2) and _exit(2) are async-signal-safe.
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                CRASH_LINE.as_ptr().cast(),
                CRASH_LINE.len(),
            );
            libc::_exit(EXIT_FATAL);
        }
    }

    pub(super) fn handler() -> libc::sighandler_t {
        on_fatal_signal as extern "C" fn(libc::c_int) as libc::sighandler_t
    }

    pub(super) fn install() -> Result<(), FatalFault> {
        for signal in SIGNALS {
            // SAFETY: an all-zero sigaction is a valid starting value.
            let res = unsafe {
                let mut action: libc::sigaction = std::mem::zeroed();
                action.sa_sigaction = handler();
                libc::sigemptyset(&mut action.sa_mask);
                libc::sigaction(signal, &action, std::ptr::null_mut())
            };
            if res < 0 {
                return Err(FatalFault::TrapInstall {
                    signal,
                    source: std::io::Error::last_os_error(),
                });
            }
        }
        Ok(())
    }

}
