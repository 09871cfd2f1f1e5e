use nix::libc::c_int;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

extern "C" fn on_interrupt(_: c_int) {}

/// Keep SIGINT from terminating the shell.
///
/// The line editor reads Ctrl-C as a key, so this only matters while a child
/// runs: the child (same process group) gets the signal and dies, the shell
/// keeps waiting. A caught signal reverts to its default action across exec,
/// so children are not affected by this handler.
pub fn shield_from_interrupts() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler does nothing, which is trivially async-signal-safe.
    unsafe { sigaction(Signal::SIGINT, &action) }?;
    log::debug!("SIGINT handler installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn test_interrupt_does_not_kill_the_shell() {
        shield_from_interrupts().unwrap();
        raise(Signal::SIGINT).unwrap();
    }
}
