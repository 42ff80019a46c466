use std::io;

use super::io::AtomicWritePhase;
use super::ResolvedEdit;
use crate::edit::CapturedStack;

mod splice;

fn fail_on_phase(target_phase: AtomicWritePhase) -> impl FnMut(AtomicWritePhase) -> io::Result<()> {
    move |phase| {
        if phase == target_phase {
            Err(io::Error::other("injected atomic-write failure"))
        } else {
            Ok(())
        }
    }
}

fn resolved(start: usize, end: usize, text: &str, stack: &str) -> ResolvedEdit {
    ResolvedEdit {
        start,
        end,
        text: text.to_string(),
        stack: CapturedStack::new(stack),
    }
}
