//! A scheduler library.
//!
//! This library provides the process model, the process registry and the
//! traits and structures necessary to implement a process scheduler that
//! is driven one cycle at a time.
//!

use std::num::NonZeroUsize;

mod registry;
mod scheduler;

pub use crate::registry::{Pcb, Registry};
pub use crate::scheduler::{
    Instruction, Pid, Process, ProcessState, Progress, Scheduler, SchedulerError,
    SchedulingDecision, StopReason, Termination, Timings, IO_PREFIX,
};

mod schedulers;

pub use schedulers::RoundRobin;

/// Returns a structure that implements the `Scheduler` trait with a round robin scheduler policy
///
/// * `quantum` - the number of instructions that a process can execute in a row
///               before it is preempted and sent to the back of the ready queue.
pub fn round_robin(quantum: NonZeroUsize) -> RoundRobin {
    RoundRobin::new(quantum)
}
