use std::fmt::{self, Display};
use std::num::NonZeroUsize;

use thiserror::Error;

/// The PID of a process
///
/// The PID cannot be 0, PIDs start from 1 and follow the admission order.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Pid(NonZeroUsize);

impl Pid {
    pub(crate) fn from_index(index: usize) -> Pid {
        Pid(NonZeroUsize::MIN.saturating_add(index))
    }

    pub(crate) fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl PartialEq<usize> for Pid {
    fn eq(&self, other: &usize) -> bool {
        self.0.get() == *other
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The prefix that marks an I/O instruction, followed by the blocking duration.
pub const IO_PREFIX: &str = "ES";

/// A single instruction of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// A plain CPU instruction, the label is opaque to the scheduler.
    Cpu(String),

    /// An I/O instruction that blocks the process for the given number of cycles.
    Io(usize),
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Cpu(label) => write!(f, "{label}"),
            Instruction::Io(cycles) => write!(f, "{IO_PREFIX}{cycles}"),
        }
    }
}

/// How a process reached the [`ProcessState::Terminated`] state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The final instruction was executed.
    Completed,

    /// The process was terminated prematurely.
    Killed,
}

/// The state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// The process is ready to be scheduled.
    Ready,

    /// The process is currently scheduled.
    Running,

    /// The process issued an I/O instruction and waits for it.
    Blocked {
        /// Cycles left before the process becomes ready again.
        remaining: usize,
    },

    /// The process will never be scheduled again.
    Terminated(Termination),
}

impl ProcessState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, ProcessState::Terminated(_))
    }
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Blocked { remaining } => write!(f, "BLOCKED {}", remaining),
            ProcessState::Terminated(Termination::Completed) => write!(f, "DONE"),
            ProcessState::Terminated(Termination::Killed) => write!(f, "KILLED"),
        }
    }
}

/// Per process counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Plain instructions executed.
    pub executed: usize,

    /// Cycles spent in the ready queue.
    pub ready: usize,

    /// Cycles spent blocked on I/O.
    pub blocked: usize,
}

/// The action that the scheduler asks the processor to take.
///
/// This is returned by the [`Scheduler::next`] function.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SchedulingDecision {
    /// Run the process with PID `pid`, preempting it after `timeslice` instructions
    /// in the current burst.
    Run { pid: Pid, timeslice: NonZeroUsize },

    /// No process can run this cycle, but some are still alive.
    Idle,

    /// Every known process has terminated.
    Done,
}

impl Display for SchedulingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingDecision::Run { pid, timeslice } => {
                write!(f, "Run {} for {} instructions", pid, timeslice)
            }
            SchedulingDecision::Idle => write!(f, "Idle, no process is ready"),
            SchedulingDecision::Done => write!(f, "Done, no more processes"),
        }
    }
}

/// The reason that the running process has stopped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StopReason {
    /// The quantum of the process has been used and the process
    /// goes back to the ready queue.
    Expired,

    /// The current instruction is an I/O instruction.
    Io {
        /// The number of cycles the process stays blocked.
        cycles: usize,
    },

    /// The final instruction was executed in cycle `cycle`.
    Exit { cycle: usize },

    /// The process was terminated prematurely in cycle `cycle`.
    Killed { cycle: usize },
}

impl Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Expired => write!(f, "Expired"),
            StopReason::Io { cycles } => write!(f, "I/O for {cycles} cycles"),
            StopReason::Exit { cycle } => write!(f, "Exit at {cycle}"),
            StopReason::Killed { cycle } => write!(f, "Killed at {cycle}"),
        }
    }
}

/// What happened after the running process executed a plain instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The process keeps running.
    Continue,

    /// The burst reached the quantum and instructions remain.
    Expired,

    /// The instruction was the final one.
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("process `{0}` was already admitted")]
    DuplicateProcess(String),

    #[error("no process is running")]
    NoRunningProcess,
}

/// The trait that any scheduler has to implement.
pub trait Scheduler {
    /// Admits a new process in the [`ProcessState::Ready`] state.
    fn admit(
        &mut self,
        name: &str,
        instructions: Vec<Instruction>,
        arrival: usize,
    ) -> Result<Pid, SchedulerError>;

    /// Returns the action that the processor has to perform next.
    fn next(&mut self) -> SchedulingDecision;

    /// Accounts one plain instruction executed by the running process.
    fn advance(&mut self) -> Result<Progress, SchedulerError>;

    /// The scheduler is informed about the stopping of the running process
    /// and the reason.
    fn stop(&mut self, reason: StopReason) -> Result<Pid, SchedulerError>;

    /// Advances the blocked processes by one cycle.
    fn tick(&mut self);

    /// Returns the PID of the running process.
    fn running(&self) -> Option<Pid>;

    /// Returns a process by its PID.
    fn process(&self, pid: Pid) -> Option<&dyn Process>;

    /// Returns the list of processes, in admission order.
    fn list(&self) -> Vec<&dyn Process>;

    /// Returns `true` when every admitted process has terminated.
    fn all_terminated(&self) -> bool;
}

/// The trait that the Process Control Block (PCB) has to implement.
///
/// The PCB can be implemented with any data structure as long as
/// it implements this trait.
pub trait Process {
    /// Return the PID of the process.
    fn pid(&self) -> Pid;

    /// Return the name of the process.
    fn name(&self) -> &str;

    /// Return the state of the process.
    fn state(&self) -> ProcessState;

    /// Returns the instruction the process executes next.
    fn current(&self) -> Option<&Instruction>;

    /// Returns the instruction pointer.
    fn pointer(&self) -> usize;

    /// Returns the number of instructions.
    fn instruction_count(&self) -> usize;

    /// Returns the cycle the process arrived in.
    fn arrival(&self) -> usize;

    /// Returns the cycle the process terminated in.
    fn finished(&self) -> Option<usize>;

    /// Returns the process counters.
    fn timings(&self) -> Timings;
}
