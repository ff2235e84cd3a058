use std::collections::VecDeque;
use std::num::NonZeroUsize;

use tracing::{debug, info};

use crate::registry::Registry;
use crate::ProcessState::{Blocked, Ready, Running};
use crate::SchedulingDecision::{Done, Idle, Run};
use crate::{
    Instruction, Pid, Process, Progress, Scheduler, SchedulerError, SchedulingDecision,
    StopReason, Termination,
};

/// Round robin with a FIFO ready queue and a fixed quantum of instructions.
///
/// Processes enter the back of the ready queue when they arrive, when their
/// quantum expires and when their I/O wait ends.
pub struct RoundRobin {
    registry: Registry,
    ready_queue: VecDeque<Pid>,
    waiting_queue: Vec<Pid>,
    // blocked during the current cycle, they start counting down on the next tick
    blocking: Vec<Pid>,
    current_process: Option<Pid>,
    quantum: NonZeroUsize,
}

impl RoundRobin {
    pub fn new(quantum: NonZeroUsize) -> Self {
        RoundRobin {
            registry: Registry::new(),
            ready_queue: VecDeque::new(),
            waiting_queue: Vec::new(),
            blocking: Vec::new(),
            current_process: None,
            quantum,
        }
    }

    /// The PIDs in the ready queue, front first.
    pub fn ready_queue(&self) -> impl Iterator<Item = Pid> + '_ {
        self.ready_queue.iter().copied()
    }
}

impl Scheduler for RoundRobin {
    fn admit(
        &mut self,
        name: &str,
        instructions: Vec<Instruction>,
        arrival: usize,
    ) -> Result<Pid, SchedulerError> {
        let pid = self.registry.insert(name, instructions, arrival)?;
        self.ready_queue.push_back(pid);
        info!(%pid, name, arrival, "process admitted");
        Ok(pid)
    }

    fn next(&mut self) -> SchedulingDecision {
        let timeslice = self.quantum;

        if let Some(pid) = self.current_process {
            return Run { pid, timeslice };
        }

        while let Some(pid) = self.ready_queue.pop_front() {
            let Some(process) = self.registry.get_mut(pid) else {
                continue;
            };
            process.state = Running;
            process.burst = 0;
            self.current_process = Some(pid);
            debug!(%pid, name = process.name(), "process dispatched");
            return Run { pid, timeslice };
        }

        if self.registry.all_terminated() {
            Done
        } else {
            Idle
        }
    }

    fn advance(&mut self) -> Result<Progress, SchedulerError> {
        let pid = self.current_process.ok_or(SchedulerError::NoRunningProcess)?;
        let process = self
            .registry
            .get_mut(pid)
            .ok_or(SchedulerError::NoRunningProcess)?;

        let count = process.instruction_count();
        process.pointer = (process.pointer + 1).min(count);
        process.burst += 1;
        process.timings.executed += 1;

        if process.pointer == count {
            Ok(Progress::Finished)
        } else if process.burst >= self.quantum.get() {
            Ok(Progress::Expired)
        } else {
            Ok(Progress::Continue)
        }
    }

    fn stop(&mut self, reason: StopReason) -> Result<Pid, SchedulerError> {
        let pid = self
            .current_process
            .take()
            .ok_or(SchedulerError::NoRunningProcess)?;
        let process = self
            .registry
            .get_mut(pid)
            .ok_or(SchedulerError::NoRunningProcess)?;

        match reason {
            StopReason::Expired => {
                process.state = Ready;
                self.ready_queue.push_back(pid);
                info!(%pid, name = process.name(), "quantum expired, back to ready");
            }
            StopReason::Io { cycles } => {
                process.pointer = (process.pointer + 1).min(process.instruction_count());
                process.state = Blocked { remaining: cycles };
                self.blocking.push(pid);
                info!(%pid, name = process.name(), cycles, "blocked on I/O");
            }
            StopReason::Exit { cycle } => {
                process.terminate(Termination::Completed, cycle);
                info!(%pid, name = process.name(), cycle, "process finished");
            }
            StopReason::Killed { cycle } => {
                process.terminate(Termination::Killed, cycle);
                info!(%pid, name = process.name(), cycle, "process terminated prematurely");
            }
        }

        Ok(pid)
    }

    fn tick(&mut self) {
        let registry = &mut self.registry;
        let ready_queue = &mut self.ready_queue;

        for pid in ready_queue.iter() {
            if let Some(process) = registry.get_mut(*pid) {
                process.timings.ready += 1;
            }
        }

        self.waiting_queue.retain(|pid| {
            let Some(process) = registry.get_mut(*pid) else {
                return false;
            };
            let Blocked { remaining } = process.state else {
                return false;
            };
            process.timings.blocked += 1;
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                process.state = Ready;
                ready_queue.push_back(*pid);
                debug!(%pid, name = process.name(), "I/O finished, back to ready");
                false
            } else {
                process.state = Blocked { remaining };
                true
            }
        });

        for pid in self.blocking.drain(..) {
            let Some(process) = registry.get_mut(pid) else {
                continue;
            };
            if process.state == (Blocked { remaining: 0 }) {
                process.state = Ready;
                ready_queue.push_back(pid);
            } else {
                self.waiting_queue.push(pid);
            }
        }
    }

    fn running(&self) -> Option<Pid> {
        self.current_process
    }

    fn process(&self, pid: Pid) -> Option<&dyn Process> {
        self.registry.get(pid).map(|process| process as &dyn Process)
    }

    fn list(&self) -> Vec<&dyn Process> {
        self.registry
            .iter()
            .map(|process| process as &dyn Process)
            .collect()
    }

    fn all_terminated(&self) -> bool {
        self.registry.all_terminated()
    }
}
