use std::collections::HashMap;

use crate::{Instruction, Pid, Process, ProcessState, SchedulerError, Termination, Timings};

/// The process control block kept by the [`Registry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pcb {
    pid: Pid,
    name: String,
    instructions: Vec<Instruction>,
    pub(crate) pointer: usize,
    pub(crate) burst: usize,
    pub(crate) state: ProcessState,
    pub(crate) timings: Timings,
    arrival: usize,
    pub(crate) finished: Option<usize>,
}

impl Pcb {
    fn new(pid: Pid, name: &str, instructions: Vec<Instruction>, arrival: usize) -> Self {
        Pcb {
            pid,
            name: name.to_string(),
            instructions,
            pointer: 0,
            burst: 0,
            state: ProcessState::Ready,
            timings: Timings::default(),
            arrival,
            finished: None,
        }
    }

    pub(crate) fn terminate(&mut self, termination: Termination, cycle: usize) {
        self.state = ProcessState::Terminated(termination);
        self.finished = Some(cycle);
    }
}

impl Process for Pcb {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ProcessState {
        self.state
    }

    fn current(&self) -> Option<&Instruction> {
        self.instructions.get(self.pointer)
    }

    fn pointer(&self) -> usize {
        self.pointer
    }

    fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    fn arrival(&self) -> usize {
        self.arrival
    }

    fn finished(&self) -> Option<usize> {
        self.finished
    }

    fn timings(&self) -> Timings {
        self.timings
    }
}

/// Every process known to a scheduler, indexed by PID and by name.
///
/// Processes are never removed, terminated ones stay until the run ends.
#[derive(Debug, Default)]
pub struct Registry {
    processes: Vec<Pcb>,
    names: HashMap<String, Pid>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a process in the ready state and returns its PID.
    pub fn insert(
        &mut self,
        name: &str,
        instructions: Vec<Instruction>,
        arrival: usize,
    ) -> Result<Pid, SchedulerError> {
        if self.find(name).is_some() {
            return Err(SchedulerError::DuplicateProcess(name.to_string()));
        }
        let pid = Pid::from_index(self.processes.len());
        self.processes.push(Pcb::new(pid, name, instructions, arrival));
        self.names.insert(name.to_string(), pid);
        Ok(pid)
    }

    pub fn get(&self, pid: Pid) -> Option<&Pcb> {
        self.processes.get(pid.index())
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.processes.get_mut(pid.index())
    }

    pub fn find(&self, name: &str) -> Option<&Pcb> {
        self.names.get(name).and_then(|pid| self.get(*pid))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.processes.iter()
    }

    pub fn all_terminated(&self) -> bool {
        self.processes.iter().all(|process| process.state.is_terminated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pids_follow_admission_order() {
        let mut registry = Registry::new();
        let first = registry.insert("A", vec![], 1).unwrap();
        let second = registry.insert("B", vec![], 3).unwrap();

        assert!(first == 1);
        assert!(second == 2);
        assert_eq!(registry.find("B").map(|p| p.arrival()), Some(3));
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = Registry::new();
        registry.insert("A", vec![], 1).unwrap();

        assert_eq!(
            registry.insert("A", vec![], 2),
            Err(SchedulerError::DuplicateProcess("A".to_string()))
        );
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn empty_registry_is_all_terminated() {
        let mut registry = Registry::new();
        assert!(registry.all_terminated());

        let pid = registry.insert("A", vec![Instruction::Io(1)], 1).unwrap();
        assert!(!registry.all_terminated());

        registry.get_mut(pid).unwrap().terminate(Termination::Killed, 4);
        assert!(registry.all_terminated());
        assert_eq!(registry.get(pid).unwrap().finished(), Some(4));
    }
}
