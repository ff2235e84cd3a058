//! A processor simulation library
//!
//! This is used for running a scheduler from the [`scheduler`] crate one
//! cycle at a time. Every cycle the processor admits the processes that
//! arrive, asks the scheduler which process runs, executes one of its
//! instructions and writes the trace.

use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scheduler::{
    Instruction, Pid, ProcessState, Progress, Scheduler, SchedulerError, SchedulingDecision,
    StopReason, Termination, Timings,
};
use tracing::{debug, info, warn};

pub mod error;
pub mod loader;
pub mod trace;

pub use error::{Error, Result};
pub use loader::{
    load_schedule, parse_instruction, parse_instructions, parse_schedule, ArrivalEntry,
    DirectoryCatalog, InstructionCatalog,
};
pub use trace::{
    format_header, format_trace, TraceEvent, TraceRecord, TraceSink, TraceWriter, FINISH_MARKER,
};

/// Parameters of a simulation run that are not owned by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// The chance, checked once per cycle, that the running process is terminated.
    pub termination_probability: f64,

    /// Real time pause after every cycle. It does not change the outcome.
    pub cycle_delay: Option<Duration>,
}

impl SimulationConfig {
    pub fn new(termination_probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&termination_probability) {
            return Err(Error::InvalidProbability(termination_probability));
        }
        Ok(SimulationConfig {
            termination_probability,
            cycle_delay: None,
        })
    }

    /// Sets the pause between cycles, a zero duration disables it.
    pub fn with_cycle_delay(mut self, delay: Duration) -> Self {
        self.cycle_delay = (!delay.is_zero()).then_some(delay);
        self
    }
}

/// Information about a process at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    /// The PID of the process.
    pub pid: Pid,

    pub name: String,

    /// The process state.
    pub state: ProcessState,

    /// The cycle the process was admitted in.
    pub arrival: usize,

    /// The cycle the process terminated in.
    pub finished: Option<usize>,

    pub timings: Timings,
}

impl Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finished = self
            .finished
            .map_or_else(|| "-".to_string(), |cycle| cycle.to_string());
        write!(
            f,
            "{}\t{}\t{}\t\t{}\t{}\t{}\t{}\t{}",
            self.pid,
            self.name,
            self.state,
            self.arrival,
            finished,
            self.timings.executed,
            self.timings.ready,
            self.timings.blocked
        )
    }
}

/// The outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// The number of simulated cycles.
    pub cycles: usize,

    /// The processes, in admission order.
    pub processes: Vec<ProcessInfo>,
}

impl Summary {
    fn collect<S: Scheduler>(cycles: usize, scheduler: &S) -> Summary {
        let processes = scheduler
            .list()
            .into_iter()
            .map(|process| ProcessInfo {
                pid: process.pid(),
                name: process.name().to_string(),
                state: process.state(),
                arrival: process.arrival(),
                finished: process.finished(),
                timings: process.timings(),
            })
            .collect();
        Summary { cycles, processes }
    }

    pub fn count(&self, termination: Termination) -> usize {
        self.processes
            .iter()
            .filter(|process| process.state == ProcessState::Terminated(termination))
            .count()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cycles: {}", self.cycles)?;
        writeln!(f, "PID\tNAME\tSTATE\t\tARRIVAL\tEND\tEXEC\tREADY\tBLOCKED")?;
        for process in &self.processes {
            writeln!(f, "{}", process)?;
        }
        write!(
            f,
            "Completed: {}, terminated prematurely: {}",
            self.count(Termination::Completed),
            self.count(Termination::Killed)
        )
    }
}

/// The processor simulator.
pub struct Processor<S: Scheduler, R: Rng> {
    scheduler: S,
    config: SimulationConfig,
    rng: R,
}

impl<S: Scheduler> Processor<S, StdRng> {
    /// Builds a processor whose random source is seeded with `seed`,
    /// or from the operating system when no seed is given.
    pub fn seeded(scheduler: S, config: SimulationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Processor::new(scheduler, config, rng)
    }
}

impl<S: Scheduler, R: Rng> Processor<S, R> {
    pub fn new(scheduler: S, config: SimulationConfig, rng: R) -> Self {
        Processor {
            scheduler,
            config,
            rng,
        }
    }

    /// Runs the simulation until every process of `schedule` has terminated.
    ///
    /// * `schedule` - the arrivals, sorted by cycle before the run starts. Arrivals
    ///                before cycle 1 are admitted in cycle 1.
    /// * `catalog` - provides the instructions of each process when it arrives.
    /// * `sink` - receives the trace records.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use std::num::NonZeroUsize;
    /// use processor::{format_trace, parse_schedule, Processor, SimulationConfig, TraceRecord};
    ///
    /// let schedule = parse_schedule("1|P1\n").unwrap();
    /// let catalog = HashMap::from([("P1".to_string(), "A\nB\n".to_string())]);
    /// let scheduler = scheduler::round_robin(NonZeroUsize::new(2).unwrap());
    /// let config = SimulationConfig::new(0.0).unwrap();
    ///
    /// let mut trace: Vec<TraceRecord> = Vec::new();
    /// let summary = Processor::seeded(scheduler, config, Some(7))
    ///     .run(schedule, &catalog, &mut trace)
    ///     .unwrap();
    ///
    /// assert_eq!(summary.cycles, 2);
    /// assert_eq!(format_trace(&trace), "1\tP1\tA\n2\tP1\tB\n2\tP1\tFinalizar\n");
    /// ```
    pub fn run<C, T>(mut self, schedule: Vec<ArrivalEntry>, catalog: &C, sink: &mut T) -> Result<Summary>
    where
        C: InstructionCatalog + ?Sized,
        T: TraceSink + ?Sized,
    {
        let mut arrivals = schedule;
        arrivals.sort_by_key(|entry| entry.cycle);
        let mut arrivals = VecDeque::from(arrivals);

        if arrivals.is_empty() {
            warn!("empty arrival schedule, nothing to simulate");
            return Ok(Summary::collect(0, &self.scheduler));
        }

        info!(processes = arrivals.len(), "simulation started");
        let mut cycle = 0;
        loop {
            cycle += 1;

            self.admit(cycle, &mut arrivals, catalog)?;

            match self.scheduler.next() {
                SchedulingDecision::Run { pid, .. } => self.execute(cycle, pid, sink)?,
                SchedulingDecision::Idle => debug!(cycle, "idle"),
                SchedulingDecision::Done => {}
            }

            self.scheduler.tick();

            self.trial(cycle, sink)?;

            if arrivals.is_empty() && self.scheduler.all_terminated() {
                break;
            }

            if let Some(delay) = self.config.cycle_delay {
                thread::sleep(delay);
            }
        }

        sink.flush()?;
        info!(cycles = cycle, "all processes terminated, simulation finished");
        Ok(Summary::collect(cycle, &self.scheduler))
    }

    fn admit<C>(&mut self, cycle: usize, arrivals: &mut VecDeque<ArrivalEntry>, catalog: &C) -> Result<()>
    where
        C: InstructionCatalog + ?Sized,
    {
        while arrivals.front().is_some_and(|entry| entry.cycle <= cycle) {
            if let Some(entry) = arrivals.pop_front() {
                let instructions = catalog.load(&entry.name)?;
                self.scheduler.admit(&entry.name, instructions, cycle)?;
            }
        }
        Ok(())
    }

    fn execute<T>(&mut self, cycle: usize, pid: Pid, sink: &mut T) -> Result<()>
    where
        T: TraceSink + ?Sized,
    {
        let process = self
            .scheduler
            .process(pid)
            .ok_or(SchedulerError::NoRunningProcess)?;
        let name = process.name().to_string();
        let current = process.current().cloned();

        match current {
            None => self.finish(cycle, &name, StopReason::Exit { cycle }, sink)?,
            Some(Instruction::Io(cycles)) => {
                self.scheduler.stop(StopReason::Io { cycles })?;
            }
            Some(Instruction::Cpu(label)) => {
                debug!(cycle, process = %name, instruction = %label, "executing");
                sink.record(TraceRecord::instruction(cycle, &name, &label))?;
                match self.scheduler.advance()? {
                    Progress::Continue => {}
                    Progress::Expired => {
                        self.scheduler.stop(StopReason::Expired)?;
                    }
                    Progress::Finished => self.finish(cycle, &name, StopReason::Exit { cycle }, sink)?,
                }
            }
        }
        Ok(())
    }

    /// Checks whether the running process is terminated prematurely this cycle.
    fn trial<T>(&mut self, cycle: usize, sink: &mut T) -> Result<()>
    where
        T: TraceSink + ?Sized,
    {
        let Some(pid) = self.scheduler.running() else {
            return Ok(());
        };
        if self.rng.gen::<f64>() >= self.config.termination_probability {
            return Ok(());
        }
        let name = self
            .scheduler
            .process(pid)
            .map(|process| process.name().to_string())
            .ok_or(SchedulerError::NoRunningProcess)?;
        self.finish(cycle, &name, StopReason::Killed { cycle }, sink)
    }

    fn finish<T>(&mut self, cycle: usize, name: &str, reason: StopReason, sink: &mut T) -> Result<()>
    where
        T: TraceSink + ?Sized,
    {
        self.scheduler.stop(reason)?;
        sink.record(TraceRecord::finish(cycle, name))?;
        Ok(())
    }
}
