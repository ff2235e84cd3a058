use processor::{
    format_header, format_trace, parse_schedule, Processor, SimulationConfig, TraceRecord,
};
use scheduler::round_robin;

use std::collections::HashMap;
use std::env;
use std::fs;
use std::num::NonZeroUsize;

mod cli;
mod simple;

fn write_output(folder: &str, name: &str, output: &str) {
    fs::create_dir_all(format!("../outputs/{folder}")).unwrap();
    fs::write(format!("../outputs/{folder}/{name}.log"), output).unwrap();
}

fn read_output(folder: &str, name: &str) -> String {
    fs::read_to_string(format!("../outputs/{folder}/{name}.log")).unwrap()
}

fn run(folder: &str, name: &str, output: &str) {
    if env::var("WRITE_OUTPUT").is_ok() {
        write_output(folder, name, output);
    } else {
        let reference = read_output(folder, name);

        println!("\nleft = Correct Output\nright = Your Output\n");
        use pretty_assertions::assert_eq;
        assert_eq!(reference, output);
    }
}

/// Simulates `schedule` with in memory instruction files and returns the
/// trace file contents, header included.
fn simulate(quantum: usize, probability: f64, schedule: &str, processes: &[(&str, &str)]) -> String {
    let catalog: HashMap<String, String> = processes
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();
    let config = SimulationConfig::new(probability).unwrap();
    let scheduler = round_robin(NonZeroUsize::new(quantum).unwrap());

    let mut trace: Vec<TraceRecord> = Vec::new();
    Processor::seeded(scheduler, config, Some(0))
        .run(parse_schedule(schedule).unwrap(), &catalog, &mut trace)
        .unwrap();

    format!("{}{}", format_header(quantum, probability), format_trace(&trace))
}
