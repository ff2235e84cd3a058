//! The execution trace written while the simulation runs.

use std::fmt::{self, Display};
use std::io::{self, BufWriter, Write};

/// The payload written in place of an instruction when a process terminates.
pub const FINISH_MARKER: &str = "Finalizar";

/// What a trace line reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The process executed the plain instruction with this label.
    Instruction(String),

    /// The process terminated.
    Finish,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Instruction(label) => write!(f, "{label}"),
            TraceEvent::Finish => write!(f, "{FINISH_MARKER}"),
        }
    }
}

/// One line of the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub cycle: usize,
    pub process: String,
    pub event: TraceEvent,
}

impl TraceRecord {
    pub fn instruction(cycle: usize, process: &str, label: &str) -> Self {
        TraceRecord {
            cycle,
            process: process.to_string(),
            event: TraceEvent::Instruction(label.to_string()),
        }
    }

    pub fn finish(cycle: usize, process: &str) -> Self {
        TraceRecord {
            cycle,
            process: process.to_string(),
            event: TraceEvent::Finish,
        }
    }
}

impl Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.cycle, self.process, self.event)
    }
}

/// Append only destination of the trace records.
pub trait TraceSink {
    fn record(&mut self, record: TraceRecord) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, record: TraceRecord) -> io::Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Writes one line per record to any [`Write`] implementation.
pub struct TraceWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Self {
        TraceWriter {
            writer: BufWriter::new(writer),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn record(&mut self, record: TraceRecord) -> io::Result<()> {
        writeln!(self.writer, "{record}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Format the two header lines of a trace file.
///
/// * `quantum` - the `m` parameter of the run.
/// * `probability` - the `p` parameter of the run, written with two decimals.
pub fn format_header(quantum: usize, probability: f64) -> String {
    format!("m={quantum}\np={probability:.2}\n")
}

/// Format trace records to a [`String`], one line each.
pub fn format_trace(records: &[TraceRecord]) -> String {
    records.iter().map(|record| format!("{record}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_are_tab_separated() {
        assert_eq!(
            TraceRecord::instruction(12, "P1", "ADD").to_string(),
            "12\tP1\tADD"
        );
        assert_eq!(TraceRecord::finish(3, "P2").to_string(), "3\tP2\tFinalizar");
    }

    #[test]
    fn header_uses_two_decimals() {
        assert_eq!(format_header(3, 0.1), "m=3\np=0.10\n");
        assert_eq!(format_header(1, 1.0), "m=1\np=1.00\n");
    }

    #[test]
    fn writer_sink_appends_lines() {
        let mut sink = TraceWriter::new(Vec::new());
        sink.record(TraceRecord::instruction(1, "P1", "A")).unwrap();
        sink.record(TraceRecord::finish(1, "P1")).unwrap();

        let bytes = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "1\tP1\tA\n1\tP1\tFinalizar\n");
    }

    #[test]
    fn format_trace_matches_the_writer() {
        let records = vec![
            TraceRecord::instruction(1, "P1", "A"),
            TraceRecord::finish(1, "P1"),
        ];

        assert_eq!(format_trace(&records), "1\tP1\tA\n1\tP1\tFinalizar\n");
    }
}
