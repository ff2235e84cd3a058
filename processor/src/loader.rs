//! Loaders for the arrival schedule and the process instructions.
//!
//! Both file formats are line based. Blank lines and lines starting with
//! [`COMMENT`] are skipped, line numbers in errors count every line.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use scheduler::{Instruction, IO_PREFIX};
use tracing::debug;

use crate::error::{Error, Result};

pub const COMMENT: char = '#';

/// Separates the arrival cycle from the process name.
pub const SEPARATOR: char = '|';

/// A process and the cycle it arrives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalEntry {
    pub cycle: usize,
    pub name: String,
}

impl ArrivalEntry {
    pub fn new(cycle: usize, name: impl Into<String>) -> Self {
        ArrivalEntry {
            cycle,
            name: name.into(),
        }
    }
}

fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT))
}

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses an arrival schedule, one `<cycle>|<process>` entry per line.
///
/// Entries are returned in file order.
pub fn parse_schedule(text: &str) -> Result<Vec<ArrivalEntry>> {
    const ORIGIN: &str = "arrival schedule";

    content_lines(text)
        .map(|(number, line)| {
            let fields: Vec<&str> = line.split(SEPARATOR).collect();
            let &[cycle, name] = fields.as_slice() else {
                return Err(Error::format(
                    ORIGIN,
                    number,
                    format!(
                        "expected `<cycle>{SEPARATOR}<process>`, found {} fields",
                        fields.len()
                    ),
                ));
            };

            let cycle = cycle.trim().parse::<usize>().map_err(|err| {
                Error::format(ORIGIN, number, format!("invalid arrival cycle `{}`: {err}", cycle.trim()))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::format(ORIGIN, number, "missing process name"));
            }

            Ok(ArrivalEntry::new(cycle, name))
        })
        .collect()
}

/// Reads and parses the arrival schedule stored at `path`.
pub fn load_schedule(path: impl AsRef<Path>) -> Result<Vec<ArrivalEntry>> {
    let path = path.as_ref();
    let text = read(path)?;
    parse_schedule(&text).map_err(|err| err.with_origin(path.display().to_string()))
}

/// Parses one instruction. I/O instructions are [`IO_PREFIX`] followed by the
/// number of cycles, every other line is a plain instruction label.
pub fn parse_instruction(line: &str) -> std::result::Result<Instruction, String> {
    let line = line.trim();
    match line.strip_prefix(IO_PREFIX) {
        Some(cycles) => cycles
            .parse::<usize>()
            .map(Instruction::Io)
            .map_err(|err| format!("invalid I/O duration in `{line}`: {err}")),
        None => Ok(Instruction::Cpu(line.to_string())),
    }
}

/// Parses the instructions of a process, one per line.
pub fn parse_instructions(text: &str) -> Result<Vec<Instruction>> {
    content_lines(text)
        .map(|(number, line)| {
            parse_instruction(line).map_err(|message| Error::format("instructions", number, message))
        })
        .collect()
}

/// Provides the instructions of a process when it arrives.
pub trait InstructionCatalog {
    fn load(&self, name: &str) -> Result<Vec<Instruction>>;
}

/// A directory holding one instruction file per process.
///
/// The file is named after the process, a `.txt` extension is tried
/// when the bare name does not exist.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryCatalog { root: root.into() }
    }

    fn locate(&self, name: &str) -> PathBuf {
        let exact = self.root.join(name);
        if exact.is_file() || Path::new(name).extension().is_some() {
            return exact;
        }
        let txt = self.root.join(format!("{name}.txt"));
        if txt.is_file() {
            txt
        } else {
            exact
        }
    }
}

impl InstructionCatalog for DirectoryCatalog {
    fn load(&self, name: &str) -> Result<Vec<Instruction>> {
        let path = self.locate(name);
        let text = read(&path)?;
        let instructions =
            parse_instructions(&text).map_err(|err| err.with_origin(path.display().to_string()))?;

        let listing: Vec<String> = instructions.iter().map(ToString::to_string).collect();
        debug!(name, path = %path.display(), instructions = ?listing, "instructions loaded");
        Ok(instructions)
    }
}

/// Raw instruction file contents keyed by process name.
impl InstructionCatalog for HashMap<String, String> {
    fn load(&self, name: &str) -> Result<Vec<Instruction>> {
        let text = self.get(name).ok_or_else(|| Error::NotFound {
            path: PathBuf::from(name),
        })?;
        parse_instructions(text).map_err(|err| err.with_origin(name))
    }
}
