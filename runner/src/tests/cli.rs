use std::ffi::OsString;
use std::fs;
use std::path::Path;

use clap::Parser;
use pretty_assertions::assert_eq;

use crate::output::ensure_header;
use crate::{execute, normalize_args, Cli};

fn args(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

fn cli(dir: &Path, extra: &[&str]) -> Cli {
    let processes = dir.join("procesos");
    let order = dir.join("orden.txt");
    let output = dir.join("salida.txt");
    let mut values = vec![
        "rrsim".to_string(),
        "-m".to_string(),
        "2".to_string(),
        "-p".to_string(),
        "0".to_string(),
        "-orden".to_string(),
        order.display().to_string(),
        "-salida".to_string(),
        output.display().to_string(),
        "-procesos".to_string(),
        processes.display().to_string(),
        "--delay-ms".to_string(),
        "0".to_string(),
    ];
    values.extend(extra.iter().map(|value| value.to_string()));
    Cli::try_parse_from(normalize_args(values.into_iter().map(OsString::from))).unwrap()
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("procesos")).unwrap();
    fs::write(dir.path().join("procesos").join("P1"), "A\nB\nC\n").unwrap();
    fs::write(dir.path().join("procesos").join("P2.txt"), "# P2\nD\n").unwrap();
    fs::write(dir.path().join("orden.txt"), "# orden.txt\n1|P1\n2|P2\n").unwrap();
    dir
}

#[test]
fn single_dash_flags_are_normalized() {
    assert_eq!(
        normalize_args(args(&["rrsim", "-m", "3", "-orden", "o.txt", "-salida", "s.txt"])),
        args(&["rrsim", "-m", "3", "--orden", "o.txt", "--salida", "s.txt"])
    );
    assert_eq!(
        normalize_args(args(&["rrsim", "--orden", "o.txt"])),
        args(&["rrsim", "--orden", "o.txt"])
    );
}

#[test]
fn all_four_options_are_required() {
    let missing_output = normalize_args(args(&["rrsim", "-m", "3", "-p", "0.5", "-orden", "o.txt"]));

    assert!(Cli::try_parse_from(missing_output).is_err());
}

#[test]
fn quantum_and_probability_are_validated() {
    for values in [
        ["rrsim", "-m", "0", "-p", "0.5", "-orden", "o", "-salida", "s"],
        ["rrsim", "-m", "x", "-p", "0.5", "-orden", "o", "-salida", "s"],
        ["rrsim", "-m", "2", "-p", "1.5", "-orden", "o", "-salida", "s"],
        ["rrsim", "-m", "2", "-p", "abc", "-orden", "o", "-salida", "s"],
    ] {
        assert!(Cli::try_parse_from(normalize_args(args(&values))).is_err());
    }

    let cli = Cli::try_parse_from(normalize_args(args(&[
        "rrsim", "-m", "2", "-p", "0.25", "-orden", "o", "-salida", "s",
    ])))
    .unwrap();
    assert_eq!(cli.quantum.get(), 2);
    assert_eq!(cli.probability, 0.25);
    assert_eq!(cli.processes, Path::new("procesos"));
    assert_eq!(cli.delay_ms, 1);
}

#[test]
fn header_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salida.txt");

    assert!(ensure_header(&path, 4, 0.5).unwrap());
    assert!(!ensure_header(&path, 9, 0.9).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "m=4\np=0.50\n");
}

#[test]
fn blank_output_gets_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salida.txt");
    fs::write(&path, "\n  \n").unwrap();

    assert!(ensure_header(&path, 1, 0.0).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "m=1\np=0.00\n");
}

#[test]
fn simulation_appends_to_the_output() {
    let dir = workspace();
    let cli = cli(dir.path(), &["--seed", "3"]);

    let summary = execute(&cli).unwrap();
    assert_eq!(summary.cycles, 4);
    assert_eq!(
        fs::read_to_string(&cli.output).unwrap(),
        "m=2\np=0.00\n1\tP1\tA\n2\tP1\tB\n3\tP2\tD\n3\tP2\tFinalizar\n4\tP1\tC\n4\tP1\tFinalizar\n"
    );

    execute(&cli).unwrap();
    let content = fs::read_to_string(&cli.output).unwrap();
    assert_eq!(content.matches("m=2").count(), 1);
    assert_eq!(content.matches("Finalizar").count(), 4);
}

#[test]
fn malformed_schedule_stops_before_simulating() {
    let dir = workspace();
    fs::write(dir.path().join("orden.txt"), "1|P1\n2|P2|P3\n").unwrap();
    let cli = cli(dir.path(), &[]);

    let err = execute(&cli).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<processor::Error>(),
        Some(processor::Error::Format { line: 2, .. })
    ));
    assert!(!cli.output.exists());
}

#[test]
fn missing_process_directory() {
    let dir = workspace();
    fs::remove_dir_all(dir.path().join("procesos")).unwrap();
    let cli = cli(dir.path(), &[]);

    let err = execute(&cli).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<processor::Error>(),
        Some(processor::Error::NotFound { .. })
    ));
}

#[test]
fn missing_instruction_file_aborts_the_run() {
    let dir = workspace();
    fs::write(dir.path().join("orden.txt"), "1|P1\n5|P9\n").unwrap();
    let cli = cli(dir.path(), &[]);

    assert!(execute(&cli).is_err());
    // the records before the failure stay in the trace
    let content = fs::read_to_string(&cli.output).unwrap();
    assert!(content.starts_with("m=2\np=0.00\n1\tP1\tA\n"));
}
