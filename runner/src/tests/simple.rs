use core::module_path;
use function_name::named;

use super::{run, simulate};

#[test]
#[named]
pub fn single_burst() {
    let output = simulate(5, 0.0, "1|P1\n", &[("P1", "ADD\nSUB\nMUL\n")]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn preempted_alone() {
    let output = simulate(2, 0.0, "1|P1\n", &[("P1", "I1\nI2\nI3\nI4\n")]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn late_arrival() {
    let output = simulate(
        3,
        0.0,
        "# orden\n3|P1\n",
        &[("P1", "# P1\nLOAD\n\nSTORE\n")],
    );

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}
