// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use graymc_runner::{main, run, GateChoice, RunOptions};
use graymc_synthesis::{DecomposerConfig, StandardGate};

fn run_to_string(options: &RunOptions) -> Result<String, String> {
    let mut output = Vec::new();
    run(options, &mut output)?;
    String::from_utf8(output).map_err(|e| e.to_string())
}

fn options(controls: usize, targets: usize) -> RunOptions {
    RunOptions {
        controls,
        targets,
        ..RunOptions::default()
    }
}

fn record<'a>(output: &'a str, tag: &str) -> Vec<&'a str> {
    output
        .lines()
        .filter(|line| line.split('\t').next() == Some(tag))
        .collect()
}

#[test]
fn two_control_listing() -> Result<(), String> {
    let output = run_to_string(&options(2, 1))?;
    assert_eq!(
        output,
        "STRATEGY\ttwo-control\n\
         ROOT\t2\n\
         CV\tq1\tq2\n\
         CX\tq0\tq1\n\
         CVdg\tq1\tq2\n\
         CX\tq0\tq1\n\
         CV\tq0\tq2\n\
         COUNTS\t2\t3\n\
         END\n"
    );
    Ok(())
}

#[test]
fn single_control_listing() -> Result<(), String> {
    let output = run_to_string(&RunOptions {
        gate: GateChoice::Standard(StandardGate::H),
        ..options(1, 2)
    })?;
    assert_eq!(
        output,
        "STRATEGY\tsingle-control\nROOT\t1\nCV\tq0\tq1\nCV\tq0\tq2\nCOUNTS\t0\t2\nEND\n"
    );
    Ok(())
}

#[test]
fn gray_code_counts() -> Result<(), String> {
    for (controls, targets) in [(3, 1), (4, 2), (5, 3)] {
        let output = run_to_string(&options(controls, targets))?;
        let toggles = (1 << controls) - 2;
        let roots = ((1 << controls) - 1) * targets;
        assert_eq!(record(&output, "STRATEGY"), vec!["STRATEGY\tgray-code"]);
        assert_eq!(
            record(&output, "COUNTS"),
            vec![format!("COUNTS\t{toggles}\t{roots}").as_str()]
        );
        assert_eq!(record(&output, "CX").len(), toggles);
        assert_eq!(
            record(&output, "CV").len() + record(&output, "CVdg").len(),
            roots
        );
        assert_eq!(output.lines().last(), Some("END"));
    }
    Ok(())
}

#[test]
fn verify_random_gate() -> Result<(), String> {
    for controls in 1..=4 {
        let output = run_to_string(&RunOptions {
            gate: GateChoice::Random,
            seed: Some(42),
            verify: true,
            ..options(controls, 2)
        })?;
        let deviation = record(&output, "DEVIATION");
        assert_eq!(deviation.len(), 1);
        let value: f64 = deviation[0]
            .split('\t')
            .nth(1)
            .and_then(|v| v.parse().ok())
            .ok_or("Malformed DEVIATION record")?;
        assert!(value < 1e-9, "controls = {controls}, deviation = {value}");
        assert_eq!(record(&output, "REFERENCE"), vec!["REFERENCE\tmatch"]);
    }
    Ok(())
}

#[test]
fn verify_skips_large_registers() -> Result<(), String> {
    let output = run_to_string(&RunOptions {
        verify: true,
        ..options(14, 1)
    })?;
    assert_eq!(record(&output, "VERIFY"), vec!["VERIFY\tskipped"]);
    assert!(record(&output, "DEVIATION").is_empty());
    Ok(())
}

#[test]
fn truth_table_for_x() -> Result<(), String> {
    let output = run_to_string(&RunOptions {
        truth_table: true,
        ..options(3, 2)
    })?;
    let rows = record(&output, "TRUTH");
    assert_eq!(rows.len(), 8);
    for row in rows {
        let fields: Vec<&str> = row.split('\t').collect();
        let expected = if fields[1] == "111" {
            "1.000000,1.000000"
        } else {
            "0.000000,0.000000"
        };
        assert_eq!(fields[2], expected, "row {row}");
        assert_eq!(fields[3], "restored");
    }
    Ok(())
}

#[test]
fn ancilla_mode_reports_requirements() -> Result<(), String> {
    let output = run_to_string(&RunOptions {
        mode: Some("basic".to_owned()),
        ancillas: 6,
        ..options(5, 1)
    })?;
    assert_eq!(output, "MODE\tv-chain\t5\t3\nEND\n");
    Ok(())
}

#[test]
fn noancilla_mode_synthesizes() -> Result<(), String> {
    let with_mode = run_to_string(&RunOptions {
        mode: Some("noancilla".to_owned()),
        ..options(4, 1)
    })?;
    assert_eq!(with_mode, run_to_string(&options(4, 1))?);
    Ok(())
}

#[test]
fn noancilla_mode_honors_tolerance() {
    let result = run_to_string(&RunOptions {
        mode: Some("noancilla".to_owned()),
        config: DecomposerConfig::default().with_root_tolerance(0.0),
        ..options(3, 1)
    });
    assert_eq!(
        result,
        Err("invalid configuration: root_tolerance must be a finite positive number, got 0".to_owned())
    );
}

#[test]
fn unknown_mode_is_an_error() {
    let result = run_to_string(&RunOptions {
        mode: Some("ladder".to_owned()),
        ..options(3, 1)
    });
    assert_eq!(
        result,
        Err("invalid configuration: Unsupported mode 'ladder', choose one of: noancilla, recursion, v-chain, v-chain-dirty, advanced, basic, basic-dirty-ancilla.".to_owned())
    );
}

#[test]
fn insufficient_ancillas_is_an_error() {
    let result = run_to_string(&RunOptions {
        mode: Some("v-chain-dirty".to_owned()),
        ancillas: 1,
        ..options(5, 1)
    });
    assert_eq!(
        result,
        Err("invalid configuration: Mode 'v-chain-dirty' with 5 controls requires 3 ancilla qubits, but 1 were supplied.".to_owned())
    );
}

#[test]
fn zero_controls_is_an_error() {
    let result = run_to_string(&options(0, 1));
    assert_eq!(
        result,
        Err(
            "invalid input: A multi-controlled gate requires at least one control qubit."
                .to_owned()
        )
    );
}

#[test]
fn too_many_controls_is_an_error() {
    assert_eq!(
        run_to_string(&options(21, 1)),
        Err("At most 20 controls are supported, got 21.".to_owned())
    );
}

#[test]
fn non_finite_gate_is_an_error() -> Result<(), String> {
    let result = run_to_string(&RunOptions {
        gate: "rz(nan)".parse::<GateChoice>()?,
        ..options(3, 1)
    });
    assert_eq!(
        result,
        Err("invalid input: The base gate has a non-finite entry.".to_owned())
    );
    Ok(())
}

#[test]
fn main_reports_argument_errors() {
    assert!(main(Some(["graymc", "--controls", "two"])).is_err());
    assert!(main(Some(["graymc", "--help"])).is_ok());
}
