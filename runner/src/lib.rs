// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]

mod cli;
pub use cli::main;

use graymc_sparse_sim::execute::{matches_reference, truth_table, MAX_TRUTH_TABLE_CONTROLS};
use graymc_synthesis::{
    equivalence::{deviation, MAX_DENSE_QUBITS},
    linalg::haar_random_unitary,
    select_mcx, Decomposer, DecomposerConfig, Decomposition, Instruction, McxMode, Qubit,
    StandardGate, MAX_CONTROLS,
};
use ndarray::Array2;
use num_complex::Complex64;
use rand::{rngs::StdRng, SeedableRng};
use std::{io::Write, str::FromStr};

/// The base gate of a run: a named gate or a Haar-random unitary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateChoice {
    Standard(StandardGate),
    Random,
}

impl FromStr for GateChoice {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.trim().eq_ignore_ascii_case("random") {
            Ok(GateChoice::Random)
        } else {
            name.parse()
                .map(GateChoice::Standard)
                .map_err(|e| e.to_string())
        }
    }
}

impl GateChoice {
    fn matrix(self, seed: Option<u64>) -> Array2<Complex64> {
        match self {
            GateChoice::Standard(gate) => gate.matrix(),
            GateChoice::Random => {
                let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
                haar_random_unitary(&mut rng, 2)
            }
        }
    }
}

/// Everything a single invocation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub controls: usize,
    pub targets: usize,
    pub gate: GateChoice,
    pub mode: Option<String>,
    pub ancillas: usize,
    pub seed: Option<u64>,
    pub verify: bool,
    pub truth_table: bool,
    pub config: DecomposerConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            controls: 1,
            targets: 1,
            gate: GateChoice::Standard(StandardGate::X),
            mode: None,
            ancillas: 0,
            seed: None,
            verify: false,
            truth_table: false,
            config: DecomposerConfig::default(),
        }
    }
}

fn qubit_range(start: usize, count: usize) -> Result<Vec<Qubit>, String> {
    (start..start + count)
        .map(|id| {
            u32::try_from(id)
                .map(Qubit)
                .map_err(|_| format!("Qubit id {id} is out of range."))
        })
        .collect()
}

fn write_line(output_writer: &mut impl Write, line: &str) -> Result<(), String> {
    writeln!(output_writer, "{line}").map_err(|e| e.to_string())
}

/// Synthesizes the gate described by `options` and writes the result as tab separated records:
/// `STRATEGY`, `ROOT`, one line per instruction, `COUNTS`, then the optional `DEVIATION` and
/// `REFERENCE` records (or `VERIFY skipped` for registers too large to expand), the optional
/// `TRUTH` records, and finally `END`. With a mode other than `noancilla` only
/// the `MODE` record of the selected construction is written before `END`.
/// # Errors
///
/// Will return `Err` if
/// - the qubit counts, gate or mode are invalid,
/// - the decomposition fails,
/// - a truth table is requested for more controls than the simulator check enumerates,
/// - writing to `output_writer` fails.
pub fn run(options: &RunOptions, output_writer: &mut impl Write) -> Result<(), String> {
    if options.controls > MAX_CONTROLS {
        return Err(format!(
            "At most {MAX_CONTROLS} controls are supported, got {}.",
            options.controls
        ));
    }
    let controls = qubit_range(0, options.controls)?;
    let targets = qubit_range(options.controls, options.targets)?;

    let u = match &options.mode {
        Some(_) => StandardGate::X.matrix(),
        None => options.gate.matrix(options.seed),
    };
    let decomposition = match &options.mode {
        Some(mode) => {
            let ancillas = qubit_range(options.controls + options.targets, options.ancillas)?;
            let gate = select_mcx(mode, options.controls, &ancillas).map_err(|e| e.to_string())?;
            if gate.mode() != McxMode::NoAncilla {
                write_line(
                    output_writer,
                    &format!(
                        "MODE\t{}\t{}\t{}",
                        gate.mode(),
                        gate.num_controls(),
                        gate.ancillas().len()
                    ),
                )?;
                return write_line(output_writer, "END");
            }
            if options.gate != GateChoice::Standard(StandardGate::X) || targets.len() != 1 {
                return Err("Mode selection synthesizes a single-target X gate only.".to_owned());
            }
            gate.decompose(&Decomposer::new(options.config), &controls, targets[0])
                .map_err(|e| e.to_string())?
        }
        None => Decomposer::new(options.config)
            .decompose(&u, &controls, &targets)
            .map_err(|e| e.to_string())?,
    };
    write_decomposition(&decomposition, output_writer)?;

    if options.verify {
        if controls.len() + targets.len() <= MAX_DENSE_QUBITS {
            let error = deviation(&decomposition, &u).map_err(|e| e.to_string())?;
            write_line(output_writer, &format!("DEVIATION\t{error:e}"))?;
            let verdict = if matches_reference(&decomposition, &u) {
                "match"
            } else {
                "mismatch"
            };
            write_line(output_writer, &format!("REFERENCE\t{verdict}"))?;
        } else {
            tracing::warn!(
                qubits = controls.len() + targets.len(),
                limit = MAX_DENSE_QUBITS,
                "register too large to verify"
            );
            write_line(output_writer, "VERIFY\tskipped")?;
        }
    }

    if options.truth_table {
        if controls.len() > MAX_TRUTH_TABLE_CONTROLS {
            return Err(format!(
                "Truth tables are limited to {MAX_TRUTH_TABLE_CONTROLS} controls, got {}.",
                controls.len()
            ));
        }
        for row in truth_table(&decomposition) {
            let probabilities = row
                .target_probabilities
                .iter()
                .map(|p| format!("{p:.6}"))
                .collect::<Vec<_>>()
                .join(",");
            write_line(
                output_writer,
                &format!(
                    "TRUTH\t{:0width$b}\t{probabilities}\t{}",
                    row.assignment,
                    if row.controls_restored {
                        "restored"
                    } else {
                        "altered"
                    },
                    width = controls.len()
                ),
            )?;
        }
    }

    write_line(output_writer, "END")
}

fn write_decomposition(
    decomposition: &Decomposition,
    output_writer: &mut impl Write,
) -> Result<(), String> {
    write_line(
        output_writer,
        &format!("STRATEGY\t{}", decomposition.strategy()),
    )?;
    write_line(
        output_writer,
        &format!("ROOT\t{}", decomposition.root().degree()),
    )?;
    for instruction in decomposition.instructions() {
        let line = match instruction {
            Instruction::Cx { control, target } => format!("CX\t{control}\t{target}"),
            Instruction::ControlledUnitary {
                control,
                target,
                variant,
                ..
            } => format!("C{variant}\t{control}\t{target}"),
        };
        write_line(output_writer, &line)?;
    }
    write_line(
        output_writer,
        &format!(
            "COUNTS\t{}\t{}",
            decomposition.toggle_count(),
            decomposition.root_count()
        ),
    )
}
