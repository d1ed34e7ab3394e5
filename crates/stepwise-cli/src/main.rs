use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use stepwise_solver::{Problem, ProblemRecord, Solution, SolutionRecord, Solver, Step};

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "Exact simplex solver that shows its work", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the result
    Solve {
        /// JSON problem record
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Print every intermediate tableau
        #[arg(short, long)]
        steps: bool,
    },
    /// Check a problem file for errors without solving it
    Check {
        /// JSON problem record
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { file, format, steps } => {
            let problem = load(&file);

            let solver = Solver::new().with_trace(steps || format == Format::Json);
            let solution = match solver.solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };
            log::debug!("{} steps recorded", solution.steps.len());

            match format {
                Format::Json => match serde_json::to_string_pretty(&SolutionRecord::from(&solution)) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error writing JSON: {}", e);
                        std::process::exit(1);
                    }
                },
                Format::Pretty => print_report(&solution, steps),
            }
        }
        Commands::Check { file } => {
            let problem = load(&file);

            match problem.validate() {
                Ok(()) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} decision variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                    println!("  {} goals", problem.goals.len());
                    if let Some(method) = problem.method {
                        println!("  artificial variables: {:?}", method);
                    }
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Read and convert a problem record, exiting on failure
fn load(file: &Path) -> Problem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    let record: ProblemRecord = match serde_json::from_str(&source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    };

    match Problem::try_from(record) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid problem: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(solution: &Solution, steps: bool) {
    if steps {
        for step in &solution.steps {
            print_step(step);
            println!();
        }
    }

    println!("Status: {}", solution.status);
    if let Some(report) = solution.goals() {
        for level in &report.levels {
            let mark = if level.satisfied { "✓" } else { "✗" };
            println!("  {} P{} deviation {}", mark, level.priority, level.deviation);
        }
    }
    println!("{}", solution.summary());
}

fn print_step(step: &Step) {
    println!("{}", step.comment());

    let mut header = vec![String::new()];
    header.extend(step.variable_names());
    header.push("RHS".to_string());

    let rows: Vec<Vec<String>> = step
        .row_labels()
        .into_iter()
        .zip(step.grid())
        .map(|(label, cells)| std::iter::once(label).chain(cells).collect())
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|c| {
            std::iter::once(&header)
                .chain(&rows)
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect();
        println!("  {}", line.join("  "));
    }
    println!("  basis: {}", step.basis_names().join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve_arguments() {
        let cli = Cli::try_parse_from(["stepwise", "solve", "problem.json", "--format", "json", "--steps"]).unwrap();
        match cli.command {
            Commands::Solve { file, format, steps } => {
                assert_eq!(file, PathBuf::from("problem.json"));
                assert!(format == Format::Json);
                assert!(steps);
            }
            Commands::Check { .. } => panic!("expected solve"),
        }

        assert!(Cli::try_parse_from(["stepwise", "solve", "problem.json", "--format", "xml"]).is_err());
    }
}
