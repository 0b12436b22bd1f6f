use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::data::{resolve_scenario, validate_scenario, Problem, ScenarioError};
use crate::logging;
use crate::optimizer::OptimizeOptions;
use crate::parallel::rank_batch;
use crate::pipeline::{run, PlanStage};
use crate::report::{export_report_csv, render_table, PlanReport};
use crate::server;
use crate::workforce::Plan;

#[derive(Debug, Parser)]
#[command(name = "staffing")]
#[command(about = "Plan monthly training of new workers against work-hour demand")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a training plan and report feasibility and cost
    Evaluate {
        /// Scenario file (YAML or JSON); defaults to $STAFFING_SCENARIO or the published instance
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Comma-separated trainees per period; defaults to the scenario's plan, then zeros
        #[arg(short, long, value_parser = parse_plan, allow_hyphen_values = true)]
        plan: Option<Plan>,
        /// Print a tab-separated table instead of JSON
        #[arg(long)]
        table: bool,
        /// Also write the per-period rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Solve for a minimum-cost plan and verify it by replay
    Optimize {
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Only allow whole trainees
        #[arg(long)]
        integer: bool,
        #[arg(long)]
        table: bool,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Check a scenario file for errors and warnings
    Validate {
        path: Option<PathBuf>,
    },
    /// Evaluate several plans and rank them by feasibility and cost
    Rank {
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Candidate plan; repeat for each plan
        #[arg(short, long = "plan", value_parser = parse_plan, allow_hyphen_values = true, required = true)]
        plans: Vec<Plan>,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, env = server::BIND_ENV, default_value = server::DEFAULT_BIND)]
        bind: String,
    },
}

pub fn parse_plan(raw: &str) -> Result<Plan, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|err| format!("invalid plan value '{value}': {err}"))
        })
        .collect::<Result<Vec<f64>, String>>()
        .map(Plan::new)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    logging::init(cli.verbose);

    match cli.command {
        Command::Evaluate {
            scenario,
            plan,
            table,
            csv,
        } => {
            let stage = plan.map_or(PlanStage::FromScenario, PlanStage::Supplied);
            handle_report("evaluate", scenario.as_deref(), stage, table, csv.as_deref())
        }
        Command::Optimize {
            scenario,
            integer,
            table,
            csv,
        } => {
            let stage = PlanStage::Optimize(OptimizeOptions {
                integer_trainees: integer,
            });
            handle_report("optimize", scenario.as_deref(), stage, table, csv.as_deref())
        }
        Command::Validate { path } => handle_validate(path.as_deref()),
        Command::Rank { scenario, plans } => handle_rank(scenario.as_deref(), plans),
        Command::Serve { bind } => handle_serve(&bind),
    }
}

fn load_problem(path: Option<&Path>) -> Result<Problem, ScenarioError> {
    resolve_scenario(path)?.into_problem()
}

fn handle_report(
    command: &str,
    scenario: Option<&Path>,
    stage: PlanStage,
    as_table: bool,
    csv: Option<&Path>,
) -> i32 {
    let problem = match load_problem(scenario) {
        Ok(problem) => problem,
        Err(err) => {
            eprintln!("{command} failed: {err}");
            return 1;
        }
    };
    let report = match run(&problem, stage) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{command} failed: {err}");
            return 1;
        }
    };

    if let Some(path) = csv {
        if let Err(err) = export_report_csv(&report, path) {
            eprintln!("failed to write '{}': {err}", path.display());
            return 1;
        }
    }

    if as_table {
        print!("{}", render_table(&report));
    } else if let Err(code) = print_json(&report) {
        return code;
    }

    exit_code_for(&report)
}

fn exit_code_for(report: &PlanReport) -> i32 {
    if report.feasible {
        0
    } else {
        1
    }
}

fn handle_validate(path: Option<&Path>) -> i32 {
    let scenario = match resolve_scenario(path) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let label = path.map_or_else(|| scenario.name.clone(), |p| p.display().to_string());
    let report = validate_scenario(&scenario);

    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.error_count());
        for diagnostic in &report.diagnostics {
            eprintln!("- {diagnostic}");
        }
        return 1;
    }
    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    println!("validation passed: {label}");
    0
}

fn handle_rank(scenario: Option<&Path>, plans: Vec<Plan>) -> i32 {
    let problem = match load_problem(scenario) {
        Ok(problem) => problem,
        Err(err) => {
            eprintln!("rank failed: {err}");
            return 1;
        }
    };
    match rank_batch(&problem.horizon, &problem.params, plans) {
        Ok(ranking) => match print_json(&ranking) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(err) => {
            eprintln!("rank failed: {err}");
            1
        }
    }
}

fn handle_serve(bind: &str) -> i32 {
    match server::run_server(bind) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), i32> {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            Ok(())
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            Err(1)
        }
    }
}
