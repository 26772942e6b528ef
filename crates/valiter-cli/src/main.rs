// valiter CLI
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info, warn};
use valiter_core::{
    MarkovDecisionProcess, Solution, SolutionSnapshot, SolverConfig, ValueIteration,
    validate_model,
};
use valiter_mdp::{MdpSimulator, PatientTriage, TriageParams, compile_yaml};

#[derive(Parser)]
#[command(name = "valiter")]
#[command(version)]
#[command(about = "Value iteration and greedy policies for finite MDPs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides it
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the patient-triage instance
    Triage {
        /// Number of patients processed in one day
        #[arg(long)]
        patients: Option<u32>,

        /// Longest hospital stay in hours
        #[arg(long)]
        max_hospital_hours: Option<u32>,

        /// YAML file with triage parameters
        #[arg(long, value_name = "PARAMS")]
        params: Option<PathBuf>,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Solve an MDP declared in YAML
    Solve {
        /// Input model file
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// Roll the policy out this many times and report the mean return
        #[arg(long, value_name = "EPISODES")]
        evaluate: Option<usize>,

        /// Random seed for policy rollouts
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Step limit per rollout
        #[arg(long, default_value = "1000")]
        max_steps: usize,

        #[command(flatten)]
        solver: SolverArgs,
    },
}

#[derive(Args)]
struct SolverArgs {
    /// Solver YAML config; flags below override it
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Discount factor in [0, 1]
    #[arg(long)]
    gamma: Option<f64>,

    /// Convergence tolerance
    #[arg(long)]
    epsilon: Option<f64>,

    /// Give up after this many sweeps
    #[arg(long)]
    max_sweeps: Option<usize>,

    /// Compute sweeps on all cores
    #[arg(long)]
    parallel: bool,

    /// Check the model's probabilities before solving
    #[arg(long)]
    validate: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
    Json,
}

impl SolverArgs {
    fn solver_config(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_yaml_path(path)
                .with_context(|| format!("failed to load solver config {}", path.display()))?,
            None => SolverConfig::default(),
        };

        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(max_sweeps) = self.max_sweeps {
            config.max_sweeps = max_sweeps;
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Triage {
            patients,
            max_hospital_hours,
            params,
            solver,
        } => {
            let mut triage_params = match params {
                Some(path) => TriageParams::from_yaml_path(&path)
                    .with_context(|| format!("failed to load triage params {}", path.display()))?,
                None => TriageParams::default(),
            };
            if let Some(patients) = patients {
                triage_params.patients = patients;
            }
            if let Some(hours) = max_hospital_hours {
                triage_params.max_hospital_hours = hours;
            }

            let mdp = PatientTriage::new(triage_params)?;
            let (config, solution) = solve(&mdp, &solver)?;
            let output = render(
                &solution,
                &config,
                solver.format,
                |state| state.to_string(),
                |action| action.to_string(),
            )?;
            print!("{output}");
        }

        Commands::Solve {
            model,
            evaluate,
            seed,
            max_steps,
            solver,
        } => {
            let compiled = compile_yaml(&model)
                .with_context(|| format!("failed to compile model {}", model.display()))?;
            let (config, solution) = solve(&compiled, &solver)?;
            let output = render(
                &solution,
                &config,
                solver.format,
                |key| compiled.state_id(*key).unwrap_or("?").to_string(),
                |action| action.clone(),
            )?;
            print!("{output}");

            if let Some(episodes) = evaluate {
                let mut simulator = MdpSimulator::new(compiled.clone(), seed);
                let evaluation =
                    simulator.evaluate_policy(&solution.policy, episodes, max_steps, config.gamma)?;
                eprintln!(
                    "mean return over {} episodes: {:.6} ({} truncated)",
                    evaluation.episodes, evaluation.mean_return, evaluation.truncated
                );
            }
        }
    }

    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn solve<M>(mdp: &M, args: &SolverArgs) -> Result<(SolverConfig, Solution<M::State, M::Action>)>
where
    M: MarkovDecisionProcess,
{
    let config = args.solver_config()?;
    if args.validate {
        validate_model(mdp).context("model failed validation")?;
        info!("model passed validation");
    }

    let solver = ValueIteration::new(config.clone())?;
    let solution = solver.solve_policy(mdp)?;
    if solution.is_approximate() {
        warn!(
            "policy is approximate: no convergence within {} sweeps",
            solution.report.sweeps
        );
    }

    Ok((config, solution))
}

fn render<S, A, FState, FAction>(
    solution: &Solution<S, A>,
    config: &SolverConfig,
    format: OutputFormat,
    mut state_label: FState,
    mut action_label: FAction,
) -> Result<String>
where
    S: Ord,
    FState: FnMut(&S) -> String,
    FAction: FnMut(&A) -> String,
{
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if solution.is_approximate() {
                writeln!(
                    out,
                    "# approximate: stopped after {} sweeps with delta {:e}",
                    solution.report.sweeps, solution.report.final_delta
                )?;
            }
            for (state, action) in solution.policy.iter() {
                let action = action.map_or_else(|| "-".to_string(), &mut action_label);
                writeln!(out, "{}\t{}", state_label(state), action)?;
            }
            Ok(out)
        }
        OutputFormat::Yaml => Ok(SolutionSnapshot::from_solution(
            solution,
            config,
            state_label,
            action_label,
        )
        .to_yaml()?),
        OutputFormat::Json => {
            let mut json =
                SolutionSnapshot::from_solution(solution, config, state_label, action_label)
                    .to_json()?;
            json.push('\n');
            Ok(json)
        }
    }
}
