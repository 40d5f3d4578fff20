//! moea: 代理模型辅助的多目标进化优化［命令行版］
//!
//! `moea optimize` 读取配置文件运行一次 NSGA-II，`moea rank` 读取前沿文件并报告非支配分层的结果。

use clap::Parser;
use itertools::Itertools;
use moea::config::Config;
use moea::evaluators::{DirectEvaluator, SurrogateEvaluator};
use moea::interfaces::command_line::{Arguments, Command, CommandLine};
use moea::io::read_front;
use moea::optimizers::{Nsga2, OptimizationResult, Optimizer};
use moea::problems::from_config;
use moea::ranking::Ranking;
use moea::solution::{Solution, SolutionSet};
use moea::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn optimize(config: Config, cli: &CommandLine) -> Result<OptimizationResult, Error> {
    let problem = from_config(&config.problem)?;
    let nsga2 = Nsga2::new(&config.algorithm, &config.operators);
    tracing::info!(
        "问题 {}，{} 个变量，种群 {}，评估预算 {}",
        problem_name(&config),
        config.problem.variables.map_or("默认".to_string(), |n| n.to_string()),
        config.algorithm.population_size,
        config.algorithm.max_evaluations
    );
    match &config.surrogate {
        Some(surrogate) => {
            let mut evaluator =
                SurrogateEvaluator::new(problem, surrogate, config.algorithm.max_evaluations, cli)?;
            nsga2.optimize(&mut evaluator, cli)
        }
        None => {
            let mut evaluator = DirectEvaluator::new(problem);
            nsga2.optimize(&mut evaluator, cli)
        }
    }
}

fn problem_name(config: &Config) -> String {
    config
        .info
        .name
        .clone()
        .unwrap_or_else(|| config.problem.name.clone())
}

fn rank(front: PathBuf) -> Result<(), Error> {
    let set: SolutionSet = read_front(&front)?
        .into_iter()
        .map(|objectives| Solution::with_objectives(vec![], objectives))
        .collect();
    let ranking = Ranking::new(set)?;
    for (index, front) in ranking.fronts().iter().enumerate() {
        println!("第 {index} 层：{} 个解", front.len());
    }
    if let Some(first) = ranking.subfront(0) {
        for solution in first {
            println!("{}", solution.objectives().iter().join(" "));
        }
    }
    Ok(())
}

fn run(arguments: Arguments) -> Result<(), Error> {
    match arguments.command {
        Command::Optimize {
            config,
            output,
            log_file,
        } => {
            let path = config.unwrap_or(PathBuf::from("config.yaml"));
            let config = Config::from_path(&path)?;
            let cli = CommandLine::new(output, log_file)?;
            let result = optimize(config, &cli)?;
            cli.write_reports(&result)
        }
        Command::Rank { front } => rank(front),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let arguments = Arguments::parse();
    match run(arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
