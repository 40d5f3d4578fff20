use crate::interfaces::{界面, 消息};
use crate::io::{write_feasible_objectives, write_objectives, write_variables};
use crate::optimizers::OptimizationResult;
use crate::ranking::Ranking;
use crate::Error;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// 命令行参数的定义
#[derive(Parser, Clone, Debug)]
#[command(name = "moea")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// 按配置文件运行一次优化，输出 FUN、VAR 和 RANK0
    Optimize {
        /// 配置文件，默认为 config.yaml
        config: Option<PathBuf>,
        /// 输出目录，默认为 output- 加上当前时间
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// 同时把消息写入输出目录下的 log.txt
        #[arg(long)]
        log_file: bool,
    },
    /// 读取前沿文件，报告每一层非支配解的个数，并打印第一层的目标值
    Rank {
        front: PathBuf,
    },
}

/// 通过命令行来使用 libmoea 的入口，实现了界面特征
pub struct CommandLine {
    pub output_dir: PathBuf,
    pub log_file: bool,
}

impl CommandLine {
    pub fn new(output_dir: Option<PathBuf>, log_file: bool) -> Result<Self, Error> {
        let output_dir = output_dir.unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{time}"))
        });
        create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            log_file,
        })
    }

    /// 写出最后一代的目标值和决策变量，以及真实评估过的解中第一层的目标值
    pub fn write_reports(&self, result: &OptimizationResult) -> Result<(), Error> {
        write_objectives(&result.population, &self.output_dir.join("FUN"))?;
        write_variables(&result.population, &self.output_dir.join("VAR"))?;
        let ranking = Ranking::new(result.real_solutions.clone())?;
        if let Some(front) = ranking.subfront(0) {
            write_feasible_objectives(front, &self.output_dir.join("RANK0"))?;
        }
        tracing::info!("结果保存在 {} 中", self.output_dir.display());
        Ok(())
    }

    fn append(&self, line: &str) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.output_dir.join("log.txt"))?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

impl 界面 for CommandLine {
    fn 发送(&self, message: 消息) {
        match &message {
            消息::TrainSetCorrected { .. } | 消息::PairSettled { .. } => {
                tracing::debug!("{message}")
            }
            _ => tracing::info!("{message}"),
        }
        if self.log_file {
            let line = format!("{} {message}", Local::now().format("%H:%M:%S%.3f"));
            if let Err(error) = self.append(&line) {
                tracing::warn!("无法写入日志：{error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_optimize() {
        let arguments =
            Arguments::try_parse_from(["moea", "optimize", "zdt1.yaml", "--log-file"]).unwrap();
        let Command::Optimize {
            config,
            output,
            log_file,
        } = arguments.command
        else {
            panic!("应当解析为 optimize");
        };
        assert_eq!(config, Some(PathBuf::from("zdt1.yaml")));
        assert_eq!(output, None);
        assert!(log_file);
    }

    #[test]
    fn log_file_collects_messages() {
        let directory = tempfile::tempdir().unwrap();
        let cli = CommandLine::new(Some(directory.path().join("run")), true).unwrap();
        cli.发送(消息::QuotaExhausted { evaluations: 7 });
        cli.发送(消息::FinalPhase { evaluations: 90 });
        let log = std::fs::read_to_string(directory.path().join("run").join("log.txt")).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.contains("第 7 次评估"));
    }
}
