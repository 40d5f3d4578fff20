//! 结果文件的读写
//!
//! 每行一个解，数值之间用空格分隔。写出时使用 Rust 默认的最短往返格式，读回的值与写出的值完全相同。

use crate::solution::SolutionSet;
use crate::Error;
use csv::{Writer, WriterBuilder};
use std::fs::read_to_string;
use std::path::Path;

fn writer(path: &Path) -> Result<Writer<std::fs::File>, Error> {
    Ok(WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?)
}

fn format(values: &[f64]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// 写出所有解的目标值
pub fn write_objectives(set: &SolutionSet, path: &Path) -> Result<(), Error> {
    let mut writer = writer(path)?;
    for solution in set {
        writer.write_record(format(solution.objectives()))?;
    }
    writer.flush()?;
    Ok(())
}

/// 写出所有解的决策变量
pub fn write_variables(set: &SolutionSet, path: &Path) -> Result<(), Error> {
    let mut writer = writer(path)?;
    for solution in set {
        writer.write_record(format(solution.variables()))?;
    }
    writer.flush()?;
    Ok(())
}

/// 只写出可行解的目标值
pub fn write_feasible_objectives(set: &SolutionSet, path: &Path) -> Result<(), Error> {
    let mut writer = writer(path)?;
    for solution in set.iter().filter(|s| s.is_feasible()) {
        writer.write_record(format(solution.objectives()))?;
    }
    writer.flush()?;
    Ok(())
}

/// 读取前沿文件，返回每行的目标向量；数值之间可以是任意空白，空行被忽略
pub fn read_front(path: &Path) -> Result<Vec<Vec<f64>>, Error> {
    let content = read_to_string(path)
        .map_err(|e| Error::Io(format!("无法读取 {}：{e}", path.display())))?;
    parse_front(&content)
}

pub fn parse_front(content: &str) -> Result<Vec<Vec<f64>>, Error> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            line.split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|e| {
                        Error::Parse(format!("第 {} 行的 {token:?}：{e}", number + 1))
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_and_tabs() {
        let front = parse_front("1.0 2\n\n  3e-1\t4 \n").unwrap();
        assert_eq!(front, vec![vec![1.0, 2.0], vec![0.3, 4.0]]);
    }

    #[test]
    fn malformed_number() {
        let error = parse_front("1.0 x\n").unwrap_err();
        assert!(matches!(error, Error::Parse(message) if message.contains("第 1 行")));
    }
}
