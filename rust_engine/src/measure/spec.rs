//! 测量点与测量距离定义
//!
//! 两种文本输入：
//! - 顶点文件：每行 `名称 = 顶点编号`（编号从 1 开始）
//! - 距离文件：每行 `起点名称, 终点名称, 测量名称`
//!
//! 以 `#` 开头的行为注释，空行忽略。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{Result, SmplError};

/// 一项两点距离测量
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMeasurement {
    pub point_a: String,
    pub point_b: String,
    pub name: String,
}

impl DistanceMeasurement {
    pub fn new(point_a: impl Into<String>, point_b: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            point_a: point_a.into(),
            point_b: point_b.into(),
            name: name.into(),
        }
    }
}

/// 测量定义：测量点名 → 顶点索引（内部从 0 开始），以及待测距离列表
#[derive(Clone, Debug, Default)]
pub struct MeasurementSpec {
    vertices: HashMap<String, usize>,
    distances: Vec<DistanceMeasurement>,
}

impl MeasurementSpec {
    /// `vertex_numbers` 中的编号从 1 开始
    pub fn new(vertex_numbers: HashMap<String, usize>, distances: Vec<DistanceMeasurement>) -> Result<Self> {
        let mut vertices = HashMap::with_capacity(vertex_numbers.len());
        for (name, number) in vertex_numbers {
            let index = number.checked_sub(1).ok_or_else(|| {
                SmplError::LookupFailure(format!("vertex number of '{}' must start at 1", name))
            })?;
            vertices.insert(name, index);
        }
        Ok(Self { vertices, distances })
    }

    /// 从文本解析
    pub fn parse(vertex_text: &str, distance_text: &str) -> Result<Self> {
        Self::new(
            parse_vertex_numbers(vertex_text)?,
            parse_distance_measurements(distance_text)?,
        )
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(vertex_path: P, distance_path: Q) -> Result<Self> {
        let vertex_text = fs::read_to_string(vertex_path)?;
        let distance_text = fs::read_to_string(distance_path)?;
        let spec = Self::parse(&vertex_text, &distance_text)?;
        log::info!(
            "测量定义加载完成: {} 个测量点, {} 项距离",
            spec.point_count(),
            spec.distances.len()
        );
        Ok(spec)
    }

    /// 测量点名 → 顶点索引（从 0 开始）
    pub fn vertex_index(&self, name: &str) -> Result<usize> {
        self.vertices
            .get(name)
            .copied()
            .ok_or_else(|| SmplError::LookupFailure(format!("measurement point '{}' is not defined", name)))
    }

    pub fn distances(&self) -> &[DistanceMeasurement] {
        &self.distances
    }

    pub fn point_count(&self) -> usize {
        self.vertices.len()
    }
}

/// 跳过注释与空行，返回 (行号, 内容)
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// 解析顶点文件，编号保持从 1 开始
pub fn parse_vertex_numbers(text: &str) -> Result<HashMap<String, usize>> {
    let mut numbers = HashMap::new();
    for (line_no, line) in content_lines(text) {
        let (name, number) = line.split_once('=').ok_or_else(|| SmplError::Parse {
            line: line_no,
            message: format!("expected 'Name = Number', got '{}'", line),
        })?;
        let name = name.trim();
        let number: usize = number.trim().parse().map_err(|_| SmplError::Parse {
            line: line_no,
            message: format!("invalid vertex number '{}'", number.trim()),
        })?;
        if number == 0 {
            return Err(SmplError::Parse {
                line: line_no,
                message: format!("vertex number of '{}' must start at 1", name),
            });
        }
        if numbers.insert(name.to_string(), number).is_some() {
            return Err(SmplError::Parse {
                line: line_no,
                message: format!("duplicate measurement point '{}'", name),
            });
        }
    }
    Ok(numbers)
}

/// 解析距离文件
pub fn parse_distance_measurements(text: &str) -> Result<Vec<DistanceMeasurement>> {
    content_lines(text)
        .map(|(line_no, line)| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 3 {
                return Err(SmplError::Parse {
                    line: line_no,
                    message: format!("expected 'NameA, NameB, MeasurementName', got '{}'", line),
                });
            }
            Ok(DistanceMeasurement::new(parts[0], parts[1], parts[2]))
        })
        .collect()
}
