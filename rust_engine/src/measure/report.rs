//! 对比报表格式化（CSV / TXT）与参与者批量报表

use std::fs;
use std::path::{Path, PathBuf};

use super::ComparisonResult;
use crate::config::{get_config, EngineConfig};
use crate::{Result, SmplError};

/// 报表行结束符
pub const LINE_END: &str = "\r\n";

/// 参与者 CSV 报表列名
pub const CSV_HEADER: [&str; 10] = [
    "Gender",
    "Number",
    "Mesh1",
    "Mesh2",
    "PointA",
    "PointB",
    "MeasurementName",
    "Distance1cm",
    "Distance2cm",
    "DiscrepancyCm",
];

impl ComparisonResult {
    /// 每条记录一行，`leading_columns` 放在每行最前面；距离乘以 `scale` 后保留两位小数
    pub fn to_csv(&self, leading_columns: &[&str], separator: &str, scale: f32) -> String {
        self.records
            .iter()
            .map(|r| {
                let mut columns: Vec<String> = leading_columns.iter().map(|c| c.to_string()).collect();
                columns.extend([
                    self.mesh_name_1.clone(),
                    self.mesh_name_2.clone(),
                    r.point_a.clone(),
                    r.point_b.clone(),
                    r.measurement_name.clone(),
                    format!("{:.2}", r.distance1 * scale),
                    format!("{:.2}", r.distance2 * scale),
                    format!("{:.2}", r.discrepancy * scale),
                ]);
                columns.join(separator)
            })
            .collect::<Vec<_>>()
            .join(LINE_END)
    }

    /// 对齐的可读表格；`longest_mesh_name` 决定两列距离的宽度
    pub fn to_text(&self, longest_mesh_name: usize, scale: f32) -> String {
        let max_chars = self
            .records
            .iter()
            .map(|r| r.point_a.chars().count() + r.point_b.chars().count() + r.measurement_name.chars().count())
            .max()
            .unwrap_or(0);
        let pair_width = max_chars + 8;
        // "xxx.xx" + " cm (" + 名称 + ")," + 3 个空格
        let distance_width = 6 + 5 + longest_mesh_name + 2 + 3;

        self.records
            .iter()
            .map(|r| {
                let pair = format!("{} and {} ({})", r.point_a, r.point_b, r.measurement_name);
                let first = format!("{:.2} cm ({}),", r.distance1 * scale, self.mesh_name_1);
                let second = format!("{:.2} cm ({}).", r.distance2 * scale, self.mesh_name_2);
                format!(
                    "Distance between {:>pair_width$}:\t{:<distance_width$}{:<distance_width$}Discrepancy: {:.2} cm.",
                    pair,
                    first,
                    second,
                    r.discrepancy * scale,
                )
            })
            .collect::<Vec<_>>()
            .join(LINE_END)
    }

    fn longest_mesh_name(&self) -> usize {
        self.mesh_name_1.chars().count().max(self.mesh_name_2.chars().count())
    }
}

/// 参与者标识，取自文件名：首字母为性别（m / f），其余为编号
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    /// 原始标识（文件名主干），用作输出文件名
    pub id: String,
    pub gender: String,
    pub number: String,
}

impl Participant {
    pub fn from_id(id: &str) -> Result<Self> {
        let mut chars = id.chars();
        let first = chars
            .next()
            .ok_or_else(|| SmplError::LookupFailure("participant id is empty".to_string()))?;
        Ok(Self {
            id: id.to_string(),
            gender: first.to_uppercase().collect(),
            number: chars.as_str().to_string(),
        })
    }

    /// 从输入文件路径取参与者标识（文件名去掉扩展名）
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let stem = path
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SmplError::LookupFailure(format!("no file name in {}", path.as_ref().display())))?;
        Self::from_id(stem)
    }

    pub fn gender_word(&self) -> &'static str {
        if self.gender == "F" {
            "female"
        } else {
            "male"
        }
    }
}

/// 一位参与者的全部对比结果
pub struct ParticipantReport {
    participant: Participant,
    comparisons: Vec<ComparisonResult>,
    config: EngineConfig,
}

impl ParticipantReport {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            comparisons: Vec::new(),
            config: get_config(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add(&mut self, comparison: ComparisonResult) {
        self.comparisons.push(comparison);
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn comparisons(&self) -> &[ComparisonResult] {
        &self.comparisons
    }

    fn longest_mesh_name(&self) -> usize {
        self.comparisons
            .iter()
            .map(ComparisonResult::longest_mesh_name)
            .max()
            .unwrap_or(self.config.text_mesh_name_width)
    }

    pub fn to_text(&self) -> String {
        let width = self.longest_mesh_name();
        let body = self
            .comparisons
            .iter()
            .map(|c| c.to_text(width, self.config.distance_scale))
            .collect::<Vec<_>>()
            .join("\r\n\r\n");
        format!(
            "Comparison for {} participant {}:\r\n\r\n\r\n{}{}",
            self.participant.gender_word(),
            self.participant.number,
            body,
            LINE_END
        )
    }

    pub fn to_csv(&self) -> String {
        let separator = self.config.csv_separator.as_str();
        let leading = [self.participant.gender.as_str(), self.participant.number.as_str()];
        let mut out = CSV_HEADER.join(separator);
        for comparison in &self.comparisons {
            out.push_str(LINE_END);
            out.push_str(&comparison.to_csv(&leading, separator, self.config.distance_scale));
        }
        out.push_str(LINE_END);
        out
    }

    /// 写出 `<id>.txt` 与 `<id>.csv`，返回两个文件路径
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let id = self.participant.id.as_str();
        let txt_path = dir.join(format!("{}.txt", id));
        let csv_path = dir.join(format!("{}.csv", id));
        fs::write(&txt_path, self.to_text())?;
        fs::write(&csv_path, self.to_csv())?;
        log::info!(
            "参与者 {} 报表已写出: {} 组对比 -> {}",
            id,
            self.comparisons.len(),
            dir.display()
        );
        Ok((txt_path, csv_path))
    }
}
