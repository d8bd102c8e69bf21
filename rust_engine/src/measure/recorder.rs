//! 实验数据记录器：按固定列追加写入文本文件

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::report::LINE_END;
use crate::{Result, SmplError};

/// 列宽下限
const MIN_COLUMN_WIDTH: usize = 8;
/// 每列末尾额外空格数
const COLUMN_PADDING: usize = 5;

/// 数据记录器
///
/// 创建时写入表头；之后每次 [`DataRecorder::record`] 追加一行。
/// 列之间用制表符分隔，或按统一列宽补齐空格。
#[derive(Debug)]
pub struct DataRecorder {
    path: PathBuf,
    columns: usize,
    column_width: usize,
    separate_with_tabs: bool,
}

impl DataRecorder {
    /// 创建记录文件并写入表头（已存在则覆盖）
    pub fn create<P: AsRef<Path>>(path: P, headers: &[&str], separate_with_tabs: bool) -> Result<Self> {
        if headers.is_empty() {
            return Err(SmplError::DimensionMismatch { expected: 1, actual: 0 });
        }
        let longest = headers.iter().map(|h| h.chars().count()).max().unwrap_or(0);
        let recorder = Self {
            path: path.as_ref().to_path_buf(),
            columns: headers.len(),
            column_width: longest.max(MIN_COLUMN_WIDTH) + COLUMN_PADDING,
            separate_with_tabs,
        };
        let mut file = File::create(&recorder.path)?;
        file.write_all(recorder.format_line(headers).as_bytes())?;
        log::debug!("数据记录器已创建: {} ({} 列)", recorder.path.display(), recorder.columns);
        Ok(recorder)
    }

    /// 追加一行，列数必须与表头一致
    pub fn record(&self, values: &[&str]) -> Result<()> {
        if values.len() != self.columns {
            log::warn!("记录列数 {} 与表头列数 {} 不一致", values.len(), self.columns);
            return Err(SmplError::DimensionMismatch {
                expected: self.columns,
                actual: values.len(),
            });
        }
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        file.write_all(self.format_line(values).as_bytes())?;
        Ok(())
    }

    /// 格式化一行（含行结束符）
    pub fn format_line(&self, values: &[&str]) -> String {
        let mut line = if self.separate_with_tabs {
            values.join("\t")
        } else {
            values
                .iter()
                .map(|v| format!("{:<width$}", v, width = self.column_width))
                .collect()
        };
        line.push_str(LINE_END);
        line
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn column_width(&self) -> usize {
        self.column_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("smpl_recorder_{}_{}.txt", std::process::id(), name))
    }

    #[test]
    fn test_padded_columns() {
        let path = temp_path("padded");
        let recorder = DataRecorder::create(&path, &["Id", "Measurement"], false).unwrap();
        // 最长表头 11 > 8，再加 5
        assert_eq!(recorder.column_width(), 16);
        recorder.record(&["1", "Height"]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.split("\r\n").collect();
        assert_eq!(lines[0], format!("{:<16}{:<16}", "Id", "Measurement"));
        assert_eq!(lines[1], format!("{:<16}{:<16}", "1", "Height"));
        assert_eq!(lines[2], "");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_short_headers_use_minimum_width() {
        let path = temp_path("short");
        let recorder = DataRecorder::create(&path, &["a", "b"], false).unwrap();
        assert_eq!(recorder.column_width(), 13);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_tab_separated() {
        let path = temp_path("tabs");
        let recorder = DataRecorder::create(&path, &["Id", "Value"], true).unwrap();
        recorder.record(&["3", "0.25"]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Id\tValue\r\n3\t0.25\r\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_wrong_column_count() {
        let path = temp_path("mismatch");
        let recorder = DataRecorder::create(&path, &["Id", "Value"], true).unwrap();
        let err = recorder.record(&["1"]).unwrap_err();
        assert!(matches!(err, SmplError::DimensionMismatch { expected: 2, actual: 1 }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Id\tValue\r\n");
        let _ = fs::remove_file(&path);
    }
}
