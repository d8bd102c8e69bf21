//! 关节回归模型加载

use std::fs;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::{Result, SmplError};

/// 回归 JSON 文档（template_J: J×3，betasJ_regr: J×3×B）
#[derive(Debug, Deserialize)]
struct RegressorDocument {
    #[serde(rename = "template_J")]
    template_j: Vec<Vec<f64>>,
    #[serde(rename = "betasJ_regr")]
    betas_j_regr: Vec<Vec<Vec<f64>>>,
}

/// 单轴回归数据
#[derive(Clone, Debug)]
pub struct AxisRegressor {
    /// 模板关节坐标列向量（J×1）
    pub template: DVector<f64>,
    /// 形状参数回归矩阵（J×B）
    pub regressor: DMatrix<f64>,
}

/// 形状参数 → 关节位置 回归模型（加载后不可变）
#[derive(Clone, Debug)]
pub struct ShapeRegressionModel {
    axes: [AxisRegressor; 3],
    joint_count: usize,
    beta_count: usize,
}

impl ShapeRegressionModel {
    /// 从三个轴的模板与回归矩阵构建，维度必须一致
    pub fn new(templates: [DVector<f64>; 3], regressors: [DMatrix<f64>; 3]) -> Result<Self> {
        let joint_count = templates[0].len();
        let beta_count = regressors[0].ncols();
        if joint_count == 0 {
            return Err(SmplError::ModelFormat("template has no joints".to_string()));
        }

        for axis in 0..3 {
            if templates[axis].len() != joint_count {
                return Err(SmplError::ModelFormat(format!(
                    "axis {} template has {} joints, expected {}",
                    axis,
                    templates[axis].len(),
                    joint_count
                )));
            }
            let (rows, cols) = regressors[axis].shape();
            if rows != joint_count || cols != beta_count {
                return Err(SmplError::ModelFormat(format!(
                    "axis {} regressor is {}x{}, expected {}x{}",
                    axis, rows, cols, joint_count, beta_count
                )));
            }
        }

        let [tx, ty, tz] = templates;
        let [rx, ry, rz] = regressors;
        Ok(Self {
            axes: [
                AxisRegressor { template: tx, regressor: rx },
                AxisRegressor { template: ty, regressor: ry },
                AxisRegressor { template: tz, regressor: rz },
            ],
            joint_count,
            beta_count,
        })
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// 解析回归 JSON
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: RegressorDocument = serde_json::from_str(text)?;

        let joint_count = doc.template_j.len();
        if doc.betas_j_regr.len() != joint_count {
            return Err(SmplError::ModelFormat(format!(
                "betasJ_regr has {} joints but template_J has {}",
                doc.betas_j_regr.len(),
                joint_count
            )));
        }

        for (i, row) in doc.template_j.iter().enumerate() {
            if row.len() != 3 {
                return Err(SmplError::ModelFormat(format!(
                    "template_J[{}] has {} components, expected 3",
                    i,
                    row.len()
                )));
            }
        }

        let beta_count = doc
            .betas_j_regr
            .first()
            .and_then(|axes| axes.first())
            .map(Vec::len)
            .unwrap_or(0);

        for (i, axes) in doc.betas_j_regr.iter().enumerate() {
            if axes.len() != 3 {
                return Err(SmplError::ModelFormat(format!(
                    "betasJ_regr[{}] has {} axes, expected 3",
                    i,
                    axes.len()
                )));
            }
            if let Some(axis) = axes.iter().position(|row| row.len() != beta_count) {
                return Err(SmplError::ModelFormat(format!(
                    "betasJ_regr[{}][{}] has {} betas, expected {}",
                    i,
                    axis,
                    axes[axis].len(),
                    beta_count
                )));
            }
        }

        let templates = [0, 1, 2].map(|axis| {
            DVector::from_iterator(joint_count, doc.template_j.iter().map(|row| row[axis]))
        });
        let regressors = [0, 1, 2].map(|axis| {
            DMatrix::from_fn(joint_count, beta_count, |i, j| doc.betas_j_regr[i][axis][j])
        });

        Self::new(templates, regressors)
    }

    /// 校验维度与期望一致
    pub fn require_dimensions(&self, joint_count: usize, beta_count: usize) -> Result<()> {
        if self.joint_count != joint_count {
            return Err(SmplError::ModelFormat(format!(
                "model has {} joints, expected {}",
                self.joint_count, joint_count
            )));
        }
        if self.beta_count != beta_count {
            return Err(SmplError::ModelFormat(format!(
                "model has {} betas, expected {}",
                self.beta_count, beta_count
            )));
        }
        Ok(())
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn beta_count(&self) -> usize {
        self.beta_count
    }

    /// 获取单轴数据（0 = x, 1 = y, 2 = z）
    pub fn axis(&self, axis: usize) -> &AxisRegressor {
        &self.axes[axis]
    }
}

/// 加载回归模型并按配置校验维度
pub fn load_regressor<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<ShapeRegressionModel> {
    let model = ShapeRegressionModel::load(path)?;
    model.require_dimensions(config.joint_count, config.beta_count)?;
    log::info!(
        "关节回归模型加载完成: {} 个关节, {} 个形状参数",
        model.joint_count(),
        model.beta_count()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_JOINTS: &str = r#"{
        "template_J": [[0.0, 0.1, 0.2], [1.0, 1.1, 1.2]],
        "betasJ_regr": [
            [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            [[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]
        ]
    }"#;

    #[test]
    fn test_parse_json() {
        let model = ShapeRegressionModel::from_json_str(TWO_JOINTS).unwrap();
        assert_eq!(model.joint_count(), 2);
        assert_eq!(model.beta_count(), 2);
        assert!((model.axis(1).template[1] - 1.1).abs() < 1e-12);
        assert!((model.axis(2).regressor[(1, 0)] - 11.0).abs() < 1e-12);
        assert!((model.axis(0).regressor[(0, 1)] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_require_dimensions() {
        let model = ShapeRegressionModel::from_json_str(TWO_JOINTS).unwrap();
        assert!(model.require_dimensions(2, 2).is_ok());
        assert!(matches!(model.require_dimensions(24, 10), Err(SmplError::ModelFormat(_))));
    }

    #[test]
    fn test_ragged_betas_rejected() {
        let text = r#"{
            "template_J": [[0.0, 0.0, 0.0]],
            "betasJ_regr": [[[1.0, 2.0], [3.0], [5.0, 6.0]]]
        }"#;
        assert!(matches!(
            ShapeRegressionModel::from_json_str(text),
            Err(SmplError::ModelFormat(_))
        ));
    }

    #[test]
    fn test_joint_count_mismatch_rejected() {
        let text = r#"{
            "template_J": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            "betasJ_regr": [[[1.0], [3.0], [5.0]]]
        }"#;
        assert!(matches!(
            ShapeRegressionModel::from_json_str(text),
            Err(SmplError::ModelFormat(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ShapeRegressionModel::from_json_str("{ not json"),
            Err(SmplError::Json(_))
        ));
    }

    #[test]
    fn test_new_checks_matrix_shape() {
        let templates = [DVector::zeros(2), DVector::zeros(2), DVector::zeros(2)];
        let regressors = [DMatrix::zeros(2, 3), DMatrix::zeros(2, 3), DMatrix::zeros(3, 3)];
        assert!(ShapeRegressionModel::new(templates, regressors).is_err());
    }

    fn smpl_sized_json(joints: usize, betas: usize) -> String {
        serde_json::json!({
            "template_J": vec![vec![0.0; 3]; joints],
            "betasJ_regr": vec![vec![vec![0.01; betas]; 3]; joints],
        })
        .to_string()
    }

    #[test]
    fn test_load_regressor_checks_configured_size() {
        let dir = std::env::temp_dir().join(format!("smpl_regressor_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let config = EngineConfig::default();

        let full = dir.join("joints_regressor.json");
        fs::write(&full, smpl_sized_json(24, 10)).unwrap();
        let model = load_regressor(&full, &config).unwrap();
        assert_eq!(model.joint_count(), 24);
        assert_eq!(model.beta_count(), 10);

        let short = dir.join("short.json");
        fs::write(&short, smpl_sized_json(24, 8)).unwrap();
        assert!(matches!(load_regressor(&short, &config), Err(SmplError::ModelFormat(_))));

        assert!(matches!(
            load_regressor(dir.join("missing.json"), &config),
            Err(SmplError::Io(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
