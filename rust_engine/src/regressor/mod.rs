//! 形状参数回归关节位置

mod blend;
mod joints;
mod model;

pub use blend::{shape_blend_weights, BlendShapeWeight};
pub use joints::{joint_index_for_bone, SmplJoint, JOINT_COUNT};
pub use model::{load_regressor, AxisRegressor, ShapeRegressionModel};

use glam::Vec3;
use nalgebra::DVector;

use crate::{Result, SmplError};

/// 回归得到的关节位置，索引与 [`SmplJoint`] 顺序一致
#[derive(Clone, Debug, PartialEq)]
pub struct JointSet {
    joints: Vec<Vec3>,
}

impl JointSet {
    pub fn new(joints: Vec<Vec3>) -> Self {
        Self { joints }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.joints.get(index).copied()
    }

    pub fn joint(&self, joint: SmplJoint) -> Option<Vec3> {
        self.get(joint.index())
    }
}

/// 由形状参数计算关节位置
///
/// 每个轴：joints = regressor · betas + template。
/// 回归矩阵来自 Maya（右手系），x 分量取负转换为引擎的左手系。
pub fn regress(model: &ShapeRegressionModel, betas: &[f32]) -> Result<JointSet> {
    if betas.len() != model.beta_count() {
        log::error!(
            "形状参数数量错误: 需要 {} 个, 实际 {} 个",
            model.beta_count(),
            betas.len()
        );
        return Err(SmplError::DimensionMismatch {
            expected: model.beta_count(),
            actual: betas.len(),
        });
    }

    let beta = DVector::from_iterator(betas.len(), betas.iter().map(|&b| b as f64));
    let [x, y, z] = [0, 1, 2].map(|a| {
        let axis = model.axis(a);
        &axis.regressor * &beta + &axis.template
    });

    let joints = (0..model.joint_count())
        .map(|i| Vec3::new(-(x[i] as f32), y[i] as f32, z[i] as f32))
        .collect();

    Ok(JointSet::new(joints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    const EPS: f32 = 1e-5;

    fn single_joint_model() -> ShapeRegressionModel {
        ShapeRegressionModel::new(
            [DVector::zeros(1), DVector::zeros(1), DVector::zeros(1)],
            [
                DMatrix::from_element(1, 1, 1.0),
                DMatrix::from_element(1, 1, 1.0),
                DMatrix::from_element(1, 1, 1.0),
            ],
        )
        .unwrap()
    }

    /// 3 个关节、2 个参数的确定性模型
    fn small_model(x_sign: f64) -> ShapeRegressionModel {
        let templates = [
            DVector::from_vec(vec![0.1, 0.2, 0.3]),
            DVector::from_vec(vec![-0.2, 0.4, 0.9]),
            DVector::from_vec(vec![0.05, 0.0, -0.05]),
        ];
        let rx = DMatrix::from_row_slice(3, 2, &[0.1, -0.3, 0.2, 0.5, -0.4, 0.7]) * x_sign;
        let ry = DMatrix::from_row_slice(3, 2, &[0.3, 0.1, -0.2, 0.6, 0.9, -0.1]);
        let rz = DMatrix::from_row_slice(3, 2, &[-0.5, 0.2, 0.1, 0.1, 0.3, 0.4]);
        ShapeRegressionModel::new(templates, [rx, ry, rz]).unwrap()
    }

    #[test]
    fn test_single_joint_example() {
        let joints = regress(&single_joint_model(), &[2.0]).unwrap();
        assert_eq!(joints.len(), 1);
        let j = joints.get(0).unwrap();
        assert!((j - Vec3::new(-2.0, 2.0, 2.0)).length() < EPS);
    }

    #[test]
    fn test_zero_betas_give_template() {
        let model = small_model(1.0);
        let joints = regress(&model, &[0.0, 0.0]).unwrap();
        assert_eq!(joints.len(), model.joint_count());
        let pelvis = joints.joint(SmplJoint::Pelvis).unwrap();
        assert!((pelvis - Vec3::new(-0.1, -0.2, 0.05)).length() < EPS);
    }

    #[test]
    fn test_regression_is_affine() {
        let model = small_model(1.0);
        let v = [0.8, -1.3];
        let zero = regress(&model, &[0.0, 0.0]).unwrap();
        let once = regress(&model, &v).unwrap();
        let twice = regress(&model, &[v[0] * 2.0, v[1] * 2.0]).unwrap();
        for i in 0..model.joint_count() {
            let lhs = twice.get(i).unwrap() - zero.get(i).unwrap();
            let rhs = (once.get(i).unwrap() - zero.get(i).unwrap()) * 2.0;
            assert!((lhs - rhs).length() < EPS);
        }
    }

    #[test]
    fn test_x_flip_is_isolated() {
        let betas = [1.5, 0.25];
        let normal = regress(&small_model(1.0), &betas).unwrap();
        let flipped = regress(&small_model(-1.0), &betas).unwrap();
        let template = regress(&small_model(1.0), &[0.0, 0.0]).unwrap();
        for i in 0..3 {
            let a = normal.get(i).unwrap();
            let b = flipped.get(i).unwrap();
            let t = template.get(i).unwrap();
            // x 方向的回归偏移取反，y/z 不变
            assert!(((a.x - t.x) + (b.x - t.x)).abs() < EPS);
            assert!((a.y - b.y).abs() < EPS);
            assert!((a.z - b.z).abs() < EPS);
        }
    }

    #[test]
    fn test_wrong_beta_count() {
        let err = regress(&small_model(1.0), &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            SmplError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }
}
