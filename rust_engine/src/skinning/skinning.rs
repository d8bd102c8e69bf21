//! 顶点蒙皮计算

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::SkinningInput;
use crate::model::VertexWeight;

/// 计算蒙皮（并行）
pub fn compute_skinning(input: &SkinningInput) -> Vec<Vec3> {
    input
        .positions
        .par_iter()
        .zip(input.weights.par_iter())
        .map(|(&position, weight)| compute_single_vertex(position, weight, input.bone_matrices))
        .collect()
}

/// 计算单个顶点的蒙皮
fn compute_single_vertex(position: Vec3, weight: &VertexWeight, matrices: &[Mat4]) -> Vec3 {
    let mut pos = Vec3::ZERO;
    for i in 0..4 {
        let w = weight.weights[i];
        if w == 0.0 {
            continue;
        }
        let m = get_matrix(matrices, weight.bones[i]);
        pos += m.transform_point3(position) * w;
    }
    pos
}

fn get_matrix(matrices: &[Mat4], index: u32) -> Mat4 {
    matrices.get(index as usize).copied().unwrap_or(Mat4::IDENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_two_bones() {
        let matrices = [
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        ];
        let weight = VertexWeight {
            bones: [0, 1, 0, 0],
            weights: [0.5, 0.5, 0.0, 0.0],
        };
        let input = SkinningInput {
            positions: &[Vec3::ZERO],
            weights: &[weight],
            bone_matrices: &matrices,
        };
        let out = compute_skinning(&input);
        assert!((out[0] - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_out_of_range_bone_uses_identity() {
        let out = compute_single_vertex(Vec3::ONE, &VertexWeight::single(7), &[]);
        assert_eq!(out, Vec3::ONE);
    }
}
