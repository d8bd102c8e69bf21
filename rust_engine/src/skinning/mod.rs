//! 顶点蒙皮与网格烘焙

mod skinning;

pub use skinning::compute_skinning;

use glam::{Mat4, Vec3};

use crate::model::{BodyMesh, VertexWeight};
use crate::skeleton::TransformTree;

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 静止姿势顶点位置
    pub positions: &'a [Vec3],
    /// 顶点权重
    pub weights: &'a [VertexWeight],
    /// 骨骼变换矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Mat4],
}

/// 计算蒙皮矩阵 = 目标空间 * 骨骼全局变换 * 逆绑定矩阵
fn skinning_matrices(tree: &TransformTree, mesh: &BodyMesh, target: Mat4) -> Vec<Mat4> {
    mesh.bones
        .iter()
        .zip(&mesh.bind_poses)
        .map(|(&bone, bind_pose)| target * tree.local_to_world_matrix(bone) * *bind_pose)
        .collect()
}

/// 烘焙网格：当前姿势下的顶点，位于渲染器本地空间
pub fn bake_mesh(tree: &TransformTree, mesh: &BodyMesh) -> Vec<Vec3> {
    let to_renderer = tree.world_to_local_matrix(mesh.renderer);
    let matrices = skinning_matrices(tree, mesh, to_renderer);
    compute_skinning(&SkinningInput {
        positions: &mesh.vertices,
        weights: &mesh.weights,
        bone_matrices: &matrices,
    })
}

/// 当前姿势下的世界空间顶点（网格对比的输入）
pub fn world_space_vertices(tree: &TransformTree, mesh: &BodyMesh) -> Vec<Vec3> {
    let matrices = skinning_matrices(tree, mesh, Mat4::IDENTITY);
    compute_skinning(&SkinningInput {
        positions: &mesh.vertices,
        weights: &mesh.weights,
        bone_matrices: &matrices,
    })
}
