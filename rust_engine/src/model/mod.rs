//! SMPL 身体网格数据

mod bounds;

pub use bounds::{facing_correction, placement_offset, Aabb};

use glam::{Mat4, Vec3};

use crate::skeleton::{NodeId, TransformTree};
use crate::{Result, SmplError};

/// 顶点骨骼权重（最多 4 个骨骼影响）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    /// 骨骼索引（对应 [`BodyMesh::bones`] 的下标）
    pub bones: [u32; 4],
    pub weights: [f32; 4],
}

impl VertexWeight {
    /// 单骨骼完全绑定
    pub fn single(bone: u32) -> Self {
        Self {
            bones: [bone, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for VertexWeight {
    fn default() -> Self {
        Self::single(0)
    }
}

/// 蒙皮身体网格
///
/// 对应渲染侧的蒙皮渲染器：顶点缓冲、骨骼节点列表与逐骨骼绑定矩阵。
/// 烘焙结果由 [`crate::skinning::bake_mesh`] 按需重新计算，不在此保存。
#[derive(Clone, Debug)]
pub struct BodyMesh {
    pub name: String,
    /// 渲染器节点，其父节点即化身根节点
    pub renderer: NodeId,
    pub bones: Vec<NodeId>,
    /// 逆绑定矩阵，与 bones 一一对应
    pub bind_poses: Vec<Mat4>,
    /// 静止姿势顶点（已应用形状混合）
    pub vertices: Vec<Vec3>,
    pub weights: Vec<VertexWeight>,
}

impl BodyMesh {
    pub fn new(
        name: impl Into<String>,
        renderer: NodeId,
        bones: Vec<NodeId>,
        bind_poses: Vec<Mat4>,
        vertices: Vec<Vec3>,
        weights: Vec<VertexWeight>,
    ) -> Self {
        Self {
            name: name.into(),
            renderer,
            bones,
            bind_poses,
            vertices,
            weights,
        }
    }

    /// 以当前骨骼姿势作为绑定姿势创建网格
    pub fn bound_to_current_pose(
        name: impl Into<String>,
        tree: &TransformTree,
        renderer: NodeId,
        bones: Vec<NodeId>,
        vertices: Vec<Vec3>,
        weights: Vec<VertexWeight>,
    ) -> Result<Self> {
        let mut mesh = Self::new(name, renderer, bones, Vec::new(), vertices, weights);
        let avatar_root = mesh.avatar_root(tree)?;
        let root_matrix = tree.local_to_world_matrix(avatar_root);
        mesh.bind_poses = mesh
            .bones
            .iter()
            .map(|&bone| tree.world_to_local_matrix(bone) * root_matrix)
            .collect();
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 化身根节点 = 渲染器的父节点
    pub fn avatar_root(&self, tree: &TransformTree) -> Result<NodeId> {
        if !tree.contains(self.renderer) {
            return Err(SmplError::NoRenderer(format!(
                "renderer node {} of mesh '{}' is not in the transform tree",
                self.renderer.0, self.name
            )));
        }
        tree.parent(self.renderer).ok_or_else(|| {
            SmplError::NoRenderer(format!("renderer of mesh '{}' has no avatar root", self.name))
        })
    }

    /// 检查网格与层级树是否一致，返回化身根节点
    pub fn validate(&self, tree: &TransformTree) -> Result<NodeId> {
        let avatar_root = self.avatar_root(tree)?;

        if self.bones.is_empty() {
            return Err(SmplError::NoMesh(format!("mesh '{}' has no bones", self.name)));
        }
        if self.bind_poses.len() != self.bones.len() {
            return Err(SmplError::NoMesh(format!(
                "mesh '{}' has {} bind poses for {} bones",
                self.name,
                self.bind_poses.len(),
                self.bones.len()
            )));
        }
        if self.weights.len() != self.vertices.len() {
            return Err(SmplError::NoMesh(format!(
                "mesh '{}' has {} weights for {} vertices",
                self.name,
                self.weights.len(),
                self.vertices.len()
            )));
        }
        if let Some(bone) = self.bones.iter().find(|&&b| !tree.contains(b)) {
            return Err(SmplError::MissingBone(format!(
                "bone node {} of mesh '{}' is not in the transform tree",
                bone.0, self.name
            )));
        }

        Ok(avatar_root)
    }
}
