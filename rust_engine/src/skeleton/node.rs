//! 变换节点

use glam::{Mat4, Quat, Vec3};

/// 节点句柄（在 [`super::TransformTree`] 中的稳定索引）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 变换节点（骨骼、渲染器、化身根节点都用它表示）
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub name: String,
    /// 父节点索引，父节点总是先于子节点加入，因此不会成环
    pub parent: Option<NodeId>,

    // 相对于父节点的变换
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
}

impl TransformNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
        }
    }

    /// 本地变换矩阵 = T * R * S
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.local_scale, self.local_rotation, self.local_position)
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new(String::new())
    }
}
