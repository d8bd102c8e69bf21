//! 变换层级树

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use super::{NodeId, TransformNode};
use crate::{Result, SmplError};

/// 变换层级树
///
/// 节点按索引寻址，父子关系只存父索引。
/// 全局变换每次从根递推计算，不做缓存，因此任何局部修改立即对子节点生效。
pub struct TransformTree {
    nodes: Vec<TransformNode>,
    name_to_index: HashMap<String, usize>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// 添加节点，父节点必须已存在
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local_position: Vec3,
        local_rotation: Quat,
    ) -> Result<NodeId> {
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(SmplError::LookupFailure(format!("parent node {} does not exist", p.0)));
            }
        }

        let mut node = TransformNode::new(name);
        node.parent = parent;
        node.local_position = local_position;
        node.local_rotation = local_rotation;

        let index = self.nodes.len();
        // 同名节点只记录第一个
        self.name_to_index.entry(node.name.clone()).or_insert(index);
        self.nodes.push(node);
        Ok(NodeId(index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// 通过名称查找节点
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_to_index.get(name).copied().map(NodeId)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TransformNode> {
        self.nodes.get(id.0)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TransformNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// 层级深度（根节点为 0）
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// 按层级深度排序（父节点在前），同深度保持原顺序
    pub fn sort_by_depth(&self, ids: &mut [NodeId]) {
        ids.sort_by_key(|&id| self.depth(id));
    }

    /// 本地 → 世界 矩阵
    pub fn local_to_world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.nodes.get(id.0) else {
            return Mat4::IDENTITY;
        };
        match node.parent {
            Some(p) => self.local_to_world_matrix(p) * node.local_matrix(),
            None => node.local_matrix(),
        }
    }

    /// 世界 → 本地 矩阵
    pub fn world_to_local_matrix(&self, id: NodeId) -> Mat4 {
        self.local_to_world_matrix(id).inverse()
    }

    /// 将节点本地坐标系中的点变换到世界空间
    pub fn transform_point(&self, id: NodeId, point: Vec3) -> Vec3 {
        self.local_to_world_matrix(id).transform_point3(point)
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.local_to_world_matrix(id).w_axis.truncate()
    }

    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let Some(node) = self.nodes.get(id.0) else {
            return Quat::IDENTITY;
        };
        match node.parent {
            Some(p) => (self.world_rotation(p) * node.local_rotation).normalize(),
            None => node.local_rotation,
        }
    }

    /// 设置世界坐标（反推本地坐标，子节点随之移动）
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) {
        if !self.contains(id) {
            return;
        }
        let parent_matrix = self
            .parent(id)
            .map(|p| self.local_to_world_matrix(p))
            .unwrap_or(Mat4::IDENTITY);
        self.nodes[id.0].local_position = parent_matrix.inverse().transform_point3(position);
    }

    /// 设置世界旋转
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) {
        if !self.contains(id) {
            return;
        }
        let parent_rotation = self
            .parent(id)
            .map(|p| self.world_rotation(p))
            .unwrap_or(Quat::IDENTITY);
        self.nodes[id.0].local_rotation = (parent_rotation.inverse() * rotation).normalize();
    }

    /// 在世界空间中平移节点
    pub fn translate_world(&mut self, id: NodeId, offset: Vec3) {
        let position = self.world_position(id);
        self.set_world_position(id, position + offset);
    }
}

impl Default for TransformTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_world_transform_follows_parent() {
        let mut tree = TransformTree::new();
        let root = tree
            .add_node("root", None, Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
            .unwrap();
        let child = tree.add_node("child", Some(root), Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY).unwrap();

        // 绕 y 轴 90°：(1,0,0) → (0,0,-1)
        let p = tree.world_position(child);
        assert!((p - Vec3::new(1.0, 0.0, -1.0)).length() < EPS);
        assert_eq!(tree.depth(child), 1);
        assert_eq!(tree.find_node_by_name("child"), Some(child));
    }

    #[test]
    fn test_set_world_position_moves_children() {
        let mut tree = TransformTree::new();
        let root = tree.add_node("root", None, Vec3::ZERO, Quat::from_rotation_z(0.3)).unwrap();
        let a = tree.add_node("a", Some(root), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY).unwrap();
        let b = tree.add_node("b", Some(a), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY).unwrap();

        let before = tree.world_position(b) - tree.world_position(a);
        tree.set_world_position(a, Vec3::new(3.0, 2.0, 1.0));
        assert!((tree.world_position(a) - Vec3::new(3.0, 2.0, 1.0)).length() < EPS);
        let after = tree.world_position(b) - tree.world_position(a);
        assert!((before - after).length() < EPS);
    }

    #[test]
    fn test_set_world_rotation() {
        let mut tree = TransformTree::new();
        let root = tree.add_node("root", None, Vec3::ZERO, Quat::from_rotation_x(0.7)).unwrap();
        let a = tree.add_node("a", Some(root), Vec3::ONE, Quat::IDENTITY).unwrap();
        let target = Quat::from_rotation_y(1.1);
        tree.set_world_rotation(a, target);
        assert!(tree.world_rotation(a).angle_between(target) < 1e-4);
    }

    #[test]
    fn test_invalid_parent() {
        let mut tree = TransformTree::new();
        assert!(tree.add_node("orphan", Some(NodeId(3)), Vec3::ZERO, Quat::IDENTITY).is_err());
    }

    #[test]
    fn test_sort_by_depth() {
        let mut tree = TransformTree::new();
        let root = tree.add_node("root", None, Vec3::ZERO, Quat::IDENTITY).unwrap();
        let a = tree.add_node("a", Some(root), Vec3::ZERO, Quat::IDENTITY).unwrap();
        let b = tree.add_node("b", Some(a), Vec3::ZERO, Quat::IDENTITY).unwrap();
        let mut ids = vec![b, a, root];
        tree.sort_by_depth(&mut ids);
        assert_eq!(ids, vec![root, a, b]);
    }
}
