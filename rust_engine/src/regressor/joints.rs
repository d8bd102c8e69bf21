//! SMPL 关节定义

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// SMPL 标准骨架关节数
pub const JOINT_COUNT: usize = 24;

/// SMPL 关节（顺序即回归矩阵的行顺序）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmplJoint {
    Pelvis = 0,
    LHip,
    RHip,
    Spine1,
    LKnee,
    RKnee,
    Spine2,
    LAnkle,
    RAnkle,
    Spine3,
    LFoot,
    RFoot,
    Neck,
    LCollar,
    RCollar,
    Head,
    LShoulder,
    RShoulder,
    LElbow,
    RElbow,
    LWrist,
    RWrist,
    LHand,
    RHand,
}

impl SmplJoint {
    pub const ALL: [SmplJoint; JOINT_COUNT] = [
        SmplJoint::Pelvis,
        SmplJoint::LHip,
        SmplJoint::RHip,
        SmplJoint::Spine1,
        SmplJoint::LKnee,
        SmplJoint::RKnee,
        SmplJoint::Spine2,
        SmplJoint::LAnkle,
        SmplJoint::RAnkle,
        SmplJoint::Spine3,
        SmplJoint::LFoot,
        SmplJoint::RFoot,
        SmplJoint::Neck,
        SmplJoint::LCollar,
        SmplJoint::RCollar,
        SmplJoint::Head,
        SmplJoint::LShoulder,
        SmplJoint::RShoulder,
        SmplJoint::LElbow,
        SmplJoint::RElbow,
        SmplJoint::LWrist,
        SmplJoint::RWrist,
        SmplJoint::LHand,
        SmplJoint::RHand,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 骨骼名称（不含 "m_avg_" / "f_avg_" 前缀）
    pub fn name(self) -> &'static str {
        match self {
            SmplJoint::Pelvis => "Pelvis",
            SmplJoint::LHip => "L_Hip",
            SmplJoint::RHip => "R_Hip",
            SmplJoint::Spine1 => "Spine1",
            SmplJoint::LKnee => "L_Knee",
            SmplJoint::RKnee => "R_Knee",
            SmplJoint::Spine2 => "Spine2",
            SmplJoint::LAnkle => "L_Ankle",
            SmplJoint::RAnkle => "R_Ankle",
            SmplJoint::Spine3 => "Spine3",
            SmplJoint::LFoot => "L_Foot",
            SmplJoint::RFoot => "R_Foot",
            SmplJoint::Neck => "Neck",
            SmplJoint::LCollar => "L_Collar",
            SmplJoint::RCollar => "R_Collar",
            SmplJoint::Head => "Head",
            SmplJoint::LShoulder => "L_Shoulder",
            SmplJoint::RShoulder => "R_Shoulder",
            SmplJoint::LElbow => "L_Elbow",
            SmplJoint::RElbow => "R_Elbow",
            SmplJoint::LWrist => "L_Wrist",
            SmplJoint::RWrist => "R_Wrist",
            SmplJoint::LHand => "L_Hand",
            SmplJoint::RHand => "R_Hand",
        }
    }

    /// 通过骨骼名称查找关节（名称需已去除前缀）
    pub fn from_bone_name(name: &str) -> Option<Self> {
        BONE_NAME_TO_JOINT.get(name).copied()
    }
}

/// 骨骼名 → 关节 映射表
static BONE_NAME_TO_JOINT: Lazy<HashMap<&'static str, SmplJoint>> = Lazy::new(|| {
    SmplJoint::ALL.iter().map(|&joint| (joint.name(), joint)).collect()
});

/// 骨骼名 → 关节索引
pub fn joint_index_for_bone(name: &str) -> Option<usize> {
    SmplJoint::from_bone_name(name).map(SmplJoint::index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_table_is_complete() {
        for (i, joint) in SmplJoint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
            assert_eq!(joint_index_for_bone(joint.name()), Some(i));
        }
        assert_eq!(joint_index_for_bone("R_Hand"), Some(23));
    }

    #[test]
    fn test_unknown_bone_name() {
        assert_eq!(joint_index_for_bone("root"), None);
        assert_eq!(joint_index_for_bone("m_avg_Pelvis"), None);
        assert_eq!(SmplJoint::from_index(24), None);
    }
}
