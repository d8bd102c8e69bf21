//! SMPL Engine - SMPL 体型标定核心的 Rust 实现
//!
//! 提供与 Unity SMPL 标定工程等价的数值核心：
//! - 形状参数 (betas) 回归关节位置
//! - 骨骼重定位与绑定姿势 (bind pose) 重建
//! - 顶点蒙皮烘焙与落地
//! - 网格测量对比与报表输出

pub mod config;
pub mod measure;
pub mod model;
pub mod regressor;
pub mod skeleton;
pub mod skinning;

pub use config::EngineConfig;
pub use measure::{
    ComparisonResult, DataRecorder, MeasurementRecord, MeasurementSpec, MeshComparator, Participant,
    ParticipantReport,
};
pub use model::{Aabb, BodyMesh, VertexWeight};
pub use regressor::{regress, JointSet, ShapeRegressionModel, SmplJoint};
pub use skeleton::{NodeId, RebindOptions, RebindReport, SkeletonRebinder, TransformTree};
pub use skinning::{bake_mesh, world_space_vertices};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmplError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regressor model format error: {0}")]
    ModelFormat(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Shape regression model is not initialized")]
    UninitializedModel,

    #[error("No renderer: {0}")]
    NoRenderer(String),

    #[error("No mesh: {0}")]
    NoMesh(String),

    #[error("Missing bone: {0}")]
    MissingBone(String),

    #[error("Lookup failure: {0}")]
    LookupFailure(String),

    #[error("No comparison has been run yet")]
    EmptyResult,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, SmplError>;
