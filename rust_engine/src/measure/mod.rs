//! 网格测量对比
//!
//! - `spec`: 测量点 / 距离定义及其文本解析
//! - `comparator`: 两个网格之间的距离对比
//! - `report`: CSV / TXT 报表与参与者批量报表
//! - `recorder`: 实验数据记录

mod comparator;
mod recorder;
mod report;
mod spec;

pub use comparator::{compare, ComparisonResult, MeasurementRecord, MeshComparator};
pub use recorder::DataRecorder;
pub use report::{Participant, ParticipantReport, CSV_HEADER, LINE_END};
pub use spec::{parse_distance_measurements, parse_vertex_numbers, DistanceMeasurement, MeasurementSpec};
