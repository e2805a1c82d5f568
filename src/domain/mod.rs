// ==========================================
// 生鲜物资调配模拟系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含业务规则
// ==========================================

pub mod allocation;
pub mod batch;
pub mod node;
pub mod request;
pub mod snapshot;
pub mod types;

pub use allocation::{AllocationRecord, BatchDraw};
pub use batch::Batch;
pub use node::{LocationPoint, Node};
pub use request::{Request, RequestItem};
pub use snapshot::SimulationSnapshot;
pub use types::{BatchStatus, NodeRole, RequestStatus, StrategyTag};
