// ==========================================
// 生鲜物资调配模拟系统 - 引擎层
// ==========================================
// 职责: 分配模拟的全部业务规则
// 红线: 引擎不做持久化/查询, 只消费预取快照;
//       数据单向流动: 快照 → 分配器 → 记录 → 对比报告
// ==========================================

pub mod comparison;
pub mod error;
pub mod forecast;
pub mod freshness;
pub mod geo;
pub mod pool;
pub mod predictive;
pub mod regular;
pub mod transport;

// 重导出核心引擎
pub use comparison::{
    ComparisonEngine, ComparisonReport, ImprovementReport, StrategyMetrics, StrategyRunOutcome,
};
pub use error::EngineError;
pub use forecast::{
    DemandForecastProvider, ForecastRequest, ForecastResponse, NoOpForecastProvider,
    WarehouseSummary,
};
pub use freshness::{FreshnessCore, FreshnessEval};
pub use geo::{GeoIndex, RankedCandidate};
pub use pool::InventoryPool;
pub use predictive::PredictiveAllocator;
pub use regular::RegularAllocator;
pub use transport::TransportEstimator;
