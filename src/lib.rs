// ==========================================
// 生鲜物资调配模拟系统 - 核心库
// ==========================================
// 系统定位: 分配策略对比的模拟核心
// 边界: 持久化/HTTP/报表渲染由外围系统承担,
//       核心只消费预取快照, 产出对比报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 策略参数
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchStatus, NodeRole, RequestStatus, StrategyTag};

// 领域实体
pub use domain::{
    AllocationRecord, Batch, BatchDraw, LocationPoint, Node, Request, RequestItem,
    SimulationSnapshot,
};

// 引擎
pub use engine::{
    ComparisonEngine, ComparisonReport, DemandForecastProvider, EngineError, FreshnessCore,
    GeoIndex, ImprovementReport, InventoryPool, NoOpForecastProvider, PredictiveAllocator,
    RegularAllocator, StrategyMetrics, StrategyRunOutcome, TransportEstimator,
};

// 配置
pub use config::PredictiveConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生鲜物资调配模拟系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
