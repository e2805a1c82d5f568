// ==========================================
// 生鲜物资调配模拟系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 形状错误只使单项计算失败, 不拖垮整次运行;
//       业务层面的未满足需求不是错误 (零分配记录)
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入形状错误 =====
    #[error("非法坐标: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("非法距离 (调用方错误): {0}")]
    NegativeDistance(f64),

    #[error("数据校验失败: {0}")]
    ValidationError(String),

    // ===== 库存池错误 =====
    #[error("批次未找到: batch_id={batch_id}")]
    BatchNotFound { batch_id: String },

    #[error("扣减超过剩余量 (调用方应先钳制): batch_id={batch_id}, requested={requested}, remaining={remaining}")]
    DrawExceedsRemaining {
        batch_id: String,
        requested: f64,
        remaining: f64,
    },

    // ===== 配置错误 =====
    #[error("配置非法 (field={field}): {message}")]
    InvalidConfig { field: String, message: String },

    // ===== 运行控制 =====
    #[error("对比运行被取消")]
    Cancelled,

    #[error("策略任务合流失败: {0}")]
    JoinFailure(String),

    // ===== 快照加载 =====
    #[error("快照加载失败: {0}")]
    SnapshotLoadError(String),
}
