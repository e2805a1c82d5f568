// ==========================================
// 生鲜物资调配模拟系统 - 输入快照
// ==========================================
// 职责: 承载数据层预取的节点/批次/请求集合
// 红线: 快照按约定不可变, 策略运行前各自克隆
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::node::Node;
use crate::domain::request::Request;
use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// SimulationSnapshot - 模拟输入快照
// ==========================================
// 过滤策略 (状态/时间窗) 是数据层职责, 核心照单全收,
// 仅在入口处做形状校验 (坐标/保质期/需求量)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub nodes: Vec<Node>,
    pub batches: Vec<Batch>,
    pub requests: Vec<Request>,
}

impl SimulationSnapshot {
    /// 入口形状校验
    ///
    /// # 规则
    /// - 所有节点坐标合法 (有限且在取值范围内)
    /// - 所有请求项 required_kg > 0
    ///
    /// 保质期非正 / 生产时间缺失不在此处拒绝:
    /// FreshnessCore 按"永不过期"处理并打标 (见 freshness.rs)
    pub fn validate(&self) -> Result<(), EngineError> {
        for node in &self.nodes {
            node.location.validate()?;
        }
        for request in &self.requests {
            for item in &request.items {
                if !item.required_kg.is_finite() || item.required_kg <= 0.0 {
                    return Err(EngineError::ValidationError(format!(
                        "请求 {} 的 {} 需求量非法: {}",
                        request.id, item.food_type, item.required_kg
                    )));
                }
            }
        }
        Ok(())
    }

    /// 从 JSON 文件加载快照 (CLI 入口使用)
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::SnapshotLoadError(format!("{}: {}", path.display(), e)))?;
        let snapshot: SimulationSnapshot = serde_json::from_str(&raw)
            .map_err(|e| EngineError::SnapshotLoadError(format!("{}: {}", path.display(), e)))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
