// ==========================================
// 生鲜物资调配模拟系统 - 库存池
// ==========================================
// 职责: 单次策略运行的批次工作副本 (arena + 句柄)
// 红线: 池由所属策略运行独占; 深拷贝构造,
//       运行内的扣减绝不回写快照或影响另一策略
// 说明: 池不感知时间; FIFO / 最鲜优先等排序策略
//       由分配器提供, 不在池内实现
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::BatchStatus;
use crate::engine::error::EngineError;
use std::collections::HashMap;

// ==========================================
// InventoryPool - 库存池
// ==========================================
#[derive(Debug, Clone)]
pub struct InventoryPool {
    /// 批次 arena (快照克隆)
    batches: Vec<Batch>,
    /// batch_id → arena 下标
    by_id: HashMap<String, usize>,
    /// (node_id, food_type) → arena 下标列表 (保持输入顺序)
    by_location: HashMap<(String, String), Vec<usize>>,
}

impl InventoryPool {
    /// 从快照批次构造工作副本
    ///
    /// batch_id 唯一性由数据层保证; 出现重复时 draw 以末条为准
    pub fn from_snapshot(snapshot_batches: &[Batch]) -> Self {
        let mut batches: Vec<Batch> = Vec::with_capacity(snapshot_batches.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut by_location: HashMap<(String, String), Vec<usize>> = HashMap::new();

        for batch in snapshot_batches {
            let index = batches.len();
            batches.push(batch.clone());
            by_id.insert(batch.id.clone(), index);
            by_location
                .entry((batch.current_node_id.clone(), batch.food_type.clone()))
                .or_default()
                .push(index);
        }

        Self { batches, by_id, by_location }
    }

    /// 节点上指定食品类型的候选批次 (未排序)
    ///
    /// 过滤: status=Stored 且剩余量 > 0
    pub fn candidates(&self, food_type: &str, node_id: &str) -> Vec<&Batch> {
        let key = (node_id.to_string(), food_type.to_string());
        match self.by_location.get(&key) {
            Some(indices) => indices
                .iter()
                .map(|&i| &self.batches[i])
                .filter(|b| b.status == BatchStatus::Stored && b.quantity_kg > 0.0)
                .collect(),
            None => Vec::new(),
        }
    }

    /// 扣减批次剩余量
    ///
    /// # 错误
    /// - `BatchNotFound`: 未知批次
    /// - `DrawExceedsRemaining`: 超量扣减 (调用方应先钳制)
    ///
    /// 归零批次不从 arena 移除, 仅在 candidates 中消失
    pub fn draw(&mut self, batch_id: &str, quantity_kg: f64) -> Result<(), EngineError> {
        let index = *self.by_id.get(batch_id).ok_or_else(|| EngineError::BatchNotFound {
            batch_id: batch_id.to_string(),
        })?;
        let batch = &mut self.batches[index];

        if quantity_kg > batch.quantity_kg + 1e-9 {
            return Err(EngineError::DrawExceedsRemaining {
                batch_id: batch_id.to_string(),
                requested: quantity_kg,
                remaining: batch.quantity_kg,
            });
        }
        batch.quantity_kg = (batch.quantity_kg - quantity_kg).max(0.0);
        Ok(())
    }

    /// 批次当前剩余量 (守恒检查/测试用)
    pub fn remaining(&self, batch_id: &str) -> Option<f64> {
        self.by_id.get(batch_id).map(|&i| self.batches[i].quantity_kg)
    }
}
