// ==========================================
// 生鲜物资调配模拟系统 - 基线分配引擎
// ==========================================
// 职责: 最近仓库 + 先进先出的贪心基线
// 红线: 基线刻意不做任何过期/新鲜度检查 ——
//       它代表朴素系统, 过期批次照常分配, 不得"修复"
// 红线: 请求与请求项严格按输入顺序处理 (顺序决定
//       稀缺库存归属, 复现性依赖顺序保持)
// ==========================================

use crate::domain::allocation::{AllocationRecord, BatchDraw};
use crate::domain::node::Node;
use crate::domain::request::Request;
use crate::domain::snapshot::SimulationSnapshot;
use crate::domain::types::StrategyTag;
use crate::engine::error::EngineError;
use crate::engine::freshness::FreshnessCore;
use crate::engine::geo::GeoIndex;
use crate::engine::pool::InventoryPool;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument, warn};

// ==========================================
// RegularAllocator - 基线分配引擎
// ==========================================
pub struct RegularAllocator {
    // 无状态引擎, 不需要注入依赖
}

impl RegularAllocator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 对整个快照执行基线分配
    ///
    /// 每次运行自建独立库存池副本, 不触碰快照。
    /// `cancel` 在请求之间协作式检查 (运行内无外部副作用可回滚)。
    ///
    /// # 返回
    /// 按 请求 × 请求项 输入顺序排列的分配记录
    #[instrument(skip(self, snapshot, cancel), fields(
        requests_count = snapshot.requests.len(),
        batches_count = snapshot.batches.len()
    ))]
    pub fn run(
        &self,
        snapshot: &SimulationSnapshot,
        dispatch_time: DateTime<Utc>,
        cancel: &AtomicBool,
    ) -> Result<Vec<AllocationRecord>, EngineError> {
        let mut pool = InventoryPool::from_snapshot(&snapshot.batches);
        let warehouses: Vec<Node> = snapshot
            .nodes
            .iter()
            .filter(|n| n.is_warehouse())
            .cloned()
            .collect();
        let nodes_by_id: HashMap<&str, &Node> =
            snapshot.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut records = Vec::new();
        for request in &snapshot.requests {
            if cancel.load(Ordering::Relaxed) {
                return Err(EngineError::Cancelled);
            }
            self.allocate_request(
                request,
                &nodes_by_id,
                &warehouses,
                &mut pool,
                dispatch_time,
                &mut records,
            )?;
        }

        debug!(records_count = records.len(), "基线分配完成");
        Ok(records)
    }

    /// 处理单个请求 (逐项)
    fn allocate_request(
        &self,
        request: &Request,
        nodes_by_id: &HashMap<&str, &Node>,
        warehouses: &[Node],
        pool: &mut InventoryPool,
        dispatch_time: DateTime<Utc>,
        records: &mut Vec<AllocationRecord>,
    ) -> Result<(), EngineError> {
        // 请求方节点无法解析 → 整个请求静默丢弃 (既定语义, 有测试钉住)
        let requester = match nodes_by_id.get(request.requester_node_id.as_str()) {
            Some(node) => *node,
            None => {
                warn!(
                    request_id = %request.id,
                    requester_node_id = %request.requester_node_id,
                    "请求方节点未找到, 丢弃整个请求"
                );
                return Ok(());
            }
        };

        for item in &request.items {
            // 全仓库线性扫描, 并列取先出现者
            let nearest = GeoIndex::nearest(&requester.location, warehouses);

            let (source_warehouse_id, distance_km, draws) = match nearest {
                Some(ranked) => {
                    let draws = self.draw_fifo(
                        pool,
                        &item.food_type,
                        &ranked.node.id,
                        item.required_kg,
                        dispatch_time,
                    )?;
                    (Some(ranked.node.id.clone()), Some(ranked.distance_km), draws)
                }
                None => (None, None, Vec::new()),
            };

            let allocated_kg: f64 = draws.iter().map(|d| d.quantity_kg).sum();
            records.push(AllocationRecord {
                request_id: request.id.clone(),
                food_type: item.food_type.clone(),
                required_kg: item.required_kg,
                allocated_kg,
                source_warehouse_id,
                distance_km,
                dispatch_time,
                draws,
                strategy: StrategyTag::Regular,
                score: None,
            });
        }
        Ok(())
    }

    /// 先进先出扣减: 按生产时间升序贪心取料
    ///
    /// 生产时间缺失的批次视作最旧 (排最前);
    /// 不做任何新鲜度门槛 —— 过期批次同样出库
    fn draw_fifo(
        &self,
        pool: &mut InventoryPool,
        food_type: &str,
        warehouse_id: &str,
        required_kg: f64,
        dispatch_time: DateTime<Utc>,
    ) -> Result<Vec<BatchDraw>, EngineError> {
        // 先物化候选 (id, 生产时间, 剩余量, 发货新鲜度), 再逐个扣减
        let mut candidates: Vec<(String, DateTime<Utc>, f64, f64)> = pool
            .candidates(food_type, warehouse_id)
            .iter()
            .map(|b| {
                (
                    b.id.clone(),
                    b.manufacture_time.unwrap_or(DateTime::<Utc>::MIN_UTC),
                    b.quantity_kg,
                    FreshnessCore::freshness_pct_default(b, dispatch_time).pct,
                )
            })
            .collect();
        candidates.sort_by_key(|(_, manufacture, _, _)| *manufacture);

        let mut remaining = required_kg;
        let mut draws = Vec::new();
        for (batch_id, _, available_kg, freshness_pct) in candidates {
            if remaining <= 0.0 {
                break;
            }
            let take = remaining.min(available_kg);
            pool.draw(&batch_id, take)?;
            draws.push(BatchDraw {
                batch_id,
                quantity_kg: take,
                freshness_at_dispatch_pct: freshness_pct,
            });
            remaining -= take;
        }
        Ok(draws)
    }
}

impl Default for RegularAllocator {
    fn default() -> Self {
        Self::new()
    }
}
