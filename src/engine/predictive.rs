// ==========================================
// 生鲜物资调配模拟系统 - 预测分配引擎
// ==========================================
// 职责: Top-K 候选搜索 + 新鲜度双档门槛 + 综合评分
// 红线: 运输存活检查用"发货时刻剩余保质期", 不是新鲜度百分比
// 红线: 无合格仓库 → 零分配记录 (一等结果, 不是错误)
// 说明: 运行级预测降级由上层 (ComparisonEngine) 处理,
//       本引擎只消费已解析好的优先仓库列表
// ==========================================

use crate::config::PredictiveConfig;
use crate::domain::allocation::{AllocationRecord, BatchDraw};
use crate::domain::node::Node;
use crate::domain::request::{Request, RequestItem};
use crate::domain::snapshot::SimulationSnapshot;
use crate::domain::types::StrategyTag;
use crate::engine::error::EngineError;
use crate::engine::freshness::FreshnessCore;
use crate::engine::geo::GeoIndex;
use crate::engine::pool::InventoryPool;
use crate::engine::transport::TransportEstimator;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument, warn};

// ==========================================
// 候选评估中间结构
// ==========================================

/// 合格批次 (已通过存活检查与新鲜度档位过滤)
#[derive(Debug, Clone)]
struct EligibleBatch {
    batch_id: String,
    available_kg: f64,
    freshness_at_delivery_pct: f64,
    freshness_at_dispatch_pct: f64,
}

/// 档位: 严格优先于宽松
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EligibilityTier {
    Strict,
    Relaxed,
}

/// 单仓库评估结果
#[derive(Debug, Clone)]
struct WarehouseEvaluation {
    warehouse_id: String,
    distance_km: f64,
    tier: EligibilityTier,
    /// 所在档位的合格批次集
    eligible: Vec<EligibleBatch>,
    /// 档位内最优送达新鲜度 (评分用)
    best_freshness_pct: f64,
}

// ==========================================
// PredictiveAllocator - 预测分配引擎
// ==========================================
pub struct PredictiveAllocator {
    config: PredictiveConfig,
}

impl PredictiveAllocator {
    /// 构造函数 (配置在此校验, 畸形配置是唯一报错入口)
    pub fn new(config: PredictiveConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 对整个快照执行预测分配
    ///
    /// `priority_warehouse_ids`: 上层预测步骤解析出的优先仓库
    /// (预测失败时上层直接走基线, 不会进入本方法)
    ///
    /// # 返回
    /// 按 请求 × 请求项 输入顺序排列的分配记录
    #[instrument(skip(self, snapshot, cancel), fields(
        requests_count = snapshot.requests.len(),
        batches_count = snapshot.batches.len(),
        priority_count = priority_warehouse_ids.len()
    ))]
    pub fn run(
        &self,
        snapshot: &SimulationSnapshot,
        dispatch_time: DateTime<Utc>,
        priority_warehouse_ids: &[String],
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

            // 与基线相同的静默丢弃语义 (既定行为, 不在此"修复")
            let requester = match nodes_by_id.get(request.requester_node_id.as_str()) {
                Some(node) => *node,
                None => {
                    warn!(
                        request_id = %request.id,
                        requester_node_id = %request.requester_node_id,
                        "请求方节点未找到, 丢弃整个请求"
                    );
                    continue;
                }
            };

            for item in &request.items {
                let record = self.allocate_item(
                    request,
                    item,
                    requester,
                    &warehouses,
                    priority_warehouse_ids,
                    &mut pool,
                    dispatch_time,
                )?;
                records.push(record);
            }
        }

        debug!(records_count = records.len(), "预测分配完成");
        Ok(records)
    }

    /// 单项分配: 候选搜索 → 档位过滤 → 评分选仓 → 最鲜优先扣减
    #[allow(clippy::too_many_arguments)]
    fn allocate_item(
        &self,
        request: &Request,
        item: &RequestItem,
        requester: &Node,
        warehouses: &[Node],
        priority_warehouse_ids: &[String],
        pool: &mut InventoryPool,
        dispatch_time: DateTime<Utc>,
    ) -> Result<AllocationRecord, EngineError> {
        let ranked = GeoIndex::rank_by_distance(
            &requester.location,
            warehouses,
            self.config.hard_max_distance_km,
            self.config.top_k_warehouses,
        );
        // 零分配记录仍回填最近候选距离, 供报表区分"无仓可用"与"有仓无货"
        let nearest_distance = ranked.first().map(|c| c.distance_km);

        let mut evaluations: Vec<WarehouseEvaluation> = Vec::new();
        for candidate in &ranked {
            if let Some(eval) = self.evaluate_warehouse(
                &item.food_type,
                candidate.node,
                candidate.distance_km,
                pool,
                dispatch_time,
            )? {
                evaluations.push(eval);
            }
        }

        let chosen = self.pick_best(&evaluations, priority_warehouse_ids);
        let (source_warehouse_id, distance_km, draws, score) = match chosen {
            Some((eval, score)) => {
                let draws =
                    self.draw_freshest_first(pool, &eval.eligible, item.required_kg)?;
                (
                    Some(eval.warehouse_id.clone()),
                    Some(eval.distance_km),
                    draws,
                    Some(score),
                )
            }
            None => (None, nearest_distance, Vec::new(), None),
        };

        let allocated_kg: f64 = draws.iter().map(|d| d.quantity_kg).sum();
        Ok(AllocationRecord {
            request_id: request.id.clone(),
            food_type: item.food_type.clone(),
            required_kg: item.required_kg,
            allocated_kg,
            source_warehouse_id,
            distance_km,
            dispatch_time,
            draws,
            strategy: StrategyTag::Predictive,
            score,
        })
    }

    /// 评估单个候选仓库
    ///
    /// # 规则 (逐批次)
    /// 1. 存活检查: 发货时刻剩余保质期 > 行驶时长 + 余量缓冲
    ///    (无法界定到期的批次视为永不过期, 恒通过)
    /// 2. 送达新鲜度 >= 严格档 → strict 集; >= 宽松档 → relaxed 集
    /// 3. strict 非空取严格档; 否则 relaxed 非空取宽松档; 否则不候选
    fn evaluate_warehouse(
        &self,
        food_type: &str,
        warehouse: &Node,
        distance_km: f64,
        pool: &InventoryPool,
        dispatch_time: DateTime<Utc>,
    ) -> Result<Option<WarehouseEvaluation>, EngineError> {
        let travel_hours = TransportEstimator::travel_hours(distance_km)?;
        let delivery_time = TransportEstimator::delivery_time(dispatch_time, travel_hours);
        let min_remaining_hours = travel_hours + self.config.min_remaining_buffer_hours;

        let mut strict: Vec<EligibleBatch> = Vec::new();
        let mut relaxed: Vec<EligibleBatch> = Vec::new();
        for batch in pool.candidates(food_type, &warehouse.id) {
            let survives = match batch.remaining_shelf_life_hours(dispatch_time) {
                Some(remaining) => remaining > min_remaining_hours,
                None => true, // 无界批次 (坏数据已由 FreshnessCore 打标)
            };
            if !survives {
                continue;
            }

            let at_delivery = FreshnessCore::freshness_pct_default(batch, delivery_time).pct;
            if at_delivery < self.config.relaxed_min_delivered_freshness_pct {
                continue;
            }
            let eligible = EligibleBatch {
                batch_id: batch.id.clone(),
                available_kg: batch.quantity_kg,
                freshness_at_delivery_pct: at_delivery,
                freshness_at_dispatch_pct: FreshnessCore::freshness_pct_default(
                    batch,
                    dispatch_time,
                )
                .pct,
            };
            if at_delivery >= self.config.preferred_min_delivered_freshness_pct {
                strict.push(eligible);
            } else {
                relaxed.push(eligible);
            }
        }

        let (tier, eligible) = if !strict.is_empty() {
            (EligibilityTier::Strict, strict)
        } else if !relaxed.is_empty() {
            (EligibilityTier::Relaxed, relaxed)
        } else {
            return Ok(None);
        };

        let best_freshness_pct = eligible
            .iter()
            .map(|b| b.freshness_at_delivery_pct)
            .fold(f64::MIN, f64::max);

        Ok(Some(WarehouseEvaluation {
            warehouse_id: warehouse.id.clone(),
            distance_km,
            tier,
            eligible,
            best_freshness_pct,
        }))
    }

    /// 选仓: 严格档优先, 档内按综合得分取最大
    ///
    /// score = freshness_weight * (档内最优新鲜度 / 100)
    ///       + distance_weight * exp(-d / distance_decay_km)
    /// 预测优先仓库得分乘 forecast_priority_boost。
    /// 并列: 距离小者 → 仓库 id 小者 (确定性)
    fn pick_best<'a>(
        &self,
        evaluations: &'a [WarehouseEvaluation],
        priority_warehouse_ids: &[String],
    ) -> Option<(&'a WarehouseEvaluation, f64)> {
        let preferred_tier = if evaluations.iter().any(|e| e.tier == EligibilityTier::Strict) {
            EligibilityTier::Strict
        } else {
            EligibilityTier::Relaxed
        };

        let mut best: Option<(&WarehouseEvaluation, f64)> = None;
        for eval in evaluations.iter().filter(|e| e.tier == preferred_tier) {
            let normalized_freshness = (eval.best_freshness_pct / 100.0).clamp(0.0, 1.0);
            let mut score = self.config.freshness_weight * normalized_freshness
                + self.config.distance_weight
                    * (-eval.distance_km / self.config.distance_decay_km).exp();
            if priority_warehouse_ids.iter().any(|id| id == &eval.warehouse_id) {
                score *= self.config.forecast_priority_boost;
            }

            let replace = match &best {
                None => true,
                Some((current, current_score)) => {
                    score > *current_score
                        || (score == *current_score
                            && (eval.distance_km < current.distance_km
                                || (eval.distance_km == current.distance_km
                                    && eval.warehouse_id < current.warehouse_id)))
                }
            };
            if replace {
                best = Some((eval, score));
            }
        }
        best
    }

    /// 最鲜优先扣减 (与基线的 FIFO 相反)
    ///
    /// 档内按送达新鲜度降序贪心取料; 并列保持候选输入顺序
    fn draw_freshest_first(
        &self,
        pool: &mut InventoryPool,
        eligible: &[EligibleBatch],
        required_kg: f64,
    ) -> Result<Vec<BatchDraw>, EngineError> {
        let mut ordered: Vec<EligibleBatch> = eligible.to_vec();
        ordered.sort_by(|a, b| {
            b.freshness_at_delivery_pct
                .partial_cmp(&a.freshness_at_delivery_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut remaining = required_kg;
        let mut draws = Vec::new();
        for batch in ordered {
            if remaining <= 0.0 {
                break;
            }
            let take = remaining.min(batch.available_kg);
            pool.draw(&batch.batch_id, take)?;
            draws.push(BatchDraw {
                batch_id: batch.batch_id,
                quantity_kg: take,
                freshness_at_dispatch_pct: batch.freshness_at_dispatch_pct,
            });
            remaining -= take;
        }
        Ok(draws)
    }
}
