// ==========================================
// 生鲜物资调配模拟系统 - 策略对比引擎
// ==========================================
// 职责: 双策略试算 + 聚合指标 + 差值报告
// 红线: 两个策略各自克隆快照, 绝不共享可变库存;
//       指标合流 (join) 后才计算差值
// 红线: 业务层面的未满足需求不报错;
//       对比运行只因畸形配置/取消/合流失败而失败
// ==========================================

use crate::config::PredictiveConfig;
use crate::domain::allocation::AllocationRecord;
use crate::domain::snapshot::SimulationSnapshot;
use crate::engine::error::EngineError;
use crate::engine::forecast::{
    resolve_priority_warehouses, DemandForecastProvider, ForecastRequest, WarehouseSummary,
};
use crate::engine::predictive::PredictiveAllocator;
use crate::engine::regular::RegularAllocator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 聚合指标
// ==========================================

/// 单策略聚合指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// 履约率 = 100 * Σallocated / Σrequired (Σrequired=0 时为 0, 不产生 NaN)
    pub fulfillment_rate_pct: f64,
    /// 有距离记录的平均配送距离 (零分配记录计入; 无记录时为 None)
    pub avg_distance_km: Option<f64>,
    /// 记录级平均发货新鲜度 (零扣减记录剔除; 无可算记录时为 None)
    pub avg_freshness_at_dispatch_pct: Option<f64>,
    pub total_required_kg: f64,
    pub total_allocated_kg: f64,
    pub records_count: usize,
}

/// 单策略运行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRunOutcome {
    pub allocations: Vec<AllocationRecord>,
    pub metrics: StrategyMetrics,
    /// 预测策略是否整次降级为基线行为 (基线侧恒为 false)
    pub degraded: bool,
}

/// 差值报告 (预测相对基线)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementReport {
    /// 履约率差 (百分点)
    pub fulfillment_rate_delta_pct: f64,
    /// 距离缩减率 (%); 基线平均距离为 0 或缺失时无定义 → None
    pub distance_reduction_pct: Option<f64>,
    /// 发货新鲜度增益 (百分点); 任一侧缺失时为 None
    pub freshness_gain_pct_points: Option<f64>,
}

/// 对比报告 (对外输出)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: String,
    pub reference_time: DateTime<Utc>,
    pub regular: StrategyRunOutcome,
    pub predictive: StrategyRunOutcome,
    pub improvements: ImprovementReport,
}

// ==========================================
// ComparisonEngine - 策略对比引擎
// ==========================================
pub struct ComparisonEngine {
    // 无状态引擎, 不需要注入依赖
}

impl ComparisonEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 执行双策略对比
    ///
    /// # 流程
    /// 0. (可选) 预测服务调用, 限时; 任何失败 → 预测侧整次降级
    /// 1. 快照克隆两份, 两个策略在阻塞任务上独立运行
    /// 2. 合流后计算聚合指标与差值
    ///
    /// # 参数
    /// - `forecast`: 预测协作方; None 表示未部署 (预测侧照常运行, 仅无优先加成)
    /// - `forecast_timeout`: 预测调用时限 (调用方提供)
    /// - `cancel`: 协作式取消标志, 两个策略在请求之间检查
    #[instrument(skip_all, fields(
        nodes_count = snapshot.nodes.len(),
        batches_count = snapshot.batches.len(),
        requests_count = snapshot.requests.len()
    ))]
    pub async fn run(
        &self,
        snapshot: &SimulationSnapshot,
        reference_time: DateTime<Utc>,
        config: PredictiveConfig,
        forecast: Option<Arc<dyn DemandForecastProvider>>,
        forecast_timeout: Duration,
        cancel: Arc<AtomicBool>,
    ) -> Result<ComparisonReport, EngineError> {
        snapshot.validate()?;
        // 配置错误在任务派发前浮出
        let predictive_allocator = PredictiveAllocator::new(config)?;

        info!(reference_time = %reference_time, "开始双策略对比运行");

        // ==========================================
        // 步骤0: 预测优先仓库解析 (每次运行一次)
        // ==========================================
        let (priority_ids, degraded) = match &forecast {
            Some(provider) => {
                let request = ForecastRequest {
                    reference_time,
                    warehouses: snapshot
                        .nodes
                        .iter()
                        .filter(|n| n.is_warehouse())
                        .map(WarehouseSummary::from_node)
                        .collect(),
                    recent_requests: snapshot.requests.clone(),
                };
                match resolve_priority_warehouses(provider, request, forecast_timeout).await {
                    Some(ids) => (ids, false),
                    None => {
                        warn!("预测步骤失败, 预测侧整次降级为基线行为");
                        (Vec::new(), true)
                    }
                }
            }
            None => {
                debug!("未配置预测服务, 预测侧无优先加成");
                (Vec::new(), false)
            }
        };

        // ==========================================
        // 步骤1: 双策略独立试算 (各持快照克隆)
        // ==========================================
        let regular_snapshot = snapshot.clone();
        let regular_cancel = cancel.clone();
        let regular_task = tokio::task::spawn_blocking(move || {
            RegularAllocator::new().run(
                &regular_snapshot,
                reference_time,
                &regular_cancel,
            )
        });

        let predictive_snapshot = snapshot.clone();
        let predictive_cancel = cancel.clone();
        let predictive_task = tokio::task::spawn_blocking(move || {
            if degraded {
                // 整次降级: 预测侧输出与基线逐字节一致
                RegularAllocator::new().run(
                    &predictive_snapshot,
                    reference_time,
                    &predictive_cancel,
                )
            } else {
                predictive_allocator.run(
                    &predictive_snapshot,
                    reference_time,
                    &priority_ids,
                    &predictive_cancel,
                )
            }
        });

        let (regular_joined, predictive_joined) = tokio::join!(regular_task, predictive_task);
        let regular_allocations =
            regular_joined.map_err(|e| EngineError::JoinFailure(e.to_string()))??;
        let predictive_allocations =
            predictive_joined.map_err(|e| EngineError::JoinFailure(e.to_string()))??;

        // ==========================================
        // 步骤2: 聚合指标 + 差值
        // ==========================================
        let regular_metrics = Self::compute_metrics(&regular_allocations);
        let predictive_metrics = Self::compute_metrics(&predictive_allocations);
        let improvements = Self::compute_improvements(&regular_metrics, &predictive_metrics);

        info!(
            regular_fulfillment = regular_metrics.fulfillment_rate_pct,
            predictive_fulfillment = predictive_metrics.fulfillment_rate_pct,
            degraded,
            "双策略对比完成"
        );

        Ok(ComparisonReport {
            run_id: Uuid::new_v4().to_string(),
            reference_time,
            regular: StrategyRunOutcome {
                allocations: regular_allocations,
                metrics: regular_metrics,
                degraded: false,
            },
            predictive: StrategyRunOutcome {
                allocations: predictive_allocations,
                metrics: predictive_metrics,
                degraded,
            },
            improvements,
        })
    }

    /// 聚合单策略指标
    pub fn compute_metrics(records: &[AllocationRecord]) -> StrategyMetrics {
        let total_required_kg: f64 = records.iter().map(|r| r.required_kg).sum();
        let total_allocated_kg: f64 = records.iter().map(|r| r.allocated_kg).sum();
        let fulfillment_rate_pct = if total_required_kg > 0.0 {
            100.0 * total_allocated_kg / total_required_kg
        } else {
            0.0
        };

        let distances: Vec<f64> = records.iter().filter_map(|r| r.distance_km).collect();
        let avg_distance_km = if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / distances.len() as f64)
        };

        let freshness_means: Vec<f64> =
            records.iter().filter_map(|r| r.mean_draw_freshness_pct()).collect();
        let avg_freshness_at_dispatch_pct = if freshness_means.is_empty() {
            None
        } else {
            Some(freshness_means.iter().sum::<f64>() / freshness_means.len() as f64)
        };

        StrategyMetrics {
            fulfillment_rate_pct,
            avg_distance_km,
            avg_freshness_at_dispatch_pct,
            total_required_kg,
            total_allocated_kg,
            records_count: records.len(),
        }
    }

    /// 差值报告 (预测相对基线)
    pub fn compute_improvements(
        regular: &StrategyMetrics,
        predictive: &StrategyMetrics,
    ) -> ImprovementReport {
        let distance_reduction_pct = match (regular.avg_distance_km, predictive.avg_distance_km) {
            // 基线平均距离为 0 时缩减率无定义, 报 None 而不是除零
            (Some(r), Some(p)) if r > 0.0 => Some((r - p) / r * 100.0),
            _ => None,
        };
        let freshness_gain_pct_points = match (
            regular.avg_freshness_at_dispatch_pct,
            predictive.avg_freshness_at_dispatch_pct,
        ) {
            (Some(r), Some(p)) => Some(p - r),
            _ => None,
        };

        ImprovementReport {
            fulfillment_rate_delta_pct: predictive.fulfillment_rate_pct
                - regular.fulfillment_rate_pct,
            distance_reduction_pct,
            freshness_gain_pct_points,
        }
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}
