// ==========================================
// 生鲜物资调配模拟系统 - CLI 主入口
// ==========================================
// 用途: 读取快照 JSON → 双策略对比 → 输出报告 JSON
// 说明: 快照的过滤/查询由数据层完成, 本入口照单全收
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fresh_chain_sim::{
    logging, ComparisonEngine, PredictiveConfig, SimulationSnapshot,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 策略对比核心", fresh_chain_sim::APP_NAME);
    tracing::info!("系统版本: {}", fresh_chain_sim::VERSION);
    tracing::info!("==================================================");

    let (snapshot_path, reference_time) = parse_args()?;

    let snapshot = SimulationSnapshot::load_from_path(&snapshot_path)
        .with_context(|| format!("加载快照失败: {}", snapshot_path.display()))?;
    tracing::info!(
        nodes = snapshot.nodes.len(),
        batches = snapshot.batches.len(),
        requests = snapshot.requests.len(),
        "快照加载完成"
    );

    // 未配置预测服务: 预测侧照常运行, 仅无优先加成
    let report = ComparisonEngine::new()
        .run(
            &snapshot,
            reference_time,
            PredictiveConfig::default(),
            None,
            Duration::from_secs(5),
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .context("对比运行失败")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 解析命令行: <snapshot.json> [--reference-time <RFC3339>]
fn parse_args() -> Result<(PathBuf, DateTime<Utc>)> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut snapshot_path: Option<PathBuf> = None;
    let mut reference_time = Utc::now();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--reference-time" => {
                let raw = args
                    .get(i + 1)
                    .context("--reference-time 缺少取值")?;
                reference_time = DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("非法时间格式: {}", raw))?
                    .with_timezone(&Utc);
                i += 2;
            }
            other => {
                if snapshot_path.is_some() {
                    bail!("多余的参数: {}", other);
                }
                snapshot_path = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }

    let snapshot_path = match snapshot_path {
        Some(p) => p,
        None => bail!("用法: fresh-chain-sim <snapshot.json> [--reference-time <RFC3339>]"),
    };
    Ok((snapshot_path, reference_time))
}
