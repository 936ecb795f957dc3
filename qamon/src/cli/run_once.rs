//! run-once サブコマンド
//!
//! 1サイクルだけ実行し、結果を表示して終了します。
//! 自動テストに失敗があれば非ゼロで終了します（CI向け）。

use std::io::Write;

use crate::bootstrap::initialize;
use crate::config::{MonitorConfig, NotifyConfig};
use crate::monitor::CycleReport;
use crate::types::PassFail;

/// サマリーを書き出す
pub fn write_summary<W: Write>(out: &mut W, report: &CycleReport) -> std::io::Result<()> {
    let snapshot = &report.snapshot;
    writeln!(out, "QA run at {}", snapshot.timestamp)?;
    for (module, test) in snapshot.results.tests() {
        let Some(status) = test.pass_fail.filter(|_| test.is_automated()) else {
            continue;
        };
        match status {
            PassFail::Pass => writeln!(out, "  PASS  {} / {}", module, test.test_case)?,
            PassFail::Fail => writeln!(
                out,
                "  FAIL  {} / {}: {}",
                module, test.test_case, test.notes
            )?,
        }
    }
    writeln!(
        out,
        "{} evaluated, {} passed, {} failed",
        report.evaluated,
        report.evaluated - report.failed,
        report.failed
    )?;
    Ok(())
}

/// 1サイクル実行する
///
/// すべての自動テストが成功した場合に `true` を返す。
pub async fn execute() -> anyhow::Result<bool> {
    let config = MonitorConfig::from_env();
    let notify = NotifyConfig::from_env();
    let mut ctx = initialize(&config, &notify)?;

    let mut report = ctx.monitor.run_cycle().await;
    // 通知の送信完了を待ってから終了する
    for handle in report.notifications.drain(..) {
        if let Err(e) = handle.await {
            tracing::warn!("Notification task failed: {}", e);
        }
    }

    write_summary(&mut std::io::stdout().lock(), &report)?;
    Ok(report.failed == 0)
}
