//! Treasurer binary: runs one settlement period for a configured group
//! and prints the resulting report.

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use moim_ledger::AttendanceStatus::{Absent, Late, Present};
use moim_ledger::{Member, MemberId, NewExpense};
use moim_settlement::{Config, Directory};
use prometheus::Encoder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if std::env::var_os("MOIM_LOG_JSON").is_some() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    tracing::info!(service = %config.service_name, version = %config.service_version, "starting");

    let directory = Directory::new(&config)?;
    let today = Utc::now().date_naive();
    let (group_id, group) = directory.create(&config.group, today)?;

    // Demo roster and one month of activity
    let roster = [("2", "이서연"), ("3", "박도윤"), ("4", "최지우"), ("5", "정하은")];
    for (id, name) in roster {
        group.request_join(Member::new(id, name)).await?;
        group.approve_member(MemberId::new(id)).await?;
    }

    let leader = MemberId::new(config.group.leader.id.as_str());
    let month_day =
        |d: u32| NaiveDate::from_ymd_opt(today.year(), today.month(), d).unwrap_or(today);

    let weeks = [
        (1, "1주차: 프로젝트 기획", [Present, Present, Late, Present, Absent]),
        (8, "2주차: UI/UX 디자인", [Present, Present, Present, Late, Present]),
    ];
    let mut ids = vec![leader.clone()];
    ids.extend(roster.iter().map(|(id, _)| MemberId::new(*id)));

    for (day, topic, statuses) in weeks {
        let session = group.add_meeting(month_day(day), topic).await?;
        for (member, status) in ids.iter().zip(statuses) {
            group.update_attendance(session, member.clone(), status).await?;
        }
    }
    // Attendance not taken yet; excluded from this settlement
    group.add_meeting(month_day(15), "3주차: 프론트엔드 개발").await?;

    group
        .add_expense(NewExpense {
            description: "스터디룸 대여 (3시간)".to_string(),
            amount: 25_000,
            date: month_day(1),
            paid_by: leader.clone(),
            receipt_url: None,
        })
        .await?;
    group
        .add_expense(NewExpense {
            description: "커피 및 간식".to_string(),
            amount: 18_500,
            date: month_day(8),
            paid_by: MemberId::new("2"),
            receipt_url: None,
        })
        .await?;

    match group.settle_current_period().await? {
        Some(outcome) => {
            println!("{}\n\n{}\n", outcome.report.title, outcome.report.body);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        None => tracing::warn!(group = %group_id, "nothing to settle"),
    }

    if let Some(metrics) = directory.metrics() {
        let mut buf = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&metrics.registry().gather(), &mut buf)
            .context("encoding metrics")?;
        tracing::debug!("metrics:\n{}", String::from_utf8_lossy(&buf));
    }

    directory.remove(group_id).await?;
    tracing::info!("shutting down");
    Ok(())
}
