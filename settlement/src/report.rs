//! Settlement report generation
//!
//! Renders a deterministic, human-readable breakdown of a settlement. The
//! same inputs always produce the same text; member lines follow member
//! order.
//!
//! # Example
//!
//! ```text
//! 2024년 7월 정산 리포트
//!
//! 2024년 7월 정산 결과
//! 총 지출: 10,000원
//! 1인당 부담액: 5,000원
//!
//! - 김민준: 20,000원 - 벌금 3,000원 - 부담액 5,000원 = 12,000원
//! - 이서연: 20,000원 - 벌금 0원 - 부담액 5,000원 = 15,000원
//! ```

use chrono::{DateTime, Datelike, Utc};
use moim_ledger::{Amount, CostSplit};

use crate::config::ReportConfig;
use crate::types::{MemberSettlement, Report};

/// Report generator
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    currency_suffix: String,
}

impl ReportGenerator {
    /// Create new generator
    pub fn new(currency_suffix: impl Into<String>) -> Self {
        Self {
            currency_suffix: currency_suffix.into(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.currency_suffix.clone())
    }

    /// Title for a settlement run at `at`
    pub fn title(&self, at: DateTime<Utc>) -> String {
        format!("{}년 {}월 정산 리포트", at.year(), at.month())
    }

    /// Render the full report
    pub fn render(
        &self,
        period_name: &str,
        at: DateTime<Utc>,
        split: &CostSplit,
        excluded_sessions: usize,
        lines: &[MemberSettlement],
    ) -> Report {
        let mut body = Vec::with_capacity(lines.len() + 6);

        body.push(format!("{} 정산 결과", period_name));
        body.push(format!("총 지출: {}", self.money(split.total)));
        body.push(format!("1인당 부담액: {}", self.money(split.base_share)));
        if split.remainder > 0 {
            body.push(format!(
                "나머지 {}은 앞 순서 멤버 {}명이 1{}씩 추가 부담",
                self.money(split.remainder),
                split.remainder,
                self.currency_suffix
            ));
        }
        if excluded_sessions > 0 {
            body.push(format!("출결 미완료로 제외된 모임: {}회", excluded_sessions));
        }
        body.push(String::new());

        for line in lines {
            body.push(format!(
                "- {}: {} - 벌금 {} - 부담액 {} = {}",
                line.name,
                self.money(line.starting_balance),
                self.money(line.fines),
                self.money(line.cost_share),
                self.money(line.new_balance),
            ));
        }

        Report {
            title: self.title(at),
            body: body.join("\n"),
        }
    }

    fn money(&self, amount: Amount) -> String {
        format!("{}{}", group_thousands(amount), self.currency_suffix)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

/// `-1234567` -> `"-1,234,567"`
pub fn group_thousands(amount: Amount) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use moim_ledger::MemberId;

    fn line(id: &str, name: &str, start: Amount, fines: Amount, share: Amount) -> MemberSettlement {
        MemberSettlement {
            member_id: MemberId::new(id),
            name: name.to_string(),
            starting_balance: start,
            fines,
            cost_share: share,
            new_balance: start - fines - share,
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(43_500), "43,500");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn test_render_lines_in_order() {
        let generator = ReportGenerator::default();
        let at = Utc.with_ymd_and_hms(2024, 7, 31, 20, 0, 0).unwrap();
        let split = CostSplit::new(10_000, 2);
        let lines = vec![
            line("1", "Minjun", 20_000, 3_000, 5_000),
            line("2", "Seoyeon", 20_000, 0, 5_000),
        ];

        let report = generator.render("2024년 7월", at, &split, 0, &lines);
        assert_eq!(report.title, "2024년 7월 정산 리포트");
        assert!(report.body.contains("총 지출: 10,000원"));
        assert!(report.body.contains("1인당 부담액: 5,000원"));

        let minjun = report.body.find("- Minjun: 20,000원 - 벌금 3,000원 - 부담액 5,000원 = 12,000원").unwrap();
        let seoyeon = report.body.find("- Seoyeon: 20,000원 - 벌금 0원 - 부담액 5,000원 = 15,000원").unwrap();
        assert!(minjun < seoyeon);
        assert!(!report.body.contains("나머지"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let generator = ReportGenerator::new("KRW");
        let at = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let split = CostSplit::new(10_001, 3);
        let lines = vec![line("1", "A", 0, 0, 3_334)];

        let a = generator.render("2024년 8월", at, &split, 1, &lines);
        let b = generator.render("2024년 8월", at, &split, 1, &lines);
        assert_eq!(a, b);
        assert!(a.body.contains("나머지 2KRW"));
        assert!(a.body.contains("제외된 모임: 1회"));
        assert!(a.body.contains("= -3,334KRW"));
    }
}
