use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};

/// Organisation-wide rules, built once at startup and handed to every
/// engine constructor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    pub tax_rate: Decimal,
    pub social_security_rate: Decimal,
    pub health_insurance_premium: Decimal,
    pub default_currency: String,
    pub annual_vacation_days: i64,
    pub standard_day_hours: f64,
    pub break_threshold_hours: f64,
    pub unpaid_break_hours: f64,
    pub late_grace_minutes: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(15, 2),             // 15%
            social_security_rate: Decimal::new(6, 2),  // 6%
            health_insurance_premium: Decimal::new(15000, 2),
            default_currency: "USD".to_string(),
            annual_vacation_days: 22,
            standard_day_hours: 8.0,
            break_threshold_hours: 6.0,
            unpaid_break_hours: 1.0,
            late_grace_minutes: 10,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> HrResult<()> {
        let mut problems = Vec::new();

        for (name, rate) in [
            ("tax_rate", self.tax_rate),
            ("social_security_rate", self.social_security_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                problems.push(format!("{name} must be between 0 and 1"));
            }
        }
        if self.health_insurance_premium < Decimal::ZERO {
            problems.push("health_insurance_premium must not be negative".to_string());
        }
        if self.annual_vacation_days < 0 {
            problems.push("annual_vacation_days must not be negative".to_string());
        }
        if self.default_currency.trim().is_empty() {
            problems.push("default_currency is required".to_string());
        }
        if self.standard_day_hours <= 0.0 {
            problems.push("standard_day_hours must be positive".to_string());
        }
        if self.break_threshold_hours < 0.0 || self.unpaid_break_hours < 0.0 {
            problems.push("break settings must not be negative".to_string());
        }
        if self.late_grace_minutes < 0 {
            problems.push("late_grace_minutes must not be negative".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(HrError::validation(problems.join("; ")))
        }
    }
}
