use chrono::NaiveDate;
use hrsuite_core::{DateRange, EmployeeId, Entity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

hrsuite_core::string_enum! {
    pub enum CompensationType {
        Salary => "salary",
        Bonus => "bonus",
        Overtime => "overtime",
        Commission => "commission",
        Allowance => "allowance",
        Deduction => "deduction",
    }
}

hrsuite_core::string_enum! {
    pub enum PayPeriod {
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Annual => "annual",
        OneTime => "one-time",
    }
}

impl PayPeriod {
    /// Periods per year for the cadences payroll annualizes. Quarterly,
    /// annual and one-time amounts are not annualized.
    pub fn periods_per_year(self) -> Option<i64> {
        match self {
            PayPeriod::Weekly => Some(52),
            PayPeriod::Biweekly => Some(26),
            PayPeriod::Monthly => Some(12),
            PayPeriod::Quarterly | PayPeriod::Annual | PayPeriod::OneTime => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Compensation {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub compensation_type: CompensationType,
    pub amount: Decimal,
    pub currency: String,
    pub pay_period: PayPeriod,
    pub effective_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub description: Option<String>,
}

impl Compensation {
    /// Active and effective at some point of `period`.
    pub fn applies_to(&self, period: &DateRange) -> bool {
        self.is_active
            && self.effective_date <= period.end
            && self.end_date.is_none_or(|end| end >= period.start)
    }

    pub fn is_deduction(&self) -> bool {
        self.compensation_type == CompensationType::Deduction
    }

    pub fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.compensation_type.to_string())
    }
}

impl Entity for Compensation {
    const KIND: &'static str = "compensation";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompensation {
    pub employee_id: EmployeeId,
    pub compensation_type: CompensationType,
    pub amount: Decimal,
    /// Defaults to the organisation currency.
    pub currency: Option<String>,
    pub pay_period: PayPeriod,
    pub effective_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompensationUpdate {
    pub amount: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}
