use chrono::{NaiveDate, NaiveDateTime};
use hrsuite_core::time::timestamp;
use hrsuite_core::{EmployeeId, Entity, HrError, HrResult, PolicyConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compensation::Compensation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeductionLine {
    pub description: String,
    pub amount: Decimal,
    /// Set when the line comes from a deduction-type compensation.
    pub compensation_id: Option<Uuid>,
}

/// Immutable pay snapshot for one employee and one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayrollRecord {
    pub employee_id: EmployeeId,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub total_taxes: Decimal,
    pub net_pay: Decimal,
    pub currency: String,
    pub compensations: Vec<Compensation>,
    pub deductions: Vec<DeductionLine>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl PayrollRecord {
    pub fn key_for(employee_id: EmployeeId, start: NaiveDate, end: NaiveDate) -> String {
        format!("{employee_id}:{start}:{end}")
    }
}

impl Entity for PayrollRecord {
    const KIND: &'static str = "payroll";

    fn key(&self) -> String {
        Self::key_for(self.employee_id, self.pay_period_start, self.pay_period_end)
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}

/// Pay arithmetic for one run, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub total_taxes: Decimal,
    pub net_pay: Decimal,
    pub earnings: Vec<Compensation>,
    pub deductions: Vec<DeductionLine>,
}

impl Statement {
    /// One period counts each compensation amount once, whatever its own
    /// cadence. Taxes are a flat rate over gross pay.
    ///
    /// Amounts that leave the `Decimal` range are a validation error.
    pub fn compute(compensations: Vec<Compensation>, policy: &PolicyConfig) -> HrResult<Self> {
        let (withheld, earnings): (Vec<Compensation>, Vec<Compensation>) = compensations
            .into_iter()
            .partition(Compensation::is_deduction);

        let gross_pay = money(checked_sum(
            earnings.iter().map(|comp| comp.amount),
            "gross pay",
        )?);

        let social_security = gross_pay
            .checked_mul(policy.social_security_rate)
            .ok_or_else(|| out_of_range("social security"))?;
        let mut deductions = vec![
            DeductionLine {
                description: "Social security".to_string(),
                amount: money(social_security),
                compensation_id: None,
            },
            DeductionLine {
                description: "Health insurance".to_string(),
                amount: money(policy.health_insurance_premium),
                compensation_id: None,
            },
        ];
        deductions.extend(withheld.iter().map(|comp| DeductionLine {
            description: comp.label(),
            amount: money(comp.amount),
            compensation_id: Some(comp.id),
        }));

        let total_deductions = money(checked_sum(
            deductions.iter().map(|line| line.amount),
            "total deductions",
        )?);
        let total_taxes = money(
            gross_pay
                .checked_mul(policy.tax_rate)
                .ok_or_else(|| out_of_range("total taxes"))?,
        );
        let net_pay = gross_pay
            .checked_sub(total_deductions)
            .and_then(|rest| rest.checked_sub(total_taxes))
            .map(money)
            .ok_or_else(|| out_of_range("net pay"))?;

        Ok(Self {
            gross_pay,
            total_deductions,
            total_taxes,
            net_pay,
            earnings,
            deductions,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayrollReport {
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub total_employees: usize,
    pub total_gross_pay: Decimal,
    pub total_net_pay: Decimal,
    pub total_taxes: Decimal,
    pub total_deductions: Decimal,
    pub currency: String,
    pub payrolls: Vec<PayrollRecord>,
}

impl PayrollReport {
    pub fn from_records(
        start: NaiveDate,
        end: NaiveDate,
        currency: String,
        payrolls: Vec<PayrollRecord>,
    ) -> HrResult<Self> {
        let sum = |pick: fn(&PayrollRecord) -> Decimal, what: &str| {
            checked_sum(payrolls.iter().map(pick), what)
        };
        Ok(Self {
            pay_period_start: start,
            pay_period_end: end,
            total_employees: payrolls.len(),
            total_gross_pay: sum(|record| record.gross_pay, "total gross pay")?,
            total_net_pay: sum(|record| record.net_pay, "total net pay")?,
            total_taxes: sum(|record| record.total_taxes, "total taxes")?,
            total_deductions: sum(|record| record.total_deductions, "total deductions")?,
            currency,
            payrolls,
        })
    }
}

/// Two decimal places, always carried in the scale so that amounts
/// serialize as `"640.00"`.
pub(crate) fn money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

pub(crate) fn checked_sum(
    amounts: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> HrResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| out_of_range(what))
}

pub(crate) fn out_of_range(what: &str) -> HrError {
    HrError::validation(format!("{what} is outside the supported amount range"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::compensation::{CompensationType, PayPeriod};

    use super::*;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn comp(kind: CompensationType, amount: &str) -> Compensation {
        Compensation {
            id: Uuid::new_v4(),
            employee_id: EmployeeId(1),
            compensation_type: kind,
            amount: dec(amount),
            currency: "USD".to_string(),
            pay_period: PayPeriod::Monthly,
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            is_active: true,
            description: None,
        }
    }

    #[test]
    fn standard_deductions_and_flat_tax() {
        let statement = Statement::compute(
            vec![comp(CompensationType::Salary, "1000")],
            &PolicyConfig::default(),
        )
        .unwrap();
        assert_eq!(statement.gross_pay, dec("1000"));
        assert_eq!(statement.deductions[0].amount, dec("60"));
        assert_eq!(statement.deductions[1].amount, dec("150"));
        assert_eq!(statement.total_deductions, dec("210"));
        assert_eq!(statement.total_taxes, dec("150"));
        assert_eq!(statement.net_pay, dec("640"));
    }

    #[test]
    fn deduction_compensations_become_line_items() {
        let loan = Compensation {
            description: Some("Loan repayment".to_string()),
            ..comp(CompensationType::Deduction, "100")
        };
        let statement = Statement::compute(
            vec![
                comp(CompensationType::Salary, "3000"),
                comp(CompensationType::Bonus, "500.50"),
                loan.clone(),
            ],
            &PolicyConfig::default(),
        )
        .unwrap();

        assert_eq!(statement.gross_pay, dec("3500.50"));
        assert_eq!(statement.earnings.len(), 2);
        assert!(statement.earnings.iter().all(|comp| !comp.is_deduction()));

        let line = statement.deductions.last().unwrap();
        assert_eq!(line.description, "Loan repayment");
        assert_eq!(line.compensation_id, Some(loan.id));
        // 210.03 social security + 150 health + 100 loan
        assert_eq!(statement.total_deductions, dec("460.03"));
        assert_eq!(statement.total_taxes, dec("525.08"));
        assert_eq!(
            statement.net_pay,
            statement.gross_pay - statement.total_deductions - statement.total_taxes
        );
    }

    #[test]
    fn empty_period_still_charges_the_premium() {
        let statement = Statement::compute(Vec::new(), &PolicyConfig::default()).unwrap();
        assert_eq!(statement.gross_pay, Decimal::ZERO);
        assert_eq!(statement.total_deductions, dec("150"));
        assert_eq!(statement.net_pay, dec("-150"));
    }

    #[test]
    fn amounts_past_the_decimal_range_are_rejected_not_panicking() {
        let huge = Statement::compute(
            vec![
                comp(CompensationType::Salary, "50000000000000000000000000000"),
                comp(CompensationType::Salary, "50000000000000000000000000000"),
            ],
            &PolicyConfig::default(),
        );
        assert!(matches!(huge, Err(HrError::Validation(_))));
    }

    #[test]
    fn report_totals_overflow_is_a_validation_error() {
        let record = |net: &str| PayrollRecord {
            employee_id: EmployeeId(1),
            pay_period_start: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            pay_period_end: NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
            gross_pay: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            total_taxes: Decimal::ZERO,
            net_pay: dec(net),
            currency: "USD".to_string(),
            compensations: Vec::new(),
            deductions: Vec::new(),
            created_at: NaiveDate::from_ymd_opt(2024, 8, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        };
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();

        let fine = PayrollReport::from_records(
            start,
            end,
            "USD".to_string(),
            vec![record("640.00"), record("1430.00")],
        )
        .unwrap();
        assert_eq!(fine.total_net_pay, dec("2070.00"));

        let overflow = PayrollReport::from_records(
            start,
            end,
            "USD".to_string(),
            vec![
                record("50000000000000000000000000000"),
                record("50000000000000000000000000000"),
            ],
        );
        assert!(matches!(overflow, Err(HrError::Validation(_))));
    }
}
