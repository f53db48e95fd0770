use std::sync::Arc;

use chrono::NaiveDate;
use hrsuite_core::{
    Clock, DateRange, DomainEvent, EmployeeId, EventPayload, EventSink, HrError, HrResult,
    PolicyConfig, RecordFilter, Repository, Stored, publish_or_warn,
};
use hrsuite_employees::EmployeeDirectory;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::compensation::{Compensation, CompensationType, CompensationUpdate, NewCompensation};
use crate::record::{PayrollRecord, PayrollReport, Statement, checked_sum, money, out_of_range};

pub const DEFAULT_HISTORY_LIMIT: usize = 12;

/// Largest single compensation amount accepted, one quadrillion.
pub const MAX_COMPENSATION_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Compensation lifecycle and per-period payroll runs.
///
/// A payroll record is stored under `employee:start:end`, so a second run
/// for the same employee and period is refused by the store.
pub struct PayrollEngine {
    compensations: Arc<dyn Repository<Compensation>>,
    payrolls: Arc<dyn Repository<PayrollRecord>>,
    directory: EmployeeDirectory,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    policy: Arc<PolicyConfig>,
}

impl PayrollEngine {
    pub fn new(
        compensations: Arc<dyn Repository<Compensation>>,
        payrolls: Arc<dyn Repository<PayrollRecord>>,
        directory: EmployeeDirectory,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: Arc<PolicyConfig>,
    ) -> Self {
        Self {
            compensations,
            payrolls,
            directory,
            events,
            clock,
            policy,
        }
    }

    pub async fn create_compensation(&self, request: NewCompensation) -> HrResult<Compensation> {
        self.directory.require_active(request.employee_id).await?;

        validate_amount(request.amount)?;
        if let Some(end) = request.end_date {
            DateRange::new(request.effective_date, end)?;
        }
        let currency = match request.currency {
            Some(currency) => currency.trim().to_ascii_uppercase(),
            None => self.policy.default_currency.clone(),
        };
        if currency != self.policy.default_currency {
            return Err(HrError::validation(format!(
                "payroll runs in {}, not {currency}",
                self.policy.default_currency
            )));
        }

        let compensation = Compensation {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            compensation_type: request.compensation_type,
            amount: money(request.amount),
            currency,
            pay_period: request.pay_period,
            effective_date: request.effective_date,
            end_date: request.end_date,
            is_active: true,
            description: request
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        };
        let stored = self.compensations.insert(compensation).await?;
        info!(
            "compensation created for employee {}: {} {} {}",
            stored.value.employee_id,
            stored.value.compensation_type,
            stored.value.amount,
            stored.value.currency
        );
        Ok(stored.value)
    }

    pub async fn update_compensation(
        &self,
        compensation_id: Uuid,
        changes: CompensationUpdate,
    ) -> HrResult<Compensation> {
        let stored = self.load_compensation(compensation_id).await?;
        let mut compensation = stored.value;

        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
            compensation.amount = money(amount);
        }
        if let Some(end) = changes.end_date {
            DateRange::new(compensation.effective_date, end)?;
            compensation.end_date = Some(end);
        }
        if let Some(description) = changes.description {
            compensation.description =
                Some(description.trim().to_string()).filter(|text| !text.is_empty());
        }

        let updated = self.compensations.update(compensation, stored.version).await?;
        info!("compensation updated: {compensation_id}");
        Ok(updated.value)
    }

    /// Compensations are never hard-deleted.
    pub async fn deactivate_compensation(&self, compensation_id: Uuid) -> HrResult<Compensation> {
        let stored = self.load_compensation(compensation_id).await?;
        if !stored.value.is_active {
            return Ok(stored.value);
        }

        let mut compensation = stored.value;
        compensation.is_active = false;
        let updated = self.compensations.update(compensation, stored.version).await?;
        info!("compensation deactivated: {compensation_id}");
        Ok(updated.value)
    }

    pub async fn employee_compensations(
        &self,
        employee_id: EmployeeId,
    ) -> HrResult<Vec<Compensation>> {
        let mut compensations: Vec<Compensation> = self
            .compensations
            .list(RecordFilter::employee(employee_id))
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .collect();
        compensations.sort_by_key(|comp| (comp.effective_date, comp.compensation_type.as_str()));
        Ok(compensations)
    }

    pub async fn generate(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrResult<PayrollRecord> {
        self.directory.get(employee_id).await?;
        let period = DateRange::new(start, end)?;

        let in_effect: Vec<Compensation> = self
            .employee_compensations(employee_id)
            .await?
            .into_iter()
            .filter(|comp| comp.applies_to(&period))
            .collect();
        let statement = Statement::compute(in_effect, &self.policy)?;

        let record = PayrollRecord {
            employee_id,
            pay_period_start: start,
            pay_period_end: end,
            gross_pay: statement.gross_pay,
            total_deductions: statement.total_deductions,
            total_taxes: statement.total_taxes,
            net_pay: statement.net_pay,
            currency: self.policy.default_currency.clone(),
            compensations: statement.earnings,
            deductions: statement.deductions,
            created_at: self.clock.now(),
        };
        let record = self.payrolls.insert(record).await?.value;
        info!(
            "payroll generated for employee {employee_id} ({start} to {end}): net {} {}",
            record.net_pay, record.currency
        );

        let event = DomainEvent::new(
            employee_id,
            record.created_at,
            EventPayload::PayrollGenerated {
                pay_period_start: start,
                pay_period_end: end,
                net_pay: record.net_pay,
                currency: record.currency.clone(),
            },
        );
        publish_or_warn(self.events.as_ref(), event).await;
        Ok(record)
    }

    /// One record per active employee. Employees already paid for the
    /// period keep their existing record.
    pub async fn batch(&self, start: NaiveDate, end: NaiveDate) -> HrResult<Vec<PayrollRecord>> {
        DateRange::new(start, end)?;

        let mut records = Vec::new();
        for employee in self.directory.active().await? {
            let key = PayrollRecord::key_for(employee.id, start, end);
            let record = match self.payrolls.get(&key).await? {
                Some(existing) => existing.value,
                None => self.generate(employee.id, start, end).await?,
            };
            records.push(record);
        }
        info!("payroll batch {start} to {end}: {} employees", records.len());
        Ok(records)
    }

    pub async fn report(&self, start: NaiveDate, end: NaiveDate) -> HrResult<PayrollReport> {
        let payrolls = self.batch(start, end).await?;
        PayrollReport::from_records(
            start,
            end,
            self.policy.default_currency.clone(),
            payrolls,
        )
    }

    /// Newest pay periods first.
    pub async fn history(
        &self,
        employee_id: EmployeeId,
        limit: usize,
    ) -> HrResult<Vec<PayrollRecord>> {
        self.directory.get(employee_id).await?;

        let mut records: Vec<PayrollRecord> = self
            .payrolls
            .list(RecordFilter::employee(employee_id))
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .collect();
        records.sort_by(|a, b| {
            b.pay_period_start
                .cmp(&a.pay_period_start)
                .then(b.pay_period_end.cmp(&a.pay_period_end))
        });
        records.truncate(limit);
        Ok(records)
    }

    /// Active salary compensations, annualized by cadence. Cadences
    /// without a yearly factor contribute nothing.
    pub async fn annual_salary(&self, employee_id: EmployeeId) -> HrResult<Decimal> {
        self.directory.get(employee_id).await?;

        let yearly = self
            .employee_compensations(employee_id)
            .await?
            .into_iter()
            .filter(|comp| comp.is_active && comp.compensation_type == CompensationType::Salary)
            .filter_map(|comp| {
                comp.pay_period
                    .periods_per_year()
                    .map(|periods| comp.amount.checked_mul(Decimal::from(periods)))
            })
            .collect::<Option<Vec<Decimal>>>()
            .ok_or_else(|| out_of_range("annual salary"))?;
        Ok(money(checked_sum(yearly, "annual salary")?))
    }

    async fn load_compensation(&self, compensation_id: Uuid) -> HrResult<Stored<Compensation>> {
        self.compensations
            .get(&compensation_id.to_string())
            .await?
            .ok_or_else(|| HrError::not_found("compensation", compensation_id))
    }
}

fn validate_amount(amount: Decimal) -> HrResult<()> {
    if amount < Decimal::ZERO {
        return Err(HrError::validation(format!(
            "amount must not be negative, got {amount}"
        )));
    }
    if amount > MAX_COMPENSATION_AMOUNT {
        return Err(HrError::validation(format!(
            "amount must not exceed {MAX_COMPENSATION_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}
