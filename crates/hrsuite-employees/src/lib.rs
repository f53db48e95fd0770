use std::sync::Arc;

use chrono::NaiveDate;
use hrsuite_core::{
    Clock, Employee, EmployeeId, EmployeeStatus, HrError, HrResult, RecordFilter, Repository,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub position: String,
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    pub department: Option<String>,
    /// Defaults to active employees when absent.
    pub status: Option<EmployeeStatus>,
}

/// Employee records. Other engines only ever see employees through this
/// directory, by id.
///
/// Creation is serialized across clones: the number check and the id
/// assignment both read the whole directory before inserting.
#[derive(Clone)]
pub struct EmployeeDirectory {
    employees: Arc<dyn Repository<Employee>>,
    clock: Arc<dyn Clock>,
    registration: Arc<Mutex<()>>,
}

impl EmployeeDirectory {
    pub fn new(employees: Arc<dyn Repository<Employee>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            employees,
            clock,
            registration: Arc::new(Mutex::new(())),
        }
    }

    pub async fn create(&self, request: NewEmployee) -> HrResult<Employee> {
        let employee_number = required(&request.employee_number, "employee_number")?;
        let first_name = required(&request.first_name, "first_name")?;
        let last_name = required(&request.last_name, "last_name")?;
        let email = validate_email(&request.email)?;

        let _registering = self.registration.lock().await;
        let existing = self.employees.list(RecordFilter::all()).await?;
        if existing
            .iter()
            .any(|stored| stored.value.employee_number.eq_ignore_ascii_case(&employee_number))
        {
            return Err(HrError::conflict(format!(
                "employee number {employee_number} is already in use"
            )));
        }
        let next_id = existing
            .iter()
            .map(|stored| stored.value.id.0)
            .max()
            .unwrap_or(0)
            + 1;

        let employee = Employee {
            id: EmployeeId(next_id),
            employee_number,
            first_name,
            last_name,
            email,
            phone: request.phone.map(|phone| phone.trim().to_string()),
            hire_date: request.hire_date.unwrap_or_else(|| self.clock.today()),
            position: request.position.trim().to_string(),
            department: request.department.trim().to_string(),
            status: EmployeeStatus::Active,
        };

        let stored = self.employees.insert(employee).await?;
        info!("employee created: {}", stored.value);
        Ok(stored.value)
    }

    pub async fn get(&self, id: EmployeeId) -> HrResult<Employee> {
        self.employees
            .get(&id.to_string())
            .await?
            .map(|stored| stored.value)
            .ok_or_else(|| HrError::not_found("employee", id))
    }

    /// Like [`Self::get`], but inactive employees count as absent.
    pub async fn require_active(&self, id: EmployeeId) -> HrResult<Employee> {
        let employee = self.get(id).await?;
        if !employee.is_active() {
            return Err(HrError::conflict(format!("employee {id} is inactive")));
        }
        Ok(employee)
    }

    pub async fn get_by_number(&self, employee_number: &str) -> HrResult<Employee> {
        let wanted = employee_number.trim();
        self.employees
            .list(RecordFilter::all())
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .find(|employee| employee.employee_number.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HrError::not_found("employee", wanted))
    }

    pub async fn update(&self, id: EmployeeId, changes: EmployeeUpdate) -> HrResult<Employee> {
        let stored = self
            .employees
            .get(&id.to_string())
            .await?
            .ok_or_else(|| HrError::not_found("employee", id))?;
        let mut employee = stored.value;

        if let Some(first_name) = changes.first_name {
            employee.first_name = required(&first_name, "first_name")?;
        }
        if let Some(last_name) = changes.last_name {
            employee.last_name = required(&last_name, "last_name")?;
        }
        if let Some(email) = changes.email {
            employee.email = validate_email(&email)?;
        }
        if let Some(phone) = changes.phone {
            employee.phone = Some(phone.trim().to_string()).filter(|phone| !phone.is_empty());
        }
        if let Some(position) = changes.position {
            employee.position = position.trim().to_string();
        }
        if let Some(department) = changes.department {
            employee.department = department.trim().to_string();
        }

        let updated = self.employees.update(employee, stored.version).await?;
        info!("employee updated: id {id}");
        Ok(updated.value)
    }

    /// Employees are never hard-deleted; they move to `inactive`.
    pub async fn deactivate(&self, id: EmployeeId) -> HrResult<Employee> {
        let stored = self
            .employees
            .get(&id.to_string())
            .await?
            .ok_or_else(|| HrError::not_found("employee", id))?;
        if !stored.value.is_active() {
            return Ok(stored.value);
        }

        let mut employee = stored.value;
        employee.status = EmployeeStatus::Inactive;
        let updated = self.employees.update(employee, stored.version).await?;
        info!("employee deactivated: id {id}");
        Ok(updated.value)
    }

    pub async fn list(&self, query: EmployeeQuery) -> HrResult<Vec<Employee>> {
        let status = query.status.unwrap_or(EmployeeStatus::Active);
        let department = query.department.as_deref().map(str::trim);

        let mut employees: Vec<Employee> = self
            .employees
            .list(RecordFilter::all())
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .filter(|employee| employee.status == status)
            .filter(|employee| {
                department.is_none_or(|wanted| employee.department.eq_ignore_ascii_case(wanted))
            })
            .collect();
        employees.sort_by_key(|employee| employee.id);
        Ok(employees)
    }

    pub async fn active(&self) -> HrResult<Vec<Employee>> {
        self.list(EmployeeQuery::default()).await
    }

    /// Case-insensitive match on name, email or employee number.
    pub async fn search(&self, query: &str) -> HrResult<Vec<Employee>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Employee> = self
            .employees
            .list(RecordFilter::all())
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .filter(|employee| {
                [
                    employee.full_name(),
                    employee.email.clone(),
                    employee.employee_number.clone(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();
        hits.sort_by_key(|employee| employee.id);
        Ok(hits)
    }
}

fn required(value: &str, field: &str) -> HrResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HrError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validate_email(value: &str) -> HrResult<String> {
    let email = required(value, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(HrError::validation(format!("invalid email address: {email}"))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use hrsuite_core::FixedClock;
    use hrsuite_store::{InMemoryRepository, RoundTripRepository};

    use super::*;

    fn directory() -> EmployeeDirectory {
        let clock = FixedClock::at(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        EmployeeDirectory::new(
            Arc::new(InMemoryRepository::<Employee>::new()),
            Arc::new(clock),
        )
    }

    fn new_employee(number: &str, first: &str, department: &str) -> NewEmployee {
        NewEmployee {
            employee_number: number.to_string(),
            first_name: first.to_string(),
            last_name: "Pérez".to_string(),
            email: format!("{}@company.com", first.to_lowercase()),
            phone: Some("+34600111222".to_string()),
            hire_date: None,
            position: "Analyst".to_string(),
            department: department.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_defaults_hire_date() {
        let directory = directory();
        let juan = directory.create(new_employee("EMP001", "Juan", "IT")).await.unwrap();
        let eva = directory.create(new_employee("EMP002", "Eva", "HR")).await.unwrap();

        assert_eq!(juan.id, EmployeeId(1));
        assert_eq!(eva.id, EmployeeId(2));
        assert_eq!(juan.hire_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(juan.to_string(), "Juan Pérez (EMP001)");
    }

    #[tokio::test]
    async fn concurrent_creates_keep_numbers_and_ids_unique() {
        let employees = Arc::new(RoundTripRepository::<Employee>::new());
        let clock = FixedClock::at(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let directory = EmployeeDirectory::new(employees.clone(), Arc::new(clock));
        let other_handle = directory.clone();

        let (juan, eva) = tokio::join!(
            directory.create(new_employee("EMP001", "Juan", "IT")),
            other_handle.create(new_employee("emp001", "Eva", "HR")),
        );
        assert_eq!([juan.is_ok(), eva.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!([juan, eva].into_iter().any(|result| matches!(result, Err(HrError::Conflict(_)))));
        assert_eq!(employees.len().await, 1);

        let (ana, luis) = tokio::join!(
            directory.create(new_employee("EMP002", "Ana", "IT")),
            other_handle.create(new_employee("EMP003", "Luis", "HR")),
        );
        let mut ids = vec![ana.unwrap().id, luis.unwrap().id];
        ids.sort();
        assert_eq!(ids, vec![EmployeeId(2), EmployeeId(3)]);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_number_and_bad_email() {
        let directory = directory();
        directory.create(new_employee("EMP001", "Juan", "IT")).await.unwrap();

        let dup = directory.create(new_employee("emp001", "Eva", "IT")).await;
        assert!(matches!(dup, Err(HrError::Conflict(_))));

        let mut bad = new_employee("EMP003", "Luis", "IT");
        bad.email = "luis-at-company".to_string();
        assert!(matches!(directory.create(bad).await, Err(HrError::Validation(_))));
    }

    #[tokio::test]
    async fn deactivated_employees_leave_default_listing() {
        let directory = directory();
        let juan = directory.create(new_employee("EMP001", "Juan", "IT")).await.unwrap();
        directory.create(new_employee("EMP002", "Eva", "HR")).await.unwrap();

        directory.deactivate(juan.id).await.unwrap();

        let active = directory.active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].first_name, "Eva");

        let inactive = directory
            .list(EmployeeQuery {
                department: None,
                status: Some(EmployeeStatus::Inactive),
            })
            .await
            .unwrap();
        assert_eq!(inactive[0].id, juan.id);
        assert!(matches!(
            directory.require_active(juan.id).await,
            Err(HrError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_department_and_search_matches_fields() {
        let directory = directory();
        directory.create(new_employee("EMP001", "Juan", "IT")).await.unwrap();
        directory.create(new_employee("EMP002", "Eva", "HR")).await.unwrap();

        let it = directory
            .list(EmployeeQuery {
                department: Some("it".to_string()),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(it.len(), 1);

        assert_eq!(directory.search("eva@").await.unwrap().len(), 1);
        assert_eq!(directory.search("pérez").await.unwrap().len(), 2);
        assert_eq!(directory.search("emp002").await.unwrap()[0].first_name, "Eva");
        assert!(directory.search("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let directory = directory();
        let juan = directory.create(new_employee("EMP001", "Juan", "IT")).await.unwrap();

        let updated = directory
            .update(
                juan.id,
                EmployeeUpdate {
                    department: Some("Finance".to_string()),
                    ..EmployeeUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.department, "Finance");
        assert_eq!(updated.first_name, "Juan");

        let missing = directory.update(EmployeeId(42), EmployeeUpdate::default()).await;
        assert!(matches!(missing, Err(HrError::NotFound { .. })));
        assert_eq!(directory.get_by_number("EMP001").await.unwrap().id, juan.id);
    }
}
