use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::Entity;

/// Opaque integer employee identifier. Every cross-entity relation goes
/// through this id; no record holds a reference to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

crate::string_enum! {
    pub enum EmployeeStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub position: String,
    pub department: String,
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.first_name, self.last_name, self.employee_number
        )
    }
}

impl Entity for Employee {
    const KIND: &'static str = "employee";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn employee_id(&self) -> EmployeeId {
        self.id
    }
}
