use std::collections::HashMap;

use chrono::NaiveDateTime;
use hrsuite_core::{EmployeeId, HrError, HrResult};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::engine::AttendanceEngine;
use crate::record::AttendanceRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiometricDevice {
    pub device_id: String,
    pub location: String,
    pub is_active: bool,
}

hrsuite_core::string_enum! {
    pub enum PunchAction {
        CheckIn => "check_in",
        CheckOut => "check_out",
    }
}

/// Identity already verified by the device-auth collaborator. This crate
/// never looks at biometric data; it only trusts or rejects the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityAssertion {
    pub employee_id: EmployeeId,
    pub device_id: String,
    pub action: PunchAction,
    #[serde(default, with = "hrsuite_core::time::option_timestamp")]
    pub asserted_at: Option<NaiveDateTime>,
}

#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, BiometricDevice>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, device_id: &str, location: &str) -> HrResult<BiometricDevice> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(HrError::validation("device_id is required"));
        }

        let device = BiometricDevice {
            device_id: device_id.to_string(),
            location: location.trim().to_string(),
            is_active: true,
        };
        let mut devices = self.devices.write().await;
        devices.insert(device.device_id.clone(), device.clone());
        info!("device registered: {} at {}", device.device_id, device.location);
        Ok(device)
    }

    pub async fn deactivate(&self, device_id: &str) -> HrResult<BiometricDevice> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(device_id)
            .ok_or_else(|| HrError::not_found("device", device_id))?;
        device.is_active = false;
        info!("device deactivated: {device_id}");
        Ok(device.clone())
    }

    pub async fn get(&self, device_id: &str) -> Option<BiometricDevice> {
        self.devices.read().await.get(device_id).cloned()
    }

    pub async fn list(&self) -> Vec<BiometricDevice> {
        let mut devices: Vec<BiometricDevice> =
            self.devices.read().await.values().cloned().collect();
        devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        devices
    }

    /// Routes a device punch to the attendance engine.
    pub async fn record(
        &self,
        engine: &AttendanceEngine,
        assertion: IdentityAssertion,
    ) -> HrResult<AttendanceRecord> {
        let device = self
            .get(&assertion.device_id)
            .await
            .ok_or_else(|| HrError::not_found("device", &assertion.device_id))?;
        if !device.is_active {
            return Err(HrError::conflict(format!(
                "device {} is inactive",
                device.device_id
            )));
        }

        let date = assertion.asserted_at.map(|at| at.date());
        let time = assertion.asserted_at.map(|at| at.time());
        info!(
            "device {} reported {} for employee {}",
            device.device_id, assertion.action, assertion.employee_id
        );
        match assertion.action {
            PunchAction::CheckIn => engine.check_in(assertion.employee_id, date, time).await,
            PunchAction::CheckOut => engine.check_out(assertion.employee_id, date, time).await,
        }
    }
}
