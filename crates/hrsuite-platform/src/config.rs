use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use hrsuite_core::PolicyConfig;

/// Settings for the HTTP gateway.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub redis_url: String,
    pub http_addr: String,
    pub policy: PolicyConfig,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), default_http_addr)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        default_http_addr: &str,
    ) -> Result<Self> {
        let WorkerConfig {
            database_url,
            redis_url,
        } = WorkerConfig::from_lookup(&lookup)?;
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let policy = policy_from(lookup)?;

        Ok(Self {
            database_url,
            redis_url,
            http_addr,
            policy,
        })
    }
}

/// Settings for the notification worker, which serves no HTTP and applies
/// no payroll policy.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub database_url: String,
    pub redis_url: String,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is required")?;
        let redis_url = lookup("REDIS_URL").context("REDIS_URL is required")?;
        Ok(Self {
            database_url,
            redis_url,
        })
    }
}

/// Builds the organisation policy from defaults plus any overrides that
/// `lookup` returns.
pub fn policy_from(lookup: impl Fn(&str) -> Option<String>) -> Result<PolicyConfig> {
    let mut policy = PolicyConfig::default();

    override_with(&lookup, "DEFAULT_TAX_RATE", &mut policy.tax_rate)?;
    override_with(&lookup, "SOCIAL_SECURITY_RATE", &mut policy.social_security_rate)?;
    override_with(
        &lookup,
        "HEALTH_INSURANCE_COST",
        &mut policy.health_insurance_premium,
    )?;
    override_with(&lookup, "ANNUAL_VACATION_DAYS", &mut policy.annual_vacation_days)?;
    override_with(&lookup, "STANDARD_DAY_HOURS", &mut policy.standard_day_hours)?;
    override_with(&lookup, "LATE_GRACE_MINUTES", &mut policy.late_grace_minutes)?;
    if let Some(currency) = lookup("DEFAULT_CURRENCY") {
        policy.default_currency = currency.trim().to_ascii_uppercase();
    }

    policy
        .validate()
        .map_err(|err| anyhow!("invalid policy configuration: {err}"))?;
    Ok(policy)
}

fn override_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    slot: &mut T,
) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("{err}"))
            .with_context(|| format!("{name} has an invalid value: {raw}"))?;
    }
    Ok(())
}
