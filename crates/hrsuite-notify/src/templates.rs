use hrsuite_core::EventPayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

const SIGNATURE: &str = "Regards,\nHuman Resources";

/// Events without an employee-facing email return `None`.
pub fn email_for(name: &str, payload: &EventPayload) -> Option<EmailTemplate> {
    let (subject, details) = match payload {
        EventPayload::VacationApproved {
            start_date,
            end_date,
            ..
        } => (
            "Vacation request approved",
            format!(
                "Your vacation request has been APPROVED.\n\n\
                 - Start date: {start_date}\n- End date: {end_date}\n\n\
                 Enjoy your time off."
            ),
        ),
        EventPayload::VacationRejected {
            start_date,
            end_date,
            reason,
            ..
        } => {
            let reason = reason
                .as_deref()
                .map(|reason| format!("\n- Reason: {reason}"))
                .unwrap_or_default();
            (
                "Vacation request rejected",
                format!(
                    "Your vacation request has been REJECTED.\n\n\
                     - Start date: {start_date}\n- End date: {end_date}{reason}\n\n\
                     Contact Human Resources for more information."
                ),
            )
        }
        EventPayload::PayrollGenerated {
            pay_period_start,
            pay_period_end,
            net_pay,
            currency,
        } => (
            "Pay statement available",
            format!(
                "Your pay statement is available.\n\n\
                 - Period: {pay_period_start} to {pay_period_end}\n\
                 - Net pay: {net_pay:.2} {currency}\n\n\
                 The full breakdown is in your employee portal."
            ),
        ),
        EventPayload::ScheduleUpdated { effective_date, .. } => (
            "Work schedule updated",
            format!(
                "Your work schedule has been updated.\n\n\
                 Effective date: {effective_date}\n\n\
                 Check your employee portal for the new hours."
            ),
        ),
        EventPayload::AttendanceAlert { date, issue } => (
            "Attendance alert",
            format!(
                "An attendance irregularity was recorded.\n\n\
                 Date: {date}\nDetail: {issue}\n\n\
                 If this is a mistake, contact Human Resources."
            ),
        ),
        EventPayload::VacationSubmitted { .. } | EventPayload::VacationCancelled { .. } => {
            return None;
        }
    };

    Some(EmailTemplate {
        subject: subject.to_string(),
        body: format!("Dear {name},\n\n{details}\n\n{SIGNATURE}"),
    })
}

/// Short form of the same notifications, before truncation.
pub fn sms_for(name: &str, payload: &EventPayload) -> Option<String> {
    let text = match payload {
        EventPayload::VacationApproved {
            start_date,
            end_date,
            ..
        } => format!(
            "Hi {name}, your vacation from {start_date} to {end_date} has been APPROVED. - HR"
        ),
        EventPayload::VacationRejected {
            start_date,
            end_date,
            ..
        } => format!(
            "Hi {name}, your vacation from {start_date} to {end_date} has been REJECTED. Contact HR for details."
        ),
        EventPayload::PayrollGenerated { .. } => {
            format!("Hi {name}, your pay statement is available in the employee portal. - HR")
        }
        EventPayload::ScheduleUpdated { effective_date, .. } => format!(
            "Hi {name}, your schedule changes from {effective_date}. Check the employee portal."
        ),
        EventPayload::AttendanceAlert { date, issue } => {
            format!("Hi {name}, attendance alert for {date}: {issue}. - HR")
        }
        EventPayload::VacationSubmitted { .. } | EventPayload::VacationCancelled { .. } => {
            return None;
        }
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use hrsuite_core::EmployeeId;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn d(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rejection_mentions_reason_only_when_given() {
        let mut payload = EventPayload::VacationRejected {
            vacation_id: Uuid::new_v4(),
            start_date: d("2024-08-01"),
            end_date: d("2024-08-05"),
            rejected_by: EmployeeId(2),
            reason: Some("peak season".to_string()),
        };
        let email = email_for("Juan Pérez", &payload).unwrap();
        assert_eq!(email.subject, "Vacation request rejected");
        assert!(email.body.starts_with("Dear Juan Pérez,"));
        assert!(email.body.contains("- Reason: peak season"));

        if let EventPayload::VacationRejected { reason, .. } = &mut payload {
            *reason = None;
        }
        let email = email_for("Juan Pérez", &payload).unwrap();
        assert!(!email.body.contains("Reason"));
    }

    #[test]
    fn payroll_email_shows_two_decimals() {
        let payload = EventPayload::PayrollGenerated {
            pay_period_start: d("2024-07-01"),
            pay_period_end: d("2024-07-31"),
            net_pay: Decimal::new(640, 0),
            currency: "USD".to_string(),
        };
        let email = email_for("Ana", &payload).unwrap();
        assert!(email.body.contains("Net pay: 640.00 USD"));
        assert!(sms_for("Ana", &payload).unwrap().contains("pay statement"));
    }

    #[test]
    fn cancellations_have_no_template() {
        let payload = EventPayload::VacationCancelled {
            vacation_id: Uuid::new_v4(),
        };
        assert!(email_for("Ana", &payload).is_none());
        assert!(sms_for("Ana", &payload).is_none());
    }
}
