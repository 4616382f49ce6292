use chrono::{NaiveDate, NaiveTime};
use schedule_core::{
    config::Config,
    forms::{RecurrenceForm, ScheduledTransactionForm, Validation},
    schedule::{EndCondition, FrequencyType},
};
use uuid::Uuid;

fn rent_form() -> ScheduledTransactionForm {
    ScheduledTransactionForm {
        name: "  Rent ".into(),
        amount: "1500.00".into(),
        account_id: Uuid::new_v4().to_string(),
        currency: "eur".into(),
        category: "Rent".into(),
        notes: String::new(),
        recurrence: RecurrenceForm {
            frequency: "Monthly".into(),
            end_type: "After occurrences".into(),
            occurrences: "12".into(),
            start_date: "2025-01-31".into(),
            time: "09:00".into(),
            reminder_days: "3".into(),
            ..RecurrenceForm::default()
        },
    }
}

#[test]
fn valid_form_builds_schedule() {
    let schedule = match rent_form().validate() {
        Validation::Valid(schedule) => schedule,
        Validation::Invalid(errors) => panic!("unexpected errors: {:?}", errors),
    };
    assert_eq!(schedule.name, "Rent");
    assert_eq!(schedule.amount, 1500.0);
    assert_eq!(schedule.currency.as_deref(), Some("EUR"));
    assert_eq!(schedule.category.as_deref(), Some("rent"));
    assert_eq!(schedule.notes, None);

    let rule = schedule.rule();
    assert_eq!(rule.frequency(), FrequencyType::Monthly);
    assert_eq!(rule.interval(), 1);
    assert_eq!(rule.end(), EndCondition::AfterOccurrences(12));
    assert_eq!(rule.start_date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    assert_eq!(rule.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(rule.reminder_days(), 3);
}

#[test]
fn every_invalid_field_is_reported() {
    let mut form = rent_form();
    form.name = "   ".into();
    form.amount = "abc".into();
    form.account_id = "nope".into();
    form.recurrence.frequency = "fortnightly".into();
    form.recurrence.start_date = "31/01/2025".into();

    let validation = form.validate();
    assert!(!validation.is_valid());
    let mut fields: Vec<_> = validation.errors().iter().map(|err| err.field).collect();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec!["account_id", "amount", "frequency", "name", "start_date"]
    );
    assert_eq!(validation.error_for("start_date"), Some("Use YYYY-MM-DD format"));
}

#[test]
fn reminder_outside_range_is_flagged() {
    let mut form = rent_form();
    form.recurrence.reminder_days = "15".into();
    let validation = form.validate();
    assert_eq!(
        validation.error_for("reminder_days"),
        Some("Reminder must be between 0 and 14 days")
    );
}

#[test]
fn after_occurrences_requires_count() {
    let mut form = rent_form();
    form.recurrence.occurrences = String::new();
    assert_eq!(
        form.validate().error_for("occurrences"),
        Some("Value is required")
    );

    form.recurrence.occurrences = "0".into();
    assert_eq!(
        form.validate().error_for("occurrences"),
        Some("Value must be at least 1")
    );

    form.recurrence.end_type = "Never".into();
    assert!(form.validate().is_valid());
}

#[test]
fn custom_frequency_uses_chosen_unit() {
    let mut form = rent_form();
    form.recurrence.frequency = "Custom".into();
    form.recurrence.custom_unit = "weeks".into();
    form.recurrence.interval = "3".into();
    let rule = form.recurrence.validate().into_result().unwrap();
    assert_eq!(rule.label(), "Every 3 Weeks");

    form.recurrence.custom_unit = "fortnight".into();
    assert!(form.recurrence.validate().error_for("custom_unit").is_some());
}

#[test]
fn amount_precision_follows_currency() {
    let mut form = rent_form();
    form.currency = "JPY".into();
    form.amount = "1500.50".into();
    assert_eq!(
        form.validate().error_for("amount"),
        Some("JPY amounts allow at most 0 decimal places")
    );
}

#[test]
fn defaults_come_from_config() {
    let config = Config {
        currency: "GBP".into(),
        default_reminder_days: 2,
        ..Config::default()
    };
    let form = ScheduledTransactionForm::with_defaults(&config);
    assert_eq!(form.currency, "GBP");
    assert_eq!(form.recurrence.reminder_days, "2");
    assert_eq!(form.recurrence.frequency, "Once");

    let errors = form.validate();
    assert!(errors.error_for("name").is_some());
    assert!(errors.error_for("start_date").is_some());
    assert!(errors.error_for("frequency").is_none());
}
