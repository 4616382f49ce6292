use std::sync::Arc;

use chrono::NaiveDate;
use schedule_core::{
    schedule::{
        apply_actions, due_actions, EvaluatorSettings, FrequencyType, RecurrenceRule,
        ScheduleAction, ScheduleEvaluator, ScheduledStatus, ScheduledTransaction,
    },
    time::FixedClock,
    ScheduleError,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn schedule(name: &str, rule: RecurrenceRule) -> ScheduledTransaction {
    ScheduledTransaction::new(name, 100.0, Uuid::new_v4(), rule)
}

fn monthly_rent(reminder_days: u32) -> ScheduledTransaction {
    let rule = RecurrenceRule::builder(date(2025, 1, 1))
        .frequency(FrequencyType::Monthly)
        .remind_days_before(reminder_days)
        .build()
        .unwrap();
    schedule("Rent", rule)
}

fn evaluator_on(day: NaiveDate, limit: usize) -> ScheduleEvaluator {
    ScheduleEvaluator::new(
        Arc::new(FixedClock::on(day)),
        EvaluatorSettings {
            pending_window_days: 7,
            materialize_limit: limit,
        },
    )
}

#[test]
fn backlog_materializes_every_missed_occurrence() {
    let rent = monthly_rent(0);
    let actions = due_actions(std::slice::from_ref(&rent), date(2025, 3, 15), 100);
    assert_eq!(
        actions,
        vec![
            ScheduleAction::Materialize {
                schedule_id: rent.id,
                ordinal: 1,
                date: date(2025, 1, 1)
            },
            ScheduleAction::Materialize {
                schedule_id: rent.id,
                ordinal: 2,
                date: date(2025, 2, 1)
            },
            ScheduleAction::Materialize {
                schedule_id: rent.id,
                ordinal: 3,
                date: date(2025, 3, 1)
            },
        ]
    );
}

#[test]
fn reminder_fires_inside_lead_window() {
    let rent = monthly_rent(5);
    let schedules = vec![rent.clone()];

    let quiet = due_actions(&schedules, date(2025, 3, 26), 100);
    assert!(quiet
        .iter()
        .all(|action| matches!(action, ScheduleAction::Materialize { .. })));

    let actions = due_actions(&schedules, date(2025, 3, 28), 100);
    assert_eq!(actions.len(), 4);
    assert_eq!(
        actions.last(),
        Some(&ScheduleAction::Remind {
            schedule_id: rent.id,
            ordinal: 4,
            occurrence: date(2025, 4, 1),
            remind_on: date(2025, 3, 27),
        })
    );
}

#[test]
fn reminder_precedes_first_occurrence() {
    let rule = RecurrenceRule::builder(date(2025, 1, 6))
        .frequency(FrequencyType::Weekly)
        .remind_days_before(2)
        .build()
        .unwrap();
    let gym = schedule("Gym", rule);
    let actions = due_actions(std::slice::from_ref(&gym), date(2025, 1, 4), 100);
    assert_eq!(
        actions,
        vec![ScheduleAction::Remind {
            schedule_id: gym.id,
            ordinal: 1,
            occurrence: date(2025, 1, 6),
            remind_on: date(2025, 1, 4),
        }]
    );
}

#[test]
fn limit_defers_remaining_backlog() {
    let daily = RecurrenceRule::builder(date(2025, 1, 1))
        .frequency(FrequencyType::Daily)
        .build()
        .unwrap();
    let mut schedules = vec![schedule("Coffee", daily)];
    let evaluator = evaluator_on(date(2025, 1, 10), 4);

    let first = evaluator.run(&mut schedules).unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(schedules[0].fired(), 4);

    evaluator.run(&mut schedules).unwrap();
    assert_eq!(schedules[0].fired(), 8);

    let last = evaluator.run(&mut schedules).unwrap();
    assert_eq!(last.len(), 2);
    assert_eq!(schedules[0].fired(), 10);
    assert_eq!(schedules[0].last_fired(), Some(date(2025, 1, 10)));

    assert!(evaluator.run(&mut schedules).unwrap().is_empty());
}

#[test]
fn paused_and_exhausted_schedules_are_skipped() {
    let mut paused = monthly_rent(0);
    paused.pause();
    let limited = RecurrenceRule::builder(date(2025, 1, 1))
        .frequency(FrequencyType::Monthly)
        .after_occurrences(2)
        .remind_days_before(3)
        .build()
        .unwrap();
    let limited = schedule("Loan", limited);
    let schedules = vec![paused, limited.clone()];

    let actions = due_actions(&schedules, date(2025, 6, 1), 100);
    assert_eq!(actions.len(), 2);
    assert!(actions.iter().all(|action| action.schedule_id() == limited.id));
}

#[test]
fn apply_rejects_unknown_schedule() {
    let mut schedules = vec![monthly_rent(0)];
    let stray = Uuid::new_v4();
    let actions = vec![ScheduleAction::Materialize {
        schedule_id: stray,
        ordinal: 1,
        date: date(2025, 1, 1),
    }];
    assert_eq!(
        apply_actions(&mut schedules, &actions),
        Err(ScheduleError::UnknownSchedule(stray))
    );
}

#[test]
fn applied_reminder_is_recorded_without_firing() {
    let mut schedules = vec![monthly_rent(5)];
    let actions = due_actions(&schedules, date(2024, 12, 28), 100);
    assert_eq!(actions.len(), 1);
    assert_eq!(apply_actions(&mut schedules, &actions), Ok(1));
    assert_eq!(schedules[0].fired(), 0);
    assert_eq!(schedules[0].last_reminded(), Some(1));
}

#[test]
fn reminder_sent_once_across_consecutive_days() {
    let rule = RecurrenceRule::builder(date(2025, 3, 1))
        .frequency(FrequencyType::Monthly)
        .remind_days_before(5)
        .build()
        .unwrap();
    let mut schedules = vec![schedule("Phone", rule)];

    let mut reminders = Vec::new();
    let mut day = date(2025, 2, 24);
    while day <= date(2025, 2, 28) {
        let actions = evaluator_on(day, 100).run(&mut schedules).unwrap();
        reminders.extend(
            actions
                .into_iter()
                .filter(|action| matches!(action, ScheduleAction::Remind { .. })),
        );
        day = day.succ_opt().unwrap();
    }
    assert_eq!(
        reminders,
        vec![ScheduleAction::Remind {
            schedule_id: schedules[0].id,
            ordinal: 1,
            occurrence: date(2025, 3, 1),
            remind_on: date(2025, 2, 24),
        }]
    );

    // The next occurrence gets its own reminder.
    let actions = evaluator_on(date(2025, 3, 27), 100)
        .run(&mut schedules)
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(schedules[0].fired(), 1);
    assert_eq!(schedules[0].last_reminded(), Some(2));
}

#[test]
fn failed_apply_leaves_schedules_untouched() {
    let first = monthly_rent(0);
    let mut second = monthly_rent(0);
    second.id = first.id;
    let mut schedules = vec![first.clone(), second];
    let before = schedules.clone();

    let actions = vec![
        ScheduleAction::Materialize {
            schedule_id: first.id,
            ordinal: 1,
            date: date(2025, 1, 1),
        },
        ScheduleAction::Materialize {
            schedule_id: first.id,
            ordinal: 1,
            date: date(2025, 1, 1),
        },
    ];
    assert!(matches!(
        apply_actions(&mut schedules, &actions),
        Err(ScheduleError::OutOfSequence { .. })
    ));
    assert_eq!(schedules, before);
}

#[test]
fn snapshots_sort_by_next_due() {
    let mut done = schedule("Deposit", RecurrenceRule::once(date(2025, 1, 2)));
    done.mark_fired(date(2025, 1, 2)).unwrap();
    let rent = monthly_rent(3);
    let weekly = schedule(
        "Groceries",
        RecurrenceRule::builder(date(2025, 1, 20))
            .frequency(FrequencyType::Weekly)
            .build()
            .unwrap(),
    );
    let schedules = vec![done.clone(), weekly.clone(), rent.clone()];

    let evaluator = evaluator_on(date(2025, 1, 15), 100);
    let snapshots = evaluator.snapshots(&schedules);
    let order: Vec<_> = snapshots.iter().map(|snap| snap.schedule_id).collect();
    assert_eq!(order, vec![rent.id, weekly.id, done.id]);

    assert_eq!(snapshots[0].status, Some(ScheduledStatus::Overdue));
    assert_eq!(snapshots[0].reminder_on, Some(date(2024, 12, 29)));
    assert_eq!(snapshots[1].status, Some(ScheduledStatus::Pending));
    assert_eq!(snapshots[1].label, "Weekly");
    assert_eq!(snapshots[2].next_due, None);
    assert!(snapshots[2].exhausted);
    assert_eq!(snapshots[2].remaining, Some(0));
}

#[test]
fn cadence_change_restarts_counting() {
    let mut rent = monthly_rent(0);
    let evaluator = evaluator_on(date(2025, 2, 10), 100);
    let mut schedules = vec![rent.clone()];
    evaluator.run(&mut schedules).unwrap();
    assert_eq!(schedules[0].fired(), 2);

    rent = schedules.remove(0);
    rent.update_rule(schedule_core::schedule::RuleUpdate {
        start_date: Some(date(2025, 2, 15)),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(rent.fired(), 0);
    assert_eq!(rent.next_due(), Some(date(2025, 2, 15)));
}
