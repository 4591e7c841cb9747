use chrono::{NaiveDate, TimeZone, Utc};
use fina_core::{
    core::{projection::project, DueStatus, ProjectionEngine, Urgency},
    domain::{Bill, BillSchedule, MonthPeriod, NotificationHandles},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bill(created: NaiveDate, due_day: u8, schedule: BillSchedule) -> Bill {
    Bill {
        id: Uuid::new_v4(),
        description: "Conta".into(),
        amount: dec!(100.00),
        due_day,
        category: "Outros".into(),
        created_at: Utc.from_utc_datetime(&created.and_hms_opt(14, 30, 0).unwrap()),
        is_paid: false,
        paid_at: None,
        schedule,
        notifications: NotificationHandles::default(),
    }
}

fn members(bills: &[Bill], month0: u32, year: i32) -> usize {
    project(bills, month0, year, date(2030, 1, 1)).unwrap().len()
}

#[test]
fn fixed_bill_recurs_from_its_creation_month() {
    let bills = vec![bill(date(2024, 3, 18), 10, BillSchedule::Fixed)];

    assert_eq!(members(&bills, 1, 2024), 0);
    assert_eq!(members(&bills, 2, 2024), 1);
    assert_eq!(members(&bills, 11, 2024), 1);
    assert_eq!(members(&bills, 0, 2025), 1);
    assert_eq!(members(&bills, 5, 2031), 1);
    assert_eq!(members(&bills, 11, 2023), 0);
}

#[test]
fn installments_wrap_into_the_next_year() {
    let plan_id = Uuid::new_v4();
    let bills: Vec<Bill> = (1..=3)
        .map(|index| {
            bill(
                date(2023, 12, 1),
                5,
                BillSchedule::Installment {
                    plan_id,
                    index,
                    count: 3,
                },
            )
        })
        .collect();

    let in_month = |month0, year| -> Vec<u32> {
        project(&bills, month0, year, date(2030, 1, 1))
            .unwrap()
            .iter()
            .filter_map(|item| item.bill.installment().map(|(index, _)| index))
            .collect()
    };
    assert_eq!(in_month(11, 2023), vec![1]);
    assert_eq!(in_month(0, 2024), vec![2]);
    assert_eq!(in_month(1, 2024), vec![3]);
    assert!(in_month(2, 2024).is_empty());
    assert!(in_month(10, 2023).is_empty());
}

#[test]
fn one_time_bill_belongs_only_to_its_due_month() {
    let bills = vec![bill(
        date(2024, 1, 20),
        15,
        BillSchedule::OneTime {
            due_date: date(2024, 7, 15),
        },
    )];

    assert_eq!(members(&bills, 6, 2024), 1);
    for (month0, year) in [(0, 2024), (5, 2024), (7, 2024), (6, 2023), (6, 2025)] {
        assert_eq!(members(&bills, month0, year), 0, "{month0}/{year}");
    }
}

#[test]
fn statuses_follow_the_reference_date() {
    let engine = ProjectionEngine::default();
    let created = date(2024, 1, 1);
    let bills = vec![
        bill(created, 5, BillSchedule::Fixed),
        bill(created, 12, BillSchedule::Fixed),
        bill(created, 14, BillSchedule::Fixed),
        bill(created, 25, BillSchedule::Fixed),
    ];
    let today = date(2024, 5, 12);
    let may = MonthPeriod::new(2024, 4).unwrap();

    let labels: Vec<(DueStatus, String)> = engine
        .project(&bills, may, today)
        .iter()
        .map(|item| (item.status, item.status.label()))
        .collect();
    assert_eq!(labels[0], (DueStatus::Overdue { days: 7 }, "Overdue".to_string()));
    assert_eq!(labels[1], (DueStatus::DueToday, "Due today".to_string()));
    assert_eq!(labels[2], (DueStatus::DueSoon { days: 2 }, "Due in 2 days".to_string()));
    assert_eq!(labels[3], (DueStatus::Upcoming { days: 13 }, "Due in 13 days".to_string()));
    assert_eq!(labels[0].0.urgency(), Urgency::Critical);
    assert_eq!(labels[2].0.urgency(), Urgency::Warning);

    let june = engine.project(&bills, may.next(), today);
    assert!(june
        .iter()
        .all(|item| item.status.urgency() == Urgency::Neutral));
    assert_eq!(june[3].status.label(), "Due day 25");
}

#[test]
fn paid_bills_are_paid_in_any_month() {
    let mut paid = bill(date(2024, 1, 1), 5, BillSchedule::Fixed);
    paid.is_paid = true;
    let bills = vec![paid];
    let projection = project(&bills, 8, 2024, date(2024, 2, 10)).unwrap();
    assert_eq!(projection[0].status, DueStatus::Paid);
}

#[test]
fn due_day_past_month_end_is_clamped() {
    let bills = vec![bill(date(2024, 1, 1), 31, BillSchedule::Fixed)];
    let projection = project(&bills, 1, 2024, date(2024, 2, 27)).unwrap();
    assert_eq!(projection[0].due_date, date(2024, 2, 29));
    assert_eq!(projection[0].status, DueStatus::DueSoon { days: 2 });

    let april = project(&bills, 3, 2023, date(2024, 2, 27)).unwrap();
    assert!(april.is_empty());
    let april = project(&bills, 3, 2024, date(2024, 4, 1)).unwrap();
    assert_eq!(april[0].due_date, date(2024, 4, 30));
}

#[test]
fn out_of_range_month_is_rejected() {
    let bills = vec![bill(date(2024, 1, 1), 5, BillSchedule::Fixed)];
    assert!(project(&bills, 12, 2024, date(2024, 1, 1)).is_err());
}
