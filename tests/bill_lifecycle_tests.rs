mod common;

use common::{setup_test_env, utc};
use fina_core::{
    core::{DueStatus, MonthTotals},
    domain::{BillKind, BillSchedule, MonthPeriod, TransactionKind},
    notifications::NotificationKind,
    FinanceError,
};
use rust_decimal_macros::dec;

#[test]
fn fixed_bill_is_projected_paid_and_charged_once() {
    let env = setup_test_env(utc(2024, 1, 5, 12));
    let tracker = &env.tracker;
    let january = MonthPeriod::new(2024, 0).unwrap();

    let bill = tracker
        .bills()
        .create_fixed_or_one_time("Conta de luz", dec!(150), 10, "Energia", BillKind::Fixed, None)
        .unwrap();

    let bills = tracker.bills().list().unwrap();
    let projection = tracker.project(&bills, january);
    assert_eq!(projection.len(), 1);
    assert_eq!(projection[0].status, DueStatus::Upcoming { days: 5 });
    assert_eq!(projection[0].status.label(), "Due in 5 days");

    let outcome = tracker.pay(bill.id).unwrap();
    assert!(outcome.is_new_payment());
    let txn = outcome.transaction().unwrap();
    assert_eq!(txn.kind, TransactionKind::Expense);
    assert_eq!(txn.amount, dec!(150));
    assert_eq!(txn.category.as_deref(), Some("Energia"));
    assert_eq!(txn.bill_id, Some(bill.id));

    let bills = tracker.bills().list().unwrap();
    let projection = tracker.project(&bills, january);
    assert_eq!(projection[0].status.label(), "Paid");
    assert_eq!(tracker.balance().unwrap().total_expense, dec!(150));
}

#[test]
fn paying_twice_records_a_single_expense() {
    let env = setup_test_env(utc(2024, 3, 1, 8));
    let tracker = &env.tracker;
    let bill = tracker
        .bills()
        .create_fixed_or_one_time("Internet", dec!(99.90), 15, "Internet", BillKind::Fixed, None)
        .unwrap();

    assert!(tracker.bills().mark_paid(bill.id).unwrap().is_new_payment());
    let second = tracker.bills().mark_paid(bill.id).unwrap();
    assert!(!second.is_new_payment());
    assert!(second.bill().unwrap().is_paid);

    assert_eq!(tracker.ledger().list().unwrap().len(), 1);
    assert!(tracker.bills().get(bill.id).unwrap().unwrap().is_paid);
}

#[test]
fn paying_an_unknown_bill_changes_nothing() {
    let env = setup_test_env(utc(2024, 3, 1, 8));
    let outcome = env.tracker.pay(uuid::Uuid::new_v4()).unwrap();
    assert!(outcome.bill().is_none());
    assert!(env.tracker.ledger().list().unwrap().is_empty());
}

#[test]
fn balance_follows_every_recorded_transaction() {
    let env = setup_test_env(utc(2024, 5, 2, 10));
    let ledger = env.tracker.ledger();

    ledger
        .record("Salário", dec!(5000), TransactionKind::Income, Some("Salário"))
        .unwrap();
    let balance = env.tracker.balance().unwrap();
    assert_eq!(balance.net, dec!(5000));

    ledger
        .record("Mercado", dec!(320.45), TransactionKind::Expense, Some("Alimentação"))
        .unwrap();
    ledger
        .record("Farmácia", dec!(79.55), TransactionKind::Expense, None)
        .unwrap();

    let balance = env.tracker.balance().unwrap();
    assert_eq!(balance.total_income, dec!(5000));
    assert_eq!(balance.total_expense, dec!(400));
    assert_eq!(balance.net, balance.total_income - balance.total_expense);

    let newest = ledger.list().unwrap();
    assert_eq!(newest[0].description, "Farmácia");
}

#[test]
fn invalid_input_is_rejected_before_anything_is_stored() {
    let env = setup_test_env(utc(2024, 5, 2, 10));
    let bills = env.tracker.bills();

    let err = bills
        .create_fixed_or_one_time("Aluguel", dec!(0), 5, "Moradia", BillKind::Fixed, None)
        .unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));
    assert!(bills
        .create_fixed_or_one_time("Aluguel", dec!(1200), 32, "Moradia", BillKind::Fixed, None)
        .is_err());
    assert!(bills
        .create_fixed_or_one_time("   ", dec!(1200), 5, "Moradia", BillKind::Fixed, None)
        .is_err());
    assert!(bills
        .create_fixed_or_one_time("IPVA", dec!(800), 5, "Transporte", BillKind::OneTime, None)
        .is_err());
    assert!(bills
        .create_installment_plan("Geladeira", dec!(300), 12, "Casa", 1)
        .is_err());
    assert!(env
        .tracker
        .ledger()
        .record("Nada", dec!(-3), TransactionKind::Expense, None)
        .is_err());

    assert!(bills.list().unwrap().is_empty());
    assert!(env.tracker.ledger().list().unwrap().is_empty());
    assert!(env.scheduler.pending().is_empty());
}

#[test]
fn installment_plan_creates_one_bill_per_month() {
    let env = setup_test_env(utc(2023, 12, 3, 9));
    let plan = env
        .tracker
        .bills()
        .create_installment_plan("Notebook", dec!(450), 20, "Compras", 3)
        .unwrap();

    assert_eq!(plan.len(), 3);
    for (position, bill) in plan.iter().enumerate() {
        assert_eq!(bill.installment(), Some((position as u32 + 1, 3)));
        assert_eq!(bill.amount, dec!(450));
        assert_eq!(bill.created_at, plan[0].created_at);
        assert_eq!(bill.description, format!("Notebook ({}/3)", position + 1));
    }
    let plan_ids: Vec<_> = plan
        .iter()
        .map(|bill| match bill.schedule {
            BillSchedule::Installment { plan_id, .. } => plan_id,
            _ => panic!("expected an installment"),
        })
        .collect();
    assert!(plan_ids.iter().all(|id| *id == plan_ids[0]));

    let bills = env.tracker.bills().list().unwrap();
    for (month0, year, expected) in [
        (11, 2023, "Notebook (1/3)"),
        (0, 2024, "Notebook (2/3)"),
        (1, 2024, "Notebook (3/3)"),
    ] {
        let period = MonthPeriod::new(year, month0).unwrap();
        let projection = env.tracker.project(&bills, period);
        assert_eq!(projection.len(), 1, "{month0}/{year}");
        assert_eq!(projection[0].bill.description, expected);
    }
    assert!(env
        .tracker
        .project(&bills, MonthPeriod::new(2024, 2).unwrap())
        .is_empty());
}

#[test]
fn creating_a_bill_schedules_alerts_and_paying_cancels_them() {
    let env = setup_test_env(utc(2024, 1, 5, 12));
    let bill = env
        .tracker
        .bills()
        .create_fixed_or_one_time("Água", dec!(80), 10, "Água", BillKind::Fixed, None)
        .unwrap();

    let pending = env.scheduler.pending();
    assert_eq!(pending.len(), 3);
    let due = pending
        .iter()
        .find(|item| item.kind == NotificationKind::Due)
        .unwrap();
    assert_eq!(due.at, utc(2024, 1, 10, 9));
    let reminder = pending
        .iter()
        .find(|item| item.kind == NotificationKind::Reminder)
        .unwrap();
    assert_eq!(reminder.at, utc(2024, 1, 9, 18));
    assert!(!bill.notifications.is_empty());

    env.tracker.pay(bill.id).unwrap();
    assert!(env.scheduler.pending().is_empty());
    assert_eq!(env.scheduler.cancelled().len(), 3);
}

#[test]
fn month_totals_split_paid_and_open_amounts() {
    let env = setup_test_env(utc(2024, 4, 12, 10));
    let bills = env.tracker.bills();
    let rent = bills
        .create_fixed_or_one_time("Aluguel", dec!(1500), 5, "Moradia", BillKind::Fixed, None)
        .unwrap();
    bills
        .create_fixed_or_one_time("Escola", dec!(700), 20, "Educação", BillKind::Fixed, None)
        .unwrap();
    env.tracker.pay(rent.id).unwrap();

    let totals: MonthTotals = env.tracker.month_totals(env.tracker.current_period()).unwrap();
    assert_eq!(totals.total, dec!(2200));
    assert_eq!(totals.paid, dec!(1500));
    assert_eq!(totals.open, dec!(700));
}
