mod common;

use std::{fs, sync::Arc};

use common::{open_tracker, setup_test_env, temp_dir, utc};
use fina_core::{
    backup::{read_from_path, write_to_path, BackupDocument, BackupManager, BACKUP_VERSION},
    core::{FixedClock, Theme},
    domain::{BillKind, Transaction, TransactionKind},
    notifications::RecordingScheduler,
    storage::{Collections, JsonFileStore},
    FinanceError,
};
use rust_decimal_macros::dec;

#[test]
fn data_survives_reopening_the_store() {
    let env = setup_test_env(utc(2024, 2, 10, 15));
    env.tracker
        .ledger()
        .record("Freela", dec!(1200), TransactionKind::Income, Some("Freelance"))
        .unwrap();
    let bill = env
        .tracker
        .bills()
        .create_fixed_or_one_time("Academia", dec!(89.90), 25, "Saúde", BillKind::Fixed, None)
        .unwrap();
    env.tracker.pay(bill.id).unwrap();
    env.tracker.set_theme(Theme::Light).unwrap();

    let reopened = env.reopen();
    assert!(reopened.startup_report().is_clean());
    assert_eq!(reopened.ledger().list().unwrap().len(), 2);
    let stored = reopened.bills().get(bill.id).unwrap().unwrap();
    assert!(stored.is_paid);
    assert_eq!(stored.amount, dec!(89.90));
    assert_eq!(reopened.theme().unwrap(), Theme::Light);
    assert_eq!(reopened.balance().unwrap().net, dec!(1110.10));
}

#[test]
fn store_file_keeps_logical_keys() {
    let env = setup_test_env(utc(2024, 2, 10, 15));
    env.tracker
        .bills()
        .create_fixed_or_one_time("Aluguel", dec!(1500), 5, "Moradia", BillKind::Fixed, None)
        .unwrap();

    let raw = fs::read_to_string(env.data_file()).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let bills: serde_json::Value =
        serde_json::from_str(document["entries"]["bills"].as_str().unwrap()).unwrap();
    assert_eq!(bills[0]["description"], "Aluguel");
    assert_eq!(bills[0]["billKind"], "fixed");
}

#[test]
fn payment_without_bill_flag_is_repaired_on_open() {
    let env = setup_test_env(utc(2024, 6, 1, 9));
    let bill = env
        .tracker
        .bills()
        .create_fixed_or_one_time("Condomínio", dec!(430), 8, "Moradia", BillKind::Fixed, None)
        .unwrap();

    // A payment transaction written without the matching bill update.
    let store = Arc::new(JsonFileStore::new(env.data_file()).unwrap());
    let collections = Collections::new(store);
    let payment = Transaction::for_bill_payment(&bill, utc(2024, 6, 2, 10));
    collections.save_transactions(&[payment.clone()]).unwrap();

    let reopened = env.reopen();
    assert_eq!(reopened.startup_report().repaired_bills, vec![bill.id]);
    let repaired = reopened.bills().get(bill.id).unwrap().unwrap();
    assert!(repaired.is_paid);
    assert_eq!(repaired.paid_at, Some(payment.occurred_at));

    // Paying again must not charge a second time.
    assert!(!reopened.pay(bill.id).unwrap().is_new_payment());
    assert_eq!(reopened.ledger().list().unwrap().len(), 1);
}

#[test]
fn backup_restores_both_collections_wholesale() {
    let env = setup_test_env(utc(2024, 9, 3, 20));
    env.tracker
        .ledger()
        .record("Venda", dec!(250), TransactionKind::Income, None)
        .unwrap();
    env.tracker
        .bills()
        .create_installment_plan("Sofá", dec!(399.90), 12, "Casa", 4)
        .unwrap();

    let document = env.tracker.export_backup().unwrap();
    assert_eq!(document.version, BACKUP_VERSION);
    assert_eq!(document.export_date, utc(2024, 9, 3, 20));

    let manager = BackupManager::new(env.base.join("backups"), 5).unwrap();
    let name = manager.create(&document, Some("antes da limpeza")).unwrap();
    assert!(name.starts_with("fina_backup_20240903_200000"));
    assert_eq!(manager.list().unwrap(), vec![name.clone()]);

    env.tracker.clear_all().unwrap();
    assert!(env.tracker.bills().list().unwrap().is_empty());

    let other = setup_test_env(utc(2024, 9, 4, 8));
    other
        .tracker
        .ledger()
        .record("Será substituída", dec!(10), TransactionKind::Expense, None)
        .unwrap();
    let report = other.tracker.import_backup(&manager.load(&name).unwrap()).unwrap();
    assert!(report.is_clean());

    let restored = other.tracker.ledger().list().unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].description, "Venda");
    assert_eq!(other.tracker.bills().list().unwrap().len(), 4);
}

#[test]
fn backups_breaking_record_rules_are_refused_whole() {
    let env = setup_test_env(utc(2024, 9, 3, 20));
    env.tracker
        .ledger()
        .record("Venda", dec!(250), TransactionKind::Income, None)
        .unwrap();
    env.tracker
        .bills()
        .create_installment_plan("Sofá", dec!(399.90), 12, "Casa", 2)
        .unwrap();
    env.tracker
        .bills()
        .create_fixed_or_one_time(
            "IPTU",
            dec!(1200),
            15,
            "Impostos",
            BillKind::OneTime,
            Some(chrono::NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()),
        )
        .unwrap();
    let valid = serde_json::to_value(env.tracker.export_backup().unwrap()).unwrap();
    assert!(BackupDocument::from_json(&valid.to_string()).is_ok());

    let broken = [
        "negative bill amount",
        "zero due day",
        "due day past 31",
        "blank description",
        "blank category",
        "installment past count",
        "installment zero",
        "single installment plan",
        "one-time day mismatch",
        "duplicate bill id",
        "negative income",
        "sub-cent amount",
        "duplicate transaction id",
    ];

    let target = setup_test_env(utc(2024, 9, 4, 8));
    target
        .tracker
        .ledger()
        .record("Mantida", dec!(10), TransactionKind::Expense, None)
        .unwrap();
    for case in broken {
        let mut raw = valid.clone();
        corrupt(&mut raw, case);
        assert!(
            matches!(
                BackupDocument::from_json(&raw.to_string()),
                Err(FinanceError::Validation(_))
            ),
            "{case}"
        );
        let document: BackupDocument = serde_json::from_value(raw).unwrap();
        assert!(
            matches!(target.tracker.import_backup(&document), Err(FinanceError::Validation(_))),
            "{case}"
        );
    }

    let kept = target.tracker.ledger().list().unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].description, "Mantida");
    assert!(target.tracker.bills().list().unwrap().is_empty());
}

fn corrupt(doc: &mut serde_json::Value, case: &str) {
    use serde_json::json;
    let first_bill = &mut doc["bills"][0];
    match case {
        "negative bill amount" => first_bill["amount"] = json!("-10"),
        "zero due day" => first_bill["dueDay"] = json!(0),
        "due day past 31" => first_bill["dueDay"] = json!(200),
        "blank description" => first_bill["description"] = json!(" "),
        "blank category" => first_bill["category"] = json!(""),
        "installment past count" => first_bill["installmentIndex"] = json!(9),
        "installment zero" => first_bill["installmentIndex"] = json!(0),
        "single installment plan" => {
            first_bill["installmentIndex"] = json!(1);
            first_bill["installmentCount"] = json!(1);
        }
        "one-time day mismatch" => doc["bills"][2]["dueDay"] = json!(14),
        "duplicate bill id" => {
            let id = first_bill["id"].clone();
            doc["bills"][1]["id"] = id;
        }
        "negative income" => doc["transactions"][0]["amount"] = json!("-50"),
        "sub-cent amount" => doc["transactions"][0]["amount"] = json!("1.005"),
        "duplicate transaction id" => {
            let copy = doc["transactions"][0].clone();
            if let Some(items) = doc["transactions"].as_array_mut() {
                items.push(copy);
            }
        }
        other => panic!("unknown case {other}"),
    }
}

#[test]
fn backup_file_uses_camel_case_fields() {
    let env = setup_test_env(utc(2024, 9, 3, 20));
    env.tracker
        .bills()
        .create_fixed_or_one_time(
            "IPTU",
            dec!(1200),
            15,
            "Impostos",
            BillKind::OneTime,
            Some(chrono::NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()),
        )
        .unwrap();
    let path = temp_dir().join("manual").join("backup.json");
    write_to_path(&env.tracker.export_backup().unwrap(), &path).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["exportDate"].is_string());
    assert_eq!(raw["version"], "1.0");
    assert_eq!(raw["bills"][0]["dueDate"], "2024-11-15");

    let document = read_from_path(&path).unwrap();
    assert_eq!(document.bills.len(), 1);
}

#[test]
fn loading_a_missing_backup_is_not_found() {
    let manager = BackupManager::new(temp_dir(), 3).unwrap();
    assert!(manager.load("fina_backup_20200101_000000.json").is_err());
    assert!(manager.load("../fina.json").is_err());
}

#[test]
fn csv_export_writes_both_tables() {
    let env = setup_test_env(utc(2024, 10, 7, 11));
    env.tracker
        .ledger()
        .record("Salário, outubro", dec!(4200), TransactionKind::Income, Some("Salário"))
        .unwrap();
    let bill = env
        .tracker
        .bills()
        .create_fixed_or_one_time("Energia", dec!(150), 10, "Energia", BillKind::Fixed, None)
        .unwrap();
    env.tracker.pay(bill.id).unwrap();

    let dir = temp_dir().join("exports");
    let files = env
        .tracker
        .export_csv()
        .unwrap()
        .write_csv_files(&dir, env.tracker.today())
        .unwrap();
    assert!(files.transactions.ends_with("transacoes_2024-10-07.csv"));
    assert!(files.bills.ends_with("contas_2024-10-07.csv"));

    let transactions = fs::read_to_string(&files.transactions).unwrap();
    let mut lines = transactions.lines();
    assert_eq!(
        lines.next().unwrap(),
        r#""Tipo","Descrição","Valor","Categoria","Data""#
    );
    assert!(transactions.contains(r#""Despesa","Energia",150.00,"Energia","07/10/2024""#));
    assert!(transactions.contains(r#""Salário, outubro""#));

    let bills = fs::read_to_string(&files.bills).unwrap();
    assert!(bills.contains(r#""Energia",150.00,10,"Energia","Fixa","Pago""#));
}

#[test]
fn reopened_tracker_shares_the_same_file() {
    let base = temp_dir();
    let clock = Arc::new(FixedClock::new(utc(2024, 1, 1, 0)));
    let scheduler = Arc::new(RecordingScheduler::denied());
    let path = base.join("nested").join("fina.json");

    let first = open_tracker(&path, clock.clone(), scheduler.clone());
    let bill = first
        .bills()
        .create_fixed_or_one_time("Seguro", dec!(210), 28, "Seguros", BillKind::Fixed, None)
        .unwrap();
    assert!(bill.notifications.is_empty());

    let second = open_tracker(&path, clock, scheduler);
    assert_eq!(second.bills().list().unwrap()[0].id, bill.id);
}
