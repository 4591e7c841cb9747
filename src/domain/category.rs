//! Advisory category catalog. Categories on records remain free text.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Bill,
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub kind: CategoryKind,
}

pub const BILL_CATEGORIES: [&str; 8] = [
    "Aluguel",
    "Energia",
    "Água",
    "Internet",
    "Telefone",
    "Cartão",
    "Financiamento",
    "Seguro",
];

pub const INCOME_CATEGORIES: [&str; 7] = [
    "Salário",
    "Freelance",
    "Investimentos",
    "Vendas",
    "Bonificação",
    "Prêmio",
    "Aluguel Recebido",
];

pub const EXPENSE_CATEGORIES: [&str; 6] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Lazer",
];

/// Every default category, grouped bill, income, expense.
pub fn default_catalog() -> Vec<Category> {
    let bills = BILL_CATEGORIES.iter().map(|&name| Category {
        name,
        kind: CategoryKind::Bill,
    });
    let income = INCOME_CATEGORIES.iter().map(|&name| Category {
        name,
        kind: CategoryKind::Income,
    });
    let expense = EXPENSE_CATEGORIES.iter().map(|&name| Category {
        name,
        kind: CategoryKind::Expense,
    });
    bills.chain(income).chain(expense).collect()
}

pub fn categories_of(kind: CategoryKind) -> Vec<&'static str> {
    default_catalog()
        .into_iter()
        .filter(|category| category.kind == kind)
        .map(|category| category.name)
        .collect()
}
