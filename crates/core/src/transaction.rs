//! # Transaction Module
//!
//! A transaction is a balanced set of payments recorded against a group.
//! Amounts use `rust_decimal::Decimal` so the zero-sum check is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::group::Group;
use crate::validator::{self, Validator};

/// One signed leg of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Decimal,
    pub payer: String,
}

impl Payment {
    pub fn new(amount: Decimal, payer: impl Into<String>) -> Self {
        Self {
            amount,
            payer: payer.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store on insert
    pub id: i64,
    pub title: String,
    pub payments: Vec<Payment>,
    /// Owning group, fixed at creation
    pub group_id: i64,
    /// Optimistic concurrency counter, independent of the group's
    pub version: i64,
}

impl Transaction {
    /// Unsaved transaction; `id` and `version` are filled in by the store
    pub fn new(title: impl Into<String>, payments: Vec<Payment>, group_id: i64) -> Self {
        Self {
            id: 0,
            title: title.into(),
            payments,
            group_id,
            version: 0,
        }
    }

    /// Sum of all payment amounts, `None` if it overflows `Decimal`
    pub fn balance(&self) -> Option<Decimal> {
        self.payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.amount))
    }

    pub fn payers(&self) -> Vec<&str> {
        self.payments.iter().map(|p| p.payer.as_str()).collect()
    }
}

/// Check a transaction against the group it is recorded in.
///
/// Runs before any store call; the store itself does not enforce these rules.
pub fn validate_transaction(v: &mut Validator, transaction: &Transaction, group: &Group) {
    v.check(
        validator::is_short_text(&transaction.title),
        "title",
        "must be 3-50 characters long and contain only letters, numbers, spaces, hyphens, and underscores",
    );

    for payment in &transaction.payments {
        v.check(
            group.has_user(&payment.payer),
            "payments",
            format!("{} not one of the group users", payment.payer),
        );
    }
    v.check(
        validator::unique(&transaction.payers()),
        "payments",
        "must not contain duplicate payers",
    );
    match transaction.balance() {
        Some(sum) => v.check(sum.is_zero(), "payments", "sum of all payments must be 0"),
        None => v.add_error("payments", "sum of all payments is out of range"),
    }

    v.check(
        transaction.group_id == group.id,
        "group_id",
        "must be same as the id of the group",
    );
}
