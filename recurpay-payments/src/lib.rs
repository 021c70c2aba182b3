//! # Itemized Payment Lines
//!
//! This crate models the itemized, tax-aware line items of a payment and
//! their aggregation into a taxed total. A [`PaymentLine`] is one priced
//! entry; [`PaymentLines`] is the ordered collection whose `amount()` is
//! the currency-checked sum of every line's total.
//!
//! The structured-data encoding round-trips losslessly: decoding an
//! encoded collection reproduces the same ordered sequence of lines.

pub mod line;
pub mod lines;

pub use line::{PaymentId, PaymentLine, PaymentLineType};
pub use lines::PaymentLines;

use recurpay_money::MoneyError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Structured data does not have the expected shape.
    #[error("invalid payment data: {0}")]
    Format(String),
    /// A monetary operation failed, e.g. summation across currencies.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
