//! Ordered collections of payment lines

use recurpay_money::{Currency, TaxedMoney};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{PaymentError, PaymentId, PaymentLine};

/// Ordered collection of payment lines.
///
/// Line order is insertion order and reflects invoice presentation order.
/// Lines are appended during assembly and never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentLines {
    lines: Vec<PaymentLine>,
}

impl PaymentLines {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn add_line(&mut self, line: PaymentLine) {
        self.lines.push(line);
    }

    /// Append a fresh empty line and return it for further mutation.
    pub fn new_line(&mut self) -> &mut PaymentLine {
        let index = self.lines.len();
        self.lines.push(PaymentLine::new());
        &mut self.lines[index]
    }

    /// Number of lines.
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Check if the collection has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PaymentLine> {
        self.lines.iter()
    }

    /// Total amount of all lines.
    ///
    /// Folds left-to-right over every line's total amount. The empty
    /// collection sums to the zero taxed amount in the default currency.
    ///
    /// # Errors
    ///
    /// Fails with the underlying currency-mismatch error when lines carry
    /// different currencies; callers must keep a collection
    /// currency-homogeneous.
    pub fn amount(&self) -> Result<TaxedMoney, PaymentError> {
        let mut iter = self.lines.iter();
        let Some(first) = iter.next() else {
            return Ok(TaxedMoney::zero(Currency::default()));
        };
        let mut total = first.total_amount.clone();
        for line in iter {
            total = total.try_add(&line.total_amount)?;
        }
        Ok(total)
    }

    /// Encode as a structured-data list of line objects.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Decode from a structured-data list.
    ///
    /// When a payment context is supplied, every rehydrated line is
    /// associated with that payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Format`] when the input is not a list or an
    /// element does not decode as a payment line.
    pub fn from_json(
        value: &serde_json::Value,
        payment: Option<&PaymentId>,
    ) -> Result<Self, PaymentError> {
        let items = value.as_array().ok_or_else(|| {
            PaymentError::Format("payment lines data must be an array".to_string())
        })?;

        let mut collection = Self::new();
        for item in items {
            let mut line = PaymentLine::from_json(item)?;
            if let Some(payment) = payment {
                line.set_payment(payment.clone());
            }
            collection.add_line(line);
        }

        tracing::trace!(count = collection.count(), "rehydrated payment lines");

        Ok(collection)
    }
}

impl IntoIterator for PaymentLines {
    type Item = PaymentLine;
    type IntoIter = std::vec::IntoIter<PaymentLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a PaymentLines {
    type Item = &'a PaymentLine;
    type IntoIter = std::slice::Iter<'a, PaymentLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl FromIterator<PaymentLine> for PaymentLines {
    fn from_iter<I: IntoIterator<Item = PaymentLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for PaymentLines {
    /// Render one line per payment line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces: Vec<String> = self.lines.iter().map(PaymentLine::to_string).collect();
        write!(f, "{}", pieces.join("\n"))
    }
}
