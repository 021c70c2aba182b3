//! Fixed-point monetary values with an explicit currency and tax component
//!
//! This crate provides the `Money` and `TaxedMoney` value types consumed by
//! the payment and subscription crates. **NEVER use f64 for financial
//! calculations!**
//!
//! # Overview
//!
//! - Uses `Decimal` internally (28-29 significant digits)
//! - All arithmetic is exact (no rounding errors)
//! - Addition is currency-checked and fails on mismatched currencies
//! - Serializes amounts as strings (preserves precision)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Errors raised by monetary operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies cannot be combined.
    #[error("currency mismatch: {left} and {right}")]
    CurrencyMismatch {
        /// Currency of the left-hand amount.
        left: Currency,
        /// Currency of the right-hand amount.
        right: Currency,
    },
    /// Structured data does not have the expected shape.
    #[error("invalid money data: {0}")]
    Format(String),
}

/// An alphabetic currency code (ISO 4217, e.g. "EUR").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(pub String);

impl Currency {
    /// Create a currency from an alphabetic code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the alphabetic code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("EUR".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-point monetary amount in a specific currency.
///
/// # Examples
///
/// ```rust
/// use recurpay_money::{Currency, Money};
/// use rust_decimal_macros::dec;
///
/// let a = Money::new(dec!(10.00), Currency::new("EUR"));
/// let b = Money::new(dec!(2.50), Currency::new("EUR"));
/// let sum = a.try_add(&b).unwrap();
/// assert_eq!(sum.value(), dec!(12.50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    value: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a new amount.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Get the zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            value: Decimal::ZERO,
            currency,
        }
    }

    /// Get the numeric value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Get the currency.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Add another amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] when the currencies differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(Self {
            value: self.value.saturating_add(other.value),
            currency: self.currency.clone(),
        })
    }

    /// Encode as a structured-data object.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "value": self.value,
            "currency": self.currency,
        })
    }

    /// Decode from a structured-data object.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Format`] when the input is not an object with
    /// `value` and `currency` fields.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MoneyError> {
        if !value.is_object() {
            return Err(MoneyError::Format("money data must be an object".to_string()));
        }
        serde_json::from_value(value.clone()).map_err(|e| MoneyError::Format(e.to_string()))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(Currency::default())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// A monetary amount decomposed into a base value and its tax component.
///
/// The tax component is part of the value, not added on top: a total of
/// 24.20 with tax 4.20 means 20.00 excluding tax.
///
/// # Examples
///
/// ```rust
/// use recurpay_money::{Currency, TaxedMoney};
/// use rust_decimal_macros::dec;
///
/// let total = TaxedMoney::new(dec!(24.20), dec!(4.20), Currency::new("EUR"));
/// assert_eq!(total.value(), dec!(24.20));
/// assert_eq!(total.tax_value(), dec!(4.20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedMoney {
    value: Decimal,
    #[serde(default)]
    tax_value: Decimal,
    currency: Currency,
}

impl TaxedMoney {
    /// Create a new taxed amount.
    pub fn new(value: Decimal, tax_value: Decimal, currency: Currency) -> Self {
        Self {
            value,
            tax_value,
            currency,
        }
    }

    /// Get the zero taxed amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            value: Decimal::ZERO,
            tax_value: Decimal::ZERO,
            currency,
        }
    }

    /// Create from a plain amount with no tax component.
    pub fn from_money(money: Money) -> Self {
        Self {
            value: money.value,
            tax_value: Decimal::ZERO,
            currency: money.currency,
        }
    }

    /// Get the numeric value, tax included.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Get the tax component of the value.
    pub fn tax_value(&self) -> Decimal {
        self.tax_value
    }

    /// Get the currency.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Get the tax component as a plain amount in the same currency.
    pub fn tax_money(&self) -> Money {
        Money::new(self.tax_value, self.currency.clone())
    }

    /// Drop the tax decomposition.
    pub fn into_money(self) -> Money {
        Money::new(self.value, self.currency)
    }

    /// Add another taxed amount in the same currency.
    ///
    /// Values and tax components are summed independently.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] when the currencies differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(Self {
            value: self.value.saturating_add(other.value),
            tax_value: self.tax_value.saturating_add(other.tax_value),
            currency: self.currency.clone(),
        })
    }

    /// Encode as a structured-data object.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "value": self.value,
            "tax_value": self.tax_value,
            "currency": self.currency,
        })
    }

    /// Decode from a structured-data object.
    ///
    /// A missing `tax_value` decodes as zero tax.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Format`] when the input is not an object with
    /// `value` and `currency` fields.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MoneyError> {
        if !value.is_object() {
            return Err(MoneyError::Format(
                "taxed money data must be an object".to_string(),
            ));
        }
        serde_json::from_value(value.clone()).map_err(|e| MoneyError::Format(e.to_string()))
    }
}

impl Default for TaxedMoney {
    fn default() -> Self {
        Self::zero(Currency::default())
    }
}

impl fmt::Display for TaxedMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}
