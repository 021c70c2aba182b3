//! Itemized payment lines

use recurpay_money::{Money, TaxedMoney};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::PaymentError;

/// Identifier of the payment a rehydrated line belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a payment line.
///
/// A small fixed set of kinds, extensible by string tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentLineType {
    Product,
    Shipping,
    Fee,
    Discount,
    Tax,
    Correction,
    /// Any other kind, carried as its raw tag.
    Other(String),
}

impl From<PaymentLineType> for String {
    fn from(line_type: PaymentLineType) -> Self {
        match line_type {
            PaymentLineType::Product => "product".to_string(),
            PaymentLineType::Shipping => "shipping".to_string(),
            PaymentLineType::Fee => "fee".to_string(),
            PaymentLineType::Discount => "discount".to_string(),
            PaymentLineType::Tax => "tax".to_string(),
            PaymentLineType::Correction => "correction".to_string(),
            PaymentLineType::Other(tag) => tag,
        }
    }
}

impl From<String> for PaymentLineType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "product" => Self::Product,
            "shipping" => Self::Shipping,
            "fee" => Self::Fee,
            "discount" => Self::Discount,
            "tax" => Self::Tax,
            "correction" => Self::Correction,
            _ => Self::Other(tag),
        }
    }
}

impl fmt::Display for PaymentLineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}

/// One itemized entry of a payment.
///
/// All fields are optional except `total_amount`, which defaults to a
/// zero taxed amount. Every money field on a populated line shares the
/// currency of `total_amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentLine {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub line_type: Option<PaymentLineType>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit_price: Option<TaxedMoney>,
    /// Discount on this line, tax excluded.
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default, deserialize_with = "total_amount_or_zero")]
    pub total_amount: TaxedMoney,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    /// The payment this line was rehydrated for; not part of the encoding.
    #[serde(skip)]
    payment: Option<PaymentId>,
}

/// An absent or null `total_amount` decodes as the zero taxed amount.
fn total_amount_or_zero<'de, D>(deserializer: D) -> Result<TaxedMoney, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TaxedMoney>::deserialize(deserializer)?.unwrap_or_default())
}

impl PaymentLine {
    /// Create an empty line with a zero total amount.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the external identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the line type.
    pub fn with_line_type(mut self, line_type: PaymentLineType) -> Self {
        self.line_type = Some(line_type);
        self
    }

    /// Set the SKU.
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the quantity.
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the unit price.
    pub fn with_unit_price(mut self, unit_price: TaxedMoney) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// Set the discount amount, tax excluded.
    pub fn with_discount_amount(mut self, discount_amount: Money) -> Self {
        self.discount_amount = Some(discount_amount);
        self
    }

    /// Set the total amount.
    pub fn with_total_amount(mut self, total_amount: TaxedMoney) -> Self {
        self.total_amount = total_amount;
        self
    }

    /// Set the product URL.
    pub fn with_product_url(mut self, product_url: impl Into<String>) -> Self {
        self.product_url = Some(product_url.into());
        self
    }

    /// Set the image URL.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the product category.
    pub fn with_product_category(mut self, product_category: impl Into<String>) -> Self {
        self.product_category = Some(product_category.into());
        self
    }

    /// Get the tax on this line, derived from the total amount.
    ///
    /// Always recomputed, never stored.
    pub fn tax_amount(&self) -> Money {
        self.total_amount.tax_money()
    }

    /// Get the payment this line belongs to, if any.
    pub fn payment(&self) -> Option<&PaymentId> {
        self.payment.as_ref()
    }

    /// Associate the line with a payment.
    pub fn set_payment(&mut self, payment: PaymentId) {
        self.payment = Some(payment);
    }

    /// Encode as a structured-data object.
    ///
    /// All fields are emitted; absent optional values encode as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Decode from a structured-data object.
    ///
    /// Every field is optional; money fields decode through the
    /// `recurpay-money` contract.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Format`] when the input is not an object or
    /// a field does not have the expected shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PaymentError> {
        if !value.is_object() {
            return Err(PaymentError::Format(
                "payment line data must be an object".to_string(),
            ));
        }
        serde_json::from_value(value.clone()).map_err(|e| PaymentError::Format(e.to_string()))
    }
}

impl fmt::Display for PaymentLine {
    /// Render as "id - description - quantity", skipping unset parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quantity = self.quantity.map(|quantity| quantity.to_string());
        let parts: Vec<&str> = [
            self.id.as_deref(),
            self.description.as_deref(),
            quantity.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
        write!(f, "{}", parts.join(" - "))
    }
}
