// src/models/sales.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

pub const PAYMENT_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[schema(example = "RCP-20250101-1A2B3C4D")]
    pub receipt_number: String,
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a sale. `total_price` is derived from quantity and unit price and
/// cannot be set on its own.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl SaleItem {
    pub fn priced(sale_id: Uuid, product: &Product, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            sale_id,
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            total_price: line_total(quantity, product.price),
        }
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
        self.total_price = line_total(quantity, self.unit_price);
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// --- Input ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaleItemQuantityPayload {
    #[schema(example = 3)]
    pub quantity: i32,
}

/// A validated sale, ready to be written. `lines` holds one entry per product.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_id: Option<Uuid>,
    pub user_id: Uuid,
    pub lines: Vec<(Uuid, i32)>,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

// --- Pricing rules ---

pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// `Σ line totals + tax − discount`; a discount larger than the gross is rejected.
pub fn sale_total<I>(line_totals: I, tax: Decimal, discount: Decimal) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    if tax.is_sign_negative() || discount.is_sign_negative() {
        return Err(AppError::invalid("Tax and discount cannot be negative."));
    }
    let subtotal: Decimal = line_totals.into_iter().sum();
    let total = subtotal + tax - discount;
    if total.is_sign_negative() {
        return Err(AppError::invalid("Discount cannot exceed the sale amount."));
    }
    Ok(total)
}

/// Merges duplicate product lines and returns them ordered by product id.
/// Stock rows are locked in this order, so concurrent sales never wait on each other in a cycle.
pub fn aggregate_lines(lines: &[SaleLineRequest]) -> Result<Vec<(Uuid, i32)>, AppError> {
    if lines.is_empty() {
        return Err(AppError::invalid("A sale needs at least one item."));
    }

    let mut totals: BTreeMap<Uuid, i32> = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::invalid("Item quantities must be greater than zero."));
        }
        let entry = totals.entry(line.product_id).or_insert(0);
        *entry = entry
            .checked_add(line.quantity)
            .ok_or_else(|| AppError::invalid("Item quantity is out of range."))?;
    }

    Ok(totals.into_iter().collect())
}

pub fn generate_receipt_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("RCP-{}-{}", now.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Decimal) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            category_id: None,
            name: "Roti".into(),
            description: None,
            sku: None,
            barcode: None,
            price,
            cost_price: None,
            stock_quantity: 10,
            stock_alert: 2,
            unit: "pcs".into(),
            carton_quantity: 1,
            is_active: true,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn item_total_follows_quantity() {
        let p = product(Decimal::new(1250, 2));
        let mut item = SaleItem::priced(Uuid::new_v4(), &p, 4);
        assert_eq!(item.total_price(), Decimal::new(5000, 2));

        item.set_quantity(3);
        assert_eq!(item.total_price(), item.unit_price() * Decimal::from(3));
    }

    #[test]
    fn sale_total_adds_tax_and_subtracts_discount() {
        let total = sale_total(
            [Decimal::from(100), Decimal::from(50)],
            Decimal::from(15),
            Decimal::from(5),
        )
        .unwrap();
        assert_eq!(total, Decimal::from(160));
    }

    #[test]
    fn discount_larger_than_gross_is_rejected() {
        assert!(sale_total([Decimal::from(10)], Decimal::ZERO, Decimal::from(11)).is_err());
        assert!(sale_total([Decimal::from(10)], Decimal::from(-1), Decimal::ZERO).is_err());
    }

    #[test]
    fn duplicate_lines_are_merged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let lines = vec![
            SaleLineRequest { product_id: a, quantity: 2 },
            SaleLineRequest { product_id: b, quantity: 1 },
            SaleLineRequest { product_id: a, quantity: 3 },
        ];
        let mut expected = vec![(a, 5), (b, 1)];
        expected.sort();
        assert_eq!(aggregate_lines(&lines).unwrap(), expected);
    }

    #[test]
    fn line_order_does_not_change_the_lock_order() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let forward: Vec<SaleLineRequest> = ids
            .iter()
            .map(|&product_id| SaleLineRequest { product_id, quantity: 1 })
            .collect();
        let backward: Vec<SaleLineRequest> = forward.iter().rev().cloned().collect();

        let a = aggregate_lines(&forward).unwrap();
        let b = aggregate_lines(&backward).unwrap();
        assert_eq!(a, b);
        assert!(a.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn rejects_empty_and_non_positive_lines() {
        assert!(aggregate_lines(&[]).is_err());
        let zero = [SaleLineRequest { product_id: Uuid::new_v4(), quantity: 0 }];
        assert!(aggregate_lines(&zero).is_err());
    }

    #[test]
    fn receipt_numbers_are_dated_and_distinct() {
        let now = Utc::now();
        let a = generate_receipt_number(now);
        let b = generate_receipt_number(now);
        assert!(a.starts_with(&format!("RCP-{}-", now.format("%Y%m%d"))));
        assert_ne!(a, b);
    }
}
