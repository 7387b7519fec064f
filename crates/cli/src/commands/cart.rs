//! Local cart editing.
//!
//! The cart lives in a directory on disk, one JSON file per storage key,
//! in the same format the apps persist.

use std::path::Path;

use marketplace_core::cart::{CartProduct, CartStore};
use marketplace_core::{CurrencyCode, Price, ProductId, SellerId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::storage::FileCartStorage;

/// Errors from cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("Price must not be negative: {0}")]
    NegativePrice(Decimal),
}

pub type FileCart = CartStore<FileCartStorage>;

/// Open the cart stored under `dir`.
pub fn open(dir: &Path) -> FileCart {
    CartStore::open(FileCartStorage::new(dir))
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns `CartCommandError::NegativePrice` for a negative price.
pub fn add(
    cart: &mut FileCart,
    id: String,
    name: String,
    price: Decimal,
    quantity: u32,
    seller: Option<String>,
) -> Result<(), CartCommandError> {
    if price.is_sign_negative() {
        return Err(CartCommandError::NegativePrice(price));
    }
    let mut product = CartProduct::new(ProductId::new(id), name, price);
    product.seller_id = seller.map(SellerId::new);
    cart.add_item(product, quantity);
    Ok(())
}

pub fn remove(cart: &mut FileCart, id: &str) {
    cart.remove_item(&ProductId::new(id));
}

pub fn set(cart: &mut FileCart, id: &str, quantity: i64) {
    cart.update_quantity(&ProductId::new(id), quantity);
}

fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}

/// Print the cart lines and totals.
#[allow(clippy::print_stdout)]
pub fn print(cart: &FileCart) {
    if cart.items().is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>3} x {:<30} {:>10}  ({})",
            item.quantity,
            item.name,
            money(item.line_total()),
            item.id
        );
    }

    let totals = cart.totals();
    println!("{}", "-".repeat(50));
    println!("Items:    {}", totals.item_count);
    println!("Subtotal: {}", money(totals.subtotal));
    println!("Tax:      {}", money(totals.tax));
    println!("Total:    {}", money(totals.total));
}
