//! The shopping cart.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s with at most one entry per
//! product. It is pure data: fetching stock and persisting the cart are the
//! cart store's job.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// A product in the cart together with the quantity being bought.
///
/// Serializes flat, the way the storefront has always stored it:
/// `{"id":1,"title":"...","price":"179.9","image":"...","amount":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product's catalog record.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in the cart. Always at least 1.
    pub amount: u32,
}

impl CartItem {
    /// Create a cart entry for `product` with a quantity of one.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    /// The product id of this entry.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.amount)
    }
}

/// An ordered cart with unique product entries.
///
/// Deserializing goes through [`Cart::from_items`], so a snapshot read back
/// from storage always satisfies the uniqueness and positive-quantity
/// invariants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw entries.
    ///
    /// Entries with a zero quantity are dropped, as is any entry whose product
    /// already appeared earlier in the list. Order is otherwise kept.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.amount == 0 || cart.contains(item.id()) {
                continue;
            }
            cart.items.push(item);
        }
        cart
    }

    /// Entries in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over entries in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the product has an entry.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Append `product` with a quantity of one.
    ///
    /// Returns `false` without changing anything if the product already has
    /// an entry.
    pub fn push(&mut self, product: Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(CartItem::new(product));
        true
    }

    /// Add one unit to an existing entry, returning the new quantity.
    pub fn increment(&mut self, id: ProductId) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id() == id)?;
        item.amount = item.amount.saturating_add(1);
        Some(item.amount)
    }

    /// Set the quantity of an existing entry.
    ///
    /// Returns `false` if the product has no entry or `amount` is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove a product's entry, keeping the order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Total units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.amount))
    }

    /// Sum of every entry's subtotal.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = core::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            image: format!("https://example.com/{id}.jpg"),
        }
    }

    fn item(id: i32, amount: u32) -> CartItem {
        CartItem {
            product: product(id, 10_000),
            amount,
        }
    }

    #[test]
    fn test_push_appends_once() {
        let mut cart = Cart::new();
        assert!(cart.push(product(1, 100)));
        assert!(!cart.push(product(1, 100)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 1);
    }

    #[test]
    fn test_increment() {
        let mut cart = Cart::from_items(vec![item(1, 2)]);
        assert_eq!(cart.increment(ProductId::new(1)), Some(3));
        assert_eq!(cart.increment(ProductId::new(9)), None);
    }

    #[test]
    fn test_set_amount() {
        let mut cart = Cart::from_items(vec![item(1, 2)]);
        assert!(cart.set_amount(ProductId::new(1), 5));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 5);
        assert!(!cart.set_amount(ProductId::new(1), 0));
        assert!(!cart.set_amount(ProductId::new(2), 1));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 5);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut cart = Cart::from_items(vec![item(1, 1), item(2, 1), item(3, 1)]);
        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.id(), ProductId::new(2));
        let ids: Vec<i32> = cart.iter().map(|i| i.id().as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(cart.remove(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_from_items_drops_duplicates_and_empty_entries() {
        let cart = Cart::from_items(vec![item(1, 2), item(2, 0), item(1, 7), item(3, 1)]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].amount, 2);
        assert_eq!(cart.items()[1].id(), ProductId::new(3));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.push(product(1, 17_990));
        cart.push(product(2, 13_990));
        cart.set_amount(ProductId::new(1), 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total().to_string(), "R$ 499,70");
    }

    #[test]
    fn test_total_of_huge_prices_saturates() {
        let mut cart = Cart::new();
        let mut expensive = product(1, 0);
        let amount = Decimal::from_i128_with_scale(70_000_000_000_000_000_000_000_000_000, 0);
        expensive.price = Price::new(amount).unwrap();
        cart.push(expensive);
        cart.set_amount(ProductId::new(1), 2);
        assert_eq!(cart.total().amount(), Decimal::MAX);
    }

    #[test]
    fn test_serializes_flat_items() {
        let cart = Cart::from_items(vec![item(1, 2)]);
        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["amount"], 2);
        assert!(value[0].get("product").is_none());

        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}
