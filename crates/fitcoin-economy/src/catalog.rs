//! Product catalog
//!
//! Products live inside their seller's record. Listing goods for sale scans
//! the whole member range on every call, so the result is always current.

use crate::listing::RecordListing;
use crate::registry;
use fitcoin_core::keys::member_range;
use fitcoin_core::{
    FitcoinError, Invocation, LedgerEffects, Member, MemberId, Product, ProductId, Result,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One purchasable product together with its seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForSaleItem {
    /// Seller listing the product
    pub seller_id: MemberId,
    /// Product id within the seller
    pub product_id: ProductId,
    /// Display name
    pub name: String,
    /// Units in stock, always positive
    pub count: u64,
    /// Fitcoin per unit
    pub price: u64,
}

/// Every in-stock product across all sellers
#[derive(Debug)]
pub struct ForSaleListing {
    members: RecordListing<Member>,
}

impl ForSaleListing {
    /// Walk in-stock products, seller by seller in id order
    pub fn iter(&self) -> impl Iterator<Item = Result<ForSaleItem>> + '_ {
        self.members.iter().flat_map(|member| match member {
            Ok(Member::Seller(seller)) => seller
                .products
                .into_iter()
                .filter(Product::in_stock)
                .map(|product| {
                    Ok(ForSaleItem {
                        seller_id: seller.id.clone(),
                        product_id: product.id,
                        name: product.name,
                        count: product.count,
                        price: product.price,
                    })
                })
                .collect::<Vec<_>>(),
            Ok(Member::User(_)) => Vec::new(),
            Err(err) => vec![Err(err)],
        })
    }

    /// Collect every item, stopping at the first undecodable record
    pub fn to_vec(&self) -> Result<Vec<ForSaleItem>> {
        self.iter().collect()
    }
}

/// Add a product to a seller, or overwrite the one with the same id
pub async fn create_or_update_product<L>(
    tx: &mut Invocation<'_, L>,
    seller_id: &MemberId,
    product: Product,
) -> Result<Product>
where
    L: LedgerEffects + ?Sized,
{
    if product.id.is_empty() {
        return Err(FitcoinError::invalid_argument("product id must not be empty"));
    }

    let mut seller = registry::get_seller(tx, seller_id).await?;
    let replaced = seller.upsert_product(product.clone());
    registry::put_seller(tx, &seller)?;
    debug!(
        seller_id = %seller_id,
        product_id = %product.id,
        replaced,
        "Product stored"
    );
    Ok(product)
}

/// Look up one product of a seller, `NotFound` if either is absent
pub async fn get_product<L>(
    tx: &mut Invocation<'_, L>,
    seller_id: &MemberId,
    product_id: &ProductId,
) -> Result<Product>
where
    L: LedgerEffects + ?Sized,
{
    let seller = registry::get_seller(tx, seller_id).await?;
    seller
        .product(product_id)
        .cloned()
        .ok_or_else(|| {
            FitcoinError::not_found(format!("product {product_id} of seller {seller_id}"))
        })
}

/// Scan members and expose every product with stock left
pub async fn list_for_sale<L>(tx: &mut Invocation<'_, L>) -> Result<ForSaleListing>
where
    L: LedgerEffects + ?Sized,
{
    let rows = tx.scan_range(&member_range()).await?;
    Ok(ForSaleListing {
        members: RecordListing::new(rows),
    })
}
