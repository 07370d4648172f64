//! Product catalog wire models.
//!
//! Products arrive with their variants nested inline; variant prices are
//! integers in minor currency units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wealthproxies_core::{Price, ProductId, VariantId};

/// Kind of proxy product on sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Residential,
    Isp,
    Server,
    ProxyList,
}

/// A purchasable variant of a product (e.g., a bandwidth tier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Parent product ID.
    pub product_id: ProductId,
    /// Whether the variant can currently be purchased.
    pub is_active: bool,
    /// Display name (e.g., "5 GB").
    pub name: String,
    /// Unit price in minor currency units.
    pub price: Price,
    /// Bandwidth included, in gigabytes.
    pub bandwidth_gb: u32,
    /// Payment-processor product reference.
    #[serde(default)]
    pub stripe_product_id: String,
    /// When the variant was created.
    pub created_at: DateTime<Utc>,
    /// When the variant was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A catalog product with its nested variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Kind of proxy product.
    pub product_type: ProductType,
    /// Upstream provider name.
    pub provider: String,
    /// Bullet points shown on the product card.
    #[serde(default)]
    pub whats_included: Vec<String>,
    /// Card accent color.
    #[serde(default)]
    pub color: String,
    /// Card badge shape.
    #[serde(default)]
    pub polygon: String,
    /// Whether the product is listed.
    pub is_active: bool,
    /// Minimum purchasable quantity.
    pub minimum_quantity: u32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
    /// Purchasable variants.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Find a variant of this product by ID.
    #[must_use]
    pub fn variant(&self, variant_id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == variant_id)
    }
}

/// Canned catalog product used by model and store tests.
#[cfg(test)]
pub(crate) fn sample_product_json() -> &'static str {
    r#"{
        "id": "prod_res",
        "name": "Residential Proxies",
        "description": "Rotating residential pool",
        "productType": "residential",
        "provider": "acme",
        "whatsIncluded": ["Unlimited threads", "City targeting"],
        "color": "blue",
        "polygon": "triangle",
        "isActive": true,
        "minimumQuantity": 1,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z",
        "variants": [
            {
                "id": "var_5gb",
                "productId": "prod_res",
                "isActive": true,
                "name": "5 GB",
                "price": 4500,
                "bandwidthGb": 5,
                "stripeProductId": "prod_stripe_1",
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T00:00:00Z"
            }
        ]
    }"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_with_nested_variants() {
        let product: Product = serde_json::from_str(sample_product_json()).expect("deserialize");
        assert_eq!(product.product_type, ProductType::Residential);
        assert_eq!(product.variants.len(), 1);

        let variant = product.variant(&VariantId::new("var_5gb")).expect("variant");
        assert_eq!(variant.price, Price::from_minor(4500));
        assert_eq!(variant.bandwidth_gb, 5);
    }

    #[test]
    fn test_variant_lookup_misses() {
        let product: Product = serde_json::from_str(sample_product_json()).expect("deserialize");
        assert!(product.variant(&VariantId::new("var_999")).is_none());
    }
}
