//! Demo catalog loaded on first start.

use rust_decimal::Decimal;
use tracing::info;

use crate::catalog::service::PRODUCT_COLLECTION;
use crate::domain::product::ProductInput;
use crate::store::{DocumentStore, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadyPopulated(u64),
    StoreUnavailable,
}

struct SampleProduct {
    title: &'static str,
    description: &'static str,
    price_cents: i64,
    category: &'static str,
    platform: &'static str,
    image_url: &'static str,
    rating_tenths: i64,
    stock: i64,
}

const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        title: "Elden Ring Runes",
        description: "Fast delivery of in-game currency to boost your journey across the Lands Between.",
        price_cents: 1999,
        category: "Currency",
        platform: "PC",
        image_url: "https://images.unsplash.com/photo-1605901309584-818e25960a8f?q=80&w=1200&auto=format&fit=crop",
        rating_tenths: 49,
        stock: 999,
    },
    SampleProduct {
        title: "GTA Online Money",
        description: "Top up your GTA$ balance with trusted, secure delivery.",
        price_cents: 2499,
        category: "Currency",
        platform: "PS5",
        image_url: "https://images.unsplash.com/photo-1538481199705-c710c4e965fc?q=80&w=1200&auto=format&fit=crop",
        rating_tenths: 47,
        stock: 800,
    },
    SampleProduct {
        title: "FIFA Ultimate Team Coins",
        description: "Build your dream squad with instant coin delivery.",
        price_cents: 1499,
        category: "Coins",
        platform: "Xbox",
        image_url: "https://images.unsplash.com/photo-1543326727-cf6c39b4479f?q=80&w=1200&auto=format&fit=crop",
        rating_tenths: 46,
        stock: 1200,
    },
    SampleProduct {
        title: "Valorant Points Top-up",
        description: "Secure VP top-up for skins and battle passes.",
        price_cents: 999,
        category: "Top-up",
        platform: "PC",
        image_url: "https://images.unsplash.com/photo-1607252650355-f7fd0460ccdb?q=80&w=1200&auto=format&fit=crop",
        rating_tenths: 48,
        stock: 500,
    },
];

/// The fixed sample catalog, in insertion order.
pub fn sample_products() -> Vec<ProductInput> {
    SAMPLE_PRODUCTS
        .iter()
        .map(|sample| ProductInput {
            title: sample.title.to_string(),
            description: Some(sample.description.to_string()),
            price: Decimal::new(sample.price_cents, 2),
            category: sample.category.to_string(),
            platform: sample.platform.to_string(),
            image_url: Some(sample.image_url.to_string()),
            rating: Some(Decimal::new(sample.rating_tenths, 1)),
            stock: Some(sample.stock),
        })
        .collect()
}

/// Inserts the sample catalog when the product collection is empty.
///
/// An unreachable store or a non-empty collection leaves the store untouched.
pub async fn seed_if_empty(store: &dyn DocumentStore) -> Result<SeedOutcome, StoreError> {
    if !store.is_available() {
        info!(
            event_name = "catalog.seed.skipped",
            correlation_id = "bootstrap",
            reason = "store_unavailable",
            "skipping catalog seed"
        );
        return Ok(SeedOutcome::StoreUnavailable);
    }

    let existing = store.count(PRODUCT_COLLECTION).await?;
    if existing > 0 {
        info!(
            event_name = "catalog.seed.skipped",
            correlation_id = "bootstrap",
            reason = "already_populated",
            existing,
            "skipping catalog seed"
        );
        return Ok(SeedOutcome::AlreadyPopulated(existing));
    }

    let samples = sample_products();
    let inserted = samples.len();
    for sample in samples {
        store.insert_one(PRODUCT_COLLECTION, sample.into_document()).await?;
    }

    info!(
        event_name = "catalog.seed.applied",
        correlation_id = "bootstrap",
        inserted,
        "seeded sample catalog"
    );
    Ok(SeedOutcome::Seeded(inserted))
}

#[cfg(test)]
mod tests {
    use super::sample_products;

    #[test]
    fn samples_are_valid_products() {
        let samples = sample_products();

        assert_eq!(samples.len(), 4);
        for sample in &samples {
            assert!(sample.validate().is_ok(), "{} should validate", sample.title);
        }
        assert_eq!(samples[0].title, "Elden Ring Runes");
        assert_eq!(samples[3].category, "Top-up");
    }
}
