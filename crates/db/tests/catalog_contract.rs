use std::sync::Arc;

use rust_decimal::Decimal;

use lootshelf_core::catalog::{
    sample_products, seed_if_empty, CatalogService, ProductQuery, SeedOutcome, PRODUCT_COLLECTION,
};
use lootshelf_core::{CatalogError, DocumentStore, ProductInput};
use lootshelf_db::{connect_with_settings, migrations, InMemoryDocumentStore, SqliteDocumentStore};

async fn sqlite_store() -> Arc<SqliteDocumentStore> {
    let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    Arc::new(SqliteDocumentStore::new(pool))
}

async fn backends() -> Vec<(&'static str, Arc<dyn DocumentStore>)> {
    vec![
        ("memory", Arc::new(InMemoryDocumentStore::new()) as Arc<dyn DocumentStore>),
        ("sqlite", sqlite_store().await as Arc<dyn DocumentStore>),
    ]
}

fn product(title: &str, category: &str, platform: &str) -> ProductInput {
    ProductInput {
        title: title.to_string(),
        description: Some(format!("{title} description")),
        price: Decimal::new(1999, 2),
        category: category.to_string(),
        platform: platform.to_string(),
        image_url: None,
        rating: None,
        stock: None,
    }
}

fn query(search: Option<&str>, category: Option<&str>, platform: Option<&str>) -> ProductQuery {
    ProductQuery::new(
        search.map(str::to_string),
        category.map(str::to_string),
        platform.map(str::to_string),
        50,
    )
    .expect("valid query")
}

async fn seeded_service(store: Arc<dyn DocumentStore>) -> CatalogService {
    let service = CatalogService::new(store);
    for input in [
        product("Elden Ring Runes", "Currency", "PC"),
        product("GTA Online Money", "Currency", "PS5"),
        product("FIFA Ultimate Team Coins", "Coins", "Xbox"),
        product("Valorant Points Top-up", "Top-up", "PC"),
        product("Lowercase currency pack", "currency", "PC"),
    ] {
        service.create(input).await.expect("create");
    }
    service
}

#[tokio::test]
async fn search_matches_title_substring_ignoring_case() {
    for (backend, store) in backends().await {
        let service = seeded_service(store).await;

        let found = service.list(&query(Some("elden"), None, None)).await.expect("list");
        let titles = found.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Elden Ring Runes"], "backend {backend}");

        // Description text is not searched.
        let none = service.list(&query(Some("description"), None, None)).await.expect("list");
        assert!(none.is_empty(), "backend {backend}");
    }
}

#[tokio::test]
async fn search_treats_regex_metacharacters_literally() {
    for (backend, store) in backends().await {
        let service = seeded_service(store).await;

        let found = service.list(&query(Some("e.den"), None, None)).await.expect("list");
        assert!(found.is_empty(), "backend {backend}");

        let found = service.list(&query(Some("top-up"), None, None)).await.expect("list");
        assert_eq!(found.len(), 1, "backend {backend}");
    }
}

#[tokio::test]
async fn category_filter_is_exact_and_case_sensitive() {
    for (backend, store) in backends().await {
        let service = seeded_service(store).await;

        let found = service.list(&query(None, Some("Currency"), None)).await.expect("list");
        assert_eq!(found.len(), 2, "backend {backend}");
        assert!(found.iter().all(|p| p.category == "Currency"), "backend {backend}");

        let combined =
            service.list(&query(None, Some("Currency"), Some("PS5"))).await.expect("list");
        let titles = combined.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["GTA Online Money"], "backend {backend}");
    }
}

#[tokio::test]
async fn list_honours_limit_and_natural_order() {
    for (backend, store) in backends().await {
        let service = seeded_service(store).await;

        for limit in [1_i64, 2, 5, 200] {
            let query = ProductQuery::new(None, None, None, limit).expect("valid limit");
            let found = service.list(&query).await.expect("list");
            assert!((found.len() as i64) <= limit, "backend {backend} limit {limit}");
        }

        let first_two = service
            .list(&ProductQuery::new(None, None, None, 2).expect("valid"))
            .await
            .expect("list");
        let titles = first_two.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Elden Ring Runes", "GTA Online Money"], "backend {backend}");
    }
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store);

        let found = service.list(&query(Some("nothing"), None, None)).await.expect("list");
        assert!(found.is_empty(), "backend {backend}");
    }
}

#[tokio::test]
async fn created_product_reads_back_with_defaults() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store);
        let input = product("Apex Coins", "Coins", "PC");

        let id = service.create(input.clone()).await.expect("create");
        assert!(!id.0.is_empty(), "backend {backend}");

        let fetched = service.get(&id.0).await.expect("get");
        assert_eq!(fetched.id, id, "backend {backend}");
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.description, input.description);
        assert_eq!(fetched.price, input.price);
        assert_eq!(fetched.category, input.category);
        assert_eq!(fetched.platform, input.platform);
        assert_eq!(fetched.image_url, None);
        assert_eq!(fetched.rating, Decimal::new(45, 1), "backend {backend}");
        assert_eq!(fetched.stock, 100, "backend {backend}");
    }
}

#[tokio::test]
async fn repeated_creates_make_distinct_records() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store.clone());

        let first = service.create(product("Same", "C", "P")).await.expect("create");
        let second = service.create(product("Same", "C", "P")).await.expect("create");

        assert_ne!(first, second, "backend {backend}");
        assert_eq!(store.count(PRODUCT_COLLECTION).await.expect("count"), 2);
    }
}

#[tokio::test]
async fn unknown_or_malformed_identifiers_are_not_found() {
    for (backend, store) in backends().await {
        let service = seeded_service(store).await;

        for identifier in
            ["507f1f77bcf86cd799439011", "not-an-id", "", "6f1c2a4e-0000-4000-8000-000000000000"]
        {
            let result = service.get(identifier).await;
            assert!(
                matches!(result, Err(CatalogError::NotFound(_))),
                "backend {backend} identifier `{identifier}` gave {result:?}"
            );
        }
    }
}

#[tokio::test]
async fn categories_and_platforms_are_sorted_unique_and_non_empty() {
    for (backend, store) in backends().await {
        let service = seeded_service(store.clone()).await;
        let mut blank = serde_json::Map::new();
        blank.insert("title".to_string(), "Blank".into());
        blank.insert("category".to_string(), "".into());
        blank.insert("platform".to_string(), serde_json::Value::Null);
        store.insert_one(PRODUCT_COLLECTION, blank).await.expect("insert");

        let categories = service.list_categories().await.expect("categories");
        assert_eq!(
            categories,
            vec!["Coins", "Currency", "Top-up", "currency"],
            "backend {backend}"
        );

        let platforms = service.list_platforms().await.expect("platforms");
        assert_eq!(platforms, vec!["PC", "PS5", "Xbox"], "backend {backend}");
    }
}

#[tokio::test]
async fn negative_price_is_rejected_without_writing() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store.clone());
        let mut input = product("X", "C", "P");
        input.price = Decimal::NEGATIVE_ONE;

        let result = service.create(input).await;
        assert!(
            matches!(result, Err(CatalogError::InvalidArgument(ref v)) if v[0].field == "price"),
            "backend {backend}"
        );
        assert_eq!(store.count(PRODUCT_COLLECTION).await.expect("count"), 0);
    }
}

#[tokio::test]
async fn offline_store_surfaces_service_unavailable() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let service = CatalogService::new(store.clone());
    store.set_available(false);

    assert!(matches!(
        service.list(&ProductQuery::default()).await,
        Err(CatalogError::ServiceUnavailable(_))
    ));
    assert!(matches!(service.list_platforms().await, Err(CatalogError::ServiceUnavailable(_))));

    let sqlite = sqlite_store().await;
    let service = CatalogService::new(sqlite.clone());
    sqlite.pool().close().await;
    assert!(matches!(service.list_categories().await, Err(CatalogError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn seeding_populates_an_empty_store_exactly_once() {
    for (backend, store) in backends().await {
        let outcome = seed_if_empty(store.as_ref()).await.expect("seed");
        assert_eq!(outcome, SeedOutcome::Seeded(4), "backend {backend}");
        assert_eq!(store.count(PRODUCT_COLLECTION).await.expect("count"), 4);

        let again = seed_if_empty(store.as_ref()).await.expect("reseed");
        assert_eq!(again, SeedOutcome::AlreadyPopulated(4), "backend {backend}");
        assert_eq!(store.count(PRODUCT_COLLECTION).await.expect("count"), 4);

        let service = CatalogService::new(store);
        let titles = service
            .list(&ProductQuery::default())
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.title)
            .collect::<Vec<_>>();
        let expected = sample_products().into_iter().map(|p| p.title).collect::<Vec<_>>();
        assert_eq!(titles, expected, "backend {backend}");
    }
}

#[tokio::test]
async fn seeding_leaves_populated_or_unreachable_stores_alone() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let service = CatalogService::new(store.clone());
    service.create(product("Existing", "C", "P")).await.expect("create");

    let outcome = seed_if_empty(store.as_ref()).await.expect("seed");
    assert_eq!(outcome, SeedOutcome::AlreadyPopulated(1));
    assert_eq!(store.count(PRODUCT_COLLECTION).await.expect("count"), 1);

    let offline = InMemoryDocumentStore::new();
    offline.set_available(false);
    let outcome = seed_if_empty(&offline).await.expect("seed");
    assert_eq!(outcome, SeedOutcome::StoreUnavailable);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store);
        for input in [
            product("Élden Ring Runes", "Currency", "PC"),
            product("POKÉMON Poké Balls", "Items", "Switch"),
            product("Plain Coins", "Coins", "PC"),
        ] {
            service.create(input).await.expect("create");
        }

        let found = service.list(&query(Some("élden"), None, None)).await.expect("list");
        let titles = found.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Élden Ring Runes"], "backend {backend}");

        let found =
            service.list(&query(Some("pokémon"), None, Some("Switch"))).await.expect("list");
        let titles = found.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["POKÉMON Poké Balls"], "backend {backend}");
    }
}

#[tokio::test]
async fn search_limit_counts_only_matching_documents() {
    for (backend, store) in backends().await {
        let service = CatalogService::new(store);
        for title in ["Alpha", "Élan Pack", "Beta", "ÉLAN Bundle", "élan Crate"] {
            service.create(product(title, "Bundles", "PC")).await.expect("create");
        }

        let query = ProductQuery::new(Some("élan".to_string()), None, None, 2).expect("valid");
        let found = service.list(&query).await.expect("list");
        let titles = found.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Élan Pack", "ÉLAN Bundle"], "backend {backend}");
    }
}
