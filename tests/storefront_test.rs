//! Integration tests for the storefront flow
//!
//! Exercises the catalog resolver, basket ledger and checkout against a
//! real SQLite file, the way the bot uses them through the pool.
//!
//! Run with: cargo test --test storefront_test

use serial_test::serial;
use tempfile::TempDir;

use malachite_bot::catalog::{next_step, CategoryKind, Dimension, ResolveStep, Selection};
use malachite_bot::checkout::{CheckoutForm, OrderForm, StepOutcome};
use malachite_bot::storage::basket;
use malachite_bot::storage::catalog::{find_item, get_category, list_dimension_values};
use malachite_bot::storage::db::ensure_user;
use malachite_bot::storage::migrations::run_migrations_for_test;
use malachite_bot::storage::{create_pool, get_connection, DbPool};
use malachite_bot::telegram::admin::{apply_price_updates, parse_price_sheet, write_price_sheet};

struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

fn setup() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("shop.sqlite");
    let pool = create_pool(db_path.to_str().unwrap()).expect("Failed to create pool");

    {
        let mut conn = pool.get().expect("Failed to get connection");
        run_migrations_for_test(&mut conn).expect("Failed to run migrations");
        seed_catalog(&conn);
    }

    TestDb { pool, _dir: dir }
}

/// One model per category kind, with enough attribute values and items to
/// walk every question sequence.
fn seed_catalog(conn: &rusqlite::Connection) {
    conn.execute_batch(
        r#"
        INSERT INTO categories (id, name, kind) VALUES
            (1, 'iPhone', 'phone'),
            (2, 'iPad', 'tablet'),
            (3, 'Apple Watch', 'watch'),
            (4, 'MacBook', 'laptop'),
            (5, 'AirPods', 'accessory');

        INSERT INTO models (id, name, category_id) VALUES
            (1, 'iPhone 15', 1),
            (2, 'iPad Air', 2),
            (3, 'Watch Series 9', 3),
            (4, 'MacBook Pro 14', 4),
            (5, 'AirPods Pro', 5);

        INSERT INTO colors (id, name, model_id) VALUES
            (1, 'Черный', 1),
            (2, 'Синий', 2),
            (3, 'Серебристый', 3),
            (4, 'Серый космос', 4),
            (5, 'Белый', 5);

        INSERT INTO memories (id, size, model_id) VALUES
            (1, '128 GB', 1),
            (2, '256 GB', 2),
            (3, '512 GB', 4);

        INSERT INTO screen_sizes (id, size, model_id) VALUES
            (1, '41 мм', 3),
            (2, '45 мм', 3);

        INSERT INTO connectivities (id, type, model_id) VALUES
            (1, 'Wi-Fi', 2),
            (2, 'Wi-Fi + Cellular', 2);

        INSERT INTO rams (id, size, model_id) VALUES
            (1, '16 GB', 4);

        INSERT INTO items (id, name, description, price, category_id, model_id, color_id,
                           memory_id, screen_size_id, connectivity_id, ram_id) VALUES
            (1, 'iPhone 15 Черный 128 GB', '', '99990', 1, 1, 1, 1, NULL, NULL, NULL),
            (2, 'iPad Air Синий 256 GB Wi-Fi', '', '74990', 2, 2, 2, 2, NULL, 1, NULL),
            (3, 'Watch Series 9 41 мм', '', '41990', 3, 3, 3, NULL, 1, NULL, NULL),
            (4, 'MacBook Pro 14 512/16', '', '239990', 4, 4, 4, 3, NULL, NULL, 1),
            (5, 'AirPods Pro Белый', '', '24990', 5, 5, 5, NULL, NULL, NULL, NULL),
            (6, 'Тестовая позиция 33.33', '', '33.33', 1, 1, 1, NULL, NULL, NULL, NULL);
        "#,
    )
    .expect("Failed to seed catalog");
}

fn order_form() -> OrderForm {
    OrderForm {
        name: "Иванов Иван".into(),
        address: "Москва, Тверская 1".into(),
        phone: "+79991234567".into(),
        email: "ivan@example.com".into(),
        delivery_datetime: "завтра после 18:00".into(),
    }
}

/// Walks the declared question sequence for one category, answering each
/// question with the first available value, and returns the resolved item id.
fn walk_category(conn: &rusqlite::Connection, category_id: i64, model_id: i64) -> Option<i64> {
    let category = get_category(conn, category_id).unwrap().unwrap();
    let mut selection = Selection::default();

    loop {
        match next_step(category.kind, model_id, &selection) {
            ResolveStep::Ask(dim) => {
                let values = list_dimension_values(conn, dim, model_id).unwrap();
                assert!(!values.is_empty(), "no values for {:?}", dim);
                selection.set(dim, values[0].id);
            }
            ResolveStep::Lookup(key) => {
                return find_item(conn, &key).unwrap().map(|item| item.id);
            }
        }
    }
}

#[test]
#[serial]
fn every_category_kind_resolves_to_its_item() {
    let db = setup();
    let conn = get_connection(&db.pool).unwrap();

    assert_eq!(walk_category(&conn, 1, 1), Some(1)); // phone
    assert_eq!(walk_category(&conn, 2, 2), Some(2)); // tablet
    assert_eq!(walk_category(&conn, 3, 3), Some(3)); // watch
    assert_eq!(walk_category(&conn, 4, 4), Some(4)); // laptop
    assert_eq!(walk_category(&conn, 5, 5), Some(5)); // accessory
}

#[test]
#[serial]
fn question_sequences_follow_the_category_policy() {
    let db = setup();
    let conn = get_connection(&db.pool).unwrap();

    let tablet = get_category(&conn, 2).unwrap().unwrap();
    assert_eq!(tablet.kind, CategoryKind::Tablet);

    let mut selection = Selection::default();
    assert_eq!(next_step(tablet.kind, 2, &selection), ResolveStep::Ask(Dimension::Color));
    selection.set(Dimension::Color, 2);
    assert_eq!(next_step(tablet.kind, 2, &selection), ResolveStep::Ask(Dimension::Memory));
    selection.set(Dimension::Memory, 2);
    assert_eq!(
        next_step(tablet.kind, 2, &selection),
        ResolveStep::Ask(Dimension::Connectivity)
    );
}

#[test]
#[serial]
fn incomplete_selection_finds_nothing() {
    let db = setup();
    let conn = get_connection(&db.pool).unwrap();

    // Watch selection missing its screen size must not match the
    // accessory-shaped row for another model
    let category = get_category(&conn, 3).unwrap().unwrap();
    let mut selection = Selection::default();
    selection.set(Dimension::Color, 3);
    assert!(matches!(
        next_step(category.kind, 3, &selection),
        ResolveStep::Ask(Dimension::ScreenSize)
    ));
}

#[test]
#[serial]
fn re_adding_an_item_merges_into_one_position() {
    let db = setup();
    let conn = get_connection(&db.pool).unwrap();
    ensure_user(&conn, 100, Some("buyer")).unwrap();

    assert!(basket::add_item(&conn, 100, 1).unwrap());
    assert!(basket::add_item(&conn, 100, 1).unwrap());
    assert!(basket::add_item(&conn, 100, 5).unwrap());

    let lines = basket::list_basket(&conn, 100).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[1].quantity, 1);
}

#[test]
#[serial]
fn basket_totals_are_exact() {
    let db = setup();
    let conn = get_connection(&db.pool).unwrap();
    ensure_user(&conn, 100, None).unwrap();

    for _ in 0..3 {
        basket::add_item(&conn, 100, 6).unwrap();
    }

    let lines = basket::list_basket(&conn, 100).unwrap();
    assert_eq!(basket::basket_total(&lines).to_string(), "99.99");
}

#[test]
#[serial]
fn checkout_is_atomic_and_clears_the_basket() {
    let db = setup();
    let mut conn = get_connection(&db.pool).unwrap();
    ensure_user(&conn, 100, None).unwrap();
    basket::add_item(&conn, 100, 1).unwrap();
    basket::add_item(&conn, 100, 5).unwrap();

    let receipt = basket::checkout(&mut conn, 100, &order_form()).unwrap().unwrap();
    assert_eq!(receipt.lines.len(), 2);
    assert_eq!(receipt.lines[0].attributes(), "Черный, 128 GB");
    assert_eq!(receipt.lines[1].attributes(), "Белый");
    assert_eq!(receipt.total.to_string(), "124980");
    assert!(basket::list_basket(&conn, 100).unwrap().is_empty());

    let (status, phone): (String, String) = conn
        .query_row(
            "SELECT status, phone FROM orders WHERE id = ?1",
            [receipt.order_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(status, "pending");
    assert_eq!(phone, "+79991234567");
}

#[test]
#[serial]
fn empty_basket_checkout_creates_no_order() {
    let db = setup();
    let mut conn = get_connection(&db.pool).unwrap();
    ensure_user(&conn, 100, None).unwrap();

    assert!(basket::checkout(&mut conn, 100, &order_form()).unwrap().is_none());
    let orders: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orders, 0);
}

#[test]
#[serial]
fn checkout_form_feeds_straight_into_the_ledger() {
    let db = setup();
    let mut conn = get_connection(&db.pool).unwrap();
    ensure_user(&conn, 100, None).unwrap();
    basket::add_item(&conn, 100, 1).unwrap();

    let mut form = CheckoutForm::new();
    form.apply("Иванов Иван");
    form.apply("Москва, Тверская 1");
    assert!(matches!(form.apply("12345"), StepOutcome::Invalid(_)));
    form.apply("+7 (999) 123-45-67");
    form.apply("ivan@example.com");
    let order = match form.apply("завтра после 18:00") {
        StepOutcome::Completed(order) => order,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(order.phone, "+79991234567");

    let receipt = basket::checkout(&mut conn, 100, &order).unwrap().unwrap();
    assert_eq!(receipt.lines.len(), 1);
}

#[test]
#[serial]
fn price_sheet_round_trip_updates_prices() {
    let db = setup();

    let rows = {
        let conn = get_connection(&db.pool).unwrap();
        malachite_bot::storage::catalog::list_price_rows(&conn).unwrap()
    };
    assert_eq!(rows.len(), 6);

    let mut sheet = Vec::new();
    write_price_sheet(&rows, &mut sheet).unwrap();

    // Edit the iPhone price the way an admin would in a spreadsheet
    let text = String::from_utf8_lossy(&sheet).replace(";99990", ";89990");
    let (updates, malformed) = parse_price_sheet(text.as_bytes()).unwrap();
    assert_eq!(malformed, 0);
    assert_eq!(updates.len(), 6);

    let mut conn = get_connection(&db.pool).unwrap();
    let (updated, skipped) = apply_price_updates(&mut conn, &updates).unwrap();
    assert_eq!((updated, skipped), (6, 0));

    let price: String = conn
        .query_row("SELECT price FROM items WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(price, "89990");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_adds_under_the_user_lock_lose_no_increment() {
    use malachite_bot::core::locks::UserLocks;
    use std::sync::Arc;

    let db = setup();
    {
        let conn = get_connection(&db.pool).unwrap();
        ensure_user(&conn, 100, None).unwrap();
    }

    let locks = Arc::new(UserLocks::new());
    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = db.pool.clone();
        let locks = Arc::clone(&locks);
        handles.push(tokio::spawn(async move {
            let _guard = locks.acquire(100).await;
            let conn = pool.get().unwrap();
            basket::add_item(&conn, 100, 1).unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let conn = get_connection(&db.pool).unwrap();
    let lines = basket::list_basket(&conn, 100).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 10);
}

#[test]
#[serial]
fn bad_sheet_rows_are_skipped_not_fatal() {
    let db = setup();
    let mut conn = get_connection(&db.pool).unwrap();

    // A stray line and an unknown id must not sink the valid rows
    let sheet = "ID;Категория;Модель;Цвет;Память;Экран;Подключение;RAM;Цена\n\
                 1;iPhone;iPhone 15;Черный;128 GB;;;;77770\n\
                 abc;мусор;;;;;;;не цена\n\
                 999;Нет;Нет;Нет;;;;;1\n";
    let (updates, malformed) = parse_price_sheet(sheet.as_bytes()).unwrap();
    assert_eq!(malformed, 1);

    let (updated, skipped) = apply_price_updates(&mut conn, &updates).unwrap();
    assert_eq!((updated, skipped), (1, 1));

    let price: String = conn
        .query_row("SELECT price FROM items WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(price, "77770");
}
