use super::*;
use crate::{
    cart::CartItems,
    products::Product,
    test_utils::{create_product, create_user, create_workshop, establish_connection},
    transactions::{ServiceDetail, Transactions},
    workshops::Workshop,
};
use serde_json::json;

// Fails every clear, to show the order survives it
struct BrokenCart;

impl CartStore for BrokenCart {
    fn clear(&self, _conn: &mut SqliteConnection, _user: i32) -> Result<usize> {
        Err(AssistDbError::validation("cart service unavailable"))
    }
}

fn fixtures(conn: &mut SqliteConnection) -> (Workshop, Product, Product) {
    let w = create_workshop(conn, "Bengkel Ah Seng");
    let oil = create_product(conn, "Engine Oil 5W-30", 120_00);
    let pad = create_product(conn, "Brake Pad", 250_00);
    (w, oil, pad)
}

fn request(w: &Workshop, oil: &Product, pad: &Product, user: Option<i32>) -> CheckoutRequest {
    serde_json::from_value(json!({
        "cart": [
            {"id": oil.get_id(), "name": "Engine Oil 5W-30", "price": 120, "quantity": 1},
            {"id": pad.get_id(), "name": "Brake Pad", "price": "250.00", "quantity": 1},
        ],
        "total": 370,
        "workshop": {"id": w.get_id().to_string(), "name": "Ah Seng"},
        "userId": user,
    }))
    .unwrap()
}

#[test]
fn checkout_writes_ledger_order_and_items() {
    let mut conn = establish_connection();
    let (w, oil, pad) = fixtures(&mut conn);
    let user = create_user(&mut conn, "shopper@example.org");
    CartItems::add(&mut conn, user.get_id(), oil.get_id(), 1).unwrap();

    let info = checkout(
        &mut conn,
        request(&w, &oil, &pad, Some(user.get_id())),
        IdScheme::Short,
        &CartItems,
    )
    .unwrap();
    assert_eq!(info.get_kind(), TransactionKind::Shop);
    assert_eq!(info.get_title(), "2 Items Order at Ah Seng");
    assert_eq!(info.get_amount(), Money::from_cents(370_00));
    assert_eq!(info.get_status(), TransactionStatus::Pending);
    assert_eq!(info.get_date(), chrono::Local::now().naive_local().date());

    let detail = match Transactions::get(&mut conn, info.get_id()).unwrap().detail {
        ServiceDetail::Shop(d) => d,
        other => panic!("unexpected detail {:?}", other),
    };
    assert_eq!(detail.order.get_workshop_id(), w.get_id());
    assert_eq!(detail.order.get_total(), Money::from_cents(370_00));
    assert_eq!(detail.items.len(), 2);
    for item in &detail.items {
        assert_eq!(
            item.get_subtotal().cents(),
            item.get_product_price().cents() * item.get_quantity() as i64
        );
    }

    // The cart became the order
    assert!(CartItems::list_by_user(&mut conn, user.get_id()).unwrap().is_empty());
}

#[test]
fn single_item_title_uses_store_name() {
    let mut conn = establish_connection();
    let (w, oil, _) = fixtures(&mut conn);
    let req: CheckoutRequest = serde_json::from_value(json!({
        "cart": [{"id": oil.get_id(), "price": 120, "quantity": 2}],
        "total": 240,
        "workshop": {"id": w.get_id()},
    }))
    .unwrap();
    let info = checkout(&mut conn, req, IdScheme::Short, &CartItems).unwrap();
    assert_eq!(info.get_title(), "1 Item Order at Bengkel Ah Seng");
    assert_eq!(info.get_user_id(), None);
}

#[test]
fn invalid_carts_write_nothing() {
    let mut conn = establish_connection();
    let (w, oil, pad) = fixtures(&mut conn);

    let mut empty = request(&w, &oil, &pad, None);
    empty.cart.clear();
    assert!(matches!(
        checkout(&mut conn, empty, IdScheme::Short, &CartItems),
        Err(AssistDbError::Validation(_))
    ));

    let mut no_workshop = request(&w, &oil, &pad, None);
    no_workshop.workshop = None;
    assert!(matches!(
        checkout(&mut conn, no_workshop, IdScheme::Short, &CartItems),
        Err(AssistDbError::Validation(_))
    ));

    let mut zero_qty = request(&w, &oil, &pad, None);
    zero_qty.cart[0].quantity = Some(0);
    assert!(matches!(
        checkout(&mut conn, zero_qty, IdScheme::Short, &CartItems),
        Err(AssistDbError::Validation(_))
    ));

    let mut wrong_total = request(&w, &oil, &pad, None);
    wrong_total.total = Some(Money::from_cents(1_00));
    assert!(matches!(
        checkout(&mut conn, wrong_total, IdScheme::Short, &CartItems),
        Err(AssistDbError::Validation(_))
    ));

    let mut stale_price = request(&w, &oil, &pad, None);
    stale_price.cart[0].price = Some(Money::from_cents(99_00));
    stale_price.total = Some(Money::from_cents(349_00));
    assert!(matches!(
        checkout(&mut conn, stale_price, IdScheme::Short, &CartItems),
        Err(AssistDbError::Validation(_))
    ));

    let mut ghost = request(&w, &oil, &pad, None);
    ghost.cart[1].id = Some(9999);
    assert!(matches!(
        checkout(&mut conn, ghost, IdScheme::Short, &CartItems),
        Err(AssistDbError::ReferenceNotFound(_))
    ));

    let mut unknown_workshop = request(&w, &oil, &pad, None);
    unknown_workshop.workshop = Some(WorkshopChoice {
        id: Some(WorkshopRef::from(999)),
        name: None,
    });
    assert!(matches!(
        checkout(&mut conn, unknown_workshop, IdScheme::Short, &CartItems),
        Err(AssistDbError::ReferenceNotFound(_))
    ));

    assert_eq!(Transactions::count(&mut conn).unwrap(), 0);
    assert_eq!(shop_orders::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
    assert_eq!(shop_order_items::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
}

#[test]
fn failed_cart_clear_keeps_order() {
    let mut conn = establish_connection();
    let (w, oil, pad) = fixtures(&mut conn);
    let user = create_user(&mut conn, "shopper@example.org");
    let info = checkout(
        &mut conn,
        request(&w, &oil, &pad, Some(user.get_id())),
        IdScheme::Short,
        &BrokenCart,
    )
    .unwrap();
    assert!(Transactions::get(&mut conn, info.get_id()).is_ok());
}

#[test]
fn history_protects_workshops_and_products() {
    let mut conn = establish_connection();
    let (w, oil, pad) = fixtures(&mut conn);
    let info = checkout(&mut conn, request(&w, &oil, &pad, None), IdScheme::Short, &CartItems).unwrap();

    assert!(matches!(
        crate::workshops::Workshops::delete_by_id(&mut conn, w.get_id()),
        Err(AssistDbError::ReferenceInUse(_))
    ));
    assert!(matches!(
        Products::delete_by_id(&mut conn, oil.get_id()),
        Err(AssistDbError::ReferenceInUse(_))
    ));

    // Once the order is gone, so is the protection
    Transactions::delete_by_id(&mut conn, info.get_id()).unwrap();
    assert_eq!(shop_order_items::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
    Products::delete_by_id(&mut conn, oil.get_id()).unwrap();
    crate::workshops::Workshops::delete_by_id(&mut conn, w.get_id()).unwrap();
}
