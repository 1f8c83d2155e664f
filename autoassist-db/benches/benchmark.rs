use autoassist_db::{
    cart::CartItems,
    ids::{new_transaction_id, IdScheme},
    money::Money,
    shop_orders::{checkout, CartLine, CheckoutRequest, WorkshopChoice},
    test_utils::{create_product, create_workshop, establish_connection},
    workshops::WorkshopRef,
};
use criterion::{criterion_group, criterion_main, Criterion};

fn checkout_cart(c: &mut Criterion) {
    let mut conn = establish_connection();
    let workshop = create_workshop(&mut conn, "Bengkel Ah Seng");
    let oil = create_product(&mut conn, "Engine Oil", 120_00);
    let pads = create_product(&mut conn, "Brake Pads", 250_00);

    let req = CheckoutRequest {
        cart: vec![
            CartLine::new(oil.get_id(), oil.get_price(), 2),
            CartLine::new(pads.get_id(), pads.get_price(), 1),
        ],
        total: Some(Money::from_cents(490_00)),
        workshop: Some(WorkshopChoice {
            id: Some(WorkshopRef::from(workshop.get_id())),
            name: None,
        }),
        user_id: None,
    };

    // Long ids so the id space does not fill up over many iterations
    c.bench_function("checkout a two line cart", |b| {
        b.iter(|| checkout(&mut conn, req.clone(), IdScheme::Long, &CartItems).unwrap())
    });
}

fn mint_short_ids(c: &mut Criterion) {
    let mut conn = establish_connection();
    c.bench_function("mint a short id on an empty ledger", |b| {
        b.iter(|| new_transaction_id(&mut conn, IdScheme::Short).unwrap())
    });
}

criterion_group!(benches, checkout_cart, mint_short_ids);
criterion_main!(benches);
