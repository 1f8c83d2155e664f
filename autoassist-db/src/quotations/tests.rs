use super::*;
use crate::{
    test_utils::{create_user, create_workshop, establish_connection},
    transactions::{ServiceDetail, Transactions},
};
use serde_json::json;

fn brief_form(workshop: i32) -> QuotationForm {
    serde_json::from_value(json!({
        "type": "Engine",
        "model": "Perodua Myvi",
        "year": 2019,
        "engine": "1.5L",
        "chassis": "PM2-123456",
        "quoteType": "brief",
        "images": [],
        "workshopId": workshop,
        "amount": 5,
    }))
    .unwrap()
}

#[test]
fn brief_quote() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");
    let info = create_quotation(&mut conn, brief_form(w.get_id()), IdScheme::Short).unwrap();
    assert_eq!(info.get_title(), "Engine Quote: Perodua Myvi");
    assert_eq!(info.get_kind(), TransactionKind::Quotation);
    assert_eq!(info.get_amount(), Money::from_cents(500));

    let tx = Transactions::get(&mut conn, info.get_id()).unwrap();
    match &tx.detail {
        ServiceDetail::Quotation(q) => {
            assert_eq!(q.get_quote_type(), QuoteType::Brief);
            assert!(!q.has_images());
            assert_eq!(q.get_workshop_id(), w.get_id());
        }
        other => panic!("unexpected detail {:?}", other),
    }

    let view = serde_json::to_value(tx.view()).unwrap();
    assert_eq!(view["quoteType"], "brief");
    assert_eq!(view["workshopId"], w.get_id());
    assert!(view["adminMessage"].is_null());
    assert_eq!(view["type"], "Quotation");
}

#[test]
fn detailed_quote_with_images() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");
    let user = create_user(&mut conn, "driver@example.org");
    let mut form = brief_form(w.get_id());
    form.label = None;
    form.quote_type = Some(QuoteType::Detailed);
    form.amount = Some(Money::from_cents(1500));
    form.images = vec!["front.jpg".into(), "engine-bay.jpg".into()];
    form.user_id = Some(user.get_id());

    let info = create_quotation(&mut conn, form, IdScheme::Long).unwrap();
    assert_eq!(info.get_title(), "Detailed Quote: Perodua Myvi");
    assert_eq!(info.get_id().len(), 34);
    assert_eq!(info.get_user_id(), Some(user.get_id()));
    match Transactions::get(&mut conn, info.get_id()).unwrap().detail {
        ServiceDetail::Quotation(q) => {
            assert_eq!(q.get_images().unwrap(), vec!["front.jpg", "engine-bay.jpg"]);
        }
        other => panic!("unexpected detail {:?}", other),
    }
}

#[test]
fn price_follows_tier() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");

    let mut form = brief_form(w.get_id());
    form.amount = Some(Money::from_cents(100));
    assert!(matches!(
        create_quotation(&mut conn, form, IdScheme::Short),
        Err(AssistDbError::Validation(_))
    ));

    // Paying the detailed price for a brief quote is just as wrong
    let mut form = brief_form(w.get_id());
    form.amount = Some(Money::from_cents(1500));
    assert!(matches!(
        create_quotation(&mut conn, form, IdScheme::Short),
        Err(AssistDbError::Validation(_))
    ));
    assert_eq!(Transactions::count(&mut conn).unwrap(), 0);
}

#[test]
fn tier_limits() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");

    let mut form = brief_form(w.get_id());
    form.images = (0..4).map(|i| format!("{}.jpg", i)).collect();
    assert!(matches!(
        create_quotation(&mut conn, form, IdScheme::Short),
        Err(AssistDbError::Validation(_))
    ));

    let mut form = brief_form(w.get_id());
    form.description = Some("x".repeat(101));
    assert!(matches!(
        create_quotation(&mut conn, form, IdScheme::Short),
        Err(AssistDbError::Validation(_))
    ));
}

#[test]
fn workshop_is_required() {
    let mut conn = establish_connection();
    let mut form = brief_form(1);
    form.workshop_id = None;
    match create_quotation(&mut conn, form, IdScheme::Short) {
        Err(AssistDbError::Validation(msg)) => assert_eq!(msg, "Workshop ID is required"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        create_quotation(&mut conn, brief_form(1), IdScheme::Short),
        Err(AssistDbError::ReferenceNotFound(_))
    ));
}

#[test]
fn admin_message() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");
    let info = create_quotation(&mut conn, brief_form(w.get_id()), IdScheme::Short).unwrap();

    let tx = Transactions::set_admin_message(&mut conn, info.get_id(), Some("Bring the car in on Monday")).unwrap();
    let view = serde_json::to_value(tx.view()).unwrap();
    assert_eq!(view["adminMessage"], "Bring the car in on Monday");

    let tx = Transactions::set_admin_message(&mut conn, info.get_id(), Some("")).unwrap();
    assert!(serde_json::to_value(tx.view()).unwrap()["adminMessage"].is_null());

    assert!(matches!(
        Transactions::set_admin_message(&mut conn, "TX9999X", Some("hi")),
        Err(AssistDbError::NotFound("Transaction"))
    ));
}

#[test]
fn images_may_be_null_or_absent() {
    let mut conn = establish_connection();
    let w = create_workshop(&mut conn, "Bengkel Ah Seng");
    let mut raw = json!({
        "model": "Proton Saga",
        "year": "2015",
        "engine": "1.3L",
        "chassis": "PS-998877",
        "images": null,
        "workshopId": w.get_id(),
        "amount": 5,
    });
    let form: QuotationForm = serde_json::from_value(raw.clone()).unwrap();
    assert!(form.images.is_empty());
    let info = create_quotation(&mut conn, form, IdScheme::Short).unwrap();
    assert_eq!(info.get_title(), "Brief Quote: Proton Saga");

    raw.as_object_mut().unwrap().remove("images");
    let form: QuotationForm = serde_json::from_value(raw).unwrap();
    assert!(form.images.is_empty());
}
