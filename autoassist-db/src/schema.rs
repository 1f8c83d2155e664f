table! {
    admin (id) {
        id -> Integer,
        email -> Text,
        password -> Text,
        name -> Text,
        role -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        last_login -> Nullable<Timestamp>,
    }
}

table! {
    banner_sliders (id) {
        id -> Integer,
        title -> Text,
        subtitle -> Text,
        image -> Text,
        link_url -> Nullable<Text>,
        display_order -> Integer,
        is_active -> Bool,
    }
}

table! {
    cart_items (id) {
        id -> Integer,
        user_id -> Integer,
        product_id -> Integer,
        quantity -> Integer,
    }
}

table! {
    products (id) {
        id -> Integer,
        name -> Text,
        price -> BigInt,
        category -> Text,
        image -> Text,
        stock -> Integer,
        workshop_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

table! {
    use diesel::sql_types::*;
    use crate::enums::QuoteTypeMapping;
    use crate::enums::TransactionStatusMapping;

    quotations (id) {
        id -> Integer,
        transaction_id -> Text,
        user_id -> Nullable<Integer>,
        workshop_id -> Integer,
        model -> Text,
        year -> Text,
        engine -> Text,
        chassis -> Text,
        description -> Nullable<Text>,
        quote_type -> QuoteTypeMapping,
        images -> Nullable<Text>,
        amount -> BigInt,
        status -> TransactionStatusMapping,
        date -> Date,
        admin_message -> Nullable<Text>,
    }
}

table! {
    shop_order_items (id) {
        id -> Integer,
        order_id -> Integer,
        product_id -> Integer,
        product_name -> Text,
        product_price -> BigInt,
        quantity -> Integer,
        subtotal -> BigInt,
    }
}

table! {
    use diesel::sql_types::*;
    use crate::enums::TransactionStatusMapping;

    shop_orders (id) {
        id -> Integer,
        transaction_id -> Text,
        user_id -> Nullable<Integer>,
        workshop_id -> Integer,
        total -> BigInt,
        status -> TransactionStatusMapping,
        date -> Date,
    }
}

table! {
    use diesel::sql_types::*;
    use crate::enums::TransactionStatusMapping;

    towing_requests (id) {
        id -> Integer,
        transaction_id -> Text,
        user_id -> Nullable<Integer>,
        workshop_id -> Integer,
        pickup -> Text,
        destination -> Text,
        pickup_latitude -> Nullable<Double>,
        pickup_longitude -> Nullable<Double>,
        destination_latitude -> Nullable<Double>,
        destination_longitude -> Nullable<Double>,
        amount -> BigInt,
        status -> TransactionStatusMapping,
        notes -> Nullable<Text>,
        date -> Date,
    }
}

table! {
    use diesel::sql_types::*;
    use crate::enums::TransactionKindMapping;
    use crate::enums::TransactionStatusMapping;

    transactions (id) {
        id -> Text,
        kind -> TransactionKindMapping,
        title -> Text,
        date -> Date,
        amount -> BigInt,
        status -> TransactionStatusMapping,
        user_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        email -> Text,
        password -> Text,
        name -> Text,
        phone -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    vehicles (id) {
        id -> Integer,
        user_id -> Integer,
        model -> Text,
        year -> Text,
        chassis -> Text,
        engine -> Text,
        plate_number -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    workshops (id) {
        id -> Integer,
        name -> Text,
        rating -> Double,
        location -> Text,
        icon -> Text,
        image -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

joinable!(cart_items -> products (product_id));
joinable!(cart_items -> users (user_id));
joinable!(products -> workshops (workshop_id));
joinable!(quotations -> transactions (transaction_id));
joinable!(quotations -> workshops (workshop_id));
joinable!(shop_order_items -> products (product_id));
joinable!(shop_order_items -> shop_orders (order_id));
joinable!(shop_orders -> transactions (transaction_id));
joinable!(shop_orders -> workshops (workshop_id));
joinable!(towing_requests -> transactions (transaction_id));
joinable!(towing_requests -> workshops (workshop_id));
joinable!(transactions -> users (user_id));
joinable!(vehicles -> users (user_id));

allow_tables_to_appear_in_same_query!(
    admin,
    banner_sliders,
    cart_items,
    products,
    quotations,
    shop_order_items,
    shop_orders,
    towing_requests,
    transactions,
    users,
    vehicles,
    workshops,
);
