use super::*;
use crate::test_utils::{create_user, establish_connection};

#[test]
fn register_user() {
    let mut conn = establish_connection();
    let user = create_user(&mut conn, "TestUser@example.org");
    assert_eq!(user.get_phone(), Some("+60123456789"));
    assert!(user.verify_passwd("strongpasswd").unwrap());

    // Email uniqueness ignores case
    assert!(matches!(
        UserForm::new("testuser@example.org", "x", "Someone", None).create(&mut conn),
        Err(AssistDbError::Validation(_))
    ));
    assert!(matches!(
        UserForm::new("other@example.org", "", "Someone", None).create(&mut conn),
        Err(AssistDbError::Validation(_))
    ));
    assert_eq!(Users::count(&mut conn).unwrap(), 1);
}

#[test]
fn password_is_never_serialized() {
    let mut conn = establish_connection();
    let user = create_user(&mut conn, "TestUser@example.org");
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["email"], "TestUser@example.org");
}

#[test]
fn login_does_not_reveal_which_part_is_wrong() {
    let mut conn = establish_connection();
    let user = create_user(&mut conn, "TestUser@example.org");

    let logged_in = Users::login(&mut conn, LoginForm::new("TestUser@example.org", "strongpasswd")).unwrap();
    assert_eq!(logged_in.get_id(), user.get_id());

    let wrong_password = Users::login(&mut conn, LoginForm::new("TestUser@example.org", "nope")).unwrap_err();
    let unknown_email = Users::login(&mut conn, LoginForm::new("ghost@example.org", "strongpasswd")).unwrap_err();
    assert!(matches!(wrong_password, AssistDbError::Authentication));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    assert!(matches!(
        Users::login(&mut conn, LoginForm::default()),
        Err(AssistDbError::Validation(_))
    ));
}

#[test]
fn update_user() {
    let mut conn = establish_connection();
    let user = create_user(&mut conn, "TestUser@example.org");
    create_user(&mut conn, "taken@example.org");

    let patch: UserPatch = serde_json::from_str(
        r#"{"email": "taken@example.org", "name": "Ahmad"}"#,
    )
    .unwrap();
    assert!(matches!(
        Users::update(&mut conn, user.get_id(), patch),
        Err(AssistDbError::Validation(_))
    ));

    // Keeping one's own email is fine, the phone is cleared and the password stays
    let patch: UserPatch = serde_json::from_str(
        r#"{"email": "TestUser@example.org", "name": "Ahmad", "phone": "", "password": ""}"#,
    )
    .unwrap();
    let updated = Users::update(&mut conn, user.get_id(), patch).unwrap();
    assert_eq!(updated.get_name(), "Ahmad");
    assert_eq!(updated.get_phone(), None);
    assert!(updated.verify_passwd("strongpasswd").unwrap());

    let patch: UserPatch = serde_json::from_str(
        r#"{"email": "TestUser@example.org", "name": "Ahmad", "password": "newpasswd"}"#,
    )
    .unwrap();
    let updated = Users::update(&mut conn, user.get_id(), patch).unwrap();
    assert!(updated.verify_passwd("newpasswd").unwrap());

    let patch: UserPatch = serde_json::from_str(r#"{"name": "Ahmad"}"#).unwrap();
    assert!(matches!(
        Users::update(&mut conn, user.get_id(), patch),
        Err(AssistDbError::Validation(_))
    ));
}

#[test]
fn delete_user() {
    let mut conn = establish_connection();
    let user = create_user(&mut conn, "TestUser@example.org");
    Users::delete_by_id(&mut conn, user.get_id()).unwrap();
    assert!(Users::list(&mut conn).unwrap().is_empty());
    assert!(matches!(
        Users::delete_by_id(&mut conn, user.get_id()),
        Err(AssistDbError::NotFound("User"))
    ));
}

#[test]
fn unknown_email_costs_a_hash() {
    use std::time::{Duration, Instant};
    let mut conn = establish_connection();
    create_user(&mut conn, "TestUser@example.org");

    let mut timed = |email: &str| -> Duration {
        let start = Instant::now();
        for _ in 0..20 {
            assert!(Users::login(&mut conn, LoginForm::new(email, "nope")).is_err());
        }
        start.elapsed()
    };
    let wrong_password = timed("TestUser@example.org");
    let unknown_email = timed("ghost@example.org");
    assert!(
        unknown_email.as_secs_f64() > wrong_password.as_secs_f64() * 0.3,
        "unknown {:?} vs wrong {:?}",
        unknown_email,
        wrong_password
    );
}
