use super::*;

fn primary() -> GuestEntry {
    GuestEntry {
        name: "Ana".into(),
        email: "foo@bar.com".into(),
        phone: "+1 (555)-555-5555".into(),
        about: "hi".into(),
    }
}

#[test]
fn email_pattern_requires_domain_with_tld() {
    assert!(!is_valid_email("foo"));
    assert!(!is_valid_email("foo@bar"));
    assert!(!is_valid_email("foo bar@baz.com"));
    assert!(!is_valid_email("@bar.com"));
    assert!(is_valid_email("foo@bar.com"));
    assert!(is_valid_email("first.last@sub.example.org"));
}

#[test]
fn complete_primary_passes() {
    assert_eq!(validate_entry(0, &primary()), FieldErrors::default());
}

#[test]
fn primary_flags_each_missing_field() {
    let cases: [(GuestField, &str); 4] = [
        (GuestField::Name, "   "),
        (GuestField::Email, ""),
        (GuestField::Phone, ""),
        (GuestField::About, ""),
    ];
    for (field, value) in cases {
        let mut entry = primary();
        *entry.field_mut(field) = value.to_string();
        let errors = validate_entry(0, &entry);
        assert_eq!(errors.failing(), vec![field]);
    }

    for bad in ["foo", "foo@bar"] {
        let entry = GuestEntry {
            email: bad.into(),
            ..primary()
        };
        assert!(validate_entry(0, &entry).email, "email {bad}");
    }
}

#[test]
fn friend_steps_only_need_name_and_about() {
    let friend = GuestEntry {
        name: "Bo".into(),
        about: "plus one".into(),
        ..GuestEntry::default()
    };
    assert!(!validate_entry(1, &friend).any());

    let errors = validate_entry(3, &GuestEntry::default());
    assert_eq!(errors.failing(), vec![GuestField::Name, GuestField::About]);
}
