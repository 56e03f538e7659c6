use super::*;

#[test]
fn day_parses_case_insensitively_and_rejects_unknown() {
    assert_eq!("Friday".parse::<Day>(), Ok(Day::Friday));
    assert_eq!(" saturday ".parse::<Day>(), Ok(Day::Saturday));
    assert_eq!(
        "sunday".parse::<Day>(),
        Err(UnknownDay("sunday".to_string()))
    );
}

#[test]
fn day_serializes_lowercase_and_displays_capitalized() {
    let json = serde_json::to_string(&Day::Thursday).expect("json");
    assert_eq!(json, "\"thursday\"");
    assert_eq!(Day::Thursday.display_name(), "Thursday");
}

#[test]
fn guest_entry_defaults_missing_fields_to_empty() {
    let entry: GuestEntry = serde_json::from_str(r#"{"name":"Bo"}"#).expect("json");
    assert_eq!(entry.name, "Bo");
    assert_eq!(entry.email, "");
    assert_eq!(entry.field(GuestField::About), "");
}

#[test]
fn record_omits_absent_annotations() {
    let record = RsvpRecord {
        name: "A".into(),
        email: String::new(),
        phone: String::new(),
        about: String::new(),
        day: Day::Friday,
        guest_type: GuestType::Friend,
        primary_contact: None,
        guests: None,
    };
    let value = serde_json::to_value(&record).expect("json");
    assert!(value.get("primary_contact").is_none());
    assert!(value.get("guests").is_none());
    assert_eq!(value["guest_type"], "Friend");
}
