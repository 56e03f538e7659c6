use super::*;

#[test]
fn formats_progressively_while_typing() {
    assert_eq!(format_phone_input(""), "");
    assert_eq!(format_phone_input("5"), "+1 (5)");
    assert_eq!(format_phone_input("555"), "+1 (555)");
    assert_eq!(format_phone_input("5551"), "+1 (555)-1");
    assert_eq!(format_phone_input("555123"), "+1 (555)-123");
    assert_eq!(format_phone_input("5551234"), "+1 (555)-123-4");
    assert_eq!(format_phone_input("5551234567"), "+1 (555)-123-4567");
}

#[test]
fn backspacing_into_prefix_clears_field() {
    for raw in ["+", "+1", "+1 "] {
        assert_eq!(format_phone_input(raw), "", "raw {raw:?}");
    }
}

#[test]
fn strips_punctuation_and_truncates_to_ten_digits() {
    assert_eq!(format_phone_input("(555) 123-4567 ext 89"), "+1 (555)-123-4567");
    assert_eq!(format_phone_input("555.123.45678"), "+1 (555)-123-4567");
}

#[test]
fn drops_country_code_only_after_prefix() {
    // typed into an already masked value
    assert_eq!(format_phone_input("+1 (555)-123-45678"), "+1 (555)-123-4567");
    assert_eq!(format_phone_input("+1 (1"), "+1 (1)");
    // a leading 1 without the prefix is part of the number
    assert_eq!(format_phone_input("1555"), "+1 (155)-5");
}

#[test]
fn formatting_is_idempotent() {
    for digits in ["5", "55512", "1555123456", "5551234567", "0000000000", "1111111111"] {
        let once = format_phone_digits(digits);
        let twice = format_phone_input(&once);
        assert_eq!(once, twice, "digits {digits}");
        assert_eq!(national_digits(&twice), digits);
    }
}
