use super::*;

fn fmt(spec: &str, value: impl Into<TemplateValue>) -> String {
    FormatSpec::parse(spec).unwrap().apply(&value.into()).unwrap()
}

#[test]
fn integer_padding_and_alignment() {
    assert_eq!(fmt("", 7), "7");
    assert_eq!(fmt("03d", 7), "007");
    assert_eq!(fmt("04", -7), "-007");
    assert_eq!(fmt("5", 42), "   42");
    assert_eq!(fmt("<5", 42), "42   ");
    assert_eq!(fmt("^6", 42), "  42  ");
    assert_eq!(fmt("*>5d", 42), "***42");
    assert_eq!(fmt("+d", 3), "+3");
    assert_eq!(fmt(" d", 3), " 3");
    assert_eq!(fmt(",", 1234567), "1,234,567");
}

#[test]
fn integer_radix_types() {
    assert_eq!(fmt("x", 255), "ff");
    assert_eq!(fmt("#x", 255), "0xff");
    assert_eq!(fmt("X", 255), "FF");
    assert_eq!(fmt("#06x", 255), "0x00ff");
    assert_eq!(fmt("b", 5), "101");
    assert_eq!(fmt("o", 8), "10");
}

#[test]
fn float_types() {
    assert_eq!(fmt("", 1.0), "1.0");
    assert_eq!(fmt("", 0.25), "0.25");
    assert_eq!(fmt(".2f", 3.14159), "3.14");
    assert_eq!(fmt("08.3f", -1.5), "-001.500");
    assert_eq!(fmt("f", 2), "2.000000");
    assert_eq!(fmt(".2e", 1500.0), "1.50e+03");
    assert_eq!(fmt("E", 0.00012), "1.200000E-04");
    assert_eq!(fmt("g", 0.5), "0.5");
    assert_eq!(fmt("g", 1234567.0), "1.23457e+06");
    assert_eq!(fmt(".3g", 0.0001234), "0.000123");
    assert_eq!(fmt(".1%", 0.25), "25.0%");
}

#[test]
fn string_formatting() {
    assert_eq!(fmt("", "cam"), "cam");
    assert_eq!(fmt("5", "ab"), "ab   ");
    assert_eq!(fmt(">5", "ab"), "   ab");
    assert_eq!(fmt(".2s", "abcdef"), "ab");
}

#[test]
fn invalid_specs_are_rejected() {
    assert!(FormatSpec::parse("q").is_err());
    assert!(FormatSpec::parse("5dd").is_err());
    assert!(FormatSpec::parse(".").is_err());
    let s = FormatSpec::parse("d").unwrap();
    assert!(s.apply(&TemplateValue::Float(1.5)).is_err());
    assert!(s.apply(&TemplateValue::Str("a".into())).is_err());
    let s = FormatSpec::parse("+").unwrap();
    assert!(s.apply(&TemplateValue::Str("a".into())).is_err());
    let s = FormatSpec::parse(".2").unwrap();
    assert!(s.apply(&TemplateValue::Int(3)).is_err());
}
