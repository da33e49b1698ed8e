use carto_coerce::{Coercer, ConversionError, DataType, ModelValue, RawValue, TypeSpec};
use pretty_assertions::assert_eq;

fn raw(yaml: &str) -> RawValue {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn yaml_values_coerce_by_declared_type() {
    let coercer = Coercer::new().with_host_path_separator(':');
    let cases = [
        ("7001", DataType::Integer, ModelValue::Int(7001)),
        ("'7001'", DataType::Long, ModelValue::Long(7001)),
        ("true", DataType::Boolean, ModelValue::Bool(true)),
        ("'1'", DataType::Boolean, ModelValue::Bool(false)),
        ("1", DataType::Boolean, ModelValue::Bool(true)),
        ("0.75", DataType::Double, ModelValue::Double(0.75)),
        ("hello", DataType::String, ModelValue::String("hello".into())),
    ];
    for (text, ty, expected) in cases {
        let value = coercer.coerce(&TypeSpec::new(ty), None, &raw(text)).unwrap();
        assert_eq!(value, Some(expected), "{text} as {ty}");
    }
}

#[test]
fn yaml_list_to_semicolon_string() {
    let coercer = Coercer::new();
    let value = coercer
        .coerce(&TypeSpec::new(DataType::SemicolonDelimited), None, &raw("[a, b, c]"))
        .unwrap();
    assert_eq!(value, Some(ModelValue::String("a;b;c".into())));
}

#[test]
fn read_type_list_preferred_comma() {
    let coercer = Coercer::new();
    let spec = TypeSpec::new(DataType::String)
        .with_read(DataType::SemicolonDelimited)
        .with_preferred(DataType::CommaDelimited);
    let value = coercer.coerce(&spec, None, &raw("'x;y'")).unwrap();
    assert_eq!(value, Some(ModelValue::String("x,y".into())));
}

#[test]
fn yaml_map_to_properties_serializes_in_order() {
    let coercer = Coercer::new();
    let value = coercer
        .coerce(&TypeSpec::new(DataType::Properties), None, &raw("{b: 2, a: one}"))
        .unwrap()
        .unwrap();
    assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"b":"2","a":"one"}"#);
}

#[test]
fn null_is_absent() {
    let coercer = Coercer::new();
    assert_eq!(coercer.coerce(&TypeSpec::new(DataType::List), None, &raw("~")).unwrap(), None);
}

#[test]
fn bad_integer_reports_value() {
    let coercer = Coercer::new();
    let err = coercer
        .coerce(&TypeSpec::new(DataType::Integer), None, &raw("'ten'"))
        .unwrap_err();
    assert_eq!(
        err,
        ConversionError::InvalidValue {
            ty: DataType::Integer,
            value: "ten".into()
        }
    );
    assert_eq!(err.to_string(), "cannot convert 'ten' to integer");
}
