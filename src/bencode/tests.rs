use std::collections::{BTreeMap, HashMap};
use std::io::BufReader;

use bytes::Bytes;
use proptest::prelude::*;

use super::*;

const STREAM: &[u8] = b"0:li777e6:StRingi-42e6:!@$#%^i0eei2147483647ed4:key112:string value4:key2i42e4:key3li777e6:StRingi-42e6:!@$#%^i0eeei-2147483648e";

fn simple_list() -> Value {
    Value::List(vec![
        Value::Integer(777),
        Value::string("StRing"),
        Value::Integer(-42),
        Value::string("!@$#%^"),
        Value::Integer(0),
    ])
}

fn stream_values() -> Vec<Value> {
    vec![
        Value::string(""),
        simple_list(),
        Value::Integer(2147483647),
        Value::dict([
            ("key1", Value::string("string value")),
            ("key2", Value::Integer(42)),
            ("key3", simple_list()),
        ]),
        Value::Integer(-2147483648),
    ]
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-42e").unwrap(), Value::Integer(-42));
    assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
}

#[test]
fn test_decode_integer_loose_forms() {
    // Leading zeros and negative zero are accepted as-is.
    assert_eq!(decode(b"i007e").unwrap(), Value::Integer(7));
    assert_eq!(decode(b"i-0e").unwrap(), Value::Integer(0));
}

#[test]
fn test_decode_integer_invalid() {
    assert!(matches!(
        decode(b"ie"),
        Err(DecodeError::MalformedInteger { found: Some('e'), .. })
    ));
    assert!(matches!(
        decode(b"i-e"),
        Err(DecodeError::MalformedInteger { found: Some('e'), .. })
    ));
    assert!(matches!(
        decode(b"i--5e"),
        Err(DecodeError::MalformedInteger { found: Some('-'), .. })
    ));
    assert!(matches!(
        decode(b"i5-5e"),
        Err(DecodeError::MalformedInteger { found: Some('-'), .. })
    ));
    assert!(matches!(
        decode(b"i42"),
        Err(DecodeError::MalformedInteger { found: None, .. })
    ));
}

#[test]
fn test_decode_integer_malformed_char() {
    let err = decode(b"i5O5e").unwrap_err();
    match &err {
        DecodeError::MalformedInteger { found, remaining } => {
            assert_eq!(*found, Some('O'));
            assert_eq!(*remaining, 2);
        }
        other => panic!("expected malformed integer, got {other:?}"),
    }
    assert_eq!(err.production(), Some(Production::Integer));
    assert_eq!(
        err.to_string(),
        "Integer value contains unexpected character - O (bytes left 2)"
    );
}

#[test]
fn test_decode_integer_bounds() {
    assert_eq!(
        decode(b"i9223372036854775807e").unwrap(),
        Value::Integer(i64::MAX)
    );
    assert_eq!(
        decode(b"i-9223372036854775808e").unwrap(),
        Value::Integer(i64::MIN)
    );
    assert!(matches!(
        decode(b"i9223372036854775808e"),
        Err(DecodeError::IntegerOverflow)
    ));
    assert!(matches!(
        decode(b"i-9223372036854775809e"),
        Err(DecodeError::IntegerOverflow)
    ));
}

#[test]
fn test_decode_bytes() {
    assert_eq!(
        decode(b"4:spam").unwrap(),
        Value::Bytes(Bytes::from_static(b"spam"))
    );
    assert_eq!(decode(b"0:").unwrap(), Value::Bytes(Bytes::from_static(b"")));
}

#[test]
fn test_decode_bytes_binary() {
    let value = decode(b"3:\x00\xff:").unwrap();
    assert_eq!(value.as_bytes().map(|b| b.as_ref()), Some(&b"\x00\xff:"[..]));
    assert_eq!(value.as_str(), None);
}

#[test]
fn test_decode_truncated_string() {
    let err = decode(b"3:12").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TruncatedString {
            expected: 3,
            found: 2
        }
    ));
    assert!(err.is_eof());
    assert!(err.to_string().starts_with("unexpected end of stream"));
}

#[test]
fn test_decode_malformed_length_prefix() {
    assert!(matches!(
        decode(b"3x:abc"),
        Err(DecodeError::MalformedLengthPrefix { found: Some('x'), .. })
    ));
    assert!(matches!(
        decode(b"12"),
        Err(DecodeError::MalformedLengthPrefix { found: None, .. })
    ));
    assert!(matches!(
        decode(b"99999999999999999999999:"),
        Err(DecodeError::LengthOverflow)
    ));
}

#[test]
fn test_decode_huge_length_does_not_allocate() {
    let err = decode(b"4294967296:abc").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TruncatedString { found: 3, .. }
    ));
}

#[test]
fn test_decode_list() {
    let result = decode(b"l4:spami42ee").unwrap();
    match result {
        Value::List(l) => {
            assert_eq!(l.len(), 2);
            assert_eq!(l[0], Value::Bytes(Bytes::from_static(b"spam")));
            assert_eq!(l[1], Value::Integer(42));
        }
        _ => panic!("expected list"),
    }
}

#[test]
fn test_decode_truncated_list() {
    let err = decode(b"l3:qwe").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TruncatedCollection {
            production: Production::List
        }
    ));
    assert_eq!(err.to_string(), "unexpected end of stream while decoding List");
}

#[test]
fn test_decode_list_unexpected_char() {
    let err = decode(b"li1ex").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedCharacter {
            production: Production::List,
            found: 'x',
            remaining: 1
        }
    ));
}

#[test]
fn test_decode_dict() {
    let result = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
    let dict = result.as_dict().unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict[0].0, Bytes::from_static(b"cow"));
    assert_eq!(result.get(b"spam"), Some(&Value::string("eggs")));
}

#[test]
fn test_decode_dict_preserves_order() {
    let result = decode(b"d1:bi1e1:ai2e1:bi3ee").unwrap();
    let keys: Vec<&[u8]> = result
        .as_dict()
        .unwrap()
        .iter()
        .map(|(k, _)| k.as_ref())
        .collect();
    assert_eq!(keys, vec![&b"b"[..], &b"a"[..], &b"b"[..]]);
    // First entry wins on lookup.
    assert_eq!(result.get(b"b"), Some(&Value::Integer(1)));
}

#[test]
fn test_decode_dict_bad_key() {
    let err = decode(b"d2:123:123i5ee").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedCharacter {
            production: Production::Dict,
            found: 'i',
            ..
        }
    ));
    assert!(err
        .to_string()
        .starts_with("Dict value contains unexpected character - i"));

    assert!(matches!(
        decode(b"di1ei2ee"),
        Err(DecodeError::UnexpectedCharacter {
            production: Production::Dict,
            found: 'i',
            ..
        })
    ));
}

#[test]
fn test_decode_truncated_dict() {
    for input in [&b"d"[..], b"d3:key", b"d3:keyi1e"] {
        assert!(
            matches!(
                decode(input),
                Err(DecodeError::TruncatedCollection {
                    production: Production::Dict
                })
            ),
            "input {:?}",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn test_decode_top_level_unexpected_char() {
    let err = decode(b"x").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedCharacter {
            production: Production::Value,
            found: 'x',
            remaining: 1
        }
    ));
}

#[test]
fn test_decode_empty_and_trailing() {
    assert!(matches!(decode(b""), Err(DecodeError::EmptyInput)));
    assert!(matches!(
        decode(b"i42eextra"),
        Err(DecodeError::TrailingData { remaining: 5 })
    ));
}

#[test]
fn test_decode_stream() {
    let values = decode_all(STREAM).unwrap();
    assert_eq!(values, stream_values());
    assert_eq!(values[3].get(b"key2"), Some(&Value::Integer(42)));
}

#[test]
fn test_decoder_clean_end_is_repeatable() {
    let mut decoder = Decoder::new(&b"i1e"[..]);
    assert_eq!(decoder.decode().unwrap(), Some(Value::Integer(1)));
    assert!(decoder.decode().unwrap().is_none());
    assert!(decoder.decode().unwrap().is_none());

    let mut empty = Decoder::new(&b""[..]);
    assert!(empty.decode().unwrap().is_none());
}

#[test]
fn test_decoder_from_reader() {
    // A tiny buffer forces refills in the middle of tokens.
    let reader = BufReader::with_capacity(3, STREAM);
    let values: Result<Vec<_>, _> = Decoder::new(reader).collect();
    assert_eq!(values.unwrap(), stream_values());

    let values: Result<Vec<_>, _> = Decoder::from_reader(STREAM).collect();
    assert_eq!(values.unwrap(), stream_values());
}

#[test]
fn test_decoder_iterator_stops_after_error() {
    let mut decoder = Decoder::new(&b"i1ei2xi3e"[..]);
    assert_eq!(decoder.next().unwrap().unwrap(), Value::Integer(1));
    assert!(decoder.next().unwrap().is_err());
    assert!(decoder.next().is_none());
}

#[test]
fn test_decoder_max_depth() {
    let data = b"lllleeee";
    assert!(Decoder::new(&data[..]).decode().is_ok());
    assert!(Decoder::new(&data[..]).with_max_depth(4).decode().is_ok());
    assert!(matches!(
        Decoder::new(&data[..]).with_max_depth(3).decode(),
        Err(DecodeError::NestingTooDeep { limit: 3 })
    ));
    assert!(matches!(
        Decoder::new(&b"d1:ale1:bdee"[..]).with_max_depth(1).decode(),
        Err(DecodeError::NestingTooDeep { limit: 1 })
    ));
    assert_eq!(
        Decoder::new(&b"i1e"[..]).with_max_depth(0).decode().unwrap(),
        Some(Value::Integer(1))
    );
}

#[test]
fn test_decode_deep_nesting_without_limit() {
    let depth = 500;
    let mut data = vec![b'l'; depth];
    data.extend(std::iter::repeat(b'e').take(depth));
    let mut value = decode(&data).unwrap();
    for _ in 1..depth {
        value = match value {
            Value::List(mut l) => l.pop().unwrap(),
            other => panic!("expected list, got {other}"),
        };
    }
    assert_eq!(value, Value::List(vec![]));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::Integer(42)).unwrap(), b"i42e");
    assert_eq!(encode(&Value::Integer(-42)).unwrap(), b"i-42e");
    assert_eq!(encode(&Value::Integer(0)).unwrap(), b"i0e");
    assert_eq!(
        encode(&Value::Integer(i64::MIN)).unwrap(),
        b"i-9223372036854775808e"
    );
}

#[test]
fn test_encode_bytes() {
    assert_eq!(
        encode(&Value::Bytes(Bytes::from_static(b"spam"))).unwrap(),
        b"4:spam"
    );
    assert_eq!(encode(&Value::string("")).unwrap(), b"0:");
}

#[test]
fn test_encode_empty_containers() {
    assert_eq!(encode(&Value::List(vec![])).unwrap(), b"le");
    assert_eq!(encode(&Value::Dict(vec![])).unwrap(), b"de");
}

#[test]
fn test_encode_list() {
    assert_eq!(
        encode(&simple_list()).unwrap(),
        b"li777e6:StRingi-42e6:!@$#%^i0ee"
    );
}

#[test]
fn test_encode_dict_keeps_order() {
    let dict = Value::dict([("cow", Value::string("moo")), ("ant", Value::Integer(1))]);
    assert_eq!(encode(&dict).unwrap(), b"d3:cow3:moo3:anti1ee");
}

#[test]
fn test_encode_stream() {
    let mut out: Vec<u8> = Vec::new();
    for value in stream_values() {
        encode_to(&value, &mut out).unwrap();
    }
    assert_eq!(out, STREAM);
}

#[test]
fn test_encode_canonical() {
    let inner = Value::dict([("y", Value::Integer(1)), ("x", Value::Integer(2))]);
    let dict = Value::dict([
        ("b", Value::Integer(1)),
        ("a", Value::List(vec![inner])),
        ("b", Value::Integer(0)),
    ]);

    let encoder = Encoder::new().canonical(true);
    assert!(encoder.is_canonical());
    assert_eq!(
        encoder.encode(&dict).unwrap(),
        b"d1:ald1:xi2e1:yi1eee1:bi1e1:bi0ee"
    );
    assert_eq!(
        encode(&dict).unwrap(),
        b"d1:bi1e1:ald1:yi1e1:xi2eee1:bi0ee"
    );
}

#[test]
fn test_roundtrip() {
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_roundtrip_unsorted_keys() {
    let original = b"d4:zeta0:5:alphale4:betad1:ci-1eee";
    let decoded = decode(original).unwrap();
    assert_eq!(encode(&decoded).unwrap(), original);
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());

    let value = Value::Bytes(Bytes::from_static(b"test"));
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
    assert!(value.get(b"any").is_none());

    let value = Value::dict([("k", Value::Integer(1))]);
    assert_eq!(value.into_dict().map(|d| d.len()), Some(1));
}

#[test]
fn test_value_display() {
    let value = decode(b"d4:listli1e3:twoe3:bin2:\xff\x00e").unwrap();
    assert_eq!(value.to_string(), r#"{"list": [1, "two"], "bin": 0xff00}"#);
}

#[test]
fn test_to_bytes_native() {
    assert_eq!(to_bytes(&777i32).unwrap(), b"i777e");
    assert_eq!(to_bytes("StRing").unwrap(), b"6:StRing");
    assert_eq!(to_bytes(&'é').unwrap(), "2:é".as_bytes());
    assert_eq!(to_bytes(&Vec::<i64>::new()).unwrap(), b"le");
    assert_eq!(to_bytes(&[Some(1u8), Some(2)]).unwrap(), b"li1ei2ee");
    assert_eq!(
        to_bytes(&Bytes::from_static(b"\x00\x01")).unwrap(),
        b"2:\x00\x01"
    );

    let mut map = BTreeMap::new();
    map.insert("b", vec!["x"]);
    map.insert("a", vec![]);
    assert_eq!(to_bytes(&map).unwrap(), b"d1:ale1:bl1:xee");

    let entries = Entries(vec![
        ("key1", Value::string("string value")),
        ("key2", Value::Integer(42)),
        ("key3", simple_list()),
    ]);
    assert_eq!(entries.to_value().unwrap(), stream_values()[3]);
}

#[test]
fn test_to_bytes_hash_map_canonical() {
    let mut map = HashMap::new();
    map.insert("zz".to_string(), 1u32);
    map.insert("aa".to_string(), 2u32);
    let value = map.to_value().unwrap();
    assert_eq!(
        Encoder::new().canonical(true).encode(&value).unwrap(),
        b"d2:aai2e2:zzi1ee"
    );
}

#[test]
fn test_to_bytes_unsupported_type() {
    assert!(matches!(
        to_bytes(&1.5f64),
        Err(EncodeError::UnsupportedType("f64"))
    ));
    assert!(matches!(
        to_bytes(&vec![Some(1i64), None]),
        Err(EncodeError::UnsupportedType("None"))
    ));
    assert!(matches!(
        to_bytes(&true),
        Err(EncodeError::UnsupportedType("bool"))
    ));
    assert!(matches!(
        to_bytes(&u64::MAX),
        Err(EncodeError::UnsupportedType(_))
    ));
    assert_eq!(to_bytes(&(i64::MAX as u64)).unwrap(), b"i9223372036854775807e");
}

#[test]
fn test_to_bytes_invalid_key() {
    let entries = Entries(vec![
        (Value::string("This strange"), Value::string("dictionary")),
        (Value::Integer(666), Value::string("fail")),
    ]);
    let err = to_bytes(&entries).unwrap_err();
    assert!(matches!(err, EncodeError::InvalidKeyType("integer")));
    assert_eq!(
        err.to_string(),
        "dictionary key is not a byte string: integer"
    );

    let mut map = BTreeMap::new();
    map.insert(1i64, "one");
    assert!(matches!(
        to_bytes(&map),
        Err(EncodeError::InvalidKeyType("integer"))
    ));
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec(
                (prop::collection::vec(any::<u8>(), 0..8), inner),
                0..6
            )
            .prop_map(|entries| Value::dict(entries)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_roundtrip(value in arb_value()) {
        let encoded = encode(&value).unwrap();
        prop_assert_eq!(decode(&encoded).unwrap(), value);
    }

    #[test]
    fn prop_stream_roundtrip(values in prop::collection::vec(arb_value(), 0..5)) {
        let mut encoded: Vec<u8> = Vec::new();
        for value in &values {
            encode_to(value, &mut encoded).unwrap();
        }
        prop_assert_eq!(decode_all(&encoded).unwrap(), values);
    }

    #[test]
    fn prop_canonical_is_sorted_roundtrip(value in arb_value()) {
        let encoded = Encoder::new().canonical(true).encode(&value).unwrap();
        let decoded = decode(&encoded).unwrap();
        let reencoded = Encoder::new().encode(&decoded).unwrap();
        prop_assert_eq!(reencoded, encoded);
    }

    #[test]
    fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode_all(&data);
    }
}
