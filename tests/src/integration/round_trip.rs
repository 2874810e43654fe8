//! # Round-Trip Properties
//!
//! Any strictly valid envelope survives encode → decode unchanged, in both
//! wire modes and both versions, whether decoded with the explicit
//! mode-specific decoder or through auto-detection.
//!
//! Binary mode carries extensions as header text and always sends a
//! `content-type`, so binary results are compared on normalized snapshots.

#[cfg(test)]
mod tests {
    use ce_core::constants::mime;
    use ce_core::message::{binary, structured};
    use ce_core::{Event, Mode, PropertyValue, SpecVersion, HTTP};
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    #[derive(Debug, Clone)]
    enum Payload {
        None,
        Json(Value),
        Bytes(Vec<u8>),
    }

    fn arb_version() -> impl Strategy<Value = SpecVersion> {
        prop_oneof![Just(SpecVersion::V1), Just(SpecVersion::V03)]
    }

    fn arb_payload() -> impl Strategy<Value = Payload> {
        prop_oneof![
            Just(Payload::None),
            prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..4).prop_map(|m| {
                Payload::Json(Value::Object(
                    m.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
                ))
            }),
            "[a-zA-Z0-9 ]{1,12}".prop_map(|s| Payload::Json(Value::String(s))),
            any::<i64>().prop_map(|n| Payload::Json(Value::from(n))),
            prop::collection::vec(any::<i32>(), 0..4)
                .prop_map(|v| Payload::Json(Value::from(v))),
            prop::collection::vec(any::<u8>(), 1..32).prop_map(Payload::Bytes),
        ]
    }

    fn arb_extension_value() -> impl Strategy<Value = PropertyValue> {
        prop_oneof![
            "[a-zA-Z0-9]{1,10}".prop_map(PropertyValue::from),
            any::<i32>().prop_map(PropertyValue::from),
            any::<bool>().prop_map(PropertyValue::from),
        ]
    }

    fn arb_time() -> impl Strategy<Value = String> {
        (2000i32..2030, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..1000).prop_map(
            |(y, mo, d, h, mi, ms)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:07.{ms:03}Z"),
        )
    }

    prop_compose! {
        fn arb_event()(
            version in arb_version(),
            id in "[a-z0-9]{1,12}",
            source in "/[a-z]{1,8}(/[a-z0-9]{1,8})?",
            event_type in "[a-z]{1,6}\\.[a-z]{1,6}",
            time in arb_time(),
            subject in proptest::option::of("[a-z]{1,10}"),
            schema in proptest::option::of("[a-z]{1,8}"),
            extensions in prop::collection::btree_map("x[a-z0-9]{1,8}", arb_extension_value(), 0..3),
            payload in arb_payload(),
            declare_content_type in any::<bool>(),
        ) -> Event {
            let mut builder = Event::builder()
                .spec_version(version)
                .id(id)
                .source(source)
                .event_type(event_type)
                .time(time);
            if let Some(subject) = subject {
                builder = builder.subject(subject);
            }
            if let Some(schema) = schema {
                builder = match version {
                    SpecVersion::V1 => builder.dataschema(format!("https://schemas.example.com/{schema}")),
                    SpecVersion::V03 => builder.schemaurl(format!("/schemas/{schema}")),
                };
            }
            for (name, value) in extensions {
                builder = builder.extension(name, value);
            }
            if declare_content_type {
                builder = builder.datacontenttype(match payload {
                    Payload::Bytes(_) => mime::OCTET_STREAM,
                    _ => mime::JSON,
                });
            }
            builder = match payload {
                Payload::None => builder,
                Payload::Json(value) => builder.data(value),
                Payload::Bytes(bytes) => builder.binary_data(bytes),
            };
            builder.build().expect("generated event must be valid")
        }
    }

    fn version_of(event: &Event) -> SpecVersion {
        event.spec_version().expect("generated version")
    }

    /// Snapshot as it reads after a binary-mode hop: extensions as header
    /// text and `datacontenttype` filled from the default `content-type`.
    fn binary_view(event: &Event) -> Map<String, Value> {
        let mut snapshot = event.to_snapshot();
        for (name, value) in event.extensions() {
            if let Some(text) = value.to_wire_text() {
                snapshot.insert(name.clone(), Value::String(text));
            }
        }
        snapshot
            .entry("datacontenttype")
            .or_insert_with(|| Value::from(mime::DEFAULT_CONTENT_TYPE));
        snapshot
    }

    proptest! {
        #[test]
        fn test_binary_round_trip(event in arb_event()) {
            let decoded = binary::decode(&binary::encode(&event), version_of(&event)).unwrap();
            prop_assert_eq!(binary_view(&decoded), binary_view(&event));
            prop_assert_eq!(decoded.data(), event.data());
            prop_assert!(decoded.validate().is_ok());
        }

        #[test]
        fn test_structured_round_trip(event in arb_event()) {
            let decoded =
                structured::decode(&structured::encode(&event), version_of(&event)).unwrap();
            prop_assert_eq!(&decoded, &event);
            prop_assert!(decoded.validate().is_ok());
        }

        #[test]
        fn test_detected_round_trip(event in arb_event(), structured_mode in any::<bool>()) {
            let mode = if structured_mode { Mode::Structured } else { Mode::Binary };
            let message = HTTP.encode(&event, mode);
            prop_assert!((HTTP.is_event)(&message));
            let decoded = (HTTP.to_event)(&message).unwrap();
            match mode {
                Mode::Binary => {
                    prop_assert_eq!(binary_view(&decoded), binary_view(&event));
                }
                Mode::Structured => {
                    prop_assert_eq!(decoded, event);
                }
            }
        }

        #[test]
        fn test_snapshot_round_trip(event in arb_event()) {
            let rebuilt = Event::from_snapshot(event.to_snapshot(), true).unwrap();
            prop_assert_eq!(rebuilt.to_snapshot(), event.to_snapshot());
        }
    }
}
