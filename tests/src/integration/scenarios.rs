//! # Wire Scenarios
//!
//! Fixed inputs with known expected outcomes, exercising the public API the
//! way an HTTP receiver would.

#[cfg(test)]
mod tests {
    use ce_core::message::{binary, structured};
    use ce_core::{
        Body, Data, Event, EventError, Headers, Message, Mode, PropertyBag, SpecVersion,
        ValidationError, HTTP,
    };
    use serde_json::{json, Value};

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn body_json(message: &Message) -> Value {
        match &message.body {
            Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
            other => panic!("expected a text body, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_mode_preserves_core_attributes() {
        let event = Event::builder()
            .id("123")
            .source("/ctx")
            .event_type("test.event")
            .data(json!({"hello": "world"}))
            .build()
            .unwrap();

        let message = HTTP.encode(&event, Mode::Binary);
        let decoded = (HTTP.to_event)(&message).unwrap();

        assert_eq!(decoded.id(), "123");
        assert_eq!(decoded.source(), Some("/ctx"));
        assert_eq!(decoded.event_type(), Some("test.event"));
        assert_eq!(decoded.data(), Some(&Data::Json(json!({"hello": "world"}))));
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn test_structured_mode_carries_bytes_as_base64() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x7f];
        let event = Event::builder()
            .source("/ctx")
            .event_type("test.binary")
            .binary_data(bytes.clone())
            .build()
            .unwrap();

        let message = HTTP.encode(&event, Mode::Structured);
        let body = body_json(&message);
        assert!(body.get("data").is_none());
        assert_eq!(body["data_base64"], "3q2+7wB/");

        let decoded = (HTTP.to_event)(&message).unwrap();
        assert_eq!(decoded.data(), Some(&Data::Binary(bytes)));
    }

    #[test]
    fn test_unsupported_version_header_fails() {
        let message = Message::new(
            headers(&[
                ("ce-id", "1"),
                ("ce-source", "/s"),
                ("ce-type", "t"),
                ("ce-specversion", "2.0"),
            ]),
            None,
        );

        let err = (HTTP.to_event)(&message).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::InvalidSpecVersion("2.0".into()))
        );
        assert!(!(HTTP.is_event)(&message));

        assert!(matches!(
            binary::decode(&message, SpecVersion::V1),
            Err(EventError::Validation(ValidationError::InvalidSpecVersion(_)))
        ));
    }

    #[test]
    fn test_v03_structured_base64_recovers_bytes() {
        let message = Message::new(
            headers(&[("Content-Type", "application/cloudevents+json")]),
            Some(Body::Text(
                json!({
                    "specversion": "0.3",
                    "id": "1",
                    "source": "/sensors/7",
                    "type": "reading",
                    "datacontentencoding": "base64",
                    "data": "AAECAwQF",
                })
                .to_string(),
            )),
        );

        let event = (HTTP.to_event)(&message).unwrap();
        assert_eq!(event.specversion(), "0.3");
        assert_eq!(event.data(), Some(&Data::Binary(vec![0, 1, 2, 3, 4, 5])));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_v03_binary_decode_uses_v03_table() {
        let message = Message::new(
            headers(&[
                ("ce-id", "1"),
                ("ce-source", "/s"),
                ("ce-type", "t"),
                ("ce-specversion", "0.3"),
                ("ce-schemaurl", "/schemas/t"),
            ]),
            None,
        );
        let event = (HTTP.to_event)(&message).unwrap();
        assert_eq!(event.schemaurl(), Some("/schemas/t"));
        assert!(event.extensions().is_empty());
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_plain_message_is_not_an_event() {
        let message = Message::new(
            headers(&[("content-type", "application/json")]),
            Some(Body::Text("{\"hello\":\"world\"}".into())),
        );
        assert!(!(HTTP.is_event)(&message));
        assert_eq!(
            (HTTP.to_event)(&message).unwrap_err().as_validation(),
            Some(&ValidationError::NoEventDetected)
        );
    }

    #[test]
    fn test_version_field_conflicts() {
        let v1_with_schemaurl = Event::builder()
            .source("/s")
            .event_type("t")
            .schemaurl("/schema")
            .build();
        assert!(matches!(
            v1_with_schemaurl,
            Err(EventError::Construction { attribute: "schemaurl", .. })
        ));

        let v03_with_dataschema = Event::builder()
            .spec_version(SpecVersion::V03)
            .source("/s")
            .event_type("t")
            .dataschema("https://example.com/schema")
            .build_lenient();
        assert!(matches!(
            v03_with_dataschema,
            Err(EventError::Construction { attribute: "dataschema", .. })
        ));
    }

    #[test]
    fn test_extension_names_strict_versus_lenient() {
        let bag = PropertyBag::new()
            .with("source", "/s")
            .with("type", "t")
            .with("Bad-Name", "x");

        let strict = Event::new(bag.clone(), true);
        assert!(matches!(
            strict,
            Err(EventError::Validation(ValidationError::InvalidExtensionName(name))) if name == "Bad-Name"
        ));

        let lenient = Event::new(bag, false).unwrap();
        assert_eq!(lenient.extension("Bad-Name"), Some(&"x".into()));
    }

    #[test]
    fn test_binary_body_decoded_as_structured_fails_validation() {
        let event = Event::builder()
            .source("/s")
            .event_type("t")
            .data(json!({"a": 1}))
            .build()
            .unwrap();
        let message = HTTP.encode(&event, Mode::Binary);
        let decoded = structured::decode(&message, SpecVersion::V1).unwrap();
        assert_eq!(decoded.extension("a"), Some(&json!(1).into()));
        let violations = decoded.validate().unwrap_err().violations();
        assert!(violations.contains(&"source: is required".to_string()));
    }

    #[test]
    fn test_clone_with_keeps_source_event() {
        let original = Event::builder()
            .source("/s")
            .event_type("t")
            .subject("a")
            .build()
            .unwrap();
        let changed = original
            .clone_with(PropertyBag::new().with("subject", "b"), true)
            .unwrap();
        assert_eq!(original.subject(), Some("a"));
        assert_eq!(changed.subject(), Some("b"));
        assert_eq!(changed.id(), original.id());
    }
}
