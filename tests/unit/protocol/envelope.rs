use super::*;
use serde_json::json;

#[test]
fn request_envelope_parses_method_and_context() {
    let inbound = Inbound::from_value(json!({
        "type": "request",
        "payload": { "name": "quick-info", "context": { "bufferFullPath": "/a.ts", "line": 3 } }
    }))
    .unwrap();

    let Inbound::Request(request) = inbound else {
        panic!("expected request");
    };
    assert_eq!(request.method, RequestMethod::QuickInfo);
    assert_eq!(request.context["line"], 3);
}

#[test]
fn evaluate_block_defaults_missing_arguments() {
    let inbound = Inbound::from_value(json!({
        "type": "request",
        "payload": { "name": "evaluate-block", "context": {}, "id": 7, "fileName": "a.js" }
    }))
    .unwrap();
    let Inbound::Request(request) = inbound else {
        panic!("expected request");
    };
    assert_eq!(
        request.method,
        RequestMethod::EvaluateBlock {
            id: json!(7),
            file_name: "a.js".to_string(),
            code: String::new(),
        }
    );

    let bare = Inbound::from_value(json!({
        "type": "request",
        "payload": { "name": "evaluate-block", "context": {} }
    }))
    .unwrap();
    let Inbound::Request(request) = bare else {
        panic!("expected request");
    };
    assert_eq!(
        request.method,
        RequestMethod::EvaluateBlock {
            id: Value::Null,
            file_name: String::new(),
            code: String::new(),
        }
    );
}

#[test]
fn request_args_survive_wire_conversion() {
    let inbound = Inbound::Request(Request {
        method: RequestMethod::EvaluateBlock {
            id: json!(7),
            file_name: "scratch.js".to_string(),
            code: "1 + 1".to_string(),
        },
        context: json!({ "line": 1 }),
    });

    let value = inbound.to_value();
    assert_eq!(value["type"], "request");
    assert_eq!(value["payload"]["name"], "evaluate-block");
    assert_eq!(value["payload"]["fileName"], "scratch.js");
    assert_eq!(Inbound::from_value(value).unwrap(), inbound);
}

#[test]
fn unknown_request_name_is_kept() {
    let inbound = Inbound::from_value(json!({
        "type": "request",
        "payload": { "name": "rename-symbol", "context": null }
    }))
    .unwrap();
    let Inbound::Request(request) = inbound else {
        panic!("expected request");
    };
    assert_eq!(request.method, RequestMethod::Unknown("rename-symbol".to_string()));
    assert_eq!(request.method.response_kind(), None);
}

#[test]
fn unknown_type_is_preserved_for_logging() {
    let inbound = Inbound::from_value(json!({ "type": "telemetry", "payload": 1 })).unwrap();
    assert_eq!(
        inbound,
        Inbound::Unknown {
            kind: "telemetry".to_string(),
            payload: json!(1)
        }
    );
}

#[test]
fn missing_type_is_rejected() {
    let err = Inbound::from_value(json!({ "payload": {} })).unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingType));
}

#[test]
fn command_payload_must_be_object() {
    let err = Inbound::from_value(json!({ "type": "command", "payload": "format" })).unwrap_err();
    assert!(matches!(err, EnvelopeError::InvalidPayload { .. }));
}

#[test]
fn event_envelope_carries_name_and_context() {
    let inbound = Inbound::from_value(json!({
        "type": "event",
        "payload": { "name": "CursorMoved", "context": { "line": 4 } }
    }))
    .unwrap();
    assert_eq!(
        inbound,
        Inbound::Event(EditorEvent {
            name: "CursorMoved".to_string(),
            context: json!({ "line": 4 }),
        })
    );
}

#[test]
fn outbound_payload_shape() {
    let outbound = Outbound::payload(
        ResponseKind::ShowQuickInfo,
        json!({ "requestId": 1 }),
        json!({ "info": "fn main()" }),
    );
    assert_eq!(
        outbound.to_value(),
        json!({
            "type": "show-quick-info",
            "meta": { "originEvent": { "requestId": 1 } },
            "payload": { "info": "fn main()" }
        })
    );
}

#[test]
fn outbound_error_shape_has_no_payload() {
    let outbound = Outbound::error(ResponseKind::SignatureHelpResponse, json!(5), "boom");
    let value = outbound.to_value();
    assert_eq!(value["error"], "boom");
    assert!(value.get("payload").is_none());

    let parsed = Outbound::from_value(value).unwrap();
    assert!(parsed.is_error());
    assert_eq!(parsed.origin, json!(5));
    assert_eq!(parsed.kind, ResponseKind::SignatureHelpResponse);
}

#[test]
fn response_kinds_round_trip_through_names() {
    for kind in [
        ResponseKind::ShowQuickInfo,
        ResponseKind::EvaluateBlockResult,
        ResponseKind::SetErrors,
        ResponseKind::Other("custom".to_string()),
    ] {
        assert_eq!(ResponseKind::from(kind.as_str()), kind);
    }
}

#[test]
fn request_methods_map_to_response_kinds() {
    assert_eq!(
        RequestMethod::QuickInfo.response_kind(),
        Some(ResponseKind::ShowQuickInfo)
    );
    assert_eq!(
        RequestMethod::SignatureHelp.response_kind(),
        Some(ResponseKind::SignatureHelpResponse)
    );
    assert_eq!(
        RequestMethod::Completion.response_kind(),
        Some(ResponseKind::CompletionProvider)
    );
}

#[test]
fn event_context_view_is_lenient() {
    let ctx = EventContext::from_value(&json!({
        "bufferFullPath": "/src/a.ts",
        "filetype": "typescript",
        "line": 10,
        "column": 2,
        "somethingElse": true
    }));
    assert_eq!(ctx.buffer_full_path, "/src/a.ts");
    assert_eq!(ctx.line, 10);

    assert_eq!(EventContext::from_value(&json!(42)), EventContext::default());
}
