use rand::rngs::StdRng;
use rand::SeedableRng;
use synthtel::envelope_generator::error_templates;
use synthtel::*;

const NOW: Timestamp = Timestamp(1_717_200_000_000);

fn generator(seed: u64) -> EnvelopeGenerator {
    EnvelopeGenerator::with_rng(StdRng::seed_from_u64(seed), NOW)
}

#[test]
fn envelopes_follow_their_template() {
    let mut generator = generator(1);

    for &error_type in ErrorType::ALL {
        let template = error_template(error_type);
        for _ in 0..50 {
            let envelope = generator.envelope(error_type);

            assert_eq!(envelope.level, template.level);
            assert_eq!(envelope.platform, template.platform);
            assert!(template.environments.contains(&envelope.environment));
            assert_eq!(envelope.dsc.environment, envelope.environment);

            let exception = &envelope.exception.values[0];
            assert!(template
                .exception_types
                .contains(&exception.exception_type.as_str()));
            assert!(template.common_messages.contains(&exception.value.as_str()));
            assert_eq!(exception.mechanism.handled, template.level != Level::Fatal);
            assert_eq!(exception.stacktrace.frames.len(), 5);
            assert_eq!(exception.raw_stacktrace.frames.len(), 5);

            for frame in &exception.stacktrace.frames {
                assert!(template.common_modules.contains(&frame.filename.as_str()));
                assert!(template.common_functions.contains(&frame.function.as_str()));
                assert_eq!(frame.data.client_in_app, frame.in_app);
                assert!((1..=500).contains(&frame.lineno));
                assert!((1..=80).contains(&frame.colno));
                assert!(frame.abs_path.ends_with(&frame.filename));
                assert!(!frame.module.contains('/'));
            }

            let (function, module) = envelope.culprit.split_once(" in ").unwrap();
            assert!(template.common_functions.contains(&function));
            assert!(template.common_modules.contains(&module));
        }
    }
}

#[test]
fn envelopes_land_in_the_last_thirty_days() {
    let mut generator = generator(2);
    let now_secs = NOW.as_secs();
    let window = 30 * 24 * 60 * 60;

    for envelope in generator.envelopes(200) {
        assert!(envelope.timestamp <= now_secs);
        assert!(envelope.timestamp >= now_secs - window);
        assert_eq!(envelope.received, envelope.timestamp);
        assert_eq!(envelope.datetime.unix_timestamp(), envelope.timestamp);
    }
}

#[test]
fn consistent_draw_keeps_title_in_step_with_exception() {
    let mut generator = generator(3);

    for envelope in generator.envelopes(200) {
        let exception = &envelope.exception.values[0];
        assert_eq!(
            envelope.title,
            format!("{}: {}", exception.exception_type, exception.value)
        );
        assert_eq!(envelope.metadata.exception_type, exception.exception_type);
        assert_eq!(envelope.metadata.value, exception.value);
    }
}

#[test]
fn independent_draw_can_disagree() {
    let mut generator = generator(4).exception_draw(ExceptionDraw::Independent);

    let envelopes = generator.envelopes_for_type(ErrorType::Javascript, 200);
    let template = error_template(ErrorType::Javascript);

    for envelope in &envelopes {
        let (title_type, title_message) = envelope.title.split_once(": ").unwrap();
        assert!(template.exception_types.contains(&title_type));
        // some javascript messages contain ": " themselves
        assert!(template
            .common_messages
            .iter()
            .any(|m| envelope.title.ends_with(m)));
        assert!(!title_message.is_empty());
    }

    let disagreeing = envelopes
        .iter()
        .filter(|e| e.metadata.exception_type != e.exception.values[0].exception_type)
        .count();
    assert!(disagreeing > 0);
}

#[test]
fn exception_draw_parses_from_names() {
    assert_eq!(
        "independent".parse::<ExceptionDraw>().unwrap(),
        ExceptionDraw::Independent
    );
    assert_eq!(ExceptionDraw::default(), ExceptionDraw::Consistent);

    let err = "random".parse::<ExceptionDraw>().unwrap_err();
    assert_eq!(err.to_string(), "unknown exception draw `random`");
}

#[test]
fn browser_context_only_outside_node() {
    let mut generator = generator(5);

    for envelope in generator.envelopes(300) {
        let runtime = &envelope.contexts.runtime;
        if envelope.platform == "node" {
            assert!(envelope.contexts.browser.is_none());
            assert_eq!(runtime.name, "node");
            assert_eq!(runtime.runtime, "node v20.10.0");
            assert_eq!(envelope.sdk.name, "sentry.javascript.node");
        } else {
            let browser = envelope.contexts.browser.as_ref().unwrap();
            assert_eq!(runtime.name, browser.name.to_lowercase());
            assert_eq!(runtime.version, browser.version);
            assert_eq!(envelope.sdk.name, "sentry.javascript.browser");
        }
        assert_eq!(envelope.sdk.version, "7.99.0");
    }
}

#[test]
fn tags_come_in_a_fixed_order() {
    let mut generator = generator(6);
    let envelope = generator.envelope(ErrorType::Memory);

    let keys: Vec<&str> = envelope.tags.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "environment",
            "handled",
            "level",
            "mechanism",
            "os",
            "os.name",
            "runtime",
            "runtime.name",
            "server_name",
            "transaction",
        ]
    );
    assert_eq!(envelope.tag("handled"), Some("no"));
    assert_eq!(envelope.tag("level"), Some("fatal"));
    assert!(envelope.tag("transaction").unwrap().ends_with("/memory-error"));
    assert!(envelope.transaction.ends_with("/memory-endpoint"));
}

#[test]
fn user_context_drops_address_and_geo() {
    let mut generator = generator(7);
    let envelope = generator.envelope(ErrorType::Network);

    assert!(envelope.user.ip_address.is_some());
    assert!(envelope.user.geo.is_some());

    let context_user = &envelope.contexts.user;
    assert_eq!(context_user.id, envelope.user.id);
    assert!(context_user.ip_address.is_none());
    assert!(context_user.geo.is_none());

    assert_eq!(envelope.contexts.trace.trace_id, envelope.dsc.trace_id);
}

#[test]
fn envelopes_come_newest_first() {
    let mut generator = generator(8);

    let envelopes = generator.envelopes(100);
    assert_eq!(envelopes.len(), 100);
    assert!(envelopes.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let database = generator.envelopes_for_type(ErrorType::Database, 30);
    assert!(database.iter().all(|e| e.platform == "node"));
    assert!(database.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn distribution_covers_every_category() {
    let mut generator = generator(9);
    let envelopes = generator.envelopes(100);

    let distribution = error_type_distribution(&envelopes);
    assert_eq!(distribution.len(), 9);
    assert_eq!(distribution.values().sum::<usize>(), 100);
}

#[test]
fn classification_is_keyword_based() {
    assert_eq!(classify_exception_type("TypeError"), ErrorType::Javascript);
    assert_eq!(classify_exception_type("FetchError"), ErrorType::Network);
    assert_eq!(classify_exception_type("QueryError"), ErrorType::Database);
    assert_eq!(classify_exception_type("TokenError"), ErrorType::Authentication);
    assert_eq!(classify_exception_type("SchemaError"), ErrorType::Validation);
    assert_eq!(classify_exception_type("AccessError"), ErrorType::Permission);
    assert_eq!(classify_exception_type("AbortError"), ErrorType::Timeout);
    assert_eq!(classify_exception_type("OutOfMemoryError"), ErrorType::Memory);
    assert_eq!(classify_exception_type("ParseError"), ErrorType::Syntax);

    // not an inverse of generation
    assert_eq!(classify_exception_type("TimeoutError"), ErrorType::Timeout);
    assert_eq!(classify_exception_type("ConnectionError"), ErrorType::Javascript);
    assert_eq!(classify_exception_type("AuthorizationError"), ErrorType::Authentication);
    assert_eq!(classify_exception_type("SomethingElse"), ErrorType::Javascript);
}

#[test]
fn catalog_is_complete() {
    assert_eq!(error_templates().len(), 9);
    for template in error_templates() {
        assert!(!template.exception_types.is_empty());
        assert!(!template.environments.is_empty());
        assert_eq!(template.common_messages.len(), 6);
        assert_eq!(template.common_functions.len(), 6);
    }
    assert_eq!(error_template(ErrorType::Memory).level, Level::Fatal);
    assert_eq!(error_template(ErrorType::Validation).level, Level::Warning);
}

#[test]
fn envelopes_serialize_with_event_field_names() {
    let mut generator = generator(10);
    let envelope = generator.envelope(ErrorType::Timeout);

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["level"], "error");
    assert!(json["_dsc"]["trace_id"].is_string());
    assert!(json["_metrics"]["bytes_ingested_event"].is_u64());
    assert_eq!(json["exception"]["values"][0]["mechanism"]["type"], "generic");
    assert_eq!(json["fingerprint"][0], "{{ default }}");
}

#[test]
fn ingestion_fields_are_filled_in() {
    let mut generator = generator(11);

    for envelope in generator.envelopes(50) {
        assert_eq!(envelope.grouping_config.id, "newstyle:2023-01-11");
        assert_eq!(envelope.grouping_config.enhancements.len(), 100);

        assert_eq!(envelope.ingest_path.len(), 1);
        assert_eq!(envelope.ingest_path[0].version, "25.7.0");
        assert_eq!(envelope.ingest_path[0].public_key.len(), 43);

        let inserted = envelope.nodestore_insert - envelope.timestamp as f64;
        assert!((0.0..100.0).contains(&inserted));
        assert!(!envelope.symbolicated_in_app);

        assert_eq!(envelope.contexts.cloud_resource.kind, "cloud_resource");
        assert!((1_000..3_000).contains(&envelope.meta.transaction.value.len));
        assert_eq!(envelope.meta.frequency, None);
    }

    let json = serde_json::to_value(generator.envelope(ErrorType::Network)).unwrap();
    assert_eq!(
        json["_meta"]["transaction"][""]["rem"][0],
        serde_json::json!(["!limit", "s", 197, 200])
    );
    assert!(json["_meta"].get("frequency").is_none());
    assert_eq!(json["contexts"]["cloud_resource"]["type"], "cloud_resource");
    assert_eq!(json["symbolicated_in_app"], false);
    assert!(json["nodestore_insert"].is_f64());
}
