// SPDX-License-Identifier: MIT OR Apache-2.0

use contextwise::{
    AmbientContext, Context, ContextLog, ContextualLogger, InMemorySink, Level, Logger,
    LoggerConfig, LoggerWithContext, OverflowPolicy, Redactor, context,
};
use std::sync::Arc;

fn base_logger(level: Level) -> (Arc<InMemorySink>, Arc<ContextualLogger>) {
    let sink = Arc::new(InMemorySink::new());
    let logger = ContextualLogger::new(sink.clone())
        .with_level(level)
        .with_redactor(Arc::new(Redactor::new()));
    (sink, Arc::new(logger))
}

#[test]
fn every_layer_reaches_the_entry() {
    let (sink, base) = base_logger(Level::Debug);
    let frontend = LoggerWithContext::for_log_source(base, "frontend");

    AmbientContext::with_scope(context! { "request_id" => "r-1", "log_source" => "ambient" }, || {
        frontend.warn_with("slow upstream", &context! { "upstream" => "payments" });
    });

    let line = sink.drain_logs();
    assert!(line.starts_with(
        r#"{"request_id":"r-1","log_source":"frontend","upstream":"payments","message":"slow upstream","severity":"WARN","timestamp":""#
    ));
    assert!(line.ends_with("\"}\n"));
}

#[test]
fn ambient_context_ends_with_its_scope() {
    let (sink, base) = base_logger(Level::Debug);
    let logger = LoggerWithContext::for_log_source(base, "frontend");

    AmbientContext::with_scope(context! { "request_id" => "r-1" }, || logger.info("inside"));
    logger.info("outside");

    let entries = sink.json_entries();
    assert_eq!(entries[0]["request_id"], "r-1");
    assert!(entries[1].get("request_id").is_none());
}

#[test]
fn nested_contexts_merge_deeply() {
    let (sink, base) = base_logger(Level::Debug);
    let logger = LoggerWithContext::new(base, context! { "http" => {"method": "GET"} });

    AmbientContext::with_scope(context! { "http" => {"path": "/health"} }, || {
        AmbientContext::with_scope(context! { "http" => {"peer": "10.0.0.1"} }, || {
            logger.info_with("served", &context! { "http" => {"status": 200} });
        });
    });

    assert_eq!(
        sink.json_entries()[0]["http"],
        serde_json::json!({"path": "/health", "peer": "10.0.0.1", "method": "GET", "status": 200})
    );
}

#[test]
fn level_follows_base_until_set() {
    let (sink, base) = base_logger(Level::Fatal);
    let logger = LoggerWithContext::for_log_source(base.clone(), "redis_client");

    assert!(logger.error("dropped"));
    base.set_level(Level::Error);
    assert!(logger.error("kept"));
    logger.set_level(Level::Fatal);
    base.set_level(Level::Debug);
    assert!(logger.error("dropped again"));

    let messages: Vec<_> = sink
        .json_entries()
        .iter()
        .map(|entry| entry["message"].clone())
        .collect();
    assert_eq!(messages, vec![serde_json::json!("kept")]);
}

#[test]
fn progname_comes_from_the_base() {
    let sink = Arc::new(InMemorySink::new());
    let base = LoggerConfig::new()
        .with_level("info")
        .with_progname("checkout")
        .build(Some(sink.clone()))
        .unwrap()
        .with_redactor(Arc::new(Redactor::new()));
    let logger = LoggerWithContext::for_log_source(Arc::new(base), "cart");

    logger.debug("below level");
    logger.info(());

    let entries = sink.json_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["progname"], "checkout");
    assert_eq!(entries[0]["message"], serde_json::Value::Null);
    assert_eq!(entries[0]["log_source"], "cart");
}

#[test]
fn cache_settings_come_from_configuration() {
    let sink = Arc::new(InMemorySink::new());
    let base = LoggerConfig::new()
        .with_level("debug")
        .with_cache_capacity(2)
        .with_overflow_policy(OverflowPolicy::EvictOldest)
        .build(Some(sink))
        .unwrap();
    let logger = LoggerWithContext::new(Arc::new(base), Context::new());

    for call_id in ["a", "b", "c"] {
        logger.info_with("call", &context! { "call_id" => call_id });
    }
    assert_eq!(
        logger.merge_cache().keys(),
        vec![context! { "call_id" => "b" }, context! { "call_id" => "c" }]
    );
}

#[test]
fn decorators_can_wrap_decorators() {
    let (sink, base) = base_logger(Level::Debug);
    let service = Arc::new(LoggerWithContext::new(
        base,
        context! { "service" => "billing", "log_source" => "service" },
    ));
    let component = LoggerWithContext::for_log_source(service.clone(), "invoices");

    component.error_with("failed", &context! { "invoice" => 42 });

    let entry = &sink.json_entries()[0];
    assert_eq!(entry["service"], "billing");
    assert_eq!(entry["log_source"], "invoices");
    assert_eq!(entry["invoice"], 42);
    assert_eq!(component.level(), service.level());
}

#[test]
fn context_crosses_threads_when_handed_over() {
    let (sink, base) = base_logger(Level::Debug);
    let logger = Arc::new(LoggerWithContext::for_log_source(base, "pool"));

    AmbientContext::with_scope(context! { "request_id" => "r-9" }, || {
        let handed_over = AmbientContext::current();
        let logger = logger.clone();
        std::thread::spawn(move || {
            logger.info("child without context");
            AmbientContext::with_scope(handed_over, || logger.info("child with context"));
        })
        .join()
        .unwrap();
    });

    let entries = sink.json_entries();
    assert!(entries[0].get("request_id").is_none());
    assert_eq!(entries[1]["request_id"], "r-9");
}

#[test]
fn a_logger_without_sink_swallows_everything() {
    let logger = LoggerWithContext::for_log_source(Arc::new(ContextualLogger::without_sink()), "x");
    assert!(logger.fatal_with("nowhere", &context! { "call_id" => 1 }));
    assert_eq!(logger.merge_cache().len(), 1);
}
