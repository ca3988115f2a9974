// SPDX-License-Identifier: PMPL-1.0-or-later
//! End-to-end engine behaviour against an in-memory gateway.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{engine, labels, FakeGateway};
use ppl_autocomplete::{
    ClauseState, MetadataRequest, Position, QueryEditor, Suggestion,
};

/// Prime the index list the way typing the first command does.
async fn with_indices(engine: &ppl_autocomplete::AutocompleteEngine<FakeGateway>) {
    engine.get_items("s").await;
}

#[tokio::test]
async fn test_first_command_completion() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);

    let batch = engine.get_items("sou").await;
    assert_eq!(batch.position, Position::FirstCommand);
    assert_eq!(batch.items.len(), 1);
    let item = &batch.items[0];
    assert_eq!(item.label, "source");
    assert_eq!(item.replacement_input, "sou");
    assert_eq!(item.suggestion_tail, "rce");
}

#[tokio::test]
async fn test_first_command_prefetches_indices_once() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);

    engine.get_items("s").await;
    engine.get_items("se").await;
    engine.get_items("search source = ").await;
    assert_eq!(gateway.index_calls(), 1);
    assert_eq!(engine.cached_indices(), vec!["logs", "logs-2023", "metrics"]);
}

#[tokio::test]
async fn test_overlapping_requests_fetch_indices_once() {
    let gateway = Arc::new(FakeGateway::populated().with_delay(Duration::from_millis(50)));
    let engine = engine(&gateway);

    let (first, second) = tokio::join!(engine.get_items("s"), engine.get_items("se"));
    assert_eq!(gateway.index_calls(), 1);
    assert_eq!(first.position, Position::FirstCommand);
    assert_eq!(labels(&second.items), vec!["search"]);
}

#[tokio::test]
async fn test_many_editors_share_one_field_fetch() {
    let gateway = Arc::new(FakeGateway::populated().with_delay(Duration::from_millis(20)));
    let engine = engine(&gateway);
    with_indices(&engine).await;

    let handles: Vec<_> = (0..5).map(|_| engine.clone()).collect();
    futures::future::join_all(
        handles
            .iter()
            .map(|handle| handle.get_items("search source = logs |")),
    )
    .await;
    assert_eq!(gateway.field_calls(), 1);
    assert_eq!(engine.cached_fields().unwrap().index, "logs");
}

#[tokio::test]
async fn test_request_during_fetch_does_not_wait() {
    let gateway = Arc::new(FakeGateway::populated().with_delay(Duration::from_millis(50)));
    let engine = engine(&gateway);

    let (first, second) = tokio::join!(
        engine.get_items("search source = "),
        engine.get_items("search source = l")
    );
    assert_eq!(gateway.index_calls(), 1);
    assert_eq!(first.items.len(), 3);
    assert!(second.items.is_empty());
}

#[tokio::test]
async fn test_index_names_after_source_equals() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);

    let batch = engine.get_items("search source = ").await;
    assert_eq!(batch.position, Position::IndexName);
    assert_eq!(
        labels(&batch.items),
        vec![
            "search source = logs",
            "search source = logs-2023",
            "search source = metrics"
        ]
    );
}

#[tokio::test]
async fn test_inline_source_lists_all_indices() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    let batch = engine.get_items("search source=").await;
    assert_eq!(
        labels(&batch.items),
        vec![
            "search source=logs",
            "search source=logs-2023",
            "search source=metrics"
        ]
    );

    let batch = engine.get_items("search source=me").await;
    assert_eq!(labels(&batch.items), vec!["search source=metrics"]);
    assert_eq!(batch.items[0].suggestion_tail, "trics");
}

#[tokio::test]
async fn test_pipe_after_known_index_fetches_fields() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    let batch = engine.get_items("search source=logs-2023 |").await;
    assert_eq!(batch.position, Position::PipeSeparatorAfterIndex);
    assert_eq!(engine.active_index().as_deref(), Some("logs-2023"));
    assert_eq!(gateway.field_calls(), 1);

    let batch = engine.get_items("search source=logs-2023 | ").await;
    assert_eq!(batch.position, Position::PipeCommand);
    assert_eq!(batch.items.len(), 10);

    let fields = engine.cached_fields().unwrap();
    assert_eq!(fields.index, "logs-2023");
    assert_eq!(fields.fields.len(), 2);
}

#[tokio::test]
async fn test_fields_refetched_when_index_changes() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    engine.get_items("source = logs ").await;
    engine.get_items("source = logs |").await;
    assert_eq!(gateway.field_calls(), 1);

    engine.get_items("source = metrics ").await;
    assert_eq!(gateway.field_calls(), 2);
    let batch = engine.get_items("source = metrics | fields ").await;
    assert_eq!(labels(&batch.items), vec!["source = metrics | fields cpu"]);
}

#[tokio::test]
async fn test_where_boolean_values() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;

    let batch = engine.get_items("source = logs | where ").await;
    assert_eq!(batch.position, Position::WhereField);
    assert!(labels(&batch.items).contains(&"source = logs | where active"));

    let batch = engine.get_items("source = logs | where active ").await;
    assert_eq!(labels(&batch.items), vec!["source = logs | where active ="]);

    let batch = engine.get_items("source = logs | where active = ").await;
    assert_eq!(batch.position, Position::WhereValue);
    let names: Vec<_> = batch
        .items
        .iter()
        .map(|item| item.item_name.as_deref().unwrap())
        .collect();
    assert_eq!(names, vec!["True", "False"]);
    assert_eq!(batch.items[0].label, "source = logs | where active = True");
    assert_eq!(batch.items[0].meta.as_ref().unwrap().doc_count, Some(9));

    let batch = engine.get_items("source = logs | where active = True ").await;
    assert_eq!(batch.position, Position::ClauseComplete);
    assert_eq!(labels(&batch.items), vec!["source = logs | where active = True |"]);
}

#[tokio::test]
async fn test_where_string_values_are_quoted_and_filtered() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where status ").await;

    let batch = engine.get_items("source = logs | where status = \"e").await;
    assert_eq!(
        labels(&batch.items),
        vec!["source = logs | where status = \"error\""]
    );
}

#[tokio::test]
async fn test_values_are_sampled_on_every_request() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where bytes ").await;

    engine.get_items("source = logs | where bytes = ").await;
    let batch = engine.get_items("source = logs | where bytes = 5").await;
    assert_eq!(gateway.value_calls(), 2);
    assert_eq!(labels(&batch.items), vec!["source = logs | where bytes = 512"]);
}

#[tokio::test]
async fn test_overlapping_value_requests_each_get_a_sample() {
    let gateway = Arc::new(FakeGateway::populated().with_delay(Duration::from_millis(50)));
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where status ").await;

    let (older, newer) = tokio::join!(
        engine.get_items("source = logs | where status = "),
        engine.get_items("source = logs | where status = \"o")
    );
    assert_eq!(gateway.value_calls(), 2);
    assert_eq!(
        labels(&older.items),
        vec![
            "source = logs | where status = \"ok\"",
            "source = logs | where status = \"error\""
        ]
    );
    assert!(engine.is_current(&newer));
    assert_eq!(
        labels(&newer.items),
        vec!["source = logs | where status = \"ok\""]
    );
}

#[tokio::test]
async fn test_geo_point_values_are_not_offered() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where location ").await;

    let batch = engine.get_items("source = logs | where location = ").await;
    assert_eq!(batch.position, Position::WhereValue);
    assert!(batch.items.is_empty());
    assert_eq!(gateway.value_calls(), 0);
}

#[tokio::test]
async fn test_unknown_where_field_degrades_to_empty() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where removed ").await;

    let batch = engine.get_items("source = logs | where removed = ").await;
    assert!(batch.items.is_empty());
    assert_eq!(gateway.value_calls(), 0);
}

#[tokio::test]
async fn test_stats_count_by() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;

    let batch = engine.get_items("source = logs | stats ").await;
    assert_eq!(batch.position, Position::StatsFunction);
    assert_eq!(batch.items.len(), 9);

    let batch = engine.get_items("source = logs | stats count() b").await;
    assert_eq!(batch.position, Position::StatsByKeyword);
    assert_eq!(labels(&batch.items), vec!["source = logs | stats count() by"]);

    let batch = engine.get_items("source = logs | stats count() by h").await;
    assert_eq!(batch.position, Position::StatsGroupField);
    assert_eq!(labels(&batch.items), vec!["source = logs | stats count() by host.name"]);

    let batch = engine.get_items("source = logs | stats count() by host.name ").await;
    assert_eq!(batch.position, Position::ClauseComplete);
}

#[tokio::test]
async fn test_stats_numeric_argument() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | stats ").await;

    let batch = engine.get_items("source = logs | stats avg( ").await;
    assert_eq!(batch.position, Position::StatsFieldArg);
    assert_eq!(
        labels(&batch.items),
        vec![
            "source = logs | stats avg(bytes)",
            "source = logs | stats avg(latency)"
        ]
    );

    let selected = engine.on_select(&batch.items[1]);
    assert_eq!(selected, "source = logs | stats avg(latency) ");
    let batch = engine.get_items(&selected).await;
    assert_eq!(batch.position, Position::StatsByKeyword);
}

#[tokio::test]
async fn test_pipe_resets_clause_state() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;
    engine.get_items("source = logs | where ").await;
    engine.get_items("source = logs | where status ").await;
    assert!(engine.session().active_field.is_some());

    engine.get_items("source = logs | where status = \"ok\" | ").await;
    let session = engine.session();
    assert!(session.active_field.is_none());
    assert_eq!(session.clause, ClauseState::Idle);
    assert!(!session.fields_list_mode);
    assert_eq!(session.active_index.as_deref(), Some("logs"));
}

#[tokio::test]
async fn test_field_list_loop() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;

    engine.get_items("source = logs | fields ").await;
    let batch = engine.get_items("source = logs | fields status ").await;
    assert_eq!(
        labels(&batch.items),
        vec!["source = logs | fields status,", "source = logs | fields status |"]
    );

    let batch = engine.get_items("source = logs | fields status, b").await;
    assert_eq!(batch.position, Position::FieldListContinuation);
    assert_eq!(labels(&batch.items), vec!["source = logs | fields status, bytes"]);
}

#[tokio::test]
async fn test_gateway_failure_keeps_keywords_working() {
    let gateway = Arc::new(FakeGateway::populated());
    gateway.set_failing(true);
    let engine = engine(&gateway);

    let batch = engine.get_items("se").await;
    assert_eq!(labels(&batch.items), vec!["search"]);

    let batch = engine.get_items("search source = ").await;
    assert!(batch.items.is_empty());
    assert!(engine.cached_indices().is_empty());

    gateway.set_failing(false);
    let batch = engine.get_items("search source = ").await;
    assert_eq!(batch.items.len(), 3);
    assert_eq!(gateway.index_calls(), 3);
}

#[tokio::test]
async fn test_malformed_input_never_fails() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    for query in ["| |", "search source = logs | | ", ",,, ", "   ", "where = = = "] {
        let batch = engine.get_items(query).await;
        assert_eq!(batch.input, query);
    }
}

#[tokio::test]
async fn test_select_before_fields_resolve() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    let batch = engine.get_items("search source = lo").await;
    let chosen: &Suggestion = &batch.items[0];
    let selection = engine.select(chosen);
    assert_eq!(selection.query, "search source = logs ");
    assert_eq!(
        selection.requests,
        vec![MetadataRequest::Fields {
            index: "logs".into()
        }]
    );
    assert_eq!(engine.active_index().as_deref(), Some("logs"));

    engine.resolve(selection.requests).await;
    assert_eq!(engine.cached_fields().unwrap().index, "logs");
}

#[tokio::test]
async fn test_spawned_resolve_populates_cache() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;

    let batch = engine.get_items("search source=met").await;
    let selection = engine.select(&batch.items[0]);
    let handle = engine.spawn_resolve(selection.requests).unwrap();
    handle.await.unwrap();
    assert_eq!(engine.cached_fields().unwrap().index, "metrics");
}

#[tokio::test]
async fn test_results_after_close_are_discarded() {
    let gateway = Arc::new(FakeGateway::populated().with_delay(Duration::from_millis(50)));
    let engine = engine(&gateway);

    let background = engine.clone();
    let task = tokio::spawn(async move { background.get_items("search source = ").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.close();

    let batch = task.await.unwrap();
    assert!(batch.items.is_empty());
    assert!(engine.cached_indices().is_empty());
    assert_eq!(gateway.index_calls(), 1);

    let batch = engine.get_items("se").await;
    assert!(batch.items.is_empty());
}

#[tokio::test]
async fn test_reset_starts_fresh_session() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    with_indices(&engine).await;
    engine.get_items("source = logs ").await;

    engine.reset();
    assert!(engine.cached_indices().is_empty());
    assert!(engine.active_index().is_none());

    with_indices(&engine).await;
    assert_eq!(gateway.index_calls(), 2);
}

#[tokio::test]
async fn test_is_current_tracks_latest_request() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);

    let first = engine.get_items("s").await;
    assert!(engine.is_current(&first));
    let second = engine.get_items("se").await;
    assert!(!engine.is_current(&first));
    assert!(engine.is_current(&second));
}

#[tokio::test]
async fn test_editor_discards_stale_batches() {
    let gateway = Arc::new(FakeGateway::populated());
    let mut editor = QueryEditor::new(engine(&gateway));

    editor.set_query("se");
    let pending = editor.suggestions();
    editor.set_query("sea");
    let stale = pending.await;
    assert!(editor.accept(stale).is_none());

    let fresh = editor.suggestions().await;
    let items = editor.accept(fresh).unwrap();
    assert_eq!(labels(&items), vec!["search"]);
}

#[tokio::test]
async fn test_editor_reports_query_changes() {
    let gateway = Arc::new(FakeGateway::populated());
    let seen: Arc<Mutex<Vec<(String, Option<String>)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut editor = QueryEditor::new(engine(&gateway)).with_query_change(move |text, index| {
        sink.lock()
            .unwrap()
            .push((text.to_string(), index.map(str::to_string)));
    });

    editor.input("s").await;
    editor.input("s").await;
    editor.input("source = logs ").await;
    editor.input("source = logs |").await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], ("s".to_string(), None));
    assert_eq!(
        seen[2],
        ("source = logs |".to_string(), Some("logs".to_string()))
    );
}

#[tokio::test]
async fn test_editor_select_replaces_query() {
    let gateway = Arc::new(FakeGateway::populated());
    let mut editor = QueryEditor::new(engine(&gateway));

    let batch = editor.input("sea").await;
    let items = editor.accept(batch).unwrap();
    let text = editor.select(&items[0]);
    assert_eq!(text, "search ");
    assert_eq!(editor.query(), "search ");

    let batch = editor.input(&text).await;
    assert_eq!(labels(&batch.items), vec!["search source"]);
}

#[tokio::test]
async fn test_dropping_editor_closes_engine() {
    let gateway = Arc::new(FakeGateway::populated());
    let engine = engine(&gateway);
    let editor = QueryEditor::new(engine.clone());
    drop(editor);
    assert!(engine.is_closed());
}
