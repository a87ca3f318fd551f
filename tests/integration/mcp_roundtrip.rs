/// JSON-RPC round trips through the MCP server
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use habit_momentum_mcp::mcp::{tool_definitions, McpServer};
use habit_momentum_mcp::*;
use serde_json::{json, Value};

use super::day;

/// Scheduler that remembers every call it receives
#[derive(Default)]
struct RecordingScheduler {
    calls: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn schedule(&self, plan: &ReminderPlan) -> Result<(), SchedulerError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("schedule {} x{}", plan.habit_name, plan.slot_ids().len()));
        Ok(())
    }

    async fn cancel(&self, plan: &ReminderPlan) -> Result<(), SchedulerError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("cancel {}", plan.habit_name));
        Ok(())
    }
}

fn server_at(today: &str) -> (McpServer, Arc<RecordingScheduler>) {
    let scheduler = Arc::new(RecordingScheduler::default());
    let tracker = HabitTrackerServer::with_parts(
        Box::new(MemoryStorage::new()),
        Arc::new(FixedClock::at(day(today))),
        scheduler.clone(),
    )
    .expect("server builds");
    (McpServer::new(tracker), scheduler)
}

async fn call(server: &mut McpServer, id: i64, method: &str, params: Value) -> Value {
    let line = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string();
    let response = server.process_line(&line).await.expect("request gets a response");
    serde_json::to_value(response).unwrap()
}

async fn call_tool(server: &mut McpServer, id: i64, name: &str, arguments: Value) -> Value {
    call(server, id, "tools/call", json!({"name": name, "arguments": arguments})).await
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap_or_default()
}

fn only_habit_id(server: &McpServer) -> String {
    server.habit_tracker().store().habits()[0].id.to_string()
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let (mut server, _) = server_at("2025-01-06");

    let init = call(&mut server, 1, "initialize", json!({})).await;
    assert_eq!(init["result"]["serverInfo"]["name"], "Habit Momentum MCP");
    assert!(init["result"]["protocolVersion"].is_string());

    assert!(server
        .process_line(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#)
        .await
        .is_none());
    assert!(server.is_initialized());

    let listed = call(&mut server, 2, "tools/list", json!({})).await;
    let tools = listed["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), tool_definitions().len());
    assert_eq!(tools.len(), 10);
    for tool in tools {
        assert!(tool["inputSchema"].is_object(), "{} has no schema", tool["name"]);
    }
    let create = tools.iter().find(|t| t["name"] == "habit_create").unwrap();
    assert!(create["inputSchema"]["properties"]["name"].is_object());
}

#[tokio::test]
async fn test_create_check_in_and_status() {
    let (mut server, scheduler) = server_at("2025-01-06");

    let created = call_tool(
        &mut server,
        1,
        "habit_create",
        json!({
            "name": "Read",
            "target": "2",
            "period": "daily",
            "notifications": [{"hour": 21, "minute": "30", "days": [0, 2, 4]}]
        }),
    )
    .await;
    assert_eq!(created["result"]["isError"], false);
    assert!(text_of(&created).contains("Read"));
    assert_eq!(scheduler.calls(), vec!["schedule Read x3".to_string()]);

    let id = only_habit_id(&server);
    let habit = server.habit_tracker().store().habit_by_id(&HabitId::from_string(&id)).unwrap();
    assert_eq!(habit.target, 2);
    assert_eq!(habit.period, Period::Day);

    call_tool(&mut server, 2, "habit_check_in", json!({"habit_id": id})).await;
    let done = call_tool(&mut server, 3, "habit_check_in", json!({"habit_id": id})).await;
    assert!(text_of(&done).contains("complete"));

    let again = call_tool(&mut server, 4, "habit_check_in", json!({"habit_id": id})).await;
    assert!(text_of(&again).contains("already"));

    let status = call_tool(&mut server, 5, "habit_status", json!({"habit_id": id})).await;
    assert_eq!(status["result"]["isError"], false);
    assert!(text_of(&status).contains("Read"));
    assert_eq!(
        server.habit_tracker().store().current_streak(&HabitId::from_string(&id)),
        Some(1)
    );

    let timeline = call_tool(&mut server, 6, "habit_timeline", json!({"habit_id": id})).await;
    assert_eq!(timeline["result"]["isError"], false);
}

#[tokio::test]
async fn test_reset_and_delete_through_tools() {
    let (mut server, scheduler) = server_at("2025-01-06");
    call_tool(
        &mut server,
        1,
        "habit_create",
        json!({"name": "Stretch", "notifications": [{"hour": 7}]}),
    )
    .await;
    let id = only_habit_id(&server);
    call_tool(&mut server, 2, "habit_check_in", json!({"habit_id": id})).await;

    let reset = call_tool(
        &mut server,
        3,
        "habit_reset",
        json!({"habit_id": id, "mode": "current"}),
    )
    .await;
    assert_eq!(reset["result"]["isError"], false);
    let habit_id = HabitId::from_string(&id);
    assert_eq!(server.habit_tracker().store().current_streak(&habit_id), Some(0));
    assert_eq!(server.habit_tracker().store().longest_streak(&habit_id), Some(1));

    let deleted = call_tool(&mut server, 4, "habit_delete", json!({"habit_id": id})).await;
    assert_eq!(deleted["result"]["isError"], false);
    assert!(server.habit_tracker().store().habits().is_empty());
    assert_eq!(scheduler.calls().last().map(String::as_str), Some("cancel Stretch"));

    let missing = call_tool(&mut server, 5, "habit_check_in", json!({"habit_id": id})).await;
    assert_eq!(missing["result"]["isError"], true);
    assert!(text_of(&missing).contains("not found"));
}

#[tokio::test]
async fn test_protocol_errors() {
    let (mut server, _) = server_at("2025-01-06");

    let unknown = call(&mut server, 1, "habits/teleport", json!({})).await;
    assert_eq!(unknown["error"]["code"], -32601);

    let garbage = server.process_line("{not json").await.unwrap();
    let garbage = serde_json::to_value(garbage).unwrap();
    assert_eq!(garbage["error"]["code"], -32700);

    let bad_args = call_tool(&mut server, 2, "habit_check_in", json!({"habitId": 5})).await;
    assert_eq!(bad_args["error"]["code"], -32602);

    let missing_params = call(&mut server, 3, "tools/call", Value::Null).await;
    assert_eq!(missing_params["error"]["code"], -32602);

    let unknown_tool = call_tool(&mut server, 4, "habit_teleport", json!({})).await;
    assert_eq!(unknown_tool["result"]["isError"], true);

    assert!(server.process_line("   ").await.is_none());
}
