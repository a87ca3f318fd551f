/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC requests from stdin
/// 2. Routes tool calls to the habit state store
/// 3. Sends JSON-RPC responses to stdout

use jsonrpc_core::ErrorCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::domain::ReminderPlan;
use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitTrackerServer, ServerError};

/// A tool call either produces a result or has unusable arguments
type CallResult = Result<ToolCallResult, String>;

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client confirmed initialization
    initialized: bool,
}

impl McpServer {
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    pub fn habit_tracker(&self) -> &HabitTrackerServer {
        &self.habit_tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    ErrorCode::ParseError,
                    format!("Invalid JSON: {}", e),
                ));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, json!(null))
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("Method '{}' not found", request.method),
            ),
        }
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Momentum MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        respond(id, json!({ "tools": tool_definitions() }))
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid parameters: {}", e),
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    "Missing parameters".to_string(),
                );
            }
        };

        let args = tool_params.arguments;
        let result = match tool_params.name.as_str() {
            "habit_create" => self.call_habit_create(args).await,
            "habit_check_in" => self.call_habit_check_in(args),
            "habit_undo" => self.call_habit_undo(args),
            "habit_mark_yesterday" => self.call_habit_mark_yesterday(args),
            "habit_status" => self.call_habit_status(args),
            "habit_list" => self.call_habit_list(args),
            "habit_timeline" => self.call_habit_timeline(args),
            "habit_reset" => self.call_habit_reset(args),
            "habit_notifications" => self.call_habit_notifications(args).await,
            "habit_delete" => self.call_habit_delete(args).await,
            _ => Ok(ToolCallResult::error(format!("Unknown tool: {}", tool_params.name))),
        };

        match result {
            Ok(result) => respond(id, result),
            Err(message) => JsonRpcResponse::error(id, ErrorCode::InvalidParams, message),
        }
    }

    async fn call_habit_create(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::CreateHabitParams = parse_args(args)?;
        Ok(match tools::create_habit(self.habit_tracker.store_mut(), params) {
            Ok(response) => {
                if !response.reminder_plan.notifications.is_empty() {
                    self.schedule(&response.reminder_plan).await;
                }
                ToolCallResult::success(response.message)
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        })
    }

    fn call_habit_check_in(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::HabitIdParams = parse_args(args)?;
        Ok(text_result(
            tools::check_in(self.habit_tracker.store_mut(), params).map(|r| r.message),
        ))
    }

    fn call_habit_undo(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::HabitIdParams = parse_args(args)?;
        Ok(text_result(
            tools::undo(self.habit_tracker.store_mut(), params).map(|r| r.message),
        ))
    }

    fn call_habit_mark_yesterday(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::HabitIdParams = parse_args(args)?;
        Ok(text_result(
            tools::mark_yesterday(self.habit_tracker.store_mut(), params).map(|r| r.message),
        ))
    }

    fn call_habit_status(&self, args: Map<String, Value>) -> CallResult {
        let params: tools::StatusParams = parse_args(args)?;
        Ok(text_result(
            tools::get_habit_status(self.habit_tracker.store(), params).map(|r| r.message),
        ))
    }

    fn call_habit_list(&self, args: Map<String, Value>) -> CallResult {
        let params: tools::ListHabitsParams = parse_args(args)?;
        Ok(text_result(
            tools::list_habits(self.habit_tracker.store(), params).map(|r| r.message),
        ))
    }

    fn call_habit_timeline(&self, args: Map<String, Value>) -> CallResult {
        let params: tools::TimelineParams = parse_args(args)?;
        let defaults = self.habit_tracker.timeline_defaults();
        Ok(text_result(
            tools::get_timeline(self.habit_tracker.store(), params, defaults).map(|r| r.message),
        ))
    }

    fn call_habit_reset(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::ResetParams = parse_args(args)?;
        Ok(text_result(
            tools::reset_habit(self.habit_tracker.store_mut(), params).map(|r| r.message),
        ))
    }

    async fn call_habit_notifications(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::UpdateNotificationsParams = parse_args(args)?;
        Ok(match tools::update_notifications(self.habit_tracker.store_mut(), params) {
            Ok(response) => {
                // Clear the old slots first; ids are stable per index and weekday
                self.cancel(&response.reminder_plan).await;
                if !response.reminder_plan.notifications.is_empty() {
                    self.schedule(&response.reminder_plan).await;
                }
                ToolCallResult::success(response.message)
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        })
    }

    async fn call_habit_delete(&mut self, args: Map<String, Value>) -> CallResult {
        let params: tools::HabitIdParams = parse_args(args)?;
        Ok(match tools::delete_habit(self.habit_tracker.store_mut(), params) {
            Ok(response) => {
                self.cancel(&response.cancelled_plan).await;
                ToolCallResult::success(response.message)
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        })
    }

    async fn schedule(&self, plan: &ReminderPlan) {
        if let Err(e) = self.habit_tracker.scheduler().schedule(plan).await {
            warn!("Could not schedule reminders for {}: {}", plan.habit_id, e);
        }
    }

    async fn cancel(&self, plan: &ReminderPlan) {
        if let Err(e) = self.habit_tracker.scheduler().cancel(plan).await {
            warn!("Could not cancel reminders for {}: {}", plan.habit_id, e);
        }
    }
}

/// Every tool this server offers, with schemas generated from the parameter types
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::for_params::<tools::CreateHabitParams>(
            "habit_create",
            "Create a new habit with a target per day, week or month",
        ),
        ToolDefinition::for_params::<tools::HabitIdParams>(
            "habit_check_in",
            "Count one completion of a habit for today",
        ),
        ToolDefinition::for_params::<tools::HabitIdParams>(
            "habit_undo",
            "Take back the latest completion in the current period",
        ),
        ToolDefinition::for_params::<tools::HabitIdParams>(
            "habit_mark_yesterday",
            "Record yesterday as completed for a daily or weekly habit",
        ),
        ToolDefinition::for_params::<tools::StatusParams>(
            "habit_status",
            "Check progress, streaks and momentum of one or all habits",
        ),
        ToolDefinition::for_params::<tools::ListHabitsParams>(
            "habit_list",
            "List all habits with streaks and momentum",
        ),
        ToolDefinition::for_params::<tools::TimelineParams>(
            "habit_timeline",
            "Show the colored check-in timeline of a habit",
        ),
        ToolDefinition::for_params::<tools::ResetParams>(
            "habit_reset",
            "Reset the current streak, the longest streak, the timeline or the whole habit",
        ),
        ToolDefinition::for_params::<tools::UpdateNotificationsParams>(
            "habit_notifications",
            "Replace the reminders of a habit",
        ),
        ToolDefinition::for_params::<tools::HabitIdParams>(
            "habit_delete",
            "Delete a habit and cancel its reminders",
        ),
    ]
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, String> {
    serde_json::from_value(Value::Object(args)).map_err(|e| format!("Invalid arguments: {}", e))
}

fn text_result<E: std::fmt::Display>(result: Result<String, E>) -> ToolCallResult {
    match result {
        Ok(message) => ToolCallResult::success(message),
        Err(e) => ToolCallResult::error(e.to_string()),
    }
}

fn respond<T: Serialize>(id: Value, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            ErrorCode::InternalError,
            format!("Failed to encode result: {}", e),
        ),
    }
}
