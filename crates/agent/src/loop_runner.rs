//! The orchestration loop: model turn, tool round, repeat.

use chrono::Utc;
use cowork_config::AppConfig;
use cowork_core::error::Error;
use cowork_core::message::{Conversation, Turn};
use cowork_core::provider::{ModelReply, Provider, ProviderRequest, ToolChoice};
use cowork_core::session::SessionContext;
use cowork_core::tool::ToolCallRequest;
use cowork_tools::ToolExecutor;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::emitter::{EVENT_BUFFER, StreamEmitter};
use crate::state::{LoopState, RoundBatch};
use crate::stream_event::{StreamEvent, ToolResultPayload};

pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

const EMPTY_ANSWER: &str =
    "I wasn't able to put together an answer for that. Could you rephrase the request?";

/// Result of a request that reached its final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    /// Tool rounds executed.
    pub iterations: u32,
    pub tool_calls_made: usize,
    pub final_text: String,
    /// The model still wanted tools when the round limit was hit.
    pub bound_reached: bool,
}

/// Drives one conversation turn to completion against the model and the tools.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    executor: Arc<ToolExecutor>,
    /// Fixed prompt; `None` uses the workspace prompt stamped per request.
    system_prompt: Option<String>,
    max_iterations: u32,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, executor: Arc<ToolExecutor>) -> Self {
        Self {
            provider,
            executor,
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        executor: Arc<ToolExecutor>,
        config: &AppConfig,
    ) -> Self {
        let agent = Self::new(provider, executor).with_max_iterations(config.agent.max_iterations);
        match &config.agent.system_prompt_override {
            Some(prompt) => agent.with_system_prompt(prompt.clone()),
            None => agent,
        }
    }

    /// Set the maximum number of tool rounds per request.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Run the loop on its own task and hand back the event stream.
    pub fn spawn(
        self: &Arc<Self>,
        message: String,
        history: Vec<Turn>,
        session: SessionContext,
    ) -> mpsc::Receiver<StreamEvent> {
        let (emitter, rx) = StreamEmitter::channel(EVENT_BUFFER);
        let agent = Arc::clone(self);

        tokio::spawn(async move {
            match agent.run(&message, history, &session, emitter).await {
                Ok(outcome) => info!(
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls_made,
                    bound_reached = outcome.bound_reached,
                    "Request completed"
                ),
                Err(Error::StreamClosed) => info!("Client disconnected, request abandoned"),
                Err(e) => warn!(error = %e, "Request ended with error"),
            }
        });

        rx
    }

    /// Process one user message, streaming events to `emitter`.
    ///
    /// Provider failures are reported to the client as a single `error`
    /// event and returned. A closed stream aborts the request with
    /// `Error::StreamClosed`.
    pub async fn run(
        &self,
        message: &str,
        history: Vec<Turn>,
        session: &SessionContext,
        emitter: StreamEmitter,
    ) -> Result<LoopOutcome, Error> {
        info!(history = history.len(), "Processing chat request");

        let mut conversation = Conversation::from_history(history);
        conversation.push(Turn::user(message));
        let mut state = LoopState::new(self.max_iterations);

        let driven = self
            .drive(&mut conversation, &mut state, session, &emitter)
            .await;

        match driven {
            Ok(bound_reached) => {
                let final_text = state.final_text.take().unwrap_or_default();
                emitter.finish(final_text.clone()).await?;
                Ok(LoopOutcome {
                    iterations: state.iteration,
                    tool_calls_made: state.tool_calls_made,
                    final_text,
                    bound_reached,
                })
            }
            Err(Error::Provider(e)) => {
                error!(error = %e, iteration = state.iteration, "Model call failed");
                emitter
                    .fail(format!(
                        "The assistant is temporarily unavailable: {}",
                        e.category()
                    ))
                    .await?;
                Err(Error::Provider(e))
            }
            Err(Error::StreamClosed) => Err(Error::StreamClosed),
            Err(e) => {
                error!(error = %e, "Request failed");
                emitter.fail("Something went wrong while processing the request.").await?;
                Err(e)
            }
        }
    }

    /// The state machine proper. Returns whether the round bound was hit.
    async fn drive(
        &self,
        conversation: &mut Conversation,
        state: &mut LoopState,
        session: &SessionContext,
        emitter: &StreamEmitter,
    ) -> Result<bool, Error> {
        let system_prompt = self
            .system_prompt
            .clone()
            .unwrap_or_else(|| cowork_tools::system_prompt(Utc::now()));

        let mut reply = self
            .ask(conversation, &system_prompt, ToolChoice::Auto, emitter)
            .await?;

        loop {
            let calls = match reply {
                ModelReply::Text(text) => {
                    state.final_text = Some(non_empty_or(text, EMPTY_ANSWER));
                    return Ok(false);
                }
                ModelReply::ToolCalls(calls) => calls,
            };

            if !state.can_run_round() {
                warn!(
                    max_iterations = state.max_iterations,
                    pending_calls = calls.len(),
                    "Tool round limit reached, requesting final answer"
                );
                let text = self
                    .final_answer(conversation, &system_prompt, state, emitter)
                    .await?;
                state.final_text = Some(text);
                return Ok(true);
            }

            state.begin_round();
            debug!(iteration = state.iteration, calls = calls.len(), "Starting tool round");

            let batch = self.run_round(&calls, state, session, emitter).await?;
            conversation.push(Turn::tool_calls(calls));
            conversation.push(batch.into_turn());

            reply = self
                .ask(conversation, &system_prompt, ToolChoice::Auto, emitter)
                .await?;
        }
    }

    /// Execute one round's calls in model order.
    async fn run_round(
        &self,
        calls: &[ToolCallRequest],
        state: &mut LoopState,
        session: &SessionContext,
        emitter: &StreamEmitter,
    ) -> Result<RoundBatch, Error> {
        let mut batch = RoundBatch::with_capacity(calls.len());

        for call in calls {
            emitter
                .emit(StreamEvent::ToolCall {
                    tool_call: call.into(),
                })
                .await?;

            let result = until_closed(emitter, self.executor.execute(call, session)).await?;
            state.record_call();

            emitter
                .emit(StreamEvent::ToolResult {
                    tool_result: ToolResultPayload::new(&call.name, &result),
                })
                .await?;

            batch.push(call, result);
        }

        Ok(batch)
    }

    /// One model turn, abandoned if the client goes away meanwhile.
    async fn ask(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
        tool_choice: ToolChoice,
        emitter: &StreamEmitter,
    ) -> Result<ModelReply, Error> {
        let request = ProviderRequest {
            system_prompt: Some(system_prompt.to_string()),
            turns: conversation.turns().to_vec(),
            tools: self.executor.definitions(),
            tool_choice,
        };

        let response = until_closed(emitter, self.provider.send_turn(request)).await??;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                total_tokens = usage.total_tokens,
                "Model turn complete"
            );
        }
        Ok(response.reply)
    }

    /// Ask for a text-only answer once the round limit is spent.
    async fn final_answer(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
        state: &LoopState,
        emitter: &StreamEmitter,
    ) -> Result<String, Error> {
        let budget_message = format!(
            "I reached the maximum number of tool steps ({}) for this request. \
             Please narrow it down or ask me to continue where I left off.",
            state.max_iterations
        );

        match self
            .ask(conversation, system_prompt, ToolChoice::None, emitter)
            .await?
        {
            ModelReply::Text(text) => Ok(non_empty_or(text, &budget_message)),
            ModelReply::ToolCalls(_) => {
                warn!("Model kept requesting tools with tools disabled");
                Ok(budget_message)
            }
        }
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// Await `work` unless the client disconnects first.
async fn until_closed<F: Future>(emitter: &StreamEmitter, work: F) -> Result<F::Output, Error> {
    tokio::select! {
        biased;
        _ = emitter.closed() => Err(Error::StreamClosed),
        out = work => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use cowork_core::error::{ProviderError, ToolError};
    use cowork_core::message::{Role, TurnContent};
    use cowork_core::tool::{Tool, ToolOutput};
    use serde_json::{Map, Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn run_collect(
        agent: &AgentLoop,
        message: &str,
        history: Vec<Turn>,
    ) -> (Result<LoopOutcome, Error>, Vec<StreamEvent>) {
        let (emitter, mut rx) = StreamEmitter::channel(256);
        let result = agent.run(message, history, &session(), emitter).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (result, events)
    }

    fn types(events: &[StreamEvent]) -> Vec<&'static str> {
        events.iter().map(StreamEvent::event_type).collect()
    }

    #[tokio::test]
    async fn plain_answer_emits_text_then_done() {
        let provider = Arc::new(ScriptedProvider::replies(vec![text("Hello! How can I help?")]));
        let search = StaticTool::ok("searchEmails", json!({"emails": []}));
        let agent = AgentLoop::new(provider.clone(), executor(vec![search.clone()]));

        let (result, events) = run_collect(&agent, "Hi", vec![]).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Text { text: "Hello! How can I help?".into() },
                StreamEvent::Done,
            ]
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.tool_calls_made, 0);
        assert!(!outcome.bound_reached);
        assert_eq!(search.call_count(), 0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn first_request_carries_history_prompt_and_tools() {
        let provider = Arc::new(ScriptedProvider::replies(vec![text("Sure")]));
        let agent = AgentLoop::new(
            provider.clone(),
            executor(vec![StaticTool::ok("searchEmails", json!({}))]),
        )
        .with_system_prompt("Be brief");

        let history = vec![Turn::user("earlier question"), Turn::agent("earlier answer")];
        run_collect(&agent, "follow-up", history).await.0.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.system_prompt.as_deref(), Some("Be brief"));
        assert_eq!(request.tool_choice, ToolChoice::Auto);
        assert_eq!(request.tools.len(), 1);
        let texts: Vec<_> = request.turns.iter().map(|t| t.text().unwrap()).collect();
        assert_eq!(texts, vec!["earlier question", "earlier answer", "follow-up"]);
    }

    #[tokio::test]
    async fn default_prompt_is_workspace_prompt() {
        let provider = Arc::new(ScriptedProvider::replies(vec![text("ok")]));
        let agent = AgentLoop::new(provider.clone(), executor(vec![]));
        run_collect(&agent, "hi", vec![]).await.0.unwrap();
        let prompt = provider.requests()[0].system_prompt.clone().unwrap();
        assert!(prompt.starts_with(cowork_tools::SYSTEM_PROMPT));
        assert!(prompt.contains("Current time:"));
    }

    #[tokio::test]
    async fn tool_events_follow_model_order() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[
                ("searchEmails", json!({"query": "invoice"})),
                ("getCalendarEvents", json!({})),
                ("searchDriveFiles", json!({"query": "budget"})),
            ]),
            text("Here is your overview."),
        ]));
        let agent = AgentLoop::new(
            provider,
            executor(vec![
                StaticTool::ok("searchDriveFiles", json!({"files": []})),
                StaticTool::ok("searchEmails", json!({"emails": [{"id": "1"}]})),
                StaticTool::ok("getCalendarEvents", json!({"events": []})),
            ]),
        );

        let (result, events) = run_collect(&agent, "overview", vec![]).await;

        assert_eq!(
            types(&events),
            vec![
                "tool_call", "tool_result", "tool_call", "tool_result", "tool_call",
                "tool_result", "text", "done"
            ]
        );
        let order: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolCall { tool_call } => Some(tool_call.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["searchEmails", "getCalendarEvents", "searchDriveFiles"]);
        let result_order: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolResult { tool_result } => Some(tool_result.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(result_order, order);

        let outcome = result.unwrap();
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls_made, 3);
    }

    #[tokio::test]
    async fn resubmitted_results_keep_call_association() {
        let first_round = calls(&[
            ("searchEmails", json!({"query": "a"})),
            ("searchEmails", json!({"query": "b"})),
        ]);
        let ModelReply::ToolCalls(sent_calls) = first_round.clone() else {
            unreachable!()
        };
        let provider = Arc::new(ScriptedProvider::replies(vec![first_round, text("done")]));
        let agent = AgentLoop::new(
            provider.clone(),
            executor(vec![StaticTool::ok("searchEmails", json!({"emails": []}))]),
        );

        run_collect(&agent, "two searches", vec![]).await.0.unwrap();

        let second = &provider.requests()[1];
        let n = second.turns.len();
        let TurnContent::ToolCalls(echoed) = &second.turns[n - 2].content else {
            panic!("expected the model's tool calls before the responses");
        };
        assert_eq!(echoed, &sent_calls);
        assert_eq!(second.turns[n - 2].role, Role::Agent);

        let TurnContent::ToolResponses(responses) = &second.turns[n - 1].content else {
            panic!("expected one batched tool response turn");
        };
        assert_eq!(second.turns[n - 1].role, Role::User);
        assert_eq!(responses.len(), 2);
        for (call, response) in sent_calls.iter().zip(responses) {
            assert_eq!(response.call_id, call.id);
            assert_eq!(response.name, call.name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_fails_and_conversation_continues() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[("teleport", json!({"to": "Mars"}))]),
            text("I can't do that, but I can search your mail."),
        ]));
        let agent = AgentLoop::new(
            provider.clone(),
            executor(vec![StaticTool::ok("searchEmails", json!({}))]),
        );

        let (result, events) = run_collect(&agent, "teleport me", vec![]).await;

        assert_eq!(types(&events), vec!["tool_call", "tool_result", "text", "done"]);
        let StreamEvent::ToolResult { tool_result } = &events[1] else {
            panic!("expected tool_result");
        };
        assert!(!tool_result.success);
        assert_eq!(tool_result.error.as_deref(), Some("Unknown tool: teleport"));
        assert!(result.is_ok());

        let resubmitted = provider.requests()[1].turns.last().cloned().unwrap();
        let TurnContent::ToolResponses(responses) = resubmitted.content else {
            panic!("expected tool responses");
        };
        assert!(!responses[0].result.success);
    }

    #[tokio::test]
    async fn failing_tool_result_reaches_model_and_user() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[("createCalendarEvent", json!({"summary": "Sync"}))]),
            text("I couldn't create the event: the calendar rejected it."),
        ]));
        let create = StaticTool::failing("createCalendarEvent", "calendar rejected the event");
        let agent = AgentLoop::new(provider, executor(vec![create.clone()]));

        let (result, events) = run_collect(&agent, "book a sync", vec![]).await;

        let StreamEvent::ToolResult { tool_result } = &events[1] else {
            panic!("expected tool_result");
        };
        assert!(!tool_result.success);
        assert!(
            tool_result
                .error
                .as_deref()
                .unwrap()
                .starts_with("Failed to execute createCalendarEvent: ")
        );
        assert_eq!(
            events[2],
            StreamEvent::Text {
                text: "I couldn't create the event: the calendar rejected it.".into()
            }
        );
        assert_eq!(events[3], StreamEvent::Done);
        assert_eq!(create.call_count(), 1);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn round_bound_forces_text_only_answer() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[("searchEmails", json!({"query": "1"}))]),
            calls(&[("searchEmails", json!({"query": "2"}))]),
            calls(&[("searchEmails", json!({"query": "3"}))]),
            text("Summary of what I found."),
        ]));
        let search = StaticTool::ok("searchEmails", json!({"emails": []}));
        let agent =
            AgentLoop::new(provider.clone(), executor(vec![search.clone()])).with_max_iterations(2);

        let (result, events) = run_collect(&agent, "keep searching", vec![]).await;

        let outcome = result.unwrap();
        assert!(outcome.bound_reached);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.final_text, "Summary of what I found.");
        assert_eq!(search.call_count(), 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests[..3].iter().all(|r| r.tool_choice == ToolChoice::Auto));
        assert_eq!(requests[3].tool_choice, ToolChoice::None);
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn round_bound_falls_back_to_budget_message() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[("searchEmails", json!({}))]),
            calls(&[("searchEmails", json!({}))]),
            calls(&[("searchEmails", json!({}))]),
        ]));
        let agent = AgentLoop::new(
            provider,
            executor(vec![StaticTool::ok("searchEmails", json!({}))]),
        )
        .with_max_iterations(1);

        let (result, events) = run_collect(&agent, "loop forever", vec![]).await;

        let outcome = result.unwrap();
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.final_text.contains("maximum number of tool steps (1)"));
        let tool_calls = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::ToolCall { .. }))
            .count();
        assert_eq!(tool_calls, 1);
        assert_eq!(
            &types(&events)[events.len() - 2..],
            &["text", "done"]
        );
    }

    #[tokio::test]
    async fn never_more_rounds_than_the_limit() {
        let script = (0..20)
            .map(|_| calls(&[("searchEmails", json!({}))]))
            .collect();
        let search = StaticTool::ok("searchEmails", json!({}));
        let agent = AgentLoop::new(
            Arc::new(ScriptedProvider::replies(script)),
            executor(vec![search.clone()]),
        );

        let (result, _) = run_collect(&agent, "go", vec![]).await;

        assert_eq!(result.unwrap().iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(search.call_count(), DEFAULT_MAX_ITERATIONS as usize);
    }

    #[tokio::test]
    async fn provider_failure_emits_single_error_without_done() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(calls(&[("searchEmails", json!({"query": "x"}))])),
            Err(ProviderError::ApiError {
                status_code: 500,
                message: "internal body with secrets".into(),
            }),
        ]));
        let agent = AgentLoop::new(
            provider,
            executor(vec![StaticTool::ok("searchEmails", json!({}))]),
        );

        let (result, events) = run_collect(&agent, "search", vec![]).await;

        assert!(matches!(result, Err(Error::Provider(_))));
        assert_eq!(types(&events), vec!["tool_call", "tool_result", "error"]);
        let StreamEvent::Error { error } = events.last().unwrap() else {
            panic!("expected error event");
        };
        assert_eq!(error, "The assistant is temporarily unavailable: model API error");
        assert!(!error.contains("secrets"));
    }

    #[tokio::test]
    async fn empty_answer_gets_fallback_text() {
        let agent = AgentLoop::new(
            Arc::new(ScriptedProvider::replies(vec![text("   ")])),
            executor(vec![]),
        );
        let (result, events) = run_collect(&agent, "hmm", vec![]).await;
        assert_eq!(result.unwrap().final_text, EMPTY_ANSWER);
        assert_eq!(types(&events), vec!["text", "done"]);
    }

    /// Drops the client's receiver the first time it runs.
    struct DisconnectingTool {
        receiver: Mutex<Option<mpsc::Receiver<StreamEvent>>>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Tool for DisconnectingTool {
        fn name(&self) -> &str {
            "searchEmails"
        }
        fn description(&self) -> &str {
            "Simulates the client going away mid-request"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _arguments: &Map<String, Value>,
            _session: &SessionContext,
        ) -> Result<ToolOutput, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            drop(self.receiver.lock().unwrap().take());
            Ok(Map::new())
        }
    }

    #[tokio::test]
    async fn disconnect_aborts_remaining_work() {
        let (emitter, rx) = StreamEmitter::channel(16);
        let tool = Arc::new(DisconnectingTool {
            receiver: Mutex::new(Some(rx)),
            calls: AtomicUsize::new(0),
        });
        let provider = Arc::new(ScriptedProvider::replies(vec![
            calls(&[("searchEmails", json!({})), ("searchEmails", json!({}))]),
            text("never sent"),
        ]));
        let agent = AgentLoop::new(provider.clone(), executor(vec![tool.clone()]));

        let result = agent.run("search twice", vec![], &session(), emitter).await;

        assert!(matches!(result, Err(Error::StreamClosed)));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn closed_stream_before_start_skips_everything() {
        let (emitter, rx) = StreamEmitter::channel(4);
        drop(rx);
        let provider = Arc::new(ScriptedProvider::replies(vec![text("hi")]));
        let agent = AgentLoop::new(provider.clone(), executor(vec![]));

        let result = agent.run("hello", vec![], &session(), emitter).await;

        assert!(matches!(result, Err(Error::StreamClosed)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn spawn_streams_events_from_a_task() {
        let agent = Arc::new(AgentLoop::new(
            Arc::new(ScriptedProvider::replies(vec![
                calls(&[("searchEmails", json!({"query": "invoice"}))]),
                text("Found it."),
            ])),
            executor(vec![StaticTool::ok("searchEmails", json!({"emails": [1, 2]}))]),
        ));

        let mut rx = agent.spawn("find invoice".into(), vec![], session());
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(types(&events), vec!["tool_call", "tool_result", "text", "done"]);
        let StreamEvent::ToolResult { tool_result } = &events[1] else {
            panic!("expected tool_result");
        };
        assert_eq!(tool_result.data["emailCount"], json!(2));
    }

    #[test]
    fn from_config_applies_agent_settings() {
        let mut config = AppConfig::default();
        config.agent.max_iterations = 3;
        config.agent.system_prompt_override = Some("Custom".into());
        let agent = AgentLoop::from_config(
            Arc::new(ScriptedProvider::replies(vec![])),
            executor(vec![]),
            &config,
        );
        assert_eq!(agent.max_iterations, 3);
        assert_eq!(agent.system_prompt.as_deref(), Some("Custom"));
    }
}
