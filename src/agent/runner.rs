//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::config::LlmSettings;
use crate::error::{CaramelError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, info, warn};

/// Default system prompt for the agent.
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can fetch stock prices.";

/// Agent that can call the stock price tool before answering.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tools: ToolContext,
    max_iterations: usize,
    handle_parsing_errors: bool,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent with the given tool context and model settings.
    pub fn new(tools: ToolContext, llm: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(llm)?,
            model: llm.model(),
            temperature: llm.temperature(),
            tools,
            max_iterations: 8,
            handle_parsing_errors: true,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Report malformed tool calls back to the model instead of aborting.
    pub fn with_parsing_error_recovery(mut self, enabled: bool) -> Self {
        self.handle_parsing_errors = enabled;
        self
    }

    /// Model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| CaramelError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(task)
                .build()
                .map_err(|e| CaramelError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(CaramelError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(&self.model)
                .messages(messages.clone())
                .tools(tool_definitions());
            if let Some(temperature) = self.temperature {
                request.temperature(temperature);
            }
            let request = request
                .build()
                .map_err(|e| CaramelError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| CaramelError::Llm(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| CaramelError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                // No tool calls - the model is done
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.clone().unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    })
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| CaramelError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| CaramelError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Execution failures are always fed back to the model. Parse failures are
    /// fed back only when parsing-error recovery is on.
    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> Result<ToolCallRecord> {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) if self.handle_parsing_errors => {
                warn!("Malformed tool call from model: {}", e);
                format!(
                    "Failed to parse tool call: {}. Call get_stock_prices with \
                    {{\"tickers\": \"TICKER1,TICKER2\"}}.",
                    e
                )
            }
            Err(e) => return Err(e),
        };

        Ok(ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        })
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use crate::market::fake::FakeProvider;
    use crate::market::LookupOptions;
    use async_openai::types::{ChatCompletionToolType, FunctionCall};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn local_agent(provider: FakeProvider) -> Agent {
        let llm = LlmSettings::default().with_provider(LlmProvider::Ollama);
        let tools = ToolContext::new(Arc::new(provider), LookupOptions::default());
        Agent::new(tools, &llm).unwrap()
    }

    fn tool_call(name: &str, arguments: &str) -> ChatCompletionMessageToolCall {
        ChatCompletionMessageToolCall {
            id: "call_1".to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn completion(message: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama3.1:8b",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": null,
                "logprobs": null
            }],
            "usage": null
        })
    }

    fn tool_call_reply(id: &str, tickers: &str) -> Value {
        completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": {
                    "name": "get_stock_prices",
                    "arguments": json!({ "tickers": tickers }).to_string()
                }
            }]
        }))
    }

    fn answer_reply(content: &str) -> Value {
        completion(json!({ "role": "assistant", "content": content }))
    }

    /// Read one HTTP request and return its JSON body.
    async fn read_request(stream: &mut TcpStream) -> Value {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-request");
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length: usize = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return serde_json::from_slice(&buf[end + 4..end + 4 + length]).unwrap();
            }
        }
    }

    /// Serve canned chat completions in order, repeating the last one.
    /// Returns the base URL and the captured request bodies.
    async fn serve_completions(replies: Vec<Value>) -> (String, Arc<Mutex<Vec<Value>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = requests.clone();

        tokio::spawn(async move {
            let mut served = 0;
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                let body = read_request(&mut stream).await;
                captured.lock().unwrap().push(body);

                let reply = replies[served.min(replies.len() - 1)].to_string();
                served += 1;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                    content-length: {}\r\nconnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        (format!("http://{}/v1", addr), requests)
    }

    fn served_agent(api_base: String, provider: FakeProvider) -> Agent {
        let mut llm = LlmSettings::default().with_provider(LlmProvider::Ollama);
        llm.api_base = Some(api_base);
        let tools = ToolContext::new(Arc::new(provider), LookupOptions::default());
        Agent::new(tools, &llm).unwrap()
    }

    #[tokio::test]
    async fn test_run_calls_tool_then_answers() {
        let (api_base, requests) = serve_completions(vec![
            tool_call_reply("call_42", "GOOG,INFY.NS"),
            answer_reply("The current stock price for GOOG is $170.13."),
        ])
        .await;
        let provider = FakeProvider::default()
            .with_quote("GOOG", Some(170.126), Some("USD"))
            .with_quote("INFY.NS", Some(1550.75), Some("INR"));
        let agent = served_agent(api_base, provider);

        let response = agent.run("Get prices for GOOG,INFY.NS").await.unwrap();

        assert_eq!(response.content, "The current stock price for GOOG is $170.13.");
        assert_eq!(response.iterations, 2);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(
            response.tool_calls[0].result,
            r#"{"GOOG":{"price":170.13,"currency":"USD"},"INFY.NS":{"price":1550.75,"currency":"INR"}}"#
        );

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["messages"].as_array().unwrap().len(), 2);
        assert_eq!(requests[0]["tools"][0]["function"]["name"], "get_stock_prices");

        let messages = requests[1]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["tool_calls"][0]["id"], "call_42");
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_42");
        assert_eq!(messages[3]["content"], response.tool_calls[0].result);
    }

    #[tokio::test]
    async fn test_run_stops_at_iteration_cap() {
        let (api_base, requests) =
            serve_completions(vec![tool_call_reply("call_loop", "GOOG")]).await;
        let agent = served_agent(
            api_base,
            FakeProvider::default().with_quote("GOOG", Some(170.0), Some("USD")),
        )
        .with_max_iterations(3);

        let err = agent.run("Get prices for GOOG").await.unwrap_err();

        assert!(matches!(err, CaramelError::Agent(_)));
        assert!(err.to_string().contains("maximum iterations (3)"));
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "get_stock_prices".to_string(),
            arguments: r#"{"tickers": "GOOG"}"#.to_string(),
            result: "{}".to_string(),
        };
        assert_eq!(format!("{}", record), r#"get_stock_prices({"tickers": "GOOG"})"#);
    }

    #[test]
    fn test_builder_options() {
        let agent = local_agent(FakeProvider::default())
            .with_max_iterations(3)
            .with_system_prompt("Be terse.")
            .with_parsing_error_recovery(false);
        assert_eq!(agent.model(), "llama3.1:8b");
        assert_eq!(agent.max_iterations, 3);
        assert_eq!(agent.system_prompt, "Be terse.");
        assert!(!agent.handle_parsing_errors);
    }

    #[tokio::test]
    async fn test_execute_tool_call_runs_lookup() {
        let agent = local_agent(
            FakeProvider::default().with_quote("INFY.NS", Some(1550.7549), Some("INR")),
        );

        let record = agent
            .execute_tool_call(&tool_call("get_stock_prices", r#"{"tickers": "INFY.NS"}"#))
            .await
            .unwrap();

        assert_eq!(record.result, r#"{"INFY.NS":{"price":1550.75,"currency":"INR"}}"#);
    }

    #[tokio::test]
    async fn test_malformed_call_is_reported_back() {
        let agent = local_agent(FakeProvider::default());

        let record = agent
            .execute_tool_call(&tool_call("get_stock_prices", r#"{"symbol": "GOOG"}"#))
            .await
            .unwrap();

        assert!(record.result.starts_with("Failed to parse tool call"));
    }

    #[tokio::test]
    async fn test_malformed_call_fails_without_recovery() {
        let agent = local_agent(FakeProvider::default()).with_parsing_error_recovery(false);

        let result = agent
            .execute_tool_call(&tool_call("lookup_weather", "{}"))
            .await;

        assert!(matches!(result, Err(CaramelError::Agent(_))));
    }

    #[tokio::test]
    async fn test_tool_error_is_reported_back() {
        let agent = local_agent(FakeProvider::default()).with_parsing_error_recovery(false);

        let record = agent
            .execute_tool_call(&tool_call("get_stock_prices", r#"{"tickers": ","}"#))
            .await
            .unwrap();

        assert!(record.result.starts_with("Tool error: Invalid input"));
    }
}
