pub mod client;

pub use client::{
    ChatMessage, ChatRequest, ChatResponse, ClientError, CompletionClient, OpenAiClient,
    StubClient,
};
