//! Generative backend for segments, responses and insights.
//!
//! [`GlmClient`] talks to an OpenAI-compatible chat-completion endpoint.
//! [`Generator`] wraps any [`ChatClient`] and never fails: when the backend is
//! missing or misbehaves it falls back to built-in data or the allocator.

pub mod client;
pub mod generator;
pub mod prompts;

pub use client::{AiError, ChatClient, ChatMessage, GlmClient, GlmConfig, Role, DEFAULT_API_URL};
pub use generator::{extract_json, Generated, Generator, Source, DEFAULT_NICHE};
