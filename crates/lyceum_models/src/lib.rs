//! Model provider adapters for the lyceum orchestration core.
//!
//! Providers implement the [`ChatProvider`](lyceum_interface::ChatProvider)
//! seam consumed by the tier router. This crate ships one production
//! adapter speaking the OpenAI-compatible chat-completions wire shape,
//! which covers OpenAI itself and the many inference servers that mirror
//! its API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai;

pub use openai::OpenAiCompatClient;
