//! Domain models for the assistant service.

pub mod chat;
pub mod record;

pub use chat::{ChatRequest, ChatResponse, ChatTurn, Citation, CitationReference, Role};
pub use record::{ContentFilterEvent, RequestRecord};
