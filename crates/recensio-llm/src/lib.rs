//! recensio-llm — LLM backend abstraction and digest summarization.
//!
//! One backend trait, one OpenAI implementation, and the summarization
//! pass that enriches accepted papers with per-paper analyses and a
//! cross-paper synthesis. Model failures degrade to deterministic
//! placeholder content; a single bad response never aborts the digest.

pub mod analysis;
pub mod backend;
pub mod summarize;

pub use analysis::{DigestMetadata, EnhancedPaper, Finding, Methodology, PaperAnalysis, Synthesis};
pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OpenAiBackend};
pub use summarize::{summarize_all, DigestDocument};
