//! # Context Fill
//!
//! Extracts contact details from a PDF or an image with Gemini and fills
//! them into whatever web form is in front of the user.
//!
//! ## Pieces
//!
//! - **Extraction**: [`llm::ContactExtractor`] sends a document inline to
//!   Gemini with a fixed prompt; [`parser::parse_response`] recovers an
//!   [`ExtractedRecord`] from the reply, prose and code fences included.
//! - **Form filling**: [`form::Page`] models the forms on a page,
//!   [`form::detect_forms`] lists them, and [`form::fill`] writes a record
//!   into one, resolving control names through the [`alias`] table.
//! - **Watching**: [`form::FormWatcher`] rescans a page on an interval so
//!   forms that appear later are picked up.
//! - **Storage**: [`store::SubmissionStore`] keeps saved submissions, in
//!   memory or backed by a JSON-lines journal.
//! - **HTTP API** (`server` feature): upload, extraction and CRUD routes.
//!
//! ## Example
//!
//! ```rust
//! use context_fill::form::{detect_forms, Page};
//! use context_fill::{ExtractedRecord, FieldKey};
//!
//! let mut page = Page::parse(
//!     r#"<form id="signup"><input name="First Name"><input name="email"></form>"#,
//! );
//! let record = ExtractedRecord::new()
//!     .with(FieldKey::FirstName, "Jane")
//!     .with(FieldKey::Email, "jane@example.com");
//!
//! let forms = detect_forms(&page);
//! assert_eq!(page.fill(&forms[0], &record), 2);
//! ```

pub mod alias;
pub mod config;
pub mod error;
pub mod form;
pub mod parser;
pub mod record;
pub mod store;

#[cfg(feature = "gemini")]
pub mod llm;

#[cfg(feature = "server")]
pub mod server;

pub use config::ServerConfig;
pub use error::{ContextFillError, Result};
pub use form::{detect_forms, DetectedForm, Form, FormWatcher, Page};
pub use parser::{parse_response, BraceScan};
pub use record::{ExtractedRecord, FieldKey};
pub use store::{FormSubmission, SubmissionDraft, SubmissionStore};

#[cfg(feature = "gemini")]
pub use llm::{ContactExtractor, DocumentExtractor, GeminiClient};
