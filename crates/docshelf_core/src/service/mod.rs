//! Use-case services built on the document repository.
//!
//! # Responsibility
//! - Orchestrate repository calls into end-to-end flows.
//! - Keep the CLI decoupled from storage details.

pub mod walkthrough;
