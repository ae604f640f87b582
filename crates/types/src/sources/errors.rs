//! Error types for source adapters

use thiserror::Error;

/// Hard failures reported by a supply source or block resolver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
	#[error("transport error: {0}")]
	Transport(String),

	#[error("upstream returned status {status}: {message}")]
	UpstreamStatus { status: u16, message: String },

	#[error("malformed upstream response: {0}")]
	InvalidResponse(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
