//! Client half of the quoting contract: the backend API seam, its reqwest
//! implementation and the create-then-refetch submission protocol.

pub mod api;
pub mod submission;

pub use api::{ApiError, HttpQuoteApi, QuoteApi};
pub use submission::{
    load_catalog, load_session_catalog, submit_quote, submit_session, SubmissionError,
};
