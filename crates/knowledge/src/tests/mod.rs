//! Pipeline tests with in-process fakes for the external services.

mod fakes;
mod rag_ranking;
