//! Cross-module tests: scene loading, AI caching and scheduling together

mod end_to_end;
