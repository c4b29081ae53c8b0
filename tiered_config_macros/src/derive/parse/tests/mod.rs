//! Unit tests for derive attribute parsing.
