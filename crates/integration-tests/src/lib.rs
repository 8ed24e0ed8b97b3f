//! End-to-end tests for Lumen live under `tests/`
