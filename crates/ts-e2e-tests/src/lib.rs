//! End-to-end tests for the TerraSmart workspace live in `tests/`.
