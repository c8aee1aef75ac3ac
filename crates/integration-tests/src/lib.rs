//! Integration tests for Cirrus.
//!
//! The tests in `tests/` exercise a running storefront over HTTP. They
//! are `#[ignore]`d by default; see each file's header for prerequisites.
