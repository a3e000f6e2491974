//! # Veto-Bus Test Suite
//!
//! Cross-crate tests for the dispatch core, persistence and descriptors.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Recording, vetoing and persistable listeners
//! └── integration/
//!     ├── flows.rs      # End-to-end fire scenarios
//!     ├── concurrency.rs# Registration and fire from many threads
//!     ├── persistence.rs# Stream round trips through a real registry
//!     └── descriptors.rs# Event-set bindings over live registries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p vetobus-tests
//!
//! # By category
//! cargo test -p vetobus-tests integration::flows::
//!
//! # Benchmarks
//! cargo bench -p vetobus-tests
//! ```

#![allow(dead_code)]
