//! Async client for the learning platform's REST backend: JWT session
//! management with transparent refresh-and-replay, a visibility-aware
//! polling scheduler, and typed wrappers for the platform's endpoints.

pub mod config;

pub mod constants;

pub mod error;

pub mod application;

pub mod polling;

pub mod session;

pub mod storage;

pub mod transport;

pub mod utils;
