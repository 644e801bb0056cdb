//! Core Dialtone library (session lifecycle, storage, user fetcher, config).
//!
//! - `user`: the immutable `UserRecord` shown on the dashboard
//! - `storage`: key-value persistence and the single-slot `UserRecordStore`
//! - `fetcher`: random-user API client
//! - `session`: `SessionManager` state machine (hydrate, login, logout)
//! - `guard`: route guards that redirect based on session state
//! - `phone`: mobile number validation for the login form

pub mod config;
pub mod fetcher;
pub mod guard;
pub mod interrupt;
pub mod logging;
pub mod phone;
pub mod session;
pub mod storage;
pub mod user;
