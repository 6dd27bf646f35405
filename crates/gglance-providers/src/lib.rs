//! OAuth token exchange and resource fetchers.
//!
//! This crate provides the provider side of the login flow:
//!
//! - [`TokenExchanger`] - builds authorization URLs and trades codes for tokens
//! - [`ResourceFetcher`] - reads the signed-in user's data
//! - [`ProviderError`] - error types for both
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   code    ┌──────────────┐
//! │   callback   │ ────────▶ │ OAuthClient  │ ──▶ token endpoint
//! └──────┬───────┘           └──────────────┘
//!        │ TokenInfo
//!        ▼
//! ┌──────────────────────────────────────────┐
//! │             ComposedFetcher              │
//! │  CalendarSource          FileSource      │
//! │  (GoogleCalendarClient)  (GoogleDrive…)  │
//! └──────────────────┬───────────────────────┘
//!                    ▼
//!            ResourceSnapshot
//! ```

pub mod error;
pub mod google;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    BoxFuture, CalendarSource, ComposedFetcher, FileSource, ResourceFetcher, TokenExchanger,
};
