//! Throttling for the unauthenticated login endpoints.
//!
//! Each [`RateLimitRule`] counts attempts in fixed windows against one kind
//! of subject: the client address, or the normalized email named in the
//! request. Counting per email caps code guessing against one account no
//! matter how many addresses the caller rotates through.

mod ports;
mod rule;
mod service;


pub use ports::{AttemptWindow, RateLimitRepository};
pub use rule::{RateLimitRule, RateLimitScope};
pub use service::RateLimitService;
