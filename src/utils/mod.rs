//! Small helpers: call-site capture and elapsed-time formatting.

pub mod callsite;
pub mod time;

pub use callsite::CallSite;
pub use time::format_duration;
