//! Outbound HTTP plumbing shared by the destination adapters.

pub mod client;

pub use client::HTTP_CLIENT;
