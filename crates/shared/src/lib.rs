//! Shared utilities and common types for the Dinner Host backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Guest magic-token generation and fingerprinting
//! - Identity token (JWT) issuing and verification
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod validation;
