//! Integration test crate for StillReel.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! Engines and decode surfaces are faked so no FFmpeg binary is needed.

#[cfg(test)]
mod fakes;

#[cfg(test)]
mod timeline;


#[cfg(test)]
mod sampling;
