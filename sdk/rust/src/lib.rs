//! Client for the study-material backend, reached through the forwarding proxy.

pub mod client;

pub use client::{ClientError, StudyClient, StudyMaterial, StudyOptions, Videos};
