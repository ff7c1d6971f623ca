//! Core functionality for appstrap
//!
//! This crate contains the provisioning logic for the appstrap CLI:
//! prerequisite resolution, provider authentication, resource setup
//! workflows, and configuration synthesis.

pub mod auth;
pub mod config;
pub mod exec;
pub mod orchestrator;
pub mod prereqs;
pub mod probe;
pub mod prompt;
pub mod providers;
pub mod template;
