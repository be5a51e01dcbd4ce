#![doc = "blog-pilot: generate blog posts with an LLM and publish them as pull requests."]

//! This crate contains the full publishing pipeline: content generation
//! against a chat-completions API, repository synchronisation with retry,
//! post composition, commit/push plumbing and pull-request creation.
//!
//! # Usage
//! Drive it through the `blog-pilot` binary, or call
//! [`publish::publish`] directly with your own [`contract`] trait
//! implementations (tests substitute mockall mocks).

pub mod checkout;
pub mod cli;
pub mod compose;
pub mod config;
pub mod contract;
pub mod error;
pub mod generator;
pub mod gitcli;
pub mod github;
pub mod load_config;
pub mod naming;
pub mod publish;
