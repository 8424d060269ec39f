//! assistant-service: answers employee HR questions by retrieving passages
//! from the policy document index and asking a language model to compose a
//! grounded answer.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
