pub mod llm;
pub mod tools;
pub mod agent;
pub mod clients;
pub mod gallery;
pub mod session;
pub mod message;
pub mod config;
pub mod error;
pub mod prelude;
