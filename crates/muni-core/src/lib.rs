//! Core muni library (markup grammar, renderer, reveal engine, session, knowledge base).

pub mod backend;
pub mod config;
pub mod kb;
pub mod markup;
pub mod session;
