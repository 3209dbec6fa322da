//! cssnip - CSS Snippet Book
//!
//! A small web application for storing and browsing CSS snippets. Snippets are kept in a
//! single JSON file, listed and previewed in the browser, and exported as JSON for
//! programmatic use.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod models;
pub mod ui;
