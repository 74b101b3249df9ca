//! Core functionality: books, drafts, markup, configuration and the list view-model

pub mod book;
pub mod config;
pub mod draft;
pub mod markup;
pub mod view_model;
