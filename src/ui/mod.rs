//! UI components for Book Generator

pub mod book_list;
pub mod controls;
pub mod editor;
pub mod preview;
