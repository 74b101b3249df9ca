//! Books as stored by the backend, and the sorted projection used for display

use serde::{Deserialize, Serialize};

/// A persisted book: markup tied to an NPC id and a command tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// NPC id, assigned by whoever saved the book
    pub npc_id: i64,
    /// Rich-text markup, opaque to the client
    #[serde(default)]
    pub html_content: String,
    /// Free-text command tag
    #[serde(default)]
    pub command: String,
}

/// Direction of the book list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Label shown in the "Ordered by" selector
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascendent",
            SortOrder::Descending => "Descendent",
        }
    }
}

/// Sorted view over a collection.
///
/// Recomputed on every render from the last fetched collection. The sort is
/// stable, so books sharing an id keep their fetched order in both directions.
pub fn project(books: &[Book], order: SortOrder) -> Vec<&Book> {
    let mut sorted: Vec<&Book> = books.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| a.npc_id.cmp(&b.npc_id)),
        SortOrder::Descending => sorted.sort_by(|a, b| b.npc_id.cmp(&a.npc_id)),
    }
    sorted
}
