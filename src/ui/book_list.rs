//! Table of stored books

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::app::BookGeneratorApp;
use crate::core::book::Book;
use crate::core::markup::to_plain_text;
use crate::core::view_model::Action;

/// Lines of content shown per book before truncating
const MAX_PREVIEW_LINES: usize = 4;

/// "Current Books" panel
pub struct BookListPanel;

impl BookListPanel {
    /// Show the sorted book list
    pub fn show(ui: &mut egui::Ui, app: &mut BookGeneratorApp) {
        ui.heading("Current Books");

        let books: Vec<Book> = app.state().projection().into_iter().cloned().collect();
        if books.is_empty() {
            ui.label("No books yet");
            return;
        }

        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let mut delete = None;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(60.0))
            .column(Column::remainder().at_least(200.0).clip(true))
            .column(Column::auto().at_least(100.0))
            .column(Column::auto())
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("NPC Id");
                });
                header.col(|ui| {
                    ui.strong("Content");
                });
                header.col(|ui| {
                    ui.strong("Command");
                });
                header.col(|_| {});
            })
            .body(|mut body| {
                for book in &books {
                    let text = Self::preview_text(&book.html_content);
                    let lines = text.lines().count().max(1);
                    let height = line_height * lines as f32 + 8.0;

                    body.row(height, |mut row| {
                        row.col(|ui| {
                            ui.label(book.npc_id.to_string());
                        });
                        row.col(|ui| {
                            ui.label(text.as_str())
                                .on_hover_text(book.html_content.as_str());
                        });
                        row.col(|ui| {
                            ui.label(book.command.as_str());
                        });
                        row.col(|ui| {
                            if ui.button("Delete").clicked() {
                                delete = Some(book.npc_id);
                            }
                        });
                    });
                }
            });

        if let Some(npc_id) = delete {
            tracing::info!("Deleting book {}", npc_id);
            app.dispatch(Action::SubmitDelete(npc_id));
        }
    }

    /// Plain text of the markup, cut to a few lines
    fn preview_text(markup: &str) -> String {
        let text = to_plain_text(markup);
        let mut lines: Vec<&str> = text.lines().take(MAX_PREVIEW_LINES + 1).collect();
        if lines.len() > MAX_PREVIEW_LINES {
            lines.truncate(MAX_PREVIEW_LINES);
            lines.push("\u{2026}");
        }
        lines.join("\n")
    }
}
