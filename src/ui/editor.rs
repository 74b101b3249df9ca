//! Markup editor with a formatting toolbar

use std::ops::Range;

use eframe::egui;
use egui::text::{CCursor, CCursorRange};

use crate::core::draft::DraftState;
use crate::core::markup::{self, Alignment, Format, Rgb, PALETTE};

/// Editor widget state kept between frames
#[derive(Debug, Clone, Default)]
pub struct MarkupEditor {
    /// Last known selection, in chars
    selection: Range<usize>,
    /// Address typed into the link popup
    link_url: String,
    /// Address typed into the image popup
    image_url: String,
    /// Cursor to restore after a toolbar edit
    pending_cursor: Option<usize>,
}

impl MarkupEditor {
    fn id() -> egui::Id {
        egui::Id::new("draft_editor")
    }

    /// Show the toolbar and text area. Returns true if the markup changed.
    pub fn show(&mut self, ui: &mut egui::Ui, draft: &mut DraftState, rows: usize) -> bool {
        let mut changed = false;

        if let Some(format) = self.show_toolbar(ui) {
            let edit = markup::apply(&draft.markup_content, self.selection.clone(), &format);
            draft.markup_content = edit.text;
            self.selection = edit.cursor..edit.cursor;
            self.pending_cursor = Some(edit.cursor);
            changed = true;
        }

        if let Some(cursor) = self.pending_cursor.take() {
            Self::place_cursor(ui.ctx(), cursor);
        }

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .max_height(ui.available_height() * 0.5)
            .show(ui, |ui| {
                let output = egui::TextEdit::multiline(&mut draft.markup_content)
                    .id(Self::id())
                    .font(egui::TextStyle::Monospace)
                    .code_editor()
                    .hint_text("Write the book here...")
                    .desired_width(f32::INFINITY)
                    .desired_rows(rows)
                    .show(ui);

                if output.response.changed() {
                    changed = true;
                }
                if let Some(range) = output.cursor_range {
                    let (a, b) = (range.primary.index, range.secondary.index);
                    self.selection = a.min(b)..a.max(b);
                }
            });

        changed
    }

    /// Render the toolbar and return the format that was picked, if any
    fn show_toolbar(&mut self, ui: &mut egui::Ui) -> Option<Format> {
        let mut picked = None;

        ui.horizontal_wrapped(|ui| {
            if ui.button("H1").on_hover_text("Header 1").clicked() {
                picked = Some(Format::Header(1));
            }
            if ui.button("H2").on_hover_text("Header 2").clicked() {
                picked = Some(Format::Header(2));
            }
            ui.separator();

            if ui.button("1.").on_hover_text("Ordered list").clicked() {
                picked = Some(Format::OrderedList);
            }
            if ui.button("\u{2022}").on_hover_text("Bullet list").clicked() {
                picked = Some(Format::BulletList);
            }
            ui.separator();

            if ui.button(egui::RichText::new("B").strong()).on_hover_text("Bold").clicked() {
                picked = Some(Format::Bold);
            }
            if ui.button(egui::RichText::new("I").italics()).on_hover_text("Italic").clicked() {
                picked = Some(Format::Italic);
            }
            if ui.button(egui::RichText::new("U").underline()).on_hover_text("Underline").clicked() {
                picked = Some(Format::Underline);
            }
            ui.separator();

            ui.menu_button("Color", |ui| {
                if let Some(rgb) = Self::palette(ui) {
                    picked = Some(Format::Color(rgb));
                    ui.close();
                }
            });
            ui.menu_button("Background", |ui| {
                if let Some(rgb) = Self::palette(ui) {
                    picked = Some(Format::Background(rgb));
                    ui.close();
                }
            });
            ui.separator();

            ui.menu_button("Align", |ui| {
                for alignment in Alignment::ALL {
                    if ui.button(alignment.label()).clicked() {
                        picked = Some(Format::Align(alignment));
                        ui.close();
                    }
                }
            });
            ui.separator();

            ui.menu_button("Link", |ui| {
                if let Some(url) = Self::address_input(ui, &mut self.link_url) {
                    picked = Some(Format::Link(url));
                    ui.close();
                }
            });
            ui.menu_button("Image", |ui| {
                if let Some(url) = Self::address_input(ui, &mut self.image_url) {
                    picked = Some(Format::Image(url));
                    ui.close();
                }
            });
        });

        picked
    }

    /// Color swatches; returns the clicked color
    fn palette(ui: &mut egui::Ui) -> Option<Rgb> {
        let mut picked = None;
        ui.horizontal(|ui| {
            for rgb in PALETTE {
                let Rgb(r, g, b) = rgb;
                let swatch = egui::Button::new("    ").fill(egui::Color32::from_rgb(r, g, b));
                if ui.add(swatch).clicked() {
                    picked = Some(rgb);
                }
            }
        });
        picked
    }

    /// URL field plus insert button; returns the address once confirmed
    fn address_input(ui: &mut egui::Ui, url: &mut String) -> Option<String> {
        let response = ui.add(egui::TextEdit::singleline(url).hint_text("https://"));
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let clicked = ui.button("Insert").clicked();

        let address = url.trim();
        if (submitted || clicked) && !address.is_empty() {
            let address = address.to_string();
            url.clear();
            return Some(address);
        }
        None
    }

    /// Move the text cursor of the editor
    fn place_cursor(ctx: &egui::Context, index: usize) {
        if let Some(mut state) = egui::TextEdit::load_state(ctx, Self::id()) {
            state
                .cursor
                .set_char_range(Some(CCursorRange::one(CCursor::new(index))));
            state.store(ctx, Self::id());
        }
    }
}
