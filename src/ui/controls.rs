//! Draft fields and book actions

use eframe::egui;

use crate::app::BookGeneratorApp;
use crate::core::book::SortOrder;
use crate::core::view_model::Action;

/// Right-hand control column
pub struct ControlsPanel;

impl ControlsPanel {
    /// Show the controls
    pub fn show(ui: &mut egui::Ui, app: &mut BookGeneratorApp) {
        ui.add_space(8.0);

        let mut draft = app.state().draft.clone();
        let mut draft_changed = false;

        egui::Grid::new("draft_fields")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("NPC Id:");
                draft_changed |= ui
                    .add(egui::TextEdit::singleline(&mut draft.id_input).desired_width(120.0))
                    .changed();
                ui.end_row();

                ui.label("Command:");
                draft_changed |= ui
                    .add(egui::TextEdit::singleline(&mut draft.command_input).desired_width(120.0))
                    .changed();
                ui.end_row();
            });

        if draft_changed {
            app.dispatch(Action::EditDraft(draft));
        }

        ui.add_space(8.0);

        let preview_label = if app.state().show_preview {
            "Hide HTML"
        } else {
            "Show HTML"
        };

        ui.vertical_centered_justified(|ui| {
            if ui.button("Save Book").on_hover_text("Ctrl+S").clicked() {
                app.dispatch(Action::SubmitSave);
            }
            if ui.button(preview_label).clicked() {
                app.dispatch(Action::TogglePreview);
            }
            if ui.button("Download Books").clicked() {
                app.dispatch(Action::Download);
            }
            if ui.button("Refresh current books").on_hover_text("Ctrl+R").clicked() {
                app.dispatch(Action::Refresh);
            }
        });

        ui.add_space(8.0);

        let mut order = app.state().sort_order;
        ui.horizontal(|ui| {
            ui.label("Ordered by:");
            egui::ComboBox::from_id_salt("sort_order")
                .selected_text(order.label())
                .show_ui(ui, |ui| {
                    for option in [SortOrder::Ascending, SortOrder::Descending] {
                        ui.selectable_value(&mut order, option, option.label());
                    }
                });
        });
        if order != app.state().sort_order {
            app.dispatch(Action::SetSortOrder(order));
        }
    }
}
