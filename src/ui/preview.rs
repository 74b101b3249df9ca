//! Raw HTML preview of the draft

use eframe::egui;

use crate::core::view_model::ViewState;

/// Read-only view of the markup snapshot taken when the preview was opened
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, state: &ViewState) {
        ui.heading("Vista en HTML");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                if state.preview_buffer.is_empty() {
                    ui.weak("The draft is empty");
                } else {
                    let mut snapshot = state.preview_buffer.as_str();
                    egui::TextEdit::multiline(&mut snapshot)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .show(ui);
                }
            });
    }
}
