//! Main application state and UI coordination

use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::view_model::{Action, ViewState};
use crate::store::{Dispatcher, HttpBookStore};
use crate::ui::{
    book_list::BookListPanel, controls::ControlsPanel, editor::MarkupEditor, preview::PreviewPanel,
};

/// Main application state
pub struct BookGeneratorApp {
    /// View state owner and bridge to the book API
    pub dispatcher: Dispatcher<HttpBookStore>,
    /// Application configuration
    pub config: AppConfig,
    /// Editor widget state (selection, pending link/image addresses)
    pub editor: MarkupEditor,
}

impl BookGeneratorApp {
    /// Create a new application instance and load the current books
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        mut dispatcher: Dispatcher<HttpBookStore>,
    ) -> Self {
        dispatcher.set_repaint_context(cc.egui_ctx.clone());
        dispatcher.dispatch(Action::Refresh);

        Self {
            dispatcher,
            config,
            editor: MarkupEditor::default(),
        }
    }

    /// Current view state
    pub fn state(&self) -> &ViewState {
        self.dispatcher.state()
    }

    /// Send an action to the view-model
    pub fn dispatch(&mut self, action: Action) {
        self.dispatcher.dispatch(action);
    }

    /// Render the error line, if any
    fn render_status(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state().last_error.clone() else {
            return;
        };

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Dismiss").clicked() {
                        self.dispatch(Action::DismissError);
                    }
                });
            });
        });
    }
}

impl eframe::App for BookGeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatcher.pump();

        // Handle keyboard shortcuts
        let (save, refresh) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::S),
                i.modifiers.ctrl && i.key_pressed(egui::Key::R),
            )
        });
        if save {
            self.dispatch(Action::SubmitSave);
        }
        if refresh {
            self.dispatch(Action::Refresh);
        }

        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Book Generator 2.0");
            });
        });

        self.render_status(ctx);

        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                ControlsPanel::show(ui, self);
            });

        if self.state().show_preview {
            egui::SidePanel::right("html_preview")
                .resizable(true)
                .default_width(320.0)
                .min_width(200.0)
                .show(ctx, |ui| {
                    PreviewPanel::show(ui, self.state());
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut draft = self.state().draft.clone();
            if self.editor.show(ui, &mut draft, self.config.ui.editor_rows) {
                self.dispatch(Action::EditDraft(draft));
            }

            ui.separator();

            BookListPanel::show(ui, self);
        });
    }
}
