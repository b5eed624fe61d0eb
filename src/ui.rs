use crate::clipboard::SystemClipboard;
use crate::completion::{CompletionBackend, CompletionError};
use crate::dictionary::Language;
use crate::form::{OutputView, TranslationForm, LOADING_INDICATOR};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui_phosphor::regular as icons;
use std::sync::Arc;
use std::time::Instant;

const TITLE: &str = "Emergency Warning Translator";

type Outcome = Result<String, CompletionError>;

struct TranslatorApp {
    form: TranslationForm,
    backend: Arc<dyn CompletionBackend>,
    runtime: tokio::runtime::Handle,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    clipboard: SystemClipboard,
}

impl TranslatorApp {
    fn new(backend: Arc<dyn CompletionBackend>, runtime: tokio::runtime::Handle) -> Self {
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();
        Self {
            form: TranslationForm::default(),
            backend,
            runtime,
            outcome_tx,
            outcome_rx,
            clipboard: SystemClipboard::default(),
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let Ok(submission) = self.form.submit() else { return };
        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = submission.translate(backend.as_ref()).await;
            if tx.send(outcome).is_err() {
                tracing::warn!("UI gone before translation finished");
            }
            ctx.request_repaint();
        });
    }

    fn form_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(TITLE);
            });
            ui.add_space(16.0);

            ui.label("Select a language");
            let selected = if self.form.form.language.is_empty() {
                "Select".to_string()
            } else {
                self.form.form.language.clone()
            };
            egui::ComboBox::from_id_source("language")
                .selected_text(selected)
                .width(320.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.form.form.language, String::new(), "Select");
                    for lang in Language::ALL {
                        ui.selectable_value(&mut self.form.form.language, lang.name().to_string(), lang.name());
                    }
                });
            ui.add_space(12.0);

            ui.label("Enter Message");
            ui.add(
                egui::TextEdit::multiline(&mut self.form.form.message)
                    .desired_rows(8)
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.add_enabled(self.form.can_submit(), egui::Button::new("Translate")).clicked() {
                    self.submit(ctx);
                }
                if self.form.is_loading() {
                    ui.spinner();
                }
            });
        });
    }

    fn overlay(&mut self, ctx: &egui::Context) {
        let Some(view) = self.form.view() else { return };
        let copy_label = format!("{} {}", icons::COPY, self.form.copy_label());
        let has_output = !self.form.output().is_empty();
        let mut close = false;
        let mut copy = false;

        egui::Window::new("Translation")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .default_width(440.0)
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    close = ui.button(icons::X).clicked();
                });
                match view {
                    OutputView::Loading => {
                        ui.label(LOADING_INDICATOR);
                    }
                    OutputView::LargeHeading(text) => {
                        ui.label(egui::RichText::new(text).heading().size(26.0));
                    }
                    OutputView::SmallHeading(text) => {
                        ui.label(egui::RichText::new(text).heading().size(18.0));
                    }
                }
                ui.add_space(12.0);
                copy = ui.add_enabled(has_output, egui::Button::new(copy_label)).clicked();
            });

        if copy {
            self.form.copy(&mut self.clipboard, Instant::now());
        }
        if close {
            self.form.close();
        }
    }
}

impl eframe::App for TranslatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.form.complete(outcome);
        }
        let now = Instant::now();
        self.form.tick(now);
        if let Some(left) = self.form.copy_confirmation_remaining(now) {
            ctx.request_repaint_after(left);
        }

        self.form_panel(ctx);
        if self.form.is_modal_open() {
            self.overlay(ctx);
        }
    }
}

/// Runs the window on the calling thread until it is closed.
pub fn run(backend: Arc<dyn CompletionBackend>, runtime: tokio::runtime::Handle) -> anyhow::Result<()> {
    tracing::info!("Main UI: starting event loop");
    let app = TranslatorApp::new(backend, runtime);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([640.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        native_options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Main UI error: {}", e))?;
    tracing::info!("Main UI: event loop exited");
    Ok(())
}
