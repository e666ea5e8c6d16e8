// ============================================================================
// PNGEditor GUI: main menu, control panel, image editor window
// ============================================================================

use std::path::PathBuf;

use eframe::egui;
use egui::{Key, KeyboardShortcut, Modifiers, TextureHandle};

use crate::display::{EguiTextures, TextureSink};
use crate::io::FileHandler;
use crate::ops::pipeline::{EditState, MAX_ROTATION, MIN_ROTATION};
use crate::project::Document;
use crate::settings::AppSettings;

const MARGIN: f32 = 5.0;
const SIDE_PANEL_WIDTH: f32 = 220.0;

const SHORTCUT_OPEN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const SHORTCUT_SAVE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
const SHORTCUT_SAVE_AS: KeyboardShortcut = KeyboardShortcut::new(
    Modifiers {
        alt: false,
        ctrl: false,
        shift: true,
        mac_cmd: false,
        command: true,
    },
    Key::S,
);
const SHORTCUT_QUIT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);

/// The open image plus the texture showing it. Dropping this releases the
/// GPU texture.
struct OpenImage {
    document: Document,
    texture: TextureHandle,
    /// Buffer generation last pushed to `texture`.
    uploaded_generation: u64,
}

pub struct PNGEditorApp {
    settings: AppSettings,
    file_handler: FileHandler,
    image: Option<OpenImage>,
    /// Last error or confirmation, shown under the menu.
    status: Option<String>,
    last_title: String,
}

impl PNGEditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        let file_handler = FileHandler::new(settings.last_directory.clone());
        Self {
            settings,
            file_handler,
            image: None,
            status: None,
            last_title: String::new(),
        }
    }

    fn sink(&self, ctx: &egui::Context, doc: &Document) -> EguiTextures {
        document_sink(ctx, doc, &self.settings)
    }

    // ---- File actions ---------------------------------------------------

    fn handle_open(&mut self, ctx: &egui::Context) {
        let Some(path) = self.file_handler.pick_open_path() else { return };
        self.remember_directory();
        self.open_path(ctx, path);
    }

    /// Load `path`. On failure the current image (if any) stays open.
    pub fn open_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        let document = match Document::open(&path) {
            Ok(doc) => doc,
            Err(e) => {
                log_err!("Failed to open {}: {}", path.display(), e);
                self.status = Some(format!("Failed to open {}: {}", path.display(), e));
                return;
            }
        };
        let mut sink = self.sink(ctx, &document);
        let buffer = &document.buffer;
        let uploaded_generation = buffer.generation();
        match sink.upload_texture(buffer.width(), buffer.height(), buffer.current()) {
            Ok(texture) => {
                self.image = Some(OpenImage { document, texture, uploaded_generation });
                self.status = None;
            }
            Err(e) => {
                log_err!("Texture upload failed for {}: {}", path.display(), e);
                self.status = Some(format!("Could not display image: {}", e));
            }
        }
    }

    fn handle_save(&mut self, ctx: &egui::Context) {
        let Some(open) = self.image.as_mut() else { return };
        if open.document.path.is_none() {
            self.handle_save_as(ctx);
            return;
        }
        self.status = Some(match open.document.save() {
            Ok(()) => format!("Saved {}", open.document.name),
            Err(e) => {
                log_err!("Save failed: {}", e);
                format!("Save failed: {}", e)
            }
        });
    }

    fn handle_save_as(&mut self, _ctx: &egui::Context) {
        let Some(open) = self.image.as_mut() else { return };
        let suggested = open.document.suggested_file_name();
        let Some(path) = self.file_handler.pick_save_path(&suggested) else { return };
        self.status = Some(match open.document.save_as(&path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log_err!("Save As {} failed: {}", path.display(), e);
                format!("Save failed: {}", e)
            }
        });
        self.remember_directory();
    }

    fn remember_directory(&mut self) {
        if self.settings.last_directory != self.file_handler.last_directory {
            self.settings.last_directory = self.file_handler.last_directory.clone();
            self.settings.save();
        }
    }

    /// Store new edits and push the result to the texture once.
    fn apply_edits(&mut self, ctx: &egui::Context, edits: EditState) {
        let Some(open) = self.image.as_mut() else { return };
        let mut sink = document_sink(ctx, &open.document, &self.settings);
        match open.document.apply_edits(edits, &mut sink, &mut open.texture) {
            Ok(false) => {}
            Ok(true) => open.uploaded_generation = open.document.buffer.generation(),
            Err(e) => {
                log_err!("Texture update failed: {}", e);
                self.status = Some(format!("Could not refresh preview: {}", e));
            }
        }
    }

    /// Re-push the buffer if a previous texture update didn't land.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(open) = self.image.as_mut() else { return };
        let buffer = &open.document.buffer;
        if open.uploaded_generation == buffer.generation() {
            return;
        }
        let mut sink = document_sink(ctx, &open.document, &self.settings);
        if sink
            .update_texture(&mut open.texture, buffer.width(), buffer.height(), buffer.current())
            .is_ok()
        {
            open.uploaded_generation = buffer.generation();
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Save As first: Ctrl+S would also match Ctrl+Shift+S
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_SAVE_AS)) {
            self.handle_save_as(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_SAVE)) {
            self.handle_save(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_OPEN)) {
            self.handle_open(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_QUIT)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    // ---- Panels -----------------------------------------------------------

    fn main_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("main_menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let has_image = self.image.is_some();
                    if ui
                        .add(egui::Button::new("Open").shortcut_text(ctx.format_shortcut(&SHORTCUT_OPEN)))
                        .clicked()
                    {
                        ui.close_menu();
                        self.handle_open(ctx);
                    }
                    if ui
                        .add_enabled(
                            has_image,
                            egui::Button::new("Save").shortcut_text(ctx.format_shortcut(&SHORTCUT_SAVE)),
                        )
                        .clicked()
                    {
                        ui.close_menu();
                        self.handle_save(ctx);
                    }
                    if ui
                        .add_enabled(
                            has_image,
                            egui::Button::new("Save As")
                                .shortcut_text(ctx.format_shortcut(&SHORTCUT_SAVE_AS)),
                        )
                        .clicked()
                    {
                        ui.close_menu();
                        self.handle_save_as(ctx);
                    }
                    ui.separator();
                    if ui
                        .add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&SHORTCUT_QUIT)))
                        .clicked()
                    {
                        ui.close_menu();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
            if self.image.is_none() {
                ui.label("No PNG file loaded");
            }
            if let Some(status) = &self.status {
                ui.label(status);
            }
        });
    }

    fn control_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("control_panel")
            .resizable(false)
            .exact_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| {
                ui.add_space(MARGIN);
                ui.heading("Control Panel");
                ui.separator();

                let Some(open) = self.image.as_ref() else {
                    ui.label("Open an image to start editing.");
                    return;
                };
                let mut edits = open.document.edits;

                ui.toggle_value(&mut edits.invert, "Invert Colors");
                ui.toggle_value(&mut edits.grayscale, "Convert to Grayscale");
                ui.toggle_value(&mut edits.blur, "Blur");
                ui.toggle_value(&mut edits.sharpen, "Sharpen");
                ui.separator();

                ui.add(egui::Slider::new(&mut edits.red_scale, 0.0..=1.0).text("Red"));
                ui.add(egui::Slider::new(&mut edits.green_scale, 0.0..=1.0).text("Green"));
                ui.add(egui::Slider::new(&mut edits.blue_scale, 0.0..=1.0).text("Blue"));
                ui.add(
                    egui::Slider::new(&mut edits.rotation_degrees, MIN_ROTATION..=MAX_ROTATION)
                        .text("Rotation")
                        .suffix("°"),
                );
                ui.separator();

                if ui.button("Reset").clicked() {
                    edits = EditState::default();
                }

                // A single recompute per frame, however many widgets changed.
                self.apply_edits(ctx, edits);
            });
    }

    fn editor_window(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(open) = self.image.as_ref() else { return };
            let buffer = &open.document.buffer;
            let size = egui::vec2(buffer.width() as f32, buffer.height() as f32);
            egui::ScrollArea::both().show(ui, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.image(egui::load::SizedTexture::new(open.texture.id(), size));
                });
            });
        });
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let title = match &self.image {
            Some(open) => format!("PNGEditor - {}", open.document.display_title()),
            None => "PNGEditor".to_string(),
        };
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }
}

fn document_sink(ctx: &egui::Context, doc: &Document, settings: &AppSettings) -> EguiTextures {
    EguiTextures::new(
        ctx,
        format!("document-{}", doc.id),
        settings.texture_filter.texture_options(),
    )
}

impl eframe::App for PNGEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.main_menu(ctx);
        self.control_panel(ctx);
        self.sync_texture(ctx);
        self.editor_window(ctx);
        self.update_title(ctx);
    }
}
