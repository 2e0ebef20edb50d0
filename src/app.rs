use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use image::RgbaImage;

use crate::config::CropConfig;
use crate::extract::{CropOutput, ExtractSettings};
use crate::gallery::Photo;
use crate::gesture::ResizeHandle;
use crate::preview::{CropRequest, CropWorker};
use crate::selection::{self, Selection, SelectionReceiver};
use crate::sidebar::Sidebar;
use crate::transform::{self, PixelRect, Point};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];
const THUMBNAIL_TEXTURE_SIDE: u32 = 512;

/// The crop currently shown in the big display.
struct CroppedView {
    selection: Selection,
    output: CropOutput,
    texture: egui::TextureHandle,
}

pub struct CropSidebarApp {
    config: CropConfig,
    sidebar: Sidebar,
    selections: SelectionReceiver,
    worker: CropWorker,
    thumbnails: HashMap<String, egui::TextureHandle>,
    pending: Option<Selection>,
    shown: Option<CroppedView>,
    preview_error: Option<String>,
    upload_errors: Vec<String>,
}

fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

fn to_pixel(rect: egui::Rect) -> PixelRect {
    PixelRect {
        left: rect.min.x as f64,
        top: rect.min.y as f64,
        width: rect.width() as f64,
        height: rect.height() as f64,
    }
}

fn to_screen(rect: &PixelRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.left as f32, rect.top as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

fn load_texture(ctx: &egui::Context, name: &str, image: &RgbaImage) -> egui::TextureHandle {
    let size = [image.width() as _, image.height() as _];
    let pixels = image.as_flat_samples();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

impl CropSidebarApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: CropConfig) -> Self {
        let (tx, rx) = selection::channel();
        Self {
            sidebar: Sidebar::new(&config, tx),
            selections: rx,
            worker: CropWorker::new(ExtractSettings::from(&config)),
            thumbnails: HashMap::new(),
            pending: None,
            shown: None,
            preview_error: None,
            upload_errors: Vec::new(),
            config,
        }
    }

    fn add_files(&mut self, ctx: &egui::Context, paths: Vec<PathBuf>) {
        self.upload_errors = self
            .sidebar
            .upload(&paths)
            .into_iter()
            .map(|err| err.to_string())
            .collect();

        let new_keys: Vec<(String, PathBuf)> = self
            .sidebar
            .gallery()
            .photos()
            .iter()
            .filter(|photo| !self.thumbnails.contains_key(&photo.key))
            .map(|photo| (photo.key.clone(), photo.path.clone()))
            .collect();

        for (key, path) in new_keys {
            match image::open(&path) {
                Ok(img) => {
                    let thumb = img.thumbnail(THUMBNAIL_TEXTURE_SIDE, THUMBNAIL_TEXTURE_SIDE);
                    let texture = load_texture(ctx, &key, &thumb.to_rgba8());
                    self.thumbnails.insert(key, texture);
                }
                Err(err) => {
                    log::warn!("cannot decode {}: {err}", path.display());
                    self.upload_errors.push(format!("{}: {err}", path.display()));
                    self.sidebar.delete(&key);
                }
            }
        }
    }

    fn delete_photo(&mut self, key: &str) {
        self.sidebar.delete(key);
        self.thumbnails.remove(key);
        if self.pending.as_ref().is_some_and(|s| s.photo.key == key) {
            self.worker.cancel();
            self.pending = None;
        }
        if self.shown.as_ref().is_some_and(|v| v.selection.photo.key == key) {
            self.shown = None;
            self.preview_error = None;
        }
    }

    /// Feeds new selections to the worker and picks up finished crops.
    fn pump_preview(&mut self, ctx: &egui::Context) {
        if let Some(selection) = self.selections.latest() {
            self.worker.submit(CropRequest {
                key: selection.photo.key.clone(),
                source: selection.photo.source(),
                rect: selection.rect,
            });
            self.pending = Some(selection);
        }

        if let Some(done) = self.worker.poll() {
            let selection = self.pending.take();
            match (done.result, selection) {
                (Ok(output), Some(selection)) => {
                    let texture = load_texture(ctx, "cropped", &output.image);
                    self.shown = Some(CroppedView {
                        selection,
                        output,
                        texture,
                    });
                    self.preview_error = None;
                }
                (Err(err), _) => {
                    log::warn!("crop of {} failed: {err}", done.key);
                    self.preview_error = Some(err.to_string());
                }
                (Ok(_), None) => {}
            }
        }

        if self.worker.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(30));
        }
    }

    fn thumbnail_cell(&mut self, ui: &mut egui::Ui, photo: &Photo) -> bool {
        let Some(texture) = self.thumbnails.get(&photo.key).cloned() else {
            return false;
        };
        let Some(mut rect) = self.sidebar.rect_for(&photo.key) else {
            return false;
        };

        let width = self.config.thumbnail_width;
        let size = egui::vec2(width, width * photo.height as f32 / photo.width as f32);
        let (image_rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let image_px = to_pixel(image_rect);

        if response.drag_started() {
            let origin = ui.ctx().input(|i| i.pointer.press_origin());
            if let Some(pos) = origin.or(response.interact_pointer_pos()) {
                self.sidebar.pointer_down(&photo.key, to_point(pos), &image_px);
            }
        }

        let owns_gesture = self.sidebar.gesture().active_key() == Some(photo.key.as_str());
        if owns_gesture {
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if let Some(updated) = self.sidebar.pointer_move(to_point(pos)) {
                        rect = updated;
                    }
                }
            }
            if response.drag_stopped() || !response.contains_pointer() {
                self.sidebar.pointer_up();
            }
        }

        if response.clicked() {
            self.sidebar.select(&photo.key);
        }

        let painter = ui.painter_at(image_rect.expand(8.0));
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let crop_px = transform::to_pixel_rect(&rect, image_px.width, image_px.height)
            .translate(image_px.left, image_px.top);
        draw_crop_overlay(&painter, image_rect, &crop_px);

        delete_button(ui, image_rect, ui.id().with(("delete", &photo.key)))
    }

    fn sidebar_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Photos");
            if ui.button("Upload").clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Image", IMAGE_EXTENSIONS)
                    .pick_files()
                {
                    self.add_files(ctx, paths);
                }
            }
        });

        for err in &self.upload_errors {
            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), err);
        }
        ui.separator();

        if self.sidebar.gallery().is_empty() {
            ui.label(egui::RichText::new("Drop images here or use Upload").weak());
            return;
        }

        let photos = self.sidebar.gallery().photos().to_vec();
        let mut to_delete = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("thumbnails")
                    .num_columns(2)
                    .spacing(egui::vec2(8.0, 8.0))
                    .show(ui, |ui| {
                        for (index, photo) in photos.iter().enumerate() {
                            if self.thumbnail_cell(ui, photo) {
                                to_delete = Some(photo.key.clone());
                            }
                            if index % 2 == 1 {
                                ui.end_row();
                            }
                        }
                    });
            });

        if let Some(key) = to_delete {
            self.delete_photo(&key);
        }
    }

    fn display_panel(&mut self, ui: &mut egui::Ui) {
        if let Some(err) = &self.preview_error {
            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), format!("No preview available: {err}"));
        }

        let Some(view) = &self.shown else {
            ui.centered_and_justified(|ui| {
                if self.pending.is_some() {
                    ui.spinner();
                } else {
                    ui.label("Click an image to view the cropped region at full resolution");
                }
            });
            return;
        };

        let photo = &view.selection.photo;
        let (crop_w, crop_h) = (view.output.width(), view.output.height());
        ui.horizontal(|ui| {
            ui.strong(&photo.alt);
            ui.label(format!("Crop: {crop_w}×{crop_h}px"));
            ui.label(format!("Ratio: {:.3}", crop_w as f64 / crop_h as f64));
            ui.label(format!("Original: {}×{}px", photo.width, photo.height));
            if self.pending.is_some() {
                ui.spinner();
            }
            if ui.button("Save Cropped Image").clicked() {
                save_crop(&view.output, &photo.alt);
            }
        });
        ui.separator();

        const PADDING: f32 = 20.0;
        let available_size = ui.available_size();
        let max_size = available_size - egui::vec2(PADDING * 2.0, PADDING * 2.0);
        let image_size = view.texture.size_vec2();

        // Fit inside the panel without upscaling
        let scale = (max_size.x / image_size.x).min(max_size.y / image_size.y).min(1.0);
        let display_size = image_size * scale.max(0.0);

        let x_offset = (available_size.x - display_size.x) / 2.0;
        let y_offset = (available_size.y - display_size.y) / 2.0;
        let start_pos = ui.cursor().min + egui::vec2(x_offset.max(0.0), y_offset.max(0.0));
        let image_rect = egui::Rect::from_min_size(start_pos, display_size);

        ui.allocate_rect(image_rect, egui::Sense::hover());
        ui.painter().image(
            view.texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}

fn save_crop(output: &CropOutput, stem: &str) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Image", &["jpg", "jpeg", "png", "bmp"])
        .set_file_name(format!("{stem}-crop.jpg"))
        .save_file()
    else {
        return;
    };

    if let Err(e) = write_crop(output, &path) {
        log::error!("Failed to save image: {e}");
    } else {
        log::info!("saved crop to {}", path.display());
    }
}

fn write_crop(output: &CropOutput, path: &Path) -> Result<(), image::ImageError> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        std::fs::write(path, &output.encoded)?;
        Ok(())
    } else {
        output.image.save(path)
    }
}

/// Delete button in the top-left corner of a thumbnail. It only interacts
/// and paints, so the grid cell keeps the single allocation of the thumbnail.
fn delete_button(ui: &egui::Ui, image_rect: egui::Rect, id: egui::Id) -> bool {
    let rect = egui::Rect::from_min_size(image_rect.min + egui::vec2(4.0, 4.0), egui::vec2(22.0, 22.0));
    let response = ui.interact(rect, id, egui::Sense::click());
    let fill = if response.hovered() {
        egui::Color32::from_rgb(185, 28, 28)
    } else {
        egui::Color32::from_rgb(220, 38, 38)
    };
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, fill);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "🗑",
        egui::FontId::proportional(14.0),
        egui::Color32::WHITE,
    );
    response.on_hover_text("Delete image").clicked()
}

fn draw_crop_overlay(painter: &egui::Painter, image_rect: egui::Rect, crop: &PixelRect) {
    let screen_crop_rect = to_screen(crop);
    let overlay_color = egui::Color32::from_black_alpha(150);

    // Top
    painter.rect_filled(
        egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, screen_crop_rect.min.y)),
        0.0,
        overlay_color,
    );
    // Bottom
    painter.rect_filled(
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, screen_crop_rect.max.y), image_rect.max),
        0.0,
        overlay_color,
    );
    // Left
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, screen_crop_rect.min.y),
            egui::pos2(screen_crop_rect.min.x, screen_crop_rect.max.y),
        ),
        0.0,
        overlay_color,
    );
    // Right
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(screen_crop_rect.max.x, screen_crop_rect.min.y),
            egui::pos2(image_rect.max.x, screen_crop_rect.max.y),
        ),
        0.0,
        overlay_color,
    );

    painter.rect_filled(screen_crop_rect, 2.0, egui::Color32::from_white_alpha(25));
    painter.rect_stroke(screen_crop_rect, 2.0, egui::Stroke::new(2.0, egui::Color32::WHITE));

    let handle_stroke = egui::Stroke::new(1.0, egui::Color32::DARK_GRAY);
    let handle_fill = egui::Color32::WHITE;
    for handle in ResizeHandle::RESIZE {
        let pos = handle.anchor_point(crop);
        let center = egui::pos2(pos.x as f32, pos.y as f32);
        if handle.is_corner() {
            // 9x12 keeps the handle itself at 3:4
            let rect = egui::Rect::from_center_size(center, egui::vec2(9.0, 12.0));
            painter.rect_filled(rect, 1.0, handle_fill);
            painter.rect_stroke(rect, 1.0, handle_stroke);
        } else {
            painter.circle(center, 4.0, handle_fill, handle_stroke);
        }
    }
}

impl eframe::App for CropSidebarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_files(ctx, dropped);
        }

        self.pump_preview(ctx);

        let sidebar_width = self.config.thumbnail_width * 2.0 + 40.0;
        egui::SidePanel::left("photo_sidebar")
            .resizable(true)
            .default_width(sidebar_width)
            .min_width(self.config.thumbnail_width + 24.0)
            .show(ctx, |ui| self.sidebar_panel(ctx, ui));

        egui::CentralPanel::default().show(ctx, |ui| self.display_panel(ui));
    }
}
