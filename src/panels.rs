//! egui rendering for the dashboard.
//!
//! Every frame is drawn from `Dashboard` state. Clicks are collected while
//! drawing and applied afterwards, so the controller is never borrowed by
//! the UI while it changes.

use crate::client::UploadFile;
use crate::dashboard::{Dashboard, DropdownClick};
use crate::error::{DashError, Result};
use crate::export::{pick_export_path, ExportFormat};
use crate::status::StatusMessage;
use crate::utils::format_file_size;
use egui::{ComboBox, Frame, ProgressBar, RichText, ScrollArea, TextEdit};
use std::time::Instant;

fn load_dropped(file: egui::DroppedFile) -> Result<UploadFile> {
    if let Some(bytes) = file.bytes {
        return Ok(UploadFile {
            name: file.name,
            bytes: bytes.to_vec(),
        });
    }
    match file.path {
        Some(path) => UploadFile::from_path(&path),
        None => Err(DashError::NoFileSelected),
    }
}

impl Dashboard {
    pub fn browse_for_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Data", &["csv", "xlsx", "xls"])
            .pick_file()
        else {
            return;
        };
        match UploadFile::from_path(&path) {
            Ok(file) => self.choose_file(file, Instant::now()),
            Err(err) => self.report(StatusMessage::error(format!(
                "Error uploading file: {}",
                err
            ))),
        }
    }

    pub fn export_with_dialog(&mut self, format: ExportFormat) {
        if self.results.is_none() {
            self.report(StatusMessage::error("No results to export"));
            return;
        }
        if let Some(path) = pick_export_path(format) {
            self.export_to(&path, format);
        }
    }

    /// Only the first of several dropped files is used.
    pub fn handle_file_drop(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.file_hover = hovering;
        if let Some(file) = dropped.into_iter().next() {
            match load_dropped(file) {
                Ok(file) => self.choose_file(file, Instant::now()),
                Err(err) => self.report(StatusMessage::error(format!(
                    "Error uploading file: {}",
                    err
                ))),
            }
        }
    }

    pub fn show_sidebar(&mut self, ctx: &egui::Context) {
        if self.results_fullscreen {
            return;
        }
        if self.sidebar_minimized {
            egui::SidePanel::left("sidebar_min")
                .resizable(false)
                .exact_width(28.0)
                .show(ctx, |ui| {
                    if ui.small_button("»").on_hover_text("Show sidebar").clicked() {
                        self.sidebar_minimized = false;
                    }
                });
            return;
        }
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Upload");
                    if ui.small_button("«").on_hover_text("Hide sidebar").clicked() {
                        self.sidebar_minimized = true;
                    }
                });
                ui.separator();
                self.show_dropzone(ui);
                if let Some(ticker) = &self.progress {
                    ui.add(ProgressBar::new(ticker.fraction()).show_percentage());
                }
                if let Some(info) = &self.upload_info {
                    ui.add_space(10.0);
                    ui.label(RichText::new(&info.file_name).strong());
                    ui.label(format_file_size(info.file_size));
                    ui.label(format!("✔ {}", info.message));
                }
            });
    }

    fn show_dropzone(&mut self, ui: &mut egui::Ui) {
        let mut frame = Frame::group(ui.style());
        if self.file_hover {
            frame = frame.fill(ui.visuals().selection.bg_fill);
        }
        frame.show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label("Drop a file here");
                ui.label("or");
                if ui.button("Browse…").clicked() {
                    self.browse_for_file();
                }
            });
        });
    }

    pub fn show_main(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.message {
                message.show(ui);
            }
            if !self.ready {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label("Upload a data file to start filtering.");
                });
                return;
            }
            if !self.results_fullscreen {
                self.show_dropdown(ui);
                ui.add_space(8.0);
                self.show_filter_blocks(ui);
                ui.add_space(8.0);
                if ui.button("Search").clicked() {
                    self.search();
                }
                ui.separator();
            }
            self.show_results(ui);
        });
    }

    fn show_dropdown(&mut self, ui: &mut egui::Ui) {
        let mut click: Option<DropdownClick> = None;

        let header = Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                let arrow = if self.dropdown_open { "⏶" } else { "⏷" };
                if ui.button(format!("Filter columns {}", arrow)).clicked() {
                    click = Some(DropdownClick::Header);
                }
                if self.selection.selected().is_empty() {
                    ui.weak("No filters selected");
                }
                for column in self.selection.selected() {
                    Frame::none()
                        .fill(ui.visuals().faint_bg_color)
                        .rounding(4.0)
                        .inner_margin(2.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(column);
                                if ui.small_button("x").clicked() {
                                    click = Some(DropdownClick::RemoveTag(column.clone()));
                                }
                            });
                        });
                }
            });
        });
        let mut area = header.response.rect;

        if self.dropdown_open {
            let options = Frame::group(ui.style()).show(ui, |ui| {
                ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                    if self.selection.available().is_empty() {
                        ui.weak("All columns selected");
                    }
                    for column in self.selection.available() {
                        if ui.selectable_label(false, column).clicked() {
                            click = Some(DropdownClick::Option(column.clone()));
                        }
                    }
                });
            });
            area = area.union(options.response.rect);
        }

        let click = click.or_else(|| {
            ui.input(|i| {
                if !i.pointer.any_click() {
                    return None;
                }
                let pos = i.pointer.interact_pos()?;
                Some(if area.contains(pos) {
                    DropdownClick::Inside
                } else {
                    DropdownClick::Outside
                })
            })
        });
        if let Some(click) = click {
            self.dropdown_click(click);
        }
    }

    fn show_filter_blocks(&mut self, ui: &mut egui::Ui) {
        let numeric_max = &self.numeric_max;
        for block in self.blocks.iter_mut() {
            let id = block.column.clone();
            Frame::group(ui.style()).show(ui, |ui| {
                ui.push_id(id, |ui| {
                    block.show(ui, numeric_max.get(&block.column).copied());
                });
            });
        }
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut query = self.results_query.clone();
            let search = ui.add(
                TextEdit::singleline(&mut query)
                    .hint_text("Search results")
                    .desired_width(200.0),
            );
            if search.changed() {
                self.set_results_query(&query);
            }
            let label = if self.results_fullscreen {
                "Exit full screen"
            } else {
                "Fit screen"
            };
            if ui.button(label).clicked() {
                self.results_fullscreen = !self.results_fullscreen;
            }
            ComboBox::from_id_source("export_format")
                .selected_text(self.export_format.label())
                .show_ui(ui, |ui| {
                    for format in ExportFormat::ALL {
                        ui.selectable_value(&mut self.export_format, format, format.label());
                    }
                });
            if ui.button("Download").clicked() {
                self.export_with_dialog(self.export_format);
            }
        });
        ui.add_space(6.0);
        if let Some(table) = &self.results {
            if table.header().is_some() && !self.results_query.is_empty() {
                ui.weak(format!(
                    "{} of {} rows shown",
                    table.visible_count(),
                    table.rows().len()
                ));
            }
            ScrollArea::horizontal().show(ui, |ui| table.show(ui));
        }
    }
}
