use egui_extras::{Column, TableBuilder};

pub fn display_table(ui: &mut egui::Ui, header: &[String], rows: &[&Vec<String>]) {
    let nr_cols = header.len();

    TableBuilder::new(ui)
        .columns(Column::auto().clip(true), nr_cols)
        .striped(true)
        .resizable(true)
        .header(20.0, |mut head| {
            for name in header {
                head.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut table_row| {
                    for cell in row.iter() {
                        table_row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}

/// Size in kilobytes with one decimal, e.g. `12.3KB`.
pub fn format_file_size(bytes: usize) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}
