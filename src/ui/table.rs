use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CustomerRecord, Dataset};
use crate::data::view::ViewModel;

const ROW_HEIGHT: f32 = 18.0;
const TABLE_HEIGHT: f32 = 280.0;

/// Filtered customer rows with every column of the source sheet.
pub fn customer_table(ui: &mut Ui, dataset: &Dataset, view: &ViewModel) {
    let columns = &dataset.customer_columns;
    let rows: Vec<&CustomerRecord> = view.filtered_customers(dataset).collect();
    ui.label(format!("{} of {} rows", rows.len(), dataset.len()));

    egui::ScrollArea::horizontal()
        .id_salt("customer_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(TABLE_HEIGHT)
                .columns(Column::auto().at_least(60.0).resizable(true), columns.len())
                .header(ROW_HEIGHT, |mut header| {
                    for col in columns {
                        header.col(|ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let customer = rows[row.index()];
                        for col in columns {
                            row.col(|ui| {
                                ui.label(customer.cell(col).to_string());
                            });
                        }
                    });
                });
        });
}
