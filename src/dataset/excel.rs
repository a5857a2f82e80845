use super::{Cell, DatasetRow};
use crate::Result;
use rust_xlsxwriter::{DocProperties, Format, Workbook};
use std::io::Write;

const SHEET_NAME: &str = "Repositories";

#[expect(unused_results, reason = "rust_xlsxwriter methods return &mut Worksheet for chaining")]
pub fn generate<R: DatasetRow, W: Write>(rows: &[R], writer: &mut W) -> Result<()> {
    let mut workbook = Workbook::new();

    let properties = DocProperties::new().set_author("repo-census");
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;
    let bold_format = Format::new().set_bold();

    for (col, name) in R::COLUMNS.iter().enumerate() {
        #[expect(clippy::cast_possible_truncation, reason = "Column count is a small compile-time constant")]
        worksheet.write_string_with_format(0, col as u16, *name, &bold_format)?;
    }

    worksheet.set_freeze_panes(1, 0)?;

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)?;
        for (col, cell) in row.cells().iter().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "Column count is a small compile-time constant")]
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, *s)?;
                }
                Cell::Owned(s) => {
                    worksheet.write_string(row_num, col, s.as_str())?;
                }
                #[expect(clippy::cast_precision_loss, reason = "Intentional conversion to f64 for Excel output")]
                Cell::Count(n) => {
                    worksheet.write_number(row_num, col, *n as f64)?;
                }
            }
        }
    }

    worksheet.autofit();

    let data = workbook.save_to_buffer()?;
    writer.write_all(&data)?;

    Ok(())
}
