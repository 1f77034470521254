use crate::error::{DashboardError, Result};
use crate::record::RateSummary;

/// Render summaries as CSV
///
/// Writes a `key,answered,total,rate` header followed by one row per summary.
/// Rates are printed with two decimals; an undefined rate leaves the cell empty.
/// Keys containing commas, quotes or newlines are quoted.
///
/// # Examples
/// ```
/// use calltrack::export::to_csv;
/// use calltrack::record::RateSummary;
///
/// let rows = vec![RateSummary { key: "2025-01".into(), answered: 1, total: 4, rate: Some(25.0) }];
/// assert_eq!(to_csv(&rows), "key,answered,total,rate\n2025-01,1,4,25.00\n");
/// ```
pub fn to_csv(summaries: &[RateSummary]) -> String {
    let mut csv_content = String::from("key,answered,total,rate\n");

    for summary in summaries {
        csv_content.push_str(&escape_field(&summary.key));
        csv_content.push(',');
        csv_content.push_str(&summary.answered.to_string());
        csv_content.push(',');
        csv_content.push_str(&summary.total.to_string());
        csv_content.push(',');
        if let Some(rate) = summary.rate {
            csv_content.push_str(&format!("{:.2}", rate));
        }
        csv_content.push('\n');
    }

    csv_content
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render summaries as an XLSX workbook
///
/// Same table as [`to_csv`], with rates written as numbers and undefined rates
/// left blank.
#[cfg(feature = "web")]
pub fn to_xlsx(summaries: &[RateSummary]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (col, title) in ["key", "answered", "total", "rate"].iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *title)
            .map_err(xlsx_error)?;
    }

    for (index, summary) in summaries.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_string(row, 0, &summary.key).map_err(xlsx_error)?;
        worksheet
            .write_number(row, 1, summary.answered as f64)
            .map_err(xlsx_error)?;
        worksheet
            .write_number(row, 2, summary.total as f64)
            .map_err(xlsx_error)?;
        if let Some(rate) = summary.rate {
            worksheet.write_number(row, 3, rate).map_err(xlsx_error)?;
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(feature = "web")]
fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> DashboardError {
    DashboardError::Export(e.to_string())
}

/// Writes the CSV rendering to `path`.
pub fn write_csv(summaries: &[RateSummary], path: impl AsRef<std::path::Path>) -> Result<()> {
    std::fs::write(path, to_csv(summaries)).map_err(DashboardError::from)
}
