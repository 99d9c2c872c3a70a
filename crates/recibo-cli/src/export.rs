//! Rendering of receipt records as JSON, CSV rows and text summaries.

use recibo_core::{ExportConfig, ReceiptRecord};

/// Column names in export order.
pub fn csv_header(export: &ExportConfig) -> Vec<&'static str> {
    let mut header = vec!["date", "vendor", "total", "items"];
    if export.include_raw_text {
        header.push("raw_text");
    }
    if export.include_validation {
        header.extend(["is_valid", "missing_fields"]);
    }
    header
}

/// One CSV row matching [`csv_header`].
pub fn csv_row(record: &ReceiptRecord, export: &ExportConfig) -> Vec<String> {
    let [date, vendor, total, items, raw_text] = record.export_row();
    let mut row: Vec<String> = [date, vendor, total, items]
        .into_iter()
        .map(str::to_string)
        .collect();

    if export.include_raw_text {
        row.push(raw_text.to_string());
    }
    if export.include_validation {
        row.push(record.is_valid().to_string());
        row.push(missing_list(record));
    }
    row
}

/// Records as a CSV document with header.
pub fn records_to_csv<'a>(
    records: impl IntoIterator<Item = &'a ReceiptRecord>,
    export: &ExportConfig,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(csv_header(export))?;
    for record in records {
        wtr.write_record(csv_row(record, export))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Human-readable summary of one record.
pub fn record_to_text(record: &ReceiptRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Date:    {}\n", record.date().unwrap_or("-")));
    output.push_str(&format!("Vendor:  {}\n", record.vendor()));
    output.push_str(&format!("Total:   {}\n", record.total()));
    output.push_str(&format!(
        "Valid:   {}\n",
        if record.is_valid() { "yes" } else { "no" }
    ));
    if !record.is_valid() {
        output.push_str(&format!("Missing: {}\n", missing_list(record)));
    }

    output.push_str("\nItems:\n");
    for line in record.items().lines() {
        output.push_str(&format!("  {}\n", line));
    }

    output
}

fn missing_list(record: &ReceiptRecord) -> String {
    record
        .missing_fields()
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(";")
}
