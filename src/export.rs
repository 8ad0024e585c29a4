//! Client-deliverable exports: the CSV inventory and the liability text
//! document.
//!
//! Both layouts are a user-facing contract. The CSV header row and the
//! liability document's section banners, item lines, legal paragraph, and
//! signature lines must stay byte-compatible with previously downloaded
//! files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::MoveDetail;

/// CSV header row, in contract order
pub const CSV_HEADERS: [&str; 8] = [
    "Move ID",
    "Box Name",
    "Item Name",
    "Quantity",
    "Weight (LBS)",
    "Type",
    "Description",
    "Timestamp",
];

/// Write the inventory CSV for a move: one row per item, boxes in order
pub fn write_inventory_csv<W: Write>(detail: &MoveDetail, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;

    for box_detail in &detail.boxes {
        for item in &box_detail.items {
            csv_writer.write_record([
                detail.move_record.id.clone(),
                box_detail.box_record.name.clone(),
                item.name.clone(),
                item.quantity.to_string(),
                item.weight.unwrap_or(0.0).to_string(),
                item.count_type.to_string(),
                item.description.clone(),
                item.created_at.to_rfc3339(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the inventory CSV to a string
pub fn inventory_csv_string(detail: &MoveDetail) -> Result<String> {
    let mut buf = Vec::new();
    write_inventory_csv(detail, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::error::BoxguardError::Other(e.to_string()))
}

/// Render the plain-text liability document for a move
#[must_use]
pub fn liability_document(detail: &MoveDetail, generated_at: DateTime<Utc>) -> String {
    let mut doc = String::new();
    doc.push_str("BOXGUARD - LEGALLY BINDING INVENTORY DOCUMENT\n");
    doc.push_str(&format!("Generated: {}\n", generated_at.to_rfc3339()));
    doc.push_str("==============================================\n\n");
    doc.push_str(&format!("MOVE ID: {}\n", detail.move_record.id));
    doc.push_str(&format!("STATUS: {}\n", detail.move_record.status));
    doc.push_str(&format!("USER ID: {}\n\n", detail.move_record.customer_id));
    doc.push_str("INVENTORY SUMMARY:\n");
    doc.push_str("----------------------------------------------\n");

    for (box_idx, box_detail) in detail.boxes.iter().enumerate() {
        doc.push_str(&format!(
            "BOX #{}: {} ({})\n",
            box_idx + 1,
            box_detail.box_record.name,
            box_detail.box_record.id
        ));
        for item in &box_detail.items {
            let description = if item.description.is_empty() {
                "N/A"
            } else {
                item.description.as_str()
            };
            doc.push_str(&format!(
                "  - [{}] {} | Qty: {} | Weight: {} lbs | {}\n",
                item.count_type,
                item.name,
                item.quantity,
                item.weight.unwrap_or(0.0),
                description
            ));
        }
        doc.push('\n');
    }

    doc.push_str("\nLEGAL ACKNOWLEDGMENT:\n");
    doc.push_str(
        "By signing below, both parties acknowledge that the photos and data recorded in this \
         move file are the primary evidence for any insurance claims. All counts marked 'EXACT' \
         are verified by visual inspection. Counts marked 'BROKEN' or 'OTHER' are approximations.\n\n",
    );
    doc.push_str("CUSTOMER SIGNATURE: __________________________  DATE: _________\n");
    doc.push_str("CARRIER SIGNATURE:  __________________________  DATE: _________\n");

    doc
}

/// Write both export artifacts for a move into the output directory,
/// returning the created file paths.
pub fn export_move(detail: &MoveDetail, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let short_id: String = detail.move_record.id.chars().take(8).collect();

    let csv_path = output_dir.join(format!("Move_Inventory_{short_id}.csv"));
    let file = File::create(&csv_path)?;
    write_inventory_csv(detail, BufWriter::new(file))?;

    let txt_path = output_dir.join(format!("Liability_Doc_Move_{short_id}.txt"));
    fs::write(&txt_path, liability_document(detail, Utc::now()))?;

    info!(
        move_id = %detail.move_record.id,
        csv = %csv_path.display(),
        txt = %txt_path.display(),
        "Move exported"
    );
    Ok(vec![csv_path, txt_path])
}
