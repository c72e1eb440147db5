//! Text and JSON renderings of a snapshot.

use std::fs;
use std::path::Path;

use comfy_table::{presets::UTF8_FULL, Table};

use crate::error::Result;
use crate::snapshot::TopologySnapshot;

/// Per-hub tables of attached devices.
pub fn render_table(snapshot: &TopologySnapshot) -> String {
    if snapshot.is_empty() {
        let mut out = String::from("No USB devices found.\n");
        push_notes(snapshot, &mut out);
        return out;
    }

    let mut out = String::new();
    for (hub_index, records) in snapshot.hub_groups() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(["Port", "Description", "Speed", "VID", "PID", "Type"]);
        for record in records {
            table.add_row([
                record.port_number.to_string(),
                record.description.clone(),
                record.speed.label().to_string(),
                format!("0x{:04X}", record.vendor_id),
                format!("0x{:04X}", record.product_id),
                if record.is_hub { "Hub (cascaded)" } else { "Device" }.to_string(),
            ]);
        }
        out.push_str(&format!("[HUB {}]\n{}\n", hub_index, table));
    }
    push_notes(snapshot, &mut out);
    out
}

fn push_notes(snapshot: &TopologySnapshot, out: &mut String) {
    if snapshot.is_truncated() {
        out.push_str(&format!(
            "Note: stopped at {} records; raise the capacity to see the rest.\n",
            snapshot.count()
        ));
    }
    for skipped in snapshot.skipped() {
        match skipped.port_number {
            Some(port) => out.push_str(&format!(
                "Skipped hub {} port {}: {}\n",
                skipped.hub_index, port, skipped.error
            )),
            None => out.push_str(&format!("Skipped hub {}: {}\n", skipped.hub_index, skipped.error)),
        }
    }
}

/// Pretty JSON array of the snapshot's records.
pub fn to_json(snapshot: &TopologySnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot.records())?)
}

pub fn save_json(snapshot: &TopologySnapshot, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, to_json(snapshot)?)?;
    Ok(())
}
