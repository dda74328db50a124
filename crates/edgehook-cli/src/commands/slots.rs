//! `edgehook slots`: the interception topology.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use edgehook_engine::SlotName;

#[derive(Debug, Serialize, Tabled)]
struct SlotRow {
    #[tabled(rename = "Binding")]
    binding: SlotName,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Wrapped")]
    wrapped: &'static str,
}

/// Execute the slots command
pub fn execute(format: OutputFormat) {
    let rows: Vec<SlotRow> = SlotName::ALL
        .into_iter()
        .map(|slot| SlotRow {
            binding: slot,
            kind: if slot.is_async() { "async" } else { "sync" },
            wrapped: match slot {
                SlotName::FetchListener | SlotName::RespondWith => "on discovery",
                _ => "at install",
            },
        })
        .collect();
    output::print_list(&rows, "No interception slots.", format);
}
