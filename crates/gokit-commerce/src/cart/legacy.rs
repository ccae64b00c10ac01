//! Repair of cart items written by older storefront code.
//!
//! Older pages stored items without an `id`, with quantities and prices as
//! strings, and with numeric shirt numbers. Those items are fixed up in
//! place so every item stays addressable by id. The usage ledger is repaired
//! entry by entry so one bad count never discards the others.

use crate::cart::{LineItem, UsageLedger};
use crate::ids::LineItemId;
use serde_json::{Map, Value};

/// Turn the stored JSON array into line items.
///
/// Returns the items and the number of entries that had to be repaired or
/// dropped; a non-zero count means the caller should write the result back.
pub(crate) fn repair_items(raw: Vec<Value>) -> (Vec<LineItem>, usize) {
    let mut repaired = 0;
    let mut items = Vec::with_capacity(raw.len());

    for value in raw {
        let Value::Object(mut entry) = value else {
            tracing::warn!("dropping non-object cart entry");
            repaired += 1;
            continue;
        };

        let changed = repair_entry(&mut entry);
        match serde_json::from_value::<LineItem>(Value::Object(entry)) {
            Ok(item) => {
                if changed {
                    repaired += 1;
                }
                items.push(item);
            }
            Err(error) => {
                tracing::warn!(%error, "dropping unreadable cart entry");
                repaired += 1;
            }
        }
    }

    (items, repaired)
}

fn repair_entry(entry: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    if entry.get("id").map_or(true, Value::is_null) {
        let id = LineItemId::generate();
        tracing::debug!(%id, "assigning id to legacy cart item");
        entry.insert("id".to_string(), Value::String(id.into_inner()));
        changed = true;
    }

    let quantity = entry.get("quantity").and_then(as_number).map(f64::trunc);
    match quantity {
        Some(q)
            if q >= 1.0
                && q <= f64::from(u32::MAX)
                && entry.get("quantity").is_some_and(Value::is_u64) => {}
        Some(q) if q >= 1.0 => {
            entry.insert("quantity".to_string(), Value::from(q.min(f64::from(u32::MAX)) as u32));
            changed = true;
        }
        _ => {
            entry.insert("quantity".to_string(), Value::from(1u32));
            changed = true;
        }
    }

    let price = entry
        .get("price")
        .and_then(as_number)
        .filter(|p| *p >= 0.0);
    match price {
        Some(_) if entry.get("price").is_some_and(Value::is_number) => {}
        Some(p) => {
            entry.insert("price".to_string(), Value::from(p));
            changed = true;
        }
        None => {
            tracing::debug!(price = ?entry.get("price"), "resetting unusable cart item price");
            entry.insert("price".to_string(), Value::from(0.0));
            changed = true;
        }
    }

    for key in ["playerName", "playerNumber", "customizationStyle"] {
        if let Some(Value::Number(n)) = entry.get(key) {
            let text = n.to_string();
            entry.insert(key.to_string(), Value::String(text));
            changed = true;
        }
    }

    if entry.get("patches").is_some_and(|p| !p.is_array()) {
        entry.remove("patches");
        changed = true;
    }

    changed
}

/// Turn the stored `usedCodes` object into a ledger.
///
/// Counts stored as strings are parsed and fractional counts rounded up.
/// Entries that are not a non-negative number are dropped. Returns the
/// ledger and the number of entries that were repaired or dropped.
pub(crate) fn repair_ledger(raw: Map<String, Value>) -> (UsageLedger, usize) {
    let mut repaired = 0;
    let mut counts = Vec::with_capacity(raw.len());

    for (code, value) in raw {
        if let Some(count) = value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            counts.push((code, count));
            continue;
        }

        repaired += 1;
        match as_number(&value).filter(|n| *n >= 0.0) {
            Some(n) => counts.push((code, n.ceil().min(f64::from(u32::MAX)) as u32)),
            None => tracing::warn!(%code, "dropping unreadable discount usage count"),
        }
    }

    (counts.into_iter().collect(), repaired)
}

/// Read a number the way the old pages did: numbers as-is, numeric strings
/// parsed.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
