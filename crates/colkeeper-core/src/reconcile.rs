//! Saved view vs live columns.

use colkeeper_protocols::{ColumnDescriptor, SavedViewConfig};

/// Target columns for `live` under `saved`.
///
/// Saved fields come first, in saved order. Current-format entries marked
/// not visible are dropped from the working set. Live columns the saved view
/// never mentions follow in live order. Every target column is visible.
pub fn reconcile(live: &[ColumnDescriptor], saved: &SavedViewConfig) -> Vec<ColumnDescriptor> {
    let mut remaining: Vec<Option<&ColumnDescriptor>> = live.iter().map(Some).collect();
    let mut take = |field: &str| {
        remaining
            .iter_mut()
            .find(|slot| slot.is_some_and(|c| c.field.as_deref() == Some(field)))
            .and_then(Option::take)
    };

    let mut target = Vec::with_capacity(live.len());
    for entry in saved.entries() {
        let column = take(&entry.field);
        if entry.visible {
            target.extend(column.map(shown));
        }
    }

    target.extend(remaining.into_iter().flatten().map(shown));
    target
}

/// Whether the displayed live columns already match `target`.
pub fn is_applied(live: &[ColumnDescriptor], target: &[ColumnDescriptor]) -> bool {
    let displayed = live.iter().filter(|c| c.visible).map(|c| c.field.as_deref());
    displayed.eq(target.iter().map(|c| c.field.as_deref()))
}

fn shown(column: &ColumnDescriptor) -> ColumnDescriptor {
    ColumnDescriptor {
        visible: true,
        ..column.clone()
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
