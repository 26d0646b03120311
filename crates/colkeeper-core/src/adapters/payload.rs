//! Column payload carried by the host's custom elements.

use colkeeper_dom::{NodeId, Page};
use colkeeper_protocols::{ColumnDescriptor, columns_from_value};
use serde_json::Value;

use super::{AdapterError, AdapterKind, TableAdapter};
use crate::locator::PAYLOAD_ATTRIBUTE;

/// Live object property mirroring the payload attribute.
pub const PAYLOAD_PROPERTY: &str = "payloadColumns";

/// Reads the payload property or attribute; rewrites an existing attribute
/// and mirrors the property.
pub struct PayloadAdapter;

impl TableAdapter for PayloadAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Payload
    }

    fn extract_columns(&self, page: &Page, element: NodeId) -> Option<Vec<ColumnDescriptor>> {
        let document = page.read();

        // Cloned out of the document, so callers never share the live value.
        let from_property = document
            .property(element, PAYLOAD_PROPERTY)
            .filter(|value| value.is_array())
            .and_then(columns_from_value)
            .filter(|columns| !columns.is_empty());
        if from_property.is_some() {
            return from_property;
        }

        let text = document.attribute(element, PAYLOAD_ATTRIBUTE)?;
        let parsed: Value = serde_json::from_str(text).ok()?;
        columns_from_value(&parsed)
    }

    fn apply_columns(
        &self,
        page: &Page,
        element: NodeId,
        target: &[ColumnDescriptor],
    ) -> Result<(), AdapterError> {
        let value = serde_json::to_value(target)?;
        let json = serde_json::to_string(&value)?;

        page.update(|document| {
            // Only the attribute defines the element; never create it.
            let Some(current) = document.attribute(element, PAYLOAD_ATTRIBUTE) else {
                return Err(AdapterError::NotApplicable);
            };
            if current == json {
                return Err(AdapterError::Unchanged);
            }
            let has_property = document.property(element, PAYLOAD_PROPERTY).is_some();

            document.set_attribute(element, PAYLOAD_ATTRIBUTE, &json)?;
            if has_property {
                document.set_property(element, PAYLOAD_PROPERTY, value)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
