//! Grid-library instances bound to elements.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

/// Error thrown by a grid-library call.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid operation not supported: {0}")]
    Unsupported(String),

    #[error("Grid rejected columns: {0}")]
    Rejected(String),
}

/// Per-column accessor object exposed by some grid libraries.
pub trait GridColumn: Send + Sync {
    fn field(&self) -> Option<String>;

    fn title(&self) -> Option<String>;

    fn is_visible(&self) -> bool {
        true
    }
}

/// A grid-library instance attached to a table element.
///
/// Libraries differ in what they expose: some hand out the raw column
/// definitions, others only per-column objects. Both accessors are optional.
pub trait GridInstance: Send + Sync {
    /// Raw column definitions, if the library exposes them.
    fn column_definitions(&self) -> Option<Vec<Value>> {
        None
    }

    /// Per-column accessor objects, if the library exposes them.
    fn columns(&self) -> Option<Vec<Arc<dyn GridColumn>>> {
        None
    }

    /// Replace the column set.
    fn set_columns(&self, columns: Vec<Value>) -> Result<(), GridError>;

    /// Redraw after a column change. No-op for libraries without one.
    fn redraw(&self) -> Result<(), GridError> {
        Ok(())
    }
}

/// Which accessor an [`InMemoryGrid`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Definitions,
    ColumnObjects,
}

/// Grid instance holding its column definitions in memory.
pub struct InMemoryGrid {
    access: Access,
    definitions: Mutex<Vec<Value>>,
    reject_with: Option<String>,
    set_calls: Mutex<usize>,
    redraws: Mutex<usize>,
}

impl InMemoryGrid {
    /// Grid exposing [`GridInstance::column_definitions`].
    pub fn with_definitions(definitions: Vec<Value>) -> Self {
        Self::new(Access::Definitions, definitions)
    }

    /// Grid exposing only [`GridInstance::columns`].
    pub fn with_column_objects(definitions: Vec<Value>) -> Self {
        Self::new(Access::ColumnObjects, definitions)
    }

    fn new(access: Access, definitions: Vec<Value>) -> Self {
        Self {
            access,
            definitions: Mutex::new(definitions),
            reject_with: None,
            set_calls: Mutex::new(0),
            redraws: Mutex::new(0),
        }
    }

    /// Make every `set_columns` call fail.
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.reject_with = Some(reason.into());
        self
    }

    pub fn definitions(&self) -> Vec<Value> {
        self.definitions.lock().clone()
    }

    pub fn fields(&self) -> Vec<String> {
        self.definitions
            .lock()
            .iter()
            .filter_map(|d| d.get("field").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn set_calls(&self) -> usize {
        *self.set_calls.lock()
    }

    pub fn redraws(&self) -> usize {
        *self.redraws.lock()
    }
}

impl GridInstance for InMemoryGrid {
    fn column_definitions(&self) -> Option<Vec<Value>> {
        (self.access == Access::Definitions).then(|| self.definitions())
    }

    fn columns(&self) -> Option<Vec<Arc<dyn GridColumn>>> {
        if self.access != Access::ColumnObjects {
            return None;
        }
        let columns = self
            .definitions
            .lock()
            .iter()
            .map(|d| Arc::new(InMemoryColumn::from_definition(d)) as Arc<dyn GridColumn>)
            .collect();
        Some(columns)
    }

    fn set_columns(&self, columns: Vec<Value>) -> Result<(), GridError> {
        *self.set_calls.lock() += 1;
        if let Some(reason) = &self.reject_with {
            return Err(GridError::Rejected(reason.clone()));
        }
        *self.definitions.lock() = columns;
        Ok(())
    }

    fn redraw(&self) -> Result<(), GridError> {
        *self.redraws.lock() += 1;
        Ok(())
    }
}

/// Column accessor backed by a definition snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryColumn {
    field: Option<String>,
    title: Option<String>,
    visible: bool,
}

impl InMemoryColumn {
    pub fn from_definition(definition: &Value) -> Self {
        let text = |key: &str| definition.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            field: text("field"),
            title: text("title"),
            visible: definition.get("visible").and_then(Value::as_bool) != Some(false),
        }
    }
}

impl GridColumn for InMemoryColumn {
    fn field(&self) -> Option<String> {
        self.field.clone()
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
