//! Widget Repository
//!
//! In-memory storage for the demo widget resource. Doubles as the
//! representation source the content-hash token generator reads from.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{RepresentationSource, ResourceIdentity};
use crate::error::{ApiError, GenerationError, Result};
use crate::models::{Widget, WidgetRequest};

/// Path of the widget collection resource
pub const WIDGETS_PATH: &str = "/widgets";

/// Parses a widget id in canonical decimal form.
///
/// Leading zeros, signs and anything else `u64::from_str` would also accept
/// are rejected, so each widget has exactly one URI.
pub fn parse_widget_id(raw: &str) -> Option<u64> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));
    if canonical {
        raw.parse().ok()
    } else {
        None
    }
}

// == Widget Repository ==
/// Widgets keyed by id, kept in id order.
#[derive(Debug)]
pub struct WidgetRepository {
    widgets: RwLock<BTreeMap<u64, Widget>>,
    next_id: AtomicU64,
}

impl Default for WidgetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRepository {
    pub fn new() -> Self {
        Self {
            widgets: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // == Queries ==
    /// Returns all widgets ordered by id.
    pub fn list(&self) -> Result<Vec<Widget>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Returns a single widget.
    pub fn get(&self, id: u64) -> Result<Widget> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Widget {} not found", id)))
    }

    // == Commands ==
    /// Stores a new widget under a fresh id.
    pub fn create(&self, req: WidgetRequest) -> Result<Widget> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let widget = Widget {
            id,
            name: req.name,
            quantity: req.quantity,
        };
        self.write()?.insert(id, widget.clone());
        Ok(widget)
    }

    /// Replaces an existing widget.
    pub fn update(&self, id: u64, req: WidgetRequest) -> Result<Widget> {
        let mut widgets = self.write()?;
        let widget = widgets
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Widget {} not found", id)))?;
        widget.name = req.name;
        widget.quantity = req.quantity;
        Ok(widget.clone())
    }

    /// Removes a widget.
    pub fn delete(&self, id: u64) -> Result<()> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("Widget {} not found", id)))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, Widget>>> {
        self.widgets
            .read()
            .map_err(|_| ApiError::Internal("Widget store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, Widget>>> {
        self.widgets
            .write()
            .map_err(|_| ApiError::Internal("Widget store lock poisoned".to_string()))
    }
}

// == Representation Source ==
impl RepresentationSource for WidgetRepository {
    /// Serializes `/widgets` as the full list and `/widgets/{id}` as one widget,
    /// byte-for-byte as the handlers render them.
    fn representation(&self, id: &ResourceIdentity) -> std::result::Result<Vec<u8>, GenerationError> {
        let path = id.path();
        let encoded = if path == WIDGETS_PATH {
            self.list().map(|widgets| serde_json::to_vec(&widgets))
        } else {
            let widget_id = path
                .strip_prefix(WIDGETS_PATH)
                .and_then(|rest| rest.strip_prefix('/'))
                .and_then(parse_widget_id)
                .ok_or_else(|| GenerationError::Unavailable(id.clone()))?;
            self.get(widget_id).map(|widget| serde_json::to_vec(&widget))
        };

        match encoded {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(err)) => Err(GenerationError::Read {
                identity: id.clone(),
                reason: err.to_string(),
            }),
            Err(ApiError::NotFound(_)) => Err(GenerationError::Unavailable(id.clone())),
            Err(err) => Err(GenerationError::Read {
                identity: id.clone(),
                reason: err.to_string(),
            }),
        }
    }
}
