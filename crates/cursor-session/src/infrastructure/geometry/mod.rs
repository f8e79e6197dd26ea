//! Element geometry: where the target element is and how big it is.
//!
//! # Offset parents (for beginners)
//!
//! In a page layout an element's position is stored *relative to its offset
//! parent*, the nearest positioned ancestor.  To get the absolute position you
//! walk up the chain and add every offset along the way:
//!
//! ```text
//! page
//!  └─ panel      offset (100, 40)
//!      └─ canvas offset ( 20, 10)   → absolute (120, 50)
//! ```
//!
//! The width and height come from the element itself.  [`LayoutTree`] keeps
//! such a tree in memory and answers [`GeometryProvider::bounding_rect`] by
//! walking the chain.  A malformed tree whose parents form a cycle stops the
//! walk after every element has been visited once.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use cursor_core::TargetRect;

/// Opaque identifier of a UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Source of element rectangles, in the same coordinate space as pointer
/// samples.
#[cfg_attr(test, mockall::automock)]
pub trait GeometryProvider: Send + Sync {
    /// Returns the absolute rectangle of `element`, or `None` if the element
    /// is unknown (removed from the page, never inserted).
    fn bounding_rect(&self, element: &ElementHandle) -> Option<TargetRect>;
}

/// Layout box of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    /// Horizontal offset from the offset parent's origin.
    pub offset_left: f64,
    /// Vertical offset from the offset parent's origin.
    pub offset_top: f64,
    pub width: f64,
    pub height: f64,
    /// `None` for elements positioned directly on the page.
    pub offset_parent: Option<ElementHandle>,
}

impl ElementBox {
    pub fn new(offset_left: f64, offset_top: f64, width: f64, height: f64) -> Self {
        Self {
            offset_left,
            offset_top,
            width,
            height,
            offset_parent: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<ElementHandle>) -> Self {
        self.offset_parent = Some(parent.into());
        self
    }
}

/// In-memory element tree implementing [`GeometryProvider`].
///
/// Reads and writes may come from different tasks; the tree sits behind a
/// read-write lock.
#[derive(Default)]
pub struct LayoutTree {
    boxes: RwLock<HashMap<ElementHandle, ElementBox>>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the box for `element`.
    pub fn insert(&self, element: impl Into<ElementHandle>, layout: ElementBox) {
        self.boxes.write().insert(element.into(), layout);
    }

    pub fn remove(&self, element: &ElementHandle) -> Option<ElementBox> {
        self.boxes.write().remove(element)
    }

    /// Changes the size of `element`.  Returns `false` if it is unknown.
    pub fn resize(&self, element: &ElementHandle, width: f64, height: f64) -> bool {
        match self.boxes.write().get_mut(element) {
            Some(layout) => {
                layout.width = width;
                layout.height = height;
                true
            }
            None => false,
        }
    }

    /// Moves `element` within its offset parent.  Returns `false` if it is
    /// unknown.
    pub fn move_to(&self, element: &ElementHandle, offset_left: f64, offset_top: f64) -> bool {
        match self.boxes.write().get_mut(element) {
            Some(layout) => {
                layout.offset_left = offset_left;
                layout.offset_top = offset_top;
                true
            }
            None => false,
        }
    }
}

impl GeometryProvider for LayoutTree {
    fn bounding_rect(&self, element: &ElementHandle) -> Option<TargetRect> {
        let boxes = self.boxes.read();
        let own = boxes.get(element)?;

        let (mut x, mut y) = (0.0, 0.0);
        let mut visited = HashSet::new();
        let mut cursor = Some(element);
        while let Some(handle) = cursor {
            if !visited.insert(handle) {
                break;
            }
            // A parent missing from the tree ends the chain at the page.
            let Some(layout) = boxes.get(handle) else {
                break;
            };
            x += layout.offset_left;
            y += layout.offset_top;
            cursor = layout.offset_parent.as_ref();
        }

        Some(TargetRect::new(x, y, own.width, own.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: &str) -> ElementHandle {
        ElementHandle::new(id)
    }

    #[test]
    fn test_top_level_element_rect_is_its_own_box() {
        let tree = LayoutTree::new();
        tree.insert("canvas", ElementBox::new(8.0, 8.0, 200.0, 150.0));
        assert_eq!(
            tree.bounding_rect(&handle("canvas")),
            Some(TargetRect::new(8.0, 8.0, 200.0, 150.0))
        );
    }

    #[test]
    fn test_offsets_accumulate_up_the_parent_chain() {
        // Arrange
        let tree = LayoutTree::new();
        tree.insert("page", ElementBox::new(0.0, 0.0, 1280.0, 720.0));
        tree.insert("panel", ElementBox::new(100.0, 40.0, 600.0, 400.0).with_parent("page"));
        tree.insert("canvas", ElementBox::new(20.0, 10.0, 300.0, 300.0).with_parent("panel"));

        // Act
        let rect = tree.bounding_rect(&handle("canvas"));

        // Assert – size comes from the element itself
        assert_eq!(rect, Some(TargetRect::new(120.0, 50.0, 300.0, 300.0)));
    }

    #[test]
    fn test_unknown_element_has_no_rect() {
        let tree = LayoutTree::new();
        assert_eq!(tree.bounding_rect(&handle("ghost")), None);
    }

    #[test]
    fn test_missing_parent_ends_chain() {
        let tree = LayoutTree::new();
        tree.insert("canvas", ElementBox::new(5.0, 6.0, 10.0, 10.0).with_parent("detached"));
        assert_eq!(
            tree.bounding_rect(&handle("canvas")),
            Some(TargetRect::new(5.0, 6.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_parent_cycle_terminates() {
        // Arrange – a and b are each other's offset parent
        let tree = LayoutTree::new();
        tree.insert("a", ElementBox::new(1.0, 1.0, 10.0, 10.0).with_parent("b"));
        tree.insert("b", ElementBox::new(2.0, 2.0, 10.0, 10.0).with_parent("a"));

        // Act
        let rect = tree.bounding_rect(&handle("a"));

        // Assert – each element counted once
        assert_eq!(rect, Some(TargetRect::new(3.0, 3.0, 10.0, 10.0)));
    }

    #[test]
    fn test_resize_and_move_update_rect() {
        // Arrange
        let tree = LayoutTree::new();
        tree.insert("canvas", ElementBox::new(0.0, 0.0, 100.0, 100.0));

        // Act
        let resized = tree.resize(&handle("canvas"), 400.0, 300.0);
        let moved = tree.move_to(&handle("canvas"), 12.0, 34.0);

        // Assert
        assert!(resized && moved);
        assert_eq!(
            tree.bounding_rect(&handle("canvas")),
            Some(TargetRect::new(12.0, 34.0, 400.0, 300.0))
        );
    }

    #[test]
    fn test_resize_unknown_element_returns_false() {
        let tree = LayoutTree::new();
        assert!(!tree.resize(&handle("ghost"), 1.0, 1.0));
        assert!(!tree.move_to(&handle("ghost"), 1.0, 1.0));
    }

    #[test]
    fn test_removed_element_has_no_rect() {
        let tree = LayoutTree::new();
        tree.insert("canvas", ElementBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(tree.remove(&handle("canvas")).is_some());
        assert_eq!(tree.bounding_rect(&handle("canvas")), None);
    }
}
