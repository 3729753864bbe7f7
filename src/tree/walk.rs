//! Child-walking helpers shared by every node's default traversal.
//!
//! Each helper returns `Some(new)` only when the visited value differs from the
//! original, so a node can be rebuilt exactly when one of its fields changed and
//! returned as-is otherwise.

use std::sync::Arc;

use crate::error::Result;
use crate::visitor::{ChildVisitor, Cursor};

use super::{Container, JavaType, LeftPadded, Markers, RightPadded, Space, TreeRef};

pub(crate) struct Walker<'v, 'c> {
    visitor: &'v mut dyn ChildVisitor,
    cursor: &'c Cursor,
    changed: bool,
}

impl<'v, 'c> Walker<'v, 'c> {
    pub(crate) fn new(visitor: &'v mut dyn ChildVisitor, cursor: &'c Cursor) -> Self {
        Walker { visitor, cursor, changed: false }
    }

    pub(crate) fn changed(&self) -> bool {
        self.changed
    }

    fn mark<T>(&mut self, value: Option<T>) -> Option<T> {
        if value.is_some() {
            self.changed = true;
        }
        value
    }

    pub(crate) async fn tree(&mut self, tree: &TreeRef) -> Result<Option<TreeRef>> {
        let visited = self.visitor.visit_child(tree, self.cursor).await?;
        let result = (!Arc::ptr_eq(&visited, tree)).then_some(visited);
        Ok(self.mark(result))
    }

    pub(crate) async fn opt_tree(&mut self, tree: &Option<TreeRef>) -> Result<Option<Option<TreeRef>>> {
        match tree {
            Some(t) => Ok(self.tree(t).await?.map(Some)),
            None => Ok(None),
        }
    }

    pub(crate) async fn space(&mut self, space: &Space) -> Result<Option<Space>> {
        let visited = self.visitor.visit_space(space, self.cursor).await?;
        Ok(self.mark(visited))
    }

    pub(crate) async fn markers(&mut self, markers: &Markers) -> Result<Option<Markers>> {
        let visited = self.visitor.visit_markers(markers, self.cursor).await?;
        Ok(self.mark(visited))
    }

    pub(crate) async fn ty(&mut self, ty: &Option<JavaType>) -> Result<Option<Option<JavaType>>> {
        let visited = self.visitor.visit_type(ty.as_ref(), self.cursor).await?;
        Ok(self.mark(visited))
    }

    /// Left padding around a scalar: only the space is visited.
    pub(crate) async fn left_padded_value<T: Clone>(&mut self, lp: &LeftPadded<T>) -> Result<Option<LeftPadded<T>>> {
        Ok(self.space(&lp.before).await?.map(|before| LeftPadded {
            before,
            element: lp.element.clone(),
            markers: lp.markers.clone(),
        }))
    }

    pub(crate) async fn left_padded(&mut self, lp: &LeftPadded<TreeRef>) -> Result<Option<LeftPadded<TreeRef>>> {
        let before = self.space(&lp.before).await?;
        let element = self.tree(&lp.element).await?;
        if before.is_none() && element.is_none() {
            return Ok(None);
        }
        Ok(Some(LeftPadded {
            before: before.unwrap_or_else(|| lp.before.clone()),
            element: element.unwrap_or_else(|| lp.element.clone()),
            markers: lp.markers.clone(),
        }))
    }

    pub(crate) async fn opt_left_padded(
        &mut self,
        lp: &Option<LeftPadded<TreeRef>>,
    ) -> Result<Option<Option<LeftPadded<TreeRef>>>> {
        match lp {
            Some(lp) => Ok(self.left_padded(lp).await?.map(Some)),
            None => Ok(None),
        }
    }

    pub(crate) async fn right_padded(&mut self, rp: &RightPadded<TreeRef>) -> Result<Option<RightPadded<TreeRef>>> {
        let element = self.tree(&rp.element).await?;
        let after = self.space(&rp.after).await?;
        if element.is_none() && after.is_none() {
            return Ok(None);
        }
        Ok(Some(RightPadded {
            element: element.unwrap_or_else(|| rp.element.clone()),
            after: after.unwrap_or_else(|| rp.after.clone()),
            markers: rp.markers.clone(),
        }))
    }

    /// Right padding around a scalar: only the space is visited.
    pub(crate) async fn right_padded_value<T: Clone>(
        &mut self,
        rp: &RightPadded<T>,
    ) -> Result<Option<RightPadded<T>>> {
        Ok(self.space(&rp.after).await?.map(|after| RightPadded {
            element: rp.element.clone(),
            after,
            markers: rp.markers.clone(),
        }))
    }

    pub(crate) async fn opt_right_padded(
        &mut self,
        rp: &Option<RightPadded<TreeRef>>,
    ) -> Result<Option<Option<RightPadded<TreeRef>>>> {
        match rp {
            Some(rp) => Ok(self.right_padded(rp).await?.map(Some)),
            None => Ok(None),
        }
    }

    pub(crate) async fn padded_list(
        &mut self,
        list: &[RightPadded<TreeRef>],
    ) -> Result<Option<Vec<RightPadded<TreeRef>>>> {
        let mut rebuilt: Option<Vec<RightPadded<TreeRef>>> = None;
        for (idx, rp) in list.iter().enumerate() {
            if let Some(new_rp) = self.right_padded(rp).await? {
                let items = rebuilt.get_or_insert_with(|| list[..idx].to_vec());
                items.push(new_rp);
            } else if let Some(items) = rebuilt.as_mut() {
                items.push(rp.clone());
            }
        }
        Ok(rebuilt)
    }

    pub(crate) async fn container(&mut self, container: &Container<TreeRef>) -> Result<Option<Container<TreeRef>>> {
        let before = self.space(&container.before).await?;
        let elements = self.padded_list(&container.elements).await?;
        if before.is_none() && elements.is_none() {
            return Ok(None);
        }
        Ok(Some(Container {
            before: before.unwrap_or_else(|| container.before.clone()),
            elements: elements.unwrap_or_else(|| container.elements.clone()),
            markers: container.markers.clone(),
        }))
    }

    pub(crate) async fn opt_container(
        &mut self,
        container: &Option<Container<TreeRef>>,
    ) -> Result<Option<Option<Container<TreeRef>>>> {
        match container {
            Some(c) => Ok(self.container(c).await?.map(Some)),
            None => Ok(None),
        }
    }
}

/// Keeps the original field when the walk produced no replacement.
pub(crate) fn keep<T: Clone>(visited: Option<T>, original: &T) -> T {
    visited.unwrap_or_else(|| original.clone())
}
