//! Traversal of a packet's property tree
//!
//! An [`XmpIterator`] walks one packet depth-first, schema by schema, and
//! yields each emitted node as an [`XmpProperty`]. It borrows the packet it
//! was created from, so the packet cannot be freed or mutated mid-walk.
//!
//! ```text
//! Created --next--> Iterating --next (not found)--> Exhausted
//!    |                  |                               |
//!    +------ skip ------+---- skip (no change) ---------+
//! ```
//!
//! Freeing consumes the iterator; there is no way back to any state.

use crate::core::error::{check_last_error, check_result, XmpResult};
use crate::core::handle::{null_handle, XmpString};
use crate::core::options::{PropFlags, SkipFlags};
use crate::engine::{Engine, IteratorPtr, PacketPtr};
use crate::types::property::XmpProperty;
use std::ffi::CStr;

/// Where an iterator is in its walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    /// No node has been requested yet
    Created,
    /// At least one node has been yielded
    Iterating,
    /// The engine reported the end of the walk
    Exhausted,
}

/// Iterator over the nodes of one packet
///
/// Also usable as a standard [`Iterator`] of `XmpResult<XmpProperty>`; after
/// an error the walk is treated as exhausted.
pub struct XmpIterator<'a> {
    engine: &'a dyn Engine,
    ptr: Option<IteratorPtr>,
    state: IterState,
}

impl<'a> XmpIterator<'a> {
    pub(crate) fn new(
        engine: &'a dyn Engine,
        xmp: PacketPtr,
        schema: Option<&CStr>,
        name: Option<&CStr>,
        options: u32,
    ) -> XmpResult<Self> {
        match engine.iterator_new(xmp, schema, name, options) {
            Some(ptr) => {
                log::trace!("iterator {:?} created with options {:#x}", ptr, options);
                Ok(Self {
                    engine,
                    ptr: Some(ptr),
                    state: IterState::Created,
                })
            }
            None => Err(null_handle(engine, &format!("iterator_new({:#x})", options))),
        }
    }

    pub fn state(&self) -> IterState {
        self.state
    }

    /// Advance to the next emitted node
    ///
    /// Returns `Ok(None)` once the walk is over, and keeps returning it.
    pub fn next_property(&mut self) -> XmpResult<Option<XmpProperty>> {
        let ptr = match (self.state, self.ptr) {
            (IterState::Exhausted, _) | (_, None) => return Ok(None),
            (_, Some(ptr)) => ptr,
        };

        let schema = XmpString::new(self.engine)?;
        let path = XmpString::new(self.engine)?;
        let value = XmpString::new(self.engine)?;
        let mut options = 0;
        let found =
            self.engine
                .iterator_next(ptr, schema.ptr(), path.ptr(), value.ptr(), &mut options);

        if !found {
            self.state = IterState::Exhausted;
            log::trace!("iterator {:?} exhausted", ptr);
            check_last_error(self.engine, || "iterator_next".to_string())?;
            return Ok(None);
        }

        let property = XmpProperty::new(
            schema.read_utf8()?,
            path.read_utf8()?,
            value.read_utf8()?,
            PropFlags::from_bits_retain(options),
        );
        if self.state == IterState::Created {
            log::trace!("iterator {:?} started", ptr);
        }
        self.state = IterState::Iterating;
        Ok(Some(property))
    }

    /// Drop part of the remaining walk
    ///
    /// `SKIP_SUBTREE` drops the descendants of the node last yielded,
    /// `SKIP_SIBLINGS` also drops its remaining siblings. Nothing is yielded
    /// and the state does not change.
    pub fn skip(&mut self, options: SkipFlags) -> XmpResult<()> {
        let Some(ptr) = self.ptr else {
            return Ok(());
        };
        let ok = self.engine.iterator_skip(ptr, options.bits());
        check_result(self.engine, || format!("iterator_skip({:?})", options), ok)?;
        log::trace!("iterator {:?} skipped {:?}", ptr, options);
        Ok(())
    }

    /// Release the traversal state now, reporting failure
    ///
    /// Dropping the iterator does the same but only logs a failure.
    pub fn free(mut self) -> XmpResult<()> {
        self.release()
    }

    fn release(&mut self) -> XmpResult<()> {
        let Some(ptr) = self.ptr.take() else {
            return Ok(());
        };
        let ok = self.engine.iterator_free(ptr);
        log::trace!("iterator {:?} freed", ptr);
        check_result(self.engine, || "iterator_free".to_string(), ok)
    }
}

impl Iterator for XmpIterator<'_> {
    type Item = XmpResult<XmpProperty>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_property() {
            Ok(property) => property.map(Ok),
            Err(e) => {
                self.state = IterState::Exhausted;
                Some(Err(e))
            }
        }
    }
}

impl std::fmt::Debug for XmpIterator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmpIterator")
            .field("ptr", &self.ptr)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for XmpIterator<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("failed to free iterator: {e}");
        }
    }
}
