use super::Layer;

/// Ordered two-segment layer collection.
///
/// Entries `[0, overlay_start)` are layers in push order; entries from
/// `overlay_start` on are overlays in push order. Overlays therefore always
/// sit above every layer.
#[derive(Default)]
pub struct LayerStack {
    entries: Vec<Box<dyn Layer>>,
    overlay_start: usize,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `layer`, then places it above the existing layers and below
    /// every overlay.
    pub fn push(&mut self, mut layer: Box<dyn Layer>) {
        layer.on_attach();
        self.entries.insert(self.overlay_start, layer);
        self.overlay_start += 1;
    }

    /// Attaches `overlay`, then places it on top of the stack.
    pub fn push_overlay(&mut self, mut overlay: Box<dyn Layer>) {
        overlay.on_attach();
        self.entries.push(overlay);
    }

    /// Removes the most recently pushed layer and detaches it.
    ///
    /// # Panics
    ///
    /// Panics when no regular layer is present. Use `try_pop` to probe.
    pub fn pop(&mut self) -> Box<dyn Layer> {
        match self.try_pop() {
            Some(layer) => layer,
            None => core_panic!("LayerStack::pop called with no layers"),
        }
    }

    /// Removes the most recently pushed overlay and detaches it.
    ///
    /// # Panics
    ///
    /// Panics when no overlay is present. Use `try_pop_overlay` to probe.
    pub fn pop_overlay(&mut self) -> Box<dyn Layer> {
        match self.try_pop_overlay() {
            Some(overlay) => overlay,
            None => core_panic!("LayerStack::pop_overlay called with no overlays"),
        }
    }

    pub fn try_pop(&mut self) -> Option<Box<dyn Layer>> {
        if self.overlay_start == 0 {
            return None;
        }
        self.overlay_start -= 1;
        let mut layer = self.entries.remove(self.overlay_start);
        layer.on_detach();
        Some(layer)
    }

    pub fn try_pop_overlay(&mut self) -> Option<Box<dyn Layer>> {
        if self.entries.len() == self.overlay_start {
            return None;
        }
        let mut overlay = self.entries.pop()?;
        overlay.on_detach();
        Some(overlay)
    }

    /// Pops every overlay, then every layer, top to bottom.
    pub fn clear(&mut self) {
        while self.try_pop_overlay().is_some() {}
        while self.try_pop().is_some() {}
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.overlay_start
    }

    pub fn overlay_count(&self) -> usize {
        self.entries.len() - self.overlay_start
    }

    /// Bottom-to-top iteration: layers, then overlays.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(dyn Layer + 'static)> + '_ {
        self.entries.iter().map(|entry| entry.as_ref())
    }

    pub fn for_each_ascending(&mut self, mut f: impl FnMut(&mut dyn Layer)) {
        for entry in self.entries.iter_mut() {
            f(entry.as_mut());
        }
    }

    pub fn for_each_descending(&mut self, mut f: impl FnMut(&mut dyn Layer)) {
        for entry in self.entries.iter_mut().rev() {
            f(entry.as_mut());
        }
    }

    /// Cursor positioned on the top-most entry.
    pub fn top(&mut self) -> StackCursor<'_> {
        let pos = self.entries.len().checked_sub(1);
        StackCursor {
            entries: &mut self.entries,
            pos,
        }
    }

    /// Cursor positioned on the bottom-most entry.
    pub fn bottom(&mut self) -> StackCursor<'_> {
        let pos = (!self.entries.is_empty()).then_some(0);
        StackCursor {
            entries: &mut self.entries,
            pos,
        }
    }
}

/// Bidirectional cursor over a `LayerStack`.
///
/// Holds the stack mutably, so the stack cannot change during a traversal.
/// Once the cursor steps off either end it stays off.
pub struct StackCursor<'a> {
    entries: &'a mut [Box<dyn Layer>],
    pos: Option<usize>,
}

impl StackCursor<'_> {
    /// Entry under the cursor, `None` when off the stack.
    pub fn get(&mut self) -> Option<&mut (dyn Layer + 'static)> {
        let pos = self.pos?;
        self.entries.get_mut(pos).map(|entry| entry.as_mut())
    }

    /// Moves one entry up. Returns whether the cursor is still on the stack.
    pub fn next(&mut self) -> bool {
        let len = self.entries.len();
        self.pos = self.pos.and_then(|p| (p + 1 < len).then_some(p + 1));
        self.pos.is_some()
    }

    /// Moves one entry down. Returns whether the cursor is still on the stack.
    pub fn prev(&mut self) -> bool {
        self.pos = self.pos.and_then(|p| p.checked_sub(1));
        self.pos.is_some()
    }
}
