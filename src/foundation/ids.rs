use crate::foundation::core::LayerId;

/// Monotonic source of [`LayerId`] values.
///
/// Ids start at 1 and never repeat within one generator, including after [`LayerIdGen::observe`]
/// has been fed ids restored from a snapshot.
#[derive(Clone, Debug)]
pub struct LayerIdGen {
    next: u64,
}

impl Default for LayerIdGen {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl LayerIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> LayerId {
        let id = LayerId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Make sure future ids are strictly greater than `id`.
    pub fn observe(&mut self, id: LayerId) {
        if id.0 >= self.next {
            self.next = id.0.saturating_add(1);
        }
    }
}
