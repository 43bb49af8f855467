use indexmap::IndexSet;

use crate::models::{EntityRef, OrderId, StopId};

/// What is being dragged
///
/// A payload holds entities of one kind only; duplicates are dropped while
/// keeping the selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Orders(Vec<OrderId>),
    Stops(Vec<StopId>),
}

impl DragPayload {
    /// Build a payload from a selection, `None` if it cannot be dragged as one
    ///
    /// Empty selections, selections containing routes and selections mixing
    /// orders with stops yield `None`.
    #[must_use]
    pub fn from_selection(selection: &[EntityRef]) -> Option<Self> {
        let first = selection.first()?;
        match first {
            EntityRef::Order(_) => selection
                .iter()
                .map(EntityRef::as_order)
                .collect::<Option<IndexSet<OrderId>>>()
                .map(|orders| Self::Orders(orders.into_iter().collect())),
            EntityRef::Stop(_) => selection
                .iter()
                .map(EntityRef::as_stop)
                .collect::<Option<IndexSet<StopId>>>()
                .map(|stops| Self::Stops(stops.into_iter().collect())),
            EntityRef::Route(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Orders(orders) => orders.len(),
            Self::Stops(stops) => stops.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn entities(&self) -> Vec<EntityRef> {
        match self {
            Self::Orders(orders) => orders.iter().copied().map(EntityRef::Order).collect(),
            Self::Stops(stops) => stops.iter().copied().map(EntityRef::Stop).collect(),
        }
    }
}
