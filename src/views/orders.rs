use super::{Page, PageCore, Selectable, ViewId};
use crate::context::DeskContext;
use crate::models::{CollectionKey, EntityKinds, EntityRef, OrderId, Project};
use crate::selection::SelectionHub;

/// Grid of the orders planned for the context's day
#[derive(Debug)]
pub struct OrdersPage {
    core: PageCore,
    rows: Vec<OrderId>,
}

impl OrdersPage {
    pub fn enter(hub: &mut SelectionHub) -> Self {
        Self {
            core: PageCore::enter(hub, ViewId::Orders, EntityKinds::ORDERS),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[OrderId] {
        &self.rows
    }
}

impl Page for OrdersPage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn keys(&self, _ctx: &DeskContext, _project: &Project) -> Vec<CollectionKey> {
        vec![CollectionKey::Orders]
    }

    fn rebind(&mut self, ctx: &DeskContext, project: &Project) {
        self.rows = project.orders_on(ctx.date).map(|order| order.id).collect();
    }

    fn selectable(&self) -> Selectable {
        (
            self.rows.iter().copied().map(EntityRef::Order).collect(),
            std::collections::HashMap::new(),
        )
    }
}
