use crate::models::{RouteId, StopId};

/// Side of the target stop new stops are inserted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Append to the end of a route
    Route(RouteId),
    /// Insert next to a specific stop
    Stop { stop: StopId, position: DropPosition },
    /// The unassigned orders surface
    Unassigned,
}

impl DropTarget {
    #[must_use]
    pub const fn route(&self) -> Option<RouteId> {
        match self {
            Self::Route(route) => Some(*route),
            Self::Stop { .. } | Self::Unassigned => None,
        }
    }
}

/// What the pointer is over, as reported by the hosting control's hit test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    HeaderRow,
    InsertionRow,
    EmptyCanvas,
    RouteRow(RouteId),
    /// `offset` is the pointer's distance from the top of a row `height` tall
    StopRow { stop: StopId, offset: f64, height: f64 },
    UnassignedSurface,
}

impl HitTarget {
    /// Resolve the pointer position to a drop target
    ///
    /// Chrome and degenerate rows resolve to `None`, meaning "no effect".
    #[must_use]
    pub fn resolve(self) -> Option<DropTarget> {
        match self {
            Self::HeaderRow | Self::InsertionRow | Self::EmptyCanvas => None,
            Self::RouteRow(route) => Some(DropTarget::Route(route)),
            Self::StopRow { stop, offset, height } => {
                if !(height.is_finite() && height > 0.0 && offset.is_finite()) {
                    return None;
                }
                let position = if offset < height / 2.0 {
                    DropPosition::Before
                } else {
                    DropPosition::After
                };
                Some(DropTarget::Stop { stop, position })
            }
            Self::UnassignedSurface => Some(DropTarget::Unassigned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_resolves_to_no_target() {
        assert_eq!(HitTarget::HeaderRow.resolve(), None);
        assert_eq!(HitTarget::InsertionRow.resolve(), None);
        assert_eq!(HitTarget::EmptyCanvas.resolve(), None);
    }

    #[test]
    fn test_stop_row_halves() {
        let stop = StopId::new();
        let upper = HitTarget::StopRow { stop, offset: 3.0, height: 20.0 };
        let lower = HitTarget::StopRow { stop, offset: 15.0, height: 20.0 };
        assert_eq!(upper.resolve(), Some(DropTarget::Stop { stop, position: DropPosition::Before }));
        assert_eq!(lower.resolve(), Some(DropTarget::Stop { stop, position: DropPosition::After }));
    }

    #[test]
    fn test_degenerate_row_has_no_target() {
        let hit = HitTarget::StopRow { stop: StopId::new(), offset: 0.0, height: 0.0 };
        assert_eq!(hit.resolve(), None);
    }

    #[test]
    fn test_route_and_unassigned_targets() {
        let route = RouteId::new();
        assert_eq!(HitTarget::RouteRow(route).resolve(), Some(DropTarget::Route(route)));
        assert_eq!(HitTarget::UnassignedSurface.resolve(), Some(DropTarget::Unassigned));
    }
}
