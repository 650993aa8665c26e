use crate::config::{BoundaryPolicy, GridSize};
use crate::snake::Position;

/// Fixed-size board together with its boundary policy.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridWorld {
    size: GridSize,
    policy: BoundaryPolicy,
}

impl GridWorld {
    /// Creates a world; zero-sized dimensions are bumped to one cell.
    #[must_use]
    pub fn new(size: GridSize, policy: BoundaryPolicy) -> Self {
        Self {
            size: GridSize {
                width: size.width.max(1),
                height: size.height.max(1),
            },
            policy,
        }
    }

    #[must_use]
    pub fn size(self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn policy(self) -> BoundaryPolicy {
        self.policy
    }

    #[must_use]
    pub fn center(self) -> Position {
        self.size.center()
    }

    #[must_use]
    pub fn contains(self, position: Position) -> bool {
        position.is_within_bounds(self.size)
    }

    /// Applies the boundary policy to a freshly computed head.
    ///
    /// Returns `None` when the head left the grid under [`BoundaryPolicy::Clamp`].
    #[must_use]
    pub fn resolve(self, head: Position) -> Option<Position> {
        if self.contains(head) {
            return Some(head);
        }

        match self.policy {
            BoundaryPolicy::Wrap => Some(head.wrapped(self.size)),
            BoundaryPolicy::Clamp => None,
        }
    }

    /// Iterates every cell on the outer ring, each exactly once.
    pub fn border_cells(self) -> impl Iterator<Item = Position> {
        let width = i32::from(self.size.width);
        let height = i32::from(self.size.height);

        (0..height).flat_map(move |y| {
            (0..width).filter_map(move |x| {
                let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                on_border.then_some(Position { x, y })
            })
        })
    }
}
