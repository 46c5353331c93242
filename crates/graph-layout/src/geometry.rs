use serde::{Deserialize, Serialize};

/// 2D point with integer coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this is the "never placed" sentinel used by incremental layouts
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Return the point moved by the given offsets
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Round both coordinates to the nearest multiple of `grid`
    ///
    /// Halves are rounded away from zero.
    pub fn snap(self, grid: i32) -> Self {
        Self {
            x: snap_to_grid(self.x, grid),
            y: snap_to_grid(self.y, grid),
        }
    }
}

/// 2D size with integer dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Return the component-wise maximum of two sizes
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// Vertical extent covered by a set of placed nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VerticalSpan {
    pub top: i32,
    pub bottom: i32,
}

impl VerticalSpan {
    /// Compute the span of `(position, size)` pairs, `None` when empty
    pub fn of<I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Point, Size)>,
    {
        items.into_iter().fold(None, |span, (pos, size)| {
            let item = Self {
                top: pos.y,
                bottom: pos.y.saturating_add(size.height),
            };
            Some(match span {
                None => item,
                Some(span) => Self {
                    top: span.top.min(item.top),
                    bottom: span.bottom.max(item.bottom),
                },
            })
        })
    }
}

fn snap_to_grid(value: i32, grid: i32) -> i32 {
    if grid <= 1 {
        return value;
    }
    let (value, grid) = (i64::from(value), i64::from(grid));
    let half = grid / 2;
    let snapped = if value >= 0 {
        (value + half) / grid
    } else {
        -((-value + half) / grid)
    };
    let snapped = snapped * grid;
    i32::try_from(snapped).unwrap_or(if snapped < 0 { i32::MIN } else { i32::MAX })
}
