//! Squarified treemap layout (Bruls, Huizing & van Wijk).
//!
//! Vega-Lite has no treemap transform, so tiles are laid out here and drawn
//! as plain `rect` marks.

use crate::dashboard::types::TreeNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    fn short_side(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// A laid-out hierarchy node.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub value: f64,
    pub depth: usize,
    pub rect: Rect,
}

/// Aspect-ratio cost of laying `row` (areas) along a side of length `side`.
fn worst(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = row.iter().copied().fold(f64::INFINITY, f64::min);
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Place one finished row against the short side of `free` and return the
/// space left over.
fn lay_row(row: &[(usize, f64)], free: Rect, out: &mut [Option<Rect>]) -> Rect {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();

    if free.w >= free.h {
        // Column on the left
        let width = if free.h > 0.0 { sum / free.h } else { 0.0 };
        let mut y = free.y;
        for (idx, area) in row {
            let h = if width > 0.0 { area / width } else { 0.0 };
            if let Some(slot) = out.get_mut(*idx) {
                *slot = Some(Rect::new(free.x, y, width, h));
            }
            y += h;
        }
        Rect::new(free.x + width, free.y, (free.w - width).max(0.0), free.h)
    } else {
        // Row along the top
        let height = if free.w > 0.0 { sum / free.w } else { 0.0 };
        let mut x = free.x;
        for (idx, area) in row {
            let w = if height > 0.0 { area / height } else { 0.0 };
            if let Some(slot) = out.get_mut(*idx) {
                *slot = Some(Rect::new(x, free.y, w, height));
            }
            x += w;
        }
        Rect::new(free.x, free.y + height, free.w, (free.h - height).max(0.0))
    }
}

/// Divide `bounds` into one rectangle per value, areas proportional to the
/// values. Results come back in input order. Non-positive values get an empty
/// rectangle at the origin of `bounds`.
pub fn squarify(values: &[f64], bounds: Rect) -> Vec<Rect> {
    let empty = Rect::new(bounds.x, bounds.y, 0.0, 0.0);
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return vec![empty; values.len()];
    }

    let scale = bounds.area() / total;
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.0)
        .map(|(i, v)| (i, v * scale))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut out: Vec<Option<Rect>> = vec![None; values.len()];
    let mut free = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();
    let mut areas: Vec<f64> = Vec::new();

    for (idx, area) in order {
        let side = free.short_side();
        let current = worst(&areas, side);
        areas.push(area);
        if row.is_empty() || worst(&areas, side) <= current {
            row.push((idx, area));
            continue;
        }

        // Adding this tile made the row worse: close it and start a new one
        areas.pop();
        free = lay_row(&row, free, &mut out);
        row.clear();
        areas.clear();
        row.push((idx, area));
        areas.push(area);
    }
    if !row.is_empty() {
        lay_row(&row, free, &mut out);
    }

    out.into_iter().map(|r| r.unwrap_or(empty)).collect()
}

/// Lay out a one- or two-level hierarchy. Roots share `bounds`; each root's
/// children share the root's tile.
pub fn layout(nodes: &[TreeNode], bounds: Rect) -> Vec<Tile> {
    let roots: Vec<&TreeNode> = nodes.iter().filter(|n| n.parent.is_none()).collect();
    let root_rects = squarify(
        &roots.iter().map(|n| n.value).collect::<Vec<_>>(),
        bounds,
    );

    let mut tiles = Vec::with_capacity(nodes.len());
    for (root, rect) in roots.iter().zip(root_rects) {
        tiles.push(Tile {
            id: root.id.clone(),
            parent: None,
            label: root.label.clone(),
            value: root.value,
            depth: 0,
            rect,
        });

        let children: Vec<&TreeNode> = nodes
            .iter()
            .filter(|n| n.parent.as_deref() == Some(root.id.as_str()))
            .collect();
        let child_rects = squarify(
            &children.iter().map(|n| n.value).collect::<Vec<_>>(),
            rect,
        );
        for (child, child_rect) in children.iter().zip(child_rects) {
            tiles.push(Tile {
                id: child.id.clone(),
                parent: child.parent.clone(),
                label: child.label.clone(),
                value: child.value,
                depth: 1,
                rect: child_rect,
            });
        }
    }
    tiles
}
