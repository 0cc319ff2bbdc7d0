//! Snap guidelines for dragged elements.
//!
//! A dragged box snaps its left/center/right (and top/middle/bottom) lines to
//! the same lines of nearby boxes when they are within a threshold. Each axis
//! snaps independently to the closest line.

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// A vertical line at some x
    Vertical,
    /// A horizontal line at some y
    Horizontal,
}

/// A line the dragged box snapped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub axis: GuideAxis,
    pub position: f64,
}

/// Correction to apply to a proposed position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snap {
    pub offset: Point,
    pub guides: Vec<Guide>,
}

fn x_lines(rect: &Rect) -> [f64; 3] {
    [rect.x, rect.x + rect.width / 2.0, rect.right()]
}

fn y_lines(rect: &Rect) -> [f64; 3] {
    [rect.y, rect.y + rect.height / 2.0, rect.bottom()]
}

/// Closest (delta, line) within `threshold`
fn snap_axis(moving: [f64; 3], targets: impl Iterator<Item = [f64; 3]>, threshold: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for target in targets {
        for line in target {
            for edge in moving {
                let delta = line - edge;
                if delta.abs() > threshold {
                    continue;
                }
                if best.map_or(true, |(current, _)| delta.abs() < current.abs()) {
                    best = Some((delta, line));
                }
            }
        }
    }
    best
}

/// Snap `moving` against `candidates`
pub fn snap_rect(moving: &Rect, candidates: &[Rect], threshold: f64) -> Snap {
    let mut snap = Snap::default();
    if threshold <= 0.0 {
        return snap;
    }
    if let Some((delta, line)) = snap_axis(x_lines(moving), candidates.iter().map(x_lines), threshold) {
        snap.offset.x = delta;
        snap.guides.push(Guide {
            axis: GuideAxis::Vertical,
            position: line,
        });
    }
    if let Some((delta, line)) = snap_axis(y_lines(moving), candidates.iter().map(y_lines), threshold) {
        snap.offset.y = delta;
        snap.guides.push(Guide {
            axis: GuideAxis::Horizontal,
            position: line,
        });
    }
    snap
}
