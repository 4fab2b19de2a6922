//! Rendering collaborator consulted for hit tests and anchor points.

use crate::geometry::Point;

/// The rendered scene holding one proxy per projection item.
pub trait Scene {
    type Proxy;

    /// Topmost proxy under `point`.
    fn proxy_at(&self, point: Point) -> Option<Self::Proxy>;

    /// Centre of the proxy's bounds.
    fn anchor_of(&self, proxy: &Self::Proxy) -> Option<Point>;
}
