use crate::{Point, SiteIdx, SweepStats};

pub type VertexIdx = u32;

/// Which end of an edge a breakpoint is tracing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum EdgeEnd {
    Start,
    End,
}

/// An edge of the diagram while the sweep is running.
///
/// The edge lies on the bisector of `sites.0` and `sites.1`. Going from `start` to `end` means
/// moving along `perp(sites.1 - sites.0)`, with `sites.0` on the left-hand side.
#[derive(Clone, Debug)]
pub(crate) struct EdgeTrace {
    sites: (SiteIdx, SiteIdx),
    start: Option<VertexIdx>,
    end: Option<VertexIdx>,
}
impl EdgeTrace {
    pub(crate) fn new(a: SiteIdx, b: SiteIdx, start: Option<VertexIdx>) -> Self {
        Self {
            sites: (a, b),
            start,
            end: None,
        }
    }

    pub(crate) fn record(&mut self, end: EdgeEnd, vertex: VertexIdx) {
        let slot = match end {
            EdgeEnd::Start => &mut self.start,
            EdgeEnd::End => &mut self.end,
        };
        assert!(
            slot.is_none(),
            "{:?} of edge {:?} resolved twice",
            end,
            self.sites
        );
        *slot = Some(vertex);
    }

    fn finish(self, sites: &[Point]) -> Edge {
        let (a, b) = self.sites;
        let (pa, pb) = (sites[a as usize], sites[b as usize]);
        let d = (pb - pa).perp();
        let direction = d * (1.0 / d.length());

        let shape = match (self.start, self.end) {
            (Some(start), Some(end)) => EdgeShape::Segment { start, end },
            (Some(origin), None) => EdgeShape::Ray { origin, direction },
            (None, Some(origin)) => EdgeShape::Ray {
                origin,
                direction: -direction,
            },
            (None, None) => EdgeShape::Line {
                point: pa.midpoint(pb),
                direction,
            },
        };

        Edge {
            sites: self.sites,
            shape,
        }
    }
}

/// The geometry of an edge. Unbounded edges carry a unit direction, perpendicular to the line
/// joining the two sites.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeShape {
    /// Both ends are Voronoi vertices.
    Segment { start: VertexIdx, end: VertexIdx },
    /// Starts at a vertex and goes to infinity.
    Ray { origin: VertexIdx, direction: Point },
    /// A whole line, without any vertex. Only happens when all sites are collinear.
    Line { point: Point, direction: Point },
}

/// An edge of the Voronoi diagram, separating the cells of two sites.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub sites: (SiteIdx, SiteIdx),
    pub shape: EdgeShape,
}
impl Edge {
    pub fn is_bounded(&self) -> bool {
        matches!(self.shape, EdgeShape::Segment { .. })
    }

    /// The vertices at the ends of this edge.
    pub fn vertices(&self) -> impl Iterator<Item = VertexIdx> {
        let (a, b) = match self.shape {
            EdgeShape::Segment { start, end } => (Some(start), Some(end)),
            EdgeShape::Ray { origin, .. } => (Some(origin), None),
            EdgeShape::Line { .. } => (None, None),
        };
        a.into_iter().chain(b)
    }

    /// Direction of an unbounded edge.
    pub fn direction(&self) -> Option<Point> {
        match self.shape {
            EdgeShape::Segment { .. } => None,
            EdgeShape::Ray { direction, .. } | EdgeShape::Line { direction, .. } => Some(direction),
        }
    }
}

/// A planar Voronoi diagram: vertices and the edges between them.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagram {
    sites: Vec<Point>,
    vertices: Vec<Point>,
    edges: Vec<Edge>,
    stats: SweepStats,
}
impl Diagram {
    pub(crate) fn new(
        sites: Vec<Point>,
        vertices: Vec<Point>,
        edges: Vec<EdgeTrace>,
        stats: SweepStats,
    ) -> Self {
        let edges = edges.into_iter().map(|e| e.finish(&sites)).collect();
        Self {
            sites,
            vertices,
            edges,
            stats,
        }
    }

    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    /// One vertex per circle event, at the center of the circle.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex(&self, idx: VertexIdx) -> Point {
        self.vertices[idx as usize]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn bounded_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_bounded())
    }

    pub fn unbounded_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !e.is_bounded())
    }

    /// Sites whose cells share an edge with the cell of `site`, sorted.
    pub fn neighbors(&self, site: SiteIdx) -> Vec<SiteIdx> {
        let mut neighbors: Vec<SiteIdx> = self
            .edges
            .iter()
            .filter_map(|e| match e.sites {
                (a, b) if a == site => Some(b),
                (a, b) if b == site => Some(a),
                _ => None,
            })
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }
}
