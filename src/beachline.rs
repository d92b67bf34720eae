//! The beachline: the sequence of parabolic arcs that separates the part of the plane already
//! decided by the sweep from the part that is not.
//!
//! Arcs and breakpoints reference each other, so both live in arenas owned by [`Beachline`] and
//! are addressed by integer handles. Removing an arc marks its slot dead; handles are never reused,
//! so a stale handle can always be detected.

use crate::diagram::{EdgeEnd, EdgeTrace, VertexIdx};
use crate::{approx_eq, debugln, Point, SiteIdx, EPSILON};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ArcId(u32);
impl ArcId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BreakpointId(u32);
impl BreakpointId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An arc handle together with the version it had when it was observed.
///
/// Any structural change to an arc (being split or removed) invalidates every stamp taken before
/// it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ArcStamp {
    pub id: ArcId,
    pub version: u32,
}

/// One parabolic segment of the beachline.
#[derive(Clone, Debug)]
pub struct Arc {
    pub site: SiteIdx,
    /// Breakpoint to the left. `None` only for the leftmost arc.
    pub left: Option<BreakpointId>,
    /// Breakpoint to the right. `None` only for the rightmost arc.
    pub right: Option<BreakpointId>,
    version: u32,
    alive: bool,
}
impl Arc {
    fn new(site: SiteIdx) -> Self {
        Self {
            site,
            left: None,
            right: None,
            version: 0,
            alive: true,
        }
    }

    /// The y value of this arc's parabola at `x`, when the sweep line is at `sweep_y`.
    pub fn parabola_y(&self, sites: &[Point], x: f64, sweep_y: f64) -> f64 {
        parabola_y(sites[self.site as usize], x, sweep_y)
    }
}

/// The y value at `x` of the parabola of points equidistant to `focus` and the horizontal line
/// `y = sweep_y`.
///
/// While the focus is on the sweep line the parabola degenerates to a vertical ray, which only
/// has a finite value at `focus.x`.
pub fn parabola_y(focus: Point, x: f64, sweep_y: f64) -> f64 {
    let d = sweep_y - focus.y;
    if d.abs() <= EPSILON {
        return if approx_eq(x, focus.x) {
            focus.y
        } else {
            f64::NEG_INFINITY
        };
    }
    let dx = x - focus.x;
    (focus.y + sweep_y) / 2.0 - dx * dx / (2.0 * d)
}

/// The point where two adjacent arcs meet. Traces one end of a Voronoi edge as the sweep
/// advances.
#[derive(Clone, Debug)]
pub struct Breakpoint {
    pub left: ArcId,
    pub right: ArcId,
    pub left_site: SiteIdx,
    pub right_site: SiteIdx,
    edge: usize,
    end: EdgeEnd,
}
impl Breakpoint {
    /// The x coordinate of this breakpoint when the sweep line is at `sweep_y`.
    ///
    /// Both sites must already have been passed by the sweep (`site.y <= sweep_y`).
    pub fn position_at(&self, sites: &[Point], sweep_y: f64) -> f64 {
        let l = sites[self.left_site as usize];
        let r = sites[self.right_site as usize];

        let dl = sweep_y - l.y;
        let dr = sweep_y - r.y;
        debug_assert!(dl >= -EPSILON && dr >= -EPSILON, "site ahead of the sweep line");

        // A site on the sweep line is a vertical ray, the breakpoint is on it.
        match (dl.abs() <= EPSILON, dr.abs() <= EPSILON) {
            (true, true) => return (l.x + r.x) / 2.0,
            (false, true) => return r.x,
            (true, false) => return l.x,
            (false, false) => {}
        }

        // Equate both parabolas and multiply by 2*dl*dr:
        //   dl*(x - rx)^2 - dr*(x - lx)^2 + dl*dr*(ly - ry) = 0
        let mut a = dl - dr;
        let mut b = -2.0 * (dl * r.x - dr * l.x);
        let mut c = dl * r.x * r.x - dr * l.x * l.x + dl * dr * (l.y - r.y);
        if a < 0.0 {
            a = -a;
            b = -b;
            c = -c;
        }

        if a <= EPSILON {
            // same height, the breakpoint moves along a vertical bisector
            return -c / b;
        }

        let disc = (b * b - 4.0 * a * c).max(0.0);
        // avoid cancellation between `b` and the square root
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        if q == 0.0 {
            return (l.x + r.x) / 2.0;
        }
        let (x1, x2) = (q / a, c / q);
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };

        // The site closer to the sweep line has the narrower parabola, which is the one on top
        // between the two roots. If that is the right arc, the breakpoint is the lower root.
        if l.y < r.y {
            lo
        } else {
            hi
        }
    }

    /// Attach a resolved Voronoi vertex to the end of the edge traced by this breakpoint.
    pub(crate) fn record_vertex(&self, edges: &mut [EdgeTrace], vertex: VertexIdx) {
        edges[self.edge].record(self.end, vertex);
    }
}

/// Result of inserting a site in the beachline.
#[derive(Clone, Copy, Debug)]
pub struct Insertion {
    /// The arc of the new site.
    pub arc: ArcId,
    /// Position of the new arc in the beachline.
    pub index: usize,
    /// The arc that was cut in two, if any. Its stamp is invalidated.
    pub split: Option<ArcId>,
}

/// An ordered sequence of arcs, separated by breakpoints.
#[derive(Clone)]
pub struct Beachline {
    /// The arcs from left to right.
    order: Vec<ArcId>,
    arcs: Vec<Arc>,
    breakpoints: Vec<Breakpoint>,
    edges: Vec<EdgeTrace>,
    /// Greatest sweep coordinate seen so far.
    min_sweep_position: f64,
}
impl std::fmt::Debug for Beachline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for (i, &id) in self.order.iter().enumerate() {
            if i > 0 {
                list.entry(&self.arc(self.order[i - 1]).right);
            }
            list.entry(&(id, self.arc(id).site));
        }
        list.finish()
    }
}
impl Default for Beachline {
    fn default() -> Self {
        Self::new()
    }
}
impl Beachline {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            arcs: Vec::new(),
            breakpoints: Vec::new(),
            edges: Vec::new(),
            min_sweep_position: f64::NEG_INFINITY,
        }
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Greatest sweep coordinate seen so far.
    pub fn sweep_position(&self) -> f64 {
        self.min_sweep_position
    }

    /// The arcs from left to right.
    pub fn arcs(&self) -> &[ArcId] {
        &self.order
    }

    /// The site of each arc, from left to right. A site can appear more than once.
    pub fn sites(&self) -> impl Iterator<Item = SiteIdx> + '_ {
        self.order.iter().map(|&id| self.arc(id).site)
    }

    /// The breakpoints from left to right.
    pub fn breakpoints(&self) -> impl Iterator<Item = BreakpointId> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.arc(id).right)
    }

    /// The x coordinate of each breakpoint, from left to right.
    pub fn breakpoint_xs<'a>(
        &'a self,
        sites: &'a [Point],
        sweep_y: f64,
    ) -> impl Iterator<Item = f64> + 'a {
        self.breakpoints()
            .map(move |bp| self.breakpoint(bp).position_at(sites, sweep_y))
    }

    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.index()]
    }

    pub fn breakpoint(&self, id: BreakpointId) -> &Breakpoint {
        &self.breakpoints[id.index()]
    }

    /// The current stamp of a live arc.
    pub fn stamp(&self, id: ArcId) -> ArcStamp {
        let arc = self.arc(id);
        debug_assert!(arc.alive);
        ArcStamp {
            id,
            version: arc.version,
        }
    }

    /// Whether the arc is alive and was not modified since the stamp was taken.
    pub fn is_current(&self, stamp: ArcStamp) -> bool {
        let arc = self.arc(stamp.id);
        arc.alive && arc.version == stamp.version
    }

    /// Current position of a breakpoint, on the beachline.
    pub fn breakpoint_point(&self, sites: &[Point], id: BreakpointId, sweep_y: f64) -> Point {
        let bp = self.breakpoint(id);
        let x = bp.position_at(sites, sweep_y);
        let y = self.arc(bp.left).parabola_y(sites, x, sweep_y);
        Point::new(x, y)
    }

    /// Move the sweep line to `y`. The sweep line never moves backwards.
    pub fn advance_sweep(&mut self, y: f64) {
        assert!(
            y >= self.min_sweep_position - EPSILON,
            "sweep line moved backwards: {} < {}",
            y,
            self.min_sweep_position
        );
        self.min_sweep_position = self.min_sweep_position.max(y);
    }

    /// Return the index of the arc that is above `point.x` when the sweep line is at `point.y`.
    ///
    /// If the point falls exactly on a breakpoint, the arc to its left is returned.
    pub fn find_closest_arc(&self, sites: &[Point], point: Point) -> usize {
        assert!(!self.order.is_empty(), "empty beachline");
        let last = self.order.len() - 1;
        self.order[..last].partition_point(|&id| {
            let right = self.arc(id).right.expect("inner arc without right breakpoint");
            self.breakpoint(right).position_at(sites, point.y) < point.x
        })
    }

    /// Position of a live arc in the beachline.
    ///
    /// Binary search on the position of its left breakpoint, then an outward walk over the arcs
    /// that share that position (arcs of zero width around a vertex).
    pub fn index_of(&self, sites: &[Point], id: ArcId) -> usize {
        let Some(left) = self.arc(id).left else {
            return 0;
        };
        let x = self
            .breakpoint(left)
            .position_at(sites, self.min_sweep_position);
        let last = self.order.len() - 1;
        let guess = self.order[..last].partition_point(|&a| {
            let right = self.arc(a).right.expect("inner arc without right breakpoint");
            self.breakpoint(right).position_at(sites, self.min_sweep_position) < x
        }) + 1;

        (0..=self.order.len())
            .flat_map(|d| [guess.wrapping_add(d), guess.wrapping_sub(d)])
            .find(|&i| self.order.get(i) == Some(&id))
            .expect("arc is not on the beachline")
    }

    /// Insert the arc of a new site, splitting the arc above it.
    pub fn add_arc(&mut self, sites: &[Point], site: SiteIdx) -> Insertion {
        let p = sites[site as usize];
        self.advance_sweep(p.y);

        let new = self.new_arc(site);

        if self.order.is_empty() {
            self.order.push(new);
            return Insertion {
                arc: new,
                index: 0,
                split: None,
            };
        }

        let idx = self.find_closest_arc(sites, p);
        let old = self.order[idx];
        let old_site = self.arc(old).site;
        let q = sites[old_site as usize];

        debugln!("site {} ({:?}) hits arc {:?} of site {}", site, p, old, old_site);

        // Both sites on the sweep line: the arcs are vertical rays, so the new one is placed beside
        // the old one, separated by a single vertical boundary.
        if approx_eq(p.y, q.y) {
            if p.x >= q.x && self.arc(old).right.is_none() {
                let bp = self.new_breakpoint(old, new, EdgeEnd::End, None);
                self.arcs[old.index()].right = Some(bp);
                self.arcs[new.index()].left = Some(bp);
                self.order.insert(idx + 1, new);
                return Insertion {
                    arc: new,
                    index: idx + 1,
                    split: None,
                };
            }
            if p.x < q.x && self.arc(old).left.is_none() {
                let bp = self.new_breakpoint(new, old, EdgeEnd::End, None);
                self.arcs[old.index()].left = Some(bp);
                self.arcs[new.index()].right = Some(bp);
                self.order.insert(idx, new);
                return Insertion {
                    arc: new,
                    index: idx,
                    split: None,
                };
            }
        }

        // Split `old` in two, with the new arc in between. Both new breakpoints trace the same
        // edge, in opposite directions.
        let copy = self.new_arc(old_site);
        let edge = self.new_edge(old_site, site, None);
        if p.x < q.x {
            // copy, new, old
            let outer = self.arc(old).left;
            let bl = self.new_breakpoint_on(copy, new, edge, EdgeEnd::End);
            let br = self.new_breakpoint_on(new, old, edge, EdgeEnd::Start);
            self.arcs[copy.index()].left = outer;
            self.arcs[copy.index()].right = Some(bl);
            self.arcs[new.index()].left = Some(bl);
            self.arcs[new.index()].right = Some(br);
            self.arcs[old.index()].left = Some(br);
            if let Some(outer) = outer {
                self.breakpoints[outer.index()].right = copy;
            }
            self.order.splice(idx..idx, [copy, new]);
        } else {
            // old, new, copy
            let outer = self.arc(old).right;
            let bl = self.new_breakpoint_on(old, new, edge, EdgeEnd::End);
            let br = self.new_breakpoint_on(new, copy, edge, EdgeEnd::Start);
            self.arcs[old.index()].right = Some(bl);
            self.arcs[new.index()].left = Some(bl);
            self.arcs[new.index()].right = Some(br);
            self.arcs[copy.index()].left = Some(br);
            self.arcs[copy.index()].right = outer;
            if let Some(outer) = outer {
                self.breakpoints[outer.index()].left = copy;
            }
            self.order.splice(idx + 1..idx + 1, [new, copy]);
        }
        self.arcs[old.index()].version += 1;

        Insertion {
            arc: new,
            index: idx + 1,
            split: Some(old),
        }
    }

    /// Remove an arc squeezed by its neighbors. The two breakpoints around it are replaced by a
    /// single one, starting at `vertex`. Return the new index of the left neighbor.
    pub fn delete_arc(&mut self, sites: &[Point], id: ArcId, vertex: VertexIdx) -> usize {
        let arc = self.arc(id);
        let (Some(bl), Some(br)) = (arc.left, arc.right) else {
            panic!("arc {:?} at the end of the beachline cannot be removed", id);
        };
        let idx = self.index_of(sites, id);
        let left = self.breakpoint(bl).left;
        let right = self.breakpoint(br).right;

        let bp = self.new_breakpoint(left, right, EdgeEnd::End, Some(vertex));
        self.arcs[left.index()].right = Some(bp);
        self.arcs[right.index()].left = Some(bp);

        let arc = &mut self.arcs[id.index()];
        arc.alive = false;
        arc.version += 1;
        self.order.remove(idx);

        debugln!("removed arc {:?}, new breakpoint {:?}", id, bp);

        idx - 1
    }

    /// Every consecutive triple of arcs, from left to right.
    pub fn arc_triplets(&self) -> impl Iterator<Item = [ArcId; 3]> + '_ {
        self.order.windows(3).map(|w| [w[0], w[1], w[2]])
    }

    /// The triple of arcs centered at `middle`, if it has both neighbors.
    pub fn triplet_at(&self, middle: usize) -> Option<[ArcId; 3]> {
        if middle == 0 || middle + 1 >= self.order.len() {
            return None;
        }
        Some([
            self.order[middle - 1],
            self.order[middle],
            self.order[middle + 1],
        ])
    }

    /// Record a resolved vertex on the edge traced by `bp`.
    pub(crate) fn record_vertex(&mut self, bp: BreakpointId, vertex: VertexIdx) {
        self.breakpoints[bp.index()].record_vertex(&mut self.edges, vertex);
    }

    pub(crate) fn into_edges(self) -> Vec<EdgeTrace> {
        self.edges
    }

    fn new_arc(&mut self, site: SiteIdx) -> ArcId {
        let id = ArcId(self.arcs.len() as u32);
        self.arcs.push(Arc::new(site));
        id
    }

    fn new_edge(&mut self, a: SiteIdx, b: SiteIdx, start: Option<VertexIdx>) -> usize {
        self.edges.push(EdgeTrace::new(a, b, start));
        self.edges.len() - 1
    }

    /// A breakpoint between `left` and `right` tracing the `end` of a new edge.
    fn new_breakpoint(
        &mut self,
        left: ArcId,
        right: ArcId,
        end: EdgeEnd,
        start: Option<VertexIdx>,
    ) -> BreakpointId {
        let (ls, rs) = (self.arc(left).site, self.arc(right).site);
        let edge = self.new_edge(ls, rs, start);
        self.new_breakpoint_on(left, right, edge, end)
    }

    fn new_breakpoint_on(
        &mut self,
        left: ArcId,
        right: ArcId,
        edge: usize,
        end: EdgeEnd,
    ) -> BreakpointId {
        let id = BreakpointId(self.breakpoints.len() as u32);
        self.breakpoints.push(Breakpoint {
            left,
            right,
            left_site: self.arc(left).site,
            right_site: self.arc(right).site,
            edge,
            end,
        });
        id
    }
}
