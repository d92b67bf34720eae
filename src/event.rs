//! Sweep events and the priority queue they wait in.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::beachline::{ArcId, ArcStamp, Beachline};
use crate::heap::Heap;
use crate::{Point, SiteIdx, EPSILON};

/// Handle of an event inserted in an [`EventQueue`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventId(u64);

/// The sweep line reaches an input site.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SiteEvent {
    pub site: SiteIdx,
    pub position: Point,
}

/// The sweep line reaches the top of the circle through the sites of three consecutive arcs. If
/// none of the arcs changed in the meantime, the middle one vanishes at that moment.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CircleEvent {
    /// The three arcs, from left to right, as they were when the event was created.
    pub arcs: [ArcStamp; 3],
    pub sites: [SiteIdx; 3],
    pub center: Point,
    pub radius: f64,
}
impl CircleEvent {
    /// Build the circle event of three consecutive arcs, if their middle arc is going to vanish
    /// while the sweep line is at or after `sweep_y`.
    ///
    /// Returns `None` when the sites are collinear (the circle does not exist) or when the two
    /// breakpoints around the middle arc are moving apart.
    pub fn new(
        sites: &[Point],
        beachline: &Beachline,
        arcs: [ArcId; 3],
        sweep_y: f64,
    ) -> Option<Self> {
        let s = arcs.map(|id| beachline.arc(id).site);
        let [a, b, c] = s.map(|i| sites[i as usize]);

        // The breakpoints converge only if a -> b -> c turns counterclockwise. This also rules out
        // a triple whose outer arcs belong to the same site.
        let turn = (b - a).perp_dot(c - b);
        if turn <= EPSILON * (b - a).length() * (c - b).length() {
            return None;
        }

        let center = circumcenter(a, b, c)?;
        let radius = center.dist(b);
        if !radius.is_finite() {
            return None;
        }

        if center.y + radius < sweep_y - EPSILON {
            return None;
        }

        Some(Self {
            arcs: arcs.map(|id| beachline.stamp(id)),
            sites: s,
            center,
            radius,
        })
    }

    /// The arc that is removed when this event fires.
    pub fn middle(&self) -> ArcId {
        self.arcs[1].id
    }

    /// The topmost point of the circle, where the sweep line meets it.
    pub fn trigger(&self) -> Point {
        Point::new(self.center.x, self.center.y + self.radius)
    }

    /// Whether none of the three arcs changed since this event was created.
    pub fn is_current(&self, beachline: &Beachline) -> bool {
        self.arcs.iter().all(|&s| beachline.is_current(s))
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum VoronoiEvent {
    Site(SiteEvent),
    Circle(CircleEvent),
}
impl VoronoiEvent {
    /// Return the position where this event happens.
    pub fn position(&self) -> Point {
        match self {
            VoronoiEvent::Site(e) => e.position,
            VoronoiEvent::Circle(e) => e.trigger(),
        }
    }

    /// At the same sweep coordinate, circle events go first.
    fn rank(&self) -> u8 {
        match self {
            VoronoiEvent::Circle(_) => 0,
            VoronoiEvent::Site(_) => 1,
        }
    }
}

struct Entry {
    id: EventId,
    event: VoronoiEvent,
}

fn entry_cmp(a: &Entry, b: &Entry) -> Ordering {
    let (pa, pb) = (a.event.position(), b.event.position());
    pa.y.total_cmp(&pb.y)
        .then_with(|| a.event.rank().cmp(&b.event.rank()))
        .then_with(|| pa.x.total_cmp(&pb.x))
        .then_with(|| a.id.cmp(&b.id))
}

/// Events ordered by sweep coordinate, with cancellation.
///
/// Ties are broken by kind (circle before site), then by x, then by insertion order, so the order
/// is total and no two events ever compare equal.
///
/// Cancelled events are dropped lazily: they stay in the heap until they reach the top, and are
/// skipped there.
pub struct EventQueue {
    heap: Heap<Entry, fn(&Entry, &Entry) -> Ordering>,
    pending: HashSet<EventId>,
    next_id: u64,
}
impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending.len())
            .field("heap", &self.heap.len())
            .finish()
    }
}
impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
impl EventQueue {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Heap::with_capacity(capacity, entry_cmp as fn(&Entry, &Entry) -> Ordering),
            pending: HashSet::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub fn insert(&mut self, event: VoronoiEvent) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry { id, event });
        self.pending.insert(id);
        id
    }

    /// Remove a pending event. Return `false` if it was already cancelled or popped.
    pub fn cancel(&mut self, id: EventId) -> bool {
        self.pending.remove(&id)
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.pending.contains(&id)
    }

    /// Extract the event with the lowest sweep coordinate, or `None` if the queue is empty.
    pub fn pop_min(&mut self) -> Option<(EventId, VoronoiEvent)> {
        while let Some(Entry { id, event }) = self.heap.pop() {
            if self.pending.remove(&id) {
                return Some((id, event));
            }
        }
        None
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Finds the circumcenter of the triangle formed by the points `a`, `b`, and `c`. Returns `None`
/// if they are collinear, or if the center is too far away to be represented.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    // relative to `a`, to keep the products small
    let b = b - a;
    let c = c - a;
    let d = 2.0 * b.perp_dot(c);

    if d.abs() <= EPSILON * b.length() * c.length() {
        return None;
    }

    let b2 = b.dot(b);
    let c2 = c.dot(c);
    let ux = (c.y * b2 - b.y * c2) / d;
    let uy = (b.x * c2 - c.x * b2) / d;

    let center = a + Point::new(ux, uy);
    center.is_finite().then_some(center)
}
