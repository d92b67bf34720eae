use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::beachline::{ArcId, ArcStamp, Beachline};
use crate::diagram::{Diagram, VertexIdx};
use crate::event::{CircleEvent, EventId, EventQueue, SiteEvent, VoronoiEvent};
use crate::{debugln, Point, SiteIdx, VoronoiError, MAX_COORDINATE};

/// What to do with sites that have exactly the same coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`VoronoiError::Duplicate`].
    #[default]
    Reject,
    /// Keep the first occurrence. Later ones take no part in the sweep and own no edges.
    Skip,
}

#[derive(Clone, Debug, Default)]
pub struct SweepOptions {
    pub duplicates: DuplicatePolicy,
}

/// Counters collected while sweeping.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepStats {
    pub site_events: usize,
    /// Circle events that fired, one per vertex.
    pub circle_events: usize,
    /// Circle events that reached the top of the queue after one of their arcs changed.
    pub stale_circle_events: usize,
    /// Circle events removed from the queue before firing.
    pub cancelled_circle_events: usize,
    /// Arc triples that produced no circle event (collinear or diverging breakpoints).
    pub discarded_candidates: usize,
}

/// The event that was just processed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ProcessedEvent {
    Site(SiteIdx),
    Circle { center: Point, sites: [SiteIdx; 3] },
}

/// A snapshot of the sweep, handed to the progress callback after each event.
pub struct Progress<'a> {
    pub event: ProcessedEvent,
    pub sweep_y: f64,
    pub beachline: &'a Beachline,
    pub pending_events: usize,
    pub vertices: &'a [Point],
    pub stats: &'a SweepStats,
}

/// Compute the Voronoi diagram of `sites`.
pub fn compute(sites: &[Point]) -> Result<Diagram, VoronoiError> {
    compute_with(sites, &SweepOptions::default(), &mut |_| {})
}

/// Fortune's sweepline algorithm, calling `on_progress` after each processed event.
///
/// References:
/// - S.J. Fortune, A sweepline algorithm for Voronoi diagrams, Algorithmica 2 (1987), 153–174.
/// - M. de Berg et al., Computational Geometry: Algorithms and Applications, chapter 7.
pub fn fortune_algorithm(
    sites: &[Point],
    on_progress: &mut impl FnMut(&Progress<'_>),
) -> Result<Diagram, VoronoiError> {
    compute_with(sites, &SweepOptions::default(), on_progress)
}

pub fn compute_with(
    sites: &[Point],
    options: &SweepOptions,
    on_progress: &mut impl FnMut(&Progress<'_>),
) -> Result<Diagram, VoronoiError> {
    let seeds = validate(sites, options)?;
    let mut sweep = Fortune::new(sites, seeds.len());
    sweep.run(&seeds, on_progress);
    Ok(sweep.finish())
}

/// Check the input, and return the sites that take part in the sweep.
fn validate(sites: &[Point], options: &SweepOptions) -> Result<Vec<SiteIdx>, VoronoiError> {
    if sites.is_empty() {
        return Err(VoronoiError::Empty);
    }
    if sites.len() > SiteIdx::MAX as usize {
        return Err(VoronoiError::TooManySites {
            count: sites.len(),
            max: SiteIdx::MAX as usize,
        });
    }
    if let Some(index) = sites.iter().position(|p| !p.is_finite()) {
        return Err(VoronoiError::NonFinite {
            index: index as SiteIdx,
        });
    }
    if let Some(index) = sites
        .iter()
        .position(|p| p.x.abs() > MAX_COORDINATE || p.y.abs() > MAX_COORDINATE)
    {
        return Err(VoronoiError::OutOfRange {
            index: index as SiteIdx,
            max: MAX_COORDINATE,
        });
    }

    let mut order: Vec<SiteIdx> = (0..sites.len() as SiteIdx).collect();
    order.sort_by(|&a, &b| sites[a as usize].cmp(&sites[b as usize]).then(a.cmp(&b)));

    let mut seeds = Vec::with_capacity(sites.len());
    let mut first = order[0];
    seeds.push(first);
    for &i in &order[1..] {
        if sites[i as usize] != sites[first as usize] {
            first = i;
            seeds.push(i);
            continue;
        }
        match options.duplicates {
            DuplicatePolicy::Reject => {
                return Err(VoronoiError::Duplicate { index: i, first });
            }
            DuplicatePolicy::Skip => debugln!("skipping site {}, same as {}", i, first),
        }
    }

    Ok(seeds)
}

struct Fortune<'a> {
    sites: &'a [Point],
    queue: EventQueue,
    beachline: Beachline,
    vertices: Vec<Point>,
    /// Circle events that must be cancelled when an arc changes.
    waiting: HashMap<ArcId, Vec<(EventId, [ArcStamp; 3])>>,
    /// The live circle event of each triple of arcs.
    triples: HashMap<[ArcStamp; 3], EventId>,
    stats: SweepStats,
}
impl<'a> Fortune<'a> {
    fn new(sites: &'a [Point], capacity: usize) -> Self {
        Self {
            sites,
            queue: EventQueue::with_capacity(capacity * 2),
            beachline: Beachline::new(),
            vertices: Vec::with_capacity(capacity * 2),
            waiting: HashMap::new(),
            triples: HashMap::new(),
            stats: SweepStats::default(),
        }
    }

    fn run(&mut self, seeds: &[SiteIdx], on_progress: &mut impl FnMut(&Progress<'_>)) {
        for &site in seeds {
            self.queue.insert(VoronoiEvent::Site(SiteEvent {
                site,
                position: self.sites[site as usize],
            }));
        }

        while let Some((id, event)) = self.queue.pop_min() {
            debugln!("event {:?} {:?} in {:?}", id, event, self.beachline);
            let processed = match event {
                VoronoiEvent::Site(e) => {
                    self.site_event(e);
                    ProcessedEvent::Site(e.site)
                }
                VoronoiEvent::Circle(e) => {
                    if !self.circle_event(e) {
                        continue;
                    }
                    ProcessedEvent::Circle {
                        center: e.center,
                        sites: e.sites,
                    }
                }
            };

            on_progress(&Progress {
                event: processed,
                sweep_y: self.beachline.sweep_position(),
                beachline: &self.beachline,
                pending_events: self.queue.len(),
                vertices: &self.vertices,
                stats: &self.stats,
            });
        }
    }

    fn site_event(&mut self, event: SiteEvent) {
        self.stats.site_events += 1;

        let insertion = self.beachline.add_arc(self.sites, event.site);
        self.waiting.entry(insertion.arc).or_default();

        // The split arc now ends somewhere else, every event that involves it is wrong.
        if let Some(split) = insertion.split {
            self.cancel_waiting(split);
        }

        let i = insertion.index;
        self.check_triplets(i.saturating_sub(2)..=i + 2);
    }

    /// Return `false` if the event was stale and nothing was done.
    fn circle_event(&mut self, event: CircleEvent) -> bool {
        self.triples.remove(&event.arcs);

        if !event.is_current(&self.beachline) {
            debugln!("stale circle event {:?}", event);
            self.stats.stale_circle_events += 1;
            return false;
        }

        self.stats.circle_events += 1;
        self.beachline.advance_sweep(event.trigger().y);

        let vertex = self.vertices.len() as VertexIdx;
        self.vertices.push(event.center);
        debugln!("vertex {} {:?} of sites {:?}", vertex, event.center, event.sites);

        let middle = event.middle();
        let arc = self.beachline.arc(middle);
        let (Some(left), Some(right)) = (arc.left, arc.right) else {
            panic!("circle event on arc {:?} without both neighbors", middle);
        };
        self.beachline.record_vertex(left, vertex);
        self.beachline.record_vertex(right, vertex);

        self.cancel_waiting(middle);
        let left = self.beachline.delete_arc(self.sites, middle, vertex);

        self.check_triplets(left..=left + 1);
        true
    }

    /// Cancel all pending circle events that involve `arc`, and forget them in the lists of the
    /// other two arcs.
    fn cancel_waiting(&mut self, arc: ArcId) {
        let Some(events) = self.waiting.remove(&arc) else {
            return;
        };
        for (id, stamps) in events {
            self.triples.remove(&stamps);
            if self.queue.cancel(id) {
                debugln!("cancelled {:?}", id);
                self.stats.cancelled_circle_events += 1;
            }
            for other in stamps.iter().map(|s| s.id).filter(|&a| a != arc) {
                if let Some(list) = self.waiting.get_mut(&other) {
                    list.retain(|&(e, _)| e != id);
                }
            }
        }
    }

    /// Queue the circle events of the triples whose middle arc index is in `middles`.
    fn check_triplets(&mut self, middles: RangeInclusive<usize>) {
        for middle in middles {
            if let Some(triple) = self.beachline.triplet_at(middle) {
                self.add_circle_event(triple);
            }
        }
    }

    fn add_circle_event(&mut self, triple: [ArcId; 3]) {
        let stamps = triple.map(|id| self.beachline.stamp(id));
        if self.triples.contains_key(&stamps) {
            return;
        }

        let sweep_y = self.beachline.sweep_position();
        let Some(event) = CircleEvent::new(self.sites, &self.beachline, triple, sweep_y) else {
            self.stats.discarded_candidates += 1;
            return;
        };

        let id = self.queue.insert(VoronoiEvent::Circle(event));
        debugln!("circle event {:?} at {:?}", id, event.trigger());
        self.triples.insert(stamps, id);
        for arc in triple {
            self.waiting.entry(arc).or_default().push((id, stamps));
        }
    }

    fn finish(self) -> Diagram {
        log::debug!(
            "swept {} sites: {} vertices, {:?}",
            self.sites.len(),
            self.vertices.len(),
            self.stats
        );
        Diagram::new(
            self.sites.to_vec(),
            self.vertices,
            self.beachline.into_edges(),
            self.stats,
        )
    }
}
