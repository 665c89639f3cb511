//! Event queue: site and circle events in sweep order, lazy invalidation.
//!
//! Order (total): larger `y` first (the sweep descends), then smaller `x`, then
//! circle events before site events at the same point, then insertion order.
//! Coordinates are finite by the time they get here, so `f64::total_cmp` is a
//! plain numeric order.
//!
//! Circle events are never removed from the heap. `invalidate` flips their
//! `valid` flag and `pop` skips them; either flanking breakpoint may do so.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Vector2;

use crate::geom2::{Circle, SiteId};

/// Index of a circle event in the queue's record table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CircleId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteEvent {
    pub site: SiteId,
    pub point: Vector2<f64>,
}

/// Predicted disappearance of the middle arc of `triple`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleEvent {
    pub id: CircleId,
    /// Sites of three consecutive arcs, left to right.
    pub triple: [SiteId; 3],
    pub center: Vector2<f64>,
    pub radius: f64,
    pub lowest: Vector2<f64>,
    pub valid: bool,
}

impl CircleEvent {
    pub fn circle(&self) -> Circle {
        Circle {
            center: self.center,
            radius: self.radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Site(SiteEvent),
    Circle(CircleEvent),
}

impl Event {
    /// Point at which the sweep line triggers this event.
    pub fn point(&self) -> Vector2<f64> {
        match self {
            Event::Site(s) => s.point,
            Event::Circle(c) => c.lowest,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Payload {
    Site(SiteEvent),
    Circle(CircleId),
}

#[derive(Clone, Copy, Debug)]
struct Queued {
    point: Vector2<f64>,
    seq: u64,
    payload: Payload,
}

impl Queued {
    #[inline]
    fn rank(&self) -> u8 {
        match self.payload {
            Payload::Circle(_) => 1,
            Payload::Site(_) => 0,
        }
    }
}

impl Ord for Queued {
    /// "Greater" pops first from the max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        self.point
            .y
            .total_cmp(&other.point.y)
            .then_with(|| other.point.x.total_cmp(&self.point.x))
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

/// Max-priority queue over sweep order with lazily invalidated circle events.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Queued>,
    circles: Vec<CircleEvent>,
    seq: u64,
    stale_skipped: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue seeded with one site event per input point.
    pub fn with_sites(sites: &[Vector2<f64>]) -> Self {
        let mut q = Self::new();
        q.heap.reserve(sites.len());
        for (i, &p) in sites.iter().enumerate() {
            q.push_site(SiteId(i), p);
        }
        q
    }

    pub fn push_site(&mut self, site: SiteId, point: Vector2<f64>) {
        let seq = self.next_seq();
        self.heap.push(Queued {
            point,
            seq,
            payload: Payload::Site(SiteEvent { site, point }),
        });
    }

    /// Schedule the disappearance of the middle arc of `triple`.
    pub fn push_circle(&mut self, triple: [SiteId; 3], circle: Circle) -> CircleId {
        let id = CircleId(self.circles.len());
        let lowest = circle.lowest_point();
        self.circles.push(CircleEvent {
            id,
            triple,
            center: circle.center,
            radius: circle.radius,
            lowest,
            valid: true,
        });
        let seq = self.next_seq();
        self.heap.push(Queued {
            point: lowest,
            seq,
            payload: Payload::Circle(id),
        });
        id
    }

    /// Mark a circle event stale. Returns whether it was still valid.
    pub fn invalidate(&mut self, id: CircleId) -> bool {
        let c = &mut self.circles[id.0];
        std::mem::replace(&mut c.valid, false)
    }

    pub fn circle(&self, id: CircleId) -> &CircleEvent {
        &self.circles[id.0]
    }

    #[inline]
    pub fn is_valid(&self, id: CircleId) -> bool {
        self.circles[id.0].valid
    }

    /// Next live event; invalidated circle events are dropped on the way.
    pub fn pop(&mut self) -> Option<Event> {
        while let Some(q) = self.heap.pop() {
            match q.payload {
                Payload::Site(s) => return Some(Event::Site(s)),
                Payload::Circle(id) => {
                    let c = self.circles[id.0];
                    if c.valid {
                        return Some(Event::Circle(c));
                    }
                    self.stale_skipped += 1;
                }
            }
        }
        None
    }

    /// Entries still in the heap, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Circle events dropped by `pop` so far.
    pub fn stale_skipped(&self) -> usize {
        self.stale_skipped
    }

    /// Circle events ever scheduled.
    pub fn circles_scheduled(&self) -> usize {
        self.circles.len()
    }

    #[inline]
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}
