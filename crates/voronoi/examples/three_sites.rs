//! Three-site walkthrough: prints the single Voronoi vertex and the three
//! unbounded edges of `{(0,0), (4,0), (2,4)}`.
//!
//! No tracing subscriber is installed, so the core's events stay silent.

use voronoi::prelude::*;

fn main() -> Result<(), VoronoiError> {
    let sites = vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(2.0, 4.0)];
    let diagram = compute(&sites)?;

    for v in diagram.vertices() {
        println!("vertex ({:.3}, {:.3})", v.x, v.y);
    }
    for seg in diagram.edge_segments() {
        println!(
            "edge {}|{}: ({:.3}, {:.3}) -> ({:.3}, {:.3}){}",
            seg.left.0,
            seg.right.0,
            seg.from.x,
            seg.from.y,
            seg.to.x,
            seg.to.y,
            if seg.bounded { "" } else { "  [truncated]" }
        );
    }
    for s in 0..sites.len() {
        let cell = diagram.cell_ccw(SiteId(s));
        println!("cell {s}: {} half-edges", cell.len());
    }
    println!("{:?}", diagram.stats());
    Ok(())
}
