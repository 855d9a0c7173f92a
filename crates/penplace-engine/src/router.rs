//! Manhattan Router
//!
//! Nets are decomposed into two-terminal connections with a minimum spanning
//! tree over their pins (Manhattan distance), and each connection is routed
//! on a square grid with A*. Component bodies are soft obstacles: entering a
//! cell inside a bbox costs a large penalty but is never forbidden.

use crate::config::RouterConfig;
use crate::error::RoutingError;
use crate::geometry::{Point, Rect};
use crate::placer::PlacedComponent;
use log::{debug, trace, warn};
use penplace_netlist::{Circuit, Net};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

const EPS: f64 = 1e-9;

/// Grid cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn manhattan(&self, other: &GridCell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Rectangular search area with a uniform pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub pitch: f64,
    pub min: GridCell,
    pub max: GridCell,
}

impl Grid {
    pub fn contains(&self, cell: &GridCell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Nearest grid node to `p`.
    pub fn snap(&self, p: &Point) -> GridCell {
        GridCell::new(
            (p.x / self.pitch).round() as i32,
            (p.y / self.pitch).round() as i32,
        )
    }

    pub fn point(&self, cell: &GridCell) -> Point {
        Point::new(cell.x as f64 * self.pitch, cell.y as f64 * self.pitch)
    }

    /// Grid covering `rects` and `points`, grown by `margin` cells.
    pub fn covering(pitch: f64, rects: &[Rect], points: &[Point], margin: i32) -> Self {
        let mut min = GridCell::new(i32::MAX, i32::MAX);
        let mut max = GridCell::new(i32::MIN, i32::MIN);
        let mut include = |x: f64, y: f64| {
            min.x = min.x.min((x / pitch).floor() as i32);
            min.y = min.y.min((y / pitch).floor() as i32);
            max.x = max.x.max((x / pitch).ceil() as i32);
            max.y = max.y.max((y / pitch).ceil() as i32);
        };
        for r in rects {
            include(r.x, r.y);
            include(r.right(), r.bottom());
        }
        for p in points {
            include(p.x, p.y);
        }
        if min.x > max.x {
            min = GridCell::new(0, 0);
            max = GridCell::new(0, 0);
        }
        Self {
            pitch,
            min: GridCell::new(min.x - margin, min.y - margin),
            max: GridCell::new(max.x + margin, max.y + margin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Search state: a cell plus the axis it was entered along, so bend
/// penalties are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    cell: GridCell,
    axis: Option<Axis>,
}

/// A node in the A* open set
#[derive(Debug, Clone, PartialEq)]
struct AStarNode {
    state: State,
    g_cost: f64,
    h_cost: f64,
    seq: usize,
}

impl AStarNode {
    fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }
}

impl Eq for AStarNode {}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; ties go to the node nearer the goal,
        // then to the one pushed first.
        other
            .f_cost()
            .partial_cmp(&self.f_cost())
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.h_cost.partial_cmp(&self.h_cost).unwrap_or(Ordering::Equal))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A successful grid search.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    pub cells: Vec<GridCell>,
    pub cost: f64,
    pub expansions: usize,
}

/// The search hit its expansion cap (or ran out of grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchExhausted {
    pub expansions: usize,
}

const NEIGHBOURS: [(i32, i32, Axis); 4] = [
    (1, 0, Axis::Horizontal),
    (-1, 0, Axis::Horizontal),
    (0, 1, Axis::Vertical),
    (0, -1, Axis::Vertical),
];

/// A* over `grid` from `start` to `goal`.
///
/// Each axis-aligned step costs one pitch plus `obstacle_cost` of the cell
/// entered; changing direction adds `config.bend_penalty` pitches. The
/// heuristic is the Manhattan distance, which never overestimates. At most
/// `config.max_expansions` states are expanded.
pub fn astar<F>(
    grid: &Grid,
    obstacle_cost: F,
    start: GridCell,
    goal: GridCell,
    config: &RouterConfig,
) -> Result<GridPath, SearchExhausted>
where
    F: Fn(&GridCell) -> f64,
{
    let pitch = grid.pitch;
    let bend_cost = config.bend_penalty * pitch;
    let heuristic = |cell: &GridCell| cell.manhattan(&goal) as f64 * pitch;

    let mut open = BinaryHeap::new();
    let mut best: HashMap<State, f64> = HashMap::new();
    let mut came_from: HashMap<State, State> = HashMap::new();
    let mut seq = 0usize;
    let mut expansions = 0usize;

    let start_state = State {
        cell: start,
        axis: None,
    };
    best.insert(start_state, 0.0);
    open.push(AStarNode {
        state: start_state,
        g_cost: 0.0,
        h_cost: heuristic(&start),
        seq,
    });

    while let Some(node) = open.pop() {
        if best
            .get(&node.state)
            .is_some_and(|&g| node.g_cost > g + EPS)
        {
            continue;
        }

        if node.state.cell == goal {
            let mut cells = vec![node.state.cell];
            let mut current = node.state;
            while let Some(prev) = came_from.get(&current) {
                cells.push(prev.cell);
                current = *prev;
            }
            cells.reverse();
            return Ok(GridPath {
                cells,
                cost: node.g_cost,
                expansions,
            });
        }

        if expansions >= config.max_expansions {
            return Err(SearchExhausted { expansions });
        }
        expansions += 1;

        for (dx, dy, axis) in NEIGHBOURS {
            let cell = GridCell::new(node.state.cell.x + dx, node.state.cell.y + dy);
            if !grid.contains(&cell) {
                continue;
            }
            let turn = match node.state.axis {
                Some(previous) if previous != axis => bend_cost,
                _ => 0.0,
            };
            let g_cost = node.g_cost + pitch + turn + obstacle_cost(&cell);
            let state = State {
                cell,
                axis: Some(axis),
            };
            if best.get(&state).is_some_and(|&g| g <= g_cost) {
                continue;
            }
            best.insert(state, g_cost);
            came_from.insert(state, node.state);
            seq += 1;
            open.push(AStarNode {
                state,
                g_cost,
                h_cost: heuristic(&cell),
                seq,
            });
        }
    }

    Err(SearchExhausted { expansions })
}

/// Prim's algorithm over Manhattan distance. Returns `(parent, child)`
/// index pairs in the order the tree grows; ties go to the lower index.
pub fn minimum_spanning_tree(points: &[Point]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let mut in_tree = vec![false; n];
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    in_tree[0] = true;
    for j in 1..n {
        dist[j] = points[0].manhattan(&points[j]);
    }
    for _ in 1..n {
        let mut next = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            match next {
                Some(k) if dist[j] >= dist[k] => {}
                _ => next = Some(j),
            }
        }
        let Some(k) = next else {
            break;
        };
        in_tree[k] = true;
        edges.push((parent[k], k));
        for j in 0..n {
            if !in_tree[j] {
                let d = points[k].manhattan(&points[j]);
                if d < dist[j] {
                    dist[j] = d;
                    parent[j] = k;
                }
            }
        }
    }
    edges
}

/// Direction of `a -> b -> c` when all three lie on one axis-aligned line:
/// `Some(true)` when the line keeps going, `Some(false)` when it doubles back.
fn straight_run(a: &Point, b: &Point, c: &Point) -> Option<bool> {
    let vertical = (a.x - b.x).abs() <= EPS && (b.x - c.x).abs() <= EPS;
    let horizontal = (a.y - b.y).abs() <= EPS && (b.y - c.y).abs() <= EPS;
    if !(vertical || horizontal) {
        return None;
    }
    let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
    Some(dot > 0.0)
}

/// Drop repeated points and interior points of straight runs, including the
/// tip of a dead-end stub where the line doubles back. Points in `keep` are
/// never dropped.
pub fn strip_collinear(points: &[Point], keep: &[Point]) -> Vec<Point> {
    let kept = |p: &Point| keep.iter().any(|k| k.approx_eq(p, EPS));
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        while let [.., a, b] = out.as_slice() {
            if b.approx_eq(p, EPS) {
                break;
            }
            if straight_run(a, b, p).is_none() || kept(b) {
                break;
            }
            out.pop();
        }
        if out.last().is_some_and(|last| last.approx_eq(p, EPS)) {
            continue;
        }
        out.push(*p);
    }
    out
}

/// Join consecutive polylines that meet end-to-start and carry on in the
/// same direction. Points in `pins` survive the join.
fn merge_collinear(polylines: Vec<Vec<Point>>, pins: &[Point]) -> Vec<Vec<Point>> {
    let mut merged: Vec<Vec<Point>> = Vec::with_capacity(polylines.len());
    for line in polylines {
        if let Some(last) = merged.last_mut() {
            if continues_straight(last, &line) {
                last.extend_from_slice(&line[1..]);
                *last = strip_collinear(last, pins);
                continue;
            }
        }
        merged.push(line);
    }
    merged
}

fn continues_straight(a: &[Point], b: &[Point]) -> bool {
    let (Some(end), Some(start)) = (a.last(), b.first()) else {
        return false;
    };
    if a.len() < 2 || b.len() < 2 || !end.approx_eq(start, EPS) {
        return false;
    }
    straight_run(&a[a.len() - 2], end, &b[1]) == Some(true)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedNet {
    pub name: String,
    /// Orthogonal polylines, one per spanning-tree edge unless two edges
    /// continue each other in a straight line.
    pub polylines: Vec<Vec<Point>>,
}

/// Routing results in net declaration order.
#[derive(Debug, Clone, Default)]
pub struct RoutingReport {
    pub routes: Vec<RoutedNet>,
    pub failed: Vec<RoutingError>,
}

/// A* Router
pub struct ManhattanRouter<'p, 'a> {
    placed: &'p [PlacedComponent<'a>],
    config: RouterConfig,
    grid: Grid,
    obstacles: Vec<Rect>,
}

impl<'p, 'a> ManhattanRouter<'p, 'a> {
    pub fn new(placed: &'p [PlacedComponent<'a>], config: RouterConfig) -> Self {
        let obstacles: Vec<Rect> = placed.iter().map(|p| p.bounds()).collect();
        let pins: Vec<Point> = placed.iter().flat_map(|p| p.pins().to_vec()).collect();
        let grid = Grid::covering(config.grid, &obstacles, &pins, config.margin_cells);
        Self {
            placed,
            config,
            grid,
            obstacles,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Route every net of `circuit`. Nets are searched in parallel and the
    /// results collected back in declaration order.
    pub fn route(&self, circuit: &Circuit) -> RoutingReport {
        let results: Vec<Option<Result<RoutedNet, RoutingError>>> =
            circuit.nets.par_iter().map(|net| self.route_net(net)).collect();

        let mut report = RoutingReport::default();
        for result in results.into_iter().flatten() {
            match result {
                Ok(routed) => report.routes.push(routed),
                Err(err) => {
                    warn!("{err}");
                    report.failed.push(err);
                }
            }
        }
        report
    }

    /// Absolute coordinate of one net endpoint, with a label for messages.
    fn endpoint(&self, net: &Net, index: usize) -> Option<(Point, String)> {
        let endpoint = &net.endpoints[index];
        let placed = self
            .placed
            .iter()
            .find(|p| p.reference() == endpoint.component)?;
        let point = placed.pin(endpoint.pin);
        if point.is_none() {
            warn!(
                "net '{}': {} has no pin {}",
                net.name,
                endpoint.component,
                endpoint.pin + 1
            );
        }
        Some((point?, format!("{}.{}", endpoint.component, endpoint.pin_name())))
    }

    /// `None` for nets with fewer than two placed endpoints.
    pub fn route_net(&self, net: &Net) -> Option<Result<RoutedNet, RoutingError>> {
        let terminals: Vec<(Point, String)> = (0..net.endpoints.len())
            .filter_map(|i| self.endpoint(net, i))
            .collect();
        if terminals.len() < 2 {
            trace!("net '{}': single endpoint, skipped", net.name);
            return None;
        }

        let points: Vec<Point> = terminals.iter().map(|(p, _)| *p).collect();
        let mut polylines = Vec::new();
        let mut expansions = 0;
        for (a, b) in minimum_spanning_tree(&points) {
            match self.connect(&points[a], &points[b]) {
                Ok((line, used)) => {
                    expansions += used;
                    if line.len() >= 2 {
                        polylines.push(line);
                    }
                }
                Err(exhausted) => {
                    return Some(Err(RoutingError::RouteNotFound {
                        net: net.name.clone(),
                        from: terminals[a].1.clone(),
                        to: terminals[b].1.clone(),
                        expansions: exhausted.expansions,
                    }));
                }
            }
        }

        let polylines = merge_collinear(polylines, &points);
        debug!(
            "net '{}': {} polylines, {} expansions",
            net.name,
            polylines.len(),
            expansions
        );
        Some(Ok(RoutedNet {
            name: net.name.clone(),
            polylines,
        }))
    }

    /// Route one two-terminal connection between true pin coordinates.
    fn connect(&self, from: &Point, to: &Point) -> Result<(Vec<Point>, usize), SearchExhausted> {
        let start = self.grid.snap(from);
        let goal = self.grid.snap(to);
        let penalty = self.config.obstacle_penalty * self.grid.pitch;
        let cost = |cell: &GridCell| {
            if *cell == start || *cell == goal {
                return 0.0;
            }
            let p = self.grid.point(cell);
            if self.obstacles.iter().any(|r| r.contains_strictly(&p)) {
                penalty
            } else {
                0.0
            }
        };
        let path = astar(&self.grid, cost, start, goal, &self.config)?;

        let mut points = vec![*from];
        let first = self.grid.point(&start);
        if (from.x - first.x).abs() > EPS && (from.y - first.y).abs() > EPS {
            points.push(Point::new(first.x, from.y));
        }
        points.extend(path.cells.iter().map(|c| self.grid.point(c)));
        let last = self.grid.point(&goal);
        if (to.x - last.x).abs() > EPS && (to.y - last.y).abs() > EPS {
            points.push(Point::new(last.x, to.y));
        }
        points.push(*to);

        Ok((strip_collinear(&points, &[*from, *to]), path.expansions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> Grid {
        Grid {
            pitch: 10.0,
            min: GridCell::new(-5, -5),
            max: GridCell::new(20, 20),
        }
    }

    fn length(points: &[Point]) -> f64 {
        points.windows(2).map(|w| w[0].manhattan(&w[1])).sum()
    }

    #[test]
    fn unobstructed_connection_is_an_l() {
        let grid = open_grid();
        let config = RouterConfig::default();
        let path = astar(
            &grid,
            |_| 0.0,
            GridCell::new(0, 0),
            GridCell::new(10, 5),
            &config,
        )
        .unwrap();
        let points: Vec<Point> = path.cells.iter().map(|c| grid.point(c)).collect();
        let line = strip_collinear(&points, &[]);
        assert_eq!(line.len(), 3, "{line:?}");
        assert_eq!(length(&line), 150.0);
        assert_eq!(path.cost, 150.0 + 0.5 * 10.0);
    }

    #[test]
    fn soft_obstacle_is_avoided_when_possible() {
        let grid = open_grid();
        let config = RouterConfig::default();
        // Wall across the direct line, open at y = -3.
        let wall = |c: &GridCell| {
            if c.x == 5 && c.y >= -2 {
                1000.0
            } else {
                0.0
            }
        };
        let path = astar(&grid, wall, GridCell::new(0, 0), GridCell::new(10, 0), &config).unwrap();
        assert!(path.cells.iter().all(|c| !(c.x == 5 && c.y >= -2)));
    }

    #[test]
    fn soft_obstacle_never_blocks() {
        let grid = open_grid();
        let config = RouterConfig::default();
        let everywhere = |_: &GridCell| 1000.0;
        let path = astar(&grid, everywhere, GridCell::new(0, 0), GridCell::new(3, 0), &config);
        assert!(path.is_ok());
    }

    #[test]
    fn expansion_cap_terminates_search() {
        let grid = open_grid();
        let config = RouterConfig {
            max_expansions: 5,
            ..RouterConfig::default()
        };
        let err = astar(&grid, |_| 0.0, GridCell::new(0, 0), GridCell::new(15, 15), &config)
            .unwrap_err();
        assert_eq!(err.expansions, 5);
    }

    #[test]
    fn mst_prefers_short_edges() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(110.0, 10.0),
        ];
        assert_eq!(minimum_spanning_tree(&points), vec![(0, 2), (2, 1), (1, 3)]);
    }

    #[test]
    fn collinear_points_are_stripped() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
        ];
        assert_eq!(
            strip_collinear(&line, &[]),
            vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(20.0, 10.0)]
        );
    }

    #[test]
    fn pin_at_a_turnaround_is_kept() {
        let pin = Point::new(83.5, 6.0);
        let line = [
            Point::new(80.0, 0.0),
            Point::new(80.0, 6.0),
            pin,
            Point::new(80.0, 6.0),
            Point::new(80.0, 106.0),
        ];
        assert_eq!(strip_collinear(&line, &[pin]), line.to_vec());
    }

    #[test]
    fn dead_end_stub_is_dropped() {
        // Grid node overshoots the pin at (80, 6).
        let line = [
            Point::new(0.0, 0.0),
            Point::new(80.0, 0.0),
            Point::new(80.0, 10.0),
            Point::new(80.0, 6.0),
            Point::new(83.5, 6.0),
        ];
        assert_eq!(
            strip_collinear(&line, &[]),
            vec![
                Point::new(0.0, 0.0),
                Point::new(80.0, 0.0),
                Point::new(80.0, 6.0),
                Point::new(83.5, 6.0),
            ]
        );
    }

    #[test]
    fn straight_continuations_merge() {
        let a = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let b = vec![Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
        let c = vec![Point::new(20.0, 0.0), Point::new(20.0, 10.0)];
        let merged = merge_collinear(vec![a, b, c], &[]);
        assert_eq!(
            merged,
            vec![
                vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)],
                vec![Point::new(20.0, 0.0), Point::new(20.0, 10.0)],
            ]
        );
    }

    #[test]
    fn doubling_back_is_not_a_continuation() {
        let pin = Point::new(83.5, 6.0);
        let a = vec![Point::new(80.0, 0.0), Point::new(80.0, 6.0), pin];
        let b = vec![pin, Point::new(80.0, 6.0), Point::new(80.0, 106.0)];
        let merged = merge_collinear(vec![a.clone(), b.clone()], &[pin]);
        assert_eq!(merged, vec![a, b]);
    }

    #[test]
    fn merged_lines_keep_the_pin_they_pass_through() {
        let pin = Point::new(10.0, 0.0);
        let a = vec![Point::new(0.0, 0.0), pin];
        let b = vec![pin, Point::new(20.0, 0.0)];
        let merged = merge_collinear(vec![a, b], &[pin]);
        assert_eq!(
            merged,
            vec![vec![Point::new(0.0, 0.0), pin, Point::new(20.0, 0.0)]]
        );
    }

    #[test]
    fn grid_covers_inputs_with_margin() {
        let grid = Grid::covering(
            10.0,
            &[Rect::new(0.0, 0.0, 40.0, 12.0)],
            &[Point::new(-3.0, 6.0)],
            4,
        );
        assert_eq!(grid.min, GridCell::new(-5, -4));
        assert_eq!(grid.max, GridCell::new(8, 6));
    }
}
