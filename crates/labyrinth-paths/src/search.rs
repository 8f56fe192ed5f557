use labyrinth_core::{Dir, Point};

use crate::pathtree::{NO_NODE, PathNode, PathTree};
use crate::render::render_path;
use crate::view::{CellState, GridView};
use crate::visited::Visited;

/// Goal selection for one search.
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    /// A cell the avatar has not stood on yet that touches fog.
    NearestFrontier(&'a Visited),
    /// A specific cell (the control room, or the entry on the way back).
    SeekTarget(Point),
}

impl Query<'_> {
    #[inline]
    fn matches(&self, view: &GridView, p: Point) -> bool {
        match *self {
            Query::NearestFrontier(visited) => {
                !visited.is_visited(p) && view.has_neighbor(p, CellState::Fog)
            }
            Query::SeekTarget(target) => p == target,
        }
    }
}

impl PathTree {
    /// Run one breadth-first search over `view` from `start`.
    ///
    /// The root node is always created for an in-bounds `start`, but it is
    /// only expanded when the start cell itself is open. Neighbours are
    /// expanded left, right, up, down and marked visited when enqueued, so
    /// nodes are discovered in non-decreasing distance order.
    ///
    /// With `stop_on_first_match` the first node satisfying `query` becomes
    /// the goal and the search returns immediately; this is the nearest
    /// match. Otherwise the whole reachable area is traversed and the last
    /// match is kept.
    pub fn search(
        &mut self,
        view: &GridView,
        start: Point,
        query: Query<'_>,
        stop_on_first_match: bool,
    ) -> Option<PathNode> {
        self.reset(view.bounds());
        let si = self.idx(start)?;

        self.slots[si] = 0;
        self.nodes.push(PathNode {
            pos: start,
            distance: 0,
            parent: None,
        });
        if view.is_open(start) {
            self.queue.push_back(0);
        }

        while let Some(ci) = self.queue.pop_front() {
            let current = self.nodes[ci];

            if query.matches(view, current.pos) {
                self.goal = Some(ci);
                if stop_on_first_match {
                    break;
                }
            }

            for np in current.pos.neighbors_4() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                if self.slots[ni] != NO_NODE || !view.is_open(np) {
                    continue;
                }
                let id = self.nodes.len();
                self.slots[ni] = id;
                self.nodes.push(PathNode {
                    pos: np,
                    distance: current.distance + 1,
                    parent: Some(ci),
                });
                self.queue.push_back(id);
            }
        }

        log::trace!(
            "search from {}: {} nodes, goal {:?}",
            start,
            self.nodes.len(),
            self.goal_node().map(|n| (n.pos, n.distance))
        );
        self.goal_node()
    }

    /// Displacement of the first move from the root toward the goal.
    ///
    /// Returns `None` when there is no goal, or when the goal is the root
    /// itself (nothing to do).
    pub fn first_step(&self) -> Option<Point> {
        let mut child = self.goal_node()?;
        let mut parent = self.nodes[child.parent?];
        while let Some(up) = parent.parent {
            child = parent;
            parent = self.nodes[up];
        }
        Some(child.pos - parent.pos)
    }

    /// [`first_step`](Self::first_step) as a move token.
    pub fn first_dir(&self) -> Option<Dir> {
        self.first_step().map(Dir::from_vector)
    }

    /// Cells from the start to the goal, both included. Empty without a
    /// goal.
    pub fn path(&self) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cur = self.goal;
        while let Some(i) = cur {
            let node = self.nodes[i];
            path.push(node.pos);
            cur = node.parent;
        }
        path.reverse();
        path
    }

    /// First step toward the nearest cell the avatar has not visited yet
    /// that borders fog.
    pub fn find_path_to_nearest_unvisited(
        &mut self,
        view: &GridView,
        visited: &Visited,
        start: Point,
    ) -> Option<Point> {
        self.search(view, start, Query::NearestFrontier(visited), true);
        self.log_path(view);
        self.first_step()
    }

    /// First step toward `target`.
    pub fn find_path_to_target(
        &mut self,
        view: &GridView,
        start: Point,
        target: Point,
    ) -> Option<Point> {
        self.search(view, start, Query::SeekTarget(target), true);
        self.log_path(view);
        self.first_step()
    }

    fn log_path(&self, view: &GridView) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for row in render_path(view, self) {
            log::debug!("{row}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use labyrinth_core::Range;
    use proptest::prelude::*;

    use super::*;

    fn view(s: &str) -> GridView {
        s.parse().unwrap()
    }

    /// Reference BFS over open cells: distance of every cell from `from`.
    fn brute_force(v: &GridView, from: Point) -> Vec<Option<u32>> {
        let w = v.cols();
        let idx = |p: Point| (p.y * w + p.x) as usize;
        let mut dist = vec![None; v.bounds().len()];
        if !v.is_open(from) {
            return dist;
        }
        dist[idx(from)] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(p) = queue.pop_front() {
            let d = dist[idx(p)].unwrap();
            for n in p.neighbors_4() {
                if v.is_open(n) && dist[idx(n)].is_none() {
                    dist[idx(n)] = Some(d + 1);
                    queue.push_back(n);
                }
            }
        }
        dist
    }

    fn exhaust(tree: &mut PathTree, v: &GridView, start: Point) {
        tree.search(v, start, Query::SeekTarget(Point::new(-1, -1)), true);
    }

    const MAZE: &str = "\
#########
#T..#...#
#.#.#.#.#
#.#...#.#
#.#####.#
#...C...#
#########";

    #[test]
    fn distances_match_reference_bfs() {
        let v = view(MAZE);
        let start = Point::new(1, 1);
        let mut tree = PathTree::new();
        exhaust(&mut tree, &v, start);
        let reference = brute_force(&v, start);
        for p in v.bounds() {
            let expected = reference[(p.y * v.cols() + p.x) as usize];
            assert_eq!(tree.distance_at(p), expected, "distance mismatch at {p}");
        }
    }

    #[test]
    fn one_node_per_cell() {
        let v = view(MAZE);
        let mut tree = PathTree::new();
        exhaust(&mut tree, &v, Point::new(1, 1));
        let unique: HashSet<Point> = tree.nodes().iter().map(|n| n.pos).collect();
        assert_eq!(unique.len(), tree.node_count());
        let open = v.iter().filter(|(_, c)| c.is_traversable()).count();
        assert_eq!(tree.node_count(), open);
    }

    #[test]
    fn nodes_are_discovered_in_distance_order() {
        let v = view(MAZE);
        let mut tree = PathTree::new();
        exhaust(&mut tree, &v, Point::new(1, 1));
        let d: Vec<u32> = tree.nodes().iter().map(|n| n.distance).collect();
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tree.root().unwrap().parent, None);
        for n in &tree.nodes()[1..] {
            let parent = tree.nodes()[n.parent.unwrap()];
            assert_eq!(parent.distance + 1, n.distance);
            assert!((n.pos - parent.pos).is_unit_cardinal());
        }
    }

    #[test]
    fn seek_target_through_maze() {
        let v = view(MAZE);
        let start = Point::new(1, 1);
        let target = v.find_marker(CellState::Target).unwrap();
        let mut tree = PathTree::new();
        let goal = tree
            .search(&v, start, Query::SeekTarget(target), true)
            .unwrap();
        assert_eq!(goal.pos, target);
        assert_eq!(goal.distance, 7);
        assert_eq!(tree.first_dir(), Some(Dir::Down));
        let path = tree.path();
        assert_eq!(path.len(), 8);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&target));
    }

    #[test]
    fn first_step_decreases_remaining_distance() {
        let v = view(MAZE);
        let target = Point::new(4, 5);
        let to_target = brute_force(&v, target);
        let d = |p: Point| to_target[(p.y * v.cols() + p.x) as usize];
        let mut tree = PathTree::new();
        for start in v.bounds() {
            if !v.is_open(start) || start == target {
                continue;
            }
            let step = tree.find_path_to_target(&v, start, target).unwrap();
            assert!(step.is_unit_cardinal());
            assert_eq!(d(start + step).unwrap() + 1, d(start).unwrap());
        }
    }

    #[test]
    fn search_is_idempotent() {
        let v = view(MAZE);
        let start = Point::new(7, 1);
        let target = Point::new(1, 5);
        let mut tree = PathTree::new();
        let a = tree.search(&v, start, Query::SeekTarget(target), true);
        let step_a = tree.first_step();
        let nodes_a = tree.nodes().to_vec();
        let b = tree.search(&v, start, Query::SeekTarget(target), true);
        assert_eq!(a, b);
        assert_eq!(step_a, tree.first_step());
        assert_eq!(nodes_a, tree.nodes());

        let mut fresh = PathTree::new();
        assert_eq!(fresh.search(&v, start, Query::SeekTarget(target), true), a);
    }

    #[test]
    fn unreachable_target() {
        let v = view(
            "\
.....
.###.
.#C#.
.###.
.....",
        );
        let mut tree = PathTree::new();
        let goal = tree.search(&v, Point::new(0, 0), Query::SeekTarget(Point::new(2, 2)), true);
        assert_eq!(goal, None);
        assert_eq!(tree.first_step(), None);
        assert_eq!(tree.node_count(), 16);
        assert!(tree.path().is_empty());
        assert_eq!(
            tree.find_path_to_target(&v, Point::new(0, 0), Point::new(2, 2)),
            None
        );
    }

    #[test]
    fn target_on_wall_or_outside() {
        let v = view("..#");
        let mut tree = PathTree::new();
        assert_eq!(tree.find_path_to_target(&v, Point::ZERO, Point::new(2, 0)), None);
        assert_eq!(tree.find_path_to_target(&v, Point::ZERO, Point::new(5, 0)), None);
    }

    #[test]
    fn start_out_of_bounds_creates_nothing() {
        let v = view("...");
        let mut tree = PathTree::new();
        assert_eq!(
            tree.search(&v, Point::new(3, 0), Query::SeekTarget(Point::ZERO), true),
            None
        );
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn blocked_start_is_root_but_never_expanded() {
        let mut tree = PathTree::new();
        for grid in ["#.C", "?.C"] {
            let v = view(grid);
            let goal = tree.search(&v, Point::ZERO, Query::SeekTarget(Point::new(2, 0)), true);
            assert_eq!(goal, None);
            assert_eq!(tree.node_count(), 1);
            assert_eq!(tree.root().map(|n| n.pos), Some(Point::ZERO));
            // Not even the root itself is tested against the query.
            assert_eq!(
                tree.search(&v, Point::ZERO, Query::SeekTarget(Point::ZERO), true),
                None
            );
        }
    }

    #[test]
    fn already_on_target() {
        let v = view("#####\n#.C.#\n#####");
        let mut tree = PathTree::new();
        let goal = tree
            .search(&v, Point::new(2, 1), Query::SeekTarget(Point::new(2, 1)), true)
            .unwrap();
        assert_eq!(goal.distance, 0);
        assert_eq!(tree.goal(), Some(0));
        assert_eq!(tree.first_step(), None);
        assert_eq!(
            Dir::from_vector(tree.first_step().unwrap_or_default()),
            Dir::None
        );
        assert_eq!(tree.path(), vec![Point::new(2, 1)]);
    }

    #[test]
    fn bordered_room_walk_to_corner() {
        let v = view(
            "\
#####
#C..#
#...#
#...#
#####",
        );
        let target = Point::new(1, 1);
        let mut tree = PathTree::new();
        let mut pos = Point::new(2, 2);
        let mut moves = Vec::new();
        let mut remaining = 2;
        while let Some(step) = tree.find_path_to_target(&v, pos, target) {
            pos = pos + step;
            moves.push(Dir::from_vector(step));
            remaining -= 1;
            assert_eq!(tree.goal_node().unwrap().distance, remaining + 1);
        }
        assert_eq!(pos, target);
        assert_eq!(moves, vec![Dir::Left, Dir::Up]);
    }

    #[test]
    fn open_room_walk_to_origin() {
        let v = view("C....\n.....\n.....\n.....\n.....");
        let target = Point::ZERO;
        let mut tree = PathTree::new();
        let mut pos = Point::new(2, 2);
        let mut moves = Vec::new();
        let mut last = u32::MAX;
        while let Some(step) = tree.find_path_to_target(&v, pos, target) {
            let d = tree.goal_node().unwrap().distance;
            assert!(d < last);
            last = d;
            pos = pos + step;
            moves.push(Dir::from_vector(step));
        }
        assert_eq!(pos, target);
        assert_eq!(moves.len(), 4);
        assert_eq!(moves[0], Dir::Left);
        assert_eq!(tree.distance_at(target), Some(0));
    }

    #[test]
    fn frontier_tie_prefers_left_over_right() {
        let v = view("?...?");
        let start = Point::new(2, 0);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        let mut tree = PathTree::new();
        let step = tree.find_path_to_nearest_unvisited(&v, &visited, start);
        assert_eq!(step, Some(Point::new(-1, 0)));
        assert_eq!(tree.goal_node().unwrap().pos, Point::new(1, 0));
    }

    #[test]
    fn frontier_tie_prefers_left_over_up() {
        let v = view("##?##\n##.##\n?...#");
        let start = Point::new(2, 2);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        let mut tree = PathTree::new();
        tree.find_path_to_nearest_unvisited(&v, &visited, start);
        assert_eq!(tree.first_dir(), Some(Dir::Left));
    }

    #[test]
    fn frontier_tie_prefers_up_over_down() {
        let v = view("?\n.\n.\n.\n?");
        let start = Point::new(0, 2);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        let mut tree = PathTree::new();
        tree.find_path_to_nearest_unvisited(&v, &visited, start);
        assert_eq!(tree.first_dir(), Some(Dir::Up));
    }

    #[test]
    fn frontier_skips_visited_cells() {
        let v = view("?...?");
        let start = Point::new(2, 0);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        visited.mark(Point::new(1, 0));
        let mut tree = PathTree::new();
        let step = tree.find_path_to_nearest_unvisited(&v, &visited, start);
        assert_eq!(step.map(Dir::from_vector), Some(Dir::Right));
    }

    #[test]
    fn frontier_is_at_minimal_distance() {
        let v = view(
            "\
#######
#.....?
#.###.#
#..T..#
#######",
        );
        let start = Point::new(3, 3);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        let mut tree = PathTree::new();
        let goal = tree
            .search(&v, start, Query::NearestFrontier(&visited), true)
            .unwrap();
        assert_eq!(goal.pos, Point::new(5, 1));
        assert_eq!(goal.distance, 4);
        assert_eq!(tree.first_dir(), Some(Dir::Right));
    }

    #[test]
    fn no_frontier_left() {
        let v = view("#####\n#...#\n#####");
        let visited = Visited::new(v.bounds());
        let mut tree = PathTree::new();
        assert_eq!(
            tree.find_path_to_nearest_unvisited(&v, &visited, Point::new(1, 1)),
            None
        );
    }

    #[test]
    fn unvisited_start_next_to_fog_is_its_own_goal() {
        let v = view("?..");
        let visited = Visited::new(v.bounds());
        let mut tree = PathTree::new();
        assert_eq!(
            tree.find_path_to_nearest_unvisited(&v, &visited, Point::new(1, 0)),
            None
        );
        assert_eq!(tree.goal(), Some(0));
    }

    #[test]
    fn exhaustive_search_keeps_last_match() {
        let v = view("?...?");
        let start = Point::new(2, 0);
        let mut visited = Visited::new(v.bounds());
        visited.mark(start);
        let mut tree = PathTree::new();
        let goal = tree
            .search(&v, start, Query::NearestFrontier(&visited), false)
            .unwrap();
        assert_eq!(goal.pos, Point::new(3, 0));
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.first_dir(), Some(Dir::Right));
    }

    #[test]
    fn tree_reused_across_view_sizes() {
        let mut tree = PathTree::new();
        let big = view(MAZE);
        tree.find_path_to_target(&big, Point::new(1, 1), Point::new(4, 5));
        let small = view("C.");
        let step = tree.find_path_to_target(&small, Point::new(1, 0), Point::ZERO);
        assert_eq!(step, Some(Point::new(-1, 0)));
        assert_eq!(tree.range(), Range::sized(2, 1));
        assert_eq!(tree.node_count(), 2);
    }

    fn arb_grid() -> impl Strategy<Value = (GridView, Point, Point)> {
        (2..9i32, 2..9i32).prop_flat_map(|(w, h)| {
            (
                proptest::collection::vec(prop::bool::weighted(0.3), (w * h) as usize),
                0..w,
                0..h,
                0..w,
                0..h,
            )
                .prop_map(move |(walls, sx, sy, tx, ty)| {
                    let start = Point::new(sx, sy);
                    let target = Point::new(tx, ty);
                    let cells = walls
                        .iter()
                        .enumerate()
                        .map(|(i, &wall)| {
                            let p = Point::new(i as i32 % w, i as i32 / w);
                            if wall && p != start && p != target {
                                CellState::Wall
                            } else {
                                CellState::Open
                            }
                        })
                        .collect();
                    (GridView::from_cells(w, h, cells).unwrap(), start, target)
                })
        })
    }

    proptest! {
        #[test]
        fn prop_distances_match_reference((v, start, _target) in arb_grid()) {
            let mut tree = PathTree::new();
            exhaust(&mut tree, &v, start);
            let reference = brute_force(&v, start);
            for p in v.bounds() {
                prop_assert_eq!(tree.distance_at(p), reference[(p.y * v.cols() + p.x) as usize]);
            }
        }

        #[test]
        fn prop_first_step_shortens_path((v, start, target) in arb_grid()) {
            let to_target = brute_force(&v, target);
            let d = |p: Point| to_target[(p.y * v.cols() + p.x) as usize];
            let mut tree = PathTree::new();
            let step = tree.find_path_to_target(&v, start, target);
            match d(start) {
                None => prop_assert_eq!(step, None),
                Some(0) => prop_assert_eq!(step, None),
                Some(n) => {
                    let step = step.unwrap();
                    prop_assert!(step.is_unit_cardinal());
                    prop_assert_eq!(d(start + step), Some(n - 1));
                    prop_assert_eq!(tree.goal_node().map(|g| g.distance), Some(n));
                }
            }
        }
    }
}
