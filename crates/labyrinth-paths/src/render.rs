//! Text overlay of a search result, for debug logging.

use crate::pathtree::PathTree;
use crate::view::GridView;

/// Symbol drawn over cells on the goal's path.
pub const PATH_SYMBOL: char = 'o';

/// The view's protocol rows with every cell on the path from the start to
/// the goal replaced by [`PATH_SYMBOL`]. Without a goal the rows are
/// returned unchanged.
pub fn render_path(view: &GridView, tree: &PathTree) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = view
        .to_rows()
        .iter()
        .map(|row| row.chars().collect())
        .collect();
    for p in tree.path() {
        if !view.in_bounds(p) {
            continue;
        }
        rows[p.y as usize][p.x as usize] = PATH_SYMBOL;
    }
    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}
