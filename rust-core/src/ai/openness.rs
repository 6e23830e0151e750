use crate::game::{Coord, Grid};

/// 开阔度评估：给某个候选落点打分，分数越高越不容易把自己困住。
pub trait SpaceEvaluator {
    fn score(&self, grid: &Grid, at: Coord) -> u32;
}

/// 以落点为中心、半宽 `radius` 的正方形窗口内的空格数（窗口裁剪到网格内）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOpenness {
    pub radius: i32,
}

impl Default for WindowOpenness {
    fn default() -> Self {
        Self { radius: 5 }
    }
}

impl SpaceEvaluator for WindowOpenness {
    fn score(&self, grid: &Grid, at: Coord) -> u32 {
        window_openness(grid, at, self.radius)
    }
}

pub fn window_openness(grid: &Grid, center: Coord, radius: i32) -> u32 {
    let n = grid.size() as i32;
    let radius = radius.max(0);
    let low = |c: i32| c.saturating_sub(radius).max(0);
    let high = |c: i32| c.saturating_add(radius).min(n - 1);
    let x_range = low(center.x)..=high(center.x);
    let y_range = low(center.y)..=high(center.y);

    let mut score = 0;
    for y in y_range {
        for x in x_range.clone() {
            if !grid.occupied(Coord::new(x, y)) {
                score += 1;
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Owner;

    #[test]
    fn open_field_counts_full_window() {
        let grid = Grid::new(40);
        assert_eq!(window_openness(&grid, Coord::new(20, 20), 5), 121);
    }

    #[test]
    fn huge_radius_covers_whole_grid() {
        let mut grid = Grid::new(10);
        grid.mark(Coord::new(3, 3), Owner::Player);
        assert_eq!(window_openness(&grid, Coord::new(9, 0), i32::MAX), 99);
        assert_eq!(window_openness(&grid, Coord::new(0, 9), i32::MIN), 1);
    }

    #[test]
    fn window_is_clipped_at_corners() {
        let grid = Grid::new(40);
        assert_eq!(window_openness(&grid, Coord::new(0, 0), 5), 36);
        assert_eq!(window_openness(&grid, Coord::new(39, 20), 5), 66);
    }

    #[test]
    fn owned_cells_reduce_score() {
        let mut grid = Grid::new(40);
        for y in 15..=25 {
            grid.mark(Coord::new(22, y), Owner::Player);
        }
        let evaluator = WindowOpenness::default();
        assert_eq!(evaluator.score(&grid, Coord::new(20, 20)), 110);
        assert_eq!(evaluator.score(&grid, Coord::new(10, 20)), 121);
    }
}
