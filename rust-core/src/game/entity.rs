use serde::{Deserialize, Serialize};

use super::grid::{Coord, Grid, Heading, Owner};

pub const PLAYER_COLOR: &str = "#00f3ff";
pub const AI_COLOR: &str = "#ff6b35";

/// 光轮实体：位置、朝向、尾迹与存活状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub owner: Owner,
    pub position: Coord,
    pub heading: Heading,
    #[serde(default)]
    pub trail: Vec<Coord>,
    pub alive: bool,
    pub color: String,
}

impl Entity {
    pub fn new(owner: Owner, position: Coord, heading: Heading, color: impl Into<String>) -> Self {
        Self {
            owner,
            position,
            heading,
            trail: vec![position],
            alive: true,
            color: color.into(),
        }
    }

    /// 在网格上生成实体并占用出生格。
    pub fn spawn(grid: &mut Grid, owner: Owner) -> Self {
        let n = grid.size() as i32;
        let (position, heading, color) = match owner {
            Owner::Player => (Coord::new(n / 4, n / 2), Heading::Right, PLAYER_COLOR),
            Owner::Ai => (Coord::new(n * 3 / 4, n / 2), Heading::Left, AI_COLOR),
        };
        grid.mark(position, owner);
        Self::new(owner, position, heading, color)
    }

    pub fn next_cell(&self) -> Coord {
        self.position.step(self.heading)
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::Cell;

    #[test]
    fn spawn_positions_match_arena_layout() {
        let mut grid = Grid::new(40);
        let player = Entity::spawn(&mut grid, Owner::Player);
        let ai = Entity::spawn(&mut grid, Owner::Ai);

        assert_eq!(player.position, Coord::new(10, 20));
        assert_eq!(player.heading, Heading::Right);
        assert_eq!(ai.position, Coord::new(30, 20));
        assert_eq!(ai.heading, Heading::Left);
        assert_eq!(grid.owner(player.position), Some(Cell::Player));
        assert_eq!(grid.owner(ai.position), Some(Cell::Ai));
        assert_eq!(player.trail.last(), Some(&player.position));
    }
}
