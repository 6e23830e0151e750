use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::grid::{Grid, Heading};

/// 单步移动结果。撞墙与撞尾迹是正常的模拟结果，而不是错误。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    CrashedWall,
    CrashedTrail,
    /// 实体已死亡，未做任何修改。
    Halted,
}

impl MoveOutcome {
    pub fn is_crash(self) -> bool {
        matches!(self, MoveOutcome::CrashedWall | MoveOutcome::CrashedTrail)
    }
}

/// 让实体沿当前朝向前进一格。
pub fn advance(entity: &mut Entity, grid: &mut Grid) -> MoveOutcome {
    if !entity.alive {
        return MoveOutcome::Halted;
    }

    let candidate = entity.next_cell();
    if !grid.in_bounds(candidate) {
        entity.kill();
        return MoveOutcome::CrashedWall;
    }
    // own trail and opponent trail read the same
    if grid.occupied(candidate) {
        entity.kill();
        return MoveOutcome::CrashedTrail;
    }

    entity.position = candidate;
    entity.trail.push(candidate);
    grid.mark(candidate, entity.owner);
    MoveOutcome::Moved
}

/// 仅当新方向既不是当前方向也不是反方向时才生效。
pub fn request_heading_change(entity: &mut Entity, heading: Heading) -> bool {
    if !entity.alive || heading == entity.heading || heading == entity.heading.opposite() {
        return false;
    }
    entity.heading = heading;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::{Cell, Coord, Owner};

    fn player_at(grid: &mut Grid, x: i32, y: i32, heading: Heading) -> Entity {
        let at = Coord::new(x, y);
        grid.mark(at, Owner::Player);
        Entity::new(Owner::Player, at, heading, "#00f3ff")
    }

    #[test]
    fn moves_one_cell_and_marks_grid() {
        let mut grid = Grid::new(40);
        let mut player = player_at(&mut grid, 10, 20, Heading::Right);

        let outcome = advance(&mut player, &mut grid);

        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(player.position, Coord::new(11, 20));
        assert_eq!(grid.owner(Coord::new(11, 20)), Some(Cell::Player));
        assert_eq!(player.trail.last(), Some(&Coord::new(11, 20)));
        assert!(player.alive);
    }

    #[test]
    fn leaving_the_arena_is_a_wall_crash() {
        let mut grid = Grid::new(40);
        let mut player = player_at(&mut grid, 39, 20, Heading::Right);
        let empty_before = grid.empty_count();

        let outcome = advance(&mut player, &mut grid);

        assert_eq!(outcome, MoveOutcome::CrashedWall);
        assert!(!player.alive);
        assert_eq!(player.position, Coord::new(39, 20));
        assert_eq!(grid.empty_count(), empty_before, "crash must not mark cells");
    }

    #[test]
    fn any_owned_cell_is_a_trail_crash() {
        let mut grid = Grid::new(10);
        let mut player = player_at(&mut grid, 4, 4, Heading::Up);
        grid.mark(Coord::new(4, 3), Owner::Ai);

        assert_eq!(advance(&mut player, &mut grid), MoveOutcome::CrashedTrail);
        assert!(!player.alive);

        let mut looping = player_at(&mut grid, 1, 1, Heading::Right);
        assert_eq!(advance(&mut looping, &mut grid), MoveOutcome::Moved);
        looping.heading = Heading::Left;
        assert_eq!(advance(&mut looping, &mut grid), MoveOutcome::CrashedTrail);
    }

    #[test]
    fn dead_entity_is_frozen() {
        let mut grid = Grid::new(10);
        let mut player = player_at(&mut grid, 9, 0, Heading::Right);
        assert!(advance(&mut player, &mut grid).is_crash());
        let frozen = player.clone();

        assert_eq!(advance(&mut player, &mut grid), MoveOutcome::Halted);
        assert!(!request_heading_change(&mut player, Heading::Down));
        assert_eq!(player, frozen);
    }

    #[test]
    fn reverse_and_redundant_requests_are_ignored() {
        let mut grid = Grid::new(40);
        let mut player = player_at(&mut grid, 10, 20, Heading::Right);

        assert!(!request_heading_change(&mut player, Heading::Left));
        assert_eq!(player.heading, Heading::Right);
        assert!(!request_heading_change(&mut player, Heading::Right));
        assert!(request_heading_change(&mut player, Heading::Up));
        assert_eq!(player.heading, Heading::Up);
    }
}
