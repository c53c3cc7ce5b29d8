//! Enemy behaviors and non-player physics
//!
//! Each tick every live enemy gets gravity, its kind's AI, integration and a
//! terrain pass shaped like the player's. Knocked-out bodies of any kind
//! skip all of that and fly ballistically until they leave the world.

use glam::Vec2;

use super::collision::{Aabb, Side, resolve};
use super::entity::{EnemyKind, Entity, EntityKind};
use super::progress::Status;
use crate::consts::*;

/// Patrol walking speed (px/tick)
pub const PATROL_SPEED: f32 = 2.0;
/// Hazard drift speed (px/tick)
pub const HAZARD_SPEED: f32 = 1.0;
/// Chase running speed (px/tick)
pub const CHASE_SPEED: f32 = 6.0;
/// Chase enemies ignore players further than this horizontally
pub const CHASE_AGGRO_RANGE: f32 = 600.0;
/// Chase enemy hop when stuck against a wall
pub const CHASE_HOP: f32 = -12.0;
/// Terrain further than this from an enemy is skipped
const TERRAIN_MARGIN: f32 = 100.0;

/// Live terrain boxes, gathered once per tick
pub fn terrain_boxes(entities: &[Entity]) -> Vec<Aabb> {
    entities
        .iter()
        .filter(|e| !e.dead && e.kind.is_terrain())
        .map(Entity::rect)
        .collect()
}

/// Ballistic flight for defeated bodies; returns true once it left the world
pub fn update_knocked_out(entity: &mut Entity) -> bool {
    entity.pos += entity.vel;
    entity.vel.y += GRAVITY;
    entity.vel.x *= KNOCKOUT_AIR_FRICTION;
    if entity.pos.y > LEVEL_HEIGHT + KNOCKOUT_MARGIN {
        entity.dead = true;
    }
    entity.dead
}

/// Advance one enemy: gravity, AI, integration, terrain
pub fn update_enemy(entity: &mut Entity, terrain: &[Aabb], player_pos: Vec2, status: Status) {
    let EntityKind::Enemy(enemy) = entity.kind else {
        return;
    };

    entity.vel.y += GRAVITY;

    match enemy.kind {
        EnemyKind::Patrol => {
            if let Some((start, end)) = enemy.patrol {
                if entity.pos.x <= start {
                    entity.pos.x = start;
                    entity.direction = 1.0;
                }
                if entity.pos.x >= end {
                    entity.pos.x = end;
                    entity.direction = -1.0;
                }
            }
            entity.vel.x = entity.direction * PATROL_SPEED;
            turn_at_ledge(entity, terrain);
        }
        EnemyKind::Hazard => {
            entity.vel.x = entity.direction * HAZARD_SPEED;
            turn_at_ledge(entity, terrain);
        }
        EnemyKind::Chase => {
            if status == Status::Escape {
                let dx = player_pos.x - entity.pos.x;
                if dx.abs() < CHASE_AGGRO_RANGE {
                    // A wall stopped us last tick
                    let stalled = entity.vel.x == 0.0;
                    entity.direction = if dx > 0.0 { 1.0 } else { -1.0 };
                    entity.vel.x = entity.direction * CHASE_SPEED;
                    if entity.grounded && stalled && dx.abs() > 20.0 {
                        entity.vel.y = CHASE_HOP;
                    }
                } else {
                    entity.vel.x = 0.0;
                }
            } else {
                entity.vel = Vec2::ZERO;
            }
        }
    }

    entity.pos += entity.vel;
    collide_terrain(entity, enemy.kind, terrain);
}

/// Reverse instead of walking off an edge
fn turn_at_ledge(entity: &mut Entity, terrain: &[Aabb]) {
    if !entity.grounded {
        return;
    }
    let look_ahead = entity.direction * (entity.size.x / 2.0 + 10.0);
    let probe = Vec2::new(
        entity.pos.x + entity.size.x / 2.0 + look_ahead,
        entity.pos.y + entity.size.y + 5.0,
    );
    if !terrain.iter().any(|t| t.contains_point(probe)) {
        entity.direction = -entity.direction;
        entity.vel.x = 0.0;
    }
}

fn collide_terrain(entity: &mut Entity, kind: EnemyKind, terrain: &[Aabb]) {
    entity.grounded = false;
    for block in terrain {
        if !entity.rect().near(block, TERRAIN_MARGIN) {
            continue;
        }
        match resolve(&entity.rect(), block) {
            Side::Bottom => {
                entity.vel.y = 0.0;
                entity.pos.y = block.bottom();
            }
            Side::Top => {
                entity.vel.y = 0.0;
                entity.grounded = true;
                entity.pos.y = block.top() - entity.size.y;
            }
            side @ (Side::Left | Side::Right) => {
                entity.vel.x = 0.0;
                if side == Side::Left {
                    entity.pos.x = block.left() - entity.size.x;
                    entity.direction = -1.0;
                } else {
                    entity.pos.x = block.right();
                    entity.direction = 1.0;
                }
                if kind == EnemyKind::Chase && entity.grounded {
                    entity.vel.y = CHASE_HOP;
                }
            }
            Side::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Enemy;

    fn enemy(kind: EnemyKind, x: f32, y: f32, patrol: Option<(f32, f32)>) -> Entity {
        Entity::new(
            1,
            EntityKind::Enemy(Enemy { kind, patrol }),
            x,
            y,
            TILE_SIZE,
            TILE_SIZE,
        )
    }

    fn floor(x: f32, w: f32) -> Vec<Aabb> {
        vec![Aabb::new(x, 200.0, w, TILE_SIZE)]
    }

    fn settle(e: &mut Entity, terrain: &[Aabb], status: Status, ticks: usize) {
        for _ in 0..ticks {
            update_enemy(e, terrain, Vec2::new(10_000.0, 0.0), status);
        }
    }

    #[test]
    fn test_patrol_lands_and_walks() {
        let terrain = floor(0.0, 2000.0);
        let mut e = enemy(EnemyKind::Patrol, 500.0, 150.0, None);
        settle(&mut e, &terrain, Status::Playing, 10);
        assert!(e.grounded);
        assert_eq!(e.pos.y, 200.0 - TILE_SIZE);
        let x = e.pos.x;
        settle(&mut e, &terrain, Status::Playing, 1);
        assert_eq!(e.pos.x, x + PATROL_SPEED);
    }

    #[test]
    fn test_patrol_bounds_reverse() {
        let terrain = floor(0.0, 2000.0);
        let mut e = enemy(EnemyKind::Patrol, 500.0, 152.0, Some((400.0, 520.0)));
        settle(&mut e, &terrain, Status::Playing, 20);
        assert_eq!(e.direction, -1.0);
        assert!(e.pos.x <= 520.0);
    }

    #[test]
    fn test_ledge_turnaround() {
        // Floor ends at x = 300
        let terrain = floor(0.0, 300.0);
        let mut e = enemy(EnemyKind::Hazard, 200.0, 152.0, None);
        settle(&mut e, &terrain, Status::Playing, 200);
        assert!(e.grounded, "hazard walked off the ledge");
        assert!(e.pos.x + e.size.x <= 300.0 + HAZARD_SPEED * 2.0);
    }

    #[test]
    fn test_chase_inert_until_escape() {
        let terrain = floor(0.0, 2000.0);
        let mut e = enemy(EnemyKind::Chase, 500.0, 152.0, None);
        e.grounded = true;
        for _ in 0..10 {
            update_enemy(&mut e, &terrain, Vec2::new(300.0, 160.0), Status::Playing);
        }
        assert_eq!(e.pos.x, 500.0);

        update_enemy(&mut e, &terrain, Vec2::new(300.0, 160.0), Status::Escape);
        assert_eq!(e.direction, -1.0);
        assert_eq!(e.vel.x, -CHASE_SPEED);
    }

    #[test]
    fn test_chase_ignores_distant_player() {
        let terrain = floor(0.0, 5000.0);
        let mut e = enemy(EnemyKind::Chase, 500.0, 152.0, None);
        update_enemy(&mut e, &terrain, Vec2::new(2000.0, 160.0), Status::Escape);
        assert_eq!(e.vel.x, 0.0);
    }

    #[test]
    fn test_chase_hops_off_walls() {
        let mut terrain = floor(0.0, 2000.0);
        terrain.push(Aabb::new(400.0, 0.0, TILE_SIZE, 200.0));
        let mut e = enemy(EnemyKind::Chase, 460.0, 152.0, None);
        e.grounded = true;
        let mut hopped = false;
        for _ in 0..20 {
            update_enemy(&mut e, &terrain, Vec2::new(100.0, 160.0), Status::Escape);
            hopped |= e.vel.y < 0.0;
        }
        assert!(hopped);
    }

    #[test]
    fn test_knocked_out_leaves_world() {
        let mut e = enemy(EnemyKind::Patrol, 0.0, 0.0, None);
        e.knock_out(-10.0);
        let mut ticks = 0;
        while !update_knocked_out(&mut e) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(e.dead);
        assert!(e.pos.x > 0.0);
    }
}
