//! Level container and the default level generator
//!
//! A [`Level`] is the validated, ordered entity list the simulation starts
//! from. The simulation never adds or removes entities afterwards; it only
//! flips their dead/collected/kind state.

use glam::Vec2;

use crate::consts::{LEVEL_WIDTH_TILES, TILE_SIZE};
use crate::error::LevelError;
use crate::sim::entity::{Enemy, EnemyKind, Entity, EntityKind, ToppinKind};

/// Player spawn offset from the exit door (right of it, feet near its base)
const SPAWN_OFFSET_X: f32 = 60.0;
const SPAWN_OFFSET_Y: f32 = -100.0;

/// Validated initial entity list
#[derive(Debug, Clone)]
pub struct Level {
    entities: Vec<Entity>,
}

impl Level {
    /// Validate a generated entity list
    pub fn new(entities: Vec<Entity>) -> Result<Self, LevelError> {
        Self::validate(entities).inspect_err(|e| log::warn!("Rejecting level: {}", e))
    }

    fn validate(entities: Vec<Entity>) -> Result<Self, LevelError> {
        for e in &entities {
            if e.kind == EntityKind::Player {
                return Err(LevelError::PlayerInLevel { id: e.id });
            }
            let valid = |v: f32| v.is_finite() && v > 0.0;
            if !valid(e.size.x) || !valid(e.size.y) {
                return Err(LevelError::InvalidSize {
                    id: e.id,
                    w: e.size.x,
                    h: e.size.y,
                });
            }
        }
        let level = Self { entities };
        level.spawn_point()?;
        Ok(level)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Player spawn, derived from the first exit door
    pub fn spawn_point(&self) -> Result<Vec2, LevelError> {
        let door = self
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::ExitDoor)
            .ok_or(LevelError::MissingSpawnReference)?;
        Ok(Vec2::new(
            door.pos.x + door.size.x + SPAWN_OFFSET_X,
            door.pos.y + door.size.y + SPAWN_OFFSET_Y,
        ))
    }
}

/// Tile-coordinate level builder
#[derive(Debug)]
pub struct LevelBuilder {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> &mut Entity {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity::new(id, kind, x, y, w, h));
        let last = self.entities.len() - 1;
        &mut self.entities[last]
    }

    /// Solid block, all values in tiles
    pub fn block(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.push(
            EntityKind::Block,
            x * TILE_SIZE,
            y * TILE_SIZE,
            w * TILE_SIZE,
            h * TILE_SIZE,
        );
        self
    }

    /// Half-tile thick platform
    pub fn platform(&mut self, x: f32, y: f32, w: f32) -> &mut Self {
        self.push(
            EntityKind::Platform,
            x * TILE_SIZE,
            y * TILE_SIZE,
            w * TILE_SIZE,
            TILE_SIZE / 2.0,
        );
        self
    }

    /// Enemy patrolling `range` tiles either side of its spawn
    pub fn enemy(&mut self, x: f32, y: f32, kind: EnemyKind, range: f32) -> &mut Self {
        let patrol = Some(((x - range) * TILE_SIZE, (x + range) * TILE_SIZE));
        self.push(
            EntityKind::Enemy(Enemy { kind, patrol }),
            x * TILE_SIZE,
            y * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        self
    }

    /// Escape-only chase enemy, facing left
    pub fn chaser(&mut self, x: f32, y: f32) -> &mut Self {
        let e = self.push(
            EntityKind::Enemy(Enemy {
                kind: EnemyKind::Chase,
                patrol: None,
            }),
            x * TILE_SIZE,
            y * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        e.direction = -1.0;
        e.escape_only = true;
        self
    }

    pub fn collectible(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(
            EntityKind::Collectible { value: 10 },
            x * TILE_SIZE,
            y * TILE_SIZE,
            20.0,
            20.0,
        );
        self
    }

    /// Worth more, only present during the escape
    pub fn escape_collectible(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(
            EntityKind::Collectible { value: 50 },
            x * TILE_SIZE,
            y * TILE_SIZE,
            20.0,
            20.0,
        )
        .escape_only = true;
        self
    }

    pub fn breakable(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(
            EntityKind::Breakable,
            x * TILE_SIZE,
            y * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        self
    }

    /// Quarter-tile thick grind rail
    pub fn rail(&mut self, x: f32, y: f32, w: f32) -> &mut Self {
        self.push(
            EntityKind::Rail,
            x * TILE_SIZE,
            y * TILE_SIZE,
            w * TILE_SIZE,
            TILE_SIZE / 4.0,
        );
        self
    }

    pub fn checkpoint(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(
            EntityKind::Checkpoint { active: false },
            x * TILE_SIZE,
            y * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        self
    }

    pub fn cage(&mut self, x: f32, y: f32, toppin: ToppinKind) -> &mut Self {
        self.push(
            EntityKind::ToppinCage { toppin },
            x * TILE_SIZE,
            y * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );
        self
    }

    pub fn secret(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(EntityKind::Secret, x * TILE_SIZE, y * TILE_SIZE, 30.0, 30.0);
        self
    }

    /// Any other kind at a tile position with a pixel size
    pub fn place(&mut self, kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.push(kind, x * TILE_SIZE, y * TILE_SIZE, w, h);
        self
    }

    pub fn build(self) -> Result<Level, LevelError> {
        Level::new(self.entities)
    }
}

/// The default level: a sprawling processing plant
///
/// Nine rooms left to right: entrance (exit door, hidden lap portal), main
/// hall, grinder with rails over a pit, vertical shaft, upper conveyors,
/// warehouse (gerry), crusher gauntlet, janitor closet (treasure) and the
/// arena holding the escape trigger.
pub fn factory() -> Result<Level, LevelError> {
    let mut b = LevelBuilder::new();
    let t = TILE_SIZE;

    // Entrance
    b.block(0.0, 0.0, 1.0, 40.0).block(0.0, 30.0, 20.0, 10.0);
    b.place(EntityKind::ExitDoor, 6.0, 27.0, t, t * 3.0);
    // Behind the exit door, so only found by walking past it
    b.place(EntityKind::LapPortal, 2.0, 28.0, t, t * 2.0);
    b.breakable(10.0, 29.0)
        .breakable(11.0, 29.0)
        .breakable(12.0, 28.0);
    b.collectible(10.0, 25.0).collectible(12.0, 25.0);
    b.enemy(16.0, 29.0, EnemyKind::Patrol, 1.0);

    // Main hall
    b.block(20.0, 32.0, 40.0, 8.0);
    b.enemy(23.0, 31.0, EnemyKind::Patrol, 4.0)
        .enemy(33.0, 31.0, EnemyKind::Patrol, 4.0)
        .enemy(45.0, 31.0, EnemyKind::Patrol, 4.0);
    b.platform(25.0, 25.0, 5.0).platform(35.0, 22.0, 5.0);
    b.collectible(27.0, 24.0).collectible(37.0, 21.0);
    b.enemy(36.0, 21.0, EnemyKind::Hazard, 2.0);
    b.cage(37.0, 20.0, ToppinKind::Nugget);
    // Ceiling alcove, reached by super jump or wall climb
    b.block(30.0, 15.0, 6.0, 2.0)
        .breakable(30.0, 17.0)
        .block(29.0, 15.0, 1.0, 5.0)
        .block(36.0, 15.0, 1.0, 5.0);
    b.secret(32.0, 14.0);
    b.collectible(31.0, 14.0).collectible(33.0, 14.0);

    // Grinder
    b.block(60.0, 35.0, 10.0, 5.0).rail(60.0, 34.0, 10.0);
    for i in (1..10).step_by(2) {
        b.collectible(60.0 + i as f32, 34.0);
    }
    b.chaser(62.0, 33.0).chaser(65.0, 33.0).chaser(68.0, 33.0);
    b.block(70.0, 40.0, 30.0, 1.0)
        .block(75.0, 35.0, 2.0, 1.0)
        .block(80.0, 33.0, 2.0, 1.0)
        .block(85.0, 35.0, 2.0, 1.0);
    b.enemy(75.0, 34.0, EnemyKind::Hazard, 1.0)
        .enemy(80.0, 32.0, EnemyKind::Hazard, 1.0)
        .enemy(85.0, 34.0, EnemyKind::Hazard, 1.0);
    b.escape_collectible(72.0, 30.0)
        .escape_collectible(77.0, 30.0)
        .escape_collectible(82.0, 30.0);
    b.checkpoint(90.0, 33.0).block(90.0, 35.0, 10.0, 5.0);

    // Vertical shaft
    b.block(100.0, 10.0, 5.0, 22.0).block(100.0, 35.0, 5.0, 5.0);
    b.block(115.0, 10.0, 5.0, 15.0).block(115.0, 27.0, 5.0, 13.0);
    b.platform(105.0, 35.0, 3.0)
        .platform(110.0, 30.0, 3.0)
        .platform(105.0, 25.0, 3.0)
        .platform(110.0, 20.0, 3.0);
    b.enemy(106.0, 34.0, EnemyKind::Patrol, 1.0)
        .enemy(111.0, 19.0, EnemyKind::Patrol, 1.0);
    b.cage(106.0, 24.0, ToppinKind::Burger);
    b.breakable(115.0, 25.0).breakable(116.0, 25.0);
    b.secret(118.0, 25.0);
    b.block(100.0, 10.0, 20.0, 2.0);

    // Upper conveyors
    b.block(120.0, 12.0, 40.0, 2.0).rail(120.0, 11.0, 40.0);
    for i in (2..38).step_by(2) {
        b.collectible(120.0 + i as f32, 11.0);
    }
    for x in [125.0, 130.0, 135.0, 140.0, 145.0, 152.0] {
        b.chaser(x, 10.0);
    }
    for x in [122.0, 132.0, 142.0, 153.0] {
        b.enemy(x, 10.0, EnemyKind::Hazard, 2.0);
    }
    b.cage(155.0, 10.0, ToppinKind::Pizza);

    // Warehouse
    b.block(160.0, 12.0, 2.0, 20.0).block(162.0, 32.0, 20.0, 2.0);
    b.place(EntityKind::Gerry { collected: false }, 170.0, 31.0, 30.0, 40.0);
    b.enemy(165.0, 31.0, EnemyKind::Patrol, 3.0)
        .enemy(170.0, 31.0, EnemyKind::Hazard, 2.0);

    // Crusher gauntlet
    b.block(182.0, 32.0, 50.0, 5.0);
    for i in 0..5 {
        let x = 190.0 + (i * 8) as f32;
        let kind = if i % 2 == 0 {
            EnemyKind::Hazard
        } else {
            EnemyKind::Patrol
        };
        b.enemy(x, 31.0, kind, 2.0);
        b.collectible(x, 28.0);
        b.chaser(x, 29.0);
    }
    b.cage(200.0, 25.0, ToppinKind::Hotdog);

    // Janitor closet: hollow, the door is its left wall
    b.block(220.0, 28.0, 10.0, 3.0).block(229.0, 31.0, 1.0, 5.0);
    b.place(EntityKind::JanitorDoor, 220.0, 31.0, t, t * 2.0);
    b.place(EntityKind::Treasure, 224.0, 31.0, 40.0, 40.0);
    b.breakable(225.0, 20.0).platform(225.0, 15.0, 3.0);
    b.secret(226.0, 13.0);

    // Arena
    b.block(232.0, 32.0, 20.0, 2.0);
    b.place(
        EntityKind::EscapeTrigger { triggered: false },
        240.0,
        28.0,
        t * 3.0,
        t * 4.0,
    );
    b.cage(235.0, 31.0, ToppinKind::Slushy);

    // Escape stragglers across the level
    for x in [200.0, 150.0, 100.0, 50.0] {
        b.chaser(x, 20.0);
    }

    // Sky limit
    b.block(0.0, -10.0, LEVEL_WIDTH_TILES as f32 * 2.0, 10.0);

    b.build()
}
