use tracing::{info, warn};

use super::entity::Entity;
use super::rooms::{GoalKind, GridCell, RoomDefinition, RoomTable, FIRST_ROOM};
use super::textures::GameTextures;
use super::GameConfig;

/// The live entities of the current room. Player, rival, backdrop and goal are
/// created once and repositioned on every load; hazards are rebuilt.
#[derive(Debug, Clone)]
pub(crate) struct RoomEntities {
    pub(crate) player: Entity,
    pub(crate) rival: Entity,
    pub(crate) backdrop: Entity,
    pub(crate) goal: Entity,
    pub(crate) goal_kind: GoalKind,
    pub(crate) hazards: Vec<Entity>,
}

impl RoomEntities {
    pub(crate) fn new(textures: &GameTextures, config: &GameConfig) -> Self {
        let mut rival = Entity::new(
            textures.rival.clone(),
            config.entity_speed,
            config.entity_friction,
        );
        rival.exists = false;
        let mut backdrop = Entity::fixture(textures.backdrop.clone());
        backdrop.exists = false;
        Self {
            player: Entity::new(
                textures.player.clone(),
                config.entity_speed,
                config.entity_friction,
            ),
            rival,
            backdrop,
            goal: Entity::fixture(textures.advance_goal.clone()),
            goal_kind: GoalKind::Advance,
            hazards: Vec::new(),
        }
    }
}

/// Tracks which room is on screen and reloads only when the session's room
/// index moves away from it.
#[derive(Debug, Clone)]
pub(crate) struct RoomController {
    last_loaded: Option<u32>,
    cell_size: u32,
}

impl RoomController {
    pub(crate) fn new(cell_size: u32) -> Self {
        Self {
            last_loaded: None,
            cell_size,
        }
    }

    pub(crate) fn needs_load(&self, room_index: u32) -> bool {
        self.last_loaded != Some(room_index)
    }

    #[cfg(test)]
    pub(crate) fn last_loaded(&self) -> Option<u32> {
        self.last_loaded
    }

    /// Forces the next `ensure_loaded` to reload even if the index is
    /// unchanged.
    pub(crate) fn invalidate(&mut self) {
        self.last_loaded = None;
    }

    /// Loads `*room_index` when it differs from the last loaded room, writing
    /// back the clamped index if the room does not exist. Returns whether a
    /// load happened.
    pub(crate) fn ensure_loaded(
        &mut self,
        room_index: &mut u32,
        table: &RoomTable,
        entities: &mut RoomEntities,
        textures: &GameTextures,
    ) -> bool {
        if !self.needs_load(*room_index) {
            return false;
        }
        *room_index = self.load_room(*room_index, table, entities, textures);
        true
    }

    pub(crate) fn load_room(
        &mut self,
        requested: u32,
        table: &RoomTable,
        entities: &mut RoomEntities,
        textures: &GameTextures,
    ) -> u32 {
        let (index, room) = table.resolve(requested);
        if index != requested {
            warn!(requested, fallback = FIRST_ROOM, "room_missing_clamped");
        }
        self.place_entities(room, entities, textures);
        self.last_loaded = Some(index);
        info!(
            room = index,
            goal = ?entities.goal_kind,
            rival = entities.rival.exists,
            backdrop = entities.backdrop.exists,
            hazard_count = entities.hazards.len(),
            "room_loaded"
        );
        index
    }

    fn place_entities(
        &self,
        room: &RoomDefinition,
        entities: &mut RoomEntities,
        textures: &GameTextures,
    ) {
        let cell_size = self.cell_size;
        entities
            .player
            .set_grid_position(room.player.x, room.player.y, cell_size);

        place_optional(&mut entities.rival, room.rival.cell(), cell_size);
        place_optional(&mut entities.backdrop, room.backdrop.cell(), cell_size);

        let goal = room.goal.cell();
        entities.goal_kind = room.goal.kind;
        entities
            .goal
            .set_texture(textures.goal(room.goal.kind).clone());
        entities.goal.set_grid_position(goal.x, goal.y, cell_size);

        entities.hazards = room
            .hazards
            .iter()
            .map(|cell| {
                let mut hazard = Entity::fixture(textures.hazard.clone());
                hazard.set_grid_position(cell.x, cell.y, cell_size);
                hazard
            })
            .collect();
    }
}

fn place_optional(entity: &mut Entity, cell: Option<GridCell>, cell_size: u32) {
    match cell {
        Some(cell) => {
            entity.set_grid_position(cell.x, cell.y, cell_size);
            entity.exists = true;
        }
        None => entity.exists = false,
    }
}
