use glam::Vec3;

use crate::net::packet::MAX_PLAYER_SLOTS;

/// Last known motion and team per player slot.
///
/// Slots outlive the players in them. A `None` team marks a free slot.
#[derive(Debug, Clone)]
pub struct SlotCache {
    positions: Vec<Vec3>,
    fronts: Vec<Vec3>,
    teams: Vec<Option<u8>>,
}

impl Default for SlotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotCache {
    pub fn new() -> Self {
        Self {
            positions: vec![Vec3::ZERO; MAX_PLAYER_SLOTS],
            fronts: vec![Vec3::ZERO; MAX_PLAYER_SLOTS],
            teams: vec![None; MAX_PLAYER_SLOTS],
        }
    }

    #[inline]
    pub fn contains(id: u8) -> bool {
        (id as usize) < MAX_PLAYER_SLOTS
    }

    pub fn record_motion(&mut self, id: u8, position: Vec3, front: Vec3) {
        if let Some(slot) = self.positions.get_mut(id as usize) {
            *slot = position;
            self.fronts[id as usize] = front;
        }
    }

    pub fn position(&self, id: u8) -> Vec3 {
        self.positions.get(id as usize).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn front(&self, id: u8) -> Vec3 {
        self.fronts.get(id as usize).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn team(&self, id: u8) -> Option<u8> {
        self.teams.get(id as usize).copied().flatten()
    }

    pub fn set_team(&mut self, id: u8, team: Option<u8>) {
        if let Some(slot) = self.teams.get_mut(id as usize) {
            *slot = team;
        }
    }

    pub fn clear_teams(&mut self) {
        self.teams.iter_mut().for_each(|t| *t = None);
    }

    pub fn clear(&mut self) {
        self.positions.iter_mut().for_each(|p| *p = Vec3::ZERO);
        self.fronts.iter_mut().for_each(|f| *f = Vec3::ZERO);
        self.clear_teams();
    }

    pub fn occupied(&self) -> usize {
        self.teams.iter().filter(|t| t.is_some()).count()
    }
}
