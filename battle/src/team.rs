//! Seated rosters.
//!
//! Seat 0 holds the active unit, the one that attacks and defends for the
//! team. Dead units leave their seat on cleanup and are kept in the grave.

use alloc::vec::Vec;

use crate::error::{BattleError, BattleResult};
use crate::unit::{Unit, UnitId};

/// Number of seats on a team assembled for battle
pub const TEAM_CAPACITY: usize = 4;

/// Result of a rotation: the unit now in seat 0 and the one that left it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub active: UnitId,
    pub previous: UnitId,
}

#[derive(Debug, Clone)]
pub struct Team {
    /// Position of this team in turn order
    pub index: usize,
    capacity: usize,
    units: Vec<Unit>,
    grave: Vec<Unit>,
}

impl Team {
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            index,
            capacity,
            units: Vec::with_capacity(capacity),
            grave: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Whether the team still has anyone seated
    pub fn is_alive(&self) -> bool {
        !self.units.is_empty()
    }

    pub fn active(&self) -> Option<&Unit> {
        self.units.first()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn grave(&self) -> &[Unit] {
        &self.grave
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Current seat of a seated unit
    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub fn can_rotate(&self) -> bool {
        self.units.len() > 1
    }

    /// Seat `unit` at the back. Fails without touching the team when every
    /// seat is taken.
    pub fn add_unit(&mut self, mut unit: Unit) -> BattleResult<()> {
        if self.units.len() >= self.capacity {
            return Err(BattleError::TeamFull {
                capacity: self.capacity as u32,
            });
        }
        unit.index = self.units.len();
        unit.team = self.index;
        self.units.push(unit);
        Ok(())
    }

    /// Front unit moves to the back
    pub fn rotate_left(&mut self) -> Option<Rotation> {
        if !self.can_rotate() {
            return None;
        }
        self.units.rotate_left(1);
        self.reindex();
        Some(Rotation {
            active: self.units[0].id,
            previous: self.units[self.units.len() - 1].id,
        })
    }

    /// Back unit moves to the front
    pub fn rotate_right(&mut self) -> Option<Rotation> {
        if !self.can_rotate() {
            return None;
        }
        self.units.rotate_right(1);
        self.reindex();
        Some(Rotation {
            active: self.units[0].id,
            previous: self.units[1].id,
        })
    }

    /// Move dead units to the grave, keeping survivors in order.
    ///
    /// Returns the removed units in seat order.
    pub fn cleanup(&mut self) -> Vec<UnitId> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.units.len() {
            if self.units[i].is_alive() {
                self.units[i].index = i;
                i += 1;
            } else {
                let unit = self.units.remove(i);
                removed.push(unit.id);
                self.grave.push(unit);
            }
        }
        removed
    }

    fn reindex(&mut self) {
        for (i, unit) in self.units.iter_mut().enumerate() {
            unit.index = i;
            unit.team = self.index;
        }
    }
}
