//! Target keywords and the seat algebra they resolve to.
//!
//! A keyword is resolved once, relative to an acting unit, into a [`Target`].
//! The target keeps its team and anchor rather than a list of units, so it
//! follows the seating as teams rotate and lose members.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::BattleError;
use crate::team::Team;
use crate::unit::{Unit, UnitId};

keyword_enum! {
    /// Symbolic target selector used by ability effects and event sources
    pub enum TargetKeyword, unknown = unknown_target {
        /// Every seat of every team
        All => "all",
        SelfUnit => "self",
        SelfLeft => "self_left",
        SelfRight => "self_right",
        SelfAdjacent => "self_adjacent",
        FriendActive => "friend_active",
        FriendAll => "friend_all",
        FriendLeft => "friend_left",
        FriendRight => "friend_right",
        FriendAdjacent => "friend_adjacent",
        FriendFront => "friend_front",
        FriendOthers => "friend_others",
        FriendStandby => "friend_standby",
        /// Active unit of the opposing team
        Opponent => "opponent",
        OpponentAll => "opponent_all",
        OpponentLeft => "opponent_left",
        OpponentRight => "opponent_right",
        OpponentAdjacent => "opponent_adjacent",
        OpponentFront => "opponent_front",
        OpponentStandby => "opponent_standby",
    }
}

keyword_enum! {
    /// Team selector for team-channel event sources
    pub enum TeamSource, unknown = unknown_team_source {
        FriendTeam => "friend_team",
        OpponentTeam => "opponent_team",
        AllTeams => "all_teams",
    }
}

fn unknown_target(keyword: &str) -> BattleError {
    BattleError::UnknownTarget {
        keyword: keyword.to_string(),
    }
}

fn unknown_team_source(keyword: &str) -> BattleError {
    BattleError::UnknownTeamSource {
        keyword: keyword.to_string(),
    }
}

/// A set of seats relative to an anchor unit.
///
/// Resolution keeps declaration order and drops duplicates. Exclusive
/// targets never yield their anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Offsets from the anchor's current seat, wrapping around the team
    Relative {
        team: usize,
        anchor: UnitId,
        offsets: Vec<i32>,
        inclusive: bool,
    },
    /// Absolute seats; negative indices count from the back, out of range
    /// indices are skipped
    Fixed {
        team: usize,
        anchor: UnitId,
        indices: Vec<i32>,
        inclusive: bool,
    },
    /// Union of other targets
    Compound(Vec<Target>),
}

impl Target {
    /// Units currently selected, in declaration order
    pub fn units(&self, teams: &[Team]) -> Vec<UnitId> {
        let mut out = Vec::new();
        self.collect(teams, &mut out);
        out
    }

    pub fn contains(&self, teams: &[Team], unit: UnitId) -> bool {
        match self {
            Target::Compound(targets) => targets.iter().any(|t| t.contains(teams, unit)),
            _ => self.units(teams).contains(&unit),
        }
    }

    fn collect(&self, teams: &[Team], out: &mut Vec<UnitId>) {
        match self {
            Target::Relative {
                team,
                anchor,
                offsets,
                inclusive,
            } => {
                let Some(team) = teams.get(*team) else {
                    return;
                };
                let Some(seat) = team.position(*anchor) else {
                    return;
                };
                let size = team.size() as i64;
                for offset in offsets {
                    let index = (seat as i64 + i64::from(*offset)).rem_euclid(size) as usize;
                    push_seat(team, index, *anchor, *inclusive, out);
                }
            }
            Target::Fixed {
                team,
                anchor,
                indices,
                inclusive,
            } => {
                let Some(team) = teams.get(*team) else {
                    return;
                };
                let size = team.size() as i64;
                for index in indices {
                    let index = i64::from(*index);
                    if index >= size || index <= -size {
                        continue;
                    }
                    let seat = if index < 0 { size + index } else { index };
                    push_seat(team, seat as usize, *anchor, *inclusive, out);
                }
            }
            Target::Compound(targets) => {
                for target in targets {
                    target.collect(teams, out);
                }
            }
        }
    }
}

fn push_seat(team: &Team, seat: usize, anchor: UnitId, inclusive: bool, out: &mut Vec<UnitId>) {
    let Some(unit) = team.units().get(seat) else {
        return;
    };
    if (inclusive || unit.id != anchor) && !out.contains(&unit.id) {
        out.push(unit.id);
    }
}

/// Team that `team` fights: the next one in turn order
pub fn opposing(team_count: usize, team: usize) -> usize {
    if team_count == 0 {
        return team;
    }
    (team + 1) % team_count
}

fn relative(unit: &Unit, offsets: &[i32], inclusive: bool) -> Target {
    Target::Relative {
        team: unit.team,
        anchor: unit.id,
        offsets: offsets.to_vec(),
        inclusive,
    }
}

fn fixed(team: usize, unit: &Unit, indices: &[i32], inclusive: bool) -> Target {
    Target::Fixed {
        team,
        anchor: unit.id,
        indices: indices.to_vec(),
        inclusive,
    }
}

fn seats(teams: &[Team], team: usize, from: i32) -> Vec<i32> {
    let capacity = teams.get(team).map_or(0, Team::capacity) as i32;
    (from..capacity).collect()
}

/// Resolve `keyword` relative to `unit`
pub fn resolve(teams: &[Team], unit: &Unit, keyword: TargetKeyword) -> Target {
    let own = unit.team;
    let foe = opposing(teams.len(), own);
    match keyword {
        TargetKeyword::All => Target::Compound(
            teams
                .iter()
                .map(|team| fixed(team.index, unit, &seats(teams, team.index, 0), true))
                .collect(),
        ),
        TargetKeyword::SelfUnit => relative(unit, &[0], true),
        TargetKeyword::SelfLeft => relative(unit, &[-1], false),
        TargetKeyword::SelfRight => relative(unit, &[1], false),
        TargetKeyword::SelfAdjacent => relative(unit, &[1, -1], false),
        TargetKeyword::FriendActive => fixed(own, unit, &[0], true),
        TargetKeyword::FriendAll => fixed(own, unit, &seats(teams, own, 0), true),
        TargetKeyword::FriendLeft => fixed(own, unit, &[-1], true),
        TargetKeyword::FriendRight => fixed(own, unit, &[1], true),
        TargetKeyword::FriendAdjacent => fixed(own, unit, &[1, -1], true),
        TargetKeyword::FriendFront => fixed(own, unit, &[0, 1, -1], true),
        TargetKeyword::FriendOthers => fixed(own, unit, &seats(teams, own, 0), false),
        TargetKeyword::FriendStandby => fixed(own, unit, &seats(teams, own, 1), true),
        TargetKeyword::Opponent => fixed(foe, unit, &[0], false),
        TargetKeyword::OpponentAll => fixed(foe, unit, &seats(teams, foe, 0), false),
        TargetKeyword::OpponentLeft => fixed(foe, unit, &[-1], false),
        TargetKeyword::OpponentRight => fixed(foe, unit, &[1], false),
        TargetKeyword::OpponentAdjacent => fixed(foe, unit, &[1, -1], false),
        TargetKeyword::OpponentFront => fixed(foe, unit, &[0, 1, -1], false),
        TargetKeyword::OpponentStandby => fixed(foe, unit, &seats(teams, foe, 1), false),
    }
}

/// Resolve a team source relative to `unit` into team indices
pub fn resolve_teams(teams: &[Team], unit: &Unit, source: TeamSource) -> Vec<usize> {
    match source {
        TeamSource::FriendTeam => alloc::vec![unit.team],
        TeamSource::OpponentTeam => alloc::vec![opposing(teams.len(), unit.team)],
        TeamSource::AllTeams => teams.iter().map(|team| team.index).collect(),
    }
}
