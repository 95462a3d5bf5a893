//! Rack grid derivation for the facility dashboard.
//!
//! Tank labels encode a physical position as `{RACK}-{ROW}-{COL}`. The grid is
//! recomputed from the current tank list on every request and never stored.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Racks, rows and column count of the facility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RackLayout {
    pub racks: Vec<String>,
    pub rows: Vec<String>,
    pub columns: u32,
}

impl Default for RackLayout {
    fn default() -> Self {
        Self {
            racks: (1..=6).map(|n| format!("ARF{n}")).collect(),
            rows: ["A", "B", "C", "D", "E", "F"]
                .into_iter()
                .map(String::from)
                .collect(),
            columns: 10,
        }
    }
}

/// Parsed physical position of a tank
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TankLabel {
    pub rack: String,
    pub row: String,
    pub column: u32,
}

impl TankLabel {
    /// Parse `ARF2-B-3`. Returns `None` for anything that is not exactly three
    /// non-empty segments with a positive column number.
    pub fn parse(label: &str) -> Option<Self> {
        let mut parts = label.split('-');
        let rack = parts.next()?.trim();
        let row = parts.next()?.trim();
        let column = parts.next()?.trim();
        if parts.next().is_some() || rack.is_empty() || row.is_empty() {
            return None;
        }

        let column: u32 = column.parse().ok()?;
        if column == 0 {
            return None;
        }

        Some(Self {
            rack: rack.to_string(),
            row: row.to_string(),
            column,
        })
    }
}

impl fmt::Display for TankLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.rack, self.row, self.column)
    }
}

/// Display state of one grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// No tank at this position
    Empty,
    /// A tank exists but holds no strain
    Inactive,
    /// Active tank with no fish counted
    ActiveEmpty,
    /// Active tank with fish
    ActiveStocked,
}

/// The tank fields the grid needs
#[derive(Debug, Clone)]
pub struct GridTank {
    pub id: Uuid,
    pub tank_id: String,
    pub active: bool,
    pub total_fish: Option<i32>,
    pub strain_name: Option<String>,
    pub strain_id_number: Option<String>,
}

impl GridTank {
    fn state(&self) -> SlotState {
        match (self.active, self.total_fish) {
            (false, _) => SlotState::Inactive,
            (true, None | Some(0)) => SlotState::ActiveEmpty,
            (true, Some(_)) => SlotState::ActiveStocked,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridSlot {
    pub label: String,
    pub column: u32,
    pub state: SlotState,
    pub tank: Option<Uuid>,
    pub strain_name: Option<String>,
    pub strain_id_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridRow {
    pub row: String,
    pub slots: Vec<GridSlot>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RackSection {
    pub rack: String,
    /// Shown unfolded by default
    pub expanded: bool,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RackGrid {
    pub racks: Vec<RackSection>,
}

impl RackGrid {
    #[cfg(test)]
    pub fn slot(&self, rack: &str, row: &str, column: u32) -> Option<&GridSlot> {
        self.racks
            .iter()
            .find(|section| section.rack == rack)?
            .rows
            .iter()
            .find(|grid_row| grid_row.row == row)?
            .slots
            .iter()
            .find(|slot| slot.column == column)
    }

    pub fn expanded_racks(&self) -> Vec<&str> {
        self.racks
            .iter()
            .filter(|section| section.expanded)
            .map(|section| section.rack.as_str())
            .collect()
    }
}

/// Lay out `tanks` on the rack grid. Tanks whose label does not parse, or
/// that sit outside the layout, are not shown.
pub fn derive_grid(layout: &RackLayout, tanks: &[GridTank]) -> RackGrid {
    let by_position: HashMap<TankLabel, &GridTank> = tanks
        .iter()
        .filter_map(|tank| TankLabel::parse(&tank.tank_id).map(|label| (label, tank)))
        .collect();

    let racks = layout
        .racks
        .iter()
        .map(|rack| {
            let mut expanded = false;
            let rows = layout
                .rows
                .iter()
                .map(|row| {
                    let slots = (1..=layout.columns)
                        .map(|column| {
                            let label = TankLabel {
                                rack: rack.clone(),
                                row: row.clone(),
                                column,
                            };
                            let tank = by_position.get(&label).copied();
                            if tank.is_some_and(|t| t.active) {
                                expanded = true;
                            }
                            GridSlot {
                                label: label.to_string(),
                                column,
                                state: tank.map_or(SlotState::Empty, GridTank::state),
                                tank: tank.map(|t| t.id),
                                strain_name: tank.and_then(|t| t.strain_name.clone()),
                                strain_id_number: tank.and_then(|t| t.strain_id_number.clone()),
                            }
                        })
                        .collect();
                    GridRow {
                        row: row.clone(),
                        slots,
                    }
                })
                .collect();

            RackSection {
                rack: rack.clone(),
                expanded,
                rows,
            }
        })
        .collect();

    RackGrid { racks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(label: &str, active: bool, total_fish: Option<i32>) -> GridTank {
        GridTank {
            id: Uuid::new_v4(),
            tank_id: label.to_string(),
            active,
            total_fish,
            strain_name: active.then(|| "casper".to_string()),
            strain_id_number: None,
        }
    }

    #[test]
    fn test_label_parsing() {
        let label = TankLabel::parse("ARF2-B-3").unwrap();
        assert_eq!(label.rack, "ARF2");
        assert_eq!(label.row, "B");
        assert_eq!(label.column, 3);
        assert_eq!(label.to_string(), "ARF2-B-3");
    }

    #[test]
    fn test_malformed_labels_are_rejected() {
        for bad in ["", "ARF1", "ARF1-A", "ARF1-A-x", "ARF1-A-0", "ARF1--3", "ARF1-A-3-4", "-A-1"] {
            assert!(TankLabel::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_default_layout() {
        let layout = RackLayout::default();
        assert_eq!(layout.racks.first().map(String::as_str), Some("ARF1"));
        assert_eq!(layout.racks.last().map(String::as_str), Some("ARF6"));
        assert_eq!(layout.rows, vec!["A", "B", "C", "D", "E", "F"]);
        assert_eq!(layout.columns, 10);
    }

    #[test]
    fn test_grid_has_every_position() {
        let layout = RackLayout::default();
        let grid = derive_grid(&layout, &[]);

        assert_eq!(grid.racks.len(), 6);
        for section in &grid.racks {
            assert_eq!(section.rows.len(), 6);
            for row in &section.rows {
                assert_eq!(row.slots.len(), 10);
                assert!(row.slots.iter().all(|s| s.state == SlotState::Empty));
            }
        }
        assert!(grid.expanded_racks().is_empty());
    }

    #[test]
    fn test_slot_states() {
        let layout = RackLayout::default();
        let tanks = vec![
            tank("ARF1-A-1", false, None),
            tank("ARF1-A-2", true, None),
            tank("ARF1-A-3", true, Some(0)),
            tank("ARF1-A-4", true, Some(12)),
        ];
        let grid = derive_grid(&layout, &tanks);

        assert_eq!(grid.slot("ARF1", "A", 1).unwrap().state, SlotState::Inactive);
        assert_eq!(grid.slot("ARF1", "A", 2).unwrap().state, SlotState::ActiveEmpty);
        assert_eq!(grid.slot("ARF1", "A", 3).unwrap().state, SlotState::ActiveEmpty);
        assert_eq!(grid.slot("ARF1", "A", 4).unwrap().state, SlotState::ActiveStocked);
        assert_eq!(grid.slot("ARF1", "A", 5).unwrap().state, SlotState::Empty);

        let stocked = grid.slot("ARF1", "A", 4).unwrap();
        assert_eq!(stocked.tank, Some(tanks[3].id));
        assert_eq!(stocked.strain_name.as_deref(), Some("casper"));
    }

    #[test]
    fn test_only_racks_with_active_tanks_are_expanded() {
        let layout = RackLayout::default();
        let tanks = vec![
            tank("ARF2-C-7", true, Some(3)),
            tank("ARF4-A-1", false, None),
            tank("ARF5-F-10", true, None),
        ];
        let grid = derive_grid(&layout, &tanks);

        assert_eq!(grid.expanded_racks(), vec!["ARF2", "ARF5"]);
    }

    #[test]
    fn test_single_active_tank_without_fish() {
        let layout = RackLayout::default();
        let tanks = vec![tank("ARF2-B-3", true, Some(0))];
        let grid = derive_grid(&layout, &tanks);

        assert_eq!(grid.expanded_racks(), vec!["ARF2"]);
        assert_eq!(grid.slot("ARF2", "B", 3).unwrap().state, SlotState::ActiveEmpty);

        let arf2 = grid.racks.iter().find(|section| section.rack == "ARF2").unwrap();
        let empty = arf2
            .rows
            .iter()
            .flat_map(|row| &row.slots)
            .filter(|slot| slot.state == SlotState::Empty && slot.tank.is_none())
            .count();
        assert_eq!(empty, 59);
    }

    #[test]
    fn test_unplaceable_tanks_are_ignored() {
        let layout = RackLayout::default();
        let tanks = vec![
            tank("not-a-label", true, Some(1)),
            tank("ARF9-A-1", true, Some(1)),
            tank("ARF1-A-11", true, Some(1)),
        ];
        let grid = derive_grid(&layout, &tanks);

        assert!(grid.expanded_racks().is_empty());
        assert!(grid.slot("ARF1", "A", 11).is_none());
    }
}
