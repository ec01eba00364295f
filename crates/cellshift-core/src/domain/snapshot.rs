//! Snapshot: the immutable terminal/cell tables for one invocation.

use std::collections::HashMap;

use super::ids::CellId;
use super::record::{CellRecord, TerminalRecord};

/// Terminal and cell tables read for a single decision cycle.
///
/// Order is the repository's enumeration order. Cell lookups by [`CellId`]
/// resolve to the first cell carrying that id, which is the one the loader keeps.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    terminals: Vec<TerminalRecord>,
    cells: Vec<CellRecord>,
    by_cell_id: HashMap<CellId, usize>,
}

impl Snapshot {
    pub fn new(terminals: Vec<TerminalRecord>, cells: Vec<CellRecord>) -> Self {
        let mut by_cell_id = HashMap::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            by_cell_id.entry(cell.cell_id).or_insert(idx);
        }
        Self {
            terminals,
            cells,
            by_cell_id,
        }
    }

    pub fn terminals(&self) -> &[TerminalRecord] {
        &self.terminals
    }

    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    pub fn cell(&self, cell_id: CellId) -> Option<&CellRecord> {
        self.by_cell_id.get(&cell_id).map(|&idx| &self.cells[idx])
    }

    pub fn contains_cell(&self, cell_id: CellId) -> bool {
        self.by_cell_id.contains_key(&cell_id)
    }

    /// Cells sorted by ascending [`CellId`].
    pub fn cells_by_id(&self) -> Vec<&CellRecord> {
        let mut cells: Vec<&CellRecord> = self.cells.iter().collect();
        cells.sort_by_key(|c| c.cell_id);
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::CellNodeId;
    use crate::domain::position::Position;

    fn cell(node: u64, id: u16) -> CellRecord {
        CellRecord::new(CellNodeId::new(node), CellId(id), Position::new(node as f64, 0.0, 0.0))
    }

    #[test]
    fn cell_lookup_by_id() {
        let snapshot = Snapshot::new(vec![], vec![cell(10, 3), cell(11, 1)]);
        assert_eq!(snapshot.cell(CellId(1)).map(|c| c.node_id.get()), Some(11));
        assert!(snapshot.cell(CellId(2)).is_none());
        assert!(snapshot.contains_cell(CellId(3)));
    }

    #[test]
    fn cells_by_id_is_sorted_regardless_of_input_order() {
        let snapshot = Snapshot::new(vec![], vec![cell(10, 3), cell(11, 1), cell(12, 2)]);
        let ids: Vec<u16> = snapshot.cells_by_id().iter().map(|c| c.cell_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // enumeration order is untouched
        assert_eq!(snapshot.cells()[0].cell_id, CellId(3));
    }
}
