//! Slotted heap pages as handed out by the buffer pool.

use crate::tuple::{PageId, RecordId, Row};

/// A page of row slots. Empty slots are `None`.
#[derive(Debug, Clone)]
pub struct HeapPage {
    id: PageId,
    slots: Vec<Option<Row>>,
}

impl HeapPage {
    /// Create an empty page with `capacity` slots.
    pub fn new(id: PageId, capacity: usize) -> Self {
        Self {
            id,
            slots: vec![None; capacity],
        }
    }

    /// Id of this page.
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Total number of slots.
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of empty slots.
    pub fn num_empty_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Row stored in `slot`, if any.
    pub fn row(&self, slot: usize) -> Option<&Row> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Iterate over stored rows in slot order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Store `row` in the first free slot, stamping its record id.
    ///
    /// Returns the row back if the page is full.
    pub fn insert(&mut self, mut row: Row) -> Result<RecordId, Row> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(row);
        };
        let rid = RecordId::new(self.id, slot);
        row.set_record_id(Some(rid));
        self.slots[slot] = Some(row);
        Ok(rid)
    }

    /// Clear `slot`, returning the row that was there.
    pub fn delete(&mut self, slot: usize) -> Option<Row> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{Field, SchemaBuilder, TableId};

    #[test]
    fn test_insert_until_full() {
        let schema = SchemaBuilder::new().int("v").build().into_ref();
        let mut page = HeapPage::new(PageId::new(TableId(1), 0), 2);

        let row = |v| Row::from_fields(schema.clone(), vec![Field::Int(v)]).unwrap();
        let first = page.insert(row(1)).unwrap();
        let second = page.insert(row(2)).unwrap();
        assert_eq!(first.slot(), 0);
        assert_eq!(second.slot(), 1);
        assert!(page.insert(row(3)).is_err());
        assert_eq!(page.num_empty_slots(), 0);

        let removed = page.delete(0).unwrap();
        assert_eq!(removed.record_id(), Some(first));
        assert_eq!(page.rows().count(), 1);
        assert_eq!(page.insert(row(4)).unwrap().slot(), 0);
    }
}
