//! Projection operator.

use super::error::ExecuteResult;
use super::operator::{Lookahead, Operator, PullOperator};
use crate::tuple::{Row, Schema, SchemaRef};

/// Project operator - keeps the listed child columns, in the listed order.
pub struct Project {
    indices: Vec<usize>,
    schema: SchemaRef,
    child: Box<dyn Operator>,
    lookahead: Lookahead,
}

impl Project {
    pub fn new(indices: Vec<usize>, child: Box<dyn Operator>) -> ExecuteResult<Self> {
        let child_schema = child.schema();
        let columns = indices
            .iter()
            .map(|&i| child_schema.column(i).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            indices,
            schema: Schema::from_columns(columns).into_ref(),
            child,
            lookahead: Lookahead::new(),
        })
    }

    /// Child column indices in output order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl PullOperator for Project {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.child.open()
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        if !self.child.has_next()? {
            return Ok(None);
        }
        let source = self.child.next()?;
        let mut projected = Row::new(self.schema.clone());
        for (out, &i) in self.indices.iter().enumerate() {
            projected.set_field(out, source.get(i)?.clone())?;
        }
        Ok(Some(projected))
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.child.rewind()
    }

    fn on_close(&mut self) {
        self.child.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecuteError, VecScan};
    use crate::testutil::{drain_ints, int_scan, int_schema};
    use crate::tuple::{Field, SchemaError};

    #[test]
    fn test_project_reorders_columns() {
        let scan = int_scan(&[&[1, 2, 3], &[4, 5, 6]]);
        let mut project = Project::new(vec![2, 0], Box::new(scan)).unwrap();
        assert_eq!(project.schema().num_fields(), 2);
        assert_eq!(project.schema().field_name(0).unwrap(), "c2");

        project.open().unwrap();
        assert_eq!(drain_ints(&mut project), vec![vec![3, 1], vec![6, 4]]);
    }

    #[test]
    fn test_project_fails_on_unset_field() {
        let schema = int_schema(2).into_ref();
        let mut row = Row::new(schema.clone());
        row.set_field(0, Field::Int(1)).unwrap();
        let scan = VecScan::new(schema, vec![row]);
        let mut project = Project::new(vec![1], Box::new(scan)).unwrap();

        project.open().unwrap();
        let err = project.has_next().unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Schema(SchemaError::UnsetField(1))
        ));
    }

    #[test]
    fn test_project_rejects_unknown_column() {
        let scan = int_scan(&[&[1]]);
        assert!(Project::new(vec![3], Box::new(scan)).is_err());
    }
}
