//! The pull-iteration protocol shared by every operator.
//!
//! Callers drive a tree through [`Operator`]: `open`, then `has_next`/`next`
//! until exhausted, optionally `rewind`, and finally `close`. Concrete
//! operators implement the smaller [`PullOperator`] hook trait instead and get
//! the protocol (state checks plus a one-row look-ahead buffer) for free.

use crate::tuple::{Row, SchemaRef};

use super::error::{ExecuteResult, IterationError};

/// Lifecycle state of an operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpState {
    #[default]
    Closed,
    Open,
}

/// One-row look-ahead buffer plus the open/closed flag.
///
/// `has_next` pulls a row into the buffer without consuming it; `next` hands
/// the buffered row out. Rewinding or closing drops the buffer.
#[derive(Debug, Default)]
pub struct Lookahead {
    state: OpState,
    buffered: Option<Row>,
    exhausted: bool,
}

impl Lookahead {
    /// Create a closed, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OpState {
        self.state
    }

    /// Check if the operator is open.
    pub fn is_open(&self) -> bool {
        self.state == OpState::Open
    }

    /// The row pulled by the last positive `has_next`, if not yet consumed.
    pub fn buffered(&self) -> Option<&Row> {
        self.buffered.as_ref()
    }

    fn ensure_open(&self) -> ExecuteResult<()> {
        if !self.is_open() {
            return Err(IterationError::NotOpen.into());
        }
        Ok(())
    }

    fn reset(&mut self, state: OpState) {
        self.state = state;
        self.buffered = None;
        self.exhausted = false;
    }
}

/// Trait for all query operators.
pub trait Operator: Send {
    /// Schema of the rows this operator produces.
    fn schema(&self) -> SchemaRef;

    /// Open children and prepare to produce rows.
    fn open(&mut self) -> ExecuteResult<()>;

    /// Check whether another row is available, without consuming it.
    fn has_next(&mut self) -> ExecuteResult<bool>;

    /// Consume the row found by the preceding positive `has_next`.
    fn next(&mut self) -> ExecuteResult<Row>;

    /// Restart output from the beginning.
    fn rewind(&mut self) -> ExecuteResult<()>;

    /// Release resources and close children. Safe to call more than once.
    fn close(&mut self);

    /// Get the next row, or None if exhausted.
    fn next_row(&mut self) -> ExecuteResult<Option<Row>> {
        if self.has_next()? {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Implementation hooks for operators.
///
/// Every type implementing this trait is an [`Operator`]; the blanket
/// implementation owns the state machine and the look-ahead buffer.
pub trait PullOperator: Send {
    /// Schema of the rows this operator produces.
    fn output_schema(&self) -> SchemaRef;

    /// The operator's look-ahead buffer.
    fn lookahead(&mut self) -> &mut Lookahead;

    /// Open children and set up iteration state.
    fn on_open(&mut self) -> ExecuteResult<()>;

    /// Produce the next row, or None at end of data.
    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>>;

    /// Reset iteration state so output starts over.
    fn on_rewind(&mut self) -> ExecuteResult<()>;

    /// Close children and drop iteration state.
    fn on_close(&mut self);
}

impl<T: PullOperator> Operator for T {
    fn schema(&self) -> SchemaRef {
        self.output_schema()
    }

    fn open(&mut self) -> ExecuteResult<()> {
        if self.lookahead().is_open() {
            return Err(IterationError::AlreadyOpen.into());
        }
        if let Err(e) = self.on_open() {
            // Children opened before the failure still need closing.
            self.on_close();
            return Err(e);
        }
        self.lookahead().reset(OpState::Open);
        Ok(())
    }

    fn has_next(&mut self) -> ExecuteResult<bool> {
        let lookahead = self.lookahead();
        lookahead.ensure_open()?;
        if lookahead.buffered.is_some() {
            return Ok(true);
        }
        if lookahead.exhausted {
            return Ok(false);
        }

        let row = self.fetch_next()?;
        let lookahead = self.lookahead();
        lookahead.exhausted = row.is_none();
        lookahead.buffered = row;
        Ok(lookahead.buffered.is_some())
    }

    fn next(&mut self) -> ExecuteResult<Row> {
        let lookahead = self.lookahead();
        lookahead.ensure_open()?;
        lookahead
            .buffered
            .take()
            .ok_or_else(|| IterationError::NoSuchElement.into())
    }

    fn rewind(&mut self) -> ExecuteResult<()> {
        self.lookahead().ensure_open()?;
        self.lookahead().reset(OpState::Open);
        self.on_rewind()
    }

    fn close(&mut self) {
        self.on_close();
        self.lookahead().reset(OpState::Closed);
    }
}
