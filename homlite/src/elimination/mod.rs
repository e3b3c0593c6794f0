//! Reduction of matrices to echelon, Hermite or diagonal (Smith) form by elementary operations.
//!
//! An [`Eliminator`] owns a [`RowStore`] and drives one of the strategies in [`echelon`],
//! [`hermite`] or [`diagonal`] over it. Column forms are obtained by running the row strategies on
//! the transposed store, see [`Eliminator::run_transposed`].
//! Every applied operation is recorded, and the finished log is handed to an
//! [`EliminationResult`] which rebuilds the transforms lazily.

use std::fmt::Debug;

use log::{debug, trace};

use crate::matrices::Matrix;
use crate::rings::{EuclideanRing, Ring};
use crate::store::RowStore;

pub mod diagonal;
pub mod echelon;
pub mod hermite;
pub mod operations;
pub mod result;

use diagonal::DiagonalStrategy;
use echelon::RowEchelonStrategy;
use hermite::RowHermiteStrategy;
use operations::{ElementaryOperation, Operation, OperationLog};
pub use result::EliminationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EliminationForm {
    RowEchelon,
    ColEchelon,
    RowHermite,
    ColHermite,
    /// Smith normal form: diagonal, normalized, each entry divides the next.
    Diagonal,
}

impl EliminationForm {
    pub fn is_row_form(self) -> bool {
        matches!(self, EliminationForm::RowEchelon | EliminationForm::RowHermite)
    }

    pub fn is_col_form(self) -> bool {
        matches!(self, EliminationForm::ColEchelon | EliminationForm::ColHermite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliminationConfig {
    /// Batches of row additions at least this large are merged in parallel
    /// (only with the `parallel` feature).
    pub parallel_threshold: usize,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64,
        }
    }
}

// ======== Observers ==========================================

/// Receives a callback for every stage of an elimination.
/// All methods default to doing nothing.
pub trait Observer<R: Ring> {
    fn on_start(&mut self, _size: (usize, usize), _form: EliminationForm) {}

    fn on_operation(&mut self, _op: &ElementaryOperation<R>) {}

    fn on_finish(&mut self, _result: &Matrix<R>) {}
}

/// Forwards every operation to [`log::trace!`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl<R: Ring> Observer<R> for LogObserver {
    fn on_operation(&mut self, op: &ElementaryOperation<R>) {
        trace!("{op}");
    }

    fn on_finish(&mut self, result: &Matrix<R>) {
        trace!("Eliminated matrix:\n{result}");
    }
}

// ======== Driver =============================================

pub(crate) enum Step {
    Continue,
    Done,
}

/// One elimination procedure, advanced a step at a time by [`Eliminator::drive`].
pub(crate) trait Strategy<R: EuclideanRing> {
    fn prepare(&mut self, _eliminator: &mut Eliminator<R>) {}

    fn step(&mut self, eliminator: &mut Eliminator<R>) -> Step;
}

pub struct Eliminator<R: EuclideanRing> {
    form: EliminationForm,
    store: RowStore<R>,
    // Whether `store` currently holds the transpose of the matrix being eliminated
    transposed: bool,
    log: OperationLog<R>,
    observer: Box<dyn Observer<R>>,
    config: EliminationConfig,
}

impl<R: EuclideanRing> Eliminator<R> {
    pub fn new(matrix: &Matrix<R>, form: EliminationForm) -> Self {
        Self {
            form,
            store: RowStore::from_matrix(matrix),
            transposed: false,
            log: OperationLog::default(),
            observer: Box::new(LogObserver),
            config: EliminationConfig::default(),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer<R> + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_config(mut self, config: EliminationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(mut self) -> EliminationResult<R> {
        let size = self.store.size();
        debug!("Eliminating {}x{} matrix into {:?} form", size.0, size.1, self.form);
        self.observer.on_start(size, self.form);

        match self.form {
            EliminationForm::RowEchelon => self.drive(RowEchelonStrategy::default()),
            EliminationForm::ColEchelon => {
                self.run_transposed(|e| e.drive(RowEchelonStrategy::default()))
            }
            EliminationForm::RowHermite => self.drive(RowHermiteStrategy::default()),
            EliminationForm::ColHermite => {
                self.run_transposed(|e| e.drive(RowHermiteStrategy::default()))
            }
            EliminationForm::Diagonal => self.drive(DiagonalStrategy),
        }

        let result = self.store.into_matrix();
        self.observer.on_finish(&result);
        let result = EliminationResult::new(self.form, result, self.log);
        debug!(
            "Finished {:?} elimination: rank {}, {} operations",
            self.form,
            result.rank(),
            result.operations().len()
        );
        result
    }

    // ====== Used by the strategies ===========

    pub(crate) fn store(&self) -> &RowStore<R> {
        &self.store
    }

    pub(crate) fn drive<S: Strategy<R>>(&mut self, mut strategy: S) {
        strategy.prepare(self);
        while let Step::Continue = strategy.step(self) {}
    }

    /// Runs `f` with rows and columns exchanged, so row operations inside act on columns.
    pub(crate) fn run_transposed(&mut self, f: impl FnOnce(&mut Self)) {
        self.store.transpose();
        self.transposed = !self.transposed;
        f(self);
        self.store.transpose();
        self.transposed = !self.transposed;
    }

    fn record(&mut self, op: Operation<R>) {
        let op = if self.transposed {
            ElementaryOperation::Col(op)
        } else {
            ElementaryOperation::Row(op)
        };
        self.observer.on_operation(&op);
        self.log.push(op);
    }

    pub(crate) fn apply(&mut self, op: Operation<R>) {
        self.store.apply(&op);
        self.record(op);
    }

    /// `row[to] += by * row[from]` for every `(to, by)`, all against the same pivot row.
    pub(crate) fn apply_batch(&mut self, from: usize, targets: Vec<(usize, R)>) {
        if targets.is_empty() {
            return;
        }
        self.store
            .batch_add_row(from, &targets, self.config.parallel_threshold);
        for (to, by) in targets {
            self.record(Operation::Add { from, to, by });
        }
    }
}

impl<R: EuclideanRing> Debug for Eliminator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eliminator")
            .field("form", &self.form)
            .field("size", &self.store.size())
            .field("transposed", &self.transposed)
            .field("operations", &self.log.len())
            .finish()
    }
}

impl<R: EuclideanRing> Matrix<R> {
    /// Smith normal form of this matrix.
    pub fn eliminate(&self) -> EliminationResult<R> {
        self.elimination(EliminationForm::Diagonal)
    }

    pub fn elimination(&self, form: EliminationForm) -> EliminationResult<R> {
        Eliminator::new(self, form).run()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::operations::ElementaryOperation;
    use super::{EliminationConfig, EliminationForm, Eliminator, Observer};
    use crate::matrices::Matrix;

    #[derive(Default)]
    struct Counter {
        rows: Rc<RefCell<usize>>,
        cols: Rc<RefCell<usize>>,
    }

    impl Observer<i64> for Counter {
        fn on_operation(&mut self, op: &ElementaryOperation<i64>) {
            match op {
                ElementaryOperation::Row(_) => *self.rows.borrow_mut() += 1,
                ElementaryOperation::Col(_) => *self.cols.borrow_mut() += 1,
            }
        }
    }

    #[test]
    fn test_observer_sees_every_operation() {
        let counter = Counter::default();
        let (rows, cols) = (counter.rows.clone(), counter.cols.clone());
        let a = Matrix::<i64>::from_data((2, 3), [2, 4, 4, -6, 6, 12]);
        let result = Eliminator::new(&a, EliminationForm::Diagonal)
            .with_observer(counter)
            .run();
        let logged = result.operations().iter().fold((0, 0), |(r, c), op| match op {
            ElementaryOperation::Row(_) => (r + 1, c),
            ElementaryOperation::Col(_) => (r, c + 1),
        });
        assert_eq!((*rows.borrow(), *cols.borrow()), logged);
        assert!(*cols.borrow() > 0);
    }

    #[test]
    fn test_config_does_not_change_result() {
        let a = Matrix::<i64>::from_data((3, 3), [2, 4, 6, 4, 9, 1, 6, 3, 5]);
        let default = a.eliminate();
        let eager = Eliminator::new(&a, EliminationForm::Diagonal)
            .with_config(EliminationConfig {
                parallel_threshold: 0,
            })
            .run();
        assert_eq!(default.result(), eager.result());
        assert_eq!(default.left(), eager.left());
        assert_eq!(default.right(), eager.right());
    }

    #[test]
    fn test_column_forms_log_column_operations() {
        let a = Matrix::<i64>::from_data((2, 2), [0, 2, 3, 1]);
        let result = a.elimination(EliminationForm::ColEchelon);
        assert!(result
            .operations()
            .iter()
            .all(|op| matches!(op, ElementaryOperation::Col(_))));
        assert_eq!(result.left(), Matrix::identity(2));
    }
}
