//! Commands: named mutation units against a relation.

use crate::diff::diff;
use crate::error::{CommandError, CoreResult};
use crate::input::InputPipeline;
use crate::transaction::{self, TransactionOptions};
use crate::translate::translate;
use tabula_store::{Predicate, Relation, Tuple, Value};

/// Which mutation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Insert new tuples.
    Create,
    /// Update the relation's matching tuples.
    Update,
    /// Delete the relation's matching tuples.
    Delete,
}

/// Declared shape of a command's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Exactly one tuple; any other count is an error.
    One,
    /// A sequence of tuples.
    #[default]
    Many,
}

/// Raw input to a command invocation.
#[derive(Debug, Clone)]
pub enum Input {
    /// No input (delete).
    None,
    /// A single attribute tuple.
    One(Tuple),
    /// A batch of attribute tuples (create only).
    Many(Vec<Tuple>),
}

impl From<()> for Input {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl From<Tuple> for Input {
    fn from(tuple: Tuple) -> Self {
        Self::One(tuple)
    }
}

impl From<Vec<Tuple>> for Input {
    fn from(tuples: Vec<Tuple>) -> Self {
        Self::Many(tuples)
    }
}

/// Result of a command invocation, shaped per the declared cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// The single affected tuple (`Cardinality::One`).
    One(Tuple),
    /// The affected tuples (`Cardinality::Many`).
    Many(Vec<Tuple>),
}

impl Output {
    /// Returns the single tuple, if this is a `One`.
    #[must_use]
    pub fn one(self) -> Option<Tuple> {
        match self {
            Self::One(tuple) => Some(tuple),
            Self::Many(_) => None,
        }
    }

    /// Flattens into a sequence of tuples.
    #[must_use]
    pub fn into_tuples(self) -> Vec<Tuple> {
        match self {
            Self::One(tuple) => vec![tuple],
            Self::Many(tuples) => tuples,
        }
    }

    /// Number of affected tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(tuples) => tuples.len(),
        }
    }

    /// Checks whether no tuples were affected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named mutation operation against one relation.
///
/// Commands are immutable values constructed once at setup time and
/// reused across invocations; every invocation is stateless except for
/// the explicitly bound `original` snapshot. Variants with different
/// configuration, such as the one [`change`](Command::change) returns,
/// are *new* command instances, so callers sharing a command can never
/// observe each other's snapshots.
#[derive(Debug, Clone)]
pub struct Command {
    relation: Relation,
    kind: CommandKind,
    input: InputPipeline,
    cardinality: Cardinality,
    /// Prior tuple state for updates; drives changeset diffing.
    original: Option<Tuple>,
}

impl Command {
    fn new(relation: Relation, kind: CommandKind) -> Self {
        Self {
            relation,
            kind,
            input: InputPipeline::new(),
            cardinality: Cardinality::default(),
            original: None,
        }
    }

    /// Creates an insert command for `relation`.
    #[must_use]
    pub fn create(relation: Relation) -> Self {
        Self::new(relation, CommandKind::Create)
    }

    /// Creates an update command for `relation`.
    ///
    /// The update targets whatever rows the relation's filter matches
    /// at invocation time.
    #[must_use]
    pub fn update(relation: Relation) -> Self {
        Self::new(relation, CommandKind::Update)
    }

    /// Creates a delete command for `relation`.
    #[must_use]
    pub fn delete(relation: Relation) -> Self {
        Self::new(relation, CommandKind::Delete)
    }

    /// Replaces the input pipeline.
    #[must_use]
    pub fn with_input(mut self, input: InputPipeline) -> Self {
        self.input = input;
        self
    }

    /// Declares the result cardinality.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Returns a new command bound to a freshly fetched prior state.
    ///
    /// The receiver is untouched; the returned command diffs update
    /// input against `original` and persists only what changed.
    #[must_use]
    pub fn change(&self, original: Tuple) -> Self {
        Self {
            original: Some(original),
            ..self.clone()
        }
    }

    /// The command's operation kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The declared result cardinality.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The bound prior-state snapshot, if any.
    #[must_use]
    pub const fn original(&self) -> Option<&Tuple> {
        self.original.as_ref()
    }

    /// The target relation.
    #[must_use]
    pub const fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Executes the command and returns the affected tuples.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Validation`] if the input pipeline rejects the
    ///   input; the store is not touched.
    /// - [`CommandError::Constraint`] if the store rejects the
    ///   mutation; the store is left in its pre-call state.
    /// - [`CommandError::Cardinality`] if `Cardinality::One` was
    ///   declared but the mutation affected zero or several rows.
    /// - [`CommandError::InvalidOperation`] if the input shape does not
    ///   fit the command kind.
    pub fn call(&self, input: impl Into<Input>) -> CoreResult<Output> {
        let input = input.into();
        tracing::debug!(kind = ?self.kind, relation = self.relation.name(), "executing command");
        let rows = match self.kind {
            CommandKind::Create => self.execute_create(input)?,
            CommandKind::Update => {
                let tuple = single_input(input, "update")?;
                let attributes = self.input.normalize(tuple)?;
                let changed = diff(&attributes, self.original.as_ref());
                if changed.is_empty() {
                    // No-op update: success with no store access, and no
                    // cardinality check against the empty result.
                    tracing::debug!(relation = self.relation.name(), "empty changeset, skipping store");
                    return Ok(Output::Many(Vec::new()));
                }
                self.execute_update(&changed)?
            }
            CommandKind::Delete => {
                if !matches!(input, Input::None) {
                    return Err(CommandError::invalid_operation("delete takes no input"));
                }
                self.execute_delete()?
            }
        };
        self.shape(rows)
    }

    /// Runs `body` inside a transaction on this command's connection.
    ///
    /// See [`transaction::transaction`] for the full contract.
    pub fn transaction<T>(&self, body: impl FnOnce() -> CoreResult<T>) -> CoreResult<Option<T>> {
        self.transaction_with(TransactionOptions::default(), body)
    }

    /// Runs `body` inside a transaction with explicit options.
    pub fn transaction_with<T>(
        &self,
        options: TransactionOptions,
        body: impl FnOnce() -> CoreResult<T>,
    ) -> CoreResult<Option<T>> {
        transaction::transaction(self.relation.connection(), options, body)
    }

    fn execute_create(&self, input: Input) -> CoreResult<Vec<Tuple>> {
        let tuples = match input {
            Input::One(tuple) => vec![tuple],
            Input::Many(tuples) => tuples,
            Input::None => {
                return Err(CommandError::invalid_operation("create requires input"));
            }
        };

        // Normalize the whole batch up front: a validation failure on
        // any tuple must reject the call before anything is persisted.
        let mut batch = Vec::with_capacity(tuples.len());
        for raw in tuples {
            batch.push(self.input.normalize(raw)?);
        }

        let pk = self.relation.primary_key().map_err(translate)?;
        let mut rows = Vec::with_capacity(batch.len());
        for attributes in batch {
            let id = self.relation.insert(&attributes).map_err(translate)?;
            rows.extend(self.fetch_by_ids(&pk, vec![id])?);
        }
        Ok(rows)
    }

    /// Update path: snapshot the targeted identities before mutating,
    /// apply the changeset, then re-fetch by the captured identities.
    /// The targeting predicate may reference columns being changed, so
    /// re-running it after the update could silently miss rows.
    fn execute_update(&self, changed: &Tuple) -> CoreResult<Vec<Tuple>> {
        let pk = self.relation.primary_key().map_err(translate)?;
        let ids: Vec<Value> = self
            .relation
            .tuples()
            .map_err(translate)?
            .into_iter()
            .filter_map(|mut row| row.remove(&pk))
            .collect();

        self.relation.update(changed).map_err(translate)?;
        self.fetch_by_ids(&pk, ids)
    }

    fn execute_delete(&self) -> CoreResult<Vec<Tuple>> {
        let rows = self.relation.tuples().map_err(translate)?;
        self.relation.delete().map_err(translate)?;
        Ok(rows)
    }

    fn fetch_by_ids(&self, pk: &str, ids: Vec<Value>) -> CoreResult<Vec<Tuple>> {
        self.relation
            .unfiltered()
            .filter(Predicate::is_in(pk, ids))
            .tuples()
            .map_err(translate)
    }

    fn shape(&self, mut rows: Vec<Tuple>) -> CoreResult<Output> {
        match self.cardinality {
            Cardinality::Many => Ok(Output::Many(rows)),
            Cardinality::One => {
                if rows.len() == 1 {
                    Ok(Output::One(rows.swap_remove(0)))
                } else {
                    Err(CommandError::Cardinality {
                        expected: 1,
                        got: rows.len(),
                    })
                }
            }
        }
    }
}

fn single_input(input: Input, operation: &str) -> CoreResult<Tuple> {
    match input {
        Input::One(tuple) => Ok(tuple),
        Input::None | Input::Many(_) => Err(CommandError::invalid_operation(format!(
            "{operation} takes a single tuple"
        ))),
    }
}
