//! Row-identity predicates: opaque AND-combinations of column equalities.
//!
//! A [`Predicate`] is what update/delete hand to the storage engine to locate
//! their target rows. Engines either translate the clauses into their own
//! query form or evaluate them directly with [`Predicate::matches`].

use std::collections::BTreeMap;
use std::fmt;

use crate::value::ColumnValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    /// An empty predicate would match every row; building one is always a bug.
    Empty,
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateError::Empty => write!(f, "predicate has no clauses"),
        }
    }
}

impl std::error::Error for PredicateError {}

/// One `column = value` equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub value: ColumnValue,
}

/// AND-combination of equality clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn builder() -> PredicateBuilder {
        PredicateBuilder {
            clauses: Vec::new(),
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluate against an in-memory row image. A clause on a column absent
    /// from the row does not match.
    pub fn matches(&self, row: &BTreeMap<String, ColumnValue>) -> bool {
        self.clauses
            .iter()
            .all(|clause| row.get(&clause.column) == Some(&clause.value))
    }
}

pub struct PredicateBuilder {
    clauses: Vec<Clause>,
}

impl PredicateBuilder {
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.clauses.push(Clause {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Result<Predicate, PredicateError> {
        if self.clauses.is_empty() {
            return Err(PredicateError::Empty);
        }
        Ok(Predicate {
            clauses: self.clauses,
        })
    }
}
