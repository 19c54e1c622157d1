//! Tri-state field updates and SET-list generation

use crate::orm::SqlValue;

/// A single field of a partial update.
///
/// `Absent` leaves the stored column untouched, `Null` clears it and `Value`
/// overwrites it. Keeping `Absent` and `Null` apart is the whole point of the
/// type: an `Option<T>` cannot express "not mentioned".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    /// Build a patch from a presence flag and a possibly-null value
    pub fn from_presence(present: bool, value: Option<T>) -> Self {
        match (present, value) {
            (false, _) => Patch::Absent,
            (true, None) => Patch::Null,
            (true, Some(v)) => Patch::Value(v),
        }
    }

    /// The value to write, or `None` when the field must not be written at all
    pub fn into_write(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

/// Ordered `column = ?` assignments for an UPDATE statement.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SetList {
    columns: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl SetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally assign a column
    pub fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.columns.push(column);
        self.values.push(value.into());
        self
    }

    /// Assign a column only when the patch mentions it
    pub fn patch<T: Clone + Into<SqlValue>>(
        &mut self,
        column: &'static str,
        patch: &Patch<T>,
    ) -> &mut Self {
        if let Some(value) = patch.clone().into_write() {
            self.set(column, value);
        }
        self
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Render the assignments as `a = ?, b = ?` and hand back the bound values
    pub fn into_sql(self) -> (String, Vec<SqlValue>) {
        let sql = self
            .columns
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        (sql, self.values)
    }
}
