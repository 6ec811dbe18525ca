use crate::index::VectorIndex;
use crate::types::{is_missing, Value, NAN};

/// A single growable column of cells.
///
/// The logical length is one past the last non-missing cell; trailing missing cells are never
/// stored. Reserved capacity is tracked separately and only released by [`Column::shrink`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Column {
    headline: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headline(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            values: Vec::new(),
        }
    }

    /// Build a column from dense values, trimming trailing missing cells.
    pub fn from_values(headline: impl Into<String>, values: Vec<Value>) -> Self {
        let mut col = Self {
            headline: headline.into(),
            values,
        };
        col.trim_tail();
        col
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn set_headline(&mut self, headline: impl Into<String>) {
        self.headline = headline.into();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Value {
        self.values.get(row).copied().unwrap_or(NAN)
    }

    pub fn is_valid(&self, row: usize) -> bool {
        !is_missing(self.get(row))
    }

    pub fn set(&mut self, row: usize, value: Value) {
        if row >= self.values.len() {
            let Some(len) = row.checked_add(1).filter(|_| !is_missing(value)) else {
                return;
            };
            self.values.resize(len, NAN);
        }
        self.values[row] = value;
        if is_missing(value) && row + 1 == self.values.len() {
            self.trim_tail();
        }
    }

    /// Copy of the selected rows (renumbered from zero) with the same headline.
    pub fn copy_rows(&self, rows: &VectorIndex) -> Self {
        Self::from_values(
            self.headline.clone(),
            rows.iter().map(|r| self.get(r)).collect(),
        )
    }

    pub(crate) fn reserve(&mut self, rows: usize) {
        self.values.reserve(rows.saturating_sub(self.values.len()));
    }

    pub fn shrink(&mut self) {
        self.values.shrink_to_fit();
    }

    /// Drops all cells. The headline is kept.
    pub fn clear(&mut self) {
        self.values = Vec::new();
    }

    pub fn byte_size(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<Value>() + self.headline.capacity()
    }

    fn trim_tail(&mut self) {
        while self.values.last().is_some_and(|v| is_missing(*v)) {
            self.values.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(re: f64) -> Value {
        Value::new(re, 0.0)
    }

    #[test]
    fn writes_grow_and_nan_tail_trims() {
        let mut col = Column::new();
        col.set(3, v(1.0));
        assert_eq!(col.len(), 4);
        assert!(col.get(0).re.is_nan());

        col.set(1, v(2.0));
        col.set(3, NAN);
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(1), v(2.0));

        col.set(10, NAN);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn capacity_survives_trimming_until_shrink() {
        let mut col = Column::new();
        col.set(99, v(1.0));
        col.set(99, NAN);
        assert!(col.is_empty());
        assert!(col.capacity() >= 100);
        col.shrink();
        assert_eq!(col.capacity(), 0);
    }

    #[test]
    fn copy_rows_renumbers() {
        let col = Column::from_values("x", vec![v(0.0), v(1.0), v(2.0), v(3.0)]);
        let copy = col.copy_rows(&VectorIndex::list(vec![3, 1, 8]));
        assert_eq!(copy.headline(), "x");
        assert_eq!(copy.values(), &[v(3.0), v(1.0)]);
    }
}
