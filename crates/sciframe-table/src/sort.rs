//! Row sorting, optionally by hierarchical column keys.
//!
//! Sorting always builds a row permutation first and then moves cells column by column, so the
//! key column and the columns attached to it move consistently. Each key column is resorted from
//! scratch; there is no composite comparator across keys.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::TableError;
use crate::index::VectorIndex;
use crate::table::Table;
use crate::types::{is_missing, Value};

/// Hierarchical sort key, zero-based relative to the first column of the sorted block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnKeys {
    pub first: usize,
    /// Exclusive end; `None` for the single column `first`.
    pub end: Option<usize>,
    /// Key applied inside runs of equal values of this key.
    pub subkeys: Option<Box<ColumnKeys>>,
}

impl ColumnKeys {
    pub fn single(first: usize) -> Self {
        Self {
            first,
            end: None,
            subkeys: None,
        }
    }

    pub fn columns(&self) -> Range<usize> {
        self.first..self.end.unwrap_or(self.first + 1)
    }

    /// Parse a comma separated list of key groups for a block `width` columns wide.
    ///
    /// Grammar (1-based, `N:M` inclusive): `group (',' group)*`, with
    /// `group := range ('[' group ']')?` and `range := N | N ':' | N ':' M`.
    pub fn parse_list(expr: &str, width: usize) -> Result<Vec<ColumnKeys>, TableError> {
        let mut parser = KeyParser {
            src: expr.as_bytes(),
            pos: 0,
            width,
        };
        parser
            .list()
            .ok_or_else(|| TableError::Sort {
                expression: expr.to_owned(),
            })
    }
}

struct KeyParser<'a> {
    src: &'a [u8],
    pos: usize,
    width: usize,
}

impl KeyParser<'_> {
    fn list(&mut self) -> Option<Vec<ColumnKeys>> {
        let mut groups = vec![self.group()?];
        while self.eat(b',') {
            groups.push(self.group()?);
        }
        self.skip_ws();
        (self.pos == self.src.len()).then_some(groups)
    }

    fn group(&mut self) -> Option<ColumnKeys> {
        let first = self.number()?;
        if first == 0 || first > self.width {
            return None;
        }
        let end = if self.eat(b':') {
            self.skip_ws();
            let bounded = self.src.get(self.pos).is_some_and(u8::is_ascii_digit);
            let end = if bounded { self.number()? } else { self.width };
            if end < first || end > self.width {
                return None;
            }
            Some(end)
        } else {
            None
        };
        let subkeys = if self.eat(b'[') {
            let sub = self.group()?;
            if !self.eat(b']') {
                return None;
            }
            Some(Box::new(sub))
        } else {
            None
        };
        Some(ColumnKeys {
            first: first - 1,
            end,
            subkeys,
        })
    }

    fn number(&mut self) -> Option<usize> {
        self.skip_ws();
        let start = self.pos;
        while self.src.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.src.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub descending: bool,
    /// Return the permutation instead of moving data.
    pub return_index: bool,
    /// Column key groups; `None` sorts every column independently.
    pub keys: Option<String>,
}

impl SortOptions {
    /// Parse whitespace separated options: `desc`, `asc`, `index`, `cols=<keys>` or `c=<keys>`.
    pub fn parse(expr: &str) -> Result<Self, TableError> {
        let mut options = Self::default();
        for token in expr.split_whitespace() {
            let token = token.trim_start_matches('-');
            match token {
                "desc" => options.descending = true,
                "asc" => options.descending = false,
                "index" => options.return_index = true,
                _ => {
                    let keys = token
                        .strip_prefix("cols=")
                        .or_else(|| token.strip_prefix("c="))
                        .filter(|k| !k.is_empty())
                        .ok_or_else(|| TableError::Sort {
                            expression: expr.to_owned(),
                        })?;
                    options.keys = Some(keys.to_owned());
                }
            }
        }
        Ok(options)
    }
}

/// Missing values sort last in both directions.
fn compare(a: Value, b: Value, descending: bool) -> Ordering {
    match (is_missing(a), is_missing(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.re.total_cmp(&b.re);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

fn same_key(a: Value, b: Value) -> bool {
    (is_missing(a) && is_missing(b)) || a.re == b.re
}

impl Table {
    /// Sort the rows of a block.
    ///
    /// Without keys every selected column is sorted on its own. With keys, each key column is
    /// sorted and moves the columns of its subkey chain along with it. In index mode nothing
    /// moves and the 1-based row permutation of the first sorted column is returned.
    pub fn sort_elements(
        &mut self,
        lines: &VectorIndex,
        cols: &VectorIndex,
        options: &SortOptions,
    ) -> Result<Option<Vec<usize>>, TableError> {
        lines.validate()?;
        cols.validate()?;
        if self.columns.is_empty() {
            return Ok(options.return_index.then(Vec::new));
        }
        let lines = lines.resolve(self.get_lines(false)).linearize();
        let cols = cols.resolve(self.get_cols(false)).linearize();
        if lines.is_empty() || cols.is_empty() {
            return Ok(options.return_index.then(Vec::new));
        }
        let rows = lines.min()..lines.max() + 1;
        let (j1, j2) = (cols.min(), cols.max());
        let desc = options.descending;
        let reset = || rows.clone().collect::<Vec<usize>>();

        let Some(expr) = options.keys.as_deref() else {
            for j in j1..=j2 {
                let mut idx = reset();
                self.sort_index(&mut idx, j, desc);
                if options.return_index {
                    return Ok(Some(idx.into_iter().map(|i| i + 1).collect()));
                }
                self.reorder_column(&idx, rows.start, j);
            }
            self.after_sort();
            return Ok(None);
        };

        for keys in ColumnKeys::parse_list(expr, j2 - j1 + 1)? {
            for key in keys.columns() {
                let mut idx = reset();
                self.sort_index(&mut idx, j1 + key, desc);
                if let Some(sub) = keys.subkeys.as_deref() {
                    self.sort_sub_list(&mut idx, j1 + key, sub, j1, desc);
                }
                if options.return_index {
                    return Ok(Some(idx.into_iter().map(|i| i + 1).collect()));
                }
                self.reorder_column(&idx, rows.start, j1 + key);
                let mut sub = keys.subkeys.as_deref();
                while let Some(level) = sub {
                    for c in level.columns() {
                        self.reorder_column(&idx, rows.start, j1 + c);
                    }
                    sub = level.subkeys.as_deref();
                }
            }
        }
        self.after_sort();
        Ok(None)
    }

    fn sort_index(&self, idx: &mut [usize], col: usize, descending: bool) {
        idx.sort_by(|&a, &b| compare(self.read_mem(a, col), self.read_mem(b, col), descending));
    }

    /// Within every run of rows sharing a value in `parent`, order by `keys` (recursively).
    fn sort_sub_list(
        &self,
        idx: &mut [usize],
        parent: usize,
        keys: &ColumnKeys,
        j1: usize,
        descending: bool,
    ) {
        let col = j1 + keys.first;
        let mut start = 0;
        while start < idx.len() {
            let head = self.read_mem(idx[start], parent);
            let mut end = start + 1;
            while end < idx.len() && same_key(self.read_mem(idx[end], parent), head) {
                end += 1;
            }
            if end - start > 1 {
                let run = &mut idx[start..end];
                self.sort_index(run, col, descending);
                if let Some(sub) = keys.subkeys.as_deref() {
                    self.sort_sub_list(run, col, sub, j1, descending);
                }
            }
            start = end;
        }
    }

    fn reorder_column(&mut self, idx: &[usize], first_row: usize, col: usize) {
        let Some(Some(column)) = self.columns.get_mut(col) else {
            return;
        };
        let sorted: Vec<Value> = idx.iter().map(|&i| column.get(i)).collect();
        for (k, v) in sorted.into_iter().enumerate() {
            column.set(first_row + k, v);
        }
    }

    fn after_sort(&mut self) {
        self.invalidate_lines();
        self.mark_modified();
    }
}
