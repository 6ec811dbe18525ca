use crate::error::TableError;

/// Row or column selection.
///
/// An [`VectorIndex::OpenEnd`] selection is only a starting position; it is closed against the
/// table extent by [`VectorIndex::resolve`] at the point of use. Until then it behaves like the
/// single position `first`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VectorIndex {
    List(Vec<usize>),
    /// Inclusive, ascending.
    Range { first: usize, last: usize },
    OpenEnd { first: usize },
}

impl VectorIndex {
    pub fn single(pos: usize) -> Self {
        Self::Range {
            first: pos,
            last: pos,
        }
    }

    pub fn range(first: usize, last: usize) -> Self {
        Self::Range { first, last }
    }

    pub fn open_end(first: usize) -> Self {
        Self::OpenEnd { first }
    }

    /// Everything from position zero to the table extent.
    pub fn all() -> Self {
        Self::OpenEnd { first: 0 }
    }

    pub fn list(positions: impl Into<Vec<usize>>) -> Self {
        Self::List(positions.into())
    }

    pub fn validate(&self) -> Result<(), TableError> {
        match self {
            Self::List(v) if v.is_empty() => Err(TableError::InvalidSelection {
                reason: "empty index list".into(),
            }),
            Self::Range { first, last } if first > last => Err(TableError::InvalidSelection {
                reason: format!("inverted range {first}..={last}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn is_open_end(&self) -> bool {
        matches!(self, Self::OpenEnd { .. })
    }

    /// Close an open end against `extent` (exclusive). Bounded selections are returned as-is.
    pub fn resolve(&self, extent: usize) -> Self {
        match *self {
            Self::OpenEnd { first } if first < extent => Self::Range {
                first,
                last: extent - 1,
            },
            Self::OpenEnd { .. } => Self::List(Vec::new()),
            _ => self.clone(),
        }
    }

    /// Close an open end so that it ends at `last` (inclusive), as long as `last >= first`.
    pub(crate) fn resolve_to(&self, last: usize) -> Self {
        match *self {
            Self::OpenEnd { first } => Self::Range {
                first,
                last: last.max(first),
            },
            _ => self.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::List(v) => v.len(),
            Self::Range { first, last } if first <= last => (last - first).saturating_add(1),
            Self::Range { .. } => 0,
            Self::OpenEnd { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<usize> {
        match self {
            Self::List(v) => v.get(i).copied(),
            Self::Range { first, last } => {
                let pos = first.checked_add(i)?;
                (pos <= *last).then_some(pos)
            }
            Self::OpenEnd { first } => (i == 0).then_some(*first),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            pos: 0,
            len: self.len(),
        }
    }

    pub fn front(&self) -> usize {
        self.get(0).unwrap_or(0)
    }

    pub fn last(&self) -> usize {
        match self {
            Self::List(v) => v.last().copied().unwrap_or(0),
            Self::Range { last, .. } => *last,
            Self::OpenEnd { first } => *first,
        }
    }

    pub fn max(&self) -> usize {
        match self {
            Self::List(v) => v.iter().copied().max().unwrap_or(0),
            _ => self.last(),
        }
    }

    pub fn min(&self) -> usize {
        match self {
            Self::List(v) => v.iter().copied().min().unwrap_or(0),
            _ => self.front(),
        }
    }

    /// `len` elements starting at element `start`; `None` takes the rest.
    pub fn sub_index(&self, start: usize, len: Option<usize>) -> Self {
        let avail = self.len().saturating_sub(start);
        let len = len.map_or(avail, |l| l.min(avail));
        match self {
            Self::List(v) => Self::List(v[start.min(v.len())..][..len].to_vec()),
            Self::Range { first, .. } if len > 0 => Self::Range {
                first: first + start,
                last: first + start + len - 1,
            },
            Self::OpenEnd { first } if start == 0 && len > 0 => Self::OpenEnd { first: *first },
            _ => Self::List(Vec::new()),
        }
    }

    /// The contiguous range spanning the smallest to the largest position.
    pub fn linearize(&self) -> Self {
        match self {
            Self::OpenEnd { .. } => self.clone(),
            _ if self.is_empty() => Self::List(Vec::new()),
            _ => Self::Range {
                first: self.min(),
                last: self.max(),
            },
        }
    }

    /// Restrict every position to `first..=last`.
    pub fn clamp(&self, first: usize, last: usize) -> Self {
        match self {
            Self::List(v) => Self::List(
                v.iter()
                    .copied()
                    .filter(|p| (first..=last).contains(p))
                    .collect(),
            ),
            Self::Range { first: f, last: l } => {
                let (f, l) = ((*f).max(first), (*l).min(last));
                if f <= l {
                    Self::Range { first: f, last: l }
                } else {
                    Self::List(Vec::new())
                }
            }
            Self::OpenEnd { first: f } if *f <= last => Self::Range {
                first: (*f).max(first),
                last,
            },
            Self::OpenEnd { .. } => Self::List(Vec::new()),
        }
    }

    pub fn contains(&self, pos: usize) -> bool {
        match self {
            Self::List(v) => v.contains(&pos),
            Self::Range { first, last } => (*first..=*last).contains(&pos),
            Self::OpenEnd { first } => pos >= *first,
        }
    }
}

impl From<usize> for VectorIndex {
    fn from(pos: usize) -> Self {
        Self::single(pos)
    }
}

impl From<std::ops::RangeInclusive<usize>> for VectorIndex {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Self::Range {
            first: *r.start(),
            last: *r.end(),
        }
    }
}

impl From<std::ops::RangeFrom<usize>> for VectorIndex {
    fn from(r: std::ops::RangeFrom<usize>) -> Self {
        Self::OpenEnd { first: r.start }
    }
}

impl From<Vec<usize>> for VectorIndex {
    fn from(v: Vec<usize>) -> Self {
        Self::List(v)
    }
}

#[derive(Clone, Debug)]
pub struct Iter<'a> {
    index: &'a VectorIndex,
    pos: usize,
    len: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.len {
            return None;
        }
        let item = self.index.get(self.pos);
        self.pos += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a VectorIndex {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_end_resolves_against_extent() {
        let idx = VectorIndex::open_end(2);
        assert!(idx.is_open_end());
        assert_eq!(idx.resolve(5), VectorIndex::range(2, 4));
        assert!(idx.resolve(2).is_empty());
        assert_eq!(VectorIndex::range(1, 3).resolve(0), VectorIndex::range(1, 3));
    }

    #[test]
    fn validation_rejects_empty_and_inverted() {
        assert!(VectorIndex::list(vec![]).validate().is_err());
        assert!(VectorIndex::range(4, 3).validate().is_err());
        assert!(VectorIndex::range(3, 3).validate().is_ok());
        assert!(VectorIndex::open_end(9).validate().is_ok());
    }

    #[test]
    fn sub_index_and_linearize() {
        let idx = VectorIndex::range(10, 19);
        assert_eq!(idx.sub_index(2, Some(3)), VectorIndex::range(12, 14));
        assert_eq!(idx.sub_index(8, None), VectorIndex::range(18, 19));
        assert!(idx.sub_index(10, None).is_empty());

        let list = VectorIndex::list(vec![7, 3, 5]);
        assert_eq!(list.sub_index(1, None), VectorIndex::list(vec![3, 5]));
        assert_eq!(list.linearize(), VectorIndex::range(3, 7));
        assert_eq!(list.front(), 7);
        assert_eq!(list.last(), 5);
        assert_eq!(list.max(), 7);
    }

    #[test]
    fn clamp_restricts_positions() {
        assert_eq!(VectorIndex::range(0, 100).clamp(0, 9), VectorIndex::range(0, 9));
        assert_eq!(
            VectorIndex::list(vec![1, 12, 4]).clamp(0, 9),
            VectorIndex::list(vec![1, 4])
        );
        assert_eq!(VectorIndex::open_end(3).clamp(0, 9), VectorIndex::range(3, 9));
        assert!(VectorIndex::range(20, 30).clamp(0, 9).is_empty());
    }

    #[test]
    fn length_of_ranges_reaching_the_top_of_usize() {
        assert_eq!(VectorIndex::range(0, usize::MAX).len(), usize::MAX);
        assert_eq!(VectorIndex::range(5, usize::MAX).len(), usize::MAX - 4);
        assert_eq!(VectorIndex::range(usize::MAX, usize::MAX).len(), 1);
        assert!(VectorIndex::range(3, 2).is_empty());
    }

    #[test]
    fn iteration_visits_every_position() {
        let v: Vec<usize> = VectorIndex::range(3, 6).iter().collect();
        assert_eq!(v, vec![3, 4, 5, 6]);
        let v: Vec<usize> = (&VectorIndex::list(vec![2, 0])).into_iter().collect();
        assert_eq!(v, vec![2, 0]);
    }
}
