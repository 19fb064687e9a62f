/// QueryFrame Vector Implementation
///
/// A Vector is the lowest-level columnar storage: an ordered, indexable,
/// length-bearing container holding one value per row.
/// Two implementations:
/// - ArrayVector: contiguous buffer, O(1) access, appendable while a frame is being built
/// - SortedVector: read-only view applying a permutation over another vector, O(1) access
///
/// Vectors are shared behind `Rc` once published in a frame; derived views
/// wrap the source instead of copying it.

use crate::error::{FrameError, Result};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::rc::Rc;

/// Trait for read access to columnar storage
pub trait Vector<T>: Debug {
    /// Return the number of elements in the vector
    fn len(&self) -> usize;

    /// Check if the vector is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get reference to value at index (0-based)
    fn get(&self, index: usize) -> Option<&T>;

    /// Materialize all values in order. Safe to call repeatedly.
    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        (0..self.len()).filter_map(|i| self.get(i).cloned()).collect()
    }
}

impl<'a, T: 'a> dyn Vector<T> + 'a {
    /// Iterate over all values by reference
    pub fn iter(&self) -> VectorIter<'_, T> {
        VectorIter {
            vector: self,
            index: 0,
        }
    }
}

pub struct VectorIter<'a, T: 'a> {
    vector: &'a dyn Vector<T>,
    index: usize,
}

impl<'a, T: 'a> Iterator for VectorIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.len() {
            None
        } else {
            let result = self.vector.get(self.index);
            self.index += 1;
            result
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// Simple contiguous array implementation.
/// - O(1) random access
/// - O(1) amortized append
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVector<T> {
    data: Vec<T>,
}

impl<T> ArrayVector<T> {
    pub fn new() -> Self {
        ArrayVector { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ArrayVector {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append value to end
    pub fn append(&mut self, value: T) {
        self.data.push(value);
    }

}

impl<T> Default for ArrayVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ArrayVector<T> {
    fn from(data: Vec<T>) -> Self {
        ArrayVector { data }
    }
}

impl<T> FromIterator<T> for ArrayVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ArrayVector {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T: Debug> Vector<T> for ArrayVector<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.clone()
    }
}

/// Read-only view presenting a source vector through a permutation.
///
/// `get(i)` returns `source.get(order[i])`. The order is a bijection over
/// `[0, source.len())`; building the view never touches the source, and
/// several views may share one order (every field of a sorted frame does).
#[derive(Debug, Clone)]
pub struct SortedVector<T> {
    source: Rc<dyn Vector<T>>,
    order: Rc<[usize]>,
}

impl<T: Debug + 'static> SortedVector<T> {
    /// Wrap `source` with an explicit permutation, validating it.
    pub fn new(source: Rc<dyn Vector<T>>, order: Rc<[usize]>) -> Result<Self> {
        if order.len() != source.len() {
            return Err(FrameError::InvalidPermutation(format!(
                "order has {} entries, source has {}",
                order.len(),
                source.len()
            )));
        }
        let mut seen = vec![false; order.len()];
        for &i in order.iter() {
            match seen.get_mut(i) {
                Some(flag) if !*flag => *flag = true,
                Some(_) => {
                    return Err(FrameError::InvalidPermutation(format!(
                        "index {} appears more than once",
                        i
                    )))
                }
                None => {
                    return Err(FrameError::InvalidPermutation(format!(
                        "index {} out of range [0, {})",
                        i,
                        order.len()
                    )))
                }
            }
        }
        Ok(SortedVector { source, order })
    }

    /// Build a view ordered by `compare`. The sort is stable: equal keys
    /// keep their original relative order.
    pub fn sort_by<F>(source: Rc<dyn Vector<T>>, mut compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut order: Vec<usize> = (0..source.len()).collect();
        order.sort_by(|&a, &b| match (source.get(a), source.get(b)) {
            (Some(va), Some(vb)) => compare(va, vb),
            _ => Ordering::Equal,
        });
        SortedVector {
            source,
            order: order.into(),
        }
    }

    /// Trusted constructor for orders produced inside the crate.
    pub(crate) fn from_order(source: Rc<dyn Vector<T>>, order: Rc<[usize]>) -> Self {
        debug_assert_eq!(order.len(), source.len());
        SortedVector { source, order }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn source(&self) -> &Rc<dyn Vector<T>> {
        &self.source
    }
}

impl<T: Debug> Vector<T> for SortedVector<T> {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.order.get(index).and_then(|&i| self.source.get(i))
    }
}
