/// QueryFrame View & Reorder Implementation
///
/// Row-oriented access over columnar frames, plus reordering that avoids
/// copying column data.
///
/// # Row cursor
///
/// `DataFrameView::get` does not build a row. It moves a single cursor and
/// hands back a reference to it, so every row returned by the view is the
/// same object positioned at a different index. The borrow checker keeps
/// you from holding two rows at once; to keep a row past the next `get`,
/// take a [`RowSnapshot`] with [`RowCursor::snapshot`] or use
/// [`DataFrameView::to_array`].
///
/// # Sorting
///
/// `sort_data_frame` sorts a row index and wraps every field in a
/// `SortedVector` sharing that index. Nulls (and values with no numeric
/// reading in numeric columns) sort last. Reversal copies instead.
///
/// # Examples
///
/// ```
/// use queryframe::view::{sort_data_frame, DataFrameView};
/// use queryframe::{DataFrame, Field};
///
/// let frame = DataFrame::new(vec![
///     Field::numbers("value", vec![3.0, 1.0, 2.0]),
///     Field::strings("name", vec!["c", "a", "b"]),
/// ])
/// .unwrap();
///
/// let mut view = DataFrameView::new(sort_data_frame(&frame, 0, false));
/// let names = view.map(|row| row.field("name").map(|v| v.to_text()).unwrap_or_default());
/// assert_eq!(names, vec!["a", "b", "c"]);
/// ```

use crate::display::DisplayProcessor;
use crate::error::{FrameError, Result};
use crate::field::{Field, FieldType};
use crate::frame::DataFrame;
use crate::value::FieldValue;
use crate::vector::{ArrayVector, SortedVector, Vector};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

/// The shared cursor handed out by [`DataFrameView::get`]
#[derive(Debug, Clone)]
pub struct RowCursor {
    frame: DataFrame,
    /// Field name to index; the first field with a name wins
    names: Rc<HashMap<String, usize>>,
    index: usize,
}

impl RowCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of field `field` at the current row
    pub fn get(&self, field: usize) -> Option<&FieldValue> {
        self.frame.fields.get(field)?.get(self.index)
    }

    /// Value of the named field at the current row
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(*self.names.get(name)?)
    }

    /// Independent copy of the current row
    pub fn snapshot(&self) -> RowSnapshot {
        let mut values = Vec::with_capacity(self.names.len());
        for (i, field) in self.frame.fields.iter().enumerate() {
            if self.names.get(&field.name) == Some(&i) {
                values.push((field.name.clone(), self.get(i).cloned().unwrap_or_default()));
            }
        }
        RowSnapshot {
            index: self.index,
            values,
        }
    }
}

/// A materialized row: field names and values in field order.
/// Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    pub index: usize,
    pub values: Vec<(String, FieldValue)>,
}

impl RowSnapshot {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl Serialize for RowSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Row-by-row access to a frame through a single reusable cursor
#[derive(Debug, Clone)]
pub struct DataFrameView {
    cursor: RowCursor,
}

impl DataFrameView {
    pub fn new(frame: DataFrame) -> Self {
        let mut names = HashMap::new();
        for (i, field) in frame.fields.iter().enumerate() {
            names.entry(field.name.clone()).or_insert(i);
        }
        DataFrameView {
            cursor: RowCursor {
                frame,
                names: Rc::new(names),
                index: 0,
            },
        }
    }

    pub fn data_frame(&self) -> &DataFrame {
        &self.cursor.frame
    }

    pub fn len(&self) -> usize {
        self.cursor.frame.length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the cursor to row `index` and return it. The returned row is
    /// the same object on every call.
    pub fn get(&mut self, index: usize) -> &RowCursor {
        self.cursor.index = index;
        &self.cursor
    }

    pub fn seek(&mut self, index: usize) -> &RowCursor {
        self.get(index)
    }

    /// Independent snapshots of every row
    pub fn to_array(&self) -> Vec<RowSnapshot> {
        let mut cursor = self.cursor.clone();
        (0..self.len())
            .map(|i| {
                cursor.index = i;
                cursor.snapshot()
            })
            .collect()
    }

    pub fn for_each_row<F: FnMut(&RowCursor)>(&mut self, mut f: F) {
        for i in 0..self.len() {
            f(self.get(i));
        }
    }

    pub fn map<T, F: FnMut(&RowCursor) -> T>(&mut self, mut f: F) -> Vec<T> {
        (0..self.len()).map(|i| f(self.get(i))).collect()
    }

    /// Display processor attached to field `index`, if any
    pub fn field_display_processor(&self, index: usize) -> Option<DisplayProcessor> {
        self.cursor.frame.fields.get(index)?.display.clone()
    }
}

/// Nulls after values; among values, `NaN` readings after numbers.
fn compare_cells(a: Option<&FieldValue>, b: Option<&FieldValue>, field_type: FieldType) -> Ordering {
    let a_is_null = a.map_or(true, FieldValue::is_null);
    let b_is_null = b.map_or(true, FieldValue::is_null);
    match (a_is_null, b_is_null) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };

    if field_type == FieldType::String {
        let (a, b) = (a.to_text(), b.to_text());
        return a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(&b));
    }

    let (a, b) = (a.to_number(), b.to_number());
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Sort rows by field `field_index`, failing when the field does not exist.
pub fn try_sort_data_frame(frame: &DataFrame, field_index: usize, reverse: bool) -> Result<DataFrame> {
    let field = frame.fields.get(field_index).ok_or(FrameError::MissingField {
        index: field_index,
        count: frame.fields.len(),
    })?;

    let values = &field.values;
    let mut order: Vec<usize> = (0..frame.length).collect();
    order.sort_by(|&a, &b| compare_cells(values.get(a), values.get(b), field.field_type));
    if reverse {
        order.reverse();
    }

    let order: Rc<[usize]> = order.into();
    let fields = frame
        .fields
        .iter()
        .map(|f| f.replace_values(Rc::new(SortedVector::from_order(f.values.clone(), order.clone()))))
        .collect();
    Ok(frame.with_fields(fields, frame.length))
}

/// Sort rows by field `field_index`. A missing field leaves the frame as it
/// is.
pub fn sort_data_frame(frame: &DataFrame, field_index: usize, reverse: bool) -> DataFrame {
    try_sort_data_frame(frame, field_index, reverse).unwrap_or_else(|err| {
        log::debug!("not sorting frame: {}", err);
        frame.clone()
    })
}

/// Copy of `frame` with every field's values in reverse order
pub fn reverse_data_frame(frame: &DataFrame) -> DataFrame {
    let fields: Vec<Field> = frame
        .fields
        .iter()
        .map(|f| {
            let mut values = f.values.to_vec();
            values.reverse();
            f.replace_values(Rc::new(ArrayVector::from(values)))
        })
        .collect();
    frame.with_fields(fields, frame.length)
}
