use std::sync::Arc;

use arrow_array::{Array, ArrayRef, BinaryArray, BooleanArray, LargeBinaryArray, StringArray};
use arrow_buffer::{Buffer, NullBuffer, OffsetBuffer};
use arrow_schema::Field;
use indexmap::IndexMap;

use crate::array::input::{GeometryInput, InputKind};
use crate::array::metadata::ArrayMetadata;
use crate::datatypes::GeometryDtype;
use crate::error::{GeoFrameError, Result};
use crate::io::interchange::{self, InterchangeGeometry, InterchangeOptions};
use crate::io::wkb::{read_wkb, to_wkb, write_wkb, WkbOptions};
use crate::io::wkt::{read_wkt, to_wkt, WktOptions};
use crate::kernel::eq::geometry_eq;
use crate::kernel::{predicates, KernelArgs, KernelOutput, Values};
use crate::scalar::{Geometry, ScalarValue};
use crate::table::{GeoFrame, GeoSeries};

/// What to do with an input row that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnInvalid {
    /// Fail the whole batch, naming the first offending row.
    #[default]
    Raise,
    /// Log a warning and store null.
    Warn,
    /// Store null.
    Ignore,
}

/// Options for decoding WKB or WKT into a [`GeometryArray`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub on_invalid: OnInvalid,
}

/// The right-hand side of [`GeometryArray::equals`].
#[derive(Debug, Clone, Copy)]
pub enum Comparand<'a> {
    Array(&'a GeometryArray),
    Buffer(&'a [Option<Geometry>]),
    /// A single geometry or null, compared against every row.
    Scalar(Option<&'a Geometry>),
    /// Labeled containers decide equality themselves.
    Series(&'a GeoSeries),
    Frame(&'a GeoFrame),
}

/// An immutable, nullable column of geometry handles.
///
/// This is semantically equivalent to `Vec<Option<Geometry>>`. The array owns its handle buffer:
/// slicing, gathering and copying produce new buffers that share the underlying geometries.
/// Elements cannot be assigned, and geometries have no order, so sorting always fails.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct GeometryArray {
    data: Vec<Option<Geometry>>,
    metadata: Arc<ArrayMetadata>,
}

impl GeometryArray {
    /// Wrap an existing handle buffer.
    pub fn new(data: Vec<Option<Geometry>>) -> Self {
        Self {
            data,
            metadata: Default::default(),
        }
    }

    pub fn with_metadata(self, metadata: Arc<ArrayMetadata>) -> Self {
        Self {
            data: self.data,
            metadata,
        }
    }

    /// A single geometry, or null, repeated `len` times.
    pub fn from_scalar(value: Option<Geometry>, len: usize) -> Self {
        Self::new(vec![value; len])
    }

    /// Build an array from a sequence of handles, WKB blobs, WKT strings or interchange
    /// geometries.
    ///
    /// The first non-null element decides the kind of the whole sequence. A sequence of only
    /// nulls yields an all-null array.
    pub fn from_sequence<T: Into<GeometryInput>>(
        items: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let items: Vec<GeometryInput> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(GeoFrameError::IncorrectType(
                "cannot infer the geometry input kind of an empty sequence".into(),
            ));
        }
        let Some(kind) = items.iter().find_map(GeometryInput::kind) else {
            return Ok(Self::from_scalar(None, items.len()));
        };

        let data = items
            .into_iter()
            .enumerate()
            .map(|(row, item)| match (item, kind) {
                (GeometryInput::Null, _) => Ok(None),
                (GeometryInput::Handle(geom), InputKind::Handle) => Ok(Some(geom)),
                (GeometryInput::Wkb(buf), InputKind::Wkb) => read_wkb(&buf)
                    .map(|geom| Some(Geometry::new(geom)))
                    .map_err(|err| err.at_row(row)),
                (GeometryInput::Wkt(text), InputKind::Wkt) => read_wkt(&text)
                    .map(|geom| Some(Geometry::new(geom)))
                    .map_err(|err| err.at_row(row)),
                (GeometryInput::Interchange(geom), InputKind::Interchange) => {
                    Ok(Some(Geometry::new(geom)))
                }
                (other, kind) => Err(GeoFrameError::IncorrectType(
                    format!(
                        "row {row}: expected {} input, got {}",
                        kind.name(),
                        other.kind().map_or("null", |k| k.name())
                    )
                    .into(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(data))
    }

    pub fn from_wkb<'a>(
        blobs: impl IntoIterator<Item = Option<&'a [u8]>>,
        options: &DecodeOptions,
    ) -> Result<Self> {
        decode_rows(blobs, options, read_wkb).map(Self::new)
    }

    pub fn from_wkt<'a>(
        strings: impl IntoIterator<Item = Option<&'a str>>,
        options: &DecodeOptions,
    ) -> Result<Self> {
        decode_rows(strings, options, read_wkt).map(Self::new)
    }

    /// Take ownership of interchange geometries. No geometry is copied.
    pub fn from_interchange(objects: Vec<Option<InterchangeGeometry>>) -> Self {
        Self::new(interchange::from_interchange(objects))
    }

    /// Encode every row as WKB. Nulls stay null.
    pub fn to_wkb(&self, options: &WkbOptions) -> Result<BinaryArray> {
        let mut values = Vec::new();
        let mut lengths = Vec::with_capacity(self.len());
        for geom in &self.data {
            let start = values.len();
            if let Some(geom) = geom {
                write_wkb(&mut values, geom.as_geo(), options)?;
            }
            lengths.push(values.len() - start);
        }
        if values.len() > i32::MAX as usize {
            return Err(GeoFrameError::General(
                "WKB output exceeds the capacity of a binary array".to_string(),
            ));
        }
        Ok(BinaryArray::try_new(
            OffsetBuffer::from_lengths(lengths),
            Buffer::from_vec(values),
            self.nulls(),
        )?)
    }

    /// Encode every row as WKT. Nulls stay null.
    pub fn to_wkt(&self, options: &WktOptions) -> StringArray {
        self.data
            .iter()
            .map(|geom| geom.as_ref().map(|geom| to_wkt(geom.as_geo(), options)))
            .collect()
    }

    pub fn to_interchange(
        &self,
        options: &InterchangeOptions,
    ) -> Result<Vec<Option<InterchangeGeometry>>> {
        interchange::to_interchange(&self.data, options)
    }

    pub fn dtype(&self) -> GeometryDtype {
        GeometryDtype
    }

    pub fn metadata(&self) -> &Arc<ArrayMetadata> {
        &self.metadata
    }

    /// The raw handle buffer.
    pub fn data(&self) -> &[Option<Geometry>] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<Option<Geometry>> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<Geometry>> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Access the value at slot `i`.
    /// # Panic
    /// Panics iff `i >= self.len()`.
    pub fn value(&self, i: usize) -> Option<&Geometry> {
        self.data[i].as_ref()
    }

    /// Access slot `index`, where negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<Option<Geometry>> {
        let position = self.normalize_index(index)?;
        Ok(self.data[position].clone())
    }

    fn normalize_index(&self, index: i64) -> Result<usize> {
        let len = self.len();
        let position = if index < 0 {
            index + len as i64
        } else {
            index
        };
        if position < 0 || position >= len as i64 {
            return Err(GeoFrameError::OutOfBounds { index, len });
        }
        Ok(position as usize)
    }

    /// A copy of `length` rows starting at `offset`.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        let end = offset.saturating_add(length);
        if end > self.len() {
            return Err(GeoFrameError::OutOfBounds {
                index: end as i64,
                len: self.len(),
            });
        }
        Ok(self.with_data(self.data[offset..end].to_vec()))
    }

    /// Keep the rows where `mask` is true. Null mask entries drop the row.
    pub fn filter(&self, mask: &BooleanArray) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "boolean mask of length {} does not match array length {}",
                    mask.len(),
                    self.len()
                )
                .into(),
            ));
        }
        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| mask.is_valid(*i) && mask.value(*i))
            .map(|(_, geom)| geom.clone())
            .collect();
        Ok(self.with_data(data))
    }

    /// Gather rows by position.
    ///
    /// Without `allow_fill`, negative indices count from the end. With `allow_fill`, `-1` marks a
    /// slot to fill with `fill_value` (null if not given) and other negative indices are invalid.
    /// The fill value must be null or a geometry.
    pub fn take(
        &self,
        indices: &[i64],
        allow_fill: bool,
        fill_value: Option<&ScalarValue>,
    ) -> Result<Self> {
        let data = if allow_fill {
            let fill = match fill_value {
                None | Some(ScalarValue::Null) => None,
                Some(ScalarValue::Geometry(geom)) => Some(geom.clone()),
                Some(other) => {
                    return Err(GeoFrameError::IncorrectType(
                        format!(
                            "fill value must be a geometry or null, got {}",
                            other.type_name()
                        )
                        .into(),
                    ))
                }
            };
            indices
                .iter()
                .map(|&index| match index {
                    -1 => Ok(fill.clone()),
                    i if i < -1 => Err(GeoFrameError::InvalidValue(
                        format!("invalid index {i} with allow_fill, only -1 marks a fill").into(),
                    )),
                    i => self.get(i),
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            indices
                .iter()
                .map(|&index| self.get(index))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(self.with_data(data))
    }

    /// Element assignment is unsupported: geometry columns are immutable.
    pub fn set(&mut self, index: i64, _value: Option<Geometry>) -> Result<()> {
        Err(GeoFrameError::NotImplemented(
            format!("cannot assign to row {index}: geometry arrays are immutable").into(),
        ))
    }

    pub fn values_for_argsort(&self) -> Result<&[Option<Geometry>]> {
        Err(GeoFrameError::Unorderable)
    }

    pub fn argsort(&self) -> Result<Vec<usize>> {
        Err(GeoFrameError::Unorderable)
    }

    /// Element-wise equality.
    ///
    /// Returns `None` for series and frame operands so the caller can retry with the operands
    /// reflected. Nulls compare equal to nulls, and empty points to empty points.
    pub fn equals(&self, other: Comparand<'_>) -> Result<Option<BooleanArray>> {
        let buffer = match other {
            Comparand::Series(_) | Comparand::Frame(_) => return Ok(None),
            Comparand::Scalar(scalar) => {
                let values = self
                    .data
                    .iter()
                    .map(|geom| element_eq(geom.as_ref(), scalar))
                    .collect::<Vec<_>>();
                return Ok(Some(BooleanArray::from(values)));
            }
            Comparand::Array(array) => array.data(),
            Comparand::Buffer(buffer) => buffer,
        };
        if buffer.len() != self.len() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "lengths must match to compare, got {} and {}",
                    self.len(),
                    buffer.len()
                )
                .into(),
            ));
        }
        let values = self
            .data
            .iter()
            .zip(buffer)
            .map(|(left, right)| element_eq(left.as_ref(), right.as_ref()))
            .collect::<Vec<_>>();
        Ok(Some(BooleanArray::from(values)))
    }

    /// The handle buffer is its own factorization key space; `None` is the null sentinel.
    pub fn values_for_factorize(&self) -> (&[Option<Geometry>], Option<Geometry>) {
        (&self.data, None)
    }

    pub fn from_factorized(values: Vec<Option<Geometry>>) -> Self {
        Self::new(values)
    }

    /// Codes per row (`-1` for null) and the unique geometries in order of first appearance.
    ///
    /// Geometries are keyed by their canonical WKB, so structurally equal geometries share a code
    /// even when they are distinct handles.
    pub fn factorize(&self) -> Result<(Vec<i64>, GeometryArray)> {
        let mut uniques: IndexMap<Vec<u8>, Geometry> = IndexMap::new();
        let options = WkbOptions::default();
        let mut codes = Vec::with_capacity(self.len());
        for geom in &self.data {
            let Some(geom) = geom else {
                codes.push(-1);
                continue;
            };
            let key = to_wkb(geom.as_geo(), &options)?;
            let entry = uniques.entry(key);
            codes.push(entry.index() as i64);
            entry.or_insert_with(|| geom.clone());
        }
        let uniques = uniques.into_values().map(Some).collect();
        Ok((codes, self.with_data(uniques)))
    }

    /// Arrow validity of this array, `None` when there are no nulls.
    pub fn nulls(&self) -> Option<NullBuffer> {
        let validity: Vec<bool> = self.data.iter().map(Option::is_some).collect();
        let nulls = NullBuffer::from(validity);
        (nulls.null_count() > 0).then_some(nulls)
    }

    /// True where the row holds no geometry, as reported by the kernel's `is_missing`
    /// predicate.
    pub fn null_mask(&self) -> Result<BooleanArray> {
        match predicates::is_missing(&self.data, &KernelArgs::default())? {
            KernelOutput::Values(Values::Boolean(mask)) => {
                Ok(mask.into_data().into_iter().map(|v| v.unwrap_or(true)).map(Some).collect())
            }
            other => Err(GeoFrameError::General(format!(
                "is_missing returned {other:?} instead of a boolean mask"
            ))),
        }
    }

    pub fn is_null(&self, i: usize) -> bool {
        self.data[i].is_none()
    }

    pub fn null_count(&self) -> usize {
        self.data.iter().filter(|geom| geom.is_none()).count()
    }

    /// Size of the handle buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.len() * std::mem::size_of::<Option<Geometry>>()
    }

    /// A new buffer holding the same handles.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Concatenate arrays in order. The result carries the metadata of the first array.
    pub fn concat(arrays: &[&GeometryArray]) -> Self {
        let len = arrays.iter().map(|array| array.len()).sum();
        let mut data = Vec::with_capacity(len);
        for array in arrays {
            data.extend(array.data.iter().cloned());
        }
        let metadata = arrays
            .first()
            .map(|array| array.metadata.clone())
            .unwrap_or_default();
        Self::new(data).with_metadata(metadata)
    }

    /// The WKB storage array.
    pub fn to_arrow(&self) -> Result<ArrayRef> {
        Ok(Arc::new(self.to_wkb(&WkbOptions::default())?))
    }

    /// An Arrow field tagged with the `"geos"` extension name and this array's metadata.
    pub fn extension_field(&self, name: &str) -> Result<Field> {
        GeometryDtype.to_field(name, true, &self.metadata)
    }

    fn with_data(&self, data: Vec<Option<Geometry>>) -> Self {
        Self {
            data,
            metadata: self.metadata.clone(),
        }
    }
}

fn element_eq(left: Option<&Geometry>, right: Option<&Geometry>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => {
            left.ptr_eq(right) || geometry_eq(left.as_geo(), right.as_geo(), 0.)
        }
        (None, None) => true,
        _ => false,
    }
}

fn decode_rows<T>(
    items: impl IntoIterator<Item = Option<T>>,
    options: &DecodeOptions,
    decode: impl Fn(T) -> Result<geo::Geometry<f64>>,
) -> Result<Vec<Option<Geometry>>> {
    items
        .into_iter()
        .enumerate()
        .map(|(row, item)| {
            let Some(item) = item else {
                return Ok(None);
            };
            match decode(item) {
                Ok(geom) => Ok(Some(Geometry::new(geom))),
                Err(err) => match options.on_invalid {
                    OnInvalid::Raise => Err(err.at_row(row)),
                    OnInvalid::Warn => {
                        tracing::warn!(row, error = %err, "invalid geometry replaced with null");
                        Ok(None)
                    }
                    OnInvalid::Ignore => Ok(None),
                },
            }
        })
        .collect()
}

impl From<Vec<Option<Geometry>>> for GeometryArray {
    fn from(other: Vec<Option<Geometry>>) -> Self {
        Self::new(other)
    }
}

impl From<Vec<Geometry>> for GeometryArray {
    fn from(other: Vec<Geometry>) -> Self {
        Self::new(other.into_iter().map(Some).collect())
    }
}

impl FromIterator<Option<Geometry>> for GeometryArray {
    fn from_iter<T: IntoIterator<Item = Option<Geometry>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TryFrom<(&dyn Array, &Field)> for GeometryArray {
    type Error = GeoFrameError;

    fn try_from((array, field): (&dyn Array, &Field)) -> Result<Self> {
        if !GeometryDtype::matches_field(field) {
            return Err(GeoFrameError::IncorrectType(
                format!("field '{}' is not a geometry column", field.name()).into(),
            ));
        }
        let metadata = Arc::new(ArrayMetadata::try_from(field)?);
        let options = DecodeOptions::default();
        let array = if let Some(binary) = array.as_any().downcast_ref::<BinaryArray>() {
            Self::from_wkb(binary.iter(), &options)?
        } else if let Some(binary) = array.as_any().downcast_ref::<LargeBinaryArray>() {
            Self::from_wkb(binary.iter(), &options)?
        } else {
            return Err(GeoFrameError::IncorrectType(
                format!(
                    "geometry column '{}' must be stored as binary, got {}",
                    field.name(),
                    array.data_type()
                )
                .into(),
            ));
        };
        Ok(array.with_metadata(metadata))
    }
}

#[cfg(test)]
mod test {
    use arrow_array::cast::AsArray;

    use super::*;
    use crate::error::ErrorKind;
    use crate::test::point::{p0, p1, point_array};
    use crate::test::polygon::poly0;

    #[test]
    fn null_mask_and_wkt() {
        let arr = point_array();
        let mask = arr.null_mask().unwrap();
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![Some(false), Some(false), Some(true)]
        );
        assert_eq!(arr.null_count(), 1);

        let wkt = arr.to_wkt(&WktOptions::default());
        assert_eq!(
            wkt.iter().collect::<Vec<_>>(),
            vec![Some("POINT (0 0)"), Some("POINT (1 1)"), None]
        );
    }

    #[test]
    fn wkb_round_trip() {
        let arr = GeometryArray::new(vec![
            Some(poly0().into()),
            None,
            Some(Geometry::empty_point()),
            Some(p1().into()),
        ]);
        let wkb = arr.to_wkb(&WkbOptions::default()).unwrap();
        assert_eq!(wkb.len(), 4);
        assert!(wkb.is_null(1));
        let back = GeometryArray::from_wkb(wkb.iter(), &DecodeOptions::default()).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn wkt_round_trip() {
        let arr = point_array();
        let wkt = arr.to_wkt(&WktOptions::default());
        let back = GeometryArray::from_wkt(wkt.iter(), &DecodeOptions::default()).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn decode_errors_name_the_row() {
        let strings = [Some("POINT (0 0)"), None, Some("POINT (1")];
        let err = GeometryArray::from_wkt(strings, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, GeoFrameError::Wkt { index: 2, .. }));

        let options = DecodeOptions {
            on_invalid: OnInvalid::Ignore,
        };
        let arr = GeometryArray::from_wkt(strings, &options).unwrap();
        assert_eq!(arr.null_count(), 2);

        let options = DecodeOptions {
            on_invalid: OnInvalid::Warn,
        };
        let blobs: [Option<&[u8]>; 2] = [Some(&[1, 1, 0]), None];
        let arr = GeometryArray::from_wkb(blobs, &options).unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.null_count(), 2);
    }

    #[test]
    fn from_sequence_dispatches_on_first_element() {
        let arr = GeometryArray::from_sequence([None, Some("POINT (1 1)")].map(|s| match s {
            Some(s) => GeometryInput::from(s),
            None => GeometryInput::Null,
        }))
        .unwrap();
        assert_eq!(arr.value(1), Some(&Geometry::from(p1())));
        assert!(arr.is_null(0));

        let arr = GeometryArray::from_sequence(vec![Geometry::from(p0())]).unwrap();
        assert_eq!(arr.len(), 1);

        let arr =
            GeometryArray::from_sequence(vec![geo::Geometry::from(p0()), p1().into()]).unwrap();
        assert_eq!(arr.len(), 2);

        let all_null = GeometryArray::from_sequence(vec![GeometryInput::Null; 2]).unwrap();
        assert_eq!(all_null.null_count(), 2);
    }

    #[test]
    fn from_sequence_rejects_empty_and_mixed() {
        let err = GeometryArray::from_sequence(Vec::<GeometryInput>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let mixed = vec![
            GeometryInput::from("POINT (0 0)"),
            GeometryInput::from(Geometry::from(p0())),
        ];
        let err = GeometryArray::from_sequence(mixed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn take_identity_and_fill() {
        let arr = point_array();
        assert_eq!(arr.take(&[0, 1, 2], false, None).unwrap(), arr);

        let taken = arr.take(&[-1, 0], false, None).unwrap();
        assert!(taken.is_null(0));
        assert_eq!(taken.value(1), Some(&Geometry::from(p0())));

        let filled = arr.take(&[1, -1], true, None).unwrap();
        assert_eq!(
            filled.null_mask().unwrap().iter().collect::<Vec<_>>(),
            vec![Some(false), Some(true)]
        );

        let fill = ScalarValue::Geometry(p1().into());
        let filled = arr.take(&[-1], true, Some(&fill)).unwrap();
        assert_eq!(filled.value(0), Some(&Geometry::from(p1())));
    }

    #[test]
    fn take_errors() {
        let arr = point_array();
        let err = arr.take(&[3], false, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        let err = arr.take(&[-2], true, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        let err = arr
            .take(&[-1], true, Some(&ScalarValue::Float64(1.)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(GeometryArray::default().take(&[0], false, None).is_err());
    }

    #[test]
    fn slice_filter_get() {
        let arr = point_array();
        let sliced = arr.slice(1, 2).unwrap();
        assert_eq!(sliced.len(), 2);
        assert!(sliced.is_null(1));
        assert!(arr.slice(2, 2).is_err());

        let mask = BooleanArray::from(vec![Some(true), None, Some(false)]);
        let filtered = arr.filter(&mask).unwrap();
        assert_eq!(filtered.len(), 1);
        assert!(arr.filter(&BooleanArray::from(vec![true])).is_err());

        assert_eq!(arr.get(-3).unwrap(), Some(p0().into()));
        assert!(arr.get(3).is_err());
    }

    #[test]
    fn mutation_and_ordering_fail() {
        let mut arr = point_array();
        let err = arr.set(0, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(arr, point_array());
        assert_eq!(arr.argsort().unwrap_err().kind(), ErrorKind::Unorderable);
        assert!(arr.values_for_argsort().is_err());
    }

    #[test]
    fn concat_preserves_order() {
        let a = point_array();
        let b = GeometryArray::from(vec![Geometry::from(poly0())]);
        let c = GeometryArray::concat(&[&a, &b]);
        assert_eq!(c.len(), a.len() + b.len());
        assert_eq!(c.value(3), b.value(0));
        assert!(c.is_null(2));
        assert!(GeometryArray::concat(&[]).is_empty());
    }

    #[test]
    fn copy_shares_handles() {
        let arr = point_array();
        let copied = arr.copy();
        assert!(copied.value(0).unwrap().ptr_eq(arr.value(0).unwrap()));
        assert_eq!(arr.byte_size(), 3 * std::mem::size_of::<Option<Geometry>>());
    }

    #[test]
    fn equality() {
        let arr = point_array();
        let eq = arr.equals(Comparand::Array(&arr)).unwrap().unwrap();
        assert_eq!(eq.iter().collect::<Vec<_>>(), vec![Some(true); 3]);

        let p = Geometry::from(p1());
        let eq = arr.equals(Comparand::Scalar(Some(&p))).unwrap().unwrap();
        assert_eq!(
            eq.iter().collect::<Vec<_>>(),
            vec![Some(false), Some(true), Some(false)]
        );

        let empties = GeometryArray::from_scalar(Some(Geometry::empty_point()), 2);
        let other = GeometryArray::from_scalar(Some(Geometry::empty_point()), 2);
        let eq = empties.equals(Comparand::Array(&other)).unwrap().unwrap();
        assert!(eq.iter().all(|v| v == Some(true)));

        let short = [None];
        assert!(arr.equals(Comparand::Buffer(&short)).is_err());
    }

    #[test]
    fn labeled_operands_defer() {
        let arr = point_array();
        let frame = crate::test::properties::frame();
        assert!(arr.equals(Comparand::Frame(&frame)).unwrap().is_none());
        let series = crate::table::GeoSeries::new("points", point_array());
        assert!(arr.equals(Comparand::Series(&series)).unwrap().is_none());
    }

    #[test]
    fn factorize_by_content() {
        let arr = GeometryArray::new(vec![
            Some(p0().into()),
            None,
            Some(p1().into()),
            Some(p0().into()),
        ]);
        let (codes, uniques) = arr.factorize().unwrap();
        assert_eq!(codes, vec![0, -1, 1, 0]);
        assert_eq!(uniques.len(), 2);

        let (values, sentinel) = arr.values_for_factorize();
        assert_eq!(values.len(), 4);
        assert!(sentinel.is_none());
        assert_eq!(GeometryArray::from_factorized(values.to_vec()), arr);
    }

    #[test]
    fn arrow_field_round_trip() {
        let arr = point_array().with_metadata(Arc::new(ArrayMetadata::with_crs("EPSG:4326")));
        let field = arr.extension_field("geometry").unwrap();
        let storage = arr.to_arrow().unwrap();
        assert_eq!(storage.as_binary::<i32>().len(), 3);
        let back = GeometryArray::try_from((storage.as_ref(), &field)).unwrap();
        assert_eq!(back, arr);

        let plain = Field::new("geometry", arrow_schema::DataType::Binary, true);
        let err = GeometryArray::try_from((storage.as_ref(), &plain)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn interchange_round_trip_keeps_empty_point() {
        let arr = GeometryArray::new(vec![Some(Geometry::empty_point()), None, Some(p0().into())]);
        let objects = arr
            .to_interchange(&InterchangeOptions {
                path: interchange::InterchangePath::Wkb,
            })
            .unwrap();
        assert!(objects[1].is_none());
        assert_eq!(GeometryArray::from_interchange(objects), arr);
    }
}
