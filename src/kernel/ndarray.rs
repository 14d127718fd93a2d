//! A minimal dense n-dimensional buffer with numpy-style broadcasting.
//!
//! Binary kernels take two of these so that the dispatch layer can hand them a column vector and
//! a row vector (producing a pairwise grid), two equal-length vectors, or a vector and a 0-d
//! scalar, all through the same code path.

use crate::error::{GeoFrameError, Result};

/// Row-major n-dimensional buffer.
///
/// A 0-d array (empty shape) holds exactly one element.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> NdArray<T> {
    pub fn try_new(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GeoFrameError::InvalidValue(
                format!(
                    "cannot build an array of shape {:?} from {} values",
                    shape,
                    data.len()
                )
                .into(),
            ));
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Zero-dimensional array holding a single value.
    pub fn scalar(value: T) -> Self {
        Self {
            shape: vec![],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.data)
    }

    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Self::try_new(shape, self.data)
    }

    /// Element at a multi-dimensional position.
    pub fn get(&self, position: &[usize]) -> Option<&T> {
        if position.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&p, &dim) in position.iter().zip(self.shape.iter()) {
            if p >= dim {
                return None;
            }
            offset = offset * dim + p;
        }
        self.data.get(offset)
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> NdArray<U> {
        NdArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> NdArray<T> {
    /// Split a 2-d array into its columns, each a 1-d array.
    pub fn columns(&self) -> Result<Vec<NdArray<T>>> {
        let &[rows, cols] = self.shape.as_slice() else {
            return Err(GeoFrameError::InvalidValue(
                format!("expected a 2-d array, got shape {:?}", self.shape).into(),
            ));
        };
        Ok((0..cols)
            .map(|col| {
                let data = (0..rows)
                    .map(|row| self.data[row * cols + col].clone())
                    .collect();
                NdArray::from_vec(data)
            })
            .collect())
    }
}

impl<T> From<Vec<T>> for NdArray<T> {
    fn from(value: Vec<T>) -> Self {
        Self::from_vec(value)
    }
}

/// The shape two operands broadcast to.
///
/// Dimensions are compared from the right; they are compatible when equal or when either is 1.
pub fn broadcast_shapes(left: &[usize], right: &[usize]) -> Result<Vec<usize>> {
    let ndim = left.len().max(right.len());
    let mut shape = vec![0; ndim];
    for i in 0..ndim {
        let l = dim_from_right(left, ndim - 1 - i);
        let r = dim_from_right(right, ndim - 1 - i);
        shape[i] = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(GeoFrameError::InvalidValue(
                    format!(
                        "operands could not be broadcast together with shapes {:?} {:?}",
                        left, right
                    )
                    .into(),
                ))
            }
        };
    }
    Ok(shape)
}

fn dim_from_right(shape: &[usize], from_right: usize) -> usize {
    if from_right < shape.len() {
        shape[shape.len() - 1 - from_right]
    } else {
        1
    }
}

/// Row-major strides of `shape` viewed as `target`, with 0 for stretched dimensions.
fn broadcast_strides(shape: &[usize], target: &[usize]) -> Vec<usize> {
    let mut own = vec![0; shape.len()];
    let mut step = 1;
    for i in (0..shape.len()).rev() {
        own[i] = step;
        step *= shape[i];
    }

    let offset = target.len() - shape.len();
    (0..target.len())
        .map(|i| {
            if i < offset || shape[i - offset] == 1 {
                0
            } else {
                own[i - offset]
            }
        })
        .collect()
}

/// Apply `f` element-wise over two broadcast operands.
pub fn broadcast_map<L, R, U>(
    left: &NdArray<L>,
    right: &NdArray<R>,
    mut f: impl FnMut(&L, &R) -> Result<U>,
) -> Result<NdArray<U>> {
    let shape = broadcast_shapes(left.shape(), right.shape())?;
    let len: usize = shape.iter().product();
    let mut data = Vec::with_capacity(len);
    if len == 0 {
        return NdArray::try_new(shape, data);
    }

    let left_strides = broadcast_strides(left.shape(), &shape);
    let right_strides = broadcast_strides(right.shape(), &shape);
    let mut position = vec![0; shape.len()];
    let (mut l, mut r) = (0, 0);

    for _ in 0..len {
        data.push(f(&left.data[l], &right.data[r])?);

        for dim in (0..shape.len()).rev() {
            position[dim] += 1;
            l += left_strides[dim];
            r += right_strides[dim];
            if position[dim] < shape[dim] {
                break;
            }
            l -= left_strides[dim] * shape[dim];
            r -= right_strides[dim] * shape[dim];
            position[dim] = 0;
        }
    }

    NdArray::try_new(shape, data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(broadcast_shapes(&[3, 1], &[1, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shapes(&[3], &[]).unwrap(), vec![3]);
        assert_eq!(broadcast_shapes(&[2, 3], &[3]).unwrap(), vec![2, 3]);
        assert!(broadcast_shapes(&[3], &[4]).is_err());
    }

    #[test]
    fn outer_grid() {
        let column = NdArray::try_new(vec![3, 1], vec![1, 2, 3]).unwrap();
        let row = NdArray::try_new(vec![1, 2], vec![10, 20]).unwrap();
        let out = broadcast_map(&column, &row, |a, b| Ok(a * b)).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.data(), &[10, 20, 20, 40, 30, 60]);
        assert_eq!(out.get(&[2, 1]), Some(&60));
    }

    #[test]
    fn scalar_operand() {
        let values = NdArray::from_vec(vec![1, 2, 3]);
        let scalar = NdArray::scalar(5);
        let out = broadcast_map(&values, &scalar, |a, b| Ok(a + b)).unwrap();
        assert_eq!(out.shape(), &[3]);
        assert_eq!(out.data(), &[6, 7, 8]);

        let out = broadcast_map(&scalar, &scalar, |a, b| Ok(a + b)).unwrap();
        assert_eq!(out.ndim(), 0);
        assert_eq!(out.data(), &[10]);
    }

    #[test]
    fn mismatched_lengths() {
        let a = NdArray::from_vec(vec![1, 2, 3]);
        let b = NdArray::from_vec(vec![1, 2]);
        assert!(broadcast_map(&a, &b, |a, b| Ok(a + b)).is_err());
    }

    #[test]
    fn reshape_checks_size() {
        let a = NdArray::from_vec(vec![1, 2, 3, 4]);
        assert!(a.clone().reshape(vec![3]).is_err());
        assert_eq!(a.reshape(vec![2, 2]).unwrap().shape(), &[2, 2]);
    }

    #[test]
    fn split_columns() {
        let a = NdArray::try_new(vec![2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        let columns = a.columns().unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].data(), &[2, 5]);
        assert!(NdArray::from_vec(vec![1]).columns().is_err());
    }
}
