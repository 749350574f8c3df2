use rand::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{NnError, Result};

/// Dense, row-major `f32` matrix.
///
/// `data.len() == rows * columns` always holds. The fields are private so the
/// constructors below are the only way to establish that invariant; `clone()`
/// is a deep copy of the buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Zero-filled `rows x columns` matrix.
    pub fn new(rows: usize, columns: usize) -> Matrix {
        Matrix {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Copies `values` into a `len x 1` column vector.
    pub fn from_array(values: &[f32]) -> Matrix {
        Matrix {
            rows: values.len(),
            columns: 1,
            data: values.to_vec(),
        }
    }

    /// Wraps a row-major buffer. Fails unless `data.len() == rows * columns`.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<f32>) -> Result<Matrix> {
        let expected = rows
            .checked_mul(columns)
            .ok_or(NnError::InvalidLength { expected: usize::MAX, actual: data.len() })?;
        if data.len() != expected {
            return Err(NnError::InvalidLength { expected, actual: data.len() });
        }
        Ok(Matrix { rows, columns, data })
    }

    /// Builds a matrix from nested rows, each of which must hold `columns` values.
    ///
    /// The buffer is sized from the rows supplied, never from `rows * columns`.
    pub fn from_rows(rows: usize, columns: usize, nested: Vec<Vec<f32>>) -> Result<Matrix> {
        if nested.len() != rows {
            return Err(NnError::InvalidLength { expected: rows, actual: nested.len() });
        }
        if let Some(row) = nested.iter().find(|row| row.len() != columns) {
            return Err(NnError::InvalidLength { expected: columns, actual: row.len() });
        }
        let data: Vec<f32> = nested.into_iter().flatten().collect();
        Ok(Matrix { rows, columns, data })
    }

    /// `rows x columns` matrix with every element uniform in [-1, 1).
    pub fn random(rows: usize, columns: usize) -> Matrix {
        let mut res = Matrix::new(rows, columns);
        res.randomize();
        res
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of elements (`rows * columns`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row < self.rows && column < self.columns {
            Some(self.data[row * self.columns + column])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copy of the buffer in storage (row-major) order.
    pub fn to_array(&self) -> Vec<f32> {
        self.data.clone()
    }

    /// Refills every element uniformly from [-1, 1) using the thread-local RNG.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    /// Seedable variant of [`Matrix::randomize`].
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for x in self.data.iter_mut() {
            *x = rng.gen::<f32>() * 2.0 - 1.0;
        }
    }

    /// Element-wise `self += other`. Both dimensions must match.
    pub fn add_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other, "add_matrix")?;
        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x += y;
        }
        Ok(())
    }

    pub fn add_scalar(&mut self, n: f32) {
        for x in self.data.iter_mut() {
            *x += n;
        }
    }

    /// Element-wise (Hadamard) product in place. Both dimensions must match.
    pub fn hadamard(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other, "hadamard")?;
        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x *= y;
        }
        Ok(())
    }

    pub fn multiply_scalar(&mut self, n: f32) {
        for x in self.data.iter_mut() {
            *x *= n;
        }
    }

    /// Replaces every element `x` with `functor(x)`.
    pub fn map<F>(&mut self, functor: F)
    where
        F: Fn(f32) -> f32,
    {
        for x in self.data.iter_mut() {
            *x = functor(*x);
        }
    }

    /// Like [`Matrix::map`] but leaves `self` untouched and returns the result.
    pub fn mapped<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f32) -> f32,
    {
        Matrix {
            rows: self.rows,
            columns: self.columns,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::new(self.columns, self.rows);

        for i in 0..self.rows {
            for j in 0..self.columns {
                res.data[j * self.rows + i] = self.data[i * self.columns + j];
            }
        }

        res
    }

    /// Matrix product `a * b`. Requires `a.columns == b.rows`; the result is
    /// `a.rows x b.columns`.
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.columns != b.rows {
            return Err(a.mismatch(b, "multiply"));
        }

        let mut res = Matrix::new(a.rows, b.columns);

        for i in 0..a.rows {
            for j in 0..b.columns {
                let mut sum = 0.0;

                for k in 0..a.columns {
                    sum += a.data[i * a.columns + k] * b.data[k * b.columns + j];
                }

                res.data[i * b.columns + j] = sum;
            }
        }

        Ok(res)
    }

    /// Element-wise `a - b`. Both dimensions must match.
    pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        a.ensure_same_shape(b, "subtract")?;
        let data = a.data.iter().zip(b.data.iter()).map(|(x, y)| x - y).collect();
        Ok(Matrix {
            rows: a.rows,
            columns: a.columns,
            data,
        })
    }

    /// `{"rows": r, "columns": c, "data": [[row 0], [row 1], ...]}`
    pub fn to_json(&self) -> Value {
        let data: Vec<Value> = (0..self.rows)
            .map(|r| {
                let row = &self.data[r * self.columns..(r + 1) * self.columns];
                Value::Array(row.iter().map(|&x| Value::from(x)).collect())
            })
            .collect();

        let mut obj = serde_json::Map::new();
        obj.insert("rows".into(), Value::from(self.rows));
        obj.insert("columns".into(), Value::from(self.columns));
        obj.insert("data".into(), Value::Array(data));
        Value::Object(obj)
    }

    /// Inverse of [`Matrix::to_json`].
    pub fn from_json(value: &Value) -> Result<Matrix> {
        Matrix::deserialize(value).map_err(NnError::malformed)
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.rows == other.rows && self.columns == other.columns {
            Ok(())
        } else {
            Err(self.mismatch(other, op))
        }
    }

    fn mismatch(&self, other: &Matrix, op: &'static str) -> NnError {
        NnError::DimensionMismatch {
            op,
            left: self.shape(),
            right: other.shape(),
        }
    }
}

impl Serialize for Matrix {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct MatrixData {
            rows: usize,
            columns: usize,
            data: Vec<Vec<f32>>,
        }

        let raw = MatrixData::deserialize(deserializer)?;
        Matrix::from_rows(raw.rows, raw.columns, raw.data).map_err(|e| {
            de::Error::custom(format!(
                "matrix data does not match {}x{}: {}",
                raw.rows, raw.columns, e
            ))
        })
    }
}
