//! Named effect parameters with range clamping and lock-free storage.
//!
//! Every node owns one [`ParameterStore`], shared as `Arc<ParameterStore>` between
//! the audio context (which reads a snapshot at the top of each `process` call)
//! and any number of control handles (which write at arbitrary times).
//!
//! # Example
//!
//! ```
//! use voxmod_core::{ParamSpec, ParamValue, ParameterStore};
//!
//! let store = ParameterStore::new(
//!     "RingMod",
//!     vec![ParamSpec::float("carrierFrequency", 10.0, 1000.0, 100.0)],
//! );
//!
//! // Out-of-range values are clamped, never rejected
//! store.set("carrierFrequency", 5000.0.into()).unwrap();
//! assert_eq!(store.get("carrierFrequency").unwrap(), ParamValue::Float(1000.0));
//! ```

use crate::lockfree::{AtomicFlag, AtomicFloat, AtomicInt};
use crate::{Error, Result};
use std::fmt;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Float,
    Int,
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Float => write!(f, "float"),
            ParamKind::Int => write!(f, "int"),
            ParamKind::Bool => write!(f, "bool"),
        }
    }
}

/// A single parameter value as exchanged with the control context.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Float(_) => ParamKind::Float,
            Self::Int(_) => ParamKind::Int,
            Self::Bool(_) => ParamKind::Bool,
        }
    }

    /// Convert to f32 if numeric
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f32),
            Self::Bool(_) => None,
        }
    }

    /// Convert to i32 if integer
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to bool if boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f as f32)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        Self::Int(i.min(i32::MAX as u32) as i32)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Declaration of one parameter: name, type, valid range and default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Minimum real value (ignored for toggles)
    pub min: f32,
    /// Maximum real value (ignored for toggles)
    pub max: f32,
    pub default: ParamValue,
}

impl ParamSpec {
    /// Continuous parameter. The default is clamped into range.
    pub fn float(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        debug_assert!(max >= min, "max must not be below min");
        Self {
            name,
            kind: ParamKind::Float,
            min,
            max,
            default: ParamValue::Float(default.clamp(min, max)),
        }
    }

    /// Stepped parameter.
    pub fn int(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        debug_assert!(max >= min, "max must not be below min");
        Self {
            name,
            kind: ParamKind::Int,
            min: min as f32,
            max: max as f32,
            default: ParamValue::Int(default.clamp(min, max)),
        }
    }

    /// On/off parameter.
    pub fn toggle(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            min: 0.0,
            max: 1.0,
            default: ParamValue::Bool(default),
        }
    }

    /// Clamp a value into this parameter's range, rejecting a wrong type.
    pub fn clamp(&self, value: ParamValue) -> Result<ParamValue> {
        match (self.kind, value) {
            (ParamKind::Float, ParamValue::Float(f)) => {
                // NaN carries no position in the range; fall back to the default
                if f.is_nan() {
                    Ok(self.default)
                } else {
                    Ok(ParamValue::Float(f.clamp(self.min, self.max)))
                }
            }
            (ParamKind::Int, ParamValue::Int(i)) => {
                Ok(ParamValue::Int(i.clamp(self.min as i32, self.max as i32)))
            }
            (ParamKind::Bool, ParamValue::Bool(b)) => Ok(ParamValue::Bool(b)),
            (expected, actual) => Err(Error::TypeMismatch {
                name: self.name.to_string(),
                expected,
                actual: actual.kind(),
            }),
        }
    }

    /// Check if a real value lies within the range.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug)]
enum ParamCell {
    Float(AtomicFloat),
    Int(AtomicInt),
    Bool(AtomicFlag),
}

impl ParamCell {
    fn new(value: ParamValue) -> Self {
        match value {
            ParamValue::Float(f) => Self::Float(AtomicFloat::new(f)),
            ParamValue::Int(i) => Self::Int(AtomicInt::new(i)),
            ParamValue::Bool(b) => Self::Bool(AtomicFlag::new(b)),
        }
    }

    #[inline]
    fn load(&self) -> ParamValue {
        match self {
            Self::Float(cell) => ParamValue::Float(cell.get()),
            Self::Int(cell) => ParamValue::Int(cell.get()),
            Self::Bool(cell) => ParamValue::Bool(cell.get()),
        }
    }

    #[inline]
    fn store(&self, value: ParamValue) {
        match (self, value) {
            (Self::Float(cell), ParamValue::Float(f)) => cell.set(f),
            (Self::Int(cell), ParamValue::Int(i)) => cell.set(i),
            (Self::Bool(cell), ParamValue::Bool(b)) => cell.set(b),
            _ => {}
        }
    }
}

/// Fixed set of parameter cells belonging to one node.
///
/// The set of names is fixed at construction. Each cell is an independent atomic
/// scalar, so a write is never observed half-applied and no two parameters share
/// storage. Reads by index are wait-free and intended for the audio path.
#[derive(Debug)]
pub struct ParameterStore {
    node: &'static str,
    specs: Vec<ParamSpec>,
    cells: Vec<ParamCell>,
}

impl ParameterStore {
    /// Create a store with every parameter at its default.
    pub fn new(node: &'static str, specs: Vec<ParamSpec>) -> Self {
        let cells = specs.iter().map(|spec| ParamCell::new(spec.default)).collect();
        Self { node, specs, cells }
    }

    /// Type name of the owning node.
    pub fn node_name(&self) -> &'static str {
        self.node
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Store a value, clamping numeric values into range.
    pub fn set(&self, name: &str, value: ParamValue) -> Result<()> {
        let index = self.lookup(name)?;
        let clamped = self.specs[index].clamp(value)?;
        self.cells[index].store(clamped);
        Ok(())
    }

    /// Last stored value.
    pub fn get(&self, name: &str) -> Result<ParamValue> {
        let index = self.lookup(name)?;
        Ok(self.cells[index].load())
    }

    /// Restore every parameter to its default.
    pub fn reset_to_defaults(&self) {
        for (spec, cell) in self.specs.iter().zip(&self.cells) {
            cell.store(spec.default);
        }
    }

    /// Read a float parameter by index.
    ///
    /// Integer cells are widened and toggles read as 0.0 / 1.0; an index past the
    /// end reads as 0.0.
    #[inline]
    pub fn float(&self, index: usize) -> f32 {
        match self.cells.get(index) {
            Some(ParamCell::Float(cell)) => cell.get(),
            Some(ParamCell::Int(cell)) => cell.get() as f32,
            Some(ParamCell::Bool(cell)) => {
                if cell.get() {
                    1.0
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Read an integer parameter by index.
    #[inline]
    pub fn int(&self, index: usize) -> i32 {
        match self.cells.get(index) {
            Some(ParamCell::Int(cell)) => cell.get(),
            Some(ParamCell::Float(cell)) => cell.get().round() as i32,
            Some(ParamCell::Bool(cell)) => cell.get() as i32,
            None => 0,
        }
    }

    /// Read a toggle parameter by index.
    #[inline]
    pub fn flag(&self, index: usize) -> bool {
        match self.cells.get(index) {
            Some(ParamCell::Bool(cell)) => cell.get(),
            Some(ParamCell::Float(cell)) => cell.get() >= 0.5,
            Some(ParamCell::Int(cell)) => cell.get() != 0,
            None => false,
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| Error::UnknownParameter {
            node: self.node.to_string(),
            name: name.to_string(),
        })
    }
}
