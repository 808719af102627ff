//! Parameter store
//!
//! Named, typed configuration values. Values are supplied at startup (from a
//! build-time table or a host console); persistence is not handled here.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 64;

/// Maximum string parameter length (a root serial is at most 20)
pub const MAX_STRING_LEN: usize = 31;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is not listed by `iter_names`
        const HIDDEN = 0b00000001;
        /// Parameter cannot be changed through `set`
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Short text (serial numbers, identifiers)
    String(String<MAX_STRING_LEN>),
    /// Boolean switch
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// IPv4 address
    Ipv4([u8; 4]),
}

impl ParamValue {
    /// Type discriminant
    pub fn type_id(&self) -> u8 {
        match self {
            ParamValue::String(_) => 0,
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 2,
            ParamValue::Float(_) => 3,
            ParamValue::Ipv4(_) => 4,
        }
    }

    /// Numeric view; `Int` and `Bool` widen to `f32`
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f32),
            ParamValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer view; `Float` truncates toward zero
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.is_finite() => Some(*v as i32),
            ParamValue::Bool(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Boolean view; any non-zero number is true
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            ParamValue::Int(v) => Some(*v != 0),
            ParamValue::Float(v) => Some(*v != 0.0),
            _ => None,
        }
    }
}

/// Parameter metadata
#[derive(Debug, Clone)]
pub struct ParamMetadata {
    /// Parameter flags
    pub flags: ParamFlags,
}

fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::new();
    key.push_str(name).map_err(|_| ParameterError::NameTooLong)?;
    Ok(key)
}

/// Fixed-capacity key/value store with per-parameter flags
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, ParamValue, MAX_PARAMS>,
    metadata: FnvIndexMap<String<PARAM_NAME_LEN>, ParamMetadata, MAX_PARAMS>,
    /// Changed since the last `clear_dirty`
    dirty: bool,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
            metadata: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(&key(name).ok()?)
    }

    /// Replace the value of a registered parameter.
    ///
    /// The new value must have the same type as the registered default.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;

        let current = self
            .parameters
            .get(&key)
            .ok_or(ParameterError::UnknownParameter)?;
        if current.type_id() != value.type_id() {
            return Err(ParameterError::TypeMismatch);
        }

        if let Some(meta) = self.metadata.get(&key) {
            if meta.flags.contains(ParamFlags::READ_ONLY) {
                return Err(ParameterError::ReadOnly);
            }
        }

        self.parameters
            .insert(key, value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Register a parameter with its default value.
    ///
    /// Registering an existing name keeps the current value.
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;
        if self.parameters.contains_key(&key) {
            return Ok(());
        }

        self.parameters
            .insert(key.clone(), default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.metadata
            .insert(key, ParamMetadata { flags })
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// True for parameters registered with `HIDDEN`
    pub fn is_hidden(&self, name: &str) -> bool {
        self.get_metadata(name)
            .is_some_and(|meta| meta.flags.contains(ParamFlags::HIDDEN))
    }

    /// Names of all visible parameters, in registration order
    pub fn iter_names(&self) -> impl Iterator<Item = &String<PARAM_NAME_LEN>> {
        self.parameters
            .keys()
            .filter(|name| !self.is_hidden(name.as_str()))
    }

    /// Number of visible parameters
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    /// True if anything changed since the last `clear_dirty`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the change flag
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Total number of parameters, hidden ones included
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterate over all parameters, hidden ones included
    pub fn iter_all(&self) -> impl Iterator<Item = (&String<PARAM_NAME_LEN>, &ParamValue)> {
        self.parameters.iter()
    }

    /// Flags for a parameter
    pub fn get_metadata(&self, name: &str) -> Option<&ParamMetadata> {
        self.metadata.get(&key(name).ok()?)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
