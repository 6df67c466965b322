//! Core types for spark-vdom.
//!
//! These types flow through every layer: the node model, the lifecycle
//! engine, and the host surface. Props, state and context all share the
//! same dynamic map representation.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Identifiers
// =============================================================================

/// Handle to a node owned by the host display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub usize);

/// Handle to a component instance in the instance registry.
///
/// The generation advances every time a slot is recycled, so an id that
/// outlives its instance never aliases a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl InstanceId {
    /// Slot index inside the registry.
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Namespace URI entered by `svg` elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

// =============================================================================
// Value
// =============================================================================

/// A dynamic property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Vec<Value>),
}

impl Value {
    /// Returns the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a bool if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// `Null` and `Bool(false)` mean "absent" on the native surface.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Null | Value::Bool(false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered, string-keyed map of values.
///
/// Cloning is cheap: the map is shared until one of the clones is mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Rc<IndexMap<String, Value>>);

/// Component state uses the same representation as props.
pub type State = Props;

/// Context flowing from parents to descendants.
pub type Context = Props;

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Rc::make_mut(&mut self.0).insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        Rc::make_mut(&mut self.0).shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Right-biased merge: keys in `other` win.
    pub fn merge(&self, other: &Props) -> Props {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut merged = self.clone();
        let map = Rc::make_mut(&mut merged.0);
        for (k, v) in other.0.iter() {
            map.insert(k.clone(), v.clone());
        }
        merged
    }

    /// True when both handles share the same map.
    pub fn ptr_eq(&self, other: &Props) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}

// =============================================================================
// Refs
// =============================================================================

/// What a ref resolves to once attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    /// An element's native node.
    Native(NativeId),
    /// A stateful component instance.
    Instance(InstanceId),
}

/// Callback ref: receives `Some(target)` on attach and `None` on detach.
pub type RefCallback = Rc<dyn Fn(Option<RefTarget>)>;

/// A caller-supplied ref descriptor.
#[derive(Clone)]
pub enum RefSpec {
    Callback(RefCallback),
    /// Resolved against the owner instance (the component whose render
    /// produced the node).
    Named(Rc<str>),
}

impl RefSpec {
    pub fn callback(f: impl Fn(Option<RefTarget>) + 'static) -> Self {
        RefSpec::Callback(Rc::new(f))
    }

    pub fn named(name: &str) -> Self {
        RefSpec::Named(Rc::from(name))
    }
}

impl PartialEq for RefSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RefSpec::Callback(a), RefSpec::Callback(b)) => Rc::ptr_eq(a, b),
            (RefSpec::Named(a), RefSpec::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefSpec::Callback(_) => f.write_str("RefSpec::Callback(..)"),
            RefSpec::Named(name) => write!(f, "RefSpec::Named({name:?})"),
        }
    }
}
