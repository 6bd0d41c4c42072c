use crate::ast::{Priority, DEFAULT_PRIORITIES};

/// Compile and evaluation settings.
///
/// Options are plain data passed explicitly into compilation and
/// evaluation; nothing here is process-wide state.
///
/// # Examples
///
/// ```
/// use jsonpath_dialect::{compile_with, evaluate_with, Options, Value};
///
/// let options = Options::default().with_index_objects(true);
/// let query = compile_with("$[0]", &options).unwrap();
/// let doc = jsonpath_dialect::decode_str(r#"{"b": 2, "a": 1}"#).unwrap();
///
/// // Objects are indexed in key-sorted order.
/// assert_eq!(evaluate_with(&query, &doc, &options).unwrap(), Value::Integer(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Accept unquoted whitespace inside bracket segments (`[1, 2]`)
    pub lenient_whitespace: bool,

    /// Allow index, range, and union indices over objects, in key order
    pub index_objects: bool,

    /// Operator search order for the expression builder, lowest binding first
    pub priorities: Vec<Priority>,

    /// Deepest nesting accepted when materialising host values
    pub max_host_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            lenient_whitespace: false,
            index_objects: false,
            priorities: DEFAULT_PRIORITIES.to_vec(),
            max_host_depth: 512,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lenient_whitespace(mut self, lenient: bool) -> Self {
        self.lenient_whitespace = lenient;
        self
    }

    pub fn with_index_objects(mut self, enabled: bool) -> Self {
        self.index_objects = enabled;
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<Priority>) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_max_host_depth(mut self, depth: usize) -> Self {
        self.max_host_depth = depth;
        self
    }
}
