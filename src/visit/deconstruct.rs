use super::Visitor;
use crate::ast::{
    Alternation, Backref, Call, CharClass, Enclose, EncloseCondition, EncloseMemory,
    EncloseOptions, GroupRef, List, Literal, Node, Quantifier,
};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A format-independent field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Map(Fields),
}

impl Value {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<&GroupRef> for Value {
    fn from(value: &GroupRef) -> Self {
        match value {
            GroupRef::Number(number) => Value::Int(i64::from(*number)),
            GroupRef::Name(name) => Value::Str(name.clone()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(value),
            Value::Int(value) => serde_json::Value::from(value),
            Value::Str(value) => serde_json::Value::String(value),
            Value::List(values) => {
                serde_json::Value::Array(values.into_iter().map(Into::into).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name.to_owned(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Str(value) => serializer.serialize_str(value),
            Value::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Map(fields) => fields.serialize(serializer),
        }
    }
}

/// The named fields of one node, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(&'static str, Value)>);

impl Fields {
    #[must_use]
    pub const fn new() -> Self {
        Fields(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: Value) -> Self {
        self.0.push((name, value));
        self
    }

    pub(crate) fn prepend(&mut self, name: &'static str, value: Value) {
        self.0.insert(0, (name, value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find_map(|(field, value)| (*field == name).then_some(value))
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (&'static str, Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Fields {
    type Item = (&'static str, Value);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a (&'static str, Value);
    type IntoIter = std::slice::Iter<'a, (&'static str, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// Field builders shared by every visitor that produces `Fields`. Children
// are visited with `visitor`, so a caller that decorates its output sees the
// decoration at every depth.

fn child<V>(visitor: &mut V, node: &Node) -> Value
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Value::Map(node.accept(visitor))
}

pub(crate) fn nodes<V>(visitor: &mut V, nodes: &[Node]) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    let nodes = nodes.iter().map(|node| child(visitor, node)).collect();
    Fields::new().with("nodes", Value::List(nodes))
}

pub(crate) fn enclosed<V>(visitor: &mut V, node: &Node) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Fields::new().with("node", child(visitor, node))
}

pub(crate) fn backref(node: &Backref) -> Fields {
    Fields::new().with(
        "values",
        Value::List(node.values().iter().map(Value::from).collect()),
    )
}

pub(crate) fn call(node: &Call) -> Fields {
    Fields::new()
        .with(
            "number",
            node.number()
                .map_or(Value::Null, |number| Value::Int(number.into())),
        )
        .with(
            "name",
            node.name()
                .map_or(Value::Null, |name| Value::Str(name.to_owned())),
        )
}

pub(crate) fn cclass(node: &CharClass) -> Fields {
    let ranges = node
        .ranges()
        .iter()
        .map(|&(low, high)| Value::List(vec![Value::Int(low.into()), Value::Int(high.into())]))
        .collect();
    Fields::new().with("ranges", Value::List(ranges))
}

pub(crate) fn enclose_condition<V>(visitor: &mut V, node: &EncloseCondition) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Fields::new()
        .with("number", Value::from(node.number()))
        .with("node", child(visitor, node.node()))
}

pub(crate) fn enclose_memory<V>(visitor: &mut V, node: &EncloseMemory) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Fields::new()
        .with("number", Value::Int(node.number().into()))
        .with("node", child(visitor, node.node()))
}

pub(crate) fn enclose_options<V>(visitor: &mut V, node: &EncloseOptions) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Fields::new()
        .with("options", Value::Int(node.options().bits().into()))
        .with("node", child(visitor, node.node()))
}

pub(crate) fn quantifier<V>(visitor: &mut V, node: &Quantifier) -> Fields
where
    V: Visitor<Output = Fields> + ?Sized,
{
    Fields::new()
        .with("lower", Value::Int(node.lower().into()))
        .with("upper", Value::Int(node.upper().to_i64()))
        .with("greedy", Value::Bool(node.greedy()))
        .with("node", child(visitor, node.node()))
}

pub(crate) fn string(node: &Literal) -> Fields {
    Fields::new().with("value", Value::Str(node.value().to_owned()))
}

/// Maps each node to its named fields. Child nodes become nested maps and
/// leaves without data become empty maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeconstructVisitor;

impl Visitor for DeconstructVisitor {
    type Output = Fields;

    fn visit_alternation(&mut self, node: &Alternation) -> Fields {
        nodes(self, node.nodes())
    }

    fn visit_anchor_buffer_begin(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_buffer_end(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_keep(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_line_begin(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_line_end(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_position_begin(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_semi_end(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_word_boundary(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_anchor_word_boundary_invert(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_any(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_backref(&mut self, node: &Backref) -> Fields {
        backref(node)
    }

    fn visit_call(&mut self, node: &Call) -> Fields {
        call(node)
    }

    fn visit_cclass(&mut self, node: &CharClass) -> Fields {
        cclass(node)
    }

    fn visit_cclass_invert(&mut self, node: &CharClass) -> Fields {
        cclass(node)
    }

    fn visit_enclose_absent(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_enclose_condition(&mut self, node: &EncloseCondition) -> Fields {
        enclose_condition(self, node)
    }

    fn visit_enclose_memory(&mut self, node: &EncloseMemory) -> Fields {
        enclose_memory(self, node)
    }

    fn visit_enclose_options(&mut self, node: &EncloseOptions) -> Fields {
        enclose_options(self, node)
    }

    fn visit_enclose_stop_backtrack(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_list(&mut self, node: &List) -> Fields {
        nodes(self, node.nodes())
    }

    fn visit_look_ahead(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_look_ahead_invert(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_look_behind(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_look_behind_invert(&mut self, node: &Enclose) -> Fields {
        enclosed(self, node.node())
    }

    fn visit_quantifier(&mut self, node: &Quantifier) -> Fields {
        quantifier(self, node)
    }

    fn visit_string(&mut self, node: &Literal) -> Fields {
        string(node)
    }

    fn visit_word(&mut self) -> Fields {
        Fields::new()
    }

    fn visit_word_invert(&mut self) -> Fields {
        Fields::new()
    }
}

impl Node {
    /// Returns the named fields of this node, recursively.
    ///
    /// ```
    /// use onigtree::Value;
    ///
    /// let fields = onigtree::parse("a{2,}")?.deconstruct();
    /// assert_eq!(fields.get("lower"), Some(&Value::Int(2)));
    /// assert_eq!(fields.get("upper"), Some(&Value::Int(-1)));
    /// # Ok::<(), onigtree::Error>(())
    /// ```
    #[must_use]
    pub fn deconstruct(&self) -> Fields {
        self.accept(&mut DeconstructVisitor)
    }
}
