use crate::xdm::XdmAtomicValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

/// Node source consumed by atomization and the effective boolean value.
///
/// Only the string value is required; schema-less nodes atomize to a single
/// `xs:untypedAtomic`. Adapters with type information override `typed_value`.
pub trait XdmNode: Clone + Eq + core::fmt::Debug + Send + Sync {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn string_value(&self) -> String;

    fn typed_value(&self) -> Vec<XdmAtomicValue> {
        vec![XdmAtomicValue::UntypedAtomic(self.string_value())]
    }
}
