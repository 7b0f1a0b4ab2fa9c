use crate::engine::collation::{Collation, CollationRegistry, default_collation_registry};
use crate::model::XdmNode;
use crate::xdm::{ExpandedName, XdmItem, XdmSequence};
use chrono::{FixedOffset, Offset, Utc};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

pub type Arity = usize;

/// Error type returned by function resolution.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No function with the (possibly default-namespace resolved) name exists.
    Unknown(ExpandedName),
    /// Function exists, but not for the requested arity. Provides known arities.
    WrongArity {
        name: ExpandedName,
        available: Vec<Arity>,
    },
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unknown(name) => {
                Error::from_code(ErrorCode::XPST0017, format!("unknown function {name}"))
            }
            ResolveError::WrongArity { name, available } => Error::from_code(
                ErrorCode::XPST0017,
                format!("function {name} does not accept this number of arguments (accepts {available:?})"),
            ),
        }
    }
}

pub struct CallCtx<'a, N> {
    pub dyn_ctx: &'a DynamicContext<N>,
    // Default collation resolved from the dynamic context (if the URI is known)
    pub default_collation: Option<Arc<dyn Collation>>,
}

impl<'a, N> CallCtx<'a, N> {
    pub fn new(dyn_ctx: &'a DynamicContext<N>) -> Self {
        let default_collation = dyn_ctx
            .default_collation
            .as_deref()
            .and_then(|uri| dyn_ctx.collations.get(uri));
        Self {
            dyn_ctx,
            default_collation,
        }
    }
}

pub type FunctionImpl<N> =
    Arc<dyn Fn(&CallCtx<N>, &[XdmSequence<N>]) -> Result<XdmSequence<N>, Error> + Send + Sync>;

pub type FunctionOverload<N> = (Arity, Option<Arity>, FunctionImpl<N>);
pub type FunctionOverloads<N> = Vec<FunctionOverload<N>>;

pub struct FunctionRegistry<N> {
    // Each name holds one or more (min_arity, max_arity, impl) entries. A call
    // matches when argc >= min_arity and (max_arity is None or argc <= max_arity).
    fns: HashMap<ExpandedName, FunctionOverloads<N>>,
}

impl<N> Default for FunctionRegistry<N> {
    fn default() -> Self {
        Self {
            fns: HashMap::new(),
        }
    }
}

impl<N> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function by ExpandedName with an arity range.
    /// If `max_arity` is None, the function is variadic starting at `min_arity`.
    /// Overlapping ranges are allowed; the resolver picks the most specific
    /// (highest min, then smallest max) that matches the requested arity.
    pub fn register_range(
        &mut self,
        name: ExpandedName,
        min_arity: Arity,
        max_arity: Option<Arity>,
        func: FunctionImpl<N>,
    ) {
        let overloads = self.fns.entry(name).or_default();
        overloads.push((min_arity, max_arity, func));
        overloads.sort_by(|a, b| {
            b.0.cmp(&a.0).then_with(|| match (&a.1, &b.1) {
                (Some(amax), Some(bmax)) => amax.cmp(bmax),
                (Some(_), None) => core::cmp::Ordering::Less,
                (None, Some(_)) => core::cmp::Ordering::Greater,
                (None, None) => core::cmp::Ordering::Equal,
            })
        });
    }

    /// Convenience: register a function in a namespace with an arity range.
    pub fn register_ns_range<F>(
        &mut self,
        ns_uri: &str,
        local: &str,
        min_arity: Arity,
        max_arity: Option<Arity>,
        f: F,
    ) where
        F: 'static
            + Send
            + Sync
            + Fn(&CallCtx<N>, &[XdmSequence<N>]) -> Result<XdmSequence<N>, Error>,
    {
        self.register_range(ExpandedName::ns(ns_uri, local), min_arity, max_arity, Arc::new(f));
    }

    /// Convenience: register a function in a namespace with a single arity.
    pub fn register_ns<F>(&mut self, ns_uri: &str, local: &str, arity: Arity, f: F)
    where
        F: 'static
            + Send
            + Sync
            + Fn(&CallCtx<N>, &[XdmSequence<N>]) -> Result<XdmSequence<N>, Error>,
    {
        self.register_ns_range(ns_uri, local, arity, Some(arity), f);
    }

    pub fn contains(&self, name: &ExpandedName) -> bool {
        self.fns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    /// Resolve a function by name/arity with optional default function namespace fallback.
    /// Distinguishes unknown names from known names called with a wrong arity.
    pub fn resolve(
        &self,
        name: &ExpandedName,
        arity: Arity,
        default_ns: Option<&str>,
    ) -> Result<&FunctionImpl<N>, ResolveError> {
        let effective_buf: Option<ExpandedName> = if name.ns_uri.is_none() {
            default_ns.map(|ns| ExpandedName::ns(ns, name.local.clone()))
        } else {
            None
        };
        let effective: &ExpandedName = effective_buf.as_ref().unwrap_or(name);
        let Some(cands) = self.fns.get(effective) else {
            return Err(ResolveError::Unknown(effective.clone()));
        };
        if let Some((_, _, f)) = cands
            .iter()
            .find(|(min, max, _)| arity >= *min && max.is_none_or(|m| arity <= m))
        {
            return Ok(f);
        }
        let mut arities: Vec<Arity> = vec![];
        for (min, max, _) in cands {
            if let Some(m) = max {
                arities.extend(*min..=*m);
            }
        }
        arities.sort_unstable();
        arities.dedup();
        Err(ResolveError::WrongArity {
            name: effective.clone(),
            available: arities,
        })
    }
}

/// Error codes emitted by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FOAR0001, // division by zero
    FOAR0002, // numeric overflow
    FOCA0001, // value too large for decimal
    FOCH0002, // collation does not exist
    FORG0001, // invalid lexical form / cast failure
    FORG0006, // invalid argument type (comparison, aggregation, EBV)
    XPTY0004, // type error
    XPDY0002, // context item undefined
    XPST0017, // unknown function or wrong arity
    Unknown,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::FOAR0001,
        ErrorCode::FOAR0002,
        ErrorCode::FOCA0001,
        ErrorCode::FOCH0002,
        ErrorCode::FORG0001,
        ErrorCode::FORG0006,
        ErrorCode::XPTY0004,
        ErrorCode::XPDY0002,
        ErrorCode::XPST0017,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            ErrorCode::FOAR0001 => "FOAR0001",
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FOCA0001 => "FOCA0001",
            ErrorCode::FOCH0002 => "FOCH0002",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::FORG0006 => "FORG0006",
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::XPDY0002 => "XPDY0002",
            ErrorCode::XPST0017 => "XPST0017",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Returns the QName for this error code in the xqt-errors namespace.
    pub fn qname(self) -> ExpandedName {
        ExpandedName::ns(ERR_NS, self.local_name())
    }

    /// Parse `err:LOCAL`; anything else is `Unknown`.
    pub fn from_code(s: &str) -> Self {
        s.strip_prefix("err:")
            .and_then(|local| Self::ALL.into_iter().find(|c| c.local_name() == local))
            .unwrap_or(ErrorCode::Unknown)
    }
}

/// Namespace URI used for W3C-defined XPath/XQuery error codes (xqt-errors).
pub use crate::consts::ERR_NS;

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ExpandedName,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new_qname(code: ExpandedName, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            source: None,
        }
    }

    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new_qname(code.qname(), msg)
    }

    pub fn code_enum(&self) -> ErrorCode {
        // Only ERR_NS codes map to the enum; others are Unknown.
        if self.code.ns_uri.as_deref() == Some(ERR_NS) {
            ErrorCode::from_code(&format!("err:{}", self.code.local))
        } else {
            ErrorCode::Unknown
        }
    }

    /// Human-readable code: `err:LOCAL` or `Q{ns}local`.
    pub fn format_code(&self) -> String {
        if self.code.ns_uri.as_deref() == Some(ERR_NS) {
            format!("err:{}", self.code.local)
        } else {
            self.code.to_string()
        }
    }

    /// Compose an error with a source cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    /// Parse an error code string (`err:FORG0006` or `Q{ns}local`) into an ExpandedName.
    pub fn parse_code(s: &str) -> ExpandedName {
        if let Some(rest) = s.strip_prefix("err:") {
            return ExpandedName::ns(ERR_NS, rest);
        }
        if let Some((ns, local)) = s
            .strip_prefix('Q')
            .and_then(|t| t.strip_prefix('{'))
            .and_then(|t| t.split_once('}'))
        {
            return ExpandedName::ns(ns, local);
        }
        ExpandedName::new(None, s)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.format_code())
    }
}

#[derive(Clone)]
pub struct DynamicContext<N> {
    pub context_item: Option<XdmItem<N>>,
    pub default_collation: Option<String>,
    pub functions: Arc<FunctionRegistry<N>>,
    pub collations: Arc<CollationRegistry>,
    /// Timezone assumed for date/time values written without one.
    pub implicit_timezone: FixedOffset,
}

impl<N> DynamicContext<N> {
    /// The context item as a singleton sequence, or `XPDY0002` when unset.
    pub fn context_item_sequence(&self) -> Result<XdmSequence<N>, Error>
    where
        N: Clone,
    {
        match &self.context_item {
            Some(item) => Ok(vec![item.clone()]),
            None => Err(Error::from_code(
                ErrorCode::XPDY0002,
                "context item is undefined",
            )),
        }
    }

    /// Resolve `name` (default namespace `fn`) for `args.len()` and invoke it.
    pub fn call_function(
        &self,
        name: &ExpandedName,
        args: &[XdmSequence<N>],
    ) -> Result<XdmSequence<N>, Error> {
        let f = self
            .functions
            .resolve(name, args.len(), Some(crate::consts::FNS))?;
        tracing::trace!(function = %name, arity = args.len(), "dispatch");
        let call_ctx = CallCtx::new(self);
        f(&call_ctx, args)
    }
}

impl<N: 'static + Send + Sync + XdmNode + Clone> Default for DynamicContext<N> {
    fn default() -> Self {
        Self {
            context_item: None,
            default_collation: None,
            functions: Arc::new(crate::engine::functions::default_function_registry::<N>()),
            collations: default_collation_registry(),
            implicit_timezone: Utc.fix(),
        }
    }
}

pub struct DynamicContextBuilder<N> {
    ctx: DynamicContext<N>,
}

impl<N: 'static + Send + Sync + XdmNode + Clone> Default for DynamicContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: 'static + Send + Sync + XdmNode + Clone> DynamicContextBuilder<N> {
    pub fn new() -> Self {
        Self {
            ctx: DynamicContext::default(),
        }
    }

    #[must_use]
    pub fn with_context_item(mut self, item: impl Into<XdmItem<N>>) -> Self {
        self.ctx.context_item = Some(item.into());
        self
    }

    #[must_use]
    pub fn with_default_collation(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_collation = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_functions(mut self, reg: Arc<FunctionRegistry<N>>) -> Self {
        self.ctx.functions = reg;
        self
    }

    #[must_use]
    pub fn with_collations(mut self, reg: Arc<CollationRegistry>) -> Self {
        self.ctx.collations = reg;
        self
    }

    /// Implicit timezone in minutes east of UTC. Out-of-range offsets are ignored.
    #[must_use]
    pub fn with_timezone(mut self, offset_minutes: i32) -> Self {
        if let Some(tz) = offset_minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
            self.ctx.implicit_timezone = tz;
        }
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        self.ctx
    }
}
