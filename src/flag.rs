//! Command-line flags with multiple names per flag.
//!
//! A flag is registered once with one or more names (`-h`, `--help`) and a
//! typed default. Every name resolves to the same definition, so parsing any
//! of them updates the same value. Usage text lists all names of a flag in
//! one paragraph and only shows defaults that are not zero-looking.

mod duration;
mod usage;
mod value;

use std::collections::HashMap;
use std::marker::PhantomData;

use thiserror::Error;

pub use duration::{Duration, ParseDurationError};
pub use value::{Kind, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlagError {
    #[error("flag registered without a name")]
    EmptyNames,
    #[error("flag name {0:?} must not be empty, begin with '-' or contain '='")]
    InvalidName(String),
    #[error("flag redefined: {0}")]
    DuplicateFlagName(String),
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),
    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
}

/// Rust types that can back a flag.
pub trait FlagType: Sized {
    fn into_value(self) -> Value;

    /// `None` when `value` holds another kind.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! flag_type {
    ($ty:ty, $variant:ident) => {
        impl FlagType for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

flag_type!(bool, Bool);
flag_type!(i32, Int);
flag_type!(i64, Int64);
flag_type!(u32, Uint);
flag_type!(u64, Uint64);
flag_type!(f64, Float64);
flag_type!(String, String);
flag_type!(Duration, Duration);

/// Typed handle to a registered flag.
///
/// Only meaningful for the registry that returned it.
pub struct FlagId<T> {
    index: usize,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for FlagId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlagId<T> {}

impl<T> std::fmt::Debug for FlagId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FlagId").field(&self.index).finish()
    }
}

#[derive(Debug, Clone)]
pub struct FlagDefinition {
    names: Vec<String>,
    help: String,
    default: Value,
    value: Value,
    set: bool,
}

impl FlagDefinition {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The first registered name.
    pub fn primary_name(&self) -> &str {
        &self.names[0]
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> Kind {
        self.default.kind()
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the command line assigned this flag.
    pub fn was_set(&self) -> bool {
        self.set
    }
}

/// The set of flags known to a program.
///
/// Build it with [`Registry::register`], then call [`Registry::parse`] once
/// with the process arguments.
#[derive(Debug, Default)]
pub struct Registry {
    by_name: HashMap<String, usize>,
    ordered: Vec<FlagDefinition>,
    parsed: bool,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.contains('=')
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flag under every name in `names`.
    ///
    /// The value is set to `default` right away. Nothing is registered if any
    /// name is malformed or already taken.
    pub fn register<T: FlagType>(
        &mut self,
        names: &[&str],
        default: T,
        help: &str,
    ) -> Result<FlagId<T>, FlagError> {
        if names.is_empty() {
            return Err(FlagError::EmptyNames);
        }
        for (i, name) in names.iter().enumerate() {
            if !valid_name(name) {
                return Err(FlagError::InvalidName(name.to_string()));
            }
            if self.by_name.contains_key(*name) || names[..i].contains(name) {
                return Err(FlagError::DuplicateFlagName(name.to_string()));
            }
        }

        let index = self.ordered.len();
        for name in names {
            self.by_name.insert(name.to_string(), index);
        }
        let default = default.into_value();
        self.ordered.push(FlagDefinition {
            names: names.iter().map(|n| n.to_string()).collect(),
            help: help.to_string(),
            value: default.clone(),
            default,
            set: false,
        });
        Ok(FlagId {
            index,
            _kind: PhantomData,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&FlagDefinition> {
        self.by_name.get(name).map(|&i| &self.ordered[i])
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[FlagDefinition] {
        &self.ordered
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Current value of a flag: its default until a parse assigns it.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry whose flag at the
    /// same position has another kind.
    pub fn value<T: FlagType>(&self, id: FlagId<T>) -> T {
        self.ordered
            .get(id.index)
            .and_then(|flag| T::from_value(&flag.value))
            .unwrap_or_else(|| panic!("flag id {} does not belong to this registry", id.index))
    }

    pub fn was_set<T>(&self, id: FlagId<T>) -> bool {
        self.ordered.get(id.index).is_some_and(|flag| flag.set)
    }

    /// Parses command-line arguments, without the program name.
    ///
    /// Stops at the first non-flag argument or after a `--` terminator and
    /// returns the remaining positional arguments.
    pub fn parse<I, S>(&mut self, args: I) -> Result<Vec<String>, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parsed = true;
        let mut args = args.into_iter().map(Into::<String>::into).peekable();

        while let Some(arg) = args.peek() {
            if arg.len() < 2 || !arg.starts_with('-') {
                break;
            }
            let Some(arg) = args.next() else { break };
            if arg == "--" {
                break;
            }

            let body = arg.strip_prefix("--").unwrap_or(&arg[1..]);
            if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
                return Err(FlagError::BadSyntax(arg));
            }
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            let index = *self
                .by_name
                .get(name)
                .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?;
            let flag = &mut self.ordered[index];

            let text = match (flag.kind(), inline) {
                (_, Some(text)) => text,
                (Kind::Bool, None) => "true".to_string(),
                (_, None) => args
                    .next()
                    .ok_or_else(|| FlagError::MissingValue(name.to_string()))?,
            };
            flag.value = flag
                .kind()
                .parse(&text)
                .map_err(|reason| FlagError::InvalidValue {
                    name: name.to_string(),
                    value: text.clone(),
                    reason,
                })?;
            flag.set = true;
        }

        Ok(args.collect())
    }

    /// Usage text for every flag, grouped by shared help text.
    pub fn render_usage(&self) -> String {
        usage::render(&self.ordered)
    }

    pub fn usage(&self, program: &str) -> String {
        format!("Usage: {program} [OPTIONS]...\n{}", self.render_usage())
    }

    /// Writes [`Registry::render_usage`] to stderr.
    pub fn print_defaults(&self) {
        eprint!("{}", self.render_usage());
    }

    pub fn print_usage(&self, program: &str) {
        eprint!("{}", self.usage(program));
    }
}
