//! Type tags
//!
//! A type tag is an opaque identity token for a logical type. Tags compare by
//! identity only: two tags minted with the same name are different types.

use crate::value::short_type_name;
use lazy_static::lazy_static;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DECLARED_ID: AtomicU64 = AtomicU64::new(0);

/// Identity behind a type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagId {
    /// Reserved tags shared by every registry
    Builtin(u8),
    /// Tags minted at runtime with `TypeTag::new`
    Declared(u64),
    /// Tags standing for a Rust type wrapped in `Value::Instance`
    Native(TypeId),
}

/// Opaque, identity-compared token for a logical type
#[derive(Clone)]
pub struct TypeTag {
    id: TagId,
    name: Arc<str>,
}

macro_rules! builtin_tags {
    ($($(#[$doc:meta])* $method:ident => $stat:ident($index:literal, $name:literal);)*) => {
        lazy_static! {
            $(static ref $stat: TypeTag = TypeTag {
                id: TagId::Builtin($index),
                name: Arc::from($name),
            };)*
        }

        impl TypeTag {
            $(
                $(#[$doc])*
                pub fn $method() -> TypeTag {
                    $stat.clone()
                }
            )*
        }
    };
}

builtin_tags! {
    /// Matches every value
    any => ANY(0, "Any");
    number => NUMBER(1, "Number");
    string => STRING(2, "String");
    boolean => BOOLEAN(3, "Boolean");
    function => FUNCTION(4, "Function");
    array => ARRAY(5, "Array");
    date => DATE(6, "Date");
    regexp => REGEXP(7, "RegExp");
    null => NULL(8, "null");
    undefined => UNDEFINED(9, "undefined");
    /// Plain records only, never class instances
    object => OBJECT(10, "Object");
    /// Reserved for wide integers; no guard is seeded by default
    bigint => BIGINT(11, "BigInt");
}

impl TypeTag {
    /// Mint a fresh tag
    pub fn new(name: impl AsRef<str>) -> Self {
        let id = NEXT_DECLARED_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: TagId::Declared(id),
            name: Arc::from(name.as_ref()),
        }
    }

    /// The tag standing for instances of the Rust type `T`
    ///
    /// Repeated calls return equal tags.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TagId::Native(TypeId::of::<T>()),
            name: Arc::from(short_type_name::<T>()),
        }
    }

    /// Alias of [`TypeTag::any`]
    pub fn unknown() -> Self {
        Self::any()
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Rust type behind a native tag
    pub fn native_type(&self) -> Option<TypeId> {
        match self.id {
            TagId::Native(type_id) => Some(type_id),
            _ => None,
        }
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({}, {:?})", self.name, self.id)
    }
}
