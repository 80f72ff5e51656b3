use std::fmt;
use std::str::FromStr;

use custody_store::LedgerStore;

use crate::error::{RegistryError, RegistryResult};
use crate::operations::Registry;

/// Names of the callable registry functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Register,
    Transfer,
    Read,
    RangedList,
}

impl Function {
    pub const ALL: [Function; 4] = [
        Function::Register,
        Function::Transfer,
        Function::Read,
        Function::RangedList,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Transfer => "transfer",
            Self::Read => "read",
            Self::RangedList => "rangedList",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| RegistryError::UnknownFunction(s.to_string()))
    }
}

/// A fully decoded call into the registry.
///
/// Built once at the boundary from a function name and positional byte-string
/// arguments; everything past this point is statically typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Register {
        id: String,
        produced: Vec<u8>,
        location: String,
    },
    Transfer {
        id: String,
        payload: Vec<u8>,
        location: String,
    },
    Read {
        id: String,
    },
    RangedList {
        start_key: String,
        end_key: String,
    },
}

impl Invocation {
    /// Resolve `function` and validate `args` against its layout:
    ///
    /// | function     | args\[0\] | args\[1\]            | args\[2\]           |
    /// |--------------|-----------|----------------------|---------------------|
    /// | `register`   | id        | produced-info JSON   | location (optional) |
    /// | `transfer`   | id        | `{owner?, holder?}`  | location (optional) |
    /// | `read`       | id        |                      |                     |
    /// | `rangedList` | start key | end key              |                     |
    pub fn parse<A: AsRef<[u8]>>(function: &str, args: &[A]) -> RegistryResult<Self> {
        match function.parse::<Function>()? {
            Function::Register => {
                require_at_least(args, 2)?;
                Ok(Self::Register {
                    id: id_arg(args)?,
                    produced: args[1].as_ref().to_vec(),
                    location: optional_text_arg(args, 2, "location")?,
                })
            }
            Function::Transfer => {
                require_at_least(args, 2)?;
                Ok(Self::Transfer {
                    id: id_arg(args)?,
                    payload: args[1].as_ref().to_vec(),
                    location: optional_text_arg(args, 2, "location")?,
                })
            }
            Function::Read => {
                if args.len() != 1 {
                    return Err(RegistryError::Validation(format!(
                        "incorrect number of arguments: expecting 1, got {}",
                        args.len()
                    )));
                }
                Ok(Self::Read { id: id_arg(args)? })
            }
            Function::RangedList => {
                require_at_least(args, 2)?;
                Ok(Self::RangedList {
                    start_key: text_arg(args, 0, "start key")?,
                    end_key: text_arg(args, 1, "end key")?,
                })
            }
        }
    }

    pub fn function(&self) -> Function {
        match self {
            Self::Register { .. } => Function::Register,
            Self::Transfer { .. } => Function::Transfer,
            Self::Read { .. } => Function::Read,
            Self::RangedList { .. } => Function::RangedList,
        }
    }

    /// The item key this invocation targets, if it targets a single item.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::Register { id, .. } | Self::Transfer { id, .. } | Self::Read { id } => Some(id),
            Self::RangedList { .. } => None,
        }
    }

    /// Run the invocation against `store` and return its success payload.
    ///
    /// `register` and `transfer` return an empty payload; `read` returns the
    /// stored record; `rangedList` returns the JSON listing.
    pub fn execute<S: LedgerStore + ?Sized>(&self, store: &mut S) -> RegistryResult<Vec<u8>> {
        let mut registry = Registry::new(store);
        match self {
            Self::Register {
                id,
                produced,
                location,
            } => registry.register(id, produced, location).map(|_| Vec::new()),
            Self::Transfer {
                id,
                payload,
                location,
            } => registry.transfer(id, payload, location).map(|_| Vec::new()),
            Self::Read { id } => registry.read(id),
            Self::RangedList { start_key, end_key } => registry.ranged_list(start_key, end_key),
        }
    }
}

fn require_at_least<A>(args: &[A], n: usize) -> RegistryResult<()> {
    if args.len() < n {
        return Err(RegistryError::Validation(format!(
            "incorrect number of arguments: expecting at least {n}, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn id_arg<A: AsRef<[u8]>>(args: &[A]) -> RegistryResult<String> {
    let id = text_arg(args, 0, "item id")?;
    if id.is_empty() {
        return Err(RegistryError::Validation(
            "1st argument must be a non-empty string".into(),
        ));
    }
    Ok(id)
}

fn text_arg<A: AsRef<[u8]>>(args: &[A], index: usize, what: &str) -> RegistryResult<String> {
    String::from_utf8(args[index].as_ref().to_vec())
        .map_err(|_| RegistryError::Validation(format!("{what} must be valid UTF-8")))
}

fn optional_text_arg<A: AsRef<[u8]>>(
    args: &[A],
    index: usize,
    what: &str,
) -> RegistryResult<String> {
    if index < args.len() {
        text_arg(args, index, what)
    } else {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_store::InMemoryLedger;

    #[test]
    fn function_names_roundtrip() {
        for f in Function::ALL {
            assert_eq!(f.name().parse::<Function>().unwrap(), f);
        }
        assert_eq!(Function::RangedList.to_string(), "rangedList");
    }

    #[test]
    fn unknown_function_rejected() {
        let err = Invocation::parse("delete", &["item-1"]).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFunction(ref f) if f == "delete"));
        let err = "rangedlist".parse::<Function>().unwrap_err();
        assert_eq!(err.kind(), "unknown_function");
    }

    #[test]
    fn parse_register_with_location() {
        let inv = Invocation::parse("register", &["item-1", r#"{"producer":"Acme"}"#, "Dock"]).unwrap();
        assert_eq!(
            inv,
            Invocation::Register {
                id: "item-1".into(),
                produced: br#"{"producer":"Acme"}"#.to_vec(),
                location: "Dock".into(),
            }
        );
        assert_eq!(inv.item_id(), Some("item-1"));
    }

    #[test]
    fn parse_register_location_optional() {
        let inv = Invocation::parse("register", &["item-1", "{}"]).unwrap();
        assert!(matches!(inv, Invocation::Register { ref location, .. } if location.is_empty()));
    }

    #[test]
    fn parse_argument_counts() {
        for function in ["register", "transfer", "rangedList"] {
            let err = Invocation::parse(function, &["only-one"]).unwrap_err();
            assert_eq!(err.kind(), "validation", "{function}");
        }
        let err = Invocation::parse("read", &["a", "b"]).unwrap_err();
        assert_eq!(err.kind(), "validation");
        let err = Invocation::parse::<&str>("read", &[]).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn parse_empty_id_rejected() {
        for function in ["register", "transfer"] {
            let err = Invocation::parse(function, &["", "{}"]).unwrap_err();
            assert_eq!(err.kind(), "validation");
        }
        let err = Invocation::parse("read", &[""]).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn parse_non_utf8_id_rejected() {
        let args: Vec<Vec<u8>> = vec![vec![0xff, 0xfe], b"{}".to_vec()];
        let err = Invocation::parse("register", &args).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn parse_ranged_list_allows_empty_keys() {
        let inv = Invocation::parse("rangedList", &["", ""]).unwrap();
        assert_eq!(
            inv,
            Invocation::RangedList {
                start_key: String::new(),
                end_key: String::new(),
            }
        );
        assert_eq!(inv.item_id(), None);
    }

    #[test]
    fn execute_payloads() {
        let ledger = InMemoryLedger::new();
        let mut tx = ledger.begin();
        let payload = Invocation::parse("register", &["item-1", r#"{"producer":"Acme"}"#, "Dock"])
            .unwrap()
            .execute(&mut tx)
            .unwrap();
        assert!(payload.is_empty());
        tx.commit().unwrap();

        let mut tx = ledger.begin();
        let record = Invocation::parse("read", &["item-1"])
            .unwrap()
            .execute(&mut tx)
            .unwrap();
        assert_eq!(Some(record), ledger.get("item-1").unwrap());

        let listing = Invocation::parse("rangedList", &["item-0", "item-9"])
            .unwrap()
            .execute(&mut tx)
            .unwrap();
        assert!(listing.starts_with(br#"[{"Key":"item-1","Record":"#));
    }
}
