//! Record contract operations

use idledger_core::{Error, Result, RECORD_ARITY};
use std::fmt;
use std::str::FromStr;

/// Functions the record contract answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Register a new record
    Create,
    /// Current record for a passport
    Read,
    /// Change one mutable attribute
    Update,
    /// Every version of a record
    History,
}

impl Operation {
    /// Function name on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::History => "history",
        }
    }

    /// Exact number of positional arguments
    pub fn arity(&self) -> usize {
        match self {
            Operation::Create => RECORD_ARITY,
            Operation::Read | Operation::History => 1,
            Operation::Update => 3,
        }
    }

    /// Fail with `ArgumentCount` unless `args` has exactly [`Operation::arity`]
    /// elements
    pub fn check_arity(&self, args: &[String]) -> Result<()> {
        if args.len() == self.arity() {
            Ok(())
        } else {
            Err(Error::ArgumentCount {
                operation: self.as_str().to_string(),
                expected: self.arity(),
                actual: args.len(),
            })
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Operation::Create),
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "history" => Ok(Operation::History),
            other => Err(Error::UnknownFunction(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_operations() {
        for op in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::History,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            "delete".parse::<Operation>(),
            Err(Error::UnknownFunction("delete".into()))
        );
        // Names are case-sensitive
        assert!("Create".parse::<Operation>().is_err());
    }

    #[test]
    fn test_check_arity() {
        let args = vec!["P1".to_string()];
        assert!(Operation::Read.check_arity(&args).is_ok());
        assert_eq!(
            Operation::Update.check_arity(&args),
            Err(Error::ArgumentCount {
                operation: "update".into(),
                expected: 3,
                actual: 1
            })
        );
    }
}
