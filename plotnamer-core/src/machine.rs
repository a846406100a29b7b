use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Production machine a job is routed to. The tag is embedded verbatim in the
/// output filename, so the display forms are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineTag {
    /// Solvent printer, tagged `(C.S)`.
    Solvent,
    /// Eco-solvent printer, tagged `(C.E)`.
    Eco,
}

impl MachineTag {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Solvent => "(C.S)",
            Self::Eco => "(C.E)",
        }
    }
}

impl fmt::Display for MachineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MachineTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "(c.s)" | "c.s" | "cs" | "solvent" => Ok(Self::Solvent),
            "(c.e)" | "c.e" | "ce" | "eco" => Ok(Self::Eco),
            other => Err(format!(
                "unknown machine '{}', expected one of: cs, ce",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(MachineTag::Solvent.to_string(), "(C.S)");
        assert_eq!(MachineTag::Eco.to_string(), "(C.E)");
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("cs".parse::<MachineTag>().unwrap(), MachineTag::Solvent);
        assert_eq!("(C.E)".parse::<MachineTag>().unwrap(), MachineTag::Eco);
        assert_eq!("Solvent".parse::<MachineTag>().unwrap(), MachineTag::Solvent);
        assert!("laser".parse::<MachineTag>().is_err());
    }
}
