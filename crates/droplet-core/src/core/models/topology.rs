use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bond multiplicity. The discriminants are the codes used in BGF `ORDER`
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized bond order '{0}'")]
pub struct ParseBondOrderError(pub String);

impl BondOrder {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BondOrder {
    type Error = ParseBondOrderError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Single),
            2 => Ok(Self::Double),
            3 => Ok(Self::Triple),
            4 => Ok(Self::Aromatic),
            other => Err(ParseBondOrderError(other.to_string())),
        }
    }
}

/// Accepts a numeric code or a name (`single`, `d`, `ar`, ...).
impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if let Ok(code) = token.parse::<u8>() {
            return Self::try_from(code);
        }
        match token.to_ascii_lowercase().as_str() {
            "s" | "single" => Ok(Self::Single),
            "d" | "double" => Ok(Self::Double),
            "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError(token.to_string())),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Aromatic => "aromatic",
        };
        f.write_str(name)
    }
}

/// A bond between two atoms of the same molecule, addressed by their index
/// within the molecule's atom list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom1: usize, atom2: usize, order: BondOrder) -> Self {
        Self {
            atom1,
            atom2,
            order,
        }
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atom1 == atom || self.atom2 == atom
    }

    /// The endpoint opposite `atom`, if `atom` is on this bond.
    pub fn partner(&self, atom: usize) -> Option<usize> {
        match (self.atom1 == atom, self.atom2 == atom) {
            (true, _) => Some(self.atom2),
            (_, true) => Some(self.atom1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_and_names_both_parse() {
        assert_eq!("1".parse(), Ok(BondOrder::Single));
        assert_eq!(" 2 ".parse(), Ok(BondOrder::Double));
        assert_eq!("Triple".parse(), Ok(BondOrder::Triple));
        assert_eq!("AR".parse(), Ok(BondOrder::Aromatic));
        assert_eq!(
            "0".parse::<BondOrder>(),
            Err(ParseBondOrderError("0".into()))
        );
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn codes_round_trip_through_try_from() {
        for order in [
            BondOrder::Single,
            BondOrder::Double,
            BondOrder::Triple,
            BondOrder::Aromatic,
        ] {
            assert_eq!(BondOrder::try_from(order.code()), Ok(order));
        }
        assert_eq!(BondOrder::default().code(), 1);
        assert_eq!(BondOrder::Aromatic.to_string(), "aromatic");
    }

    #[test]
    fn partner_resolves_the_other_endpoint() {
        let bond = Bond::new(0, 2, BondOrder::Single);
        assert!(bond.contains(2));
        assert!(!bond.contains(1));
        assert_eq!(bond.partner(0), Some(2));
        assert_eq!(bond.partner(2), Some(0));
        assert_eq!(bond.partner(1), None);
    }
}
