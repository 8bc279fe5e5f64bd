use phf::{Map, phf_map};
use thiserror::Error;

/// Standard atomic weights (g/mol) for the elements found in common fluids and substrates.
static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.008, "D" => 2.014, "He" => 4.0026,
    "Li" => 6.94, "B" => 10.81, "C" => 12.011, "N" => 14.007, "O" => 15.999, "F" => 18.998,
    "Ne" => 20.180, "Na" => 22.990, "Mg" => 24.305, "Al" => 26.982, "Si" => 28.085,
    "P" => 30.974, "S" => 32.06, "Cl" => 35.45, "Ar" => 39.948, "K" => 39.098, "Ca" => 40.078,
    "Ti" => 47.867, "Cr" => 51.996, "Fe" => 55.845, "Co" => 58.933, "Ni" => 58.693,
    "Cu" => 63.546, "Zn" => 65.38, "Br" => 79.904, "Mo" => 95.95, "Ag" => 107.87,
    "I" => 126.90, "Pt" => 195.08, "Au" => 196.97, "Pb" => 207.2,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown element symbol '{0}'")]
pub struct UnknownElementError(pub String);

pub fn atomic_mass(symbol: &str) -> Result<f64, UnknownElementError> {
    ATOMIC_MASSES
        .get(symbol.trim())
        .copied()
        .ok_or_else(|| UnknownElementError(symbol.trim().to_string()))
}

pub fn is_known_element(symbol: &str) -> bool {
    ATOMIC_MASSES.contains_key(symbol.trim())
}

/// Guesses the element symbol from an atom or force-field type name.
///
/// A two-letter symbol is only taken when the second letter is lowercase
/// ("Au", "Cl"), so "CA" and "OW" resolve to "C" and "O".
pub fn infer_element(name: &str) -> String {
    let letters: Vec<char> = name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let Some(first) = letters.first().map(|c| c.to_ascii_uppercase()) else {
        return String::new();
    };
    if let Some(second) = letters.get(1).filter(|c| c.is_ascii_lowercase()) {
        let two = format!("{}{}", first, second);
        if is_known_element(&two) {
            return two;
        }
    }
    first.to_string()
}
