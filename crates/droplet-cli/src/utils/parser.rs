use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Invalid compound '{0}'. Expected 'NAME' or 'NAME:ELEMENT' (e.g., 'Au:Au').")]
    InvalidCompound(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Splits `key=value` at the first `=`, trimming both halves.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }
    Ok((key, value))
}

/// Parses `NAME` or `NAME:ELEMENT`. A bare name doubles as the element symbol.
pub fn parse_compound(input: &str) -> Result<(String, String), ParseError> {
    let parts: Vec<_> = input.split(':').map(str::trim).collect();
    let (name, element) = match parts.as_slice() {
        [name] => (*name, *name),
        [name, element] => (*name, *element),
        _ => return Err(ParseError::InvalidCompound(input.to_string())),
    };
    if name.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "name",
            input: input.to_string(),
        });
    }
    if element.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "element",
            input: input.to_string(),
        });
    }
    Ok((name.to_string(), element.to_string()))
}
