/// Content accepted by [`crate::Editor::write`], normalized once at the
/// entry point.
use crate::error::EditError;

/// Text or a number to write into the value.
///
/// Hosts that receive loosely typed input (JSON messages, scripting
/// bridges) convert it with the `From` impls; anything that is neither text
/// nor a number ends up as `Unsupported` and is rejected on write.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Integer(i64),
    Float(f64),
    Unsupported { kind: &'static str, repr: String },
}

impl Content {
    /// Returns the text to write.
    ///
    /// # Errors
    ///
    /// Returns `InvalidContent` for unsupported content.
    pub fn normalize(self) -> Result<String, EditError> {
        match self {
            Content::Text(text) => Ok(text),
            Content::Integer(n) => Ok(n.to_string()),
            Content::Float(f) => Ok(format_float(f)),
            Content::Unsupported { kind, repr } => Err(EditError::InvalidContent(format!(
                "value {repr} of type {kind} is not a valid string"
            ))),
        }
    }
}

fn format_float(f: f64) -> String {
    match f {
        f64::INFINITY => "Infinity".to_string(),
        f64::NEG_INFINITY => "-Infinity".to_string(),
        _ => f.to_string(),
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&String> for Content {
    fn from(text: &String) -> Self {
        Content::Text(text.clone())
    }
}

impl From<char> for Content {
    fn from(ch: char) -> Self {
        Content::Text(ch.to_string())
    }
}

macro_rules! integer_content {
    ($($t:ty),*) => {
        $(impl From<$t> for Content {
            fn from(n: $t) -> Self {
                Content::Integer(i64::from(n))
            }
        })*
    };
}

integer_content!(i8, i16, i32, i64, u8, u16, u32);

/// Wide integers past `i64` are written as their exact decimal text.
macro_rules! wide_integer_content {
    ($($t:ty),*) => {
        $(impl From<$t> for Content {
            fn from(n: $t) -> Self {
                i64::try_from(n).map_or_else(|_| Content::Text(n.to_string()), Content::Integer)
            }
        })*
    };
}

wide_integer_content!(u64, usize, isize, i128, u128);

impl From<f32> for Content {
    fn from(f: f32) -> Self {
        Content::Float(f64::from(f))
    }
}

impl From<f64> for Content {
    fn from(f: f64) -> Self {
        Content::Float(f)
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Content::Unsupported {
                kind: "none",
                repr: "None".to_string(),
            },
        }
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(text) => Content::Text(text),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Content::Integer(i),
                None if n.is_u64() => Content::Text(n.to_string()),
                None => Content::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::Null => Content::Unsupported {
                kind: "null",
                repr: "null".to_string(),
            },
            Value::Bool(b) => Content::Unsupported {
                kind: "boolean",
                repr: b.to_string(),
            },
            Value::Array(_) => Content::Unsupported {
                kind: "array",
                repr: value.to_string(),
            },
            Value::Object(_) => Content::Unsupported {
                kind: "object",
                repr: value.to_string(),
            },
        }
    }
}
