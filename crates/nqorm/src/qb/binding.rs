//! Binding list collected while rendering SQL text.

use crate::value::Scalar;

/// How a bound value appears in the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// Inline SQL literal (`'Jane'`, `1`). This is what `/query` accepts.
    #[default]
    Inline,
    /// Numbered placeholder (`$1`, `$2`, ...).
    Numbered,
}

/// Values extracted during rendering, in the order they appear in the text.
///
/// Both placeholder styles record exactly the same values, so a builder's
/// bindings never depend on how it was rendered.
#[derive(Debug, Clone, Default)]
pub struct BindingList {
    style: PlaceholderStyle,
    values: Vec<Scalar>,
}

impl BindingList {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            values: Vec::new(),
        }
    }

    /// Inline-literal rendering.
    pub fn inline() -> Self {
        Self::new(PlaceholderStyle::Inline)
    }

    /// `$N` rendering.
    pub fn numbered() -> Self {
        Self::new(PlaceholderStyle::Numbered)
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Record a value and return the text that stands for it.
    pub fn bind(&mut self, value: &Scalar) -> String {
        self.values.push(value.clone());
        match self.style {
            PlaceholderStyle::Inline => value.to_sql_literal(),
            PlaceholderStyle::Numbered => format!("${}", self.values.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_placeholders_follow_bind_order() {
        let mut list = BindingList::numbered();
        assert_eq!(list.bind(&Scalar::from("a")), "$1");
        assert_eq!(list.bind(&Scalar::from(2)), "$2");
        assert_eq!(list.into_vec(), vec![Scalar::from("a"), Scalar::from(2)]);
    }

    #[test]
    fn test_inline_renders_literals() {
        let mut list = BindingList::inline();
        assert_eq!(list.bind(&Scalar::from("it's")), "'it''s'");
        assert_eq!(list.len(), 1);
    }
}
