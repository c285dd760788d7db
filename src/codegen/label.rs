use std::fmt;

/// A local assembly label. Numbers come from a counter that lives for one
/// compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    prefix: &'static str,
    number: u32,
}

impl Label {
    pub fn new(prefix: &'static str, number: u32) -> Self {
        Label { prefix, number }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.number)
    }
}
