use unicode_segmentation::UnicodeSegmentation;

/// A non-blank piece of text holding at most `MAX` user-perceived characters.
///
/// # Type Driven Development
/// Making an incorrect usage pattern unrepresentable, by construction, is known as *type driven
/// development*. The only way to get hold of a `BoundedText` is through `parse`, so every value in
/// circulation already satisfies the length constraint of the column it is bound for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    /// Returns an instance of `BoundedText` if the input satisfies all our validation constraints,
    /// the message to report against the offending field otherwise.
    ///
    /// Leading and trailing whitespace is dropped before checking.
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("This field may not be blank.".into());
        }

        // A grapheme is defined by the Unicode standard as a "user-perceived" character: `a°` is a
        // single grapheme, but it is composed of two characters (`a` and `°`).
        //
        // `true` specifies that we want to use the extended grapheme definition set, the
        // recommended one.
        if trimmed.graphemes(true).count() > MAX {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                MAX
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The caller gets a shared reference to the inner string. This gives the caller **read-only**
/// access, they have no way to compromise our invariants!
impl<const MAX: usize> AsRef<str> for BoundedText<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> std::fmt::Display for BoundedText<MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
