/// Reserved words of the expression language.
///
/// Keywords are recognized by the identifier parser: a word is read in full
/// first and then checked against this enum, so `iffy` stays an identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    /// `if(cond, then, else)`
    If,
    /// `fn(a, b) -> body`
    Fn,
}
