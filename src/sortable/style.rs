/// The computed-style values the drag controller reads, as the host reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub position: String,
    pub left: String,
    pub top: String,
    pub z_index: String,
    pub width: String,
    pub height: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// An empty value counts as `static`; unknown keywords do too.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZIndex {
    Auto,
    Value(i64),
}

impl ZIndex {
    /// Anything that is not a whole integer is treated as `auto`.
    pub fn parse(value: &str) -> Self {
        value
            .trim()
            .parse::<i64>()
            .map_or(Self::Auto, Self::Value)
    }
}

impl ComputedStyle {
    pub fn position(&self) -> Position {
        Position::parse(&self.position)
    }

    pub fn z_index(&self) -> ZIndex {
        ZIndex::parse(&self.z_index)
    }

    pub fn left_px(&self) -> Option<i32> {
        parse_leading_int(&self.left)
    }

    pub fn top_px(&self) -> Option<i32> {
        parse_leading_int(&self.top)
    }

    pub fn width_px(&self) -> i32 {
        parse_leading_int(&self.width).unwrap_or(0)
    }

    pub fn height_px(&self) -> i32 {
        parse_leading_int(&self.height).unwrap_or(0)
    }
}

/// Integer prefix of a CSS value: `"12.7px"` → `12`, `"-3px"` → `-3`, `"auto"` → `None`.
pub fn parse_leading_int(value: &str) -> Option<i32> {
    let s = value.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate like a float-backed parse would clamp rather than fail.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some((sign * magnitude).clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Format a pixel length the way the host expects it (`"10px"`, `"2.5px"`).
pub(crate) fn px(value: f32) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_follows_prefix_semantics() {
        assert_eq!(parse_leading_int("12px"), Some(12));
        assert_eq!(parse_leading_int("  -3.9px"), Some(-3));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("auto"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn z_index_auto_and_garbage_are_auto() {
        assert_eq!(ZIndex::parse("auto"), ZIndex::Auto);
        assert_eq!(ZIndex::parse("4x"), ZIndex::Auto);
        assert_eq!(ZIndex::parse(" 42 "), ZIndex::Value(42));
        assert_eq!(ZIndex::parse("-1"), ZIndex::Value(-1));
    }

    #[test]
    fn empty_position_is_static() {
        assert_eq!(Position::parse(""), Position::Static);
        assert_eq!(Position::parse("relative"), Position::Relative);
        assert_eq!(Position::parse("inherit"), Position::Static);
    }

    #[test]
    fn px_drops_trailing_zero_fraction() {
        assert_eq!(px(10.0), "10px");
        assert_eq!(px(-2.5), "-2.5px");
    }
}
