//! Mascot expression selection from user text

const HALF_WIDTH_KATAKANA: &str =
    "ｱｲｳｴｵｶｷｸｹｺｻｼｽｾｿﾀﾁﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓﾔﾕﾖﾗﾘﾙﾚﾛﾜｦﾝ";
const FULL_WIDTH_KATAKANA: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン";

/// Facial expression the mascot reacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Normal,
    Happy,
    Angry,
    Blink,
}

impl Expression {
    /// Pick an expression for a line of user input
    pub fn from_input(text: &str) -> Self {
        let normalized = normalize_input(text);
        if normalized.contains('怒') {
            Expression::Angry
        } else if normalized.contains('笑') || normalized.contains('楽') {
            Expression::Happy
        } else if normalized.contains('驚') || normalized.contains("びっくり") {
            Expression::Blink
        } else {
            Expression::Normal
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Expression::Normal => "normal",
            Expression::Happy => "happy",
            Expression::Angry => "angry",
            Expression::Blink => "blink",
        }
    }

    pub fn face(&self) -> &str {
        match self {
            Expression::Normal => "(・_・)",
            Expression::Happy => "(^▽^)",
            Expression::Angry => "(`皿´)",
            Expression::Blink => "(－_－)",
        }
    }
}

/// Map half-width katakana to full-width and trim
pub fn normalize_input(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| {
            HALF_WIDTH_KATAKANA
                .chars()
                .position(|h| h == c)
                .and_then(|i| FULL_WIDTH_KATAKANA.chars().nth(i))
                .unwrap_or(c)
        })
        .collect()
}
