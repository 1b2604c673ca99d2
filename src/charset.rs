// Copyright (c) 2026 rezky_nightky

/// Upper bound on a user supplied glyph set.
pub const MAX_GLYPHS: usize = 100;

const MATRIX_GLYPHS: &str =
    "ﾊﾐﾋｰｳｼﾅﾓﾆｻﾜﾂｵﾘｱﾎﾃﾏｹﾒｴｶｷﾑﾕﾗｾﾈｽﾀﾇﾍｦｲｸｺｿﾁﾄﾉﾌﾤﾨﾛﾝ012345789:.=*+-<>";

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CharsetPreset {
    /// Halfwidth katakana, digits and a few symbols
    #[default]
    Matrix,
    Binary,
    Digits,
    Hex,
    Katakana,
    Ascii,
    Greek,
    Cyrillic,
    Blocks,
    Dna,
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

impl CharsetPreset {
    pub fn glyphs(self) -> Vec<char> {
        let mut out = Vec::new();
        match self {
            CharsetPreset::Matrix => out.extend(MATRIX_GLYPHS.chars()),
            CharsetPreset::Binary => push_range(&mut out, 0x30, 0x31),
            CharsetPreset::Digits => push_range(&mut out, 0x30, 0x39),
            CharsetPreset::Hex => {
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0x41, 0x46);
            }
            CharsetPreset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
            CharsetPreset::Ascii => push_range(&mut out, 0x21, 0x7E),
            CharsetPreset::Greek => {
                push_range(&mut out, 0x0391, 0x03A1);
                push_range(&mut out, 0x03A3, 0x03A9);
                push_range(&mut out, 0x03B1, 0x03C9);
            }
            CharsetPreset::Cyrillic => push_range(&mut out, 0x0410, 0x044F),
            CharsetPreset::Blocks => push_range(&mut out, 0x2580, 0x259F),
            CharsetPreset::Dna => out.extend("ACGT".chars()),
        }
        out
    }
}

/// Drops whitespace and repeated glyphs, keeping first-seen order.
pub fn dedup_glyphs(glyphs: impl IntoIterator<Item = char>) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();
    for ch in glyphs {
        if !ch.is_whitespace() && !ch.is_control() && !out.contains(&ch) {
            out.push(ch);
        }
    }
    out
}

/// Parses `--chars`. Either the glyphs themselves (`"01"`) or, with a
/// `hex:` prefix, comma separated code points (`"hex:30,31,FF66"`).
pub fn parse_glyphs(spec: &str) -> Result<Vec<char>, String> {
    let glyphs = match spec.strip_prefix("hex:") {
        Some(list) => parse_hex_code_points(list)?,
        None => dedup_glyphs(spec.chars()),
    };
    if glyphs.is_empty() {
        return Err("--chars: need at least one visible character".to_string());
    }
    if glyphs.len() > MAX_GLYPHS {
        return Err(format!(
            "--chars: too many characters ({} given, max {})",
            glyphs.len(),
            MAX_GLYPHS
        ));
    }
    Ok(glyphs)
}

fn parse_hex_code_points(list: &str) -> Result<Vec<char>, String> {
    let mut out = Vec::new();
    for (i, part) in list.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16)
            .map_err(|_| format!("invalid hex char at index {}", i + 1))?;
        let ch = char::from_u32(v)
            .ok_or_else(|| format!("invalid unicode scalar at index {}", i + 1))?;
        out.push(ch);
    }
    Ok(dedup_glyphs(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_glyphs_accepts_literal_characters() {
        assert_eq!(parse_glyphs("0 1 0").unwrap(), vec!['0', '1']);
    }

    #[test]
    fn parse_glyphs_accepts_hex_code_points() {
        assert_eq!(parse_glyphs("hex:30,31").unwrap(), vec!['0', '1']);
        assert!(parse_glyphs("hex:zz").is_err());
    }

    #[test]
    fn parse_glyphs_rejects_blank_and_oversized_sets() {
        assert!(parse_glyphs("   ").is_err());
        let many: String = (0x4E00u32..0x4E00 + 101).filter_map(char::from_u32).collect();
        assert!(parse_glyphs(&many).is_err());
    }

    #[test]
    fn presets_are_non_empty_and_unique() {
        for preset in [
            CharsetPreset::Matrix,
            CharsetPreset::Binary,
            CharsetPreset::Hex,
            CharsetPreset::Greek,
            CharsetPreset::Dna,
        ] {
            let glyphs = preset.glyphs();
            assert!(!glyphs.is_empty());
            assert_eq!(dedup_glyphs(glyphs.clone()), glyphs);
        }
    }

    #[test]
    fn binary_preset_has_only_0_and_1() {
        assert_eq!(CharsetPreset::Binary.glyphs(), vec!['0', '1']);
    }
}
