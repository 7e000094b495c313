//! Normalización de texto para búsquedas
//!
//! Minúsculas y plegado de diacríticos del francés, para que
//! "Hélène" y "helene" coincidan.

/// Plegar un carácter acentuado a su base ASCII
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' => "a",
        'ç' => "c",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'î' | 'ï' | 'í' | 'ì' => "i",
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => "o",
        'ù' | 'û' | 'ü' | 'ú' => "u",
        'ÿ' => "y",
        'ñ' => "n",
        'œ' => "oe",
        'æ' => "ae",
        _ => return None,
    };
    Some(folded)
}

/// Minúsculas + diacríticos plegados + espacios colapsados
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = true;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_french_diacritics() {
        assert_eq!(normalize("Hélène Œuvre"), "helene oeuvre");
        assert_eq!(normalize("GARÇON à l'École"), "garcon a l'ecole");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  Jean   Dupont \t"), "jean dupont");
        assert_eq!(normalize(""), "");
    }
}
