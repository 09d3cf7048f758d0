use unicode_normalization::UnicodeNormalization;

/// Turns an uploaded filename into a key that is safe to store.
///
/// Characters are NFKD-decomposed and whatever is not ASCII afterwards is
/// dropped (`ü` becomes `u`). `/` becomes a word break,
/// whitespace runs are joined with `_` and anything outside
/// `[A-Za-z0-9_.-]` is removed. Leading and trailing `.`/`_` are stripped,
/// so the result never starts with `../`. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        let cases = vec![
            ("report.pdf", "report.pdf"),
            ("My cool movie.mov", "My_cool_movie.mov"),
            ("../../../etc/passwd", "etc_passwd"),
            ("..\\..\\windows\\win.ini", "windowswin.ini"),
            ("i contain cool \u{fc}ml\u{e4}uts.txt", "i_contain_cool_umlauts.txt"),
            ("r\u{e9}sum\u{e9}.pdf", "resume.pdf"),
            ("caf\u{e9}.txt", "cafe.txt"),
            ("\u{fb01}le.txt", "file.txt"),
            ("  spaced   out  .txt ", "spaced_out_.txt"),
            ("a;b|c$d.txt", "abcd.txt"),
            (".hidden", "hidden"),
            ("../..", ""),
            ("", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(secure_filename(input), expected, "failed for case: {}", input);
        }
    }

    #[test]
    fn test_secure_filename_never_traverses() {
        let cases = vec!["../../etc/passwd", "/abs/path", "..%2f..%2fkey", "a/../../b"];

        for input in cases {
            let result = secure_filename(input);
            assert!(!result.contains("../"), "traversal kept for case: {}", input);
            assert!(!result.contains('/'), "separator kept for case: {}", input);
        }
    }
}
