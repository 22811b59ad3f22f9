/// Ordered `(pattern, replacement)` pairs. Each entry replaces every literal
/// occurrence of its pattern before the next entry runs.
pub const STORAGE_REWRITES: &[(&[u8], &[u8])] = &[
    (b"<br></br>", b"<br />"),
    (b"<hr></hr>", b"<hr />"),
];

pub fn apply_rewrites(content: &[u8]) -> Vec<u8> {
    apply_table(content, STORAGE_REWRITES)
}

pub fn apply_table(content: &[u8], table: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut current = content.to_vec();
    for (pattern, replacement) in table {
        current = replace_all(&current, pattern, replacement);
    }
    current
}

fn replace_all(haystack: &[u8], pattern: &[u8], replacement: &[u8]) -> Vec<u8> {
    if pattern.is_empty() || haystack.len() < pattern.len() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut index = 0;
    while index < haystack.len() {
        if haystack[index..].starts_with(pattern) {
            out.extend_from_slice(replacement);
            index += pattern.len();
        } else {
            out.push(haystack[index]);
            index += 1;
        }
    }
    out
}
