use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 8;

/// Clean a title or section name: ASCII control characters become spaces,
/// `<` and `>` are dropped, and surrounding whitespace is trimmed.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize optional input; `None` becomes the empty string.
pub fn sanitize_opt(input: Option<&str>) -> String {
    input.map(sanitize).unwrap_or_default()
}

/// Short random base-36 id.
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Random id that `taken` does not claim.
pub fn new_unique_id(mut taken: impl FnMut(&str) -> bool) -> String {
    loop {
        let id = new_id();
        if !taken(&id) {
            return id;
        }
    }
}
