//! Digraph coding applied to symbol names in a compressed `cscope.out`.
//!
//! A character from [`LEADING`] followed by one from [`TRAILING`] is stored
//! as the single byte `0x80 + lead * 8 + trail`. Pairs are taken greedily
//! from the left, so a name always compresses to the same bytes. Bytes below
//! `0x80` are stored as they are.

const LEADING: &[u8; 16] = b" teisaprnl(of)=c";
const TRAILING: &[u8; 8] = b" tnerpla";
const FIRST_CODE: u8 = 0x80;

/// Compresses `text` the way cscope writes symbol names.
#[cfg(test)]
pub(crate) fn compress(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some((&first, tail)) = rest.split_first() {
        match tail.first().and_then(|&second| encode_pair(first, second)) {
            Some(code) => {
                out.push(code);
                rest = tail.get(1..).unwrap_or_default();
            }
            None => {
                out.push(first);
                rest = tail;
            }
        }
    }
    out
}

/// Yields the bytes of `text` with every digraph code expanded.
pub(crate) fn expanded(text: &[u8]) -> impl Iterator<Item = u8> + '_ {
    text.iter()
        .flat_map(|&byte| match decode_pair(byte) {
            Some((lead, trail)) => [Some(lead), Some(trail)],
            None => [Some(byte), None],
        })
        .flatten()
}

/// Expands every digraph code in `text`.
pub(crate) fn expand(text: &[u8]) -> Vec<u8> {
    expanded(text).collect()
}

/// Whether the stored name `stored` expands to exactly `plain`.
pub(crate) fn matches(stored: &[u8], plain: &[u8]) -> bool {
    expanded(stored).eq(plain.iter().copied())
}

#[cfg(test)]
fn encode_pair(first: u8, second: u8) -> Option<u8> {
    let lead = LEADING.iter().position(|&byte| byte == first)?;
    let trail = TRAILING.iter().position(|&byte| byte == second)?;
    u8::try_from((lead << 3) | trail)
        .ok()
        .map(|offset| FIRST_CODE | offset)
}

fn decode_pair(byte: u8) -> Option<(u8, u8)> {
    let offset = usize::from(byte.checked_sub(FIRST_CODE)?);
    let lead = LEADING.get(offset >> 3)?;
    let trail = TRAILING.get(offset & 7)?;
    Some((*lead, *trail))
}
