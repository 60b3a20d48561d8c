//! Splits the bytes of a top-level JSON array into independently
//! parsable/validatable chunks, without tokenizing the whole buffer.
//!
//! The scan is byte-level and single-pass: JSON's structural characters and
//! string delimiters are all ASCII, so there is no need to decode UTF-8 to
//! find element boundaries — only to track whether the scanner is currently
//! inside a string literal (where `,` `[` `]` are just data).

/// One or more whole array elements, as a byte range into the original
/// buffer, plus the line offset needed to re-anchor diagnostics produced
/// while parsing/validating this chunk in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub byte_start: usize,
    pub byte_end: usize,
    pub line_offset: usize,
}

impl ChunkRange {
    #[must_use]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.byte_start..self.byte_end]
    }
}

/// Partition `input` — expected to hold a top-level JSON array — into at
/// most `num_chunks` ranges, each covering a contiguous, roughly equal
/// share of the array's elements.
///
/// If `input` does not open with `[` (after leading whitespace), or the
/// array's bracket nesting underflows before its elements can be
/// delineated, a single [`ChunkRange`] covering the whole buffer is
/// returned — callers fall back to sequential parsing/validation, which
/// will surface the real diagnostic.
#[must_use]
pub fn partition(input: &[u8], num_chunks: usize) -> Vec<ChunkRange> {
    let num_chunks = num_chunks.max(1);
    let whole_buffer = ChunkRange {
        byte_start: 0,
        byte_end: input.len(),
        line_offset: 0,
    };

    let Some(open) = first_non_whitespace(input) else {
        return vec![whole_buffer];
    };
    if input[open] != b'[' {
        return vec![whole_buffer];
    }

    let Some(elements) = scan_elements(input, open + 1) else {
        return vec![whole_buffer];
    };

    if elements.is_empty() {
        return vec![whole_buffer];
    }

    group(input, &elements, num_chunks)
}

fn first_non_whitespace(input: &[u8]) -> Option<usize> {
    input.iter().position(|b| !b.is_ascii_whitespace())
}

/// Byte range of a single array element (no surrounding commas or brackets).
struct Element {
    start: usize,
    end: usize,
}

/// Walk the array interior starting at `start` (the byte after `[`),
/// returning the byte range of each element in order, or `None` if the
/// nesting underflows before the array closes.
fn scan_elements(input: &[u8], start: usize) -> Option<Vec<Element>> {
    let mut elements = Vec::new();
    let mut element_start = start;
    let mut pos = start;

    let mut brace_depth: i32 = 0;
    let mut bracket_depth: i32 = 0;
    let mut in_string = false;
    let mut escape_pending = false;

    while pos < input.len() {
        let b = input[pos];

        if in_string {
            if escape_pending {
                escape_pending = false;
            } else if b == b'\\' {
                escape_pending = true;
            } else if b == b'"' {
                in_string = false;
            }
            pos += 1;
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => brace_depth += 1,
            b'}' => {
                brace_depth -= 1;
                if brace_depth < 0 {
                    return None;
                }
            }
            b'[' => bracket_depth += 1,
            b']' => {
                if bracket_depth == 0 {
                    // end of the top-level array
                    if pos > element_start
                        && input[element_start..pos].iter().any(|c| !c.is_ascii_whitespace())
                    {
                        elements.push(Element { start: element_start, end: pos });
                    }
                    return Some(elements);
                }
                bracket_depth -= 1;
                if bracket_depth < 0 {
                    return None;
                }
            }
            b',' if brace_depth == 0 && bracket_depth == 0 => {
                elements.push(Element { start: element_start, end: pos });
                element_start = pos + 1;
            }
            _ => {}
        }

        pos += 1;
    }

    None // reached EOF without a matching ']'
}

fn group(input: &[u8], elements: &[Element], num_chunks: usize) -> Vec<ChunkRange> {
    let num_chunks = num_chunks.min(elements.len()).max(1);
    let base = elements.len() / num_chunks;
    let remainder = elements.len() % num_chunks;

    let mut ranges = Vec::with_capacity(num_chunks);
    let mut index = 0;
    for chunk_index in 0..num_chunks {
        let count = base + usize::from(chunk_index < remainder);
        if count == 0 {
            break;
        }
        let first = &elements[index];
        let last = &elements[index + count - 1];
        let line_offset = count_newlines(&input[..first.start]);
        ranges.push(ChunkRange {
            byte_start: first.start,
            byte_end: last.end,
            line_offset,
        });
        index += count;
    }
    ranges
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ranges_as_strings(input: &str, ranges: &[ChunkRange]) -> Vec<String> {
        ranges
            .iter()
            .map(|r| String::from_utf8(r.slice(input.as_bytes()).to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn splits_simple_array_into_two_chunks() {
        let input = "[1,2,3,4,5]";
        let ranges = partition(input.as_bytes(), 2);
        assert_eq!(ranges.len(), 2);
        let parts = ranges_as_strings(input, &ranges);
        assert_eq!(parts[0], "1,2,3");
        assert_eq!(parts[1], "4,5");
    }

    #[test]
    fn single_element_groups_stay_whole() {
        let input = r#"[{"a":1},{"b":2},{"c":3}]"#;
        let ranges = partition(input.as_bytes(), 3);
        assert_eq!(ranges.len(), 3);
        let parts = ranges_as_strings(input, &ranges);
        assert_eq!(parts, vec![r#"{"a":1}"#, r#"{"b":2}"#, r#"{"c":3}"#]);
    }

    #[test]
    fn commas_inside_strings_and_nested_containers_are_not_boundaries() {
        let input = r#"["a,b", [1,2], {"k": "v,w"}]"#;
        let ranges = partition(input.as_bytes(), 1);
        assert_eq!(ranges.len(), 1);
        let parts = ranges_as_strings(input, &ranges);
        assert_eq!(parts[0], r#""a,b", [1,2], {"k": "v,w"}"#);
    }

    #[test]
    fn non_array_input_falls_back_to_whole_buffer() {
        let input = r#"{"a": 1}"#;
        let ranges = partition(input.as_bytes(), 4);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].byte_start, 0);
        assert_eq!(ranges[0].byte_end, input.len());
    }

    #[test]
    fn unterminated_array_falls_back_to_whole_buffer() {
        let input = "[1, 2, 3";
        let ranges = partition(input.as_bytes(), 2);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].byte_end, input.len());
    }

    #[test]
    fn empty_array_yields_no_element_chunks() {
        let ranges = partition(b"[]", 4);
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn more_chunks_requested_than_elements_is_clamped() {
        let input = "[1,2]";
        let ranges = partition(input.as_bytes(), 10);
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn line_offset_counts_newlines_before_the_chunk() {
        let input = "[\n1,\n2,\n3\n]";
        let ranges = partition(input.as_bytes(), 3);
        assert_eq!(ranges[0].line_offset, 1);
        assert_eq!(ranges[1].line_offset, 2);
        assert_eq!(ranges[2].line_offset, 3);
    }
}
