use logos::Logos;

/// Raw chunks produced by logos. Every byte of the input belongs to exactly
/// one chunk so the text can be reassembled losslessly.
#[derive(Logos, Debug, PartialEq)]
enum RawChunk {
	/// `$` followed by one or more characters that are neither whitespace nor
	/// another `$`.
	#[regex(r"\$[^\s$]+")]
	Reference,
	/// A `$` with nothing usable after it.
	#[token("$")]
	Dollar,
	#[regex(r"[^$]+")]
	Text,
}

/// A piece of text after reference splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
	/// Literal text.
	Text(&'a str),
	/// A reference narrowed to a known name (without the `$`).
	Reference(&'a str),
	/// A `$token` whose no prefix names anything known. Kept verbatim.
	Unresolved(&'a str),
}

impl Chunk<'_> {
	pub fn is_reference(&self) -> bool {
		matches!(self, Self::Reference(_))
	}
}

/// Split `text` on `$name` tokens. Each token is matched greedily as `$`
/// followed by anything up to the next whitespace or `$`, then narrowed to
/// the longest prefix accepted by `is_known`. Whatever follows the narrowed
/// name is split again, so `$namesuffix` yields a reference followed by the
/// text `suffix`. An unknown token never hides a later one: `$HOME/$dir`
/// still yields a reference to `dir`.
pub fn split_references<'a, F>(text: &'a str, is_known: &F) -> Vec<Chunk<'a>>
where
	F: Fn(&str) -> bool,
{
	let mut chunks = Vec::new();

	for (raw, span) in RawChunk::lexer(text).spanned() {
		let slice = &text[span];

		match raw {
			Ok(RawChunk::Reference) => {
				let candidate = &slice[1..];
				match longest_known_prefix(candidate, is_known) {
					Some(name) => {
						chunks.push(Chunk::Reference(name));
						let rest = &candidate[name.len()..];
						if !rest.is_empty() {
							chunks.extend(split_references(rest, is_known));
						}
					}
					None => chunks.push(Chunk::Unresolved(slice)),
				}
			}
			Ok(RawChunk::Dollar | RawChunk::Text) | Err(()) => chunks.push(Chunk::Text(slice)),
		}
	}

	chunks
}

/// The longest prefix of `candidate` (on a character boundary) accepted by
/// `is_known`.
pub fn longest_known_prefix<'a, F>(candidate: &'a str, is_known: &F) -> Option<&'a str>
where
	F: Fn(&str) -> bool,
{
	let ends: Vec<usize> = candidate
		.char_indices()
		.map(|(index, ch)| index + ch.len_utf8())
		.collect();

	ends.into_iter()
		.rev()
		.map(|end| &candidate[..end])
		.find(|prefix| is_known(prefix))
}
